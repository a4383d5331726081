//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

mod admin_repository;
pub(crate) mod entities;
mod user_repository;
mod wallet_repository;

pub use admin_repository::{AdminRepository, AdminStore};
pub use user_repository::{UserRepository, UserStore};
pub use wallet_repository::{WalletRepository, WalletStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use admin_repository::MockAdminRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use wallet_repository::MockWalletRepository;

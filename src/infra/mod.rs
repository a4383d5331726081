//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections and repositories
//! - Unit of Work for transaction management
//! - Redis (admin sessions, token revocation, rate limits)
//! - Object storage for uploaded images

pub mod cache;
pub mod db;
pub mod repositories;
pub mod storage;
pub mod unit_of_work;

pub use cache::{AdminSessionStore, Cache, TokenRevocationStore};
pub use db::{Database, Migrator};
pub use repositories::{
    AdminRepository, AdminStore, UserRepository, UserStore, WalletRepository, WalletStore,
};
pub use storage::{random_object_name, DiskStorage, ObjectStorage};
pub use unit_of_work::{
    Persistence, TransactionContext, TxUserRepository, TxWalletRepository, UnitOfWork,
};

#[cfg(any(test, feature = "test-utils"))]
pub use cache::{MockAdminSessionStore, MockTokenRevocationStore};
#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockAdminRepository, MockUserRepository, MockWalletRepository};
#[cfg(any(test, feature = "test-utils"))]
pub use storage::MockObjectStorage;

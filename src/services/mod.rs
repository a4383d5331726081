//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion, and on the Unit of Work for transactional
//! repository access.

mod admin_auth_service;
mod auth_service;
pub mod container;
mod provisioning_service;
mod token_issuer;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use admin_auth_service::{AdminAuthService, AdminSession, AdminSessionManager};
pub use auth_service::{AuthContext, AuthService, SessionAuthenticator};
pub use provisioning_service::{AccountProvisioner, NewAccount, ProvisioningService};
pub use token_issuer::{Claims, IssuedToken, JwtIssuer, TokenIssuer};

#[cfg(any(test, feature = "test-utils"))]
pub use admin_auth_service::MockAdminAuthService;
#[cfg(any(test, feature = "test-utils"))]
pub use auth_service::MockAuthService;
#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use provisioning_service::MockProvisioningService;
#[cfg(any(test, feature = "test-utils"))]
pub use token_issuer::MockTokenIssuer;

//! Service Container - Centralized service construction and access.

use std::sync::Arc;

use super::{
    AccountProvisioner, AdminAuthService, AdminSessionManager, AuthService, JwtIssuer,
    ProvisioningService, SessionAuthenticator,
};
use crate::config::Config;
use crate::infra::{Cache, DiskStorage, Persistence};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
///
/// Provides centralized access to all application services.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get account provisioning service
    fn provisioning(&self) -> Arc<dyn ProvisioningService>;

    /// Get session authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get admin authentication service
    fn admin_auth(&self) -> Arc<dyn AdminAuthService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    provisioning: Arc<dyn ProvisioningService>,
    auth: Arc<dyn AuthService>,
    admin_auth: Arc<dyn AdminAuthService>,
}

impl Services {
    /// Create a new service container with explicit services
    pub fn new(
        provisioning: Arc<dyn ProvisioningService>,
        auth: Arc<dyn AuthService>,
        admin_auth: Arc<dyn AdminAuthService>,
    ) -> Self {
        Self {
            provisioning,
            auth,
            admin_auth,
        }
    }

    /// Wire all services from a database connection, cache and config
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        cache: Arc<Cache>,
        config: Config,
    ) -> Self {
        let uow = Arc::new(Persistence::new(db));
        let tokens = Arc::new(JwtIssuer::new(config.clone()));
        let storage = Arc::new(DiskStorage::new(&config));

        let provisioning = Arc::new(AccountProvisioner::new(
            uow.clone(),
            storage,
            tokens.clone(),
        ));
        let auth = Arc::new(SessionAuthenticator::new(
            uow.clone(),
            tokens,
            cache.clone(),
        ));
        let admin_auth = Arc::new(AdminSessionManager::new(uow, cache));

        Self {
            provisioning,
            auth,
            admin_auth,
        }
    }
}

impl ServiceContainer for Services {
    fn provisioning(&self) -> Arc<dyn ProvisioningService> {
        self.provisioning.clone()
    }

    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth.clone()
    }

    fn admin_auth(&self) -> Arc<dyn AdminAuthService> {
        self.admin_auth.clone()
    }
}

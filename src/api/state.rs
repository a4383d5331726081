//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and
//! infrastructure.

use std::sync::Arc;

use crate::infra::{Cache, Database};
use crate::services::{
    AdminAuthService, AuthService, ProvisioningService, ServiceContainer, Services,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Account provisioning service
    pub provisioning: Arc<dyn ProvisioningService>,
    /// Session authentication service
    pub auth: Arc<dyn AuthService>,
    /// Admin console authentication service
    pub admin_auth: Arc<dyn AdminAuthService>,
    /// Redis cache
    pub cache: Arc<Cache>,
    /// Database connection
    pub database: Arc<Database>,
    /// Internal service container (only with from_config)
    service_container: Option<Arc<Services>>,
}

impl AppState {
    /// Create application state from database connection and config.
    ///
    /// This is the recommended way to create AppState as it uses the
    /// ServiceContainer for centralized service management.
    pub fn from_config(
        database: Arc<Database>,
        cache: Arc<Cache>,
        config: crate::config::Config,
    ) -> Self {
        let container = Arc::new(Services::from_connection(
            database.get_connection(),
            cache.clone(),
            config,
        ));

        Self {
            provisioning: container.provisioning(),
            auth: container.auth(),
            admin_auth: container.admin_auth(),
            cache,
            database,
            service_container: Some(container),
        }
    }

    /// Create new application state with manually injected services.
    pub fn new(
        provisioning: Arc<dyn ProvisioningService>,
        auth: Arc<dyn AuthService>,
        admin_auth: Arc<dyn AdminAuthService>,
        cache: Arc<Cache>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            provisioning,
            auth,
            admin_auth,
            cache,
            database,
            service_container: None,
        }
    }

    /// Get the service container for centralized service access.
    ///
    /// Returns `Some` only if created via `from_config()`.
    pub fn services(&self) -> Option<&Arc<Services>> {
        self.service_container.as_ref()
    }
}

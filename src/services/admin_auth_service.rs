//! Admin console authentication.
//!
//! Admins authenticate against their own credential store and receive a
//! server-side session (cookie-carried id, Redis-backed record) instead
//! of a bearer token.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::ADMIN_SESSION_TTL_SECONDS;
use crate::domain::{AdminSessionData, Password};
use crate::errors::{AppError, AppResult};
use crate::infra::{AdminSessionStore, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// A freshly created admin session.
#[derive(Debug, Clone)]
pub struct AdminSession {
    /// Session id carried by the cookie
    pub id: String,
    pub data: AdminSessionData,
}

/// Admin authentication service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AdminAuthService: Send + Sync {
    /// Verify admin credentials and open a session
    async fn login(&self, email: String, password: String) -> AppResult<AdminSession>;

    /// Destroy a session; unknown ids are a no-op
    async fn logout(&self, session_id: &str) -> AppResult<()>;

    /// Resolve a presented session id, None when expired or unknown
    async fn verify_session(&self, session_id: &str) -> AppResult<Option<AdminSessionData>>;
}

/// Concrete implementation of AdminAuthService.
pub struct AdminSessionManager<U: UnitOfWork> {
    uow: Arc<U>,
    sessions: Arc<dyn AdminSessionStore>,
}

impl<U: UnitOfWork> AdminSessionManager<U> {
    pub fn new(uow: Arc<U>, sessions: Arc<dyn AdminSessionStore>) -> Self {
        Self { uow, sessions }
    }
}

#[async_trait]
impl<U: UnitOfWork> AdminAuthService for AdminSessionManager<U> {
    async fn login(&self, email: String, password: String) -> AppResult<AdminSession> {
        let admin_result = self.uow.admins().find_by_email(&email).await?;

        // Same timing defense as the user login path
        let dummy_hash =
            "$argon2id$v=19$m=19456,t=2,p=1$dummysalt123456$dummyhash1234567890123456789012";

        let (password_hash, admin_exists) = match &admin_result {
            Some(admin) => (admin.password_hash.as_str(), true),
            None => (dummy_hash, false),
        };

        let password_valid = Password::from_hash(password_hash.to_string()).verify(&password);

        if !admin_exists || !password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let admin = admin_result.expect("admin_exists verified above");
        let data = AdminSessionData::from(&admin);
        let session_id = Uuid::new_v4().to_string();

        self.sessions
            .put_session(&session_id, &data, ADMIN_SESSION_TTL_SECONDS)
            .await?;

        tracing::info!(admin_id = %admin.id, "admin logged in");

        Ok(AdminSession {
            id: session_id,
            data,
        })
    }

    async fn logout(&self, session_id: &str) -> AppResult<()> {
        self.sessions.remove_session(session_id).await?;
        tracing::info!("admin session destroyed");
        Ok(())
    }

    async fn verify_session(&self, session_id: &str) -> AppResult<Option<AdminSessionData>> {
        self.sessions.fetch_session(session_id).await
    }
}

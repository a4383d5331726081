//! Session authentication service.
//!
//! Verifies login credentials, issues bearer tokens and revokes them on
//! logout. Every operation takes or returns an explicit request-scoped
//! [`AuthContext`]; there is no ambient guard state.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{AuthResponse, Password};
use crate::errors::{AppError, AppResult};
use crate::infra::{TokenRevocationStore, UnitOfWork};
use crate::services::TokenIssuer;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Request-scoped authentication context recovered from a bearer token.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: String,
    /// Token id, the unit of revocation on logout
    pub token_id: Uuid,
    /// Unix timestamp the token expires at
    pub expires_at: i64,
}

/// Authentication service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Verify credentials and issue a token
    async fn login(&self, email: String, password: String) -> AppResult<AuthResponse>;

    /// Revoke the presented token; the caller's context is gone afterwards
    async fn logout(&self, ctx: &AuthContext) -> AppResult<()>;

    /// Verify a presented bearer token and build the request context
    async fn authenticate(&self, token: &str) -> AppResult<AuthContext>;
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct SessionAuthenticator<U: UnitOfWork> {
    uow: Arc<U>,
    tokens: Arc<dyn TokenIssuer>,
    revocations: Arc<dyn TokenRevocationStore>,
}

impl<U: UnitOfWork> SessionAuthenticator<U> {
    pub fn new(
        uow: Arc<U>,
        tokens: Arc<dyn TokenIssuer>,
        revocations: Arc<dyn TokenRevocationStore>,
    ) -> Self {
        Self {
            uow,
            tokens,
            revocations,
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for SessionAuthenticator<U> {
    async fn login(&self, email: String, password: String) -> AppResult<AuthResponse> {
        let user_result = self.uow.users().find_by_email(&email).await?;

        // SECURITY: Perform password verification even if the user doesn't
        // exist so timing does not reveal which accounts are registered.
        let dummy_hash =
            "$argon2id$v=19$m=19456,t=2,p=1$dummysalt123456$dummyhash1234567890123456789012";

        let (password_hash, user_exists) = match &user_result {
            Some(user) => (user.password_hash.as_str(), true),
            None => (dummy_hash, false),
        };

        let stored_password = Password::from_hash(password_hash.to_string());
        let password_valid = stored_password.verify(&password);

        // Never reveal which of the two checks failed
        if !user_exists || !password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let user = user_result.expect("user_exists verified above");
        let issued = self.tokens.issue(&user)?;

        tracing::info!(user_id = %user.id, "user logged in");

        Ok(AuthResponse::new(user, issued.token, issued.expires_in))
    }

    async fn logout(&self, ctx: &AuthContext) -> AppResult<()> {
        // Keep the denylist entry only as long as the token itself would
        // have stayed valid
        let remaining = ctx.expires_at - Utc::now().timestamp();
        if remaining > 0 {
            self.revocations
                .revoke(&ctx.token_id, remaining as u64)
                .await?;
        }

        tracing::info!(user_id = %ctx.user_id, "user logged out");
        Ok(())
    }

    async fn authenticate(&self, token: &str) -> AppResult<AuthContext> {
        let claims = self.tokens.verify(token)?;

        if self.revocations.is_revoked(&claims.jti).await? {
            return Err(AppError::Unauthorized);
        }

        Ok(AuthContext {
            user_id: claims.sub,
            email: claims.email,
            token_id: claims.jti,
            expires_at: claims.exp,
        })
    }
}

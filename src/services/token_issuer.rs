//! Token issuance - the external token authority consumed by the
//! authentication services.
//!
//! Tokens are opaque to callers: the services only ever see the issued
//! string, its declared time-to-live, and the claims recovered on
//! verification.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{Config, SECONDS_PER_HOUR};
use crate::domain::User;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    /// Token id, the unit of revocation on logout
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// An issued token together with its declared time-to-live.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

/// Token issuer trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait TokenIssuer: Send + Sync {
    /// Issue a fresh token for the user
    fn issue(&self, user: &User) -> AppResult<IssuedToken>;

    /// Verify a presented token and recover its claims
    fn verify(&self, token: &str) -> AppResult<Claims>;
}

/// JWT implementation of the token issuer.
pub struct JwtIssuer {
    config: Config,
}

impl JwtIssuer {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl TokenIssuer for JwtIssuer {
    fn issue(&self, user: &User) -> AppResult<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.config.jwt_expiration_hours);

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret_bytes()),
        )
        .map_err(AppError::TokenIssuance)?;

        Ok(IssuedToken {
            token,
            expires_in: self.config.jwt_expiration_hours * SECONDS_PER_HOUR,
        })
    }

    fn verify(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret_bytes()),
            &Validation::default(),
        )
        .map_err(|e| {
            tracing::debug!("token verification failed: {}", e);
            AppError::Unauthorized
        })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            username: "alice@example.com".to_string(),
            password_hash: "hashed".to_string(),
            profile_picture: None,
            ktp: None,
            verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn issue_and_verify_round_trip() {
        let issuer = JwtIssuer::new(Config::from_env());
        let user = sample_user();

        let issued = issuer.issue(&user).unwrap();
        assert!(issued.expires_in > 0);

        let claims = issuer.verify(&issued.token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn each_token_gets_a_fresh_id() {
        let issuer = JwtIssuer::new(Config::from_env());
        let user = sample_user();

        let first = issuer.verify(&issuer.issue(&user).unwrap().token).unwrap();
        let second = issuer.verify(&issuer.issue(&user).unwrap().token).unwrap();

        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let issuer = JwtIssuer::new(Config::from_env());
        let issued = issuer.issue(&sample_user()).unwrap();

        let mut tampered = issued.token;
        tampered.push('x');

        assert!(matches!(
            issuer.verify(&tampered),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let issuer = JwtIssuer::new(Config::from_env());
        assert!(matches!(
            issuer.verify("not-a-token"),
            Err(AppError::Unauthorized)
        ));
    }
}

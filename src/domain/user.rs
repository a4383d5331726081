//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::TOKEN_TYPE_BEARER;

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Object-store reference of the uploaded avatar, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    /// Object-store reference of the identity document, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ktp: Option<String>,
    /// True iff an identity document was supplied at registration
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to insert a User record.
///
/// Assembled by the provisioning service after validation, image upload
/// and password hashing have all succeeded.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub profile_picture: Option<String>,
    pub ktp: Option<String>,
    pub verified: bool,
}

/// Authentication response: the user's public profile fields plus the
/// freshly issued bearer token.
///
/// Assembled explicitly from a `User` value; there is no implicit
/// lookup-by-email helper behind this type.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthResponse {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// Account holder name
    #[schema(example = "Alice")]
    pub name: String,
    /// User email address
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// Login username (equal to the email at registration)
    pub username: String,
    /// Whether an identity document was supplied at registration
    pub verified: bool,
    /// Stored avatar reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    /// Stored identity document reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ktp: Option<String>,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
    /// Opaque access token
    pub token: String,
    /// Seconds until the token expires
    #[schema(example = 86400)]
    pub token_expires_in: i64,
    /// Always "bearer"
    #[schema(example = "bearer")]
    pub token_type: String,
}

impl AuthResponse {
    /// Assemble the response payload for a user and their issued token.
    pub fn new(user: User, token: String, token_expires_in: i64) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            username: user.username,
            verified: user.verified,
            profile_picture: user.profile_picture,
            ktp: user.ktp,
            created_at: user.created_at,
            token,
            token_expires_in,
            token_type: TOKEN_TYPE_BEARER.to_string(),
        }
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
            ktp: Some("abc123.png".to_string()),
            verified: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn auth_response_carries_public_fields_and_token() {
        let user = sample_user();
        let id = user.id;
        let response = AuthResponse::new(user, "opaque-token".to_string(), 86400);

        assert_eq!(response.id, id);
        assert_eq!(response.token, "opaque-token");
        assert_eq!(response.token_expires_in, 86400);
        assert_eq!(response.token_type, "bearer");
        assert!(response.verified);
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = sample_user();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("hashed"));
    }
}

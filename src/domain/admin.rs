//! Admin account entity and session data.
//!
//! Admins live in a credential store separate from regular users and
//! authenticate with server-side sessions rather than bearer tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Admin account entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data held server-side for an active admin session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminSessionData {
    pub admin_id: Uuid,
    pub email: String,
    pub name: String,
}

impl From<&AdminUser> for AdminSessionData {
    fn from(admin: &AdminUser) -> Self {
        Self {
            admin_id: admin.id,
            email: admin.email.clone(),
            name: admin.name.clone(),
        }
    }
}

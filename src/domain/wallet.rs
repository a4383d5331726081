//! Wallet domain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wallet domain entity, tied 1:1 to its owning user.
///
/// Invariant: `card_number` is unique across all wallets; the database
/// unique constraint is the authoritative guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub balance: i64,
    /// Stored as provided; wallet-level authorization is out of scope here
    #[serde(skip_serializing)]
    pub pin: String,
    pub card_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to insert a Wallet record.
#[derive(Debug, Clone)]
pub struct NewWallet {
    pub user_id: Uuid,
    pub balance: i64,
    pub pin: String,
    pub card_number: String,
}

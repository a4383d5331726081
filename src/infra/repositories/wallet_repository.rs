//! Wallet repository - read access to wallet records outside transactions.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use super::entities::wallet::{Column, Entity as WalletEntity};
use crate::domain::Wallet;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Wallet repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait WalletRepository: Send + Sync {
    /// Find the wallet owned by a user
    async fn find_by_user_id(&self, user_id: Uuid) -> AppResult<Option<Wallet>>;

    /// Check whether a card number is already assigned
    async fn card_number_exists(&self, card_number: &str) -> AppResult<bool>;
}

/// SeaORM-backed wallet repository.
pub struct WalletStore {
    db: DatabaseConnection,
}

impl WalletStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl WalletRepository for WalletStore {
    async fn find_by_user_id(&self, user_id: Uuid) -> AppResult<Option<Wallet>> {
        let result = WalletEntity::find()
            .filter(Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Wallet::from))
    }

    async fn card_number_exists(&self, card_number: &str) -> AppResult<bool> {
        let count = WalletEntity::find()
            .filter(Column::CardNumber.eq(card_number))
            .count(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(count > 0)
    }
}

//! Admin account repository.
//!
//! Backs the admin console's separate credential store and the seed
//! command.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::entities::admin_user::{ActiveModel, Column, Entity as AdminEntity};
use crate::domain::AdminUser;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Admin repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AdminRepository: Send + Sync {
    /// Find admin account by email
    async fn find_by_email(&self, email: &str) -> AppResult<Option<AdminUser>>;

    /// Create a new admin account
    async fn create(
        &self,
        name: String,
        email: String,
        password_hash: String,
    ) -> AppResult<AdminUser>;
}

/// SeaORM-backed admin repository.
pub struct AdminStore {
    db: DatabaseConnection,
}

impl AdminStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AdminRepository for AdminStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<AdminUser>> {
        let result = AdminEntity::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(AdminUser::from))
    }

    async fn create(
        &self,
        name: String,
        email: String,
        password_hash: String,
    ) -> AppResult<AdminUser> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            email: Set(email),
            password_hash: Set(password_hash),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await.map_err(AppError::from)?;

        Ok(AdminUser::from(model))
    }
}

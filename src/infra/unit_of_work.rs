//! Unit of Work pattern implementation.
//!
//! Centralizes repository access and manages database transactions
//! (begin, commit, rollback) so multi-row writes such as user + wallet
//! provisioning stay atomic: no partial state is ever observable.
//!
//! Transaction-scoped repositories are exposed through narrow traits so
//! services depend on the operations they need rather than on SeaORM
//! types, and tests can supply in-memory implementations.

use async_trait::async_trait;
use sea_orm::{
    AccessMode, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, IsolationLevel, PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use super::repositories::entities::{user, wallet};
use super::repositories::{
    AdminRepository, AdminStore, UserRepository, UserStore, WalletRepository, WalletStore,
};
use crate::domain::{NewUser, NewWallet, User, Wallet};
use crate::errors::{AppError, AppResult};

/// User operations available inside a transaction.
#[async_trait]
pub trait TxUserRepository: Send + Sync {
    /// Insert a new user record
    async fn create(&self, user: NewUser) -> AppResult<User>;

    /// Find user by email within the transaction's view
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
}

/// Wallet operations available inside a transaction.
#[async_trait]
pub trait TxWalletRepository: Send + Sync {
    /// Insert a new wallet record
    async fn create(&self, wallet: NewWallet) -> AppResult<Wallet>;

    /// Check card number existence within the transaction's view
    async fn card_number_exists(&self, card_number: &str) -> AppResult<bool>;
}

/// Transaction context providing repository access within a transaction.
///
/// All repository operations performed through this context are part of
/// the same database transaction.
pub struct TransactionContext<'a> {
    users: Box<dyn TxUserRepository + 'a>,
    wallets: Box<dyn TxWalletRepository + 'a>,
}

impl<'a> TransactionContext<'a> {
    /// Create a context from transaction-scoped repositories.
    pub fn new(
        users: Box<dyn TxUserRepository + 'a>,
        wallets: Box<dyn TxWalletRepository + 'a>,
    ) -> Self {
        Self { users, wallets }
    }

    /// Get user repository for this transaction
    pub fn users(&self) -> &(dyn TxUserRepository + 'a) {
        self.users.as_ref()
    }

    /// Get wallet repository for this transaction
    pub fn wallets(&self) -> &(dyn TxWalletRepository + 'a) {
        self.wallets.as_ref()
    }
}

/// Unit of Work trait for dependency injection.
///
/// Provides centralized access to all repositories and transaction
/// management. Note: the generic transaction methods make this trait
/// unsuitable for mockall; tests implement it by hand.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Get user repository
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get wallet repository
    fn wallets(&self) -> Arc<dyn WalletRepository>;

    /// Get admin repository
    fn admins(&self) -> Arc<dyn AdminRepository>;

    /// Execute a closure within a transaction.
    ///
    /// The transaction is committed on success and rolled back on error.
    /// Uses ReadCommitted isolation.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;

    /// Execute a closure within a serializable transaction.
    ///
    /// Use this for operations whose correctness depends on a
    /// check-then-act sequence, such as card-number assignment.
    async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    wallet_repo: Arc<WalletStore>,
    admin_repo: Arc<AdminStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        let user_repo = Arc::new(UserStore::new(db.clone()));
        let wallet_repo = Arc::new(WalletStore::new(db.clone()));
        let admin_repo = Arc::new(AdminStore::new(db.clone()));
        Self {
            db,
            user_repo,
            wallet_repo,
            admin_repo,
        }
    }

    /// Internal transaction execution with configurable isolation level
    async fn execute_transaction<F, T>(&self, isolation: IsolationLevel, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(Some(isolation), Some(AccessMode::ReadWrite))
            .await
            .map_err(AppError::from)?;

        let ctx = TransactionContext::new(
            Box::new(SeaTxUserRepository::new(&txn)),
            Box::new(SeaTxWalletRepository::new(&txn)),
        );

        let result = f(ctx).await;

        match result {
            Ok(value) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn wallets(&self) -> Arc<dyn WalletRepository> {
        self.wallet_repo.clone()
    }

    fn admins(&self) -> Arc<dyn AdminRepository> {
        self.admin_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::ReadCommitted, f)
            .await
    }

    async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::Serializable, f)
            .await
    }
}

/// Transaction-scoped user repository backed by SeaORM.
pub struct SeaTxUserRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> SeaTxUserRepository<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }
}

#[async_trait]
impl<'a> TxUserRepository for SeaTxUserRepository<'a> {
    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let now = chrono::Utc::now();
        let active_model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new_user.name),
            email: Set(new_user.email),
            username: Set(new_user.username),
            password_hash: Set(new_user.password_hash),
            profile_picture: Set(new_user.profile_picture),
            ktp: Set(new_user.ktp),
            verified: Set(new_user.verified),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(self.txn).await.map_err(AppError::from)?;

        Ok(User::from(model))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.txn)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }
}

/// Transaction-scoped wallet repository backed by SeaORM.
pub struct SeaTxWalletRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> SeaTxWalletRepository<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }
}

#[async_trait]
impl<'a> TxWalletRepository for SeaTxWalletRepository<'a> {
    async fn create(&self, new_wallet: NewWallet) -> AppResult<Wallet> {
        let now = chrono::Utc::now();
        let active_model = wallet::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(new_wallet.user_id),
            balance: Set(new_wallet.balance),
            pin: Set(new_wallet.pin),
            card_number: Set(new_wallet.card_number),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(self.txn).await.map_err(AppError::from)?;

        Ok(Wallet::from(model))
    }

    async fn card_number_exists(&self, card_number: &str) -> AppResult<bool> {
        let count = wallet::Entity::find()
            .filter(wallet::Column::CardNumber.eq(card_number))
            .count(self.txn)
            .await
            .map_err(AppError::from)?;

        Ok(count > 0)
    }
}

//! Account provisioning flow tests with in-memory collaborators.
//!
//! The in-memory Unit of Work stages transactional writes on a copy of
//! the store and publishes them only on success, mirroring the
//! all-or-nothing visibility the real database transaction provides.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use uuid::Uuid;

use wallet_api::domain::{AdminUser, NewUser, NewWallet, User, Wallet};
use wallet_api::errors::{AppError, AppResult};
use wallet_api::infra::{
    AdminRepository, ObjectStorage, TransactionContext, TxUserRepository, TxWalletRepository,
    UnitOfWork, UserRepository, WalletRepository,
};
use wallet_api::services::{
    AccountProvisioner, IssuedToken, JwtIssuer, NewAccount, ProvisioningService, TokenIssuer,
};
use wallet_api::Config;

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];

// =============================================================================
// In-memory store
// =============================================================================

#[derive(Default, Clone)]
struct StoreState {
    users: Vec<User>,
    wallets: Vec<Wallet>,
}

type SharedState = Arc<Mutex<StoreState>>;

fn insert_user(state: &SharedState, new_user: NewUser) -> AppResult<User> {
    let mut state = state.lock().unwrap();
    if state.users.iter().any(|u| u.email == new_user.email) {
        // Simulates the unique constraint on users.email
        return Err(AppError::Database(sea_orm::DbErr::Custom(
            "duplicate key value violates unique constraint \"users_email_key\"".to_string(),
        )));
    }

    let now = chrono::Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        name: new_user.name,
        email: new_user.email,
        username: new_user.username,
        password_hash: new_user.password_hash,
        profile_picture: new_user.profile_picture,
        ktp: new_user.ktp,
        verified: new_user.verified,
        created_at: now,
        updated_at: now,
    };
    state.users.push(user.clone());
    Ok(user)
}

fn insert_wallet(state: &SharedState, new_wallet: NewWallet) -> AppResult<Wallet> {
    let mut state = state.lock().unwrap();
    if state
        .wallets
        .iter()
        .any(|w| w.card_number == new_wallet.card_number)
    {
        // Simulates the unique constraint on wallets.card_number
        return Err(AppError::Database(sea_orm::DbErr::Custom(
            "duplicate key value violates unique constraint \"wallets_card_number_key\""
                .to_string(),
        )));
    }

    let now = chrono::Utc::now();
    let wallet = Wallet {
        id: Uuid::new_v4(),
        user_id: new_wallet.user_id,
        balance: new_wallet.balance,
        pin: new_wallet.pin,
        card_number: new_wallet.card_number,
        created_at: now,
        updated_at: now,
    };
    state.wallets.push(wallet.clone());
    Ok(wallet)
}

struct TxUsers {
    state: SharedState,
}

#[async_trait]
impl TxUserRepository for TxUsers {
    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        insert_user(&self.state, new_user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }
}

struct TxWallets {
    state: SharedState,
}

#[async_trait]
impl TxWalletRepository for TxWallets {
    async fn create(&self, new_wallet: NewWallet) -> AppResult<Wallet> {
        insert_wallet(&self.state, new_wallet)
    }

    async fn card_number_exists(&self, card_number: &str) -> AppResult<bool> {
        let state = self.state.lock().unwrap();
        Ok(state.wallets.iter().any(|w| w.card_number == card_number))
    }
}

struct Users {
    state: SharedState,
}

#[async_trait]
impl UserRepository for Users {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().any(|u| u.email == email))
    }
}

struct Wallets {
    state: SharedState,
}

#[async_trait]
impl WalletRepository for Wallets {
    async fn find_by_user_id(&self, user_id: Uuid) -> AppResult<Option<Wallet>> {
        let state = self.state.lock().unwrap();
        Ok(state.wallets.iter().find(|w| w.user_id == user_id).cloned())
    }

    async fn card_number_exists(&self, card_number: &str) -> AppResult<bool> {
        let state = self.state.lock().unwrap();
        Ok(state.wallets.iter().any(|w| w.card_number == card_number))
    }
}

struct Admins;

#[async_trait]
impl AdminRepository for Admins {
    async fn find_by_email(&self, _email: &str) -> AppResult<Option<AdminUser>> {
        Ok(None)
    }

    async fn create(
        &self,
        _name: String,
        _email: String,
        _password_hash: String,
    ) -> AppResult<AdminUser> {
        Err(AppError::internal("not used by provisioning tests"))
    }
}

/// In-memory Unit of Work.
///
/// `staged: true` copies the store for the duration of a transaction and
/// publishes on success only. `staged: false` writes straight through,
/// which lets concurrent transactions observe each other the way
/// concurrent provisioning operations do.
struct InMemoryUow {
    state: SharedState,
    staged: bool,
}

impl InMemoryUow {
    fn new(state: SharedState) -> Self {
        Self {
            state,
            staged: true,
        }
    }

    fn write_through(state: SharedState) -> Self {
        Self {
            state,
            staged: false,
        }
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUow {
    fn users(&self) -> Arc<dyn UserRepository> {
        Arc::new(Users {
            state: self.state.clone(),
        })
    }

    fn wallets(&self) -> Arc<dyn WalletRepository> {
        Arc::new(Wallets {
            state: self.state.clone(),
        })
    }

    fn admins(&self) -> Arc<dyn AdminRepository> {
        Arc::new(Admins)
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        let work_state = if self.staged {
            Arc::new(Mutex::new(self.state.lock().unwrap().clone()))
        } else {
            self.state.clone()
        };

        let ctx = TransactionContext::new(
            Box::new(TxUsers {
                state: work_state.clone(),
            }),
            Box::new(TxWallets {
                state: work_state.clone(),
            }),
        );

        let result = f(ctx).await;

        match result {
            Ok(value) => {
                if self.staged {
                    *self.state.lock().unwrap() = work_state.lock().unwrap().clone();
                }
                Ok(value)
            }
            // Staged copy is discarded: nothing becomes visible
            Err(e) => Err(e),
        }
    }

    async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        self.transaction(f).await
    }
}

// =============================================================================
// Storage and token doubles
// =============================================================================

#[derive(Default)]
struct RecordingStorage {
    objects: Mutex<Vec<String>>,
}

#[async_trait]
impl ObjectStorage for RecordingStorage {
    async fn put(&self, object_name: &str, _bytes: &[u8]) -> AppResult<String> {
        self.objects.lock().unwrap().push(object_name.to_string());
        Ok(object_name.to_string())
    }
}

struct FailingStorage;

#[async_trait]
impl ObjectStorage for FailingStorage {
    async fn put(&self, _object_name: &str, _bytes: &[u8]) -> AppResult<String> {
        Err(AppError::Storage("bucket unavailable".to_string()))
    }
}

struct FailingTokenIssuer;

impl TokenIssuer for FailingTokenIssuer {
    fn issue(&self, _user: &User) -> AppResult<IssuedToken> {
        Err(AppError::TokenIssuance(
            jsonwebtoken::errors::ErrorKind::InvalidKeyFormat.into(),
        ))
    }

    fn verify(&self, _token: &str) -> AppResult<wallet_api::services::Claims> {
        Err(AppError::Unauthorized)
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn provisioner(
    state: SharedState,
    storage: Arc<dyn ObjectStorage>,
) -> AccountProvisioner<InMemoryUow> {
    AccountProvisioner::new(
        Arc::new(InMemoryUow::new(state)),
        storage,
        Arc::new(JwtIssuer::new(Config::from_env())),
    )
}

fn valid_account(email: &str) -> NewAccount {
    NewAccount {
        name: "Alice".to_string(),
        email: email.to_string(),
        password: "secret1".to_string(),
        pin: "123456".to_string(),
        profile_picture: None,
        ktp: None,
    }
}

fn record_counts(state: &SharedState) -> (usize, usize) {
    let state = state.lock().unwrap();
    (state.users.len(), state.wallets.len())
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn register_creates_exactly_one_user_and_wallet() {
    let state = SharedState::default();
    let service = provisioner(state.clone(), Arc::new(RecordingStorage::default()));

    let response = service.register(valid_account("alice@x.com")).await.unwrap();

    assert_eq!(response.email, "alice@x.com");
    assert_eq!(response.username, "alice@x.com");
    assert_eq!(response.token_type, "bearer");
    assert!(response.token_expires_in > 0);
    assert!(!response.token.is_empty());
    assert!(!response.verified);

    let (users, wallets) = record_counts(&state);
    assert_eq!((users, wallets), (1, 1));

    let store = state.lock().unwrap();
    let wallet = &store.wallets[0];
    assert_eq!(wallet.user_id, response.id);
    assert_eq!(wallet.balance, 0);
    assert_eq!(wallet.pin, "123456");
    assert_eq!(wallet.card_number.len(), 16);
    assert!(wallet.card_number.chars().all(|c| c.is_ascii_digit()));

    // Password is stored hashed, never as provided
    assert_ne!(store.users[0].password_hash, "secret1");
}

#[tokio::test]
async fn register_with_ktp_marks_account_verified() {
    let state = SharedState::default();
    let storage = Arc::new(RecordingStorage::default());
    let service = provisioner(state.clone(), storage.clone());

    let mut account = valid_account("alice@x.com");
    account.ktp = Some(STANDARD.encode(PNG_MAGIC));

    let response = service.register(account).await.unwrap();

    assert!(response.verified);
    let ktp_reference = response.ktp.expect("ktp reference recorded");
    assert!(ktp_reference.ends_with(".png"));
    assert_eq!(storage.objects.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn register_stores_both_uploads() {
    let state = SharedState::default();
    let storage = Arc::new(RecordingStorage::default());
    let service = provisioner(state.clone(), storage.clone());

    let mut account = valid_account("alice@x.com");
    account.profile_picture = Some(format!(
        "data:image/jpeg;base64,{}",
        STANDARD.encode(JPEG_MAGIC)
    ));
    account.ktp = Some(STANDARD.encode(PNG_MAGIC));

    let response = service.register(account).await.unwrap();

    let avatar = response.profile_picture.expect("avatar reference recorded");
    assert!(avatar.ends_with(".jpg"));
    assert_eq!(storage.objects.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn duplicate_email_fails_validation_with_no_side_effects() {
    let state = SharedState::default();
    let storage = Arc::new(RecordingStorage::default());
    let service = provisioner(state.clone(), storage.clone());

    service.register(valid_account("alice@x.com")).await.unwrap();
    let result = service.register(valid_account("alice@x.com")).await;

    match result {
        Err(AppError::Validation(errors)) => {
            assert!(errors.contains_key("email"));
        }
        other => panic!("expected validation failure, got {:?}", other.map(|_| ())),
    }

    // Only the first registration left records behind
    assert_eq!(record_counts(&state), (1, 1));
    assert_eq!(storage.objects.lock().unwrap().len(), 0);
}

#[tokio::test]
async fn undecodable_image_fails_provisioning_with_no_records() {
    let state = SharedState::default();
    let service = provisioner(state.clone(), Arc::new(RecordingStorage::default()));

    let mut account = valid_account("alice@x.com");
    account.ktp = Some("!!!not-base64!!!".to_string());

    let result = service.register(account).await;

    assert!(matches!(result, Err(AppError::Provisioning(_))));
    assert_eq!(record_counts(&state), (0, 0));
}

#[tokio::test]
async fn storage_failure_rolls_back_the_whole_transaction() {
    let state = SharedState::default();
    let service = provisioner(state.clone(), Arc::new(FailingStorage));

    let mut account = valid_account("alice@x.com");
    account.ktp = Some(STANDARD.encode(PNG_MAGIC));

    let result = service.register(account).await;

    match result {
        Err(AppError::Provisioning(msg)) => assert!(msg.contains("bucket unavailable")),
        other => panic!("expected provisioning failure, got {:?}", other.map(|_| ())),
    }
    assert_eq!(record_counts(&state), (0, 0));
}

#[tokio::test]
async fn token_issuer_failure_is_distinct_and_account_survives() {
    let state = SharedState::default();
    let service = AccountProvisioner::new(
        Arc::new(InMemoryUow::new(state.clone())),
        Arc::new(RecordingStorage::default()),
        Arc::new(FailingTokenIssuer),
    );

    let result = service.register(valid_account("alice@x.com")).await;

    assert!(matches!(result, Err(AppError::TokenIssuance(_))));
    // Issuance happens after commit; the provisioned account stays
    assert_eq!(record_counts(&state), (1, 1));
}

#[tokio::test]
async fn sequential_registrations_get_distinct_card_numbers() {
    let state = SharedState::default();
    let service = provisioner(state.clone(), Arc::new(RecordingStorage::default()));

    for i in 0..10 {
        service
            .register(valid_account(&format!("user{}@x.com", i)))
            .await
            .unwrap();
    }

    let store = state.lock().unwrap();
    let mut numbers: Vec<_> = store.wallets.iter().map(|w| w.card_number.clone()).collect();
    numbers.sort();
    numbers.dedup();
    assert_eq!(numbers.len(), 10);
}

#[tokio::test]
async fn concurrent_registrations_get_distinct_card_numbers() {
    let state = SharedState::default();
    // Write-through mode: concurrent provisions see each other's writes,
    // and the simulated unique constraint stays authoritative
    let service = Arc::new(AccountProvisioner::new(
        Arc::new(InMemoryUow::write_through(state.clone())),
        Arc::new(RecordingStorage::default()),
        Arc::new(JwtIssuer::new(Config::from_env())),
    ));

    let mut handles = Vec::new();
    for i in 0..8 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service
                .register(valid_account(&format!("user{}@x.com", i)))
                .await
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let store = state.lock().unwrap();
    assert_eq!(store.wallets.len(), 8);

    let mut numbers: Vec<_> = store.wallets.iter().map(|w| w.card_number.clone()).collect();
    numbers.sort();
    numbers.dedup();
    assert_eq!(numbers.len(), 8, "card numbers must be pairwise distinct");
}

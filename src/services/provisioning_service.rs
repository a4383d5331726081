//! Account provisioning service.
//!
//! Turns a validated registration request into a User + Wallet pair
//! created as a single atomic unit, assigns the wallet a collision-free
//! card number, and requests a token for the new account.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::INITIAL_WALLET_BALANCE;
use crate::domain::{
    decode_base64_image, AuthResponse, CardNumberGenerator, DecodedImage, NewUser, NewWallet,
    Password,
};
use crate::errors::{AppError, AppResult};
use crate::infra::{random_object_name, ObjectStorage, UnitOfWork};
use crate::services::TokenIssuer;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// A validated registration request.
///
/// `password_confirmation` equality and field shapes are enforced at the
/// boundary; the payloads here are the fields provisioning acts on.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub pin: String,
    /// Base64 image payload, optional
    pub profile_picture: Option<String>,
    /// Base64 identity document payload, optional
    pub ktp: Option<String>,
}

/// Provisioning service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProvisioningService: Send + Sync {
    /// Provision an account: create User + Wallet atomically and issue
    /// a token for the new user.
    async fn register(&self, account: NewAccount) -> AppResult<AuthResponse>;
}

/// Concrete implementation of ProvisioningService using Unit of Work.
pub struct AccountProvisioner<U: UnitOfWork> {
    uow: Arc<U>,
    storage: Arc<dyn ObjectStorage>,
    tokens: Arc<dyn TokenIssuer>,
    card_numbers: CardNumberGenerator,
}

impl<U: UnitOfWork> AccountProvisioner<U> {
    pub fn new(uow: Arc<U>, storage: Arc<dyn ObjectStorage>, tokens: Arc<dyn TokenIssuer>) -> Self {
        Self {
            uow,
            storage,
            tokens,
            card_numbers: CardNumberGenerator::default(),
        }
    }

    /// Override the card-number generator (shorter numbers, tighter
    /// retry bounds).
    pub fn with_card_numbers(mut self, card_numbers: CardNumberGenerator) -> Self {
        self.card_numbers = card_numbers;
        self
    }
}

#[async_trait]
impl<U: UnitOfWork> ProvisioningService for AccountProvisioner<U> {
    async fn register(&self, account: NewAccount) -> AppResult<AuthResponse> {
        // Duplicate emails are a validation failure, not a server fault.
        // The unique constraint still backs this check under races.
        if self.uow.users().email_exists(&account.email).await? {
            return Err(AppError::validation_field(
                "email",
                "The email has already been taken",
            ));
        }

        // Decode uploads and hash the password before opening the
        // transaction; neither has side effects.
        let profile_image = decode_upload(account.profile_picture.as_deref())
            .map_err(AppError::into_provisioning)?;
        let ktp_image =
            decode_upload(account.ktp.as_deref()).map_err(AppError::into_provisioning)?;

        let password_hash = Password::new(&account.password)?.into_string();

        let storage = self.storage.clone();
        let generator = self.card_numbers;
        let NewAccount {
            name, email, pin, ..
        } = account;

        // One atomic unit: image persistence, user insert, card-number
        // assignment and wallet insert all commit or roll back together.
        // Serializable isolation covers the card-number check-then-act.
        let user = self
            .uow
            .transaction_serializable(move |ctx| {
                Box::pin(async move {
                    let profile_reference = match profile_image {
                        Some(image) => Some(store_upload(storage.as_ref(), image).await?),
                        None => None,
                    };
                    let ktp_reference = match ktp_image {
                        Some(image) => Some(store_upload(storage.as_ref(), image).await?),
                        None => None,
                    };

                    // Re-validate under the transaction's isolation; the
                    // pre-check above can race with another registration
                    if ctx.users().find_by_email(&email).await?.is_some() {
                        return Err(AppError::validation_field(
                            "email",
                            "The email has already been taken",
                        ));
                    }

                    let verified = ktp_reference.is_some();
                    let user = ctx
                        .users()
                        .create(NewUser {
                            name,
                            email: email.clone(),
                            username: email,
                            password_hash,
                            profile_picture: profile_reference,
                            ktp: ktp_reference,
                            verified,
                        })
                        .await?;

                    let wallets = ctx.wallets();
                    let card_number = generator
                        .generate(move |candidate| async move {
                            wallets.card_number_exists(&candidate).await
                        })
                        .await?;

                    wallets
                        .create(NewWallet {
                            user_id: user.id,
                            balance: INITIAL_WALLET_BALANCE,
                            pin,
                            card_number,
                        })
                        .await?;

                    Ok(user)
                })
            })
            .await
            .map_err(AppError::into_provisioning)?;

        tracing::info!(user_id = %user.id, "account provisioned");

        // Token issuance happens after commit; its failure is a distinct
        // fault and never undoes the provisioned account.
        let issued = self.tokens.issue(&user)?;

        Ok(AuthResponse::new(user, issued.token, issued.expires_in))
    }
}

/// Decode an optional base64 upload.
fn decode_upload(payload: Option<&str>) -> AppResult<Option<DecodedImage>> {
    payload.map(decode_base64_image).transpose()
}

/// Persist a decoded upload under a random object name.
async fn store_upload(storage: &dyn ObjectStorage, image: DecodedImage) -> AppResult<String> {
    let object_name = random_object_name(image.format.extension());
    storage.put(&object_name, &image.bytes).await
}

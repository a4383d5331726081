//! Seed command - Bootstrap records.
//!
//! Creates the initial admin account so the console is reachable on a
//! fresh deployment. Idempotent: an existing account with the same
//! email is left untouched.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};

use crate::cli::args::{SeedArgs, SeedTarget};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, Persistence, UnitOfWork};

/// Execute the seed command
pub async fn execute(args: SeedArgs, config: Config) -> AppResult<()> {
    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    let uow = Arc::new(Persistence::new(db.get_connection()));

    match args.target {
        SeedTarget::Admin {
            name,
            email,
            password,
        } => seed_admin(uow, name, email, password).await,
    }
}

async fn seed_admin(
    uow: Arc<Persistence>,
    name: String,
    email: String,
    password: String,
) -> AppResult<()> {
    if uow.admins().find_by_email(&email).await?.is_some() {
        tracing::info!(email = %email, "admin account already exists, nothing to do");
        return Ok(());
    }

    if password == "admin" {
        tracing::warn!("seeding with the default password; change it before exposing the console");
    }

    // Operator-supplied bootstrap passwords bypass the user-facing
    // minimum-length rule, so hash directly
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?
        .to_string();

    let admin = uow.admins().create(name, email, password_hash).await?;
    tracing::info!(admin_id = %admin.id, email = %admin.email, "admin account seeded");

    Ok(())
}

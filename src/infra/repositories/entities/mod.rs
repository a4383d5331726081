//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod admin_user;
pub mod user;
pub mod wallet;

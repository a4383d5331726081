//! HTTP request handlers.

pub mod admin_handler;
pub mod auth_handler;

pub use admin_handler::admin_routes;
pub use auth_handler::{auth_routes, session_routes};

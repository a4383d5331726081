//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing. The admin
//! console is redirect-based and intentionally undocumented here.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::auth_handler;
use crate::domain::AuthResponse;
use crate::types::MessageResponse;

/// OpenAPI documentation for the wallet API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Wallet API",
        version = "0.1.0",
        description = "Wallet application backend: account provisioning and bearer-token sessions",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        auth_handler::register,
        auth_handler::login,
        auth_handler::logout,
    ),
    components(
        schemas(
            AuthResponse,
            MessageResponse,
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Account registration, login and logout")
    )
)]
pub struct ApiDoc;

/// Registers the bearer security scheme used by protected endpoints
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

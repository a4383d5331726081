//! Authentication handlers: registration, login, logout.

use axum::{extract::State, http::StatusCode, response::Json, routing::post, Extension, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::config::PIN_REGEX;
use crate::domain::AuthResponse;
use crate::errors::AppResult;
use crate::services::{AuthContext, NewAccount};
use crate::types::MessageResponse;

/// Account registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Account holder name
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    #[schema(example = "Alice")]
    pub name: String,
    /// User email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// User password (minimum 6 characters)
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    #[schema(example = "secret1", min_length = 6)]
    pub password: String,
    /// Must equal `password`
    #[validate(must_match(other = password, message = "Password confirmation does not match"))]
    #[schema(example = "secret1")]
    pub password_confirmation: String,
    /// Wallet PIN, exactly 6 digits
    #[validate(regex(path = *PIN_REGEX, message = "PIN must be exactly 6 digits"))]
    #[schema(example = "123456")]
    pub pin: String,
    /// Base64-encoded avatar image (jpeg/png/jpg)
    pub profile_picture: Option<String>,
    /// Base64-encoded identity document image (jpeg/png/jpg)
    pub ktp: Option<String>,
}

impl From<RegisterRequest> for NewAccount {
    fn from(request: RegisterRequest) -> Self {
        Self {
            name: request.name,
            email: request.email,
            password: request.password,
            pin: request.pin,
            profile_picture: request.profile_picture,
            ktp: request.ktp,
        }
    }
}

/// User login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// User email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// User password
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    #[schema(example = "secret1")]
    pub password: String,
}

/// Public authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Routes requiring an authenticated bearer context
pub fn session_routes() -> Router<AppState> {
    Router::new().route("/logout", post(logout))
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account provisioned", body = AuthResponse),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Provisioning failure")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let response = state.provisioning.register(payload.into()).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Login and get a bearer token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Validation error or invalid credentials"),
        (status = 500, description = "Token issuance failure")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let response = state.auth.login(payload.email, payload.password).await?;

    Ok(Json(response))
}

/// Logout: revoke the presented token
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Logout successful", body = MessageResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> AppResult<Json<MessageResponse>> {
    state.auth.logout(&ctx).await?;

    Ok(Json(MessageResponse::new("logout success")))
}

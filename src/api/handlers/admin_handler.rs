//! Admin console handlers.
//!
//! Unlike the JSON API, the admin flow is cookie/session based and all
//! outcomes are redirects: successful login lands on the dashboard,
//! failures bounce back to the login form with a generic flash message
//! that never reveals which field was wrong.

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;

use crate::api::AppState;
use crate::config::{ADMIN_FLASH_COOKIE, ADMIN_SESSION_COOKIE};
use crate::errors::{AppError, AppResult};

/// Admin login form fields
#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Admin console routes
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_form).post(login))
        .route("/logout", post(logout))
        .route("/dashboard", get(dashboard))
}

/// Render the login form, consuming any pending flash message
async fn login_form(jar: CookieJar) -> (CookieJar, Html<String>) {
    let flash = jar
        .get(ADMIN_FLASH_COOKIE)
        .map(|c| c.value().to_string());
    let jar = jar.remove(flash_cookie_template());

    (jar, Html(render_login_page(flash.as_deref())))
}

/// Verify admin credentials and open a session
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(payload): Form<AdminLoginRequest>,
) -> AppResult<(CookieJar, Redirect)> {
    // Redirect-based contract: required-field failures flash back to the
    // form instead of returning a JSON error body
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Ok(flash_back(jar, "Email and password are required"));
    }

    match state.admin_auth.login(payload.email, payload.password).await {
        Ok(session) => {
            let cookie = Cookie::build((ADMIN_SESSION_COOKIE, session.id))
                .path("/admin")
                .http_only(true)
                .build();

            Ok((jar.add(cookie), Redirect::to("/admin/dashboard")))
        }
        // Generic message: never reveal whether email or password failed
        Err(AppError::InvalidCredentials) => Ok(flash_back(jar, "Invalid credentials")),
        Err(other) => Err(other),
    }
}

/// Destroy the admin session and return to the login form
async fn logout(State(state): State<AppState>, jar: CookieJar) -> AppResult<(CookieJar, Redirect)> {
    if let Some(cookie) = jar.get(ADMIN_SESSION_COOKIE) {
        state.admin_auth.logout(cookie.value()).await?;
    }

    let jar = jar.remove(session_cookie_template());
    Ok((jar, Redirect::to("/admin/login")))
}

/// Session-guarded dashboard
async fn dashboard(State(state): State<AppState>, jar: CookieJar) -> AppResult<Response> {
    let session = match jar.get(ADMIN_SESSION_COOKIE) {
        Some(cookie) => state.admin_auth.verify_session(cookie.value()).await?,
        None => None,
    };

    match session {
        Some(data) => Ok(Html(render_dashboard_page(&data.name)).into_response()),
        None => Ok(Redirect::to("/admin/login").into_response()),
    }
}

/// Flash a message and bounce back to the login form
fn flash_back(jar: CookieJar, message: &str) -> (CookieJar, Redirect) {
    let flash = Cookie::build((ADMIN_FLASH_COOKIE, message.to_string()))
        .path("/admin")
        .http_only(true)
        .build();

    (jar.add(flash), Redirect::to("/admin/login"))
}

/// Removal template matching the session cookie's path
fn session_cookie_template() -> Cookie<'static> {
    let mut cookie = Cookie::from(ADMIN_SESSION_COOKIE);
    cookie.set_path("/admin");
    cookie
}

/// Removal template matching the flash cookie's path
fn flash_cookie_template() -> Cookie<'static> {
    let mut cookie = Cookie::from(ADMIN_FLASH_COOKIE);
    cookie.set_path("/admin");
    cookie
}

fn render_login_page(flash: Option<&str>) -> String {
    let notice = flash
        .map(|msg| format!(r#"<p class="error">{}</p>"#, msg))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Admin Login</title></head>
<body>
  <h1>Admin Login</h1>
  {notice}
  <form method="post" action="/admin/login">
    <label>Email <input type="email" name="email"></label>
    <label>Password <input type="password" name="password"></label>
    <button type="submit">Sign in</button>
  </form>
</body>
</html>"#
    )
}

fn render_dashboard_page(name: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Admin Dashboard</title></head>
<body>
  <h1>Dashboard</h1>
  <p>Signed in as {name}</p>
  <form method="post" action="/admin/logout"><button type="submit">Sign out</button></form>
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_page_includes_flash_when_present() {
        let page = render_login_page(Some("Invalid credentials"));
        assert!(page.contains("Invalid credentials"));

        let clean = render_login_page(None);
        assert!(!clean.contains("error"));
    }
}

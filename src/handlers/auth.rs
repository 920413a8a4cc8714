use std::net::SocketAddr;

use axum::{
    Form, Json,
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_cookies::cookie::time::{Duration, OffsetDateTime};
use tower_cookies::{Cookie, Cookies};

use crate::{error::Result, middleware_layer::auth::SESSION_COOKIE, state::AppState};

/// Client-side lifetime of the session cookie.
const SESSION_TTL_HOURS: i64 = 24;

/// The form payload for user login.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// The form payload for user registration. The password arrives twice.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password1: String,
    pub password2: String,
}

/// Builds the session cookie carrying an opaque `id|source` value.
fn session_cookie(value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, value);
    cookie.set_http_only(true);
    cookie.set_same_site(tower_cookies::cookie::SameSite::Lax);
    cookie.set_path("/");
    cookie.set_expires(OffsetDateTime::now_utc() + Duration::hours(SESSION_TTL_HOURS));
    cookie
}

/// Builds the replacement cookie that logs a browser out: empty value,
/// expiry one year in the past.
fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie.set_expires(OffsetDateTime::now_utc() - Duration::days(365));
    cookie
}

fn user_agent(headers: &HeaderMap) -> &str {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Handles POST /register.
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    tracing::info!("📝 Register attempt: {}", form.email);

    let user = state
        .auth
        .register(&form.email, &form.password1, &form.password2)
        .await?;

    Ok((StatusCode::CREATED, Json(user)).into_response())
}

/// Handles POST /login.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    tracing::info!("🔐 Login attempt: {}", form.email);

    let cookie_value = state
        .auth
        .login(
            &form.email,
            &form.password,
            &addr.ip().to_string(),
            user_agent(&headers),
        )
        .await?;

    cookies.add(session_cookie(cookie_value));
    tracing::info!("✅ Session cookie added");

    Ok(Redirect::to("/admin").into_response())
}

/// Handles GET /logout.
///
/// The cookie is expired no matter what the server-side invalidation does;
/// logout never fails visibly.
#[axum::debug_handler]
pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> Response {
    if let Some(cookie) = cookies.get(SESSION_COOKIE) {
        state.auth.logout(cookie.value()).await;
    }

    cookies.add(expired_session_cookie());
    tracing::info!("👋 User logged out");

    Redirect::to("/login").into_response()
}

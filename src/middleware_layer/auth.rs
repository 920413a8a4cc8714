use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_cookies::Cookies;

use crate::state::AppState;

/// The name of the session cookie.
pub const SESSION_COOKIE: &str = "marginalia_session";

/// A middleware that gates admin routes behind a valid session.
///
/// A missing, malformed or unmatched cookie redirects to the login page;
/// none of those are faults. On success the owning credential is placed in
/// the request extensions for handlers to scope their work to.
pub async fn session_check(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(cookie) = cookies.get(SESSION_COOKIE) else {
        tracing::debug!("❌ No session cookie found");
        return Redirect::to("/login").into_response();
    };

    match state.auth.require_session(cookie.value()).await {
        Ok(user) => {
            tracing::debug!("✅ Session valid for user: {}", user.id);
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!("❌ Session check failed: {}", e);
            Redirect::to("/login").into_response()
        }
    }
}

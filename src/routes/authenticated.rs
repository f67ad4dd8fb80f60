use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Routes for any signed-in user. The router is wrapped in `auth_middleware`, so a
/// request without a valid session is answered 401 before a handler runs.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /api/auth/session
        // The identity behind the current session cookie.
        .route("/api/auth/session", get(handlers::get_session))
        // POST /api/auth/check-admin
        // Admin allowlist membership of the current session.
        .route("/api/auth/check-admin", post(handlers::check_admin))
}

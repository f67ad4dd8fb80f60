use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session. Content handlers query the published
/// listings only, so drafts cannot leak through this router.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check for the load balancer.
        .route("/health", get(|| async { "ok" }))
        // --- Content ---
        .route("/api/services", get(handlers::list_services))
        .route("/api/services/{slug}", get(handlers::get_service_by_slug))
        .route("/api/growth-blueprints", get(handlers::list_blueprints))
        .route(
            "/api/growth-blueprints/{slug}",
            get(handlers::get_blueprint_by_slug),
        )
        .route("/api/about", get(handlers::list_about_sections))
        // POST /api/contact
        // Contact Intake. The only public write path.
        .route("/api/contact", post(handlers::submit_contact))
        // --- Session ---
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/logout", post(handlers::logout))
        // --- Diagnostics ---
        .route("/api/check-config", get(handlers::check_config))
        .route("/api/check-db-connection", get(handlers::check_db_connection))
}

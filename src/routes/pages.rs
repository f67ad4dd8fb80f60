use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Pages
///
/// Payloads for the marketing pages. Listing pages substitute built-in content when
/// the store has nothing to show; single-item pages never do.
pub fn public_pages() -> Router<AppState> {
    Router::new()
        .route("/pages/home", get(handlers::home_page))
        .route("/pages/services", get(handlers::services_page))
        .route("/pages/services/{slug}", get(handlers::service_page))
        .route("/pages/growth-blueprints", get(handlers::blueprints_page))
        .route(
            "/pages/growth-blueprints/{slug}",
            get(handlers::blueprint_page),
        )
        .route("/pages/about", get(handlers::about_page))
        .route("/unauthorized", get(handlers::unauthorized_page))
}

/// Admin Pages
///
/// Must be wrapped in a `guard::admin_guard` layer (not a route layer) so the fallback
/// is guarded too: an unknown `/admin/...` path redirects like a known one. Handlers
/// here trust that the requester was already admitted.
pub fn admin_pages() -> Router<AppState> {
    Router::new()
        .route("/admin", get(handlers::admin_index))
        .route("/admin/login", get(handlers::login_page))
        .route("/admin/dashboard", get(handlers::dashboard_page))
        .route("/admin/services", get(handlers::admin_services_page))
        .route("/admin/services/{id}", get(handlers::admin_service_page))
        .route(
            "/admin/growth-blueprints",
            get(handlers::admin_blueprints_page),
        )
        .route(
            "/admin/growth-blueprints/{id}",
            get(handlers::admin_blueprint_page),
        )
        .route("/admin/contacts", get(handlers::admin_contacts_page))
        .fallback(handlers::not_found_page)
}

use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch, post, put},
};

/// Admin Router Module
///
/// CMS endpoints, nested under `/api/admin`. Each handler takes the `AdminUser`
/// extractor, which re-checks the allowlist on every request: 401 without a
/// session, 403 for a session that is not an admin.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /api/admin/dashboard
        .route("/dashboard", get(handlers::admin_dashboard))
        // --- Services ---
        .route(
            "/services",
            get(handlers::admin_list_services).post(handlers::admin_create_service),
        )
        .route(
            "/services/{id}",
            get(handlers::admin_get_service)
                .put(handlers::admin_update_service)
                .delete(handlers::admin_delete_service),
        )
        // POST /api/admin/services/{id}/toggle-published
        // Flips visibility in a single statement; concurrent toggles never lose an update.
        .route(
            "/services/{id}/toggle-published",
            post(handlers::admin_toggle_service),
        )
        // --- Growth Blueprints ---
        .route(
            "/growth-blueprints",
            get(handlers::admin_list_blueprints).post(handlers::admin_create_blueprint),
        )
        .route(
            "/growth-blueprints/{id}",
            get(handlers::admin_get_blueprint)
                .put(handlers::admin_update_blueprint)
                .delete(handlers::admin_delete_blueprint),
        )
        .route(
            "/growth-blueprints/{id}/toggle-published",
            post(handlers::admin_toggle_blueprint),
        )
        // --- Contact Submissions ---
        .route("/contacts", get(handlers::admin_list_contacts))
        .route(
            "/contacts/{id}",
            get(handlers::admin_get_contact).delete(handlers::admin_delete_contact),
        )
        .route(
            "/contacts/{id}/status",
            patch(handlers::admin_update_contact_status),
        )
        // --- About Page ---
        .route(
            "/about",
            get(handlers::admin_list_about_sections).post(handlers::admin_create_about_section),
        )
        .route(
            "/about/{id}",
            put(handlers::admin_update_about_section).delete(handlers::admin_delete_about_section),
        )
}

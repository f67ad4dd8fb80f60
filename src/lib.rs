use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod fallback;
pub mod guard;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod repository;
pub mod session;
pub mod validation;

// Routing segregation (Public, Authenticated, Admin API, Pages).
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, pages, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use memory::InMemoryRepository;
pub use repository::{PostgresRepository, RepositoryState};
pub use session::{MockSessionStore, SessionStoreState, SupabaseAuthClient};

/// ApiDoc
///
/// OpenAPI document for every JSON endpoint, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_services, handlers::get_service_by_slug, handlers::list_blueprints,
        handlers::get_blueprint_by_slug, handlers::list_about_sections, handlers::submit_contact,
        handlers::login, handlers::logout, handlers::get_session, handlers::check_admin,
        handlers::check_config, handlers::check_db_connection,
        handlers::admin_list_services, handlers::admin_get_service, handlers::admin_create_service,
        handlers::admin_update_service, handlers::admin_delete_service, handlers::admin_toggle_service,
        handlers::admin_list_blueprints, handlers::admin_get_blueprint, handlers::admin_create_blueprint,
        handlers::admin_update_blueprint, handlers::admin_delete_blueprint, handlers::admin_toggle_blueprint,
        handlers::admin_list_contacts, handlers::admin_get_contact, handlers::admin_update_contact_status,
        handlers::admin_delete_contact, handlers::admin_list_about_sections,
        handlers::admin_create_about_section, handlers::admin_update_about_section,
        handlers::admin_delete_about_section, handlers::admin_dashboard,
        handlers::home_page, handlers::services_page, handlers::service_page,
        handlers::blueprints_page, handlers::blueprint_page, handlers::about_page,
        handlers::unauthorized_page, handlers::login_page, handlers::dashboard_page,
        handlers::admin_services_page, handlers::admin_service_page, handlers::admin_blueprints_page,
        handlers::admin_blueprint_page, handlers::admin_contacts_page
    ),
    components(
        schemas(
            models::Service, models::GrowthBlueprint, models::ContactSubmission, models::ContactStatus,
            models::AboutPageSection, models::Admin, models::ServiceInput, models::ServiceChanges,
            models::BlueprintInput, models::BlueprintChanges, models::ContactRequest,
            models::ContactStatusUpdate, models::AboutSectionInput, models::AboutSectionChanges,
            models::LoginRequest, models::LoginResponse, models::SessionUser, models::AdminCheckResponse,
            models::PublishedState, models::ContactCreated, models::DashboardSummary,
            models::ConfigReport, models::DbConnectionReport, models::ContentSource,
            models::ServicesPage, models::BlueprintsPage, models::AboutPage, models::HomePage,
            models::LoginPage, models::UnauthorizedPage, models::SortField,
            validation::FieldError,
        )
    ),
    tags(
        (name = "fusion-focus", description = "Fusion Focus content and admin API")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// Unified, immutable application state shared by every request. Holds no per-user
/// data: identity is resolved per request by the extractors in `auth`.
#[derive(Clone)]
pub struct AppState {
    /// Content Tables: Postgres in production, in-memory in tests.
    pub repo: RepositoryState,
    /// Session Store client used by sign-in and sign-out.
    pub sessions: SessionStoreState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for SessionStoreState {
    fn from_ref(app_state: &AppState) -> SessionStoreState {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Enforces a session on the authenticated routes. The `AuthUser` extractor rejects
/// with 401 before the handler runs.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing structure, applies the scoped access layers and the global
/// observability stack, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(pages::public_pages())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        // Admin API: the AdminUser extractor in each handler answers 401/403.
        .nest("/api/admin", admin::admin_routes())
        // Admin pages: the Route Guard redirects instead of answering with an error.
        // Its fallback becomes the router's, so unmatched paths pass the guard as well.
        .merge(pages::admin_pages().layer(middleware::from_fn_with_state(
            state.clone(),
            guard::admin_guard,
        )))
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for `TraceLayer` carrying the `x-request-id`, so every log line of a request
/// can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}

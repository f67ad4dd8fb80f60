use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use fusion_focus::{
    AppState, InMemoryRepository, MockSessionStore,
    auth::{AccessLevel, Claims},
    config::{AppConfig, Env},
    create_router,
    guard::{GuardDecision, decide},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};
use tower::util::ServiceExt;
use uuid::Uuid;

const ADMIN_EMAIL: &str = "owner@fusionfocus.co";

// --- Pure decision table ---

#[test]
fn test_anonymous_is_sent_to_login_with_return_path() {
    assert_eq!(
        decide(AccessLevel::Anonymous, "/admin/services"),
        GuardDecision::RedirectToLogin {
            return_to: "/admin/services".to_string()
        }
    );
    assert_eq!(
        decide(AccessLevel::Anonymous, "/admin"),
        GuardDecision::RedirectToLogin {
            return_to: "/admin".to_string()
        }
    );
}

#[test]
fn test_anonymous_may_open_login() {
    assert_eq!(decide(AccessLevel::Anonymous, "/admin/login"), GuardDecision::Allow);
}

#[test]
fn test_any_session_on_login_goes_to_dashboard() {
    assert_eq!(
        decide(AccessLevel::AuthenticatedAdmin, "/admin/login"),
        GuardDecision::RedirectToDashboard
    );
    assert_eq!(
        decide(AccessLevel::AuthenticatedNonAdmin, "/admin/login"),
        GuardDecision::RedirectToDashboard
    );
}

#[test]
fn test_only_the_exact_login_path_is_the_login_page() {
    assert_eq!(
        decide(AccessLevel::AuthenticatedAdmin, "/admin/login/reset"),
        GuardDecision::Allow
    );
    assert_eq!(
        decide(AccessLevel::AuthenticatedNonAdmin, "/admin/login/reset"),
        GuardDecision::RedirectToUnauthorized
    );
    assert_eq!(
        decide(AccessLevel::Anonymous, "/admin/login/reset"),
        GuardDecision::RedirectToLogin {
            return_to: "/admin/login/reset".to_string()
        }
    );
}

#[test]
fn test_non_admin_is_sent_to_unauthorized() {
    assert_eq!(
        decide(AccessLevel::AuthenticatedNonAdmin, "/admin/dashboard"),
        GuardDecision::RedirectToUnauthorized
    );
}

#[test]
fn test_admin_is_allowed_everywhere() {
    for path in ["/admin", "/admin/dashboard", "/admin/contacts", "/admin/services/abc"] {
        assert_eq!(decide(AccessLevel::AuthenticatedAdmin, path), GuardDecision::Allow);
    }
}

#[test]
fn test_non_admin_paths_are_not_guarded() {
    assert_eq!(decide(AccessLevel::Anonymous, "/pages/home"), GuardDecision::Allow);
    assert_eq!(decide(AccessLevel::Anonymous, "/administrator"), GuardDecision::Allow);
}

#[test]
fn test_login_location_carries_redirect_param() {
    let decision = GuardDecision::RedirectToLogin {
        return_to: "/admin/growth-blueprints".to_string(),
    };
    assert_eq!(
        decision.location("https://fusionfocus.co").as_deref(),
        Some("https://fusionfocus.co/admin/login?redirectTo=%2Fadmin%2Fgrowth-blueprints")
    );
    assert_eq!(GuardDecision::Allow.location("https://fusionfocus.co"), None);
}

// --- Middleware through the router ---

fn token_for(config: &AppConfig, email: &str) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;
    let claims = Claims {
        sub: Uuid::new_v4(),
        email: email.to_string(),
        exp: now + 3600,
        iat: now,
        aud: "authenticated".to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .unwrap()
}

async fn app_state() -> AppState {
    let repo = InMemoryRepository::new();
    repo.add_admin(ADMIN_EMAIL).await;
    AppState {
        repo: Arc::new(repo),
        sessions: Arc::new(MockSessionStore::new(ADMIN_EMAIL, "pw", "token")),
        config: AppConfig {
            env: Env::Production,
            ..AppConfig::default()
        },
    }
}

fn page_request(path: &str, cookie: Option<String>) -> Request<Body> {
    let mut builder = Request::builder().uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn location(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn test_anonymous_dashboard_redirects_to_login() {
    let state = app_state().await;
    let app = create_router(state);

    let response = app
        .oneshot(page_request("/admin/dashboard", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        location(&response),
        "http://localhost:3000/admin/login?redirectTo=%2Fadmin%2Fdashboard"
    );
}

#[tokio::test]
async fn test_non_admin_dashboard_redirects_to_unauthorized() {
    let state = app_state().await;
    let cookie = format!(
        "{}={}",
        state.config.session_cookie,
        token_for(&state.config, "visitor@client.io")
    );
    let app = create_router(state);

    let response = app
        .oneshot(page_request("/admin/dashboard", Some(cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "http://localhost:3000/unauthorized");
}

#[tokio::test]
async fn test_admin_reaches_dashboard() {
    let state = app_state().await;
    let cookie = format!(
        "{}={}",
        state.config.session_cookie,
        token_for(&state.config, ADMIN_EMAIL)
    );
    let app = create_router(state);

    let response = app
        .oneshot(page_request("/admin/dashboard", Some(cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_signed_in_login_page_redirects_to_dashboard() {
    let state = app_state().await;
    let cookie = format!(
        "{}={}",
        state.config.session_cookie,
        token_for(&state.config, ADMIN_EMAIL)
    );
    let app = create_router(state);

    let response = app
        .oneshot(page_request("/admin/login", Some(cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "http://localhost:3000/admin/dashboard");
}

#[tokio::test]
async fn test_anonymous_login_page_echoes_return_path() {
    let app = create_router(app_state().await);

    let response = app
        .oneshot(page_request("/admin/login?redirectTo=/admin/contacts", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let page: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(page["redirect_to"], "/admin/contacts");
}

#[tokio::test]
async fn test_store_outage_denies_admin_pages() {
    let state = app_state().await;
    let cookie = format!(
        "{}={}",
        state.config.session_cookie,
        token_for(&state.config, ADMIN_EMAIL)
    );
    let repo = InMemoryRepository::new_failing();
    let state = AppState {
        repo: Arc::new(repo),
        ..state
    };
    let app = create_router(state);

    let response = app
        .oneshot(page_request("/admin/services", Some(cookie)))
        .await
        .unwrap();

    assert_eq!(location(&response), "http://localhost:3000/unauthorized");
}

#[tokio::test]
async fn test_anonymous_unrouted_admin_path_redirects_to_login() {
    let app = create_router(app_state().await);

    let response = app
        .oneshot(page_request("/admin/settings", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        location(&response),
        "http://localhost:3000/admin/login?redirectTo=%2Fadmin%2Fsettings"
    );
}

#[tokio::test]
async fn test_unrouted_admin_paths_are_guarded() {
    let state = app_state().await;
    let visitor = format!(
        "{}={}",
        state.config.session_cookie,
        token_for(&state.config, "visitor@client.io")
    );
    let app = create_router(state);

    let response = app
        .clone()
        .oneshot(page_request("/admin/", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        location(&response),
        "http://localhost:3000/admin/login?redirectTo=%2Fadmin%2F"
    );

    let response = app
        .oneshot(page_request("/admin/contacts/123", Some(visitor)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "http://localhost:3000/unauthorized");
}

#[tokio::test]
async fn test_admin_gets_404_for_unrouted_admin_path() {
    let state = app_state().await;
    let cookie = format!(
        "{}={}",
        state.config.session_cookie,
        token_for(&state.config, ADMIN_EMAIL)
    );
    let app = create_router(state);

    let response = app
        .oneshot(page_request("/admin/settings", Some(cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unrouted_public_path_is_plain_404() {
    let app = create_router(app_state().await);

    let response = app
        .oneshot(page_request("/pages/nowhere", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().get(header::LOCATION).is_none());
}

#[tokio::test]
async fn test_signed_in_login_subpath_is_not_sent_to_dashboard() {
    let state = app_state().await;
    let cookie = format!(
        "{}={}",
        state.config.session_cookie,
        token_for(&state.config, ADMIN_EMAIL)
    );
    let app = create_router(state);

    let response = app
        .oneshot(page_request("/admin/login/reset", Some(cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

use axum::{
    extract::FromRequestParts,
    http::{Request, StatusCode, header, request::Parts},
    response::IntoResponse,
};
use fusion_focus::{
    AppState, InMemoryRepository, MockSessionStore,
    auth::{AccessLevel, AdminUser, AuthUser, Claims, Identity, MaybeIdentity, is_admin},
    config::{AppConfig, Env},
    repository::Repository,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};
use uuid::Uuid;

const ADMIN_EMAIL: &str = "owner@fusionfocus.co";

// --- Helpers ---

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

fn token_with(config: &AppConfig, email: &str, exp: usize, aud: &str) -> String {
    let claims = Claims {
        sub: Uuid::new_v4(),
        email: email.to_string(),
        exp,
        iat: now(),
        aud: aud.to_string(),
    };
    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

fn valid_token(config: &AppConfig, email: &str) -> String {
    token_with(config, email, now() + 3600, "authenticated")
}

async fn create_app_state(env: Env) -> AppState {
    let repo = InMemoryRepository::new();
    repo.add_admin(ADMIN_EMAIL).await;
    AppState {
        repo: Arc::new(repo),
        sessions: Arc::new(MockSessionStore::new(ADMIN_EMAIL, "pw", "token")),
        config: AppConfig {
            env,
            ..AppConfig::default()
        },
    }
}

fn parts_with(header_name: &str, value: &str) -> Parts {
    let request = Request::builder()
        .uri("/api/auth/session")
        .header(header_name, value)
        .body(())
        .unwrap();
    request.into_parts().0
}

fn bare_parts() -> Parts {
    Request::builder()
        .uri("/api/auth/session")
        .body(())
        .unwrap()
        .into_parts()
        .0
}

// --- Identity resolution ---

#[tokio::test]
async fn test_bearer_token_resolves_identity() {
    let state = create_app_state(Env::Production).await;
    let token = valid_token(&state.config, "someone@client.io");
    let mut parts = parts_with(header::AUTHORIZATION.as_str(), &format!("Bearer {token}"));

    let AuthUser(identity) = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .expect("valid token must authenticate");
    assert_eq!(identity.email, "someone@client.io");
}

#[tokio::test]
async fn test_session_cookie_resolves_identity() {
    let state = create_app_state(Env::Production).await;
    let token = valid_token(&state.config, "someone@client.io");
    let cookie = format!("{}={token}", state.config.session_cookie);
    let mut parts = parts_with(header::COOKIE.as_str(), &cookie);

    let MaybeIdentity(identity) = MaybeIdentity::from_request_parts(&mut parts, &state)
        .await
        .unwrap();
    assert_eq!(identity.map(|i| i.email).as_deref(), Some("someone@client.io"));
}

#[tokio::test]
async fn test_expired_token_is_anonymous() {
    let state = create_app_state(Env::Production).await;
    let token = token_with(&state.config, ADMIN_EMAIL, now() - 3600, "authenticated");
    let mut parts = parts_with(header::AUTHORIZATION.as_str(), &format!("Bearer {token}"));

    let result = AuthUser::from_request_parts(&mut parts, &state).await;
    assert_eq!(
        result.unwrap_err().into_response().status(),
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_wrong_audience_is_rejected() {
    let state = create_app_state(Env::Production).await;
    let token = token_with(&state.config, ADMIN_EMAIL, now() + 3600, "anon");
    let mut parts = parts_with(header::AUTHORIZATION.as_str(), &format!("Bearer {token}"));

    assert!(AuthUser::from_request_parts(&mut parts, &state).await.is_err());
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_rejected() {
    let state = create_app_state(Env::Production).await;
    let forged_config = AppConfig {
        jwt_secret: "not-the-project-secret".to_string(),
        ..AppConfig::default()
    };
    let token = valid_token(&forged_config, ADMIN_EMAIL);
    let mut parts = parts_with(header::AUTHORIZATION.as_str(), &format!("Bearer {token}"));

    assert!(AuthUser::from_request_parts(&mut parts, &state).await.is_err());
}

#[tokio::test]
async fn test_missing_session_is_401() {
    let state = create_app_state(Env::Production).await;
    let mut parts = bare_parts();

    let err = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_local_bypass_header() {
    let state = create_app_state(Env::Local).await;
    let mut parts = parts_with("x-user-email", ADMIN_EMAIL);

    let AdminUser(identity) = AdminUser::from_request_parts(&mut parts, &state)
        .await
        .expect("local bypass must resolve the seeded admin");
    assert_eq!(identity.email, ADMIN_EMAIL);
}

#[tokio::test]
async fn test_bypass_header_ignored_without_opt_in() {
    let mut state = create_app_state(Env::Local).await;
    state.config.dev_identity_bypass = false;
    let mut parts = parts_with("x-user-email", ADMIN_EMAIL);

    let err = AdminUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bypass_header_ignored_in_production() {
    let state = create_app_state(Env::Production).await;
    let mut parts = parts_with("x-user-email", ADMIN_EMAIL);

    let err = AdminUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_admin_session_is_403() {
    let state = create_app_state(Env::Production).await;
    let token = valid_token(&state.config, "visitor@client.io");
    let mut parts = parts_with(header::AUTHORIZATION.as_str(), &format!("Bearer {token}"));

    let err = AdminUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
}

// --- Authorization Check ---

#[tokio::test]
async fn test_is_admin_false_on_empty_allowlist() {
    let repo = InMemoryRepository::new();
    assert!(!is_admin(&repo, ADMIN_EMAIL).await);
}

#[tokio::test]
async fn test_is_admin_true_for_seeded_email_only() {
    let repo = InMemoryRepository::new();
    repo.add_admin(ADMIN_EMAIL).await;

    assert!(is_admin(&repo, ADMIN_EMAIL).await);
    assert!(is_admin(&repo, "  owner@fusionfocus.co ").await);
    assert!(!is_admin(&repo, "other@fusionfocus.co").await);
}

#[tokio::test]
async fn test_is_admin_false_for_malformed_input() {
    let repo = InMemoryRepository::new();
    repo.add_admin(ADMIN_EMAIL).await;

    for email in ["", "   ", "not-an-email", "@", "a@b@c", "owner @fusionfocus.co"] {
        assert!(!is_admin(&repo, email).await, "{email:?} must not be admin");
    }
}

#[tokio::test]
async fn test_is_admin_fails_closed_when_store_is_down() {
    let repo = InMemoryRepository::new();
    repo.add_admin(ADMIN_EMAIL).await;
    repo.set_failing(true);

    assert!(repo.count_admins().await.is_err());
    assert!(!is_admin(&repo, ADMIN_EMAIL).await);
}

#[tokio::test]
async fn test_access_level_resolution() {
    let repo = InMemoryRepository::new();
    repo.add_admin(ADMIN_EMAIL).await;

    let admin = Identity {
        user_id: Uuid::new_v4(),
        email: ADMIN_EMAIL.to_string(),
    };
    let visitor = Identity {
        user_id: Uuid::new_v4(),
        email: "visitor@client.io".to_string(),
    };

    assert_eq!(AccessLevel::resolve(&repo, None).await, AccessLevel::Anonymous);
    assert_eq!(
        AccessLevel::resolve(&repo, Some(&admin)).await,
        AccessLevel::AuthenticatedAdmin
    );
    assert_eq!(
        AccessLevel::resolve(&repo, Some(&visitor)).await,
        AccessLevel::AuthenticatedNonAdmin
    );
}

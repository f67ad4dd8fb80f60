use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    error::ApiError,
    repository::{Repository, RepositoryState},
    validation::looks_like_email,
};

/// Header accepted in `Env::Local` in place of a real session, when
/// `AppConfig::dev_identity_bypass` is on.
pub const DEV_IDENTITY_HEADER: &str = "x-user-email";

/// Claims
///
/// Payload of a session token issued by the Session Store. Tokens are HS256-signed
/// with the project's JWT secret and validated locally on every request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the Session Store's user id.
    pub sub: Uuid,
    /// Email the user signed in with. Admin membership is keyed on it.
    #[serde(default)]
    pub email: String,
    /// Expiration Time (exp): the token is rejected after this instant.
    pub exp: usize,
    #[serde(default)]
    pub iat: usize,
    /// Audience (aud): `authenticated` for signed-in users.
    #[serde(default)]
    pub aud: String,
}

/// Identity
///
/// The signed-in user resolved for one request. Never cached between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
}

/// decode_session_token
///
/// Verifies signature, expiry and audience of a session token.
pub fn decode_session_token(
    token: &str,
    config: &AppConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_audience(&[config.jwt_audience.as_str()]);

    decode::<Claims>(token, &decoding_key, &validation).map(|data| data.claims)
}

/// The raw session token of a request: the session cookie first, then a Bearer header.
fn session_token(headers: &HeaderMap, config: &AppConfig) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(&config.session_cookie) {
        return Some(cookie.value().to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// resolve_identity
///
/// Resolves who is making the request, or `None` for an anonymous visitor. An invalid
/// or expired token is treated as no session at all.
pub fn resolve_identity(headers: &HeaderMap, config: &AppConfig) -> Option<Identity> {
    // Local Development Bypass: trust the email header, opt-in and never in production.
    if config.identity_bypass_enabled() {
        if let Some(email) = headers
            .get(DEV_IDENTITY_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.trim().is_empty())
        {
            return Some(Identity {
                user_id: Uuid::nil(),
                email: email.trim().to_string(),
            });
        }
    }

    let token = session_token(headers, config)?;

    match decode_session_token(&token, config) {
        Ok(claims) => Some(Identity {
            user_id: claims.sub,
            email: claims.email,
        }),
        Err(e) => {
            match e.kind() {
                ErrorKind::ExpiredSignature => tracing::debug!("session token expired"),
                _ => tracing::debug!(error = %e, "session token rejected"),
            }
            None
        }
    }
}

/// is_admin
///
/// Authorization Check: true only when `email` has a row in the `admins` allowlist.
/// A malformed email is rejected without querying; a store failure is logged and
/// denies access.
pub async fn is_admin(repo: &dyn Repository, email: &str) -> bool {
    let email = email.trim();
    if !looks_like_email(email) {
        return false;
    }

    match repo.find_admin_by_email(email).await {
        Ok(admin) => admin.is_some(),
        Err(e) => {
            tracing::error!(error = %e, "admin lookup failed, denying access");
            false
        }
    }
}

/// AccessLevel
///
/// What the Route Guard knows about the requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    Anonymous,
    AuthenticatedNonAdmin,
    AuthenticatedAdmin,
}

impl AccessLevel {
    pub async fn resolve(repo: &dyn Repository, identity: Option<&Identity>) -> Self {
        match identity {
            None => AccessLevel::Anonymous,
            Some(identity) if is_admin(repo, &identity.email).await => {
                AccessLevel::AuthenticatedAdmin
            }
            Some(_) => AccessLevel::AuthenticatedNonAdmin,
        }
    }
}

/// MaybeIdentity Extractor
///
/// Optional session. Never rejects; anonymous requests get `MaybeIdentity(None)`.
#[derive(Debug, Clone)]
pub struct MaybeIdentity(pub Option<Identity>);

impl<S> FromRequestParts<S> for MaybeIdentity
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // The admin page guard has already resolved the identity for this request.
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(MaybeIdentity(Some(identity.clone())));
        }
        let config = AppConfig::from_ref(state);
        Ok(MaybeIdentity(resolve_identity(&parts.headers, &config)))
    }
}

/// AuthUser Extractor
///
/// Requires a valid session. Rejection: 401 `Not authenticated`.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let MaybeIdentity(identity) = match MaybeIdentity::from_request_parts(parts, state).await {
            Ok(identity) => identity,
            Err(never) => match never {},
        };
        identity.map(AuthUser).ok_or(ApiError::Unauthorized)
    }
}

/// AdminUser Extractor
///
/// Requires a valid session whose email is on the admin allowlist.
/// Rejection: 401 without a session, 403 for a non-admin session.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Identity);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(identity) = AuthUser::from_request_parts(parts, state).await?;
        let repo = RepositoryState::from_ref(state);

        if is_admin(repo.as_ref(), &identity.email).await {
            Ok(AdminUser(identity))
        } else {
            tracing::warn!(email = %identity.email, "non-admin session refused");
            Err(ApiError::Forbidden)
        }
    }
}

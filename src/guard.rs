//! Route Guard for the admin area.
//!
//! Every request under `/admin` is re-evaluated here: session, then allowlist, then
//! either pass through or redirect. The decision itself is a pure function so it can
//! be tested without HTTP.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use reqwest::Url;

use crate::{
    auth::{AccessLevel, resolve_identity},
    config::AppConfig,
    repository::RepositoryState,
};

pub const ADMIN_PREFIX: &str = "/admin";
pub const LOGIN_PATH: &str = "/admin/login";
pub const DASHBOARD_PATH: &str = "/admin/dashboard";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";
pub const RETURN_TO_PARAM: &str = "redirectTo";

/// GuardDecision
///
/// Outcome of the Route Guard for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Send an anonymous visitor to the login page, remembering where they were going.
    RedirectToLogin { return_to: String },
    RedirectToDashboard,
    RedirectToUnauthorized,
}

fn is_under(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

pub fn is_admin_path(path: &str) -> bool {
    is_under(path, ADMIN_PREFIX)
}

/// Exact match only: `/admin/login/anything` is an ordinary admin path.
pub fn is_login_path(path: &str) -> bool {
    path == LOGIN_PATH
}

/// decide
///
/// | access            | login page | other admin page |
/// |-------------------|------------|------------------|
/// | anonymous         | allow      | login + return   |
/// | signed in, any    | dashboard  |                  |
/// | signed in, member |            | allow            |
/// | signed in, other  |            | unauthorized     |
///
/// Paths outside `/admin` are always allowed.
pub fn decide(access: AccessLevel, path: &str) -> GuardDecision {
    if !is_admin_path(path) {
        return GuardDecision::Allow;
    }

    match (access, is_login_path(path)) {
        (AccessLevel::Anonymous, true) => GuardDecision::Allow,
        (AccessLevel::Anonymous, false) => GuardDecision::RedirectToLogin {
            return_to: path.to_string(),
        },
        (_, true) => GuardDecision::RedirectToDashboard,
        (AccessLevel::AuthenticatedAdmin, false) => GuardDecision::Allow,
        (AccessLevel::AuthenticatedNonAdmin, false) => GuardDecision::RedirectToUnauthorized,
    }
}

impl GuardDecision {
    /// Absolute redirect target built from the site's base URL. `None` for `Allow`.
    pub fn location(&self, base_url: &str) -> Option<String> {
        let (path, return_to) = match self {
            GuardDecision::Allow => return None,
            GuardDecision::RedirectToLogin { return_to } => (LOGIN_PATH, Some(return_to.as_str())),
            GuardDecision::RedirectToDashboard => (DASHBOARD_PATH, None),
            GuardDecision::RedirectToUnauthorized => (UNAUTHORIZED_PATH, None),
        };

        let Some(mut url) = Url::parse(base_url).and_then(|base| base.join(path)).ok() else {
            tracing::warn!(%base_url, "BASE_URL is not absolute, redirecting relatively");
            return Some(match return_to {
                Some(return_to) => format!("{path}?{RETURN_TO_PARAM}={return_to}"),
                None => path.to_string(),
            });
        };
        if let Some(return_to) = return_to {
            url.query_pairs_mut().append_pair(RETURN_TO_PARAM, return_to);
        }
        Some(url.to_string())
    }
}

/// admin_guard
///
/// Middleware layered over the admin page routes and the router fallback. On `Allow`
/// the resolved identity is stored in the request extensions for the handlers;
/// otherwise the request never reaches them.
pub async fn admin_guard(
    State(repo): State<RepositoryState>,
    State(config): State<AppConfig>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    // Unmatched public paths arrive here through the fallback.
    if !is_admin_path(&path) {
        return next.run(request).await;
    }

    let identity = resolve_identity(request.headers(), &config);
    let access = AccessLevel::resolve(repo.as_ref(), identity.as_ref()).await;

    let decision = decide(access, &path);
    match decision.location(&config.base_url) {
        None => {
            if let Some(identity) = identity {
                request.extensions_mut().insert(identity);
            }
            next.run(request).await
        }
        Some(location) => {
            tracing::info!(%path, ?access, ?decision, "admin route redirected");
            Redirect::temporary(&location).into_response()
        }
    }
}

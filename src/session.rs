use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::{error::SessionError, models::SessionUser};

/// SessionTokens
///
/// Outcome of a successful password sign-in: the access token that becomes the
/// session cookie, and the user it was issued to.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access_token: String,
    pub user: SessionUser,
}

// 1. SessionStore Contract
/// SessionStore
///
/// Abstract contract over the hosted Session Store. Only the credential exchange and
/// revocation go over the network; validating a session token on each request is done
/// locally against the shared JWT secret (see `auth`).
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Exchanges email and password for a session. Wrong credentials are reported as
    /// [`SessionError::InvalidCredentials`].
    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionTokens, SessionError>;

    /// Revokes the session behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<(), SessionError>;
}

// 2. The Real Implementation (Supabase Auth)
/// SupabaseAuthClient
///
/// Talks to the GoTrue REST API of the hosted project. Every call carries the
/// project's public `apikey`.
#[derive(Clone)]
pub struct SupabaseAuthClient {
    http: Client,
    base_url: String,
    anon_key: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    user: TokenUser,
}

#[derive(Deserialize)]
struct TokenUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

impl SupabaseAuthClient {
    pub fn new(supabase_url: &str, anon_key: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: supabase_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        }
    }
}

#[async_trait]
impl SessionStore for SupabaseAuthClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionTokens, SessionError> {
        let response = self
            .http
            .post(format!("{}/auth/v1/token", self.base_url))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let body: TokenResponse = response.json().await?;
                Ok(SessionTokens {
                    access_token: body.access_token,
                    user: SessionUser {
                        id: body.user.id,
                        email: body.user.email.unwrap_or_else(|| email.to_string()),
                    },
                })
            }
            // GoTrue answers a bad password with 400 `invalid_grant`.
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                Err(SessionError::InvalidCredentials)
            }
            status => Err(SessionError::Upstream(format!("sign-in returned {status}"))),
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), SessionError> {
        let response = self
            .http
            .post(format!("{}/auth/v1/logout", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            // An already-expired token has nothing left to revoke.
            Ok(())
        } else {
            Err(SessionError::Upstream(format!("sign-out returned {status}")))
        }
    }
}

// 3. The Mock Implementation (For Tests)
/// MockSessionStore
///
/// Accepts exactly one set of credentials and hands back a fixed token. Lets the
/// login and logout handlers be exercised without a network connection.
#[derive(Clone)]
pub struct MockSessionStore {
    pub user: SessionUser,
    pub password: String,
    pub access_token: String,
    /// When true, all operations return a simulated upstream failure.
    pub should_fail: bool,
}

impl MockSessionStore {
    pub fn new(email: &str, password: &str, access_token: &str) -> Self {
        Self {
            user: SessionUser {
                id: Uuid::new_v4(),
                email: email.to_string(),
            },
            password: password.to_string(),
            access_token: access_token.to_string(),
            should_fail: false,
        }
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new("nobody@example.com", "", "")
        }
    }
}

#[async_trait]
impl SessionStore for MockSessionStore {
    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionTokens, SessionError> {
        if self.should_fail {
            return Err(SessionError::Upstream("Mock Session Error: Simulation requested".to_string()));
        }
        if email != self.user.email || password != self.password {
            return Err(SessionError::InvalidCredentials);
        }
        Ok(SessionTokens {
            access_token: self.access_token.clone(),
            user: self.user.clone(),
        })
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), SessionError> {
        if self.should_fail {
            return Err(SessionError::Upstream("Mock Session Error: Simulation requested".to_string()));
        }
        Ok(())
    }
}

/// SessionStoreState
///
/// The concrete type used to share the Session Store client across the application state.
pub type SessionStoreState = Arc<dyn SessionStore>;

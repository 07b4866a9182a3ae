//! Email/password authentication and session handling

mod session;
mod types;

use log::{info, warn};
use reqwest::Client;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{Error, Result};
use crate::fetch::Fetch;

pub use session::*;
pub use types::*;

/// Shortest password the sign up form accepts
pub const MIN_PASSWORD_LEN: usize = 6;

/// Client for the hosted auth service
#[derive(Clone)]
pub struct Auth {
    /// The base URL for the project
    url: String,

    /// The anonymous API key for the project
    key: String,

    /// HTTP client used for requests
    client: Client,

    /// The current session
    session: Arc<RwLock<Option<Session>>>,

    /// Refresh an expired session before handing it out
    auto_refresh_token: bool,
}

impl Auth {
    /// Create a new Auth client
    pub(crate) fn new(url: &str, key: &str, client: Client, auto_refresh_token: bool) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            client,
            session: Arc::new(RwLock::new(None)),
            auto_refresh_token,
        }
    }

    fn get_auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.url, path)
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Session>> {
        self.session.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Session>> {
        self.session.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Sign up a new user with email and password
    pub async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpOutcome> {
        if credentials.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::validation(
                "password",
                format!("must be at least {} characters long", MIN_PASSWORD_LEN),
            ));
        }

        let url = self.get_auth_url("/signup");
        let response = Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .json(credentials)?
            .execute::<AuthResponse>()
            .await
            .map_err(rejected)?;

        let outcome = response
            .into_outcome()
            .ok_or_else(|| Error::auth("Signup failed. Email may already be registered."))?;

        match &outcome {
            SignUpOutcome::SignedIn(session) => {
                info!("signed up and signed in as {}", session.user_id());
                *self.write() = Some(session.clone());
            }
            SignUpOutcome::ConfirmationRequired(user) => {
                info!("signed up {}, email confirmation pending", user.id);
            }
        }

        Ok(outcome)
    }

    /// Sign in a user with email and password
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<Session> {
        let url = self.get_auth_url("/token?grant_type=password");
        let session = self.token_request(&url, credentials).await?;
        info!("signed in as {}", session.user_id());
        *self.write() = Some(session.clone());
        Ok(session)
    }

    /// Exchange the stored refresh token for a new session
    pub async fn refresh_session(&self) -> Result<Session> {
        let refresh_token = self
            .get_session()
            .map(|s| s.refresh_token)
            .ok_or(Error::AuthRequired)?;

        let url = self.get_auth_url("/token?grant_type=refresh_token");
        let body = serde_json::json!({ "refresh_token": refresh_token });
        let session = self.token_request(&url, &body).await?;
        *self.write() = Some(session.clone());
        Ok(session)
    }

    async fn token_request<B: serde::Serialize>(&self, url: &str, body: &B) -> Result<Session> {
        let response = Fetch::post(&self.client, url)
            .header("apikey", &self.key)
            .json(body)?
            .execute::<AuthResponse>()
            .await
            .map_err(rejected)?;

        match response.into_outcome() {
            Some(SignUpOutcome::SignedIn(session)) => Ok(session),
            _ => Err(Error::auth("User not found")),
        }
    }

    /// Sign out the current user
    pub async fn sign_out(&self) -> Result<()> {
        let token = self
            .get_session()
            .map(|s| s.access_token)
            .ok_or(Error::AuthRequired)?;

        let url = self.get_auth_url("/logout");
        Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .bearer_auth(&token)
            .execute_empty()
            .await?;

        *self.write() = None;
        info!("signed out");
        Ok(())
    }

    /// Get the current session
    pub fn get_session(&self) -> Option<Session> {
        self.read().clone()
    }

    /// Set the session
    pub fn set_session(&self, session: Session) {
        *self.write() = Some(session);
    }

    /// Drop the local session without calling the server
    pub fn clear_session(&self) {
        *self.write() = None;
    }

    /// The session every table call needs.
    ///
    /// An expired session is refreshed when auto refresh is on; otherwise, or
    /// when the refresh fails, the caller is not logged in.
    pub async fn require_session(&self) -> Result<Session> {
        let session = self.get_session().ok_or(Error::AuthRequired)?;
        if !session.is_expired() {
            return Ok(session);
        }
        if !self.auto_refresh_token {
            return Err(Error::AuthRequired);
        }
        match self.refresh_session().await {
            Ok(session) => Ok(session),
            Err(e) => {
                warn!("session refresh failed: {}", e);
                Err(Error::AuthRequired)
            }
        }
    }
}

/// Auth endpoints reject bad credentials with a 4xx body worth showing.
fn rejected(err: Error) -> Error {
    match err {
        Error::Api { status, message } if status.is_client_error() => {
            let detail = serde_json::from_str::<serde_json::Value>(&message)
                .ok()
                .and_then(|v| {
                    ["error_description", "msg", "message"]
                        .iter()
                        .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_string))
                })
                .unwrap_or(message);
            Error::Auth(detail)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_extracts_description() {
        let err = rejected(Error::Api {
            status: reqwest::StatusCode::BAD_REQUEST,
            message: r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#
                .to_string(),
        });
        assert_eq!(err.to_string(), "Authentication error: Invalid login credentials");
    }

    #[test]
    fn rejected_keeps_server_errors() {
        let err = rejected(Error::Api {
            status: reqwest::StatusCode::BAD_GATEWAY,
            message: "upstream".to_string(),
        });
        assert!(matches!(err, Error::Api { .. }));
    }

    #[tokio::test]
    async fn short_password_never_reaches_server() {
        let auth = Auth::new("http://127.0.0.1:9", "key", Client::new(), true);
        let err = auth
            .sign_up(&Credentials::new("a@example.com", "12345"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { field: "password", .. }));
    }

    #[tokio::test]
    async fn require_session_without_sign_in() {
        let auth = Auth::new("http://127.0.0.1:9", "key", Client::new(), true);
        assert!(matches!(
            auth.require_session().await,
            Err(Error::AuthRequired)
        ));
    }
}

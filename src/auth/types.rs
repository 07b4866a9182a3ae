//! Types for authentication

use serde::{Deserialize, Serialize};

use super::session::Session;

/// User data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// The user ID
    pub id: String,

    /// The user's email address
    #[serde(default)]
    pub email: Option<String>,

    /// The user's role
    #[serde(default)]
    pub role: Option<String>,
}

/// Email/password credentials
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
        }
    }
}

/// Raw response of the sign up and token endpoints.
///
/// Sign up answers with a bare user object when email confirmation is
/// pending, and with a full token payload otherwise.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AuthResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl AuthResponse {
    pub fn into_outcome(self) -> Option<SignUpOutcome> {
        match (self.access_token, self.refresh_token, self.user) {
            (Some(access_token), Some(refresh_token), Some(user)) => {
                let session = Session {
                    access_token,
                    refresh_token,
                    token_type: self.token_type.unwrap_or_else(|| "bearer".to_string()),
                    expires_in: self.expires_in.unwrap_or(3600),
                    expires_at: self.expires_at,
                    user,
                };
                Some(SignUpOutcome::SignedIn(session.stamped()))
            }
            (_, _, Some(user)) => Some(SignUpOutcome::ConfirmationRequired(user)),
            (_, _, None) => self.id.map(|id| {
                SignUpOutcome::ConfirmationRequired(User {
                    id,
                    email: self.email,
                    role: None,
                })
            }),
        }
    }
}

/// Result of a sign up
#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    /// The account is active and a session was opened
    SignedIn(Session),
    /// The account must be confirmed by email before signing in
    ConfirmationRequired(User),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn token_payload_opens_session() {
        let response: AuthResponse = serde_json::from_value(json!({
            "access_token": "at",
            "refresh_token": "rt",
            "token_type": "bearer",
            "expires_in": 3600,
            "user": { "id": "u1", "email": "a@example.com" }
        }))
        .unwrap();
        match response.into_outcome() {
            Some(SignUpOutcome::SignedIn(session)) => {
                assert_eq!(session.user_id(), "u1");
                assert!(session.expires_at.is_some());
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn bare_user_needs_confirmation() {
        let response: AuthResponse = serde_json::from_value(json!({
            "id": "u1",
            "email": "a@example.com",
            "confirmation_sent_at": "2024-05-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(
            response.into_outcome(),
            Some(SignUpOutcome::ConfirmationRequired(User {
                id: "u1".to_string(),
                email: Some("a@example.com".to_string()),
                role: None,
            }))
        );
    }
}

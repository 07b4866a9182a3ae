//! Error handling for the spendwise client

use std::fmt;
use thiserror::Error;

/// Unified error type for the spendwise client
#[derive(Error, Debug)]
pub enum Error {
    /// No active session for an operation that needs one
    #[error("Not logged in")]
    AuthRequired,

    /// Sign in or sign up rejected by the auth service
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Input rejected before any remote call was made
    #[error("Invalid {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: String,
    },

    /// Non-success response from the table store
    #[error("Database error: {message} (Status: {status})")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },

    /// The store answered but not with what the operation needs
    #[error("Database error: {0}")]
    Database(String),

    /// Update or delete matched no row owned by the session user
    #[error("Nothing changed: no transaction {id} for the current user")]
    NotFound { id: String },

    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new validation error for `field`
    pub fn validation<T: fmt::Display>(field: &'static str, reason: T) -> Self {
        Error::Validation {
            field,
            reason: reason.to_string(),
        }
    }

    /// Create a new database error
    pub fn database<T: fmt::Display>(msg: T) -> Self {
        Error::Database(msg.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Whether the failure happened talking to (or decoding from) the backend.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Error::Api { .. } | Error::Database(_) | Error::Http(_) | Error::Json(_) | Error::Url(_)
        )
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

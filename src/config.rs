//! Configuration for the spendwise client

use std::time::Duration;
use url::Url;

use crate::aggregate::ColorStrategy;
use crate::error::{Error, Result};
use crate::sync::ReconcileStrategy;

/// Project coordinates for the hosted backend.
#[derive(Debug, Clone)]
pub struct Config {
    pub url: Url,
    pub anon_key: String,
}

impl Config {
    /// Creates a new configuration, validating the URL.
    pub fn new(url_str: &str, anon_key: &str) -> Result<Self> {
        let url = Url::parse(url_str)?;
        if anon_key.is_empty() {
            return Err(Error::config("anon_key cannot be empty"));
        }
        Ok(Self {
            url,
            anon_key: anon_key.to_string(),
        })
    }

    /// Reads `SUPABASE_URL` and `SUPABASE_ANON_KEY` from the environment.
    pub fn from_env() -> Result<Self> {
        let url = std::env::var("SUPABASE_URL")
            .map_err(|_| Error::config("SUPABASE_URL environment variable not found"))?;
        let anon_key = std::env::var("SUPABASE_ANON_KEY")
            .map_err(|_| Error::config("SUPABASE_ANON_KEY environment variable not found"))?;
        Self::new(&url, &anon_key)
    }

    /// Base URL without the trailing slash `Url` adds to bare hosts.
    pub fn base_url(&self) -> String {
        self.url.as_str().trim_end_matches('/').to_string()
    }
}

/// Configuration options for the spendwise client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Automatically refresh an expired token
    pub auto_refresh_token: bool,

    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// The database schema
    pub db_schema: String,

    /// Table holding transaction rows
    pub transactions_table: String,

    /// Table holding category rows
    pub categories_table: String,

    /// How the cache follows successful mutations
    pub reconcile: ReconcileStrategy,

    /// Colour assignment for chart entries
    pub colors: ColorStrategy,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            auto_refresh_token: true,
            request_timeout: Some(Duration::from_secs(30)),
            db_schema: "public".to_string(),
            transactions_table: "transactions".to_string(),
            categories_table: "categories".to_string(),
            reconcile: ReconcileStrategy::default(),
            colors: ColorStrategy::default(),
        }
    }
}

impl ClientOptions {
    /// Set whether to automatically refresh the token
    pub fn with_auto_refresh_token(mut self, value: bool) -> Self {
        self.auto_refresh_token = value;
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the database schema
    pub fn with_db_schema(mut self, value: &str) -> Self {
        self.db_schema = value.to_string();
        self
    }

    /// Set the transactions table name
    pub fn with_transactions_table(mut self, value: &str) -> Self {
        self.transactions_table = value.to_string();
        self
    }

    /// Set the categories table name
    pub fn with_categories_table(mut self, value: &str) -> Self {
        self.categories_table = value.to_string();
        self
    }

    /// Set the reconcile strategy
    pub fn with_reconcile(mut self, value: ReconcileStrategy) -> Self {
        self.reconcile = value;
        self
    }

    /// Set the chart colour strategy
    pub fn with_colors(mut self, value: ColorStrategy) -> Self {
        self.colors = value;
        self
    }
}

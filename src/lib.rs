//! Spendwise client library
//!
//! Records a user's expenses in a hosted Supabase project and keeps a local,
//! observable copy of one calendar month for charting.

pub mod aggregate;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod model;
pub mod month;
pub mod postgrest;
pub mod store;
pub mod sync;

use log::warn;
use reqwest::Client;

use crate::auth::{Auth, Credentials, Session, SignUpOutcome};
use crate::cache::TransactionCache;
use crate::config::{ClientOptions, Config};
use crate::error::{Error, Result};
use crate::store::SupabaseStore;
use crate::sync::SyncController;

/// The main entry point for the spendwise client
pub struct Spendwise {
    /// Project coordinates
    pub config: Config,
    /// Client options
    pub options: ClientOptions,
    auth: Auth,
    sync: SyncController<SupabaseStore>,
}

impl Spendwise {
    /// Create a new client
    ///
    /// # Example
    ///
    /// ```
    /// use spendwise::Spendwise;
    ///
    /// let app = Spendwise::new("https://your-project-url.supabase.co", "your-anon-key").unwrap();
    /// assert!(app.auth().get_session().is_none());
    /// ```
    pub fn new(supabase_url: &str, supabase_key: &str) -> Result<Self> {
        Self::new_with_options(supabase_url, supabase_key, ClientOptions::default())
    }

    /// Create a new client with custom options
    ///
    /// # Example
    ///
    /// ```
    /// use spendwise::{Spendwise, config::ClientOptions, sync::ReconcileStrategy};
    ///
    /// let options = ClientOptions::default().with_reconcile(ReconcileStrategy::Refetch);
    /// let app = Spendwise::new_with_options(
    ///     "https://your-project-url.supabase.co",
    ///     "your-anon-key",
    ///     options,
    /// ).unwrap();
    /// assert_eq!(app.transactions().strategy(), ReconcileStrategy::Refetch);
    /// ```
    pub fn new_with_options(
        supabase_url: &str,
        supabase_key: &str,
        options: ClientOptions,
    ) -> Result<Self> {
        Self::with_config(Config::new(supabase_url, supabase_key)?, options)
    }

    /// Create a client from `SUPABASE_URL` and `SUPABASE_ANON_KEY`
    pub fn from_env(options: ClientOptions) -> Result<Self> {
        Self::with_config(Config::from_env()?, options)
    }

    pub fn with_config(config: Config, options: ClientOptions) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().map_err(Error::Http)?;

        let url = config.base_url();
        let auth = Auth::new(
            &url,
            &config.anon_key,
            http_client.clone(),
            options.auto_refresh_token,
        );
        let store = SupabaseStore::new(&url, &config.anon_key, http_client, auth.clone(), &options);
        let sync = SyncController::new(store, TransactionCache::new(), options.reconcile)
            .with_colors(options.colors.clone());

        Ok(Self {
            config,
            options,
            auth,
            sync,
        })
    }

    /// Get a reference to the auth client
    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// Get a reference to the transaction controller
    pub fn transactions(&self) -> &SyncController<SupabaseStore> {
        &self.sync
    }

    /// The cached transactions of the selected month
    pub fn cache(&self) -> &TransactionCache {
        self.sync.cache()
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        self.auth.sign_in(&Credentials::new(email, password)).await
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome> {
        self.auth.sign_up(&Credentials::new(email, password)).await
    }

    /// Sign out and forget the cached month.
    ///
    /// The local session and cache are dropped even when the server call
    /// fails; the error is still returned.
    pub async fn sign_out(&self) -> Result<()> {
        let result = self.auth.sign_out().await;
        if let Err(e) = &result {
            warn!("sign out request failed, clearing local state anyway: {}", e);
            self.auth.clear_session();
        }
        self.sync.cache().clear();
        result
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::aggregate::{CategoryTotal, ColorStrategy, MonthSummary, TransactionCard};
    pub use crate::auth::{Credentials, Session, SignUpOutcome};
    pub use crate::config::{ClientOptions, Config};
    pub use crate::error::{Error, Result};
    pub use crate::model::{Category, Transaction, TransactionInput, TransactionKind};
    pub use crate::month::MonthWindow;
    pub use crate::store::TransactionStore;
    pub use crate::sync::ReconcileStrategy;
    pub use crate::Spendwise;
}

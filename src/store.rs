//! The remote transaction table and its PostgREST implementation.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;

use crate::auth::{Auth, Session};
use crate::config::ClientOptions;
use crate::error::{Error, Result};
use crate::model::{
    Category, NewTransaction, OwnedRow, Transaction, CATEGORY_COLUMNS, TRANSACTION_COLUMNS,
};
use crate::month::MonthWindow;
use crate::postgrest::{PostgrestClient, SortOrder};

/// Durable storage for the signed-in user's transactions.
///
/// Every call is scoped to the session user. Update and delete filter on the
/// row id *and* the owner, so an id belonging to someone else matches
/// nothing.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Rows dated inside `window`, oldest first
    async fn select_month(&self, window: MonthWindow) -> Result<Vec<Transaction>>;

    /// Insert a row and return it as stored
    async fn insert(&self, row: &NewTransaction) -> Result<Transaction>;

    /// Overwrite a row. `None` when no owned row has `id`.
    async fn update(&self, id: &str, row: &NewTransaction) -> Result<Option<Transaction>>;

    /// Delete a row, returning how many rows went away (0 or 1)
    async fn delete(&self, id: &str) -> Result<usize>;

    /// All categories ordered by name
    async fn categories(&self) -> Result<Vec<Category>>;
}

/// [`TransactionStore`] backed by the project's PostgREST endpoint
#[derive(Clone)]
pub struct SupabaseStore {
    url: String,
    key: String,
    client: Client,
    auth: Auth,
    schema: String,
    transactions_table: String,
    categories_table: String,
}

impl SupabaseStore {
    pub(crate) fn new(url: &str, key: &str, client: Client, auth: Auth, options: &ClientOptions) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            client,
            auth,
            schema: options.db_schema.clone(),
            transactions_table: options.transactions_table.clone(),
            categories_table: options.categories_table.clone(),
        }
    }

    fn table(&self, table: &str, session: &Session) -> PostgrestClient {
        PostgrestClient::new(&self.url, &self.key, &self.schema, table, self.client.clone())
            .with_auth(&session.access_token)
    }

    fn transactions(&self, session: &Session) -> PostgrestClient {
        self.table(&self.transactions_table, session)
    }
}

#[async_trait]
impl TransactionStore for SupabaseStore {
    async fn select_month(&self, window: MonthWindow) -> Result<Vec<Transaction>> {
        let session = self.auth.require_session().await?;
        debug!("selecting transactions for {} ({})", session.user_id(), window);

        let rows = self
            .transactions(&session)
            .select(TRANSACTION_COLUMNS)
            .eq("user_id", session.user_id())
            .gte("date", window.start())
            .lt("date", window.end())
            .order("date", SortOrder::Ascending)
            .execute::<Transaction>()
            .await?;
        Ok(rows)
    }

    async fn insert(&self, row: &NewTransaction) -> Result<Transaction> {
        let session = self.auth.require_session().await?;
        let body = [OwnedRow {
            user_id: session.user_id(),
            fields: row,
        }];

        let mut created = self
            .transactions(&session)
            .insert(&body)
            .select(TRANSACTION_COLUMNS)
            .execute::<Transaction>()
            .await?;

        created
            .pop()
            .ok_or_else(|| Error::database("No transaction returned after insert"))
    }

    async fn update(&self, id: &str, row: &NewTransaction) -> Result<Option<Transaction>> {
        let session = self.auth.require_session().await?;

        let updated = self
            .transactions(&session)
            .update(row)
            .eq("id", id)
            .eq("user_id", session.user_id())
            .select(TRANSACTION_COLUMNS)
            .execute::<Transaction>()
            .await?;

        if updated.len() > 1 {
            warn!("update of {} touched {} rows", id, updated.len());
        }
        Ok(updated.into_iter().next())
    }

    async fn delete(&self, id: &str) -> Result<usize> {
        let session = self.auth.require_session().await?;

        let deleted = self
            .transactions(&session)
            .delete()
            .eq("id", id)
            .eq("user_id", session.user_id())
            .execute::<serde_json::Value>()
            .await?;

        Ok(deleted.len())
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        let session = self.auth.require_session().await?;

        let categories = self
            .table(&self.categories_table, &session)
            .select(CATEGORY_COLUMNS)
            .order("name", SortOrder::Ascending)
            .execute::<Category>()
            .await?;
        Ok(categories)
    }
}

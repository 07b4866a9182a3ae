//! Round-trips between the transaction store and the local cache.
//!
//! The controller owns the selected month. Reads replace the cache
//! wholesale; mutations either patch the cache with the row the server sent
//! back or reload the selected month, depending on [`ReconcileStrategy`].
//! A failed remote call never touches the cache.

use chrono::{Local, NaiveDate};
use log::{debug, info, warn};
use std::sync::{Mutex, MutexGuard};

use crate::aggregate::{ColorStrategy, MonthSummary};
use crate::cache::TransactionCache;
use crate::error::{Error, Result};
use crate::model::{Category, Transaction, TransactionInput, TransactionPatch};
use crate::month::MonthWindow;
use crate::store::TransactionStore;

/// How the cache follows a successful mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcileStrategy {
    /// Apply the returned row to the cache directly
    #[default]
    PatchCache,
    /// Reload the selected month from the store
    Refetch,
}

/// The local calendar date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub struct SyncController<S> {
    store: S,
    cache: TransactionCache,
    selected: Mutex<MonthWindow>,
    strategy: ReconcileStrategy,
    colors: ColorStrategy,
}

impl<S: TransactionStore> SyncController<S> {
    pub fn new(store: S, cache: TransactionCache, strategy: ReconcileStrategy) -> Self {
        Self {
            store,
            cache,
            selected: Mutex::new(MonthWindow::containing(today())),
            strategy,
            colors: ColorStrategy::default(),
        }
    }

    pub fn with_colors(mut self, colors: ColorStrategy) -> Self {
        self.colors = colors;
        self
    }

    pub fn cache(&self) -> &TransactionCache {
        &self.cache
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn strategy(&self) -> ReconcileStrategy {
        self.strategy
    }

    fn selected(&self) -> MutexGuard<'_, MonthWindow> {
        self.selected.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The month the cache currently mirrors
    pub fn selected_month(&self) -> MonthWindow {
        *self.selected()
    }

    /// Fetch the month containing `reference` and make it the cache contents.
    ///
    /// On failure the cache and the selected month keep their previous
    /// values.
    pub async fn load_month(&self, reference: NaiveDate) -> Result<Vec<Transaction>> {
        let window = MonthWindow::containing(reference);
        let rows = match self.store.select_month(window).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("failed to load transactions for {}: {}", window, e);
                return Err(e);
            }
        };

        debug!("loaded {} transactions for {}", rows.len(), window);
        *self.selected() = window;
        self.cache.replace_all(rows.clone());
        Ok(rows)
    }

    /// Reload the selected month
    pub async fn reload(&self) -> Result<Vec<Transaction>> {
        let window = self.selected_month();
        self.load_month(window.start()).await
    }

    /// Switch to the month containing `reference`
    pub async fn select_month(&self, reference: NaiveDate) -> Result<Vec<Transaction>> {
        self.load_month(reference).await
    }

    /// Step the month picker forward one month
    pub async fn next_month(&self) -> Result<Vec<Transaction>> {
        let window = self.selected_month().next();
        self.load_month(window.start()).await
    }

    /// Step the month picker back one month
    pub async fn previous_month(&self) -> Result<Vec<Transaction>> {
        let window = self.selected_month().previous();
        self.load_month(window.start()).await
    }

    /// After a mutation has landed, a failed reload leaves the cache stale
    /// but must not report the mutation itself as failed.
    async fn refetch_after(&self, action: &str) {
        if let Err(e) = self.reload().await {
            warn!("reload after {} failed, cache may be stale: {}", action, e);
        }
    }

    pub async fn create_transaction(&self, input: &TransactionInput) -> Result<Transaction> {
        let row = input.validate(today())?;

        let created = self.store.insert(&row).await.map_err(|e| {
            warn!("failed to save transaction: {}", e);
            e
        })?;
        info!("created transaction {}", created.id);

        match self.strategy {
            ReconcileStrategy::PatchCache => {
                if self.selected_month().contains(created.date) {
                    self.cache.append(created.clone());
                } else {
                    debug!("transaction {} is outside the selected month", created.id);
                }
            }
            ReconcileStrategy::Refetch => self.refetch_after("create").await,
        }

        Ok(created)
    }

    /// Overwrite every editable field of transaction `id`.
    pub async fn update_transaction(&self, id: &str, input: &TransactionInput) -> Result<Transaction> {
        let row = input.validate(today())?;

        let updated = match self.store.update(id, &row).await {
            Ok(Some(updated)) => updated,
            Ok(None) => {
                warn!("update of {} matched no row of the current user", id);
                return Err(Error::NotFound { id: id.to_string() });
            }
            Err(e) => {
                warn!("failed to update transaction {}: {}", id, e);
                return Err(e);
            }
        };
        info!("updated transaction {}", id);

        match self.strategy {
            ReconcileStrategy::PatchCache => {
                if !self.selected_month().contains(updated.date) {
                    self.cache.remove(id);
                } else if !self.cache.replace_one(id, &TransactionPatch::from(&updated)) {
                    self.cache.append(updated.clone());
                }
            }
            ReconcileStrategy::Refetch => self.refetch_after("update").await,
        }

        Ok(updated)
    }

    pub async fn delete_transaction(&self, id: &str) -> Result<()> {
        let deleted = self.store.delete(id).await.map_err(|e| {
            warn!("failed to delete transaction {}: {}", id, e);
            e
        })?;

        if deleted == 0 {
            warn!("delete of {} matched no row of the current user", id);
            return Err(Error::NotFound { id: id.to_string() });
        }
        info!("deleted transaction {}", id);

        self.cache.remove(id);
        if self.strategy == ReconcileStrategy::Refetch {
            self.refetch_after("delete").await;
        }
        Ok(())
    }

    /// Categories for the entry form, ordered by name
    pub async fn categories(&self) -> Result<Vec<Category>> {
        self.store.categories().await
    }

    /// Chart totals and cards for the cached month
    pub fn summary(&self) -> MonthSummary {
        let window = self.selected_month();
        self.cache
            .with(|transactions| MonthSummary::build(window, transactions, &self.colors))
    }
}

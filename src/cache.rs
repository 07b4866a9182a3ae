//! In-memory mirror of the selected month's transactions.

use std::sync::Arc;
use tokio::sync::watch;

use crate::model::{Transaction, TransactionPatch};

/// Shared, observable list of the current transactions.
///
/// Clones share the same list. Every write is applied synchronously, so a
/// read that follows a write always sees it; observers obtained from
/// [`TransactionCache::subscribe`] are notified of every change.
#[derive(Debug, Clone)]
pub struct TransactionCache {
    current: Arc<watch::Sender<Vec<Transaction>>>,
}

impl Default for TransactionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionCache {
    pub fn new() -> Self {
        let (current, _) = watch::channel(Vec::new());
        Self {
            current: Arc::new(current),
        }
    }

    /// Replace the whole list.
    pub fn replace_all(&self, transactions: Vec<Transaction>) {
        self.current.send_replace(transactions);
    }

    /// Add `transaction` after the existing entries.
    pub fn append(&self, transaction: Transaction) {
        self.current.send_modify(|list| list.push(transaction));
    }

    /// Drop the entry with `id`. Returns whether one was removed.
    pub fn remove(&self, id: &str) -> bool {
        self.current.send_if_modified(|list| {
            let before = list.len();
            list.retain(|t| t.id != id);
            list.len() != before
        })
    }

    /// Merge `patch` over the entry with `id`. Returns whether one matched.
    pub fn replace_one(&self, id: &str, patch: &TransactionPatch) -> bool {
        self.current.send_if_modified(|list| match list.iter_mut().find(|t| t.id == id) {
            Some(entry) => {
                entry.apply(patch);
                true
            }
            None => false,
        })
    }

    pub fn clear(&self) {
        self.current.send_replace(Vec::new());
    }

    /// A copy of the current list
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.current.borrow().clone()
    }

    pub fn get(&self, id: &str) -> Option<Transaction> {
        self.current.borrow().iter().find(|t| t.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.current.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.borrow().is_empty()
    }

    /// Run `f` against the current list without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&[Transaction]) -> R) -> R {
        f(&self.current.borrow())
    }

    /// Observe changes to the list
    pub fn subscribe(&self) -> watch::Receiver<Vec<Transaction>> {
        self.current.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TransactionKind;
    use chrono::NaiveDate;

    fn tx(id: &str, amount: f64) -> Transaction {
        Transaction {
            id: id.to_string(),
            user_id: "u1".to_string(),
            amount,
            kind: TransactionKind::Expense,
            category_id: None,
            category: None,
            date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            description: None,
        }
    }

    fn ids(cache: &TransactionCache) -> Vec<String> {
        cache.with(|list| list.iter().map(|t| t.id.clone()).collect())
    }

    #[test]
    fn replace_all_with_empty() {
        let cache = TransactionCache::new();
        cache.replace_all(vec![tx("a", 1.0)]);
        cache.replace_all(Vec::new());
        assert!(cache.is_empty());
        assert_eq!(cache.snapshot(), Vec::<Transaction>::new());
    }

    #[test]
    fn append_keeps_existing_order() {
        let cache = TransactionCache::new();
        cache.replace_all(vec![tx("a", 1.0), tx("b", 2.0)]);
        let before = cache.snapshot();

        cache.append(tx("c", 3.0));

        let after = cache.snapshot();
        assert_eq!(after.iter().filter(|t| t.id == "c").count(), 1);
        assert_eq!(&after[..2], &before[..]);
        assert_eq!(ids(&cache), vec!["a", "b", "c"]);
    }

    #[test]
    fn remove_miss_is_noop() {
        let cache = TransactionCache::new();
        cache.replace_all(vec![tx("a", 1.0), tx("b", 2.0)]);
        let before = cache.snapshot();

        assert!(!cache.remove("zzz"));
        assert_eq!(cache.snapshot(), before);

        assert!(cache.remove("a"));
        assert_eq!(ids(&cache), vec!["b"]);
    }

    #[test]
    fn replace_one_merges_patch() {
        let cache = TransactionCache::new();
        cache.replace_all(vec![tx("a", 1.0), tx("b", 2.0)]);

        let patch = TransactionPatch {
            amount: Some(9.0),
            ..Default::default()
        };
        assert!(cache.replace_one("b", &patch));
        assert_eq!(cache.get("b").unwrap().amount, 9.0);
        assert_eq!(cache.get("a").unwrap().amount, 1.0);

        assert!(!cache.replace_one("zzz", &patch));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn clones_share_state_and_clear() {
        let cache = TransactionCache::new();
        let view = cache.clone();
        cache.append(tx("a", 1.0));
        assert_eq!(view.len(), 1);
        view.clear();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn subscribers_see_writes() {
        let cache = TransactionCache::new();
        let mut rx = cache.subscribe();

        cache.append(tx("a", 1.0));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);

        assert!(!cache.remove("missing"));
        assert!(!rx.has_changed().unwrap());
    }
}

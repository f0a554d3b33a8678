use crate::models::{Transaction, VisitorData};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{PoisonError, RwLock};
use tracing::info;

// ── Repository ────────────────────────────────────────────────────────────────

/// Process-lifetime record store.
///
/// Transactions are fixed at construction. Visitor records are append-only:
/// imports go through `append_visitors`, which takes the single write lock, and
/// readers work on cloned snapshots.
pub struct Repository {
    transactions: Vec<Transaction>,
    visitors: RwLock<Vec<VisitorData>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryStats {
    pub transactions: usize,
    pub visitor_records: usize,
    pub first_transaction: Option<DateTime<Utc>>,
    pub last_transaction: Option<DateTime<Utc>>,
}

impl Repository {
    pub fn new(transactions: Vec<Transaction>, visitors: Vec<VisitorData>) -> Self {
        info!(
            "Repository ready: {} transactions, {} visitor records",
            transactions.len(),
            visitors.len()
        );
        Self {
            transactions,
            visitors: RwLock::new(visitors),
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Snapshot in insertion order.
    pub fn visitors(&self) -> Vec<VisitorData> {
        self.visitors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Snapshot sorted by date, newest first. Equal dates keep insertion order.
    pub fn visitors_newest_first(&self) -> Vec<VisitorData> {
        let mut all = self.visitors();
        all.sort_by(|a, b| b.date.cmp(&a.date));
        all
    }

    /// Append records without deduplication. Returns how many were added.
    pub fn append_visitors(&self, records: Vec<VisitorData>) -> usize {
        if records.is_empty() {
            return 0;
        }
        let n = records.len();
        let mut visitors = self
            .visitors
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        visitors.extend(records);
        info!("Appended {} visitor records ({} total)", n, visitors.len());
        n
    }

    pub fn stats(&self) -> RepositoryStats {
        let dates = self.transactions.iter().map(|t| t.date);
        RepositoryStats {
            transactions: self.transactions.len(),
            visitor_records: self
                .visitors
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .len(),
            first_transaction: dates.clone().min(),
            last_transaction: dates.max(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StoreLocation;
    use crate::stats::tests::{tx, visit};

    fn repo() -> Repository {
        Repository::new(
            vec![
                tx("1", "2025-03-02T10:00:00Z", StoreLocation::Brno, &[10.0]),
                tx("2", "2025-03-01T10:00:00Z", StoreLocation::Brno, &[20.0]),
            ],
            vec![
                visit("2025-03-01T00:00:00Z", StoreLocation::Brno, 10),
                visit("2025-03-03T00:00:00Z", StoreLocation::Brno, 30),
            ],
        )
    }

    #[test]
    fn test_append_empty_leaves_store_unchanged() {
        let repo = repo();
        let before = repo.visitors();
        assert_eq!(repo.append_visitors(Vec::new()), 0);
        assert_eq!(repo.visitors(), before);
    }

    #[test]
    fn test_append_keeps_duplicates() {
        let repo = repo();
        let dup = visit("2025-03-01T00:00:00Z", StoreLocation::Brno, 10);
        assert_eq!(repo.append_visitors(vec![dup.clone(), dup]), 2);
        assert_eq!(repo.visitors().len(), 4);
    }

    #[test]
    fn test_newest_first_ordering() {
        let repo = repo();
        repo.append_visitors(vec![visit("2025-03-02T00:00:00Z", StoreLocation::PrahaLuziny, 5)]);
        let counts: Vec<u32> = repo
            .visitors_newest_first()
            .iter()
            .map(|v| v.visitor_count)
            .collect();
        assert_eq!(counts, [30, 5, 10]);
        // insertion order is untouched
        assert_eq!(repo.visitors()[0].visitor_count, 10);
    }

    #[test]
    fn test_stats() {
        let stats = repo().stats();
        assert_eq!(stats.transactions, 2);
        assert_eq!(stats.visitor_records, 2);
        assert_eq!(stats.first_transaction, Some("2025-03-01T10:00:00Z".parse().unwrap()));
        assert_eq!(stats.last_transaction, Some("2025-03-02T10:00:00Z".parse().unwrap()));
    }
}

use crate::dates::DateRange;
use crate::models::{StoreLocation, Transaction, TransactionType, VisitorData};

pub fn by_date_range(transactions: &[Transaction], range: &DateRange) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| range.contains(&t.date))
        .cloned()
        .collect()
}

pub fn visitors_by_date_range(visitors: &[VisitorData], range: &DateRange) -> Vec<VisitorData> {
    visitors
        .iter()
        .filter(|v| range.contains(&v.date))
        .cloned()
        .collect()
}

/// No-op when `store` is `None`.
pub fn by_store(transactions: Vec<Transaction>, store: Option<StoreLocation>) -> Vec<Transaction> {
    match store {
        Some(store) => transactions
            .into_iter()
            .filter(|t| t.store_location == store)
            .collect(),
        None => transactions,
    }
}

/// No-op when `kind` is `None`.
pub fn by_type(transactions: Vec<Transaction>, kind: Option<TransactionType>) -> Vec<Transaction> {
    match kind {
        Some(kind) => transactions
            .into_iter()
            .filter(|t| t.transaction_type == kind)
            .collect(),
        None => transactions,
    }
}

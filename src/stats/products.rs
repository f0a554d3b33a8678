//! Product rankings.
//!
//! Every entry in a transaction's product list is one unit sold, so quantity
//! counts occurrences and revenue sums the listed prices. Rankings use a
//! stable sort: products with equal metrics keep the order in which they were
//! first encountered.

use crate::models::{Product, ProductQuantity, ProductRevenue, TimeRange, Transaction};
use std::collections::HashMap;

pub const TOP_PRODUCTS_LIMIT: usize = 10;

/// The day view lists every product sold; longer ranges only the top ten.
pub fn quantity_limit(time_range: TimeRange) -> Option<usize> {
    match time_range {
        TimeRange::Day => None,
        _ => Some(TOP_PRODUCTS_LIMIT),
    }
}

/// Fold every line item into per-code accumulators, in first-seen order.
fn tally<T>(
    transactions: &[Transaction],
    init: impl Fn(&Product) -> T,
    mut add: impl FnMut(&mut T, &Product),
) -> Vec<(Product, T)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<(Product, T)> = Vec::new();

    for product in transactions.iter().flat_map(|t| &t.products) {
        match index.get(product.code.as_str()) {
            Some(&i) => add(&mut entries[i].1, product),
            None => {
                index.insert(&product.code, entries.len());
                entries.push((product.clone(), init(product)));
            }
        }
    }

    entries
}

pub fn by_quantity(transactions: &[Transaction], limit: Option<usize>) -> Vec<ProductQuantity> {
    let mut ranked: Vec<ProductQuantity> = tally(transactions, |_| 1usize, |n, _| *n += 1)
        .into_iter()
        .map(|(product, quantity)| ProductQuantity { product, quantity })
        .collect();

    ranked.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    if let Some(limit) = limit {
        ranked.truncate(limit);
    }
    ranked
}

pub fn by_revenue(transactions: &[Transaction], limit: Option<usize>) -> Vec<ProductRevenue> {
    let mut ranked: Vec<ProductRevenue> =
        tally(transactions, |p| p.price, |sum, p| *sum += p.price)
            .into_iter()
            .map(|(product, revenue)| ProductRevenue { product, revenue })
            .collect();

    ranked.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    if let Some(limit) = limit {
        ranked.truncate(limit);
    }
    ranked
}

//! Statistics aggregation: filter → group by store → aggregate → rank.
//!
//! Everything here is a pure function over in-memory records. Hour-of-day
//! bucketing happens in the caller's time zone; date bounds arrive already
//! resolved (see `crate::dates`).

pub mod filter;
pub mod products;

use crate::dates::DateRange;
use crate::models::{
    DashboardData, FilterOptions, HourlySales, PaymentMethod, PaymentMethodDistribution,
    StoreLocation, StoreSummary, TimeRange, TopProducts, Transaction, VisitorData,
};
use chrono::{TimeZone, Timelike};
use std::collections::BTreeMap;
use tracing::debug;

// ── Reducers ──────────────────────────────────────────────────────────────────

pub fn total_revenue(transactions: &[Transaction]) -> f64 {
    transactions.iter().map(|t| t.total_amount).sum()
}

pub fn average_transaction_value(transactions: &[Transaction]) -> f64 {
    if transactions.is_empty() {
        return 0.0;
    }
    total_revenue(transactions) / transactions.len() as f64
}

/// Counts transactions, not amounts.
pub fn payment_method_distribution(transactions: &[Transaction]) -> PaymentMethodDistribution {
    transactions
        .iter()
        .fold(PaymentMethodDistribution::default(), |mut dist, t| {
            match t.payment_method {
                PaymentMethod::Cash => dist.cash += 1,
                PaymentMethod::Card => dist.card += 1,
            }
            dist
        })
}

pub fn visitor_total(visitors: &[VisitorData]) -> u64 {
    visitors.iter().map(|v| u64::from(v.visitor_count)).sum()
}

/// Transactions per visitor; 0 when nobody was counted.
pub fn conversion_rate(transaction_count: usize, visitor_count: u64) -> f64 {
    if visitor_count == 0 {
        return 0.0;
    }
    transaction_count as f64 / visitor_count as f64
}

/// 24 buckets keyed by the local hour of each transaction.
pub fn hourly_sales<Tz: TimeZone>(transactions: &[Transaction], tz: &Tz) -> Vec<HourlySales> {
    let mut buckets: Vec<HourlySales> = (0..24)
        .map(|hour| HourlySales {
            hour,
            count: 0,
            revenue: 0.0,
        })
        .collect();

    for t in transactions {
        let hour = t.date.with_timezone(tz).hour() as usize;
        let bucket = &mut buckets[hour];
        bucket.count += 1;
        bucket.revenue += t.total_amount;
    }

    buckets
}

// ── Per-store summary ─────────────────────────────────────────────────────────

pub fn store_summary<Tz: TimeZone>(
    transactions: &[Transaction],
    visitors: &[VisitorData],
    store: StoreLocation,
    time_range: TimeRange,
    tz: &Tz,
) -> StoreSummary {
    let store_transactions: Vec<Transaction> = transactions
        .iter()
        .filter(|t| t.store_location == store)
        .cloned()
        .collect();
    let store_visitors: Vec<VisitorData> = visitors
        .iter()
        .filter(|v| v.store_location == store)
        .cloned()
        .collect();

    let transaction_count = store_transactions.len();
    let visitor_count = visitor_total(&store_visitors);

    StoreSummary {
        total_revenue: total_revenue(&store_transactions),
        transaction_count,
        average_transaction_value: average_transaction_value(&store_transactions),
        payment_method_distribution: payment_method_distribution(&store_transactions),
        top_products: TopProducts {
            by_quantity: products::by_quantity(
                &store_transactions,
                products::quantity_limit(time_range),
            ),
            by_revenue: products::by_revenue(
                &store_transactions,
                Some(products::TOP_PRODUCTS_LIMIT),
            ),
        },
        visitor_count,
        conversion_rate: conversion_rate(transaction_count, visitor_count),
        hourly_sales: hourly_sales(&store_transactions, tz),
    }
}

// ── Dashboard ─────────────────────────────────────────────────────────────────

/// Assemble the dashboard for an already-resolved date range.
///
/// Transactions are narrowed by date, store and type; visitor records by date
/// only, so every store keeps its traffic even when another store is selected.
pub fn build_dashboard<Tz: TimeZone>(
    transactions: &[Transaction],
    visitors: &[VisitorData],
    options: &FilterOptions,
    range: DateRange,
    tz: &Tz,
) -> DashboardData {
    let dated = filter::by_date_range(transactions, &range);
    let selected = filter::by_type(
        filter::by_store(dated, options.store_location),
        options.transaction_type,
    );
    let visits = filter::visitors_by_date_range(visitors, &range);

    debug!(
        "Dashboard {:?} {} → {}: {} transactions, {} visitor records",
        options.time_range,
        range.start,
        range.end,
        selected.len(),
        visits.len()
    );

    let store_data: BTreeMap<StoreLocation, StoreSummary> = StoreLocation::ALL
        .into_iter()
        .map(|store| {
            let summary = store_summary(&selected, &visits, store, options.time_range, tz);
            (store, summary)
        })
        .collect();

    let total_revenue = store_data.values().map(|s| s.total_revenue).sum();
    let total_transactions = store_data.values().map(|s| s.transaction_count).sum();

    DashboardData {
        time_range: options.time_range,
        start_date: range.start,
        end_date: range.end,
        store_data,
        total_revenue,
        total_transactions,
        hourly_sales: hourly_sales(&selected, tz),
    }
}

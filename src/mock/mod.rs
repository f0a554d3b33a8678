//! Seed data: product catalog plus randomly generated transactions and visitor
//! counts covering the last few months.

use crate::auth;
use crate::dates::start_of_day;
use crate::models::{
    PaymentMethod, Product, StoreLocation, Transaction, TransactionType, VisitorData,
};
use chrono::{DateTime, Datelike, Days, Months, TimeDelta, TimeZone, Utc, Weekday};
use rand::Rng;
use tracing::debug;

const CATALOG: [(&str, &str, f64); 15] = [
    ("P001", "Smartphone XYZ", 12990.0),
    ("P002", "Tablet ABC", 8990.0),
    ("P003", "Sluchátka Premium", 2490.0),
    ("P004", "Bezdrátová myš", 890.0),
    ("P005", "Klávesnice mechanická", 1990.0),
    ("P006", "Monitor 27\"", 5990.0),
    ("P007", "USB-C kabel", 290.0),
    ("P008", "Powerbank 20000mAh", 1290.0),
    ("P009", "Ochranné sklo", 490.0),
    ("P010", "Obal na telefon", 390.0),
    ("P011", "Webkamera HD", 1490.0),
    ("P012", "Router WiFi", 1790.0),
    ("P013", "Reproduktor Bluetooth", 990.0),
    ("P014", "Herní konzole", 9990.0),
    ("P015", "Chytrý náramek", 1890.0),
];

pub fn catalog() -> Vec<Product> {
    CATALOG
        .iter()
        .map(|&(code, name, price)| Product {
            code: code.to_string(),
            name: name.to_string(),
            price,
        })
        .collect()
}

fn history_start(now: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(months)).unwrap_or(now)
}

fn pick<'a, T, R: Rng + ?Sized>(items: &'a [T], rng: &mut R) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

fn numbered(prefix: &str, n: usize) -> String {
    format!("{prefix}{n:06}")
}

/// `count` transactions at random instants within the last `months` months,
/// newest first.
pub fn generate_transactions<R: Rng + ?Sized>(
    count: usize,
    months: u32,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<Transaction> {
    let products = catalog();
    let operators: Vec<String> = auth::users().into_iter().map(|u| u.id).collect();
    let start = history_start(now, months);
    let span_ms = (now - start).num_milliseconds().max(0);

    let mut transactions: Vec<Transaction> = (1..=count)
        .map(|n| {
            let date = start + TimeDelta::milliseconds(rng.gen_range(0..=span_ms));
            let items: Vec<Product> = (0..rng.gen_range(1..=5))
                .map(|_| pick(&products, rng).clone())
                .collect();
            let transaction_type = if rng.gen_bool(0.5) {
                TransactionType::Reservation
            } else {
                TransactionType::DirectSale
            };

            Transaction {
                id: numbered("TR", n),
                date,
                receipt_number: numbered("R", n),
                total_amount: items.iter().map(|p| p.price).sum(),
                products: items,
                payment_method: if rng.gen_bool(0.5) {
                    PaymentMethod::Cash
                } else {
                    PaymentMethod::Card
                },
                store_location: *pick(&StoreLocation::ALL, rng),
                user: pick(&operators, rng).clone(),
                transaction_type,
                reservation_number: (transaction_type == TransactionType::Reservation)
                    .then(|| numbered("RES", n)),
            }
        })
        .collect();

    transactions.sort_by(|a, b| b.date.cmp(&a.date));
    debug!("Generated {} transactions since {}", transactions.len(), start);
    transactions
}

/// Daily visitor range per store; weekends draw 1.5× more.
fn visitor_bounds(store: StoreLocation, weekday: Weekday) -> (u32, u32) {
    let (min, max) = match store {
        StoreLocation::Brno => (50, 200),
        StoreLocation::PrahaLuziny => (80, 250),
        StoreLocation::PrahaCentrala => (100, 300),
    };
    match weekday {
        Weekday::Sat | Weekday::Sun => (min * 3 / 2, max * 3 / 2),
        _ => (min, max),
    }
}

/// One record per store per local day from `months` ago through today,
/// newest first.
pub fn generate_visitors<R: Rng + ?Sized, Tz: TimeZone>(
    months: u32,
    now: DateTime<Utc>,
    tz: &Tz,
    rng: &mut R,
) -> Vec<VisitorData> {
    let first = history_start(now, months).with_timezone(tz).date_naive();
    let last = now.with_timezone(tz).date_naive();

    let mut visitors = Vec::new();
    let mut day = first;
    while day <= last {
        for store in StoreLocation::ALL {
            let (min, max) = visitor_bounds(store, day.weekday());
            visitors.push(VisitorData {
                date: start_of_day(day, tz),
                store_location: store,
                visitor_count: rng.gen_range(min..=max),
            });
        }
        match day.checked_add_days(Days::new(1)) {
            Some(next) => day = next,
            None => break,
        }
    }

    visitors.sort_by(|a, b| b.date.cmp(&a.date));
    debug!("Generated {} visitor records from {} to {}", visitors.len(), first, last);
    visitors
}

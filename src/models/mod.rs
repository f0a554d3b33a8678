use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ── Store locations ───────────────────────────────────────────────────────────

/// One of the three fixed retail sites.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StoreLocation {
    #[serde(rename = "Brno")]
    Brno,
    #[serde(rename = "Praha - OC Lužiny")]
    PrahaLuziny,
    #[serde(rename = "Praha - Centrála")]
    PrahaCentrala,
}

impl StoreLocation {
    pub const ALL: [StoreLocation; 3] = [
        StoreLocation::Brno,
        StoreLocation::PrahaLuziny,
        StoreLocation::PrahaCentrala,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StoreLocation::Brno => "Brno",
            StoreLocation::PrahaLuziny => "Praha - OC Lužiny",
            StoreLocation::PrahaCentrala => "Praha - Centrála",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            StoreLocation::Brno => "brno",
            StoreLocation::PrahaLuziny => "praha-luziny",
            StoreLocation::PrahaCentrala => "praha-centrala",
        }
    }

    /// Exact match on the display name, surrounding whitespace ignored.
    pub fn from_name(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|store| store.name() == s)
    }

    pub fn from_slug(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|store| store.slug() == s)
    }
}

impl fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts either the slug or the display name (CLI arguments).
impl FromStr for StoreLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slug(s)
            .or_else(|| Self::from_name(s))
            .ok_or_else(|| format!("unknown store: {s}"))
    }
}

// ── Transactions ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Reservation,
    DirectSale,
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "reservation" => Ok(TransactionType::Reservation),
            "direct_sale" | "direct-sale" => Ok(TransactionType::DirectSale),
            other => Err(format!("unknown transaction type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub code: String,
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub date: DateTime<Utc>,
    pub receipt_number: String,
    pub total_amount: f64,
    pub products: Vec<Product>, // one entry per unit sold
    pub payment_method: PaymentMethod,
    pub store_location: StoreLocation,
    pub user: String, // operator id
    pub transaction_type: TransactionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_number: Option<String>,
}

// ── Visitors ──────────────────────────────────────────────────────────────────

/// Visitor count for one store-day. `date` is the local midnight of that day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VisitorData {
    pub date: DateTime<Utc>,
    pub store_location: StoreLocation,
    pub visitor_count: u32,
}

/// Visitor CSV: datum, prodejna, pocet_navstevniku
#[derive(Debug, Clone, Default)]
pub struct RawVisitorCsvRow {
    pub date: Option<String>,
    pub store: Option<String>,
    pub visitor_count: Option<String>,
}

// ── Filters ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Day,
    #[default]
    Week,
    Month,
    Custom,
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "day" => Ok(TimeRange::Day),
            "week" => Ok(TimeRange::Week),
            "month" => Ok(TimeRange::Month),
            "custom" => Ok(TimeRange::Custom),
            other => Err(format!("unknown time range: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DateBounds {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    #[serde(default)]
    pub time_range: TimeRange,
    #[serde(default)]
    pub date_range: Option<DateBounds>,
    #[serde(default)]
    pub store_location: Option<StoreLocation>,
    #[serde(default)]
    pub transaction_type: Option<TransactionType>,
}

// ── Statistics ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PaymentMethodDistribution {
    pub cash: usize,
    pub card: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductQuantity {
    pub product: Product,
    pub quantity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductRevenue {
    pub product: Product,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TopProducts {
    pub by_quantity: Vec<ProductQuantity>,
    pub by_revenue: Vec<ProductRevenue>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HourlySales {
    pub hour: u32,
    pub count: usize,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreSummary {
    pub total_revenue: f64,
    pub transaction_count: usize,
    pub average_transaction_value: f64,
    pub payment_method_distribution: PaymentMethodDistribution,
    pub top_products: TopProducts,
    pub visitor_count: u64,
    pub conversion_rate: f64, // transactions / visitors
    pub hourly_sales: Vec<HourlySales>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub time_range: TimeRange,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub store_data: BTreeMap<StoreLocation, StoreSummary>,
    pub total_revenue: f64,
    pub total_transactions: usize,
    pub hourly_sales: Vec<HourlySales>,
}

// ── Users ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_location_names_and_slugs() {
        assert_eq!(StoreLocation::from_name(" Brno "), Some(StoreLocation::Brno));
        assert_eq!(
            StoreLocation::from_name("Praha - OC Lužiny"),
            Some(StoreLocation::PrahaLuziny)
        );
        assert_eq!(StoreLocation::from_name("Ostrava"), None);
        assert_eq!(StoreLocation::from_name("brno"), None);
        assert_eq!(
            StoreLocation::from_slug("praha-centrala"),
            Some(StoreLocation::PrahaCentrala)
        );
        assert_eq!("praha-luziny".parse::<StoreLocation>(), Ok(StoreLocation::PrahaLuziny));
    }

    #[test]
    fn test_filter_options_wire_format() {
        let json = r#"{
            "timeRange": "custom",
            "dateRange": { "start": "2025-03-01T00:00:00Z", "end": "2025-03-07T00:00:00Z" },
            "storeLocation": "Praha - Centrála",
            "transactionType": "direct_sale"
        }"#;
        let filter: FilterOptions = serde_json::from_str(json).unwrap();
        assert_eq!(filter.time_range, TimeRange::Custom);
        assert_eq!(filter.store_location, Some(StoreLocation::PrahaCentrala));
        assert_eq!(filter.transaction_type, Some(TransactionType::DirectSale));
        assert!(filter.date_range.is_some());
    }

    #[test]
    fn test_unknown_store_is_rejected_on_input() {
        let json = r#"{ "date": "2025-03-01T00:00:00Z", "storeLocation": "Ostrava", "visitorCount": 5 }"#;
        assert!(serde_json::from_str::<VisitorData>(json).is_err());
    }

    #[test]
    fn test_store_data_keys_serialize_as_display_names() {
        let mut map = BTreeMap::new();
        map.insert(StoreLocation::PrahaLuziny, 2);
        map.insert(StoreLocation::Brno, 1);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"Brno":1,"Praha - OC Lužiny":2}"#);
    }
}

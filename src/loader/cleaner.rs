use crate::dates::start_of_day;
use crate::models::{RawVisitorCsvRow, StoreLocation, VisitorData};
use chrono::{NaiveDate, TimeZone};

// ── Field parsers ─────────────────────────────────────────────────────────────

/// "01.03.2025" → 2025-03-01. Single-digit day/month are accepted.
pub fn parse_czech_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let mut parts = s.split('.');
    let (day, month, year) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(
        year.trim().parse().ok()?,
        month.trim().parse().ok()?,
        day.trim().parse().ok()?,
    )
}

/// Negative and non-integer counts are rejected.
pub fn parse_visitor_count(s: &str) -> Option<u32> {
    s.trim().parse::<u32>().ok()
}

/// Only absent or empty cells are missing; whitespace goes on to the field checks.
fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

// ── Row → VisitorData ─────────────────────────────────────────────────────────

/// Validate one CSV row. Checks run in a fixed order and the first failure is
/// reported.
pub fn visitor_row_to_record<Tz: TimeZone>(
    row: &RawVisitorCsvRow,
    tz: &Tz,
) -> Result<VisitorData, String> {
    let (Some(date), Some(store), Some(count)) = (
        non_empty(&row.date),
        non_empty(&row.store),
        non_empty(&row.visitor_count),
    ) else {
        return Err("Missing required fields (datum, prodejna, pocet_navstevniku)".to_string());
    };

    let date = parse_czech_date(date)
        .ok_or_else(|| format!("Invalid date format: {date}. Expected format: DD.MM.YYYY"))?;

    let store_location = StoreLocation::from_name(store).ok_or_else(|| {
        format!(
            "Invalid store: {store}. Allowed values: {}",
            StoreLocation::ALL.map(|s| s.name()).join(", ")
        )
    })?;

    let visitor_count = parse_visitor_count(count).ok_or_else(|| {
        format!("Invalid visitor count: {count}. Expected a non-negative number.")
    })?;

    Ok(VisitorData {
        date: start_of_day(date, tz),
        store_location,
        visitor_count,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

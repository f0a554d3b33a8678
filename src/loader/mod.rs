//! CSV importer for daily visitor counts.
//!
//! Expected header: `datum,prodejna,pocet_navstevniku`. Column order follows
//! the header. Invalid rows are collected with their file line number (header
//! is line 1) and never abort the remaining rows.

pub mod cleaner;

use crate::models::{RawVisitorCsvRow, VisitorData};
use anyhow::{Context, Result};
use chrono::TimeZone;
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use self::cleaner::visitor_row_to_record;

pub const COL_DATE: &str = "datum";
pub const COL_STORE: &str = "prodejna";
pub const COL_VISITORS: &str = "pocet_navstevniku";

/// Header row plus the zero-based record index.
const ROW_OFFSET: usize = 2;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub data: Vec<VisitorData>,
    pub errors: Vec<RowError>,
}

impl ImportReport {
    /// Only an error-free file may be committed to the store.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse visitor CSV content from any reader.
pub fn parse_visitor_csv<R: Read, Tz: TimeZone>(input: R, tz: &Tz) -> Result<ImportReport> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(input);

    let headers = reader.headers().context("Failed to read CSV header")?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);
    let (date_col, store_col, count_col) = (column(COL_DATE), column(COL_STORE), column(COL_VISITORS));
    debug!(
        "Visitor CSV columns: datum={:?} prodejna={:?} pocet_navstevniku={:?}",
        date_col, store_col, count_col
    );

    let mut report = ImportReport::default();

    for (i, result) in reader.records().enumerate() {
        let row = i + ROW_OFFSET;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("Row {}: {}", row, e);
                report.errors.push(RowError {
                    row,
                    message: format!("Unreadable row: {e}"),
                });
                continue;
            }
        };

        let field = |col: Option<usize>| col.and_then(|c| record.get(c)).map(|s| s.to_string());
        let raw = RawVisitorCsvRow {
            date: field(date_col),
            store: field(store_col),
            visitor_count: field(count_col),
        };

        match visitor_row_to_record(&raw, tz) {
            Ok(visit) => report.data.push(visit),
            Err(message) => report.errors.push(RowError { row, message }),
        }
    }

    info!(
        "Visitor CSV: {} valid rows, {} errors",
        report.data.len(),
        report.errors.len()
    );
    Ok(report)
}

pub fn load_visitor_csv<Tz: TimeZone>(path: &Path, tz: &Tz) -> Result<ImportReport> {
    let file = std::fs::File::open(path).with_context(|| format!("Cannot open {:?}", path))?;
    parse_visitor_csv(file, tz).with_context(|| format!("Failed to parse {:?}", path))
}

/// Example file offered for download: one row per store.
pub fn template() -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([COL_DATE, COL_STORE, COL_VISITORS])?;
    writer.write_record(["01.03.2025", "Brno", "120"])?;
    writer.write_record(["01.03.2025", "Praha - OC Lužiny", "85"])?;
    writer.write_record(["01.03.2025", "Praha - Centrála", "150"])?;
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV template: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StoreLocation;
    use chrono::{DateTime, FixedOffset, Utc};

    fn parse(csv: &str) -> ImportReport {
        parse_visitor_csv(csv.as_bytes(), &Utc).unwrap()
    }

    #[test]
    fn test_parses_valid_rows() {
        let report = parse("datum,prodejna,pocet_navstevniku\n01.03.2025,Brno,120\n02.03.2025,Praha - Centrála,150\n");
        assert!(report.is_clean());
        assert_eq!(report.data.len(), 2);
        assert_eq!(
            report.data[0],
            VisitorData {
                date: "2025-03-01T00:00:00Z".parse().unwrap(),
                store_location: StoreLocation::Brno,
                visitor_count: 120,
            }
        );
    }

    #[test]
    fn test_unknown_store_yields_one_error_and_is_skipped() {
        let report = parse("datum,prodejna,pocet_navstevniku\n01.03.2025,Brno,120\n01.03.2025,Ostrava,40\n");
        assert_eq!(report.data.len(), 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].row, 3);
        assert!(report.errors[0].message.contains("Ostrava"));
        assert!(!report.is_clean());
    }

    #[test]
    fn test_errors_do_not_stop_later_rows() {
        let report = parse(
            "datum,prodejna,pocet_navstevniku\n\
             xx,Brno,1\n\
             01.03.2025,Brno\n\
             01.03.2025,Brno,-3\n\
             04.03.2025,Praha - OC Lužiny,85\n",
        );
        let rows: Vec<usize> = report.errors.iter().map(|e| e.row).collect();
        assert_eq!(rows, [2, 3, 4]);
        assert!(report.errors[1].message.starts_with("Missing required fields"));
        assert_eq!(report.data.len(), 1);
        assert_eq!(report.data[0].store_location, StoreLocation::PrahaLuziny);
    }

    #[test]
    fn test_header_order_is_respected() {
        let report = parse("pocet_navstevniku,datum,prodejna,poznamka\n77,05.03.2025,Brno,ignored\n");
        assert!(report.is_clean());
        assert_eq!(report.data[0].visitor_count, 77);
    }

    #[test]
    fn test_missing_column_reports_every_row() {
        let report = parse("datum,prodejna\n01.03.2025,Brno\n02.03.2025,Brno\n");
        assert_eq!(report.errors.len(), 2);
        assert!(report.data.is_empty());
    }

    #[test]
    fn test_dates_are_local_midnight() {
        let cet = FixedOffset::east_opt(3600).unwrap();
        let report = parse_visitor_csv("datum,prodejna,pocet_navstevniku\n01.03.2025,Brno,120\n".as_bytes(), &cet).unwrap();
        let expected: DateTime<Utc> = "2025-02-28T23:00:00Z".parse().unwrap();
        assert_eq!(report.data[0].date, expected);
    }

    #[test]
    fn test_empty_lines_are_skipped() {
        let report = parse("datum,prodejna,pocet_navstevniku\n\n01.03.2025,Brno,120\n\n");
        assert!(report.is_clean());
        assert_eq!(report.data.len(), 1);
    }

    #[test]
    fn test_template_round_trips_through_parser() {
        let csv = template().unwrap();
        assert!(csv.starts_with("datum,prodejna,pocet_navstevniku\n"));
        let report = parse(&csv);
        assert!(report.is_clean());
        let stores: Vec<_> = report.data.iter().map(|v| v.store_location).collect();
        assert_eq!(stores, StoreLocation::ALL);
    }
}

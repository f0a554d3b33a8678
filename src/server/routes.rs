use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State as Extract},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::{
    auth,
    loader::{RowError, template},
    models::{DashboardData, FilterOptions, StoreLocation, User, VisitorData},
};

use super::{error::ApiError, state::State};

type AppState = Extract<Arc<State>>;

fn parse_filter(body: &[u8]) -> Result<FilterOptions, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::MalformedPayload(format!("Invalid filter: {e}")))
}

// ── Dashboard ─────────────────────────────────────────────────────────────────

pub async fn dashboard_handler(
    Extract(state): AppState,
    body: Bytes,
) -> Result<Json<DashboardData>, ApiError> {
    let filter = parse_filter(&body)?;
    Ok(Json(state.dashboard(&filter, Utc::now())?))
}

/// Same as the dashboard, with the store filter taken from the path.
pub async fn store_dashboard_handler(
    Extract(state): AppState,
    Path(slug): Path<String>,
    body: Bytes,
) -> Result<Json<DashboardData>, ApiError> {
    let store = StoreLocation::from_slug(&slug).ok_or(ApiError::UnknownStore(slug))?;
    let filter = FilterOptions {
        store_location: Some(store),
        ..parse_filter(&body)?
    };
    Ok(Json(state.dashboard(&filter, Utc::now())?))
}

pub async fn stores_handler() -> Json<Value> {
    let stores: Vec<Value> = StoreLocation::ALL
        .iter()
        .map(|s| json!({ "slug": s.slug(), "name": s.name() }))
        .collect();
    Json(Value::Array(stores))
}

// ── Visitors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, PartialEq)]
pub struct ImportResponse {
    pub success: bool,
    pub message: String,
    pub count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<RowError>,
}

pub async fn visitors_handler(Extract(state): AppState) -> Json<Vec<VisitorData>> {
    Json(state.repo.visitors_newest_first())
}

/// Append a JSON array of visitor records.
pub async fn append_visitors_handler(
    Extract(state): AppState,
    body: Bytes,
) -> Result<Json<ImportResponse>, ApiError> {
    let value: Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::MalformedPayload(format!("Invalid JSON: {e}")))?;
    if !value.is_array() {
        return Err(ApiError::MalformedPayload(
            "Invalid data format. Expected an array of objects.".to_string(),
        ));
    }
    let records: Vec<VisitorData> = serde_json::from_value(value)
        .map_err(|e| ApiError::MalformedPayload(format!("Invalid visitor record: {e}")))?;

    let count = state.append(records);
    Ok(Json(ImportResponse {
        success: true,
        message: format!("Successfully imported {count} records"),
        count,
        errors: Vec::new(),
    }))
}

/// Validate a CSV upload and commit it only if every row is valid.
pub async fn import_csv_handler(
    Extract(state): AppState,
    body: Bytes,
) -> Result<(StatusCode, Json<ImportResponse>), ApiError> {
    let report = state
        .parse_import(&body)
        .map_err(|e| ApiError::MalformedPayload(format!("Invalid CSV: {e:#}")))?;

    if !report.is_clean() {
        warn!("CSV import rejected: {} invalid rows", report.errors.len());
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ImportResponse {
                success: false,
                message: format!("Import rejected: {} invalid rows", report.errors.len()),
                count: 0,
                errors: report.errors,
            }),
        ));
    }

    let count = state.import(&report);
    info!("CSV import committed: {} records", count);
    Ok((
        StatusCode::OK,
        Json(ImportResponse {
            success: true,
            message: format!("Successfully imported {count} records"),
            count,
            errors: Vec::new(),
        }),
    ))
}

pub async fn template_handler() -> Result<impl IntoResponse, ApiError> {
    let csv = template()?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"visitor_template.csv\"",
            ),
        ],
        csv,
    ))
}

// ── Auth ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

pub async fn login_handler(
    Extract(state): AppState,
    body: Bytes,
) -> Result<Json<User>, ApiError> {
    let creds: Credentials = serde_json::from_slice(&body)
        .map_err(|e| ApiError::MalformedPayload(format!("Invalid login payload: {e}")))?;

    auth::authenticate(&creds.email, &creds.password, state.config.auth.min_password_len)
        .map(Json)
        .ok_or(ApiError::InvalidCredentials)
}

pub async fn user_handler(Path(id): Path<String>) -> Result<Json<User>, ApiError> {
    auth::user_by_id(&id).map(Json).ok_or(ApiError::UnknownUser(id))
}

// ── Health ────────────────────────────────────────────────────────────────────

pub async fn health_handler(Extract(state): AppState) -> Json<Value> {
    Json(json!({ "status": "ok", "records": state.repo.stats() }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::models::TimeRange;
    use crate::stats::tests::{tx, visit};
    use crate::storage::Repository;
    use tokio_test::block_on;

    fn state() -> Arc<State> {
        let mut config = AppConfig::default();
        config.locale.utc_offset_minutes = Some(0);
        let repo = Repository::new(
            vec![
                tx("1", "2025-03-04T09:30:00Z", StoreLocation::Brno, &[100.0]),
                tx("2", "2025-03-05T14:00:00Z", StoreLocation::PrahaLuziny, &[50.0, 25.0]),
            ],
            vec![visit("2025-03-04T00:00:00Z", StoreLocation::Brno, 10)],
        );
        State::new(config, repo)
    }

    fn custom_week() -> Bytes {
        Bytes::from_static(
            br#"{"timeRange":"custom","dateRange":{"start":"2025-03-03T00:00:00Z","end":"2025-03-09T00:00:00Z"}}"#,
        )
    }

    #[test]
    fn test_dashboard_handler() {
        let state = state();
        let Json(data) = block_on(dashboard_handler(Extract(state), custom_week())).unwrap();
        assert_eq!(data.time_range, TimeRange::Custom);
        assert_eq!(data.total_transactions, 2);
        assert_eq!(data.total_revenue, 175.0);
        assert_eq!(data.store_data[&StoreLocation::Brno].conversion_rate, 0.1);
    }

    #[test]
    fn test_week_bounds_from_another_zone_are_kept() {
        let state = state();
        // Monday to Sunday in Prague, sent as UTC instants
        let body = Bytes::from_static(
            br#"{"timeRange":"week","dateRange":{"start":"2025-03-02T23:00:00Z","end":"2025-03-09T22:59:59.999Z"}}"#,
        );
        let Json(data) = block_on(dashboard_handler(Extract(state), body)).unwrap();
        assert_eq!(data.time_range, TimeRange::Week);
        assert_eq!(data.start_date, "2025-03-02T23:00:00Z".parse::<chrono::DateTime<Utc>>().unwrap());
        assert_eq!(data.total_transactions, 2);
        assert_eq!(data.store_data[&StoreLocation::Brno].transaction_count, 1);
    }

    #[test]
    fn test_dashboard_rejects_bad_payloads() {
        let err = block_on(dashboard_handler(Extract(state()), Bytes::from_static(b"nope"))).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let missing = Bytes::from_static(br#"{"timeRange":"custom"}"#);
        let err = block_on(dashboard_handler(Extract(state()), missing)).unwrap_err();
        assert!(matches!(err, ApiError::InvalidRange(_)));
    }

    #[test]
    fn test_store_dashboard_handler() {
        let Json(data) = block_on(store_dashboard_handler(
            Extract(state()),
            Path("praha-luziny".to_string()),
            custom_week(),
        ))
        .unwrap();
        assert_eq!(data.total_transactions, 1);
        assert_eq!(data.store_data[&StoreLocation::Brno].transaction_count, 0);

        let err = block_on(store_dashboard_handler(
            Extract(state()),
            Path("ostrava".to_string()),
            custom_week(),
        ))
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_append_visitors_requires_array() {
        let body = Bytes::from_static(br#"{"date":"2025-03-01T00:00:00Z","storeLocation":"Brno","visitorCount":1}"#);
        let err = block_on(append_visitors_handler(Extract(state()), body)).unwrap_err();
        assert_eq!(err.to_string(), "Invalid data format. Expected an array of objects.");
    }

    #[test]
    fn test_append_empty_array_succeeds_without_change() {
        let state = state();
        let Json(resp) = block_on(append_visitors_handler(
            Extract(state.clone()),
            Bytes::from_static(b"[]"),
        ))
        .unwrap();
        assert!(resp.success);
        assert_eq!(resp.count, 0);
        assert_eq!(state.repo.visitors().len(), 1);
    }

    #[test]
    fn test_appended_visitors_feed_later_queries() {
        let state = state();
        let body = Bytes::from_static(
            br#"[{"date":"2025-03-05T00:00:00Z","storeLocation":"Brno","visitorCount":40}]"#,
        );
        let Json(resp) = block_on(append_visitors_handler(Extract(state.clone()), body)).unwrap();
        assert_eq!(resp.count, 1);

        let Json(visits) = block_on(visitors_handler(Extract(state.clone())));
        assert_eq!(visits[0].visitor_count, 40);

        let Json(data) = block_on(dashboard_handler(Extract(state), custom_week())).unwrap();
        assert_eq!(data.store_data[&StoreLocation::Brno].visitor_count, 50);
    }

    #[test]
    fn test_csv_import_all_or_nothing() {
        let state = state();
        let bad = Bytes::from_static(
            "datum,prodejna,pocet_navstevniku\n01.03.2025,Brno,120\n01.03.2025,Ostrava,5\n".as_bytes(),
        );
        let (status, Json(resp)) = block_on(import_csv_handler(Extract(state.clone()), bad)).unwrap();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(!resp.success);
        assert_eq!(resp.errors.len(), 1);
        assert_eq!(resp.errors[0].row, 3);
        assert_eq!(state.repo.visitors().len(), 1);

        let good = Bytes::from_static(
            "datum,prodejna,pocet_navstevniku\n01.03.2025,Brno,120\n01.03.2025,Praha - Centrála,150\n".as_bytes(),
        );
        let (status, Json(resp)) = block_on(import_csv_handler(Extract(state.clone()), good)).unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resp.count, 2);
        assert_eq!(state.repo.visitors().len(), 3);
    }

    #[test]
    fn test_csv_import_with_unreadable_header_is_bad_request() {
        let state = state();
        let body = Bytes::from_static(b"dat\xffum,prodejna,pocet_navstevniku\n01.03.2025,Brno,120\n");
        let err = block_on(import_csv_handler(Extract(state.clone()), body)).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.repo.visitors().len(), 1);
    }

    #[test]
    fn test_login_handler() {
        let ok = Bytes::from_static(br#"{"email":"petra.svobodova@example.com","password":"heslo"}"#);
        let Json(user) = block_on(login_handler(Extract(state()), ok)).unwrap();
        assert_eq!(user.id, "user2");

        let short = Bytes::from_static(br#"{"email":"petra.svobodova@example.com","password":"abc"}"#);
        let err = block_on(login_handler(Extract(state()), short)).unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");

        let empty = Bytes::from_static(b"{}");
        let err = block_on(login_handler(Extract(state()), empty)).unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_user_handler() {
        let Json(user) = block_on(user_handler(Path("user1".to_string()))).unwrap();
        assert_eq!(user.name, "Jan Novák");

        let err = block_on(user_handler(Path("user9".to_string()))).unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_template_and_stores() {
        let response = block_on(template_handler()).unwrap().into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );

        let Json(stores) = block_on(stores_handler());
        assert_eq!(stores[1]["slug"], "praha-luziny");
        assert_eq!(stores[2]["name"], "Praha - Centrála");
    }

    #[test]
    fn test_health_handler() {
        let Json(health) = block_on(health_handler(Extract(state())));
        assert_eq!(health["status"], "ok");
        assert_eq!(health["records"]["transactions"], 2);
        assert_eq!(health["records"]["visitorRecords"], 1);
    }
}

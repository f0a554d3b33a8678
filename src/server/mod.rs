//! HTTP API over the dashboard aggregation.
//!
//! | Method | Path                          | Purpose                               |
//! |--------|-------------------------------|---------------------------------------|
//! | POST   | `/api/data`                   | dashboard for a filter document       |
//! | POST   | `/api/stores/{slug}/data`     | dashboard narrowed to one store       |
//! | GET    | `/api/stores`                 | store slugs and display names         |
//! | GET    | `/api/visitors`               | all visitor records, newest first     |
//! | POST   | `/api/visitors`               | append a JSON array of records        |
//! | POST   | `/api/visitors/import`        | validate and commit a CSV upload      |
//! | GET    | `/api/visitors/template`      | example CSV                           |
//! | POST   | `/api/auth/login`             | mock credential check                 |
//! | GET    | `/api/users/{id}`             | user profile by id                    |
//! | GET    | `/health`                     | liveness and record counts            |

pub mod error;
pub mod routes;
pub mod state;

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use routes::{
    append_visitors_handler, dashboard_handler, health_handler, import_csv_handler,
    login_handler, store_dashboard_handler, stores_handler, template_handler, user_handler,
    visitors_handler,
};
use state::State;

pub fn router(state: Arc<State>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/data", post(dashboard_handler))
        .route("/api/stores", get(stores_handler))
        .route("/api/stores/{slug}/data", post(store_dashboard_handler))
        .route(
            "/api/visitors",
            get(visitors_handler).post(append_visitors_handler),
        )
        .route("/api/visitors/import", post(import_csv_handler))
        .route("/api/visitors/template", get(template_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/users/{id}", get(user_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server(state: Arc<State>) -> Result<()> {
    let address = format!("{}:{}", state.config.server.host, state.config.server.port);
    let app = router(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to listen for Ctrl+C: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

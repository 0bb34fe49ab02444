//! `api` crate — HTTP REST API layer.
//!
//! Exposes (all JSON, `{success, data | error}`):
//!   GET    /health
//!   GET    /api/v1/me
//!   GET    /api/v1/organizations            POST /api/v1/organizations
//!   GET    /api/v1/sites                    POST /api/v1/sites
//!   GET    /api/v1/sites/:id                PUT  /api/v1/sites/:id   DELETE …
//!   GET    /api/v1/profiles[/:id]           PUT  /api/v1/profiles/:id
//!   …/daily-reports, /documents, /material-requests, /work-records,
//!   …/salary-settings, /payroll, /notifications
//!   GET    /api/v1/changes                  (Server-Sent Events)

pub mod auth;
pub mod envelope;
pub mod error;
pub mod export;
pub mod feed;
pub mod handlers;
pub mod payroll;

use axum::http::HeaderValue;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

pub use error::ApiError;
pub use handlers::{router, AppState};

/// Bind `addr` and serve until Ctrl-C.
///
/// `cors_origins` empty means same-origin only; `["*"]` allows any origin.
pub async fn serve(addr: &str, state: AppState, cors_origins: &[String]) -> std::io::Result<()> {
    let app = router(state).layer(cors_layer(cors_origins));

    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(parsed)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::envelope::{ok, Envelope};

#[derive(Serialize)]
pub struct Health {
    status: &'static str,
    timestamp: String,
}

/// Liveness probe; no authentication.
pub async fn health() -> Json<Envelope<Health>> {
    ok(Health { status: "ok", timestamp: Utc::now().to_rfc3339() })
}

//! Route handlers, one module per resource.
//!
//! Every handler follows the same order: authenticate, load the target
//! row, run the access guard, then (and only then) write.

pub mod changes;
pub mod daily_reports;
pub mod documents;
pub mod health;
pub mod material_requests;
pub mod notifications;
pub mod organizations;
pub mod payroll;
pub mod profiles;
pub mod sites;
pub mod work_records;

#[cfg(test)]
mod router_tests;

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use db::Store;

use crate::auth::JwtKeys;
use crate::error::ApiError;
use crate::feed::{ChangeAction, ChangeEvent, ChangeFeed};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub keys: Arc<JwtKeys>,
    pub feed: ChangeFeed,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, keys: JwtKeys, feed: ChangeFeed) -> Self {
        Self { store, keys: Arc::new(keys), feed }
    }

    pub(crate) fn publish(
        &self,
        table: &'static str,
        action: ChangeAction,
        id: Uuid,
        organization_id: Option<Uuid>,
    ) {
        self.feed.publish(ChangeEvent::new(table, action, id, organization_id));
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/me", get(profiles::me))
        .route("/organizations", get(organizations::list).post(organizations::create))
        .route("/organizations/:id", get(organizations::get))
        .route("/sites", get(sites::list).post(sites::create))
        .route("/sites/:id", get(sites::get).put(sites::update).delete(sites::delete))
        .route("/profiles", get(profiles::list))
        .route("/profiles/:id", get(profiles::get).put(profiles::update))
        .route("/daily-reports", get(daily_reports::list).post(daily_reports::create))
        .route(
            "/daily-reports/:id",
            get(daily_reports::get)
                .put(daily_reports::update)
                .delete(daily_reports::delete),
        )
        .route("/daily-reports/:id/submit", post(daily_reports::submit))
        .route("/daily-reports/:id/approve", post(daily_reports::approve))
        .route("/daily-reports/:id/reject", post(daily_reports::reject))
        .route("/documents", get(documents::list).post(documents::create))
        .route("/documents/:id", get(documents::get).delete(documents::delete))
        .route(
            "/material-requests",
            get(material_requests::list).post(material_requests::create),
        )
        .route("/material-requests/:id/approve", post(material_requests::approve))
        .route("/material-requests/:id/reject", post(material_requests::reject))
        .route("/material-requests/:id/deliver", post(material_requests::deliver))
        .route("/work-records", get(work_records::list).post(work_records::create))
        .route("/salary-settings", post(payroll::create_setting))
        .route("/salary-settings/:profile_id", get(payroll::list_settings))
        .route("/payroll/preview", get(payroll::preview))
        .route(
            "/payroll/snapshots",
            get(payroll::list_snapshots).post(payroll::create_snapshot),
        )
        .route("/payroll/snapshots/export", get(payroll::export_snapshots))
        .route("/notifications", get(notifications::list).post(notifications::create))
        .route("/notifications/:id/read", post(notifications::mark_read))
        .route("/changes", get(changes::stream));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Parse an optional status/category query value.
pub(crate) fn parse_opt<T: FromStr>(value: Option<&str>, msg: &str) -> Result<Option<T>, ApiError> {
    value
        .map(|v| v.parse::<T>().map_err(|_| ApiError::BadRequest(msg.to_string())))
        .transpose()
}

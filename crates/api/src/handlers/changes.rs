use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use tokio_stream::{
    wrappers::{errors::BroadcastStreamRecvError, BroadcastStream},
    Stream, StreamExt,
};
use tracing::{info, warn};

use domain::access;

use super::AppState;
use crate::auth::AuthCaller;
use crate::error::ApiError;

/// Server-Sent Events stream of change events the caller may see.
///
/// Each event is named after its table and carries the JSON-encoded
/// [`crate::feed::ChangeEvent`].  A lagging client silently skips the
/// events it missed.
pub async fn stream(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let scope = access::org_scope(&caller)?;
    let profile_id = caller.profile_id;
    info!(%profile_id, subscribers = state.feed.subscriber_count() + 1, "change feed subscribed");

    let events = BroadcastStream::new(state.feed.subscribe()).filter_map(move |item| {
        let change = match item {
            Ok(change) => change,
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(%profile_id, skipped, "change feed subscriber lagged");
                return None;
            }
        };
        if !scope.allows(change.organization_id) {
            return None;
        }
        match Event::default().event(change.table).json_data(&change) {
            Ok(event) => Some(Ok(event)),
            Err(err) => {
                warn!(error = %err, "failed to encode change event");
                None
            }
        }
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

//! Change feed: every successful write publishes a [`ChangeEvent`];
//! dashboards subscribe over SSE and refetch whatever the event touches.
//!
//! There is no replay.  A subscriber that falls more than `capacity`
//! events behind skips ahead and is expected to refetch.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangeEvent {
    pub table: &'static str,
    pub action: ChangeAction,
    pub id: Uuid,
    pub organization_id: Option<Uuid>,
    pub at: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(
        table: &'static str,
        action: ChangeAction,
        id: Uuid,
        organization_id: Option<Uuid>,
    ) -> Self {
        Self { table, action, id, organization_id, at: Utc::now() }
    }
}

#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn publish(&self, event: ChangeEvent) {
        let table = event.table;
        let action = event.action;
        // An error only means nobody is listening.
        if self.tx.send(event).is_err() {
            debug!(table, ?action, "change published without subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

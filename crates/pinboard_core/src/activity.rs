//! crates/pinboard_core/src/activity.rs
//!
//! The global activity feed: an append-only log under `logs`, consumed as a
//! bounded trailing window of the most recent entries, newest first.
//!
//! Appends are fire-and-forget telemetry. Nothing in the system depends on
//! a log entry landing, so a failed append is logged and dropped rather
//! than propagated.

use crate::domain::{LogAction, LogEntry};
use crate::ports::{PortResult, RealtimeStore};
use chrono::Utc;
use futures::{Stream, StreamExt};
use serde_json::Value;
use std::pin::Pin;
use std::sync::Arc;
use tracing::warn;

/// Visible size of the trailing window.
pub const LOG_WINDOW: usize = 20;

/// A live view of the activity window. Each item is the full replacement
/// window, not an incremental diff.
pub type LogStream = Pin<Box<dyn Stream<Item = Vec<LogEntry>> + Send>>;

#[derive(Clone)]
pub struct ActivityLog {
    store: Arc<dyn RealtimeStore>,
}

/// Builds the visible window from the stored `logs` collection: newest
/// first, truncated to [`LOG_WINDOW`] entries.
fn window_from(value: Option<Value>) -> Vec<LogEntry> {
    let Some(Value::Object(map)) = value else {
        return Vec::new();
    };
    let mut entries: Vec<LogEntry> = map
        .into_iter()
        .filter_map(|(key, value)| {
            let mut entry: LogEntry = serde_json::from_value(value).ok()?;
            entry.id = key;
            Some(entry)
        })
        .collect();
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    entries.truncate(LOG_WINDOW);
    entries
}

impl ActivityLog {
    pub fn new(store: Arc<dyn RealtimeStore>) -> Self {
        Self { store }
    }

    /// Appends an entry without waiting for the write to complete.
    ///
    /// Returns the spawned task handle so tests can await the append;
    /// production callers ignore it.
    pub fn record(&self, action: LogAction, actor: &str, detail: &str) -> tokio::task::JoinHandle<()> {
        let store = self.store.clone();
        let entry = LogEntry {
            id: String::new(),
            action,
            user: actor.to_string(),
            detail: detail.to_string(),
            timestamp: Utc::now().timestamp_millis(),
        };
        tokio::spawn(async move {
            let value = match serde_json::to_value(&entry) {
                Ok(value) => value,
                Err(e) => {
                    warn!("dropping unencodable activity entry: {e}");
                    return;
                }
            };
            if let Err(e) = store.push("logs", value).await {
                warn!("dropping activity entry after failed append: {e}");
            }
        })
    }

    /// The current trailing window, newest first.
    pub async fn recent(&self) -> PortResult<Vec<LogEntry>> {
        let value = self.store.get("logs").await?;
        Ok(window_from(value))
    }

    /// Live view of the trailing window: the current window immediately,
    /// then the full updated window after every append.
    pub async fn subscribe(&self) -> PortResult<LogStream> {
        let values = self.store.subscribe("logs").await?;
        Ok(Box::pin(values.map(window_from)))
    }
}

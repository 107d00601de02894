//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser client and
//! the API server for the live feed.
//!
//! The feed is push-only: the server streams full-replacement frames and
//! ignores everything the client sends except the close handshake. Each
//! frame replaces the corresponding displayed list or record wholesale;
//! there are no incremental diffs.

use crate::web::rest::{LogEntryResponse, StatsResponse};
use serde::Serialize;

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The current activity window: at most 20 entries, newest first.
    /// Replaces the displayed feed entirely.
    Activity { entries: Vec<LogEntryResponse> },

    /// The connected user's current gamification record.
    Stats { stats: StatsResponse },

    /// Reports a fatal error to the client, which should display an error message.
    Error { message: String },
}

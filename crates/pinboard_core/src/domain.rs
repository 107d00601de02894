//! crates/pinboard_core/src/domain.rs
//!
//! Defines the core data structures for the application.
//! Serde field names match the persisted camelCase schema of the realtime
//! database, so these structs round-trip through the store unchanged.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-user gamification record, persisted at `users/{id}/stats`.
///
/// `level` is derived from `entropy` but persisted rather than recomputed on
/// read, so that a level-up is an observable one-way transition. All
/// counters are monotonically non-decreasing, and `badges` only ever grows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProgress {
    /// Cumulative experience points ("entropy" in the UI).
    pub entropy: u64,
    pub level: u32,
    pub pins_created: u64,
    pub likes_given: u64,
    pub pins_saved: u64,
    pub comments_made: u64,
    /// Unlocked badge ids, in unlock order.
    pub badges: Vec<String>,
}

impl Default for UserProgress {
    /// The zero-state a user record starts from on its first transaction.
    fn default() -> Self {
        Self {
            entropy: 0,
            level: 1,
            pins_created: 0,
            likes_given: 0,
            pins_saved: 0,
            comments_made: 0,
            badges: Vec::new(),
        }
    }
}

/// The semantic kind of a progress event, deciding which activity counter
/// is bumped alongside the XP delta.
///
/// `XpOnly` exists for cross-credits: when a pin owner is credited for
/// receiving a like, their XP/level/badges move but none of their own
/// activity counters do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEventKind {
    Create,
    Like,
    Save,
    Comment,
    XpOnly,
}

/// A published pin, persisted at `pins/{id}`.
///
/// Engagement state is embedded: `likes`/`saves` are membership maps of
/// user id to `true`, and the counts are maintained inside the same
/// transaction that mutates the maps, never recomputed from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pin {
    /// The record key under `pins`. Not stored inside the record itself;
    /// filled in from the key when the record is read.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    pub description: String,
    /// Display name of the publishing user.
    pub author: String,
    pub user_id: String,
    /// Epoch milliseconds.
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Collection / category label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default)]
    pub likes: BTreeMap<String, bool>,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub saves: BTreeMap<String, bool>,
    #[serde(default)]
    pub save_count: u64,
    #[serde(default)]
    pub comments: BTreeMap<String, Comment>,
}

/// The user-supplied fields of a pin, before publication stamps identity,
/// timestamp, and zeroed engagement state onto it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinDraft {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    pub description: String,
    pub author: String,
    pub user_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub ai_description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

/// A comment on a pin, persisted at `pins/{pin}/comments/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub text: String,
    /// Epoch milliseconds.
    pub created_at: i64,
}

/// The action category of an activity-log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogAction {
    Upload,
    Like,
    Save,
    Comment,
    System,
}

/// One entry of the global activity feed, persisted under `logs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub action: LogAction,
    /// Short human-readable actor label, not necessarily a user id.
    pub user: String,
    pub detail: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

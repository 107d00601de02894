//! crates/pinboard_core/src/progress.rs
//!
//! The per-user progress store: XP, level, activity counters, and badges,
//! updated through single atomic transactions against `users/{id}/stats`.

use crate::badges::evaluate_badges;
use crate::domain::{ProgressEventKind, UserProgress};
use crate::levels::level_for_xp;
use crate::ports::{PortError, PortResult, RealtimeStore};
use futures::{Stream, StreamExt};
use serde_json::Value;
use std::pin::Pin;
use std::sync::Arc;

/// A live view of one user's progress record.
pub type ProgressStream = Pin<Box<dyn Stream<Item = UserProgress> + Send>>;

/// Typed access to `users/{id}/stats`.
///
/// All mutation goes through [`ProgressStore::apply_event`], which performs
/// the counter bump, XP add, level recompute, and badge union inside one
/// store transaction. Contention between concurrent events for the same
/// user is absorbed by the store's retry loop and never surfaces here.
#[derive(Clone)]
pub struct ProgressStore {
    store: Arc<dyn RealtimeStore>,
}

fn stats_path(user_id: &str) -> String {
    format!("users/{user_id}/stats")
}

/// Decodes a stored stats record. An absent or malformed record is the
/// zero-state, not an error: user records are created lazily by the first
/// transaction that touches them.
fn decode(value: Option<Value>) -> UserProgress {
    value
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

impl ProgressStore {
    pub fn new(store: Arc<dyn RealtimeStore>) -> Self {
        Self { store }
    }

    /// Applies one progress event atomically and returns the committed
    /// record.
    ///
    /// The counter implied by `kind` is incremented (`XpOnly` increments
    /// none, which is how cross-credits reach a user without touching their
    /// activity counters), `xp_delta` is added, the persisted level is
    /// raised if the new XP total warrants it (never lowered), and every
    /// newly-qualifying badge is unioned into the badge list (never
    /// removed).
    pub async fn apply_event(
        &self,
        user_id: &str,
        kind: ProgressEventKind,
        xp_delta: u64,
    ) -> PortResult<UserProgress> {
        let path = stats_path(user_id);
        let committed = self
            .store
            .transact(
                &path,
                Box::new(move |current| {
                    let mut stats = decode(current);

                    match kind {
                        ProgressEventKind::Create => stats.pins_created += 1,
                        ProgressEventKind::Like => stats.likes_given += 1,
                        ProgressEventKind::Save => stats.pins_saved += 1,
                        ProgressEventKind::Comment => stats.comments_made += 1,
                        ProgressEventKind::XpOnly => {}
                    }

                    stats.entropy += xp_delta;

                    // Level is a one-way transition.
                    let new_level = level_for_xp(stats.entropy);
                    if new_level > stats.level {
                        stats.level = new_level;
                    }

                    // Union newly-qualifying badges; unlocked badges stay.
                    for id in evaluate_badges(&stats) {
                        if !stats.badges.iter().any(|b| b == id) {
                            stats.badges.push(id.to_string());
                        }
                    }

                    serde_json::to_value(&stats).ok()
                }),
            )
            .await?;

        committed
            .and_then(|v| serde_json::from_value(v).ok())
            .ok_or_else(|| {
                PortError::Unexpected(format!("progress transaction at {path} produced no record"))
            })
    }

    /// Reads a user's current progress; absent records read as zero-state.
    pub async fn get(&self, user_id: &str) -> PortResult<UserProgress> {
        let value = self.store.get(&stats_path(user_id)).await?;
        Ok(decode(value))
    }

    /// Live view of a user's progress: fires immediately with the current
    /// record (zero-state when absent), then on every committed change.
    pub async fn subscribe(&self, user_id: &str) -> PortResult<ProgressStream> {
        let values = self.store.subscribe(&stats_path(user_id)).await?;
        Ok(Box::pin(values.map(decode)))
    }
}

//! crates/pinboard_core/src/profile.rs
//!
//! Per-user display data at `users/{id}/profile`, stored next to the
//! gamification record but independent of it. Unlike stats, an absent
//! profile reads as `None` rather than a zero-state default.

use crate::ports::{PortError, PortResult, RealtimeStore};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::pin::Pin;
use std::sync::Arc;

/// A live view of one user's profile record.
pub type ProfileStream = Pin<Box<dyn Stream<Item = Option<UserProfile>> + Send>>;

/// Display fields shown alongside a user's content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Avatar image URL.
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

fn profile_path(user_id: &str) -> String {
    format!("users/{user_id}/profile")
}

fn decode(value: Option<Value>) -> Option<UserProfile> {
    value.and_then(|v| serde_json::from_value(v).ok())
}

/// Typed access to `users/{id}/profile`.
#[derive(Clone)]
pub struct ProfileStore {
    store: Arc<dyn RealtimeStore>,
}

impl ProfileStore {
    pub fn new(store: Arc<dyn RealtimeStore>) -> Self {
        Self { store }
    }

    /// Sets the avatar URL, merging into the existing profile record so
    /// other fields survive. Creates the record when absent.
    pub async fn set_avatar(&self, user_id: &str, photo_url: &str) -> PortResult<UserProfile> {
        let path = profile_path(user_id);
        let url = photo_url.to_string();
        let committed = self
            .store
            .transact(
                &path,
                Box::new(move |current| {
                    let mut profile = match current {
                        Some(Value::Object(map)) => map,
                        _ => Map::new(),
                    };
                    profile.insert("photoURL".to_string(), json!(url));
                    Some(Value::Object(profile))
                }),
            )
            .await?;

        decode(committed).ok_or_else(|| {
            PortError::Unexpected(format!("profile update at {path} produced no record"))
        })
    }

    /// Reads a user's profile; `None` when no profile was ever set.
    pub async fn get(&self, user_id: &str) -> PortResult<Option<UserProfile>> {
        let value = self.store.get(&profile_path(user_id)).await?;
        Ok(decode(value))
    }

    /// Live view of a user's profile: the current record immediately
    /// (`None` when absent), then on every committed change.
    pub async fn subscribe(&self, user_id: &str) -> PortResult<ProfileStream> {
        let values = self.store.subscribe(&profile_path(user_id)).await?;
        Ok(Box::pin(values.map(decode)))
    }
}

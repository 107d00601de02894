//! crates/pinboard_core/src/pins.rs
//!
//! Typed access to the `pins` collection: publication, reads, the live
//! board feed, comments, and deletion.

use crate::domain::{Comment, Pin, PinDraft};
use crate::ports::{PortError, PortResult, RealtimeStore};
use chrono::Utc;
use futures::{Stream, StreamExt};
use serde_json::Value;
use std::collections::BTreeMap;
use std::pin::Pin as StdPin;
use std::sync::Arc;

/// Window of the global board feed, newest first.
pub const FEED_WINDOW: usize = 100;

/// A live view of the board. Each item is the full filtered list.
pub type PinStream = StdPin<Box<dyn Stream<Item = Vec<Pin>> + Send>>;

/// Which pins a feed covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinFilter {
    /// The global board: most recent [`FEED_WINDOW`] pins.
    All,
    /// Every pin published by one user, unwindowed.
    ByUser(String),
}

#[derive(Clone)]
pub struct PinStore {
    store: Arc<dyn RealtimeStore>,
}

fn decode_pin(key: String, value: Value) -> Option<Pin> {
    let mut pin: Pin = serde_json::from_value(value).ok()?;
    pin.id = key;
    // Record keys are the identity of embedded comments too.
    for (comment_id, comment) in pin.comments.iter_mut() {
        comment.id = comment_id.clone();
    }
    Some(pin)
}

fn decode_board(value: Option<Value>, filter: &PinFilter) -> Vec<Pin> {
    let Some(Value::Object(map)) = value else {
        return Vec::new();
    };
    let mut pins: Vec<Pin> = map
        .into_iter()
        .filter_map(|(key, value)| decode_pin(key, value))
        .filter(|pin| match filter {
            PinFilter::All => true,
            PinFilter::ByUser(user_id) => &pin.user_id == user_id,
        })
        .collect();
    pins.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    if matches!(filter, PinFilter::All) {
        pins.truncate(FEED_WINDOW);
    }
    pins
}

impl PinStore {
    pub fn new(store: Arc<dyn RealtimeStore>) -> Self {
        Self { store }
    }

    /// Publishes a draft: stamps the creation time and zeroed engagement
    /// state, appends it under `pins`, and returns the stored pin with its
    /// generated id.
    pub async fn publish(&self, draft: PinDraft) -> PortResult<Pin> {
        let pin = Pin {
            id: String::new(),
            url: draft.url,
            width: draft.width,
            height: draft.height,
            description: draft.description,
            author: draft.author,
            user_id: draft.user_id,
            created_at: Utc::now().timestamp_millis(),
            tags: draft.tags,
            sector: draft.sector,
            ai_description: draft.ai_description,
            link: draft.link,
            likes: BTreeMap::new(),
            like_count: 0,
            saves: BTreeMap::new(),
            save_count: 0,
            comments: BTreeMap::new(),
        };
        let value = serde_json::to_value(&pin)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let key = self.store.push("pins", value).await?;
        Ok(Pin { id: key, ..pin })
    }

    pub async fn get(&self, pin_id: &str) -> PortResult<Pin> {
        let value = self
            .store
            .get(&format!("pins/{pin_id}"))
            .await?
            .ok_or_else(|| PortError::NotFound(format!("Pin {pin_id} not found")))?;
        decode_pin(pin_id.to_string(), value)
            .ok_or_else(|| PortError::Unexpected(format!("Pin {pin_id} record is malformed")))
    }

    /// The current board state for a filter, newest first.
    pub async fn list(&self, filter: &PinFilter) -> PortResult<Vec<Pin>> {
        let value = self.store.get("pins").await?;
        Ok(decode_board(value, filter))
    }

    /// Live board feed: the current list immediately, then the full
    /// re-filtered list after every change to any pin.
    pub async fn subscribe(&self, filter: PinFilter) -> PortResult<PinStream> {
        let values = self.store.subscribe("pins").await?;
        Ok(Box::pin(
            values.map(move |value| decode_board(value, &filter)),
        ))
    }

    /// Removes a pin and everything embedded in it (engagement state and
    /// comments go with the record).
    pub async fn delete(&self, pin_id: &str) -> PortResult<()> {
        self.store.remove(&format!("pins/{pin_id}")).await
    }

    /// Appends a comment under the pin and returns it with its generated
    /// id.
    pub async fn add_comment(
        &self,
        pin_id: &str,
        user_id: &str,
        user_name: &str,
        text: &str,
    ) -> PortResult<Comment> {
        let comment = Comment {
            id: String::new(),
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            text: text.to_string(),
            created_at: Utc::now().timestamp_millis(),
        };
        let value = serde_json::to_value(&comment)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let key = self
            .store
            .push(&format!("pins/{pin_id}/comments"), value)
            .await?;
        Ok(Comment { id: key, ..comment })
    }

    pub async fn delete_comment(&self, pin_id: &str, comment_id: &str) -> PortResult<()> {
        self.store
            .remove(&format!("pins/{pin_id}/comments/{comment_id}"))
            .await
    }
}

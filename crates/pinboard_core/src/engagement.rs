//! crates/pinboard_core/src/engagement.rs
//!
//! Like/save membership toggles on pin records.
//!
//! A toggle is one atomic transaction on `pins/{id}`: the membership map and
//! its count move together, so `likeCount == |likes|` holds after every
//! commit without ever recounting the map. The engagement record is
//! independent of the user-progress record; awarding XP for a toggle is the
//! orchestrator's separate follow-up, gated on the outcome returned here.

use crate::ports::{PortError, PortResult, RealtimeStore};
use serde_json::{json, Value};
use std::sync::Arc;

/// Which membership set a toggle operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngagementKind {
    Like,
    Save,
}

impl EngagementKind {
    fn members_key(self) -> &'static str {
        match self {
            EngagementKind::Like => "likes",
            EngagementKind::Save => "saves",
        }
    }

    fn count_key(self) -> &'static str {
        match self {
            EngagementKind::Like => "likeCount",
            EngagementKind::Save => "saveCount",
        }
    }
}

/// The result of a completed toggle transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    /// `true` when the toggle added the user to the set ("like"), `false`
    /// when it removed them ("unlike"). XP is only ever awarded on the add
    /// transition.
    pub is_now_member: bool,
    pub new_count: u64,
    /// The pin owner's user id, read inside the same transaction so the
    /// orchestrator can apply the receive-like cross-credit.
    pub owner_id: Option<String>,
}

/// Typed toggle operations on the engagement state embedded in pin records.
#[derive(Clone)]
pub struct EngagementStore {
    store: Arc<dyn RealtimeStore>,
}

impl EngagementStore {
    pub fn new(store: Arc<dyn RealtimeStore>) -> Self {
        Self { store }
    }

    /// Toggles `user_id`'s membership in the pin's like or save set.
    ///
    /// Removing a member floors the count at zero rather than going
    /// negative if the stored count was ever out of step. A missing pin
    /// aborts the transaction and surfaces as `NotFound`.
    pub async fn toggle(
        &self,
        pin_id: &str,
        user_id: &str,
        kind: EngagementKind,
    ) -> PortResult<ToggleOutcome> {
        let uid = user_id.to_string();
        let committed = self
            .store
            .transact(
                &format!("pins/{pin_id}"),
                Box::new(move |current| {
                    // Abort on a missing or non-record pin; toggles never
                    // create pins.
                    let mut pin = match current {
                        Some(Value::Object(map)) => map,
                        _ => return None,
                    };

                    let count = pin
                        .get(kind.count_key())
                        .and_then(Value::as_u64)
                        .unwrap_or(0);

                    let members = pin
                        .entry(kind.members_key().to_string())
                        .or_insert_with(|| json!({}));
                    let members = match members.as_object_mut() {
                        Some(map) => map,
                        None => return None,
                    };

                    let new_count = if members.remove(&uid).is_some() {
                        count.saturating_sub(1)
                    } else {
                        members.insert(uid.clone(), json!(true));
                        count + 1
                    };
                    pin.insert(kind.count_key().to_string(), json!(new_count));

                    Some(Value::Object(pin))
                }),
            )
            .await?;

        // The committed snapshot is the value our closure produced on the
        // winning attempt, so the outcome can be read straight off it.
        let pin = committed
            .ok_or_else(|| PortError::NotFound(format!("Pin {pin_id} not found")))?;
        Ok(ToggleOutcome {
            is_now_member: pin
                .get(kind.members_key())
                .and_then(|m| m.get(user_id))
                .and_then(Value::as_bool)
                .unwrap_or(false),
            new_count: pin
                .get(kind.count_key())
                .and_then(Value::as_u64)
                .unwrap_or(0),
            owner_id: pin
                .get("userId")
                .and_then(Value::as_str)
                .map(String::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeStore;

    async fn store_with_pin() -> (Arc<FakeStore>, EngagementStore) {
        let fake = Arc::new(FakeStore::new());
        fake.set(
            "pins/p1",
            json!({ "url": "https://img.example/1.png", "userId": "owner" }),
        )
        .await
        .unwrap();
        let engagement = EngagementStore::new(fake.clone());
        (fake, engagement)
    }

    #[tokio::test]
    async fn first_toggle_adds_membership() {
        let (_, engagement) = store_with_pin().await;
        let outcome = engagement
            .toggle("p1", "alice", EngagementKind::Like)
            .await
            .unwrap();
        assert!(outcome.is_now_member);
        assert_eq!(outcome.new_count, 1);
        assert_eq!(outcome.owner_id.as_deref(), Some("owner"));
    }

    #[tokio::test]
    async fn toggle_on_then_off_restores_the_count() {
        let (fake, engagement) = store_with_pin().await;
        engagement
            .toggle("p1", "alice", EngagementKind::Like)
            .await
            .unwrap();
        let outcome = engagement
            .toggle("p1", "alice", EngagementKind::Like)
            .await
            .unwrap();
        assert!(!outcome.is_now_member);
        assert_eq!(outcome.new_count, 0);

        let pin = fake.snapshot("pins/p1").unwrap();
        assert_eq!(pin["likeCount"], json!(0));
        assert!(pin["likes"].as_object().unwrap().is_empty());
    }

    #[tokio::test]
    async fn count_always_matches_membership() {
        let (fake, engagement) = store_with_pin().await;
        for user in ["a", "b", "c"] {
            engagement
                .toggle("p1", user, EngagementKind::Save)
                .await
                .unwrap();
        }
        engagement
            .toggle("p1", "b", EngagementKind::Save)
            .await
            .unwrap();

        let pin = fake.snapshot("pins/p1").unwrap();
        let members = pin["saves"].as_object().unwrap();
        assert_eq!(pin["saveCount"].as_u64().unwrap(), members.len() as u64);
        assert_eq!(members.len(), 2);
    }

    #[tokio::test]
    async fn likes_and_saves_are_independent_sets() {
        let (fake, engagement) = store_with_pin().await;
        engagement
            .toggle("p1", "alice", EngagementKind::Like)
            .await
            .unwrap();
        engagement
            .toggle("p1", "alice", EngagementKind::Save)
            .await
            .unwrap();

        let pin = fake.snapshot("pins/p1").unwrap();
        assert_eq!(pin["likeCount"], json!(1));
        assert_eq!(pin["saveCount"], json!(1));
    }

    #[tokio::test]
    async fn removal_floors_the_count_at_zero() {
        let (fake, engagement) = store_with_pin().await;
        // Seed a record whose count is already out of step with the map.
        fake.set(
            "pins/p2",
            json!({ "userId": "owner", "likes": { "alice": true }, "likeCount": 0 }),
        )
        .await
        .unwrap();
        let outcome = engagement
            .toggle("p2", "alice", EngagementKind::Like)
            .await
            .unwrap();
        assert!(!outcome.is_now_member);
        assert_eq!(outcome.new_count, 0);
    }

    #[tokio::test]
    async fn toggling_a_missing_pin_is_not_found() {
        let (_, engagement) = store_with_pin().await;
        let err = engagement
            .toggle("ghost", "alice", EngagementKind::Like)
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn self_like_is_permitted() {
        let (_, engagement) = store_with_pin().await;
        let outcome = engagement
            .toggle("p1", "owner", EngagementKind::Like)
            .await
            .unwrap();
        assert!(outcome.is_now_member);
        assert_eq!(outcome.owner_id.as_deref(), Some("owner"));
    }
}

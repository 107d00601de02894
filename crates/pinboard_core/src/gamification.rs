//! crates/pinboard_core/src/gamification.rs
//!
//! The orchestrator: maps each semantic user action onto its counter bump,
//! flat XP amount, cross-credit, and activity-log entry.
//!
//! Each action is a sequence of independent atomic operations, not one
//! joint transaction: the engagement toggle, the actor's XP award, the
//! owner's cross-credit, and the log append commit separately. A crash
//! between them leaves a committed prefix (e.g. the like landed but the
//! cross-credit did not); that window is accepted and never reconciled.

use crate::activity::ActivityLog;
use crate::domain::{Comment, LogAction, Pin, PinDraft, ProgressEventKind};
use crate::engagement::{EngagementKind, EngagementStore, ToggleOutcome};
use crate::pins::PinStore;
use crate::ports::{PortResult, RealtimeStore};
use crate::progress::ProgressStore;
use std::sync::Arc;

/// Flat XP amounts per action.
pub mod xp {
    pub const CREATE_PIN: u64 = 50;
    pub const LIKE_PIN: u64 = 5;
    pub const SAVE_PIN: u64 = 10;
    pub const COMMENT: u64 = 15;
    /// Cross-credit to a pin's owner when someone else likes it.
    pub const RECEIVE_LIKE: u64 = 2;
}

/// Truncates an opaque id to a short label for log lines.
fn short(id: &str, len: usize) -> String {
    id.chars().take(len).collect()
}

/// Coordinates the pin, progress, engagement, and activity stores for one
/// logical action per call. Holds no state of its own.
#[derive(Clone)]
pub struct Gamification {
    pins: PinStore,
    progress: ProgressStore,
    engagement: EngagementStore,
    activity: ActivityLog,
}

impl Gamification {
    pub fn new(store: Arc<dyn RealtimeStore>) -> Self {
        Self {
            pins: PinStore::new(store.clone()),
            progress: ProgressStore::new(store.clone()),
            engagement: EngagementStore::new(store.clone()),
            activity: ActivityLog::new(store),
        }
    }

    /// Read-side access to the pin collection.
    pub fn pins(&self) -> &PinStore {
        &self.pins
    }

    /// Read-side access to user progress records.
    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    /// Read-side access to the activity feed.
    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    /// Publishes a pin, logs it, and credits the creator.
    pub async fn publish_pin(&self, draft: PinDraft) -> PortResult<Pin> {
        let pin = self.pins.publish(draft).await?;
        let _ = self.activity.record(
            LogAction::Upload,
            &pin.author,
            &format!("Sector: {}", pin.sector.as_deref().unwrap_or("General")),
        );
        self.progress
            .apply_event(&pin.user_id, ProgressEventKind::Create, xp::CREATE_PIN)
            .await?;
        Ok(pin)
    }

    /// Toggles a like. On the add transition the actor is credited and,
    /// when the pin belongs to someone else, its owner receives the
    /// receive-like cross-credit as an xp-only event. The remove
    /// transition changes nothing beyond the engagement record: XP already
    /// granted is never revoked.
    pub async fn toggle_like(&self, pin_id: &str, user_id: &str) -> PortResult<ToggleOutcome> {
        let outcome = self
            .engagement
            .toggle(pin_id, user_id, EngagementKind::Like)
            .await?;
        if outcome.is_now_member {
            self.progress
                .apply_event(user_id, ProgressEventKind::Like, xp::LIKE_PIN)
                .await?;
            let _ = self.activity.record(
                LogAction::Like,
                &short(user_id, 6),
                &format!("Signal locked on Pin #{}", short(pin_id, 4)),
            );
            if let Some(owner_id) = outcome.owner_id.as_deref() {
                if owner_id != user_id {
                    self.progress
                        .apply_event(owner_id, ProgressEventKind::XpOnly, xp::RECEIVE_LIKE)
                        .await?;
                }
            }
        }
        Ok(outcome)
    }

    /// Toggles a save. Only the add transition is credited; there is no
    /// cross-credit for saves.
    pub async fn toggle_save(&self, pin_id: &str, user_id: &str) -> PortResult<ToggleOutcome> {
        let outcome = self
            .engagement
            .toggle(pin_id, user_id, EngagementKind::Save)
            .await?;
        if outcome.is_now_member {
            self.progress
                .apply_event(user_id, ProgressEventKind::Save, xp::SAVE_PIN)
                .await?;
            let _ = self.activity.record(
                LogAction::Save,
                &short(user_id, 6),
                &format!("Pin #{} added to Collection", short(pin_id, 4)),
            );
        }
        Ok(outcome)
    }

    /// Appends a comment, logs it, and credits the commenter.
    pub async fn add_comment(
        &self,
        pin_id: &str,
        user_id: &str,
        user_name: &str,
        text: &str,
    ) -> PortResult<Comment> {
        let comment = self.pins.add_comment(pin_id, user_id, user_name, text).await?;
        let _ = self.activity.record(
            LogAction::Comment,
            user_name,
            &format!("Data appended to Pin #{}", short(pin_id, 4)),
        );
        self.progress
            .apply_event(user_id, ProgressEventKind::Comment, xp::COMMENT)
            .await?;
        Ok(comment)
    }

    /// Deletes a pin. XP awarded for the pin or its engagement stays: XP
    /// is never revoked once granted, even when the triggering content
    /// goes away.
    pub async fn delete_pin(&self, pin_id: &str) -> PortResult<()> {
        self.pins.delete(pin_id).await
    }

    /// Deletes a comment. No counter or XP reversal, as with pins.
    pub async fn delete_comment(&self, pin_id: &str, comment_id: &str) -> PortResult<()> {
        self.pins.delete_comment(pin_id, comment_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LogAction, PinDraft};
    use crate::ports::PortError;
    use crate::testing::FakeStore;

    fn draft(user_id: &str, author: &str) -> PinDraft {
        PinDraft {
            url: "https://img.example/x.png".to_string(),
            width: None,
            height: None,
            description: "a pin".to_string(),
            author: author.to_string(),
            user_id: user_id.to_string(),
            tags: Vec::new(),
            sector: None,
            ai_description: None,
            link: None,
        }
    }

    fn system() -> Gamification {
        Gamification::new(Arc::new(FakeStore::new()))
    }

    /// Waits for outstanding fire-and-forget log appends.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn publishing_credits_the_creator() {
        let game = system();
        game.publish_pin(draft("u1", "Alice")).await.unwrap();

        let progress = game.progress().get("u1").await.unwrap();
        assert_eq!(progress.entropy, xp::CREATE_PIN);
        assert_eq!(progress.pins_created, 1);
        assert_eq!(progress.badges, vec!["genesis"]);

        settle().await;
        let window = game.activity().recent().await.unwrap();
        assert_eq!(window[0].action, LogAction::Upload);
        assert_eq!(window[0].user, "Alice");
        assert_eq!(window[0].detail, "Sector: General");
    }

    #[tokio::test]
    async fn like_credits_actor_and_cross_credits_owner() {
        let game = system();
        let pin = game.publish_pin(draft("owner", "Owner")).await.unwrap();
        game.toggle_like(&pin.id, "liker").await.unwrap();

        let actor = game.progress().get("liker").await.unwrap();
        assert_eq!(actor.entropy, xp::LIKE_PIN);
        assert_eq!(actor.likes_given, 1);

        // Owner is credited xp-only: no counter moves from this event.
        let owner = game.progress().get("owner").await.unwrap();
        assert_eq!(owner.entropy, xp::CREATE_PIN + xp::RECEIVE_LIKE);
        assert_eq!(owner.likes_given, 0);
        assert_eq!(owner.pins_created, 1);
    }

    #[tokio::test]
    async fn self_like_earns_no_cross_credit() {
        let game = system();
        let pin = game.publish_pin(draft("u1", "Alice")).await.unwrap();
        game.toggle_like(&pin.id, "u1").await.unwrap();

        let progress = game.progress().get("u1").await.unwrap();
        assert_eq!(progress.entropy, xp::CREATE_PIN + xp::LIKE_PIN);
        assert_eq!(progress.likes_given, 1);
    }

    #[tokio::test]
    async fn unlike_revokes_nothing() {
        let game = system();
        let pin = game.publish_pin(draft("owner", "Owner")).await.unwrap();
        game.toggle_like(&pin.id, "liker").await.unwrap();
        let outcome = game.toggle_like(&pin.id, "liker").await.unwrap();
        assert!(!outcome.is_now_member);
        assert_eq!(outcome.new_count, 0);

        // XP and counters from the add transition stay.
        let actor = game.progress().get("liker").await.unwrap();
        assert_eq!(actor.entropy, xp::LIKE_PIN);
        assert_eq!(actor.likes_given, 1);
        let owner = game.progress().get("owner").await.unwrap();
        assert_eq!(owner.entropy, xp::CREATE_PIN + xp::RECEIVE_LIKE);
    }

    #[tokio::test]
    async fn save_has_no_cross_credit() {
        let game = system();
        let pin = game.publish_pin(draft("owner", "Owner")).await.unwrap();
        game.toggle_save(&pin.id, "saver").await.unwrap();

        let actor = game.progress().get("saver").await.unwrap();
        assert_eq!(actor.entropy, xp::SAVE_PIN);
        assert_eq!(actor.pins_saved, 1);
        let owner = game.progress().get("owner").await.unwrap();
        assert_eq!(owner.entropy, xp::CREATE_PIN);
    }

    #[tokio::test]
    async fn commenting_credits_the_commenter() {
        let game = system();
        let pin = game.publish_pin(draft("owner", "Owner")).await.unwrap();
        let comment = game
            .add_comment(&pin.id, "u2", "Bob", "nice grid")
            .await
            .unwrap();
        assert!(!comment.id.is_empty());

        let progress = game.progress().get("u2").await.unwrap();
        assert_eq!(progress.entropy, xp::COMMENT);
        assert_eq!(progress.comments_made, 1);

        settle().await;
        let window = game.activity().recent().await.unwrap();
        assert!(window
            .iter()
            .any(|e| e.action == LogAction::Comment && e.user == "Bob"));
    }

    #[tokio::test]
    async fn deletions_trigger_no_reversal() {
        let game = system();
        let pin = game.publish_pin(draft("u1", "Alice")).await.unwrap();
        let comment = game.add_comment(&pin.id, "u2", "Bob", "hi").await.unwrap();

        game.delete_comment(&pin.id, &comment.id).await.unwrap();
        game.delete_pin(&pin.id).await.unwrap();

        let creator = game.progress().get("u1").await.unwrap();
        assert_eq!(creator.entropy, xp::CREATE_PIN);
        assert_eq!(creator.pins_created, 1);
        let commenter = game.progress().get("u2").await.unwrap();
        assert_eq!(commenter.entropy, xp::COMMENT);
        assert_eq!(commenter.comments_made, 1);
    }

    #[tokio::test]
    async fn liking_a_missing_pin_awards_nothing() {
        let game = system();
        let err = game.toggle_like("ghost", "u1").await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
        let progress = game.progress().get("u1").await.unwrap();
        assert_eq!(progress.entropy, 0);
    }

    #[tokio::test]
    async fn scenario_fresh_user_to_level_two() {
        // +50 publish, +5 +5 likes, +10 save, +15 +15 comments = 100 XP.
        let game = system();
        let own = game.publish_pin(draft("u1", "Alice")).await.unwrap();
        let other_a = game.publish_pin(draft("u2", "Bob")).await.unwrap();
        let other_b = game.publish_pin(draft("u3", "Carol")).await.unwrap();

        game.toggle_like(&other_a.id, "u1").await.unwrap();
        game.toggle_like(&other_b.id, "u1").await.unwrap();
        game.toggle_save(&other_a.id, "u1").await.unwrap();
        game.add_comment(&other_a.id, "u1", "Alice", "one").await.unwrap();
        game.add_comment(&other_b.id, "u1", "Alice", "two").await.unwrap();

        let progress = game.progress().get("u1").await.unwrap();
        assert_eq!(progress.entropy, 100);
        assert_eq!(progress.level, 2);
        assert!(progress.badges.contains(&"genesis".to_string()));
        assert_eq!(own.like_count, 0);
    }

    #[tokio::test]
    async fn log_labels_truncate_long_ids() {
        let game = system();
        let pin = game.publish_pin(draft("owner", "Owner")).await.unwrap();
        game.toggle_like(&pin.id, "abcdefghij").await.unwrap();

        settle().await;
        let window = game.activity().recent().await.unwrap();
        let like = window
            .iter()
            .find(|e| e.action == LogAction::Like)
            .unwrap();
        assert_eq!(like.user, "abcdef");
        assert_eq!(
            like.detail,
            format!("Signal locked on Pin #{}", &pin.id[..4])
        );
    }
}

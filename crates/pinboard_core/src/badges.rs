//! crates/pinboard_core/src/badges.rs
//!
//! The static badge catalog and the pure eligibility check.

use crate::domain::UserProgress;

/// Which counter a badge watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeCounter {
    Xp,
    PinsCreated,
    LikesGiven,
    PinsSaved,
    CommentsMade,
}

/// A badge definition: unlocked once the watched counter crosses the
/// threshold. Loaded once at process start, immutable thereafter.
#[derive(Debug, Clone, Copy)]
pub struct BadgeDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Icon name consumed by the web client.
    pub icon: &'static str,
    pub counter: BadgeCounter,
    pub threshold: u64,
}

pub const BADGES: [BadgeDefinition; 6] = [
    BadgeDefinition {
        id: "genesis",
        name: "Genesis Protocol",
        description: "Upload your first visual entry to the database.",
        icon: "Upload",
        counter: BadgeCounter::PinsCreated,
        threshold: 1,
    },
    BadgeDefinition {
        id: "curator_v1",
        name: "Curator V1",
        description: "Upload 5 entries.",
        icon: "Layers",
        counter: BadgeCounter::PinsCreated,
        threshold: 5,
    },
    BadgeDefinition {
        id: "critic",
        name: "Feedback Loop",
        description: "Leave 5 comments on the network.",
        icon: "MessageSquare",
        counter: BadgeCounter::CommentsMade,
        threshold: 5,
    },
    BadgeDefinition {
        id: "supporter",
        name: "Signal Boost",
        description: "Like 10 entries.",
        icon: "Heart",
        counter: BadgeCounter::LikesGiven,
        threshold: 10,
    },
    BadgeDefinition {
        id: "collector",
        name: "Data Hoarder",
        description: "Save 10 entries to your collection.",
        icon: "Bookmark",
        counter: BadgeCounter::PinsSaved,
        threshold: 10,
    },
    BadgeDefinition {
        id: "veteran",
        name: "Core System",
        description: "Reach 1000 Entropy (XP).",
        icon: "Cpu",
        counter: BadgeCounter::Xp,
        threshold: 1000,
    },
];

/// Looks a badge up by id.
pub fn badge_by_id(id: &str) -> Option<&'static BadgeDefinition> {
    BADGES.iter().find(|b| b.id == id)
}

fn counter_value(progress: &UserProgress, counter: BadgeCounter) -> u64 {
    match counter {
        BadgeCounter::Xp => progress.entropy,
        BadgeCounter::PinsCreated => progress.pins_created,
        BadgeCounter::LikesGiven => progress.likes_given,
        BadgeCounter::PinsSaved => progress.pins_saved,
        BadgeCounter::CommentsMade => progress.comments_made,
    }
}

/// Returns the ids of every badge whose condition holds for `progress`.
///
/// Pure and order-independent; callers union the result into the user's
/// existing badge set (badges are never removed, so a union is all that is
/// ever needed).
pub fn evaluate_badges(progress: &UserProgress) -> Vec<&'static str> {
    BADGES
        .iter()
        .filter(|badge| counter_value(progress, badge.counter) >= badge.threshold)
        .map(|badge| badge.id)
        .collect()
}

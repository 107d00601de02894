pub mod activity;
pub mod badges;
pub mod domain;
pub mod engagement;
pub mod gamification;
pub mod levels;
pub mod pins;
pub mod ports;
pub mod profile;
pub mod progress;
pub mod tree;

#[cfg(test)]
mod testing;

pub use activity::{ActivityLog, LogStream, LOG_WINDOW};
pub use badges::{evaluate_badges, BadgeCounter, BadgeDefinition, BADGES};
pub use domain::{Comment, LogAction, LogEntry, Pin, PinDraft, ProgressEventKind, UserProgress};
pub use engagement::{EngagementKind, EngagementStore, ToggleOutcome};
pub use gamification::{xp, Gamification};
pub use levels::{level_for_xp, level_title, next_level_threshold, LEVEL_THRESHOLDS, LEVEL_TITLES};
pub use pins::{PinFilter, PinStore, PinStream, FEED_WINDOW};
pub use ports::{PortError, PortResult, RealtimeStore, UpdateFn, ValueStream};
pub use profile::{ProfileStore, ProfileStream, UserProfile};
pub use progress::{ProgressStore, ProgressStream};

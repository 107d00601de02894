//! crates/pinboard_core/src/levels.rs
//!
//! The static level table: cumulative-XP thresholds and level titles.

/// Minimum cumulative XP to reach level `i + 1`.
pub const LEVEL_THRESHOLDS: [u64; 10] = [
    0,     // Level 1: Observer
    100,   // Level 2: Scraper
    300,   // Level 3: Curator
    600,   // Level 4: Archivist
    1000,  // Level 5: Node Operator
    1500,  // Level 6: Data Broker
    2200,  // Level 7: System Architect
    3000,  // Level 8: Network Override
    4000,  // Level 9: Root Admin
    50000, // Level 10: The Singularity
];

/// Display title for level `i + 1`.
pub const LEVEL_TITLES: [&str; 10] = [
    "Observer",
    "Scraper",
    "Curator",
    "Archivist",
    "Node Operator",
    "Data Broker",
    "System Architect",
    "Network Override",
    "Root Admin",
    "Singularity",
];

/// Returns the highest level whose threshold is at or below `xp`.
/// Anything below the first non-zero threshold is level 1.
pub fn level_for_xp(xp: u64) -> u32 {
    for (i, threshold) in LEVEL_THRESHOLDS.iter().enumerate().rev() {
        if xp >= *threshold {
            return i as u32 + 1;
        }
    }
    1
}

/// The cumulative XP needed to reach the level after `level`.
///
/// Saturates at the final threshold when already at (or past) the cap: the
/// progress bar simply shows 100% forever instead of erroring.
pub fn next_level_threshold(level: u32) -> u64 {
    LEVEL_THRESHOLDS
        .get(level as usize)
        .copied()
        .unwrap_or(LEVEL_THRESHOLDS[LEVEL_THRESHOLDS.len() - 1])
}

/// Display title for a level, clamped into the defined range.
pub fn level_title(level: u32) -> &'static str {
    let idx = (level.max(1) as usize - 1).min(LEVEL_TITLES.len() - 1);
    LEVEL_TITLES[idx]
}

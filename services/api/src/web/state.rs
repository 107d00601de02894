//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use pinboard_core::gamification::Gamification;
use pinboard_core::ports::RealtimeStore;
use pinboard_core::profile::ProfileStore;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all
/// handlers.
#[derive(Clone)]
pub struct AppState {
    /// The injected store client; everything mutable lives behind this.
    pub store: Arc<dyn RealtimeStore>,
    /// The orchestrator wiring the pin, progress, engagement, and activity
    /// stores together.
    pub gamification: Gamification,
    /// Profile data lives outside the gamification flows; no action on it
    /// awards XP or logs activity.
    pub profiles: ProfileStore,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn RealtimeStore>, config: Arc<Config>) -> Self {
        Self {
            gamification: Gamification::new(store.clone()),
            profiles: ProfileStore::new(store.clone()),
            store,
            config,
        }
    }
}

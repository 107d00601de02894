//! services/api/src/adapters/memory_store.rs
//!
//! This module contains the store adapter: the concrete implementation of
//! the `RealtimeStore` port from the `pinboard_core` crate. It keeps the
//! whole document tree in process memory and provides the transaction
//! semantics the core relies on through an explicit compare-and-swap retry
//! loop: read the record's version, run the update closure outside the
//! lock, commit only if the version is unchanged, and otherwise retry with
//! bounded backoff against the freshly committed value.

use async_trait::async_trait;
use chrono::Utc;
use pinboard_core::ports::{PortError, PortResult, RealtimeStore, UpdateFn, ValueStream};
use pinboard_core::tree;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::broadcast;

/// Maximum CAS attempts per transaction before giving up. Matches the
/// retry budget of the hosted realtime database this adapter stands in
/// for.
const MAX_TRANSACTION_RETRIES: u32 = 25;

const INITIAL_BACKOFF: Duration = Duration::from_millis(1);
const MAX_BACKOFF: Duration = Duration::from_millis(64);

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An in-memory store adapter that implements the `RealtimeStore` port.
#[derive(Clone)]
pub struct MemoryStore {
    shared: Arc<Shared>,
}

struct Shared {
    state: Mutex<TreeState>,
    /// Committed paths, fanned out to subscribers.
    events: broadcast::Sender<String>,
    push_seq: AtomicU64,
}

struct TreeState {
    root: Value,
    /// Last commit sequence per written path; a record's version is the
    /// newest commit that touched it, an ancestor, or a descendant.
    versions: HashMap<String, u64>,
    commit_seq: u64,
}

impl TreeState {
    fn version_of(&self, path: &str) -> u64 {
        self.versions
            .iter()
            .filter(|(written, _)| tree::paths_overlap(written, path))
            .map(|(_, seq)| *seq)
            .max()
            .unwrap_or(0)
    }

    fn commit(&mut self, path: &str) {
        self.commit_seq += 1;
        // A commit at `path` supersedes every recorded version at or below
        // it, so dominated entries can be dropped and the map stays
        // proportional to the set of records written at distinct paths,
        // not to the total number of commits.
        self.versions
            .retain(|written, _| !tree::path_contains(path, written));
        self.versions.insert(path.to_string(), self.commit_seq);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(TreeState {
                    root: Value::Null,
                    versions: HashMap::new(),
                    commit_seq: 0,
                }),
                events,
                push_seq: AtomicU64::new(0),
            }),
        }
    }
}

impl Shared {
    /// A poisoned lock still guards a structurally consistent tree (every
    /// mutation is a single `set_at`/`remove_at`), so recover the guard
    /// instead of propagating the panic of an unrelated thread.
    fn lock(&self) -> MutexGuard<'_, TreeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn snapshot(&self, path: &str) -> Option<Value> {
        tree::get_at(&self.lock().root, path).cloned()
    }

    fn notify(&self, path: &str) {
        // No receivers is fine; subscribers come and go.
        let _ = self.events.send(path.to_string());
    }

    /// Generates a child key that sorts lexicographically in creation
    /// order, like the push ids of the hosted database: a timestamp and a
    /// process-wide sequence number, plus a random suffix.
    fn push_key(&self) -> String {
        let seq = self.push_seq.fetch_add(1, Ordering::Relaxed);
        let millis = Utc::now().timestamp_millis().max(0);
        let entropy = uuid::Uuid::new_v4().simple().to_string();
        format!("{millis:013x}{seq:08x}{}", &entropy[..8])
    }
}

//=========================================================================================
// `RealtimeStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl RealtimeStore for MemoryStore {
    async fn get(&self, path: &str) -> PortResult<Option<Value>> {
        Ok(self.shared.snapshot(path))
    }

    async fn set(&self, path: &str, value: Value) -> PortResult<()> {
        {
            let mut state = self.shared.lock();
            tree::set_at(&mut state.root, path, value);
            state.commit(path);
        }
        self.shared.notify(path);
        Ok(())
    }

    async fn transact(&self, path: &str, update: UpdateFn) -> PortResult<Option<Value>> {
        let mut backoff = INITIAL_BACKOFF;
        for _ in 0..MAX_TRANSACTION_RETRIES {
            // Read the current value and its version, then run the closure
            // without holding the lock: the closure may be arbitrarily
            // slow and other writers must not be blocked by it.
            let (current, version) = {
                let state = self.shared.lock();
                (tree::get_at(&state.root, path).cloned(), state.version_of(path))
            };

            let Some(proposed) = update(current) else {
                // Aborted; nothing written.
                return Ok(None);
            };

            let committed = {
                let mut state = self.shared.lock();
                if state.version_of(path) == version {
                    tree::set_at(&mut state.root, path, proposed.clone());
                    state.commit(path);
                    true
                } else {
                    false
                }
            };
            if committed {
                self.shared.notify(path);
                return Ok(Some(proposed));
            }

            // Lost the race; re-read and try again against the new value.
            tokio::time::sleep(backoff).await;
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
        Err(PortError::Unavailable(format!(
            "transaction on {path} exceeded {MAX_TRANSACTION_RETRIES} retries"
        )))
    }

    async fn push(&self, path: &str, value: Value) -> PortResult<String> {
        let key = self.shared.push_key();
        let child = format!("{path}/{key}");
        {
            let mut state = self.shared.lock();
            tree::set_at(&mut state.root, &child, value);
            // Version the collection, not the fresh child: every child key
            // is unique, so per-child entries would grow one per append
            // forever, while the collection entry is reused.
            state.commit(path);
        }
        self.shared.notify(&child);
        Ok(key)
    }

    async fn remove(&self, path: &str) -> PortResult<()> {
        {
            let mut state = self.shared.lock();
            tree::remove_at(&mut state.root, path);
            state.commit(path);
        }
        self.shared.notify(path);
        Ok(())
    }

    async fn subscribe(&self, path: &str) -> PortResult<ValueStream> {
        let mut events = self.shared.events.subscribe();
        let shared = self.shared.clone();
        let path = path.to_string();
        Ok(Box::pin(async_stream::stream! {
            yield shared.snapshot(&path);
            loop {
                match events.recv().await {
                    Ok(changed) if tree::paths_overlap(&path, &changed) => {
                        yield shared.snapshot(&path);
                    }
                    Ok(_) => continue,
                    // Missed some commits; the fresh snapshot resyncs us.
                    Err(broadcast::error::RecvError::Lagged(_)) => {
                        yield shared.snapshot(&path);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }))
    }
}

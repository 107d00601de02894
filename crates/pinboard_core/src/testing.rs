//! crates/pinboard_core/src/testing.rs
//!
//! A minimal in-memory [`RealtimeStore`] fake for this crate's unit tests.
//! Every operation runs under one mutex, so each call is trivially atomic;
//! the conflict-retry behavior of a real store is exercised separately, in
//! the service crate's tests against the production adapter.

use crate::ports::{PortResult, RealtimeStore, UpdateFn, ValueStream};
use crate::tree;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;

#[derive(Default)]
pub struct FakeStore {
    state: Mutex<FakeState>,
    push_seq: AtomicU64,
}

#[derive(Default)]
struct FakeState {
    root: Value,
    watchers: Vec<Watcher>,
}

struct Watcher {
    path: String,
    tx: mpsc::UnboundedSender<Option<Value>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct snapshot access for assertions.
    pub fn snapshot(&self, path: &str) -> Option<Value> {
        let state = self.state.lock().unwrap();
        tree::get_at(&state.root, path).cloned()
    }
}

fn notify(state: &mut FakeState, changed: &str) {
    state.watchers.retain(|w| !w.tx.is_closed());
    for watcher in &state.watchers {
        if tree::paths_overlap(&watcher.path, changed) {
            let snapshot = tree::get_at(&state.root, &watcher.path).cloned();
            let _ = watcher.tx.send(snapshot);
        }
    }
}

#[async_trait]
impl RealtimeStore for FakeStore {
    async fn get(&self, path: &str) -> PortResult<Option<Value>> {
        Ok(self.snapshot(path))
    }

    async fn set(&self, path: &str, value: Value) -> PortResult<()> {
        let mut state = self.state.lock().unwrap();
        tree::set_at(&mut state.root, path, value);
        notify(&mut state, path);
        Ok(())
    }

    async fn transact(&self, path: &str, update: UpdateFn) -> PortResult<Option<Value>> {
        let mut state = self.state.lock().unwrap();
        let current = tree::get_at(&state.root, path).cloned();
        match update(current) {
            Some(new_value) => {
                tree::set_at(&mut state.root, path, new_value.clone());
                notify(&mut state, path);
                Ok(Some(new_value))
            }
            None => Ok(None),
        }
    }

    async fn push(&self, path: &str, value: Value) -> PortResult<String> {
        let seq = self.push_seq.fetch_add(1, Ordering::Relaxed);
        let key = format!("fk{seq:010}");
        let mut state = self.state.lock().unwrap();
        let child = format!("{path}/{key}");
        tree::set_at(&mut state.root, &child, value);
        notify(&mut state, &child);
        Ok(key)
    }

    async fn remove(&self, path: &str) -> PortResult<()> {
        let mut state = self.state.lock().unwrap();
        tree::remove_at(&mut state.root, path);
        notify(&mut state, path);
        Ok(())
    }

    async fn subscribe(&self, path: &str) -> PortResult<ValueStream> {
        let (tx, rx) = mpsc::unbounded_channel();
        {
            let mut state = self.state.lock().unwrap();
            let _ = tx.send(tree::get_at(&state.root, path).cloned());
            state.watchers.push(Watcher {
                path: path.to_string(),
                tx,
            });
        }
        Ok(Box::pin(futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|value| (value, rx))
        })))
    }
}

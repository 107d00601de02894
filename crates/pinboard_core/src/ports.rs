//! crates/pinboard_core/src/ports.rs
//!
//! Defines the service contract (trait) required from the realtime document
//! store. This trait forms the boundary of the hexagonal architecture: the
//! core is independent of the concrete backing store, so an in-memory
//! implementation can stand in for the hosted database during tests.

use async_trait::async_trait;
use futures::Stream;
use serde_json::Value;
use std::pin::Pin;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from the backing store.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Store Port (Trait)
//=========================================================================================

/// The update closure passed to [`RealtimeStore::transact`].
///
/// It receives the current value at the path (`None` when no record exists)
/// and returns the value to commit, or `None` to abort the transaction.
/// The store may run it multiple times, once per conflict retry, so it must
/// be a re-runnable `Fn` with no one-shot side effects.
pub type UpdateFn = Box<dyn Fn(Option<Value>) -> Option<Value> + Send + Sync>;

/// A live view of the record at a path: fires once immediately with the
/// current value, then again after every committed change touching the
/// record or anything inside it. Dropping the stream unsubscribes.
pub type ValueStream = Pin<Box<dyn Stream<Item = Option<Value>> + Send>>;

/// Abstract operations of a realtime JSON-tree document store.
///
/// Paths are slash-separated (`users/{id}/stats`, `pins/{id}/comments`) and
/// address subtrees of a single JSON document, mirroring the schema of the
/// hosted realtime database the application was built against.
#[async_trait]
pub trait RealtimeStore: Send + Sync {
    /// Reads the value at `path`, or `None` if no record exists there.
    async fn get(&self, path: &str) -> PortResult<Option<Value>>;

    /// Overwrites the value at `path`, creating intermediate records as needed.
    async fn set(&self, path: &str, value: Value) -> PortResult<()>;

    /// Atomic read-modify-write at `path`.
    ///
    /// The store guarantees that the committed value was produced by
    /// `update` from the latest committed state: on a conflicting
    /// concurrent write the closure is re-run against the fresh value until
    /// the commit succeeds. Returns the committed value, or `None` when the
    /// closure aborted. Contention is never surfaced to the caller; only a
    /// store-level failure (connectivity loss, retry budget exhausted) is.
    async fn transact(&self, path: &str, update: UpdateFn) -> PortResult<Option<Value>>;

    /// Creates a new child record under the collection at `path` with a
    /// generated key, and returns that key. Generated keys sort
    /// lexicographically in creation order.
    async fn push(&self, path: &str, value: Value) -> PortResult<String>;

    /// Deletes the record or subtree at `path`. Deleting a missing path is
    /// not an error.
    async fn remove(&self, path: &str) -> PortResult<()>;

    /// Subscribes to the record at `path`. See [`ValueStream`].
    async fn subscribe(&self, path: &str) -> PortResult<ValueStream>;
}

//! crates/pinboard_core/src/tree.rs
//!
//! Path addressing over a single JSON document, shared by store
//! implementations. Paths are slash-separated; empty segments are ignored,
//! so `"pins/abc"` and `"/pins/abc/"` address the same subtree.

use serde_json::{Map, Value};

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Borrows the subtree at `path`, or `None` if any segment is missing.
pub fn get_at<'v>(root: &'v Value, path: &str) -> Option<&'v Value> {
    let mut node = root;
    for segment in segments(path) {
        node = node.as_object()?.get(segment)?;
    }
    Some(node)
}

/// Writes `value` at `path`, replacing whatever was there. Intermediate
/// nodes are created as objects; a non-object intermediate is overwritten.
pub fn set_at(root: &mut Value, path: &str, value: Value) {
    let mut node = root;
    for segment in segments(path) {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        let Value::Object(map) = node else { return };
        node = map.entry(segment.to_string()).or_insert(Value::Null);
    }
    *node = value;
}

/// Removes the record at `path`. Removing a missing path is a no-op.
pub fn remove_at(root: &mut Value, path: &str) {
    let segs: Vec<&str> = segments(path).collect();
    let Some((last, parents)) = segs.split_last() else {
        // Empty path: clear the whole document.
        *root = Value::Null;
        return;
    };
    let mut node = root;
    for segment in parents {
        match node.as_object_mut().and_then(|m| m.get_mut(*segment)) {
            Some(child) => node = child,
            None => return,
        }
    }
    if let Some(map) = node.as_object_mut() {
        map.remove(*last);
    }
}

/// Whether `ancestor` addresses `path` itself or a record above it.
pub fn path_contains(ancestor: &str, path: &str) -> bool {
    let mut a = segments(ancestor);
    let mut b = segments(path);
    loop {
        match (a.next(), b.next()) {
            (Some(x), Some(y)) if x == y => continue,
            (Some(_), _) => return false,
            (None, _) => return true,
        }
    }
}

/// Whether a write at `changed` is visible from a subscription at
/// `watched`: true when one path is the other, an ancestor of the other,
/// or a descendant of the other.
pub fn paths_overlap(watched: &str, changed: &str) -> bool {
    let mut a = segments(watched);
    let mut b = segments(changed);
    loop {
        match (a.next(), b.next()) {
            (Some(x), Some(y)) if x == y => continue,
            (Some(_), Some(_)) => return false,
            // One path exhausted: ancestor/descendant relation.
            _ => return true,
        }
    }
}

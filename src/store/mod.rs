//! Path-addressed JSON document store with per-path change listeners.
//!
//! Data is a single JSON tree. Writing `null` (or `None` in a multi-path update)
//! removes the node, and objects left empty by a removal are pruned.

pub mod json_file;
pub mod memory;

use std::{fmt, str::FromStr, sync::Arc};

use serde_json::Value;

use crate::errors::{OikosError, Result};

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

const FORBIDDEN_KEY_CHARS: [char; 5] = ['.', '#', '$', '[', ']'];

/// Slash separated location inside the document tree. The empty path is the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses `users/u1/expenses`. Leading, trailing and repeated slashes are ignored.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut path = Self::root();
        for segment in raw.split('/').filter(|s| !s.is_empty()) {
            path = path.child(segment)?;
        }
        Ok(path)
    }

    pub fn child(&self, segment: &str) -> Result<Self> {
        validate_segment(segment)?;
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let mut segments = self.segments.clone();
        segments.pop();
        Some(Self { segments })
    }

    /// True when `self` equals `other` or contains it.
    pub fn is_ancestor_or_self(&self, other: &StorePath) -> bool {
        other.segments.starts_with(&self.segments)
    }

    /// True when a write at `changed` can alter the value observed at `self`.
    pub fn overlaps(&self, changed: &StorePath) -> bool {
        self.is_ancestor_or_self(changed) || changed.is_ancestor_or_self(self)
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("/");
        }
        f.write_str(&self.segments.join("/"))
    }
}

impl FromStr for StorePath {
    type Err = OikosError;

    fn from_str(raw: &str) -> Result<Self> {
        Self::parse(raw)
    }
}

fn validate_segment(segment: &str) -> Result<()> {
    if segment.is_empty() || segment.trim().is_empty() {
        return Err(OikosError::InvalidPath("empty path segment".into()));
    }
    if segment.contains('/') {
        return Err(OikosError::InvalidPath(format!(
            "segment `{segment}` must not contain `/`"
        )));
    }
    if let Some(ch) = segment.chars().find(|c| FORBIDDEN_KEY_CHARS.contains(c)) {
        return Err(OikosError::InvalidPath(format!(
            "segment `{segment}` contains forbidden character `{ch}`"
        )));
    }
    Ok(())
}

/// Callback receiving the value at the watched path, `None` when it is absent.
pub type Listener = Arc<dyn Fn(Option<Value>) + Send + Sync>;

/// One entry of a multi-path update. `None` deletes the node.
pub type PathUpdate = (StorePath, Option<Value>);

/// Storage seam used by the repository. Implementations must apply each
/// `update` call atomically and invoke listeners without holding internal locks.
pub trait DocumentStore: Send + Sync {
    fn get(&self, path: &StorePath) -> Result<Option<Value>>;

    /// Replaces the node at `path`.
    fn set(&self, path: &StorePath, value: Value) -> Result<()> {
        self.update(vec![(path.clone(), Some(value))])
    }

    /// Applies every entry or none of them.
    fn update(&self, updates: Vec<PathUpdate>) -> Result<()>;

    fn remove(&self, path: &StorePath) -> Result<()> {
        self.update(vec![(path.clone(), None)])
    }

    /// Registers `listener` for `path`. The listener receives the current value
    /// immediately and again after every write touching `path`, its ancestors or
    /// its descendants, until the returned handle is cancelled or dropped.
    fn subscribe(&self, path: &StorePath, listener: Listener) -> Result<Subscription>;
}

/// Cancelable registration handle. Dropping it detaches the listener.
#[must_use = "dropping a Subscription cancels it"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Handle that owns nothing; cancelling it is a no-op.
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    pub fn cancel(mut self) {
        self.run_cancel();
    }

    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Returns the node at `path` inside `tree`.
pub(crate) fn value_at<'a>(tree: &'a Value, path: &StorePath) -> Option<&'a Value> {
    let mut current = tree;
    for segment in path.segments() {
        current = current.as_object()?.get(segment)?;
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// Writes or removes the node at `path`, creating intermediate objects and
/// pruning objects emptied by a removal.
pub(crate) fn write_at(tree: &mut Value, path: &StorePath, value: Option<Value>) {
    let value = value.filter(|v| !v.is_null());
    match value {
        Some(value) => insert_at(tree, path.segments(), value),
        None => {
            if path.is_root() {
                *tree = Value::Object(Default::default());
            } else {
                remove_at(tree, path.segments());
            }
        }
    }
}

fn insert_at(node: &mut Value, segments: &[String], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *node = value;
        return;
    };
    if !node.is_object() {
        *node = Value::Object(Default::default());
    }
    if let Value::Object(map) = node {
        let child = map.entry(head.clone()).or_insert(Value::Null);
        insert_at(child, rest, value);
    }
}

/// Returns true when `node` became empty and should be pruned by its parent.
fn remove_at(node: &mut Value, segments: &[String]) -> bool {
    let Some((head, rest)) = segments.split_first() else {
        return true;
    };
    let Value::Object(map) = node else {
        return false;
    };
    let prune_child = match map.get_mut(head) {
        Some(child) => remove_at(child, rest),
        None => false,
    };
    if prune_child {
        map.remove(head);
    }
    map.is_empty()
}

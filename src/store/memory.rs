use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, RwLock, Weak,
};

use serde_json::Value;
use tracing::{debug, trace};

use crate::errors::{OikosError, Result};

use super::{value_at, write_at, DocumentStore, Listener, PathUpdate, StorePath, Subscription};

struct ListenerEntry {
    id: u64,
    path: StorePath,
    callback: Listener,
}

struct Inner {
    tree: RwLock<Value>,
    listeners: Mutex<Vec<ListenerEntry>>,
    next_listener: AtomicU64,
}

/// In-process document store. Clones share the same tree.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_tree(Value::Object(Default::default()))
    }

    pub fn with_tree(tree: Value) -> Self {
        let tree = if tree.is_object() {
            tree
        } else {
            Value::Object(Default::default())
        };
        Self {
            inner: Arc::new(Inner {
                tree: RwLock::new(tree),
                listeners: Mutex::new(Vec::new()),
                next_listener: AtomicU64::new(1),
            }),
        }
    }

    /// Deep copy of the whole tree.
    pub fn snapshot(&self) -> Result<Value> {
        let tree = self.inner.tree.read().map_err(lock_error)?;
        Ok(tree.clone())
    }

    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .lock()
            .map(|listeners| listeners.len())
            .unwrap_or(0)
    }

    /// Applies `updates` to a staged copy, hands the staged tree to `before_commit`
    /// and only swaps it in when the hook succeeds. Listeners run after the swap.
    pub(crate) fn commit_with<F>(&self, updates: Vec<PathUpdate>, before_commit: F) -> Result<()>
    where
        F: FnOnce(&Value) -> Result<()>,
    {
        if updates.is_empty() {
            return Ok(());
        }
        let changed: Vec<StorePath> = updates.iter().map(|(path, _)| path.clone()).collect();
        {
            let mut tree = self.inner.tree.write().map_err(lock_error)?;
            let mut staged = tree.clone();
            for (path, value) in updates {
                write_at(&mut staged, &path, value);
            }
            before_commit(&staged)?;
            *tree = staged;
        }
        debug!(paths = changed.len(), "store updated");
        self.notify(&changed)
    }

    /// Replaces the entire tree and notifies every listener.
    pub(crate) fn replace_tree<F>(&self, tree: Value, before_commit: F) -> Result<()>
    where
        F: FnOnce(&Value) -> Result<()>,
    {
        self.commit_with(vec![(StorePath::root(), Some(tree))], before_commit)
    }

    fn notify(&self, changed: &[StorePath]) -> Result<()> {
        let targets: Vec<(StorePath, Listener)> = {
            let listeners = self.inner.listeners.lock().map_err(lock_error)?;
            listeners
                .iter()
                .filter(|entry| changed.iter().any(|path| entry.path.overlaps(path)))
                .map(|entry| (entry.path.clone(), Arc::clone(&entry.callback)))
                .collect()
        };
        for (path, callback) in targets {
            let value = self.get(&path)?;
            trace!(path = %path, "notifying listener");
            callback(value);
        }
        Ok(())
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, path: &StorePath) -> Result<Option<Value>> {
        let tree = self.inner.tree.read().map_err(lock_error)?;
        Ok(value_at(&tree, path).cloned())
    }

    fn update(&self, updates: Vec<PathUpdate>) -> Result<()> {
        self.commit_with(updates, |_| Ok(()))
    }

    fn subscribe(&self, path: &StorePath, listener: Listener) -> Result<Subscription> {
        let id = self.inner.next_listener.fetch_add(1, Ordering::Relaxed);
        {
            let mut listeners = self.inner.listeners.lock().map_err(lock_error)?;
            listeners.push(ListenerEntry {
                id,
                path: path.clone(),
                callback: Arc::clone(&listener),
            });
        }
        listener(self.get(path)?);

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        Ok(Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                if let Ok(mut listeners) = inner.listeners.lock() {
                    listeners.retain(|entry| entry.id != id);
                }
            }
        }))
    }
}

fn lock_error<T>(_: std::sync::PoisonError<T>) -> OikosError {
    OikosError::Storage("store lock poisoned".into())
}

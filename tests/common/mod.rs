#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use chrono::{DateTime, TimeZone, Utc};
use oikos_core::{
    errors::{OikosError, Result},
    repository::UserRepository,
    store::{DocumentStore, Listener, MemoryStore, PathUpdate, StorePath, Subscription},
};
use once_cell::sync::Lazy;
use serde_json::Value;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Fresh directory that outlives the calling test.
pub fn temp_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

pub fn memory_repo(user: &str) -> UserRepository {
    UserRepository::new(Arc::new(MemoryStore::new()), user).expect("create repository")
}

pub fn ts(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

/// Store that rejects any update touching a path segment listed in `poisoned`.
pub struct FailingStore {
    inner: MemoryStore,
    poisoned: Mutex<Vec<String>>,
}

impl FailingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryStore::new(),
            poisoned: Mutex::new(Vec::new()),
        })
    }

    pub fn poison(&self, segment: &str) {
        self.poisoned.lock().unwrap().push(segment.to_string());
    }

    pub fn heal(&self) {
        self.poisoned.lock().unwrap().clear();
    }

    fn is_poisoned(&self, path: &StorePath) -> bool {
        let poisoned = self.poisoned.lock().unwrap();
        path.segments()
            .iter()
            .any(|segment| poisoned.iter().any(|p| p == segment))
    }
}

impl DocumentStore for FailingStore {
    fn get(&self, path: &StorePath) -> Result<Option<Value>> {
        if self.is_poisoned(path) {
            return Err(OikosError::Storage(format!("read refused at {path}")));
        }
        self.inner.get(path)
    }

    fn update(&self, updates: Vec<PathUpdate>) -> Result<()> {
        if let Some((path, _)) = updates.iter().find(|(path, _)| self.is_poisoned(path)) {
            return Err(OikosError::Storage(format!("write refused at {path}")));
        }
        self.inner.update(updates)
    }

    fn subscribe(&self, path: &StorePath, listener: Listener) -> Result<Subscription> {
        self.inner.subscribe(path, listener)
    }
}

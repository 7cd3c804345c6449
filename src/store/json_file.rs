use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    errors::{OikosError, Result},
    utils::persistence::{
        backup_file_path, ensure_dir, is_plain_file_name, list_backup_files, prune_backup_files,
        read_json, write_json_atomic, DEFAULT_BACKUP_RETENTION,
    },
};

use super::{DocumentStore, Listener, MemoryStore, PathUpdate, StorePath, Subscription};

const BACKUP_DIR: &str = "backups";

/// Document store persisted to a single JSON file after every committed write.
#[derive(Clone)]
pub struct JsonFileStore {
    memory: MemoryStore,
    file: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonFileStore {
    /// Opens `file`, loading its tree when present. Backups are kept in a
    /// `backups/` directory next to the file.
    pub fn open(file: impl Into<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let file = file.into();
        let parent = file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        ensure_dir(&parent)?;
        let tree = if file.exists() {
            let tree: Value = read_json(&file)?;
            info!(path = %file.display(), "loaded document store");
            tree
        } else {
            Value::Object(Default::default())
        };
        Ok(Self {
            memory: MemoryStore::with_tree(tree),
            backups_dir: parent.join(BACKUP_DIR),
            file,
            retention: retention.unwrap_or(DEFAULT_BACKUP_RETENTION).max(1),
        })
    }

    pub fn path(&self) -> &Path {
        &self.file
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    /// Writes the current tree to a timestamped backup and prunes old ones.
    pub fn backup(&self, note: Option<&str>) -> Result<PathBuf> {
        ensure_dir(&self.backups_dir)?;
        let tree = self.memory.snapshot()?;
        let path = backup_file_path(&self.backups_dir, &self.stem(), Utc::now(), note);
        write_json_atomic(&path, &tree)?;
        prune_backup_files(&self.backups_dir, &self.stem(), self.retention)?;
        info!(backup = %path.display(), "store backup created");
        Ok(path)
    }

    /// Backup file names, newest first.
    pub fn list_backups(&self) -> Result<Vec<String>> {
        list_backup_files(&self.backups_dir, &self.stem())
    }

    /// Replaces the live tree with the named backup and notifies every listener.
    pub fn restore(&self, backup_name: &str) -> Result<()> {
        if !is_plain_file_name(backup_name) {
            return Err(OikosError::InvalidInput(format!(
                "invalid backup name `{backup_name}`"
            )));
        }
        let path = self.backups_dir.join(backup_name);
        if !path.exists() {
            return Err(OikosError::NotFound(format!("backup `{backup_name}`")));
        }
        let tree: Value = read_json(&path)?;
        if !tree.is_object() {
            return Err(OikosError::Storage(format!(
                "backup `{backup_name}` does not contain a document tree"
            )));
        }
        let file = self.file.clone();
        self.memory
            .replace_tree(tree, |staged| write_json_atomic(&file, staged))?;
        info!(backup = %backup_name, "store restored from backup");
        Ok(())
    }

    fn stem(&self) -> String {
        self.file
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .unwrap_or("store")
            .replace('_', "-")
    }
}

impl DocumentStore for JsonFileStore {
    fn get(&self, path: &StorePath) -> Result<Option<Value>> {
        self.memory.get(path)
    }

    fn update(&self, updates: Vec<PathUpdate>) -> Result<()> {
        let file = self.file.clone();
        self.memory
            .commit_with(updates, |staged| write_json_atomic(&file, staged))
            .map_err(|err| {
                warn!(path = %self.file.display(), error = %err, "store write rejected");
                err
            })
    }

    fn subscribe(&self, path: &StorePath, listener: Listener) -> Result<Subscription> {
        self.memory.subscribe(path, listener)
    }
}

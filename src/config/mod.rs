//! Persistent JSON configuration with timestamped backups.

use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    core::services::CatchUpPolicy,
    errors::{OikosError, Result},
    utils::persistence::{
        backup_file_path, ensure_dir, is_plain_file_name, list_backup_files, prune_backup_files,
        read_json, write_json_atomic, DEFAULT_BACKUP_RETENTION,
    },
    worker::Schedule,
};

pub const HOME_ENV: &str = "OIKOS_HOME";
const DEFAULT_DIR_NAME: &str = "oikos";
const CONFIG_FILE: &str = "config.json";
const CONFIG_BACKUP_DIR: &str = "config_backups";
const CONFIG_BACKUP_STEM: &str = "config";
const DEFAULT_STORE_FILE: &str = "store.json";

/// Application data directory: `$OIKOS_HOME` when set, otherwise the platform
/// data directory joined with `oikos`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecurringConfig {
    pub initial_delay_secs: u64,
    pub period_secs: u64,
    pub catch_up: CatchUpPolicy,
}

impl Default for RecurringConfig {
    fn default() -> Self {
        Self {
            initial_delay_secs: 60 * 60,
            period_secs: 24 * 60 * 60,
            catch_up: CatchUpPolicy::AdvanceOnce,
        }
    }
}

impl RecurringConfig {
    pub fn schedule(&self) -> Schedule {
        Schedule::new(
            Duration::from_secs(self.initial_delay_secs),
            Duration::from_secs(self.period_secs),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Overrides the directory holding the store file. Relative to the app dir when relative.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub store_file: String,
    pub backup_retention: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_user: Option<String>,
    pub recurring: RecurringConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            store_file: DEFAULT_STORE_FILE.into(),
            backup_retention: DEFAULT_BACKUP_RETENTION,
            log_filter: None,
            default_user: None,
            recurring: RecurringConfig::default(),
        }
    }
}

impl Config {
    /// Location of the document store file for an app directory `base`.
    pub fn store_path(&self, base: &Path) -> PathBuf {
        let dir = match &self.data_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => base.join(dir),
            None => base.to_path_buf(),
        };
        dir.join(&self.store_file)
    }

    pub fn validate(&self) -> Result<()> {
        if self.store_file.trim().is_empty() || !is_plain_file_name(&self.store_file) {
            return Err(OikosError::Config(format!(
                "store_file `{}` must be a plain file name",
                self.store_file
            )));
        }
        if self.backup_retention == 0 {
            return Err(OikosError::Config(
                "backup_retention must be at least 1".into(),
            ));
        }
        if self.recurring.period_secs == 0 {
            return Err(OikosError::Config(
                "recurring.period_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
    backups_dir: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: impl Into<PathBuf>) -> Result<Self> {
        let base = base.into();
        ensure_dir(&base)?;
        Ok(Self {
            path: base.join(CONFIG_FILE),
            backups_dir: base.join(CONFIG_BACKUP_DIR),
            base,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the configuration, falling back to defaults when no file exists yet.
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let config: Config = read_json(&self.path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;
        write_json_atomic(&self.path, config)?;
        info!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    /// Writes `config` to a timestamped backup and returns the backup file name.
    pub fn backup(&self, config: &Config, note: Option<&str>) -> Result<String> {
        ensure_dir(&self.backups_dir)?;
        let path = backup_file_path(&self.backups_dir, CONFIG_BACKUP_STEM, Utc::now(), note);
        write_json_atomic(&path, config)?;
        prune_backup_files(
            &self.backups_dir,
            CONFIG_BACKUP_STEM,
            config.backup_retention.max(1),
        )?;
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| OikosError::Storage("backup path has no file name".into()))?;
        info!(backup = %name, "configuration backup created");
        Ok(name)
    }

    pub fn list_backups(&self) -> Result<Vec<String>> {
        list_backup_files(&self.backups_dir, CONFIG_BACKUP_STEM)
    }

    /// Reads a backup without making it current; pair with [`ConfigManager::save`].
    pub fn restore(&self, backup_name: &str) -> Result<Config> {
        if !is_plain_file_name(backup_name) {
            return Err(OikosError::InvalidInput(format!(
                "invalid backup name `{backup_name}`"
            )));
        }
        let path = self.backups_dir.join(backup_name);
        if !path.exists() {
            return Err(OikosError::NotFound(format!(
                "configuration backup `{backup_name}`"
            )));
        }
        let config: Config = read_json(&path)?;
        config.validate()?;
        Ok(config)
    }
}

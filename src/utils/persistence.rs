use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::errors::Result;

pub const BACKUP_EXTENSION: &str = "json";
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
pub const DEFAULT_BACKUP_RETENTION: usize = 5;
const TMP_SUFFIX: &str = "tmp";

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Serializes `value` as pretty JSON into `path` by staging to a sibling temp file.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_atomic(path, &json)
}

pub fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let tmp = tmp_path(path);
    {
        let mut file = File::create(&tmp)?;
        file.write_all(data.as_bytes())?;
        file.flush()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

/// Lowercases a free-form backup note into a dash separated file name fragment.
pub fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Builds `{stem}_{timestamp}[_{note}].json` inside `dir`, adding a counter when the
/// name is already taken.
pub fn backup_file_path(dir: &Path, stem: &str, at: DateTime<Utc>, note: Option<&str>) -> PathBuf {
    let timestamp = at.format(BACKUP_TIMESTAMP_FORMAT).to_string();
    let mut base = format!("{}_{}", stem, timestamp);
    if let Some(label) = sanitize_backup_note(note) {
        base.push('_');
        base.push_str(&label);
    }
    let mut candidate = dir.join(format!("{}.{}", base, BACKUP_EXTENSION));
    let mut counter = 2;
    while candidate.exists() {
        candidate = dir.join(format!("{}-{}.{}", base, counter, BACKUP_EXTENSION));
        counter += 1;
    }
    candidate
}

/// Lists backup file names in `dir` starting with `stem`, newest first.
pub fn list_backup_files(dir: &Path, stem: &str) -> Result<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let prefix = format!("{}_", stem);
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
            continue;
        }
        let file_name = match path.file_name().and_then(|name| name.to_str()) {
            Some(name) if name.starts_with(&prefix) => name.to_string(),
            _ => continue,
        };
        entries.push(file_name);
    }
    entries.sort_by(|a, b| {
        parse_backup_timestamp(b)
            .cmp(&parse_backup_timestamp(a))
            .then_with(|| b.len().cmp(&a.len()))
            .then_with(|| b.cmp(a))
    });
    Ok(entries)
}

/// Deletes all but the newest `retention` backups.
pub fn prune_backup_files(dir: &Path, stem: &str, retention: usize) -> Result<()> {
    let backups = list_backup_files(dir, stem)?;
    for name in backups.iter().skip(retention.max(1)) {
        if let Err(err) = fs::remove_file(dir.join(name)) {
            tracing::warn!(backup = %name, error = %err, "failed to prune backup");
        }
    }
    Ok(())
}

/// Extracts the `YYYYmmdd_HHMMSS` timestamp embedded in a backup file name.
pub fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_suffix(&format!(".{}", BACKUP_EXTENSION))?;
    let parts: Vec<&str> = stem.split('_').collect();
    parts.windows(2).rev().find_map(|pair| {
        let date = pair[0];
        let time = pair[1].get(..6)?;
        if !is_digits(date, 8) || !is_digits(time, 6) {
            return None;
        }
        NaiveDateTime::parse_from_str(&format!("{}{}", date, time), "%Y%m%d%H%M%S")
            .ok()
            .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
    })
}

/// Rejects names that could escape the backup directory.
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('/')
        && !name.contains('\\')
        && name != "."
        && name != ".."
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

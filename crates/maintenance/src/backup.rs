use crate::{MaintenanceError, Result};
use chrono::{Local, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};

pub const BACKUP_EXTENSION: &str = "bak";
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Source of backup timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(NaiveDateTime),
}

impl Clock {
    pub fn now(&self) -> NaiveDateTime {
        match self {
            Clock::System => Local::now().naive_local(),
            Clock::Fixed(at) => *at,
        }
    }
}

/// `<file_name>.<YYYYMMDD_HHMMSS>.bak`
pub fn timestamped_backup_name(file_name: &str, at: NaiveDateTime) -> String {
    format!(
        "{file_name}.{}.{BACKUP_EXTENSION}",
        at.format(TIMESTAMP_FORMAT)
    )
}

/// Copy `file` into `backup_dir` under a timestamped name. An existing
/// backup with the same name gets a `-N` counter so nothing is overwritten.
pub fn timestamped_backup(file: &Path, backup_dir: &Path, at: NaiveDateTime) -> Result<PathBuf> {
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| MaintenanceError::Other(format!("{} has no file name", file.display())))?;

    fs::create_dir_all(backup_dir).map_err(|source| MaintenanceError::Backup {
        path: backup_dir.to_path_buf(),
        source,
    })?;

    let stamp = at.format(TIMESTAMP_FORMAT).to_string();
    let mut target = backup_dir.join(timestamped_backup_name(&file_name, at));
    let mut counter = 1;
    while target.exists() {
        target = backup_dir.join(format!("{file_name}.{stamp}-{counter}.{BACKUP_EXTENSION}"));
        counter += 1;
    }

    copy_to(file, &target)?;
    log::debug!("Backed up {} to {}", file.display(), target.display());
    Ok(target)
}

/// `<path>.bak` beside the original.
pub fn sibling_backup_path(file: &Path) -> PathBuf {
    let mut name = file.as_os_str().to_os_string();
    name.push(".");
    name.push(BACKUP_EXTENSION);
    PathBuf::from(name)
}

/// Copy `file` to `<file>.bak`, replacing any previous simple backup.
/// Returns `None` when there is nothing to back up.
pub fn sibling_backup(file: &Path) -> Result<Option<PathBuf>> {
    if !file.is_file() {
        return Ok(None);
    }
    let target = sibling_backup_path(file);
    copy_to(file, &target)?;
    Ok(Some(target))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub path: PathBuf,
    pub backup: Option<PathBuf>,
}

/// Write `content` to `file`, copying the previous content to `<file>.bak`
/// first. A failed backup is logged and does not stop the save.
pub fn save_with_backup(file: &Path, content: &str) -> Result<SaveOutcome> {
    let backup = match sibling_backup(file) {
        Ok(backup) => backup,
        Err(err) => {
            log::warn!("Backup of {} failed, saving anyway: {err}", file.display());
            None
        }
    };
    fs::write(file, content)?;
    Ok(SaveOutcome {
        path: file.to_path_buf(),
        backup,
    })
}

fn copy_to(file: &Path, target: &Path) -> Result<()> {
    fs::copy(file, target)
        .map(|_| ())
        .map_err(|source| MaintenanceError::Backup {
            path: target.to_path_buf(),
            source,
        })
}

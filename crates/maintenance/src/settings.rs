use crate::{MaintenanceError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SETTINGS_PATH: &str = "config/config.json";
pub const SETTINGS_PATH_ENV: &str = "NIKKARI_CONFIG";
pub const DEFAULT_PROJECT_NAME: &str = "bittinikkari";
pub const DEFAULT_BACKUP_DIR: &str = "backups";

/// Editor settings persisted as a flat JSON object.
///
/// Unknown keys are carried in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_project_name")]
    pub project_name: String,

    /// Path of the active manifest; empty when no project is open.
    #[serde(default)]
    pub current_project: String,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_backup_dir")]
    pub backup_dir: String,

    #[serde(default = "default_theme")]
    pub theme: String,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project_name: default_project_name(),
            current_project: String::new(),
            language: default_language(),
            backup_dir: default_backup_dir(),
            theme: default_theme(),
            extra: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Project name for provenance text, never empty.
    pub fn effective_project_name(&self) -> &str {
        if self.project_name.trim().is_empty() {
            DEFAULT_PROJECT_NAME
        } else {
            &self.project_name
        }
    }

    pub fn current_project_path(&self) -> Option<PathBuf> {
        if self.current_project.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.current_project))
        }
    }

    pub fn set_current_project(&mut self, path: impl AsRef<Path>) {
        self.current_project = path.as_ref().to_string_lossy().into_owned();
    }

    pub fn backup_dir_path(&self) -> PathBuf {
        if self.backup_dir.trim().is_empty() {
            PathBuf::from(DEFAULT_BACKUP_DIR)
        } else {
            PathBuf::from(&self.backup_dir)
        }
    }
}

fn default_project_name() -> String {
    DEFAULT_PROJECT_NAME.to_string()
}

fn default_language() -> String {
    "fi".to_string()
}

fn default_backup_dir() -> String {
    DEFAULT_BACKUP_DIR.to_string()
}

fn default_theme() -> String {
    "light".to_string()
}

/// File-backed settings. Construct once and pass the loaded [`Settings`]
/// value to the operations that need it.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Strict load: missing, empty and malformed files are errors.
    pub fn try_load(&self) -> Result<Settings> {
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Err(MaintenanceError::Other(format!(
                "settings file {} is empty",
                self.path.display()
            )));
        }
        Ok(serde_json::from_str(&raw)?)
    }

    /// Load settings, never failing. A missing or empty file is replaced by
    /// the defaults (persisted); a malformed file is logged and the defaults
    /// are used without touching it.
    pub fn load(&self) -> Settings {
        let needs_defaults = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };
        if needs_defaults {
            let settings = Settings::default();
            match self.try_save(&settings) {
                Ok(()) => log::info!("Created default settings at {}", self.path.display()),
                Err(err) => log::warn!(
                    "Cannot write default settings to {}: {err}",
                    self.path.display()
                ),
            }
            return settings;
        }

        match self.try_load() {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!(
                    "Settings file {} is unreadable, using defaults: {err}",
                    self.path.display()
                );
                Settings::default()
            }
        }
    }

    /// Write settings with 4-space indentation via a temp file + rename.
    pub fn try_save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        settings.serialize(&mut serializer)?;
        buf.push(b'\n');

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, buf)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Persist settings; failures are logged and otherwise ignored.
    pub fn save(&self, settings: &Settings) {
        if let Err(err) = self.try_save(settings) {
            log::error!("Cannot save settings to {}: {err}", self.path.display());
        }
    }

    /// Project name read straight from disk, falling back to the default on
    /// any error.
    pub fn project_name(&self) -> String {
        self.try_load()
            .map(|settings| settings.effective_project_name().to_string())
            .unwrap_or_else(|_| DEFAULT_PROJECT_NAME.to_string())
    }
}

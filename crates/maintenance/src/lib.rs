//! # Nikkari Maintenance
//!
//! Project upkeep for source files listed in a manifest.
//!
//! ## Pipeline
//!
//! ```text
//! Manifest (.cbp)
//!     │
//!     └──> for each member
//!            ├─> missing? note and continue
//!            └─> maintain_file
//!                  ├─> timestamped backup
//!                  ├─> license header (marker search)
//!                  ├─> malloc/free balance (C files)
//!                  └─> tabs + trailing whitespace
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use nikkari_maintenance::{run_batch, MaintenanceOptions, SettingsStore};
//! use std::path::Path;
//!
//! let settings = SettingsStore::new("config/config.json").load();
//! let options = MaintenanceOptions::from_settings(&settings);
//! let report = run_batch(Path::new("demo.cbp"), &options);
//! println!("{} change(s)", report.changes);
//! for line in report.messages() {
//!     println!("{line}");
//! }
//! ```

pub mod alloc_check;
pub mod backup;
mod batch;
mod error;
pub mod license;
mod pass;
mod report;
mod settings;
pub mod whitespace;

pub use backup::{save_with_backup, Clock, SaveOutcome};
pub use batch::{run_batch, run_current_project};
pub use error::{MaintenanceError, Result};
pub use pass::{maintain_file, MaintenanceOptions};
pub use report::{BatchReport, MaintenanceReport, Note, NoteKind};
pub use settings::{
    Settings, SettingsStore, DEFAULT_BACKUP_DIR, DEFAULT_PROJECT_NAME, DEFAULT_SETTINGS_PATH,
    SETTINGS_PATH_ENV,
};

use crate::alloc_check::{check_balance, is_c_source, AllocBalance};
use crate::backup::{timestamped_backup, Clock};
use crate::license::{with_license_header, LICENSE_MARKER};
use crate::report::{MaintenanceReport, NoteKind};
use crate::settings::Settings;
use crate::whitespace::normalize_whitespace;
use crate::{MaintenanceError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Inputs of a maintenance pass, taken from [`Settings`] once and passed
/// down explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceOptions {
    /// Name written into inserted license headers.
    pub project_name: String,
    /// Where timestamped backups go.
    pub backup_dir: PathBuf,
    pub clock: Clock,
}

impl MaintenanceOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            project_name: settings.effective_project_name().to_string(),
            backup_dir: settings.backup_dir_path(),
            clock: Clock::System,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

/// Run the maintenance pass on one file:
///
/// 1. missing file: a single "not found" note, nothing else happens
/// 2. timestamped backup of the current bytes (errors propagate)
/// 3. license header if the marker is absent
/// 4. `malloc(` / `free(` balance warning for C files
/// 5. tab expansion and trailing whitespace removal
///
/// The file is always rewritten once the pass gets past the backup.
pub fn maintain_file(path: &Path, options: &MaintenanceOptions) -> Result<MaintenanceReport> {
    let mut report = MaintenanceReport::new();

    if !path.is_file() {
        report.note(NoteKind::FileNotFound, "File not found.");
        return Ok(report);
    }

    let backup = timestamped_backup(path, &options.backup_dir, options.clock.now())?;
    report.note(
        NoteKind::BackupCreated,
        format!("Backup created: {}", backup.display()),
    );

    let bytes = fs::read(path)?;
    let mut content =
        String::from_utf8(bytes).map_err(|_| MaintenanceError::NotUtf8(path.to_path_buf()))?;

    if let Some(licensed) = with_license_header(&content, &options.project_name) {
        content = licensed;
        report.change(
            NoteKind::LicenseAdded,
            format!("{LICENSE_MARKER} license added ({}).", options.project_name),
        );
    }

    if is_c_source(path) {
        match check_balance(&content) {
            AllocBalance::MoreAllocations { mallocs, frees } => report.note(
                NoteKind::AllocationWarning,
                format!("NOTE: {mallocs} malloc vs {frees} free. Remember to free the memory!"),
            ),
            AllocBalance::MoreFrees { mallocs, frees } => report.note(
                NoteKind::AllocationWarning,
                format!("NOTE: more free calls ({frees}) than allocations ({mallocs})."),
            ),
            AllocBalance::Balanced => {}
        }
    }

    let normalized = normalize_whitespace(&content);
    if normalized != content {
        report.change(
            NoteKind::WhitespaceNormalized,
            "Indentation and trailing whitespace cleaned.",
        );
    }
    fs::write(path, normalized)?;

    log::debug!(
        "Maintained {} ({} change(s), {} note(s))",
        path.display(),
        report.changes,
        report.notes.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn options(backup_dir: PathBuf) -> MaintenanceOptions {
        let at = NaiveDate::from_ymd_opt(2026, 1, 5)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        MaintenanceOptions {
            project_name: "demo".to_string(),
            backup_dir,
            clock: Clock::Fixed(at),
        }
    }

    #[test]
    fn missing_file_yields_single_note() {
        let temp = tempdir().unwrap();
        let opts = options(temp.path().join("backups"));
        let report = maintain_file(&temp.path().join("nope.c"), &opts).unwrap();
        assert_eq!(report.changes, 0);
        assert_eq!(report.messages(), vec!["File not found."]);
        assert!(!temp.path().join("backups").exists());
    }

    #[test]
    fn notes_follow_pass_order() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("leak.c");
        fs::write(&file, "void f() {\n\tchar *p = malloc(4);  \n}\n").unwrap();

        let report = maintain_file(&file, &options(temp.path().join("backups"))).unwrap();
        let kinds: Vec<_> = report.notes.iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![
                NoteKind::BackupCreated,
                NoteKind::LicenseAdded,
                NoteKind::AllocationWarning,
                NoteKind::WhitespaceNormalized,
            ]
        );
        assert_eq!(report.changes, 2);
        assert_eq!(
            report.notes[1].message,
            "GPLv3 license added (demo).".to_string()
        );
    }

    #[test]
    fn non_utf8_file_is_an_error_after_backup() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("blob.c");
        fs::write(&file, [0xff, 0xfe, 0x00]).unwrap();

        let err = maintain_file(&file, &options(temp.path().join("backups"))).unwrap_err();
        assert!(matches!(err, MaintenanceError::NotUtf8(_)));
        assert_eq!(fs::read(&file).unwrap(), vec![0xff, 0xfe, 0x00]);
    }

    #[test]
    fn options_come_from_settings() {
        let settings = Settings {
            project_name: "kernel".to_string(),
            backup_dir: "/tmp/bk".to_string(),
            ..Settings::default()
        };
        let opts = MaintenanceOptions::from_settings(&settings);
        assert_eq!(opts.project_name, "kernel");
        assert_eq!(opts.backup_dir, PathBuf::from("/tmp/bk"));
        assert_eq!(opts.clock, Clock::System);
    }
}

use crate::pass::{maintain_file, MaintenanceOptions};
use crate::report::{BatchReport, NoteKind};
use crate::settings::Settings;
use nikkari_manifest::ProjectManifest;
use std::path::Path;

/// Run the maintenance pass over every member of the manifest at
/// `manifest_path`.
///
/// A missing or unparsable manifest yields a report with one note and no
/// changes. Members are resolved against the manifest directory; a member
/// that is missing on disk or whose pass fails is noted and the walk
/// continues with the next one.
pub fn run_batch(manifest_path: &Path, options: &MaintenanceOptions) -> BatchReport {
    if manifest_path.as_os_str().is_empty() || !manifest_path.exists() {
        return BatchReport::aborted(NoteKind::ProjectError, "Project file not found.");
    }

    let manifest = match ProjectManifest::load(manifest_path) {
        Ok(manifest) => manifest,
        Err(err) => {
            log::error!("Cannot load {}: {err}", manifest_path.display());
            return BatchReport::aborted(
                NoteKind::ProjectError,
                format!("Project processing error: {err}"),
            );
        }
    };

    let mut batch = BatchReport::new();
    for member in manifest.members() {
        let full_path = manifest.resolve(&member.path);
        if !full_path.exists() {
            log::warn!("Member {} is missing on disk", member.path);
            batch.add_missing(&member.path);
            continue;
        }

        match maintain_file(&full_path, options) {
            Ok(report) => batch.add_file(&member.path, report),
            Err(err) => {
                log::warn!("Maintenance of {} failed: {err}", member.path);
                batch.add_failure(&member.path, err.to_string());
            }
        }
    }

    log::info!(
        "Maintained {}: {} change(s), {} processed, {} missing, {} failed",
        manifest.title(),
        batch.changes,
        batch.processed,
        batch.missing,
        batch.failed
    );
    batch
}

/// [`run_batch`] on the settings' current project.
pub fn run_current_project(settings: &Settings) -> BatchReport {
    let options = MaintenanceOptions::from_settings(settings);
    match settings.current_project_path() {
        Some(path) => run_batch(&path, &options),
        None => BatchReport::aborted(NoteKind::ProjectError, "Project file not found."),
    }
}

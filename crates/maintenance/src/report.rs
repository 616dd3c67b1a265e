use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    BackupCreated,
    LicenseAdded,
    AllocationWarning,
    WhitespaceNormalized,
    FileNotFound,
    /// Per-file heading in a batch report.
    FileSection,
    /// A manifest member that is not on disk.
    FileMissing,
    /// A member whose pass failed; the batch carried on.
    FileFailed,
    ProjectError,
}

/// Human-readable line of a maintenance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub kind: NoteKind,
    pub message: String,
}

impl Note {
    pub fn new(kind: NoteKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result of one maintenance pass: how many content changes were made and
/// what happened, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceReport {
    pub changes: usize,
    pub notes: Vec<Note>,
}

impl MaintenanceReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn note(&mut self, kind: NoteKind, message: impl Into<String>) {
        self.notes.push(Note::new(kind, message));
    }

    pub fn change(&mut self, kind: NoteKind, message: impl Into<String>) {
        self.changes += 1;
        self.note(kind, message);
    }

    pub fn has(&self, kind: NoteKind) -> bool {
        self.notes.iter().any(|note| note.kind == kind)
    }

    pub fn messages(&self) -> Vec<String> {
        self.notes.iter().map(|note| note.message.clone()).collect()
    }
}

/// Aggregate over all members of a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub changes: usize,
    pub notes: Vec<Note>,
    /// Members whose pass completed.
    pub processed: usize,
    /// Members listed in the manifest but absent on disk.
    pub missing: usize,
    /// Members whose pass returned an error.
    pub failed: usize,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report that consists of a single explanatory note.
    pub fn aborted(kind: NoteKind, message: impl Into<String>) -> Self {
        Self {
            notes: vec![Note::new(kind, message)],
            ..Self::default()
        }
    }

    pub fn add_file(&mut self, member: &str, report: MaintenanceReport) {
        self.processed += 1;
        self.changes += report.changes;
        if !report.notes.is_empty() {
            self.notes
                .push(Note::new(NoteKind::FileSection, format!("--- {member} ---")));
            self.notes.extend(report.notes);
        }
    }

    pub fn add_missing(&mut self, member: &str) {
        self.missing += 1;
        self.notes.push(Note::new(
            NoteKind::FileMissing,
            format!("NOTE: File {member} was not found on disk."),
        ));
    }

    pub fn add_failure(&mut self, member: &str, error: String) {
        self.failed += 1;
        self.notes.push(Note::new(
            NoteKind::FileFailed,
            format!("ERROR: {member}: {error}"),
        ));
    }

    pub fn messages(&self) -> Vec<String> {
        self.notes.iter().map(|note| note.message.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn file_section_only_when_notes_exist() {
        let mut batch = BatchReport::new();
        batch.add_file("quiet.c", MaintenanceReport::new());

        let mut report = MaintenanceReport::new();
        report.change(NoteKind::LicenseAdded, "license");
        batch.add_file("loud.c", report);

        assert_eq!(batch.processed, 2);
        assert_eq!(batch.changes, 1);
        assert_eq!(batch.messages(), vec!["--- loud.c ---", "license"]);
    }
}

use crate::render::{render_report, render_tree};
use crate::shell::{MessageLevel, Shell};
use anyhow::{anyhow, bail, Context, Result};
use nikkari_maintenance::{
    maintain_file, run_batch, save_with_backup, BatchReport, MaintenanceOptions, NoteKind,
    Settings, SettingsStore,
};
use nikkari_manifest::{default_title_for, AddOutcome, ProjectManifest, RemoveOutcome};
use serde_json::{json, Value};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// What a command wants shown to the user.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub level: MessageLevel,
    pub message: String,
    pub body: String,
    pub data: Value,
}

impl Outcome {
    fn info(message: impl Into<String>, body: impl Into<String>, data: Value) -> Self {
        Self {
            level: MessageLevel::Info,
            message: message.into(),
            body: body.into(),
            data,
        }
    }

    fn warning(message: impl Into<String>, body: impl Into<String>, data: Value) -> Self {
        Self {
            level: MessageLevel::Warning,
            message: message.into(),
            body: body.into(),
            data,
        }
    }

    fn cancelled() -> Self {
        Self::info("Cancelled.", "", json!({ "cancelled": true }))
    }
}

/// Loaded settings plus the user interface, shared by all commands.
pub struct Session<'a> {
    pub store: SettingsStore,
    pub settings: Settings,
    pub shell: &'a dyn Shell,
}

impl Session<'_> {
    fn project_path(&self, explicit: Option<PathBuf>) -> Result<PathBuf> {
        explicit
            .or_else(|| self.settings.current_project_path())
            .ok_or_else(|| {
                anyhow!("No project is open; run `nikkari open <project.cbp>` or pass --project")
            })
    }

    fn load_project(&self, explicit: Option<PathBuf>) -> Result<ProjectManifest> {
        let path = self.project_path(explicit)?;
        ProjectManifest::load(&path)
            .with_context(|| format!("Cannot read project file {}", path.display()))
    }

    fn remember_project(&mut self, path: &Path) {
        self.settings.set_current_project(path);
        self.store.save(&self.settings);
    }
}

pub fn new_project(
    session: &mut Session<'_>,
    path: PathBuf,
    title: Option<String>,
    force: bool,
) -> Result<Outcome> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite it)",
            path.display()
        );
    }
    let title = title.unwrap_or_else(|| default_title_for(&path));
    ProjectManifest::create(&path, &title)
        .with_context(|| format!("Cannot create project file {}", path.display()))?;
    session.remember_project(&path);

    Ok(Outcome::info(
        format!("Project created: {}", path.display()),
        "",
        json!({ "path": path, "title": title }),
    ))
}

pub fn open_project(session: &mut Session<'_>, path: PathBuf) -> Result<Outcome> {
    let manifest = session.load_project(Some(path.clone()))?;
    session.remember_project(&path);
    Ok(project_listing(
        &manifest,
        format!("Project loaded: {}", display_name(&path)),
    ))
}

pub fn list_project(session: &Session<'_>, project: Option<PathBuf>) -> Result<Outcome> {
    let manifest = session.load_project(project)?;
    let message = format!("{} member(s)", manifest.members().len());
    Ok(project_listing(&manifest, message))
}

fn project_listing(manifest: &ProjectManifest, message: String) -> Outcome {
    let title = manifest.title();
    let groups = manifest.groups();
    Outcome::info(
        message,
        render_tree(&title, &groups),
        json!({
            "path": manifest.path(),
            "title": title,
            "members": manifest.members(),
            "groups": groups,
        }),
    )
}

pub fn add_files(
    session: &Session<'_>,
    project: Option<PathBuf>,
    files: Vec<PathBuf>,
) -> Result<Outcome> {
    let mut manifest = session.load_project(project)?;

    let mut added = Vec::new();
    let mut already_present = Vec::new();
    for file in files {
        match manifest
            .add_member(&file)
            .with_context(|| format!("Adding {} failed", file.display()))?
        {
            AddOutcome::Added(path) => added.push(path),
            AddOutcome::AlreadyPresent(path) => already_present.push(path),
        }
    }

    let mut lines: Vec<String> = added.iter().map(|p| format!("Added: {p}")).collect();
    lines.extend(
        already_present
            .iter()
            .map(|p| format!("Already in the project: {p}")),
    );
    let data = json!({ "added": added, "already_present": already_present });

    if added.is_empty() {
        return Ok(Outcome::warning(
            "The file is already in the project.",
            lines.join("\n"),
            data,
        ));
    }
    Ok(Outcome::info(
        format!("{} file(s) added", added.len()),
        lines.join("\n"),
        data,
    ))
}

pub fn remove_member(
    session: &Session<'_>,
    project: Option<PathBuf>,
    member: String,
) -> Result<Outcome> {
    let mut manifest = session.load_project(project)?;
    let prompt = format!("Remove '{member}' from the project? (The file stays on disk.)");
    if !session.shell.confirm(&prompt) {
        return Ok(Outcome::cancelled());
    }

    match manifest
        .remove_member(&member)
        .with_context(|| format!("Removing {member} failed"))?
    {
        RemoveOutcome::Removed => Ok(Outcome::info(
            format!("Removed from project: {member}"),
            "",
            json!({ "removed": member }),
        )),
        RemoveOutcome::NotFound => Ok(Outcome::warning(
            format!("{member} is not in the project"),
            "",
            json!({ "removed": Value::Null }),
        )),
    }
}

pub fn maintain(session: &Session<'_>, file: PathBuf) -> Result<Outcome> {
    let options = MaintenanceOptions::from_settings(&session.settings);
    let report = maintain_file(&file, &options)
        .with_context(|| format!("Maintenance of {} failed", file.display()))?;
    Ok(Outcome::info(
        format!("Changes made: {}", report.changes),
        report.messages().join("\n"),
        serde_json::to_value(&report)?,
    ))
}

pub fn run_project(session: &Session<'_>, project: Option<PathBuf>) -> Result<Outcome> {
    let path = session.project_path(project)?;
    if !path.exists() {
        return Ok(Outcome::warning(
            "Project file not found.",
            path.display().to_string(),
            serde_json::to_value(BatchReport::aborted(
                NoteKind::ProjectError,
                "Project file not found.",
            ))?,
        ));
    }

    let prompt = "Run full maintenance on the project?\n\n\
- backups are created\n\
- indentation is fixed\n\
- license headers are checked\n\
- C memory management is analysed";
    if !session.shell.confirm(prompt) {
        return Ok(Outcome::cancelled());
    }

    let options = MaintenanceOptions::from_settings(&session.settings);
    let report = run_batch(&path, &options);
    let body = render_report(report.changes, &report.messages());
    let data = serde_json::to_value(&report)?;

    if report.failed > 0 || report.notes.iter().any(|n| n.kind == NoteKind::ProjectError) {
        return Ok(Outcome::warning("Maintenance finished with problems", body, data));
    }
    Ok(Outcome::info("Maintenance finished", body, data))
}

pub fn save_file(file: PathBuf, from: Option<PathBuf>) -> Result<Outcome> {
    let content = match from {
        Some(source) => fs::read_to_string(&source)
            .with_context(|| format!("Cannot read {}", source.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Cannot read content from stdin")?;
            buf
        }
    };

    let outcome = save_with_backup(&file, &content)
        .with_context(|| format!("Cannot save {}", file.display()))?;
    let backup_note = if outcome.backup.is_some() {
        " | [Backup OK]"
    } else {
        ""
    };
    Ok(Outcome::info(
        format!("Saved: {}{backup_note}", display_name(&file)),
        "",
        json!({ "path": outcome.path, "backup": outcome.backup }),
    ))
}

pub fn show_settings(session: &Session<'_>) -> Result<Outcome> {
    let data = serde_json::to_value(&session.settings)?;
    Ok(Outcome::info(
        format!("Settings: {}", session.store.path().display()),
        serde_json::to_string_pretty(&data)?,
        data,
    ))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

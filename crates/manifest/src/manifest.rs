use crate::paths::{member_group, normalize_separators, relative_path};
use crate::xml::{Document, Element, NodeId};
use crate::{ManifestError, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const ROOT_ELEMENT: &str = "CodeBlocks_project_file";
pub const PROJECT_ELEMENT: &str = "Project";
pub const OPTION_ELEMENT: &str = "Option";
pub const MEMBER_ELEMENT: &str = "Unit";
pub const MEMBER_PATH_ATTR: &str = "filename";
pub const TITLE_ATTR: &str = "title";
pub const DEFAULT_TITLE: &str = "Bittinikkari";

/// One member entry, as listed in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub path: String,
    /// Containing folder label (empty for root-level members).
    pub group: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberGroup {
    pub label: String,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added(String),
    AlreadyPresent(String),
}

impl AddOutcome {
    pub fn path(&self) -> &str {
        match self {
            AddOutcome::Added(path) | AddOutcome::AlreadyPresent(path) => path,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
}

/// XML project file listing member source files.
///
/// Every mutation that changes the member list is written back to disk
/// immediately, re-indented.
#[derive(Debug, Clone)]
pub struct ProjectManifest {
    path: PathBuf,
    document: Document,
}

impl ProjectManifest {
    /// Write a fresh manifest with a single project node titled `title`.
    pub fn create(path: impl AsRef<Path>, title: &str) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut document = Document::new(ROOT_ELEMENT);
        let root = document.root();
        let project = document.append_child(root, Element::new(PROJECT_ELEMENT));
        document.append_child(
            project,
            Element::new(OPTION_ELEMENT).with_attr(TITLE_ATTR, title),
        );

        let manifest = Self { path, document };
        manifest.save()?;
        log::info!("Created project {} ({title})", manifest.path.display());
        Ok(manifest)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(ManifestError::NotFound(path));
            }
            Err(err) => return Err(err.into()),
        };

        let document = Document::parse(&raw).map_err(|message| ManifestError::Parse {
            path: path.clone(),
            message,
        })?;

        let manifest = Self { path, document };
        if manifest.project_node().is_none() {
            log::warn!(
                "Project file {} has no <{PROJECT_ELEMENT}> node; treating it as empty",
                manifest.path.display()
            );
        }
        Ok(manifest)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory that member paths are relative to.
    pub fn dir(&self) -> PathBuf {
        self.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Title from the last project option carrying one.
    pub fn title(&self) -> String {
        let Some(project) = self.project_node() else {
            return DEFAULT_TITLE.to_string();
        };
        self.document
            .children_named(project, OPTION_ELEMENT)
            .filter_map(|id| self.document.element(id).attr(TITLE_ATTR))
            .filter(|title| !title.is_empty())
            .last()
            .unwrap_or(DEFAULT_TITLE)
            .to_string()
    }

    /// Members in document order.
    pub fn members(&self) -> Vec<Member> {
        self.member_nodes()
            .into_iter()
            .map(|(_, path)| Member {
                group: member_group(&path).to_string(),
                path,
            })
            .collect()
    }

    /// Members grouped by folder, groups in order of first appearance.
    pub fn groups(&self) -> Vec<MemberGroup> {
        let mut groups: Vec<MemberGroup> = Vec::new();
        for member in self.members() {
            match groups.iter_mut().find(|g| g.label == member.group) {
                Some(group) => group.members.push(member),
                None => groups.push(MemberGroup {
                    label: member.group.clone(),
                    members: vec![member],
                }),
            }
        }
        groups
    }

    pub fn contains(&self, member: &str) -> bool {
        let member = normalize_separators(member);
        self.member_nodes().iter().any(|(_, path)| *path == member)
    }

    /// Absolute-or-cwd-relative location of a member on disk.
    pub fn resolve(&self, member: &str) -> PathBuf {
        self.dir().join(member)
    }

    /// Add `file` as a member, stored relative to the manifest directory.
    pub fn add_member(&mut self, file: impl AsRef<Path>) -> Result<AddOutcome> {
        let relative = relative_path(file.as_ref(), &self.dir())?;
        self.add_relative_member(&relative)
    }

    /// Add a member path that is already relative to the manifest directory.
    pub fn add_relative_member(&mut self, member: &str) -> Result<AddOutcome> {
        let member = normalize_separators(member);
        if member.is_empty() {
            return Err(ManifestError::InvalidPath("empty member path".to_string()));
        }
        if self.contains(&member) {
            log::info!("{member} is already in {}", self.path.display());
            return Ok(AddOutcome::AlreadyPresent(member));
        }

        // Edits are staged on a copy so a failed save leaves `self` as it
        // is on disk.
        let mut staged = self.clone();
        let project = staged.ensure_project_node();
        staged.document.append_child(
            project,
            Element::new(MEMBER_ELEMENT).with_attr(MEMBER_PATH_ATTR, member.clone()),
        );
        staged.save()?;
        *self = staged;
        log::info!("Added {member} to {}", self.path.display());
        Ok(AddOutcome::Added(member))
    }

    pub fn remove_member(&mut self, member: &str) -> Result<RemoveOutcome> {
        let member = normalize_separators(member);
        let (Some(project), Some(node)) = (
            self.project_node(),
            self.member_nodes()
                .into_iter()
                .find(|(_, path)| *path == member)
                .map(|(id, _)| id),
        ) else {
            return Ok(RemoveOutcome::NotFound);
        };

        let mut staged = self.clone();
        staged.document.remove_child(project, node);
        staged.save()?;
        *self = staged;
        log::info!("Removed {member} from {}", self.path.display());
        Ok(RemoveOutcome::Removed)
    }

    /// Serialize with deterministic indentation. The new content is written
    /// next to the manifest and renamed over it.
    pub fn save(&self) -> Result<()> {
        let mut document = self.document.clone();
        document.indent();
        let content = document.to_xml_string();

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = tmp_path(&self.path);
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn project_node(&self) -> Option<NodeId> {
        self.document
            .find_child(self.document.root(), PROJECT_ELEMENT)
    }

    fn ensure_project_node(&mut self) -> NodeId {
        match self.project_node() {
            Some(id) => id,
            None => {
                let root = self.document.root();
                self.document
                    .append_child(root, Element::new(PROJECT_ELEMENT))
            }
        }
    }

    fn member_nodes(&self) -> Vec<(NodeId, String)> {
        let Some(project) = self.project_node() else {
            return Vec::new();
        };
        self.document
            .children_named(project, MEMBER_ELEMENT)
            .filter_map(|id| {
                self.document
                    .element(id)
                    .attr(MEMBER_PATH_ATTR)
                    .filter(|path| !path.is_empty())
                    .map(|path| (id, path.to_string()))
            })
            .collect()
    }
}

/// Title used for a new manifest when none is given: the file stem.
pub fn default_title_for(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn create_writes_title_and_no_members() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("demo.cbp");
        ProjectManifest::create(&path, "Demo").unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("<?xml version='1.0' encoding='UTF-8'?>"));
        assert!(raw.contains("<Option title=\"Demo\" />"));

        let manifest = ProjectManifest::load(&path).unwrap();
        assert_eq!(manifest.title(), "Demo");
        assert!(manifest.members().is_empty());
    }

    #[test]
    fn load_without_project_node_is_empty() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("bare.cbp");
        fs::write(&path, "<CodeBlocks_project_file></CodeBlocks_project_file>").unwrap();

        let manifest = ProjectManifest::load(&path).unwrap();
        assert!(manifest.members().is_empty());
        assert_eq!(manifest.title(), DEFAULT_TITLE);
    }

    #[test]
    fn load_reports_missing_and_malformed_files() {
        let temp = tempdir().unwrap();
        let missing = temp.path().join("missing.cbp");
        assert!(matches!(
            ProjectManifest::load(&missing),
            Err(ManifestError::NotFound(_))
        ));

        let broken = temp.path().join("broken.cbp");
        fs::write(&broken, "<CodeBlocks_project_file><Project>").unwrap();
        assert!(matches!(
            ProjectManifest::load(&broken),
            Err(ManifestError::Parse { .. })
        ));
    }

    #[test]
    fn add_member_is_unique() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("demo.cbp");
        let mut manifest = ProjectManifest::create(&path, "Demo").unwrap();

        let first = manifest.add_member(temp.path().join("src").join("a.c")).unwrap();
        assert_eq!(first, AddOutcome::Added("src/a.c".to_string()));

        let second = manifest.add_relative_member(r"src\a.c").unwrap();
        assert_eq!(second, AddOutcome::AlreadyPresent("src/a.c".to_string()));
        assert_eq!(manifest.members().len(), 1);
    }

    #[test]
    fn remove_member_deletes_and_persists() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("demo.cbp");
        let mut manifest = ProjectManifest::create(&path, "Demo").unwrap();
        manifest.add_relative_member("a.c").unwrap();
        manifest.add_relative_member("b.c").unwrap();

        assert_eq!(manifest.remove_member("a.c").unwrap(), RemoveOutcome::Removed);
        assert_eq!(manifest.remove_member("a.c").unwrap(), RemoveOutcome::NotFound);

        let reloaded = ProjectManifest::load(&path).unwrap();
        let paths: Vec<_> = reloaded.members().into_iter().map(|m| m.path).collect();
        assert_eq!(paths, vec!["b.c".to_string()]);
    }

    #[test]
    fn failed_save_leaves_members_unchanged() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("proj");
        let path = dir.join("demo.cbp");
        let mut manifest = ProjectManifest::create(&path, "Demo").unwrap();
        manifest.add_relative_member("keep.c").unwrap();

        // A plain file where the project directory was makes every save fail.
        fs::remove_dir_all(&dir).unwrap();
        fs::write(&dir, "not a directory").unwrap();
        assert!(manifest.add_relative_member("a.c").is_err());
        assert!(!manifest.contains("a.c"));
        assert!(manifest.remove_member("keep.c").is_err());
        assert!(manifest.contains("keep.c"));

        fs::remove_file(&dir).unwrap();
        fs::create_dir(&dir).unwrap();
        manifest.add_relative_member("b.c").unwrap();
        let reloaded = ProjectManifest::load(&path).unwrap();
        let paths: Vec<_> = reloaded.members().into_iter().map(|m| m.path).collect();
        assert_eq!(paths, vec!["keep.c".to_string(), "b.c".to_string()]);
    }

    #[test]
    fn groups_follow_first_appearance() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("demo.cbp");
        let mut manifest = ProjectManifest::create(&path, "Demo").unwrap();
        for member in ["src/a.c", "main.c", "src/b.c", "include/a.h"] {
            manifest.add_relative_member(member).unwrap();
        }

        let labels: Vec<_> = manifest.groups().into_iter().map(|g| g.label).collect();
        assert_eq!(labels, vec!["src", "", "include"]);
        assert_eq!(manifest.groups()[0].members.len(), 2);
    }

    #[test]
    fn default_title_strips_extension() {
        assert_eq!(default_title_for(Path::new("/tmp/kernel.cbp")), "kernel");
    }
}

use crate::{ManifestError, Result};
use std::path::{Component, Path, PathBuf};

/// Member paths are stored with forward slashes regardless of platform.
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Compute `target` relative to `base_dir`, both resolved against the
/// current directory when relative. `.` and `..` are collapsed lexically;
/// symlinks are not resolved.
pub fn relative_path(target: &Path, base_dir: &Path) -> Result<String> {
    let target = lexical_absolute(target)?;
    let base = lexical_absolute(base_dir)?;

    let target_parts: Vec<Component<'_>> = target.components().collect();
    let base_parts: Vec<Component<'_>> = base.components().collect();

    let common = target_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    // Different drive prefixes / roots cannot be expressed relatively.
    let root_len = base_parts
        .iter()
        .take_while(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
        .count();
    if common < root_len {
        return Err(ManifestError::InvalidPath(format!(
            "{} is not reachable from {}",
            target.display(),
            base.display()
        )));
    }

    let mut parts: Vec<String> = Vec::new();
    for _ in common..base_parts.len() {
        parts.push("..".to_string());
    }
    for component in &target_parts[common..] {
        parts.push(component.as_os_str().to_string_lossy().into_owned());
    }

    if parts.is_empty() {
        return Ok(".".to_string());
    }
    Ok(normalize_separators(&parts.join("/")))
}

/// Folder label used to group a member in listings: everything before the
/// last `/`, or the empty string for root-level members.
pub fn member_group(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(group, _)| group)
}

/// Last path segment of a member.
pub fn member_file_name(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}

fn lexical_absolute(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    Ok(out)
}

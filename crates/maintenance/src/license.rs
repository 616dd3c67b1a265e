//! License header insertion.
//!
//! Presence is decided by a plain substring search for [`LICENSE_MARKER`]
//! anywhere in the file, not only at the top. A file that mentions the
//! marker in a comment halfway down is treated as already licensed.

pub const LICENSE_MARKER: &str = "GPLv3";

pub fn license_header(project_name: &str) -> String {
    format!("/*\n * License: GNU {LICENSE_MARKER}\n * Project: {project_name}\n */\n")
}

pub fn has_license(content: &str) -> bool {
    content.contains(LICENSE_MARKER)
}

/// Content with the header prepended, or `None` if the marker is present.
pub fn with_license_header(content: &str, project_name: &str) -> Option<String> {
    if has_license(content) {
        return None;
    }
    let mut out = license_header(project_name);
    out.push_str(content);
    Some(out)
}

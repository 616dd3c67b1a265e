//! # Nikkari Manifest
//!
//! Project files in the Code::Blocks layout:
//!
//! ```text
//! <CodeBlocks_project_file>
//!     <Project>
//!         <Option title="Demo" />
//!         <Unit filename="src/a.c" />
//!         <Unit filename="main.c" />
//!     </Project>
//! </CodeBlocks_project_file>
//! ```
//!
//! Member paths are relative to the manifest's directory, use `/` as the
//! separator and are unique within one manifest.
//!
//! ## Example
//!
//! ```no_run
//! use nikkari_manifest::ProjectManifest;
//!
//! fn main() -> nikkari_manifest::Result<()> {
//!     let mut manifest = ProjectManifest::create("demo.cbp", "Demo")?;
//!     manifest.add_relative_member("src/a.c")?;
//!     for group in manifest.groups() {
//!         println!("{}: {} files", group.label, group.members.len());
//!     }
//!     Ok(())
//! }
//! ```

mod error;
mod manifest;
pub mod paths;
pub mod xml;

pub use error::{ManifestError, Result};
pub use manifest::{
    default_title_for, AddOutcome, Member, MemberGroup, ProjectManifest, RemoveOutcome,
    DEFAULT_TITLE, MEMBER_ELEMENT, MEMBER_PATH_ATTR, OPTION_ELEMENT, PROJECT_ELEMENT,
    ROOT_ELEMENT, TITLE_ATTR,
};

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ManifestError>;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Project file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Cannot parse project file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid member path: {0}")]
    InvalidPath(String),
}

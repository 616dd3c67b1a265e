use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MaintenanceError>;

#[derive(Error, Debug)]
pub enum MaintenanceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Manifest(#[from] nikkari_manifest::ManifestError),

    #[error("Backup to {} failed: {source}", .path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid UTF-8 text", .0.display())]
    NotUtf8(PathBuf),

    #[error("{0}")]
    Other(String),
}

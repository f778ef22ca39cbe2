//! Element pack loading.

use std::path::{Path, PathBuf};

use editor::pack::{ElementPack, PackError};

#[derive(Debug, thiserror::Error)]
pub enum PackLoadError {
    #[error("read pack {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse pack {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: PackError,
    },
}

/// Read and validate the element pack at `path`.
pub async fn load_pack(path: &Path) -> Result<ElementPack, PackLoadError> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| PackLoadError::Io { path: path.to_owned(), source })?;
    ElementPack::from_json(&json).map_err(|source| PackLoadError::Invalid { path: path.to_owned(), source })
}

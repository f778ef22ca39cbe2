//! Dashboard store: one JSON file per dashboard in a directory.
//!
//! DESIGN
//! ======
//! Dashboards are addressed by name; the file is `{dir}/{name}.json`.
//! Names are restricted to ASCII letters, digits, `_` and `-` so a name can
//! never escape the directory. Files are read on every request and
//! validated with the same rules the editor's source dialog applies.
//!
//! ERROR HANDLING
//! ==============
//! A missing directory lists as empty. A missing file is `NotFound`; a file
//! that fails validation is `Invalid` and carries the validation error.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::io::ErrorKind;
use std::path::PathBuf;

use editor::dashboard::{DashboardData, SourceError};

const EXTENSION: &str = "json";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid dashboard name: {0:?}")]
    InvalidName(String),
    #[error("dashboard not found: {0}")]
    NotFound(String),
    #[error("invalid dashboard {name}: {source}")]
    Invalid {
        name: String,
        #[source]
        source: SourceError,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct DashboardStore {
    dir: PathBuf,
}

// =============================================================================
// STORE
// =============================================================================

impl DashboardStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Names of all `*.json` files with a valid dashboard name, sorted.
    pub async fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if validate_name(stem).is_ok() && entry.file_type().await?.is_file() {
                names.push(stem.to_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Read and validate one dashboard.
    pub async fn load(&self, name: &str) -> Result<DashboardData, StoreError> {
        let source = self.load_source(name).await?;
        DashboardData::from_source(&source).map_err(|source| StoreError::Invalid { name: name.to_owned(), source })
    }

    /// Raw file contents of one dashboard.
    pub async fn load_source(&self, name: &str) -> Result<String, StoreError> {
        validate_name(name)?;
        let path = self.dir.join(format!("{name}.{EXTENSION}"));
        match tokio::fs::read_to_string(&path).await {
            Ok(source) => Ok(source),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(name.to_owned())),
            Err(e) => Err(e.into()),
        }
    }
}

/// Accept only non-empty names made of `[A-Za-z0-9_-]`.
pub fn validate_name(name: &str) -> Result<(), StoreError> {
    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid { Ok(()) } else { Err(StoreError::InvalidName(name.to_owned())) }
}

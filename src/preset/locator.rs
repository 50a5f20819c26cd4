//! Finding the preset entry file in a resolved directory.

use crate::error::ResolutionError;
use std::path::{Path, PathBuf};

/// Entry file names, in lookup order.
pub const ENTRY_FILES: [&str; 2] = ["preset.yml", "preset.yaml"];

/// Where a located preset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Local,
}

/// A directory verified to hold a preset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedPreset {
    kind: SourceKind,
    path: PathBuf,
    entry: PathBuf,
}

impl LocatedPreset {
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// The preset directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The entry file inside [`path`](Self::path).
    pub fn entry(&self) -> &Path {
        &self.entry
    }
}

/// Verify that `path` is a directory containing a preset entry file.
///
/// Only reads file metadata.
pub fn locate(path: &Path) -> Result<LocatedPreset, ResolutionError> {
    if !path.exists() {
        return Err(ResolutionError::PathNotFound {
            path: path.to_path_buf(),
        });
    }
    if !path.is_dir() {
        return Err(ResolutionError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    let entry = ENTRY_FILES
        .iter()
        .map(|name| path.join(name))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| ResolutionError::MissingEntry {
            path: path.to_path_buf(),
        })?;

    tracing::debug!("Located preset entry {}", entry.display());

    Ok(LocatedPreset {
        kind: SourceKind::Local,
        path: path.to_path_buf(),
        entry,
    })
}

//! Loading preset definitions from disk.
//!
//! The entry file is read and parsed on every call; nothing is cached, so
//! loading the same preset twice observes any change made in between.

use super::definition::{PresetDefinition, PresetFile};
use super::locator::LocatedPreset;
use crate::error::ImportError;
use anyhow::Context as _;
use std::fs;
use std::io;
use std::path::Path;

/// Load the definition of a located preset.
pub fn load(located: &LocatedPreset) -> Result<PresetDefinition, ImportError> {
    load_file(located.entry())
}

/// Load a definition from an entry file; its directory becomes the preset root.
///
/// # Errors
///
/// `NotFound` when the file does not exist, `Evaluation` for anything that
/// goes wrong once it does.
pub fn load_file(entry: &Path) -> Result<PresetDefinition, ImportError> {
    let evaluation = |source: anyhow::Error| ImportError::Evaluation {
        path: entry.to_path_buf(),
        source,
    };

    let content = match fs::read_to_string(entry) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ImportError::NotFound {
                path: entry.to_path_buf(),
            })
        }
        Err(e) => return Err(evaluation(anyhow::Error::new(e).context("failed to read preset file"))),
    };

    let file: PresetFile = serde_yaml::from_str(&content)
        .context("invalid preset file")
        .map_err(evaluation)?;

    let root = entry.parent().unwrap_or_else(|| Path::new("."));
    let definition = file.into_definition(root).map_err(evaluation)?;

    tracing::debug!(
        "Loaded preset '{}' from {}",
        definition.name,
        entry.display()
    );

    Ok(definition)
}

//! `delete`: remove files from the target directory.

use super::{matching_entries, unexpected};
use crate::actions::dispatcher::{Handler, HandlerEnv};
use crate::actions::types::{ActionKind, ActionType};
use crate::error::HandlerError;
use crate::events::Event;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Removes matched files and directories. Missing paths are not an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteHandler;

impl Handler for DeleteHandler {
    fn action_type(&self) -> ActionType {
        ActionType::Delete
    }

    fn handle(&self, action: &ActionKind, env: &mut HandlerEnv<'_>) -> Result<(), HandlerError> {
        let ActionKind::Delete(delete) = action else {
            return Err(unexpected(ActionType::Delete, action));
        };

        let root = &env.options.target_dir;
        let mut matched: Vec<PathBuf> = Vec::new();
        for pattern in &delete.files {
            matched.extend(matching_entries(root, pattern)?);
        }
        matched.sort();
        matched.dedup();

        // Entries inside a matched directory go with it
        let mut removed: Vec<PathBuf> = Vec::new();
        for relative in matched {
            if removed.iter().any(|dir| relative.starts_with(dir)) {
                continue;
            }

            let path = root.join(&relative);
            let result = match fs::symlink_metadata(&path) {
                Ok(meta) if meta.is_dir() => fs::remove_dir_all(&path),
                Ok(_) => fs::remove_file(&path),
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => {
                    tracing::debug!("Deleted {}", path.display());
                    env.events.publish(Event::FileDeleted { path });
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(HandlerError::io(path, e)),
            }
            removed.push(relative);
        }

        Ok(())
    }
}

//! `copy`: template files into the target directory.

use super::{expand_files, inside, unexpected};
use crate::actions::conflict::{resolve_conflict, Decision};
use crate::actions::dispatcher::{Handler, HandlerEnv};
use crate::actions::types::{ActionKind, ActionType, CopyAction};
use crate::config::resolve_string;
use crate::error::HandlerError;
use crate::events::Event;
use std::fs;
use std::io;
use std::path::Path;

/// Copies matched template files one by one, asking the conflict resolver
/// about each destination that already exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyHandler;

impl Handler for CopyHandler {
    fn action_type(&self) -> ActionType {
        ActionType::Copy
    }

    fn handle(&self, action: &ActionKind, env: &mut HandlerEnv<'_>) -> Result<(), HandlerError> {
        let ActionKind::Copy(copy) = action else {
            return Err(unexpected(ActionType::Copy, action));
        };

        let template_dir = env.options.template_dir.clone();
        let destination_root = inside(&env.options.target_dir, &copy.target)?;
        let strategy = copy.strategy.unwrap_or(env.options.default_strategy);

        let files = expand_files(&template_dir, &copy.files, copy.optional)?;
        tracing::debug!(
            "Copying {} file(s) from {} to {}",
            files.len(),
            template_dir.display(),
            destination_root.display()
        );

        for relative in files {
            let source = template_dir.join(&relative);
            let destination = destination_root.join(&relative);

            if destination.exists()
                && resolve_conflict(strategy, &destination, &mut *env.ui)? == Decision::Skip
            {
                env.events.publish(Event::FileSkipped { path: destination });
                continue;
            }

            write_file(copy, &source, &destination, env)?;
            env.events.publish(Event::FileWritten { path: destination });
        }

        Ok(())
    }
}

fn write_file(
    copy: &CopyAction,
    source: &Path,
    destination: &Path,
    env: &HandlerEnv<'_>,
) -> Result<(), HandlerError> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|e| HandlerError::io(parent, e))?;
    }

    if copy.interpolate {
        match fs::read_to_string(source) {
            Ok(content) => {
                let rendered = resolve_string(&content, env.context).map_err(|e| {
                    HandlerError::Template {
                        path: source.to_path_buf(),
                        message: e.to_string(),
                    }
                })?;
                return fs::write(destination, rendered).map_err(|e| HandlerError::io(destination, e));
            }
            // Binary files are copied verbatim
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {}
            Err(e) => return Err(HandlerError::io(source, e)),
        }
    }

    fs::copy(source, destination)
        .map(|_| ())
        .map_err(|e| HandlerError::io(destination, e))
}

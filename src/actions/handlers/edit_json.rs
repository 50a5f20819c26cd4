//! `edit-json`: merge a patch into an existing JSON file and drop key paths.

use super::{inside, unexpected};
use crate::actions::dispatcher::{Handler, HandlerEnv};
use crate::actions::types::{ActionKind, ActionType};
use crate::config::{deep_merge, remove_path, NullPolicy};
use crate::error::HandlerError;
use crate::events::Event;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::fs;
use std::io;

/// Edits a JSON file in the target directory, keeping its indentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct EditJsonHandler;

impl Handler for EditJsonHandler {
    fn action_type(&self) -> ActionType {
        ActionType::EditJson
    }

    fn handle(&self, action: &ActionKind, env: &mut HandlerEnv<'_>) -> Result<(), HandlerError> {
        let ActionKind::EditJson(edit) = action else {
            return Err(unexpected(ActionType::EditJson, action));
        };

        let path = inside(&env.options.target_dir, &edit.file)?;
        let original = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(HandlerError::FileNotFound { path });
            }
            Err(e) => return Err(HandlerError::io(path, e)),
        };

        let mut document: Value = serde_json::from_str(&original).map_err(|source| {
            HandlerError::InvalidJson {
                path: path.clone(),
                source,
            }
        })?;

        if let Some(patch) = &edit.merge {
            deep_merge(&mut document, patch, NullPolicy::Keep);
        }
        for key in &edit.delete {
            if !remove_path(&mut document, key) {
                tracing::debug!("Key '{}' not present in {}", key, path.display());
            }
        }

        let mut updated = render(&document, &detect_indent(&original))
            .map_err(|source| HandlerError::InvalidJson {
                path: path.clone(),
                source,
            })?;
        if original.ends_with('\n') {
            updated.push('\n');
        }

        if updated == original {
            tracing::debug!("{} unchanged", path.display());
            return Ok(());
        }

        fs::write(&path, updated).map_err(|e| HandlerError::io(&path, e))?;
        env.events.publish(Event::FileWritten { path });
        Ok(())
    }
}

/// Indentation unit of the first indented line, two spaces if none.
fn detect_indent(content: &str) -> String {
    content
        .lines()
        .skip(1)
        .find_map(|line| {
            let indent: String = line
                .chars()
                .take_while(|c| *c == ' ' || *c == '\t')
                .collect();
            (!indent.is_empty()).then_some(indent)
        })
        .unwrap_or_else(|| "  ".to_string())
}

fn render(value: &Value, indent: &str) -> Result<String, serde_json::Error> {
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}

//! Presets on the local filesystem.

use super::{ResolveStrategy, ResolverResult};
use crate::error::ResolutionError;
use std::path::{Path, PathBuf};

/// Resolves existing directories and explicit paths.
#[derive(Debug, Clone)]
pub struct LocalStrategy {
    base: PathBuf,
}

impl LocalStrategy {
    /// Resolve relative identifiers against `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn candidate(&self, identifier: &str) -> PathBuf {
        let expanded = expand_home(identifier);
        if expanded.is_absolute() {
            expanded
        } else {
            self.base.join(expanded)
        }
    }
}

impl ResolveStrategy for LocalStrategy {
    fn name(&self) -> &'static str {
        "local"
    }

    fn resolve(&self, identifier: &str) -> Result<ResolverResult, ResolutionError> {
        let path = self.candidate(identifier);

        if path.is_dir() {
            return Ok(ResolverResult::local(path));
        }

        if !looks_like_path(identifier) {
            return Ok(ResolverResult::not_applicable());
        }

        if path.exists() {
            Err(ResolutionError::NotADirectory { path })
        } else {
            Err(ResolutionError::PathNotFound { path })
        }
    }
}

/// Whether the identifier is unambiguously meant as a filesystem path.
pub fn looks_like_path(identifier: &str) -> bool {
    matches!(identifier, "." | ".." | "~")
        || ["./", "../", "/", "~/", ".\\", "..\\"]
            .iter()
            .any(|prefix| identifier.starts_with(prefix))
        || Path::new(identifier).is_absolute()
}

fn expand_home(identifier: &str) -> PathBuf {
    let rest = match identifier {
        "~" => Some(""),
        _ => identifier.strip_prefix("~/"),
    };
    match (rest, dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(identifier),
    }
}

//! Engine settings schema.

use crate::actions::ConflictStrategy;
use crate::error::{PresetError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default npm-compatible registry used for package presets.
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// Default host for `org/repo` shorthands.
pub const DEFAULT_GIT_HOST: &str = "https://github.com";

/// Settings that control resolution and execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the package registry.
    pub registry: String,

    /// Host used to expand `org/repo` and `gh:org/repo` identifiers.
    pub git_host: String,

    /// Conflict strategy for copy actions that do not declare one.
    pub strategy: ConflictStrategy,

    /// Whether hook actions may run.
    pub hooks: bool,

    /// Parent directory for scratch clones and downloads.
    pub temp_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            registry: DEFAULT_REGISTRY.to_string(),
            git_host: DEFAULT_GIT_HOST.to_string(),
            strategy: ConflictStrategy::default(),
            hooks: true,
            temp_dir: None,
        }
    }
}

impl Settings {
    /// Apply `PRESET_*` environment overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply `PRESET_*` overrides from an arbitrary lookup (for testing).
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(registry) = lookup("PRESET_REGISTRY") {
            self.registry = registry;
        }
        if let Some(host) = lookup("PRESET_GIT_HOST") {
            self.git_host = host;
        }
        if let Some(strategy) = lookup("PRESET_STRATEGY") {
            self.strategy =
                strategy
                    .parse()
                    .map_err(|message: String| PresetError::InvalidOption {
                        name: "PRESET_STRATEGY".to_string(),
                        message,
                    })?;
        }
        Ok(self)
    }

    /// Registry base URL without a trailing slash.
    pub fn registry_url(&self) -> &str {
        self.registry.trim_end_matches('/')
    }
}

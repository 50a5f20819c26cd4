//! Settings file discovery and loading.
//!
//! Settings are layered (later overrides earlier):
//! 1. Built-in defaults
//! 2. User global settings (`~/.preset/config.yml`)
//! 3. Project settings (`<target>/.preset/config.yml`)
//! 4. `PRESET_*` environment variables

use crate::config::merger::{merge_layers, NullPolicy};
use crate::config::settings::Settings;
use crate::error::{PresetError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Paths to settings files in merge order.
#[derive(Debug, Clone, Default)]
pub struct SettingsPaths {
    /// User's global settings: ~/.preset/config.yml
    pub user_global: Option<PathBuf>,

    /// Project settings: .preset/config.yml in the target directory
    pub project: Option<PathBuf>,
}

impl SettingsPaths {
    /// Discover settings files for the given target directory.
    pub fn discover(project_root: &Path) -> Self {
        Self {
            user_global: dirs::home_dir()
                .map(|home| home.join(".preset").join("config.yml"))
                .filter(|path| path.is_file()),
            project: Some(project_root.join(".preset").join("config.yml"))
                .filter(|path| path.is_file()),
        }
    }

    /// Returns all existing settings paths in merge order.
    pub fn all_existing(&self) -> Vec<&PathBuf> {
        self.user_global.iter().chain(self.project.iter()).collect()
    }
}

/// Load one settings file as a raw value (for layering).
fn load_layer(path: &Path) -> Result<serde_json::Value> {
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }
    serde_yaml::from_str(&content).map_err(|e| PresetError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load and merge the given settings files, without environment overrides.
pub fn load_settings_from(paths: &SettingsPaths) -> Result<Settings> {
    let mut layers = vec![serde_json::to_value(Settings::default())
        .map_err(|e| PresetError::Other(e.into()))?];

    for path in paths.all_existing() {
        tracing::debug!("Loading settings from {}", path.display());
        layers.push(load_layer(path)?);
    }

    let merged = merge_layers(&layers, NullPolicy::Delete);
    let source = paths
        .all_existing()
        .last()
        .map(|p| p.to_path_buf())
        .unwrap_or_default();

    serde_json::from_value(merged).map_err(|e| PresetError::ConfigParseError {
        path: source,
        message: e.to_string(),
    })
}

/// Load settings for a target directory, including environment overrides.
pub fn load_settings(project_root: &Path) -> Result<Settings> {
    load_settings_from(&SettingsPaths::discover(project_root))?.with_env_overrides()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ConflictStrategy;
    use tempfile::TempDir;

    fn write(dir: &Path, content: &str) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join("config.yml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn no_files_yields_defaults() {
        let settings = load_settings_from(&SettingsPaths::default()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn discover_finds_project_settings() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp.path().join(".preset"), "hooks: false\n");
        let paths = SettingsPaths::discover(temp.path());
        assert_eq!(paths.project, Some(path));
    }

    #[test]
    fn discover_ignores_missing_project_settings() {
        let temp = TempDir::new().unwrap();
        let paths = SettingsPaths::discover(temp.path());
        assert!(paths.project.is_none());
    }

    #[test]
    fn project_overrides_user() {
        let temp = TempDir::new().unwrap();
        let user = write(
            &temp.path().join("home"),
            "strategy: skip\nregistry: https://user.example\n",
        );
        let project = write(&temp.path().join("proj"), "strategy: override\n");

        let settings = load_settings_from(&SettingsPaths {
            user_global: Some(user),
            project: Some(project),
        })
        .unwrap();

        assert_eq!(settings.strategy, ConflictStrategy::Override);
        assert_eq!(settings.registry, "https://user.example");
    }

    #[test]
    fn null_resets_to_default() {
        let temp = TempDir::new().unwrap();
        let user = write(&temp.path().join("home"), "registry: https://user.example\n");
        let project = write(&temp.path().join("proj"), "registry: null\n");

        let settings = load_settings_from(&SettingsPaths {
            user_global: Some(user),
            project: Some(project),
        })
        .unwrap();

        assert_eq!(settings.registry, crate::config::settings::DEFAULT_REGISTRY);
    }

    #[test]
    fn invalid_yaml_reports_path() {
        let temp = TempDir::new().unwrap();
        let project = write(&temp.path().join("proj"), "strategy: [unclosed\n");

        let err = load_settings_from(&SettingsPaths {
            user_global: None,
            project: Some(project.clone()),
        })
        .unwrap_err();

        match err {
            PresetError::ConfigParseError { path, .. } => assert_eq!(path, project),
            other => panic!("expected ConfigParseError, got {other:?}"),
        }
    }

    #[test]
    fn empty_file_is_ignored() {
        let temp = TempDir::new().unwrap();
        let project = write(&temp.path().join("proj"), "");
        let settings = load_settings_from(&SettingsPaths {
            user_global: None,
            project: Some(project),
        })
        .unwrap();
        assert_eq!(settings, Settings::default());
    }
}

//! Settings loading, value merging and variable interpolation.
//!
//! # Settings Layering
//!
//! 1. Built-in defaults
//! 2. User global settings (`~/.preset/config.yml`)
//! 3. Project settings (`.preset/config.yml` in the target directory)
//! 4. `PRESET_*` environment variables
//!
//! # Example
//!
//! ```
//! use preset::config::{resolve_string, Variables};
//! use std::collections::HashMap;
//!
//! let mut vars = HashMap::new();
//! vars.insert("options.name".to_string(), "demo".to_string());
//! let path = resolve_string("src/${options.name}.rs", &vars).unwrap();
//! assert_eq!(path, "src/demo.rs");
//! ```

pub mod interpolation;
pub mod loader;
pub mod merger;
pub mod settings;

pub use interpolation::{
    has_interpolation, parse_interpolation, resolve_string, resolve_value, Segment, Variables,
};
pub use loader::{load_settings, load_settings_from, SettingsPaths};
pub use merger::{deep_merge, merge_layers, remove_path, NullPolicy};
pub use settings::{Settings, DEFAULT_GIT_HOST, DEFAULT_REGISTRY};

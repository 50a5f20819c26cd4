//! Preset definitions, and finding and loading them on disk.
//!
//! A preset directory looks like:
//!
//! ```text
//! my-preset/
//! ├── preset.yml
//! └── templates/
//!     └── ...
//! ```

pub mod definition;
pub mod loader;
pub mod locator;
pub mod prompts;

pub use definition::{
    Actions, ActionsFn, OptionKind, OptionSpec, PresetDefinition, PromptChoice, PromptKind,
    PromptSpec, Prompts, PromptsFn, DEFAULT_TEMPLATES,
};
pub use loader::{load, load_file};
pub use locator::{locate, LocatedPreset, SourceKind, ENTRY_FILES};

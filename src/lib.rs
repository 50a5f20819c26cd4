//! Preset - apply reusable project presets to a directory.
//!
//! A preset is a declarative bundle of file operations (copy templates,
//! delete files, edit JSON, run hooks) plus optional prompts. Presets come
//! from local directories, git repositories or an npm-compatible registry.
//!
//! # Modules
//!
//! - [`actions`] - Action model, planning, dispatch and handlers
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Settings, deep merge and `${...}` interpolation
//! - [`context`] - The immutable run context
//! - [`error`] - Error types and result aliases
//! - [`events`] - Lifecycle event bus and console reporter
//! - [`preset`] - Preset definitions, locating and loading
//! - [`resolver`] - Turning identifiers into local directories
//! - [`runner`] - The end-to-end pipeline
//! - [`shell`] - Shell command execution for hooks
//! - [`ui`] - Prompts and terminal output
//!
//! # Example
//!
//! ```
//! use preset::actions::Action;
//! use preset::events::{EventBus, EventKind, EventLog};
//! use preset::preset::PresetDefinition;
//! use preset::runner::{ApplyRequest, Pipeline};
//! use preset::config::Settings;
//! use preset::ui::MockUI;
//!
//! let target = tempfile::tempdir().unwrap();
//! let definition = PresetDefinition::new("hello")
//!     .actions(vec![Action::none().before("Hello from a preset")]);
//!
//! let pipeline = Pipeline::new(Settings::default(), target.path());
//! let bus = EventBus::new();
//! let log = EventLog::attach(&bus);
//! let request = ApplyRequest::new("hello", target.path());
//!
//! let report = pipeline
//!     .run_definition(&definition, &request, &mut MockUI::new(), &bus)
//!     .unwrap();
//! assert_eq!(report.actions_run, 1);
//! assert_eq!(log.count(EventKind::ActionMessage), 1);
//! ```

pub mod actions;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod preset;
pub mod resolver;
pub mod runner;
pub mod shell;
pub mod ui;

pub use error::{PresetError, Result};

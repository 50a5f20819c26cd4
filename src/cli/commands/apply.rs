//! The `preset apply` command.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::cli::args::ApplyArgs;
use crate::config::load_settings;
use crate::error::Result;
use crate::events::{ConsoleReporter, EventBus};
use crate::runner::{ApplyRequest, Pipeline};
use crate::ui::{OutputMode, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The apply command implementation.
pub struct ApplyCommand {
    cwd: PathBuf,
    args: ApplyArgs,
    mode: OutputMode,
}

impl ApplyCommand {
    /// Create a new apply command.
    pub fn new(cwd: &Path, args: ApplyArgs, mode: OutputMode) -> Self {
        Self {
            cwd: cwd.to_path_buf(),
            args,
            mode,
        }
    }

    fn target_dir(&self) -> PathBuf {
        if self.args.target.is_absolute() {
            self.args.target.clone()
        } else {
            self.cwd.join(&self.args.target)
        }
    }

    fn request(&self, target_dir: PathBuf) -> ApplyRequest {
        let mut request = ApplyRequest::new(&self.args.preset, target_dir)
            .args(self.args.args.clone());
        for (key, value) in &self.args.options {
            request = request.flag(key.clone(), Value::String(value.clone()));
        }
        if let Some(strategy) = self.args.strategy {
            request = request.strategy(strategy);
        }
        request
    }
}

impl Command for ApplyCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let target_dir = self.target_dir();

        let mut settings = load_settings(&target_dir)?;
        if let Some(registry) = &self.args.registry {
            settings.registry = registry.clone();
        }
        tracing::debug!("Settings: {:?}", settings);

        let pipeline = Pipeline::new(settings, &self.cwd);
        let bus = EventBus::new();
        let _reporter = ConsoleReporter::new(self.mode).attach(&bus);

        let report = pipeline.run(&self.request(target_dir), ui, &bus)?;

        if self.mode.shows_status() {
            ui.message(&report.summary());
        }
        Ok(CommandResult::applied(report))
    }
}

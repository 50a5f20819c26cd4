//! Routing subcommands to their implementations.

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::runner::RunReport;
use crate::ui::{OutputMode, UserInterface};

use super::apply::ApplyCommand;
use super::completions::CompletionsCommand;

/// A runnable subcommand.
pub trait Command {
    /// Run the command, reporting through `ui`.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Outcome of a subcommand that did not fail outright.
#[derive(Debug)]
pub struct CommandResult {
    /// Process exit code.
    pub exit_code: i32,

    /// Report of the preset run, for `apply`.
    pub report: Option<RunReport>,
}

impl CommandResult {
    /// Nothing to report, exit 0.
    pub fn success() -> Self {
        Self {
            exit_code: 0,
            report: None,
        }
    }

    /// A completed preset run.
    pub fn applied(report: RunReport) -> Self {
        Self {
            exit_code: 0,
            report: Some(report),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Turns parsed arguments into a command and runs it.
pub struct CommandDispatcher {
    cwd: PathBuf,
    mode: OutputMode,
}

impl CommandDispatcher {
    /// Relative targets and local presets resolve against `cwd`.
    pub fn new(cwd: PathBuf, mode: OutputMode) -> Self {
        Self { cwd, mode }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let command: Box<dyn Command> = match &cli.command {
            Commands::Apply(args) => Box::new(ApplyCommand::new(&self.cwd, args.clone(), self.mode)),
            Commands::Completions(args) => Box::new(CompletionsCommand::new(args.clone())),
        };
        command.execute(ui)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn apply_result_carries_report() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("noop")).unwrap();
        fs::write(temp.path().join("noop/preset.yml"), "name: noop\n").unwrap();

        let cli = Cli::try_parse_from(["preset", "apply", "./noop", "out"]).unwrap();
        let dispatcher = CommandDispatcher::new(temp.path().to_path_buf(), OutputMode::Quiet);
        let result = dispatcher.dispatch(&cli, &mut MockUI::new()).unwrap();

        assert!(result.is_success());
        let report = result.report.unwrap();
        assert_eq!(report.preset, "noop");
        assert_eq!(report.actions_run, 0);
        assert!(temp.path().join("out").is_dir());
    }

    #[test]
    fn errors_propagate_to_the_caller() {
        let temp = TempDir::new().unwrap();
        let cli = Cli::try_parse_from(["preset", "apply", "./missing"]).unwrap();
        let dispatcher = CommandDispatcher::new(temp.path().to_path_buf(), OutputMode::Quiet);

        assert!(dispatcher.dispatch(&cli, &mut MockUI::new()).is_err());
    }

    #[test]
    fn plain_success_has_no_report() {
        let result = CommandResult::success();
        assert!(result.is_success());
        assert!(result.report.is_none());
    }
}

//! Preset CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use preset::cli::{Cli, CommandDispatcher, Commands};
use preset::error::error_chain;
use preset::shell::is_ci;
use preset::ui::{create_ui, OutputMode};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("preset=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("preset=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("Preset starting with args: {:?}", cli);

    let output_mode = OutputMode::from_flags(cli.verbose, cli.quiet);

    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    let cwd = std::env::current_dir().unwrap_or_default();

    let is_interactive = match &cli.command {
        Commands::Apply(args) => !args.non_interactive && !is_ci(),
        Commands::Completions(_) => false,
    };

    let mut ui = create_ui(is_interactive, output_mode);
    let dispatcher = CommandDispatcher::new(cwd, output_mode);

    match dispatcher.dispatch(&cli, ui.as_mut()) {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            let message = if output_mode == OutputMode::Verbose {
                error_chain(&e)
            } else {
                e.to_string()
            };
            ui.error(&format!("Error: {}", message));
            ExitCode::from(1)
        }
    }
}

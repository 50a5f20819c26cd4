//! CLI argument definitions.
//!
//! The main entry point is the [`Cli`] struct.

use crate::actions::ConflictStrategy;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Preset - apply reusable project presets to a directory.
#[derive(Debug, Parser)]
#[command(name = "preset")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply a preset to a directory
    Apply(ApplyArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `apply` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ApplyArgs {
    /// Preset to apply: a path, git reference (org/repo, gh:, git@, https://) or package name
    pub preset: String,

    /// Directory to apply the preset to
    #[arg(default_value = ".")]
    pub target: PathBuf,

    /// Set a preset option (repeatable)
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub options: Vec<(String, String)>,

    /// Never prompt; use defaults and PRESET_PROMPT_* variables
    #[arg(long)]
    pub non_interactive: bool,

    /// What to do when a copied file already exists
    #[arg(long, value_name = "ask|override|skip")]
    pub strategy: Option<ConflictStrategy>,

    /// Package registry URL
    #[arg(long, value_name = "URL", env = "PRESET_REGISTRY")]
    pub registry: Option<String>,

    /// Arguments passed to the preset
    #[arg(last = true)]
    pub args: Vec<String>,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

//! Command-line argument definitions

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::completions::CompletionsArgs;
use crate::cli::commands::new::NewArgs;
use crate::cli::commands::report::ReportArgs;
use crate::cli::commands::run::RunArgs;
use crate::cli::commands::share::ShareArgs;
use crate::cli::commands::validate::ValidateArgs;

/// Sanity Lab - Monte Carlo sanity checks for engineering formulas
#[derive(Parser, Debug)]
#[command(name = "sanity-lab", version, propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Extra config file layered over the user config
    #[arg(long, global = true, env = "SANITY_LAB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, value_enum, default_value_t = OutputFormat::Auto)]
    pub format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Text unless a command says otherwise
    #[default]
    Auto,
    /// Human-readable text
    Text,
    /// YAML document
    Yaml,
    /// JSON document
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a starter session file
    New(NewArgs),

    /// Check session files without running them
    Validate(ValidateArgs),

    /// Run the Monte Carlo simulation for a session
    Run(RunArgs),

    /// Encode a session as a URL-safe payload or share link
    Share(ShareArgs),

    /// Show a read-only report of a shared session
    Report(ReportArgs),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// rxboot - One-command bootstrap for the API + UI stack.
#[derive(Debug, Parser)]
#[command(name = "rxboot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true, env = "RXBOOT_PROJECT")]
    pub project: Option<PathBuf>,

    /// Python interpreter to use (default: python3 or python on PATH)
    #[arg(long, global = true, env = "RXBOOT_PYTHON", value_name = "PATH")]
    pub python: Option<PathBuf>,

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
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the API and UI services (default if no command specified)
    Start(StartArgs),

    /// Start only the API with auto-reload, for backend development
    Backend(BackendArgs),

    /// Show what a start would run, without running it
    Plan(PlanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `start` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StartArgs {
    /// Don't open the UI in a browser once it is ready
    #[arg(long)]
    pub no_browser: bool,
}

/// Arguments for the `backend` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct BackendArgs {}

/// Arguments for the `plan` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct PlanArgs {
    /// Output as JSON instead of YAML
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands, StartArgs};
use crate::error::Result;
use crate::supervisor::Interrupt;
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Project root the stack lives in.
    pub project_root: PathBuf,

    /// Interpreter override; discovered on PATH when `None`.
    pub python: Option<PathBuf>,

    /// Operator interrupt flag.
    pub interrupt: Interrupt,
}

impl CommandContext {
    pub fn new(project_root: PathBuf) -> Self {
        Self {
            project_root,
            python: None,
            interrupt: Interrupt::new(),
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    context: CommandContext,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given context.
    pub fn new(context: CommandContext) -> Self {
        Self { context }
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.context.project_root
    }

    /// Dispatch and execute a command.
    ///
    /// Routes the CLI subcommand to the appropriate command implementation
    /// and executes it.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Some(Commands::Start(args)) => {
                let cmd = super::start::StartCommand::new(self.context.clone(), args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Backend(_)) => {
                let cmd = super::backend::BackendCommand::new(self.context.clone());
                cmd.execute(ui)
            }
            Some(Commands::Plan(args)) => {
                let cmd = super::plan::PlanCommand::new(self.context.clone(), args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Completions(args)) => {
                let cmd = super::completions::CompletionsCommand::new(args.clone());
                cmd.execute(ui)
            }
            None => {
                // Default to start with default args
                let cmd = super::start::StartCommand::new(self.context.clone(), StartArgs::default());
                cmd.execute(ui)
            }
        }
    }
}

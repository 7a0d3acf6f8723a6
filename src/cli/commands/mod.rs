//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. This allows:
//! - Single binary with subcommands (`rxboot start`, `rxboot backend`)
//! - One [`CommandContext`] carrying the project root and interrupt flag

pub mod backend;
pub mod completions;
pub mod dispatcher;
pub mod plan;
pub mod start;

pub use dispatcher::{Command, CommandContext, CommandDispatcher, CommandResult};

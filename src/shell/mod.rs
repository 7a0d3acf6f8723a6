//! Short-lived command execution and platform detection.

pub mod command;
pub mod platform;

pub use command::{
    describe_command, execute, execute_check, execute_streaming, CommandOptions, CommandResult,
    OutputCallback, OutputLine,
};
pub use platform::{is_ci, is_ci_with};

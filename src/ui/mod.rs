//! Operator-facing output.
//!
//! Every step of the bootstrap reports through a single [`UserInterface`]
//! instead of printing directly, so the orchestration can be exercised in
//! tests with [`MockUI`].
//!
//! - [`TerminalUI`] for interactive terminals (colors, spinners)
//! - [`NonInteractiveUI`] for CI and redirected output
//! - [`MockUI`] for capturing interactions in tests
//!
//! # Example
//!
//! ```
//! use rxboot::ui::{create_ui, OutputMode};
//!
//! // Use non-interactive mode for testability
//! let mut ui = create_ui(false, OutputMode::Quiet);
//! ui.show_header("Prescription Analyzer");
//! ui.success("Backend API started");
//! ```

pub mod hints;
pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod spinner;
pub mod terminal;
pub mod theme;

pub use mock::{MockSpinner, MockUI};
pub use non_interactive::NonInteractiveUI;
pub use output::OutputMode;
pub use spinner::{live_output_callback, ProgressSpinner};
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, RxTheme};

use indicatif::ProgressBar;

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message.
    fn error(&mut self, msg: &str);

    /// Start a spinner for an operation.
    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Show a contextual hint.
    fn show_hint(&mut self, hint: &str);

    /// Show a boxed block of captured output, e.g. the tail of a service log.
    fn show_error_block(&mut self, title: &str, lines: &[String], hint: Option<&str>);

    /// Check if running in interactive mode.
    fn is_interactive(&self) -> bool;
}

/// Handle for controlling a spinner.
pub trait SpinnerHandle {
    /// Update the spinner message.
    fn set_message(&mut self, msg: &str);

    /// Mark the operation as successful.
    fn finish_success(&mut self, msg: &str);

    /// Mark the operation as failed.
    fn finish_error(&mut self, msg: &str);

    /// The underlying progress bar, for streaming live output into it.
    fn progress_bar(&self) -> Option<ProgressBar> {
        None
    }
}

//! Start command implementation.
//!
//! The `rxboot start` command (also the default) runs the dual-service
//! bootstrap and supervises both services until the UI exits or the
//! operator presses Ctrl+C.

use crate::cli::args::StartArgs;
use crate::config::StackLayout;
use crate::error::{RxbootError, Result};
use crate::requirements::Interpreter;
use crate::services::{FixedDelay, ProcessLauncher};
use crate::supervisor::{Bootstrap, BootstrapOutcome};
use crate::sys;
use crate::ui::{hints, UserInterface};

use super::dispatcher::{Command, CommandContext, CommandResult};

/// Title shown above startup output.
pub const BANNER: &str = "AI Prescription Analyzer · local stack";

/// The start command implementation.
pub struct StartCommand {
    context: CommandContext,
    args: StartArgs,
}

impl StartCommand {
    /// Create a new start command.
    pub fn new(context: CommandContext, args: StartArgs) -> Self {
        Self { context, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &StartArgs {
        &self.args
    }

    /// Only an operator at a terminal gets a browser tab.
    fn opens_browser(&self, ui: &dyn UserInterface) -> bool {
        !self.args.no_browser && ui.is_interactive()
    }
}

impl Command for StartCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if ui.output_mode().shows_banner() {
            ui.show_header(BANNER);
        }

        let runtime = match Interpreter::discover(self.context.python.as_deref()) {
            Ok(runtime) => runtime,
            Err(e) => return Ok(report_failure(ui, &e)),
        };

        let layout = StackLayout::new(&self.context.project_root);
        let mut launcher = ProcessLauncher::new();
        let gate = FixedDelay::new();

        let mut bootstrap = Bootstrap::new(
            layout,
            &runtime,
            &mut launcher,
            &gate,
            self.context.interrupt.clone(),
        );
        if self.opens_browser(ui) {
            bootstrap = bootstrap.with_browser(Box::new(sys::open_url));
        }

        match bootstrap.run_full(ui) {
            Ok(BootstrapOutcome::UiExited(exit)) if !exit.success() => {
                ui.error(&format!("Frontend UI exited with {}", exit));
                Ok(CommandResult::failure(1))
            }
            Ok(_) => Ok(CommandResult::success()),
            Err(e) => Ok(report_failure(ui, &e)),
        }
    }
}

fn report_failure(ui: &mut dyn UserInterface, err: &RxbootError) -> CommandResult {
    tracing::debug!("Startup failed: {:?}", err);
    ui.error(&err.to_string());
    if hints::is_launch_failure(err) {
        ui.error("Failed to start one or more services");
    }
    if let Some(hint) = hints::for_startup_error(err) {
        ui.show_hint(&hint);
    }
    CommandResult::failure(1)
}

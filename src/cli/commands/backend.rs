//! Backend command implementation.
//!
//! The `rxboot backend` command runs only the API, under the ASGI dev
//! server with auto-reload and `DEBUG=True`, attached to the terminal.

use crate::config::StackLayout;
use crate::error::Result;
use crate::requirements::Interpreter;
use crate::services::{FixedDelay, ProcessLauncher};
use crate::supervisor::{Bootstrap, BootstrapOutcome};
use crate::ui::{hints, UserInterface};

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The backend command implementation.
pub struct BackendCommand {
    context: CommandContext,
}

impl BackendCommand {
    /// Create a new backend command.
    pub fn new(context: CommandContext) -> Self {
        Self { context }
    }
}

impl Command for BackendCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if ui.output_mode().shows_banner() {
            ui.show_header("Backend API · development server");
        }

        let runtime = match Interpreter::discover(self.context.python.as_deref()) {
            Ok(runtime) => runtime,
            Err(e) => {
                ui.error(&e.to_string());
                if let Some(hint) = hints::for_startup_error(&e) {
                    ui.show_hint(&hint);
                }
                return Ok(CommandResult::failure(1));
            }
        };

        let layout = StackLayout::new(&self.context.project_root);
        let mut launcher = ProcessLauncher::new();
        let gate = FixedDelay::new();

        let outcome = Bootstrap::new(
            layout,
            &runtime,
            &mut launcher,
            &gate,
            self.context.interrupt.clone(),
        )
        .run_backend_only(ui);

        match outcome {
            Ok(BootstrapOutcome::ApiExited(exit)) if !exit.success() => {
                ui.error(&format!("Backend server exited with {}", exit));
                ui.show_hint(hints::backend_install());
                Ok(CommandResult::failure(1))
            }
            Ok(_) => Ok(CommandResult::success()),
            Err(e) => {
                ui.error(&format!("Error starting server: {}", e));
                match hints::for_startup_error(&e) {
                    Some(hint) => ui.show_hint(&hint),
                    None => ui.show_hint(hints::backend_install()),
                }
                Ok(CommandResult::failure(1))
            }
        }
    }
}

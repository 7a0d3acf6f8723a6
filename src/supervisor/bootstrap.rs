//! The ordered startup sequence.
//!
//! Version gate, then `.env` provisioning, then dependency resolution, then
//! the API (launch + readiness), then the UI (launch + readiness), then
//! joint supervision. Any failure before supervision stops every handle
//! obtained so far.

use std::time::Duration;

use crate::config::{ProvisionOutcome, StackLayout};
use crate::error::{RxbootError, Result};
use crate::requirements::{ensure_minimum, resolve, PythonRuntime, Resolution};
use crate::services::{
    Launcher, ProcessExit, Readiness, ReadinessGate, ServiceDescriptor, ServiceProcess,
    POLL_INTERVAL,
};
use crate::supervisor::session::{
    shut_down, wait_or_interrupt, ShutdownReason, SupervisionSession, SHUTDOWN_GRACE,
};
use crate::supervisor::signal::Interrupt;
use crate::ui::UserInterface;

/// Opens a URL in the operator's browser.
pub type BrowserOpener = Box<dyn Fn(&str) -> anyhow::Result<()>>;

/// How a bootstrap run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// The UI exited on its own and the API was stopped.
    UiExited(ProcessExit),
    /// The API-only server exited on its own.
    ApiExited(ProcessExit),
    /// The operator stopped the running services.
    Interrupted,
    /// The operator interrupted before the services were running.
    Cancelled,
}

impl BootstrapOutcome {
    pub fn success(&self) -> bool {
        match self {
            BootstrapOutcome::UiExited(exit) | BootstrapOutcome::ApiExited(exit) => exit.success(),
            BootstrapOutcome::Interrupted | BootstrapOutcome::Cancelled => true,
        }
    }
}

/// Drives a dual-service or API-only run.
pub struct Bootstrap<'a> {
    layout: StackLayout,
    runtime: &'a dyn PythonRuntime,
    launcher: &'a mut dyn Launcher,
    gate: &'a dyn ReadinessGate,
    interrupt: Interrupt,
    browser: Option<BrowserOpener>,
    grace: Duration,
    poll: Duration,
}

impl<'a> Bootstrap<'a> {
    pub fn new(
        layout: StackLayout,
        runtime: &'a dyn PythonRuntime,
        launcher: &'a mut dyn Launcher,
        gate: &'a dyn ReadinessGate,
        interrupt: Interrupt,
    ) -> Self {
        Self {
            layout,
            runtime,
            launcher,
            gate,
            interrupt,
            browser: None,
            grace: SHUTDOWN_GRACE,
            poll: POLL_INTERVAL,
        }
    }

    /// Open the UI in a browser once it is ready.
    pub fn with_browser(mut self, opener: BrowserOpener) -> Self {
        self.browser = Some(opener);
        self
    }

    pub fn with_timing(mut self, grace: Duration, poll: Duration) -> Self {
        self.grace = grace;
        self.poll = poll;
        self
    }

    /// Dual-service bootstrap.
    pub fn run_full(&mut self, ui: &mut dyn UserInterface) -> Result<BootstrapOutcome> {
        if let Err(e) = self.check_runtime(ui) {
            return self.fail_or_cancel(e, ui);
        }
        if self.interrupt.is_set() {
            return Ok(self.cancelled(ui));
        }

        if let Err(e) = self.provision_env(ui) {
            return self.fail_or_cancel(e, ui);
        }
        if self.interrupt.is_set() {
            return Ok(self.cancelled(ui));
        }

        if let Err(e) = self.resolve_dependencies(ui) {
            return self.fail_or_cancel(e, ui);
        }
        if self.interrupt.is_set() {
            return Ok(self.cancelled(ui));
        }

        let python = self.runtime.executable().to_path_buf();

        let api_descriptor = self.layout.api(&python);
        let mut api = self.launch(&api_descriptor, ui)?;
        match self.await_ready(api.as_mut(), &api_descriptor, ui) {
            Ok(true) if !self.interrupt.is_set() => {}
            Ok(_) => {
                self.stop(&mut [api.as_mut()]);
                return Ok(self.cancelled(ui));
            }
            Err(e) => {
                self.stop(&mut [api.as_mut()]);
                return Err(e);
            }
        }

        let ui_descriptor = self.layout.ui(&python);
        let mut frontend = match self.launch(&ui_descriptor, ui) {
            Ok(process) => process,
            Err(e) => {
                self.stop(&mut [api.as_mut()]);
                return Err(e);
            }
        };
        match self.await_ready(frontend.as_mut(), &ui_descriptor, ui) {
            Ok(true) => {}
            Ok(false) => {
                self.stop(&mut [api.as_mut(), frontend.as_mut()]);
                return Ok(self.cancelled(ui));
            }
            Err(e) => {
                self.stop(&mut [api.as_mut(), frontend.as_mut()]);
                return Err(e);
            }
        }

        self.open_browser(&ui_descriptor.url(), ui);
        self.show_usage(ui);

        let mut session =
            SupervisionSession::new(api, frontend).with_timing(self.grace, self.poll);
        let reason = session.supervise(&self.interrupt, ui)?;
        ui.success("Services stopped");

        Ok(match reason {
            ShutdownReason::Interrupted => BootstrapOutcome::Interrupted,
            ShutdownReason::UiExited(exit) => BootstrapOutcome::UiExited(exit),
        })
    }

    /// API-only bootstrap under the auto-reloading dev server.
    pub fn run_backend_only(&mut self, ui: &mut dyn UserInterface) -> Result<BootstrapOutcome> {
        if let Err(e) = self.check_runtime(ui) {
            return self.fail_or_cancel(e, ui);
        }
        if self.interrupt.is_set() {
            return Ok(self.cancelled(ui));
        }

        let descriptor = self.layout.api_dev_server(self.runtime.executable());
        let mut server = self.launch(&descriptor, ui)?;

        ui.success(&format!("{} starting at {}", descriptor.name, descriptor.url()));
        ui.message(&format!("API documentation: {}", self.layout.docs_url()));
        ui.show_hint("Press Ctrl+C to stop the server");

        let exit = wait_or_interrupt(server.as_mut(), &self.interrupt, self.poll);
        match exit {
            Ok(Some(exit)) => {
                tracing::debug!("{} exited ({})", descriptor.name, exit);
                Ok(BootstrapOutcome::ApiExited(exit))
            }
            Ok(None) => {
                self.stop(&mut [server.as_mut()]);
                ui.success("Backend server stopped");
                Ok(BootstrapOutcome::Interrupted)
            }
            Err(e) => {
                self.stop(&mut [server.as_mut()]);
                Err(e)
            }
        }
    }

    fn check_runtime(&self, ui: &mut dyn UserInterface) -> Result<()> {
        let version = self.runtime.version()?;
        tracing::debug!(
            "Python {} at {}",
            version,
            self.runtime.executable().display()
        );
        ensure_minimum(version, self.layout.minimum_python)?;
        ui.success(&format!("Python {} detected", version));
        Ok(())
    }

    fn provision_env(&self, ui: &mut dyn UserInterface) -> Result<()> {
        let env = &self.layout.env_file;
        match env.provision()? {
            ProvisionOutcome::Created => {
                ui.success(&format!(
                    "Created {} from {}",
                    file_name(&env.target),
                    file_name(&env.template)
                ));
                ui.warning(&format!(
                    "Please edit {} with your API keys and configuration",
                    file_name(&env.target)
                ));
            }
            ProvisionOutcome::AlreadyPresent => ui.success("Environment file found"),
            ProvisionOutcome::Missing => ui.warning("No environment configuration found"),
        }
        Ok(())
    }

    fn resolve_dependencies(&self, ui: &mut dyn UserInterface) -> Result<()> {
        match resolve(&self.layout.dependencies, self.runtime, ui, &self.interrupt)? {
            Resolution::Installed(names) => {
                tracing::debug!("Installed {:?}", names);
                ui.success("All dependencies installed");
            }
            Resolution::Cancelled => tracing::debug!("Dependency resolution cancelled"),
            Resolution::AllPresent => {}
        }
        Ok(())
    }

    fn launch(
        &mut self,
        descriptor: &ServiceDescriptor,
        ui: &mut dyn UserInterface,
    ) -> Result<Box<dyn ServiceProcess>> {
        ui.message(&format!("Starting {}...", descriptor.name));
        self.launcher.launch(descriptor)
    }

    /// `Ok(false)` when interrupted during the wait.
    fn await_ready(
        &self,
        process: &mut dyn ServiceProcess,
        descriptor: &ServiceDescriptor,
        ui: &mut dyn UserInterface,
    ) -> Result<bool> {
        match self
            .gate
            .wait_ready(process, descriptor.ready_delay, &self.interrupt)?
        {
            Readiness::Ready => {
                ui.success(&format!("{} started at {}", descriptor.name, descriptor.url()));
                Ok(true)
            }
            Readiness::Interrupted => Ok(false),
            Readiness::Exited(exit) => {
                let output = process.captured_output();
                if !output.is_empty() {
                    ui.show_error_block(&format!("{} output", descriptor.name), &output, None);
                }
                Err(RxbootError::ExitedBeforeReady {
                    service: descriptor.name.clone(),
                    status: exit.to_string(),
                })
            }
        }
    }

    fn stop(&self, processes: &mut [&mut dyn ServiceProcess]) {
        shut_down(processes, self.grace, self.poll);
    }

    // Children share our process group, so Ctrl+C can fail a phase before
    // the flag is checked.
    fn fail_or_cancel(
        &self,
        err: RxbootError,
        ui: &mut dyn UserInterface,
    ) -> Result<BootstrapOutcome> {
        if self.interrupt.is_set() {
            tracing::debug!("Ignoring error after interrupt: {}", err);
            return Ok(self.cancelled(ui));
        }
        Err(err)
    }

    fn cancelled(&self, ui: &mut dyn UserInterface) -> BootstrapOutcome {
        tracing::debug!("Interrupted before services were running");
        ui.warning("Startup cancelled by user");
        BootstrapOutcome::Cancelled
    }

    fn open_browser(&self, url: &str, ui: &mut dyn UserInterface) {
        let Some(open) = &self.browser else {
            return;
        };
        match open(url) {
            Ok(()) => ui.message("Opening browser..."),
            Err(e) => ui.warning(&format!("Could not open browser automatically: {}", e)),
        }
    }

    fn show_usage(&self, ui: &mut dyn UserInterface) {
        if !ui.output_mode().shows_banner() {
            return;
        }
        ui.show_header("Services are running");
        ui.message(&format!("  Backend API:        {}", self.layout.api_url()));
        ui.message(&format!("  API documentation:  {}", self.layout.docs_url()));
        ui.message(&format!("  Frontend UI:        {}", self.layout.ui_url()));
        ui.show_hint(&format!(
            "Make sure {} holds your API keys",
            file_name(&self.layout.env_file.target)
        ));
        ui.show_hint("Press Ctrl+C to stop all services");
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

//! Joint supervision of the running API and UI processes.

use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::services::{ProcessExit, ServiceProcess, POLL_INTERVAL};
use crate::supervisor::signal::Interrupt;
use crate::ui::UserInterface;

/// How long a service gets to exit after a termination request before it
/// is killed.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Lifecycle of a supervision run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    ShuttingDown,
    Stopped,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Running => "running",
            SessionState::ShuttingDown => "shutting-down",
            SessionState::Stopped => "stopped",
        };
        write!(f, "{}", name)
    }
}

/// Why a session left the running state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// The UI process ended on its own.
    UiExited(ProcessExit),
    /// The operator interrupted the session.
    Interrupted,
}

/// The API and UI handles, owned together for the session's lifetime.
pub struct SupervisionSession {
    api: Box<dyn ServiceProcess>,
    ui: Box<dyn ServiceProcess>,
    state: SessionState,
    grace: Duration,
    poll: Duration,
    api_exit: Option<ProcessExit>,
}

impl SupervisionSession {
    /// Start a session over two launched services.
    pub fn new(api: Box<dyn ServiceProcess>, ui: Box<dyn ServiceProcess>) -> Self {
        tracing::debug!("Session running (api pid {}, ui pid {})", api.id(), ui.id());
        Self {
            api,
            ui,
            state: SessionState::Running,
            grace: SHUTDOWN_GRACE,
            poll: POLL_INTERVAL,
            api_exit: None,
        }
    }

    pub fn with_timing(mut self, grace: Duration, poll: Duration) -> Self {
        self.grace = grace;
        self.poll = poll;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Exit status of the API if it died while the session ran.
    pub fn api_exit(&self) -> Option<ProcessExit> {
        self.api_exit
    }

    /// Block until the UI exits or the operator interrupts, then stop both
    /// services.
    ///
    /// Both services are stopped even when watching fails.
    pub fn supervise(
        &mut self,
        interrupt: &Interrupt,
        reporter: &mut dyn UserInterface,
    ) -> Result<ShutdownReason> {
        let outcome = self.watch(interrupt, reporter);

        self.transition(SessionState::ShuttingDown);
        reporter.message("Shutting down services...");
        shut_down(&mut [self.api.as_mut(), self.ui.as_mut()], self.grace, self.poll);
        self.transition(SessionState::Stopped);

        outcome
    }

    fn watch(
        &mut self,
        interrupt: &Interrupt,
        reporter: &mut dyn UserInterface,
    ) -> Result<ShutdownReason> {
        loop {
            if interrupt.is_set() {
                return Ok(ShutdownReason::Interrupted);
            }
            if let Some(exit) = self.ui.try_wait()? {
                tracing::debug!("{} exited ({})", self.ui.name(), exit);
                return Ok(ShutdownReason::UiExited(exit));
            }
            if self.api_exit.is_none() {
                if let Some(exit) = self.api.try_wait()? {
                    self.report_api_exit(exit, reporter);
                }
            }
            thread::sleep(self.poll);
        }
    }

    // The UI keeps running without the API; the operator decides when to stop.
    fn report_api_exit(&mut self, exit: ProcessExit, reporter: &mut dyn UserInterface) {
        tracing::warn!("{} exited during the session ({})", self.api.name(), exit);
        self.api_exit = Some(exit);
        reporter.warning(&format!("{} stopped unexpectedly ({})", self.api.name(), exit));
        let output = self.api.captured_output();
        if !output.is_empty() {
            reporter.show_error_block(&format!("{} output", self.api.name()), &output, None);
        }
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!("Session {} -> {}", self.state, next);
        self.state = next;
    }
}

/// Request termination of every process, then wait for each to exit.
///
/// All requests go out before any waiting starts. Processes still alive
/// after `grace` are killed.
pub fn shut_down(processes: &mut [&mut dyn ServiceProcess], grace: Duration, poll: Duration) {
    for process in processes.iter_mut() {
        tracing::debug!("Terminating {} (pid {})", process.name(), process.id());
        if let Err(e) = process.terminate() {
            tracing::warn!("Failed to terminate {}: {}", process.name(), e);
        }
    }

    let deadline = Instant::now() + grace;
    for process in processes.iter_mut() {
        loop {
            match process.try_wait() {
                Ok(Some(exit)) => {
                    tracing::debug!("{} stopped ({})", process.name(), exit);
                    break;
                }
                Ok(None) if Instant::now() >= deadline => {
                    tracing::warn!(
                        "{} did not stop within {:?}; killing it",
                        process.name(),
                        grace
                    );
                    if let Err(e) = process.kill() {
                        tracing::warn!("Failed to kill {}: {}", process.name(), e);
                    } else if let Err(e) = process.wait() {
                        tracing::warn!("Failed to reap {}: {}", process.name(), e);
                    }
                    break;
                }
                Ok(None) => thread::sleep(poll),
                Err(e) => {
                    tracing::warn!("Lost track of {}: {}", process.name(), e);
                    break;
                }
            }
        }
    }
}

/// Wait for a single process to exit, or for an interrupt.
///
/// Returns `None` when interrupted.
pub fn wait_or_interrupt(
    process: &mut dyn ServiceProcess,
    interrupt: &Interrupt,
    poll: Duration,
) -> Result<Option<ProcessExit>> {
    loop {
        if interrupt.is_set() {
            return Ok(None);
        }
        if let Some(exit) = process.try_wait()? {
            return Ok(Some(exit));
        }
        thread::sleep(poll);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supervisor::testing::FakeProcess;
    use crate::ui::MockUI;

    const FAST: Duration = Duration::from_millis(1);

    fn session(api: &FakeProcess, ui: &FakeProcess) -> SupervisionSession {
        SupervisionSession::new(Box::new(api.clone()), Box::new(ui.clone()))
            .with_timing(Duration::from_millis(50), FAST)
    }

    #[test]
    fn new_session_is_running() {
        let api = FakeProcess::running("Backend API");
        let ui = FakeProcess::running("Frontend UI");
        assert_eq!(session(&api, &ui).state(), SessionState::Running);
    }

    #[test]
    fn state_names() {
        let names: Vec<String> = [
            SessionState::Running,
            SessionState::ShuttingDown,
            SessionState::Stopped,
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        assert_eq!(names, ["running", "shutting-down", "stopped"]);
    }

    #[test]
    fn interrupt_terminates_both_services() {
        let api = FakeProcess::running("Backend API");
        let ui = FakeProcess::running("Frontend UI");
        let mut session = session(&api, &ui);
        let interrupt = Interrupt::new();
        interrupt.trigger();

        let reason = session.supervise(&interrupt, &mut MockUI::new()).unwrap();

        assert_eq!(reason, ShutdownReason::Interrupted);
        assert_eq!(api.terminate_calls(), 1);
        assert_eq!(ui.terminate_calls(), 1);
        assert!(api.has_exited());
        assert!(ui.has_exited());
        assert_eq!(session.state(), SessionState::Stopped);
    }

    #[test]
    fn ui_exit_ends_session_and_stops_api() {
        let api = FakeProcess::running("Backend API");
        let ui = FakeProcess::exiting_after("Frontend UI", 3, ProcessExit::code(0));
        let mut session = session(&api, &ui);

        let reason = session.supervise(&Interrupt::new(), &mut MockUI::new()).unwrap();

        assert_eq!(reason, ShutdownReason::UiExited(ProcessExit::code(0)));
        assert_eq!(api.terminate_calls(), 1);
        assert!(api.has_exited());
    }

    #[test]
    fn api_exit_is_reported_once_without_ending_session() {
        let api = FakeProcess::exited("Backend API", ProcessExit::code(1))
            .with_output(&["ModuleNotFoundError: No module named 'openai'"]);
        let ui = FakeProcess::exiting_after("Frontend UI", 5, ProcessExit::code(0));
        let mut session = session(&api, &ui);
        let mut reporter = MockUI::new();

        session.supervise(&Interrupt::new(), &mut reporter).unwrap();

        assert_eq!(reporter.warnings().len(), 1);
        assert!(reporter.has_warning("Backend API stopped unexpectedly"));
        assert_eq!(reporter.error_blocks().len(), 1);
        assert_eq!(session.api_exit(), Some(ProcessExit::code(1)));
    }

    #[test]
    fn stubborn_process_is_killed_after_grace() {
        let api = FakeProcess::running("Backend API").ignoring_terminate();
        let ui = FakeProcess::running("Frontend UI");

        shut_down(
            &mut [&mut api.clone(), &mut ui.clone()],
            Duration::from_millis(20),
            FAST,
        );

        assert_eq!(api.terminate_calls(), 1);
        assert_eq!(api.kill_calls(), 1);
        assert_eq!(ui.kill_calls(), 0);
        assert!(api.has_exited());
    }

    #[test]
    fn all_terminations_are_requested_before_waiting() {
        let api = FakeProcess::running("Backend API").ignoring_terminate();
        let ui = FakeProcess::running("Frontend UI").ignoring_terminate();

        shut_down(
            &mut [&mut api.clone(), &mut ui.clone()],
            Duration::from_millis(10),
            FAST,
        );

        assert_eq!(api.terminate_calls(), 1);
        assert_eq!(ui.terminate_calls(), 1);
        assert_eq!(api.kill_calls(), 1);
        assert_eq!(ui.kill_calls(), 1);
    }

    #[test]
    fn wait_or_interrupt_returns_exit() {
        let mut process = FakeProcess::exiting_after("Backend API", 2, ProcessExit::code(3));
        let exit = wait_or_interrupt(&mut process, &Interrupt::new(), FAST).unwrap();
        assert_eq!(exit, Some(ProcessExit::code(3)));
    }

    #[test]
    fn wait_or_interrupt_returns_none_on_interrupt() {
        let mut process = FakeProcess::running("Backend API");
        let interrupt = Interrupt::new();
        interrupt.trigger();

        assert_eq!(wait_or_interrupt(&mut process, &interrupt, FAST).unwrap(), None);
    }
}

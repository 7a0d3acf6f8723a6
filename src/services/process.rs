//! Handles to spawned service processes.

use std::fmt;
use std::process::{Child, ExitStatus};

use crate::error::Result;
use crate::services::output::OutputTail;

/// How a process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    /// Exit code, `None` when ended by a signal.
    pub code: Option<i32>,
    /// Signal that ended the process, Unix only.
    pub signal: Option<i32>,
}

impl ProcessExit {
    pub fn code(code: i32) -> Self {
        Self {
            code: Some(code),
            signal: None,
        }
    }

    pub fn signaled(signal: i32) -> Self {
        Self {
            code: None,
            signal: Some(signal),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for ProcessExit {
    fn from(status: ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;

        Self {
            code: status.code(),
            signal,
        }
    }
}

impl fmt::Display for ProcessExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.signal) {
            (Some(code), _) => write!(f, "exit code {}", code),
            (None, Some(signal)) => write!(f, "terminated by signal {}", signal),
            (None, None) => write!(f, "unknown exit status"),
        }
    }
}

/// An owned reference to a running service.
///
/// Only the supervisor holds these once a service has launched.
pub trait ServiceProcess {
    /// OS process id.
    fn id(&self) -> u32;

    /// Name of the service this process runs.
    fn name(&self) -> &str;

    /// Non-blocking exit check.
    fn try_wait(&mut self) -> Result<Option<ProcessExit>>;

    /// Block until the process exits.
    fn wait(&mut self) -> Result<ProcessExit>;

    /// Ask the process to stop. Returns immediately.
    fn terminate(&mut self) -> Result<()>;

    /// Stop the process unconditionally.
    fn kill(&mut self) -> Result<()>;

    fn is_running(&mut self) -> bool {
        matches!(self.try_wait(), Ok(None))
    }

    /// Recent output, for services whose output is captured.
    fn captured_output(&self) -> Vec<String> {
        Vec::new()
    }
}

/// [`ServiceProcess`] over a `std::process::Child`.
pub struct ChildProcess {
    name: String,
    child: Child,
    /// Signals go to the whole process group (the child leads its own).
    group: bool,
    tail: Option<OutputTail>,
    exit: Option<ProcessExit>,
}

impl ChildProcess {
    pub fn new(name: impl Into<String>, child: Child, group: bool, tail: Option<OutputTail>) -> Self {
        Self {
            name: name.into(),
            child,
            group,
            tail,
            exit: None,
        }
    }

    #[cfg(unix)]
    fn signal(&self, signal: libc::c_int) -> Result<()> {
        let pid = self.child.id() as libc::pid_t;
        let target = if self.group { -pid } else { pid };

        tracing::debug!("Sending signal {} to {} ({})", signal, self.name, target);

        // SAFETY: kill(2) has no memory-safety preconditions.
        let rc = unsafe { libc::kill(target, signal) };
        if rc == 0 {
            return Ok(());
        }
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::ESRCH) {
            // Already gone.
            return Ok(());
        }
        Err(err.into())
    }

    #[cfg(unix)]
    fn request_stop(&mut self) -> Result<()> {
        self.signal(libc::SIGTERM)
    }

    // No polite termination request outside Unix.
    #[cfg(not(unix))]
    fn request_stop(&mut self) -> Result<()> {
        self.kill()
    }
}

impl ServiceProcess for ChildProcess {
    fn id(&self) -> u32 {
        self.child.id()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn try_wait(&mut self) -> Result<Option<ProcessExit>> {
        if let Some(exit) = self.exit {
            return Ok(Some(exit));
        }
        let exit = self.child.try_wait()?.map(ProcessExit::from);
        self.exit = exit;
        Ok(exit)
    }

    fn wait(&mut self) -> Result<ProcessExit> {
        if let Some(exit) = self.exit {
            return Ok(exit);
        }
        let exit = ProcessExit::from(self.child.wait()?);
        self.exit = Some(exit);
        Ok(exit)
    }

    fn terminate(&mut self) -> Result<()> {
        let exited = self.try_wait()?.is_some();
        // Workers can outlive the group leader.
        #[cfg(unix)]
        {
            if self.group {
                return self.signal(libc::SIGTERM);
            }
        }
        if exited {
            return Ok(());
        }
        self.request_stop()
    }

    fn kill(&mut self) -> Result<()> {
        let exited = self.try_wait()?.is_some();
        #[cfg(unix)]
        {
            if self.group {
                return self.signal(libc::SIGKILL);
            }
        }
        if exited {
            return Ok(());
        }
        match self.child.kill() {
            Ok(()) => Ok(()),
            // Exited between the check and the kill.
            Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn captured_output(&self) -> Vec<String> {
        self.tail
            .as_ref()
            .map(OutputTail::snapshot)
            .unwrap_or_default()
    }
}

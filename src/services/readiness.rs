//! Deciding when a freshly launched service is usable.
//!
//! Only a fixed delay exists today. The gate is a trait so an active check
//! can replace it without touching the bootstrap.

use std::thread;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::services::process::{ProcessExit, ServiceProcess};
use crate::supervisor::signal::Interrupt;

/// Granularity of every supervisor wait.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Outcome of waiting for a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    /// The process died during the wait.
    Exited(ProcessExit),
    /// The operator interrupted the wait.
    Interrupted,
}

pub trait ReadinessGate {
    fn wait_ready(
        &self,
        process: &mut dyn ServiceProcess,
        delay: Duration,
        interrupt: &Interrupt,
    ) -> Result<Readiness>;
}

/// Treats a service as ready once `delay` has passed.
///
/// The wait is sliced so an early exit or interrupt ends it at once.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    poll: Duration,
}

impl FixedDelay {
    pub fn new() -> Self {
        Self {
            poll: POLL_INTERVAL,
        }
    }

    pub fn with_poll(poll: Duration) -> Self {
        Self { poll }
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadinessGate for FixedDelay {
    fn wait_ready(
        &self,
        process: &mut dyn ServiceProcess,
        delay: Duration,
        interrupt: &Interrupt,
    ) -> Result<Readiness> {
        tracing::debug!("Waiting {:?} for {} to be ready", delay, process.name());

        let deadline = Instant::now() + delay;
        loop {
            if interrupt.is_set() {
                return Ok(Readiness::Interrupted);
            }
            if let Some(exit) = process.try_wait()? {
                return Ok(Readiness::Exited(exit));
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(Readiness::Ready);
            }
            thread::sleep(self.poll.min(deadline - now));
        }
    }
}

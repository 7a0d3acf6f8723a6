//! Process orchestration and lifecycle supervision.
//!
//! # Modules
//!
//! - [`bootstrap`] - The ordered startup sequence for both run modes
//! - [`session`] - Joint supervision and shutdown of the running services
//! - [`signal`] - Operator interrupt flag

pub mod bootstrap;
pub mod session;
pub mod signal;

#[cfg(test)]
pub(crate) mod testing;

pub use bootstrap::{Bootstrap, BootstrapOutcome, BrowserOpener};
pub use session::{
    shut_down, wait_or_interrupt, SessionState, ShutdownReason, SupervisionSession,
    SHUTDOWN_GRACE,
};
pub use signal::Interrupt;

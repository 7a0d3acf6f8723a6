//! Launching and tracking the managed services.
//!
//! # Modules
//!
//! - [`descriptor`] - What to run, where, and how long to wait for it
//! - [`launcher`] - Spawning a descriptor as a child process
//! - [`process`] - Handles to running services
//! - [`readiness`] - Waiting until a service is usable
//! - [`output`] - Bounded capture of service output

pub mod descriptor;
pub mod launcher;
pub mod output;
pub mod process;
pub mod readiness;

pub use descriptor::{OutputPolicy, ServiceDescriptor};
pub use launcher::{Launcher, ProcessLauncher};
pub use output::{OutputTail, DEFAULT_TAIL_LINES};
pub use process::{ChildProcess, ProcessExit, ServiceProcess};
pub use readiness::{FixedDelay, Readiness, ReadinessGate, POLL_INTERVAL};

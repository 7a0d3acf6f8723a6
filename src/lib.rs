//! rxboot - One-command bootstrap for a local API + UI stack.
//!
//! rxboot checks the Python runtime, provisions `.env` from its template,
//! installs missing packages, then launches the FastAPI backend and the
//! Streamlit frontend and supervises both until the operator stops them.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Project layout and environment file provisioning
//! - [`error`] - Error types and result aliases
//! - [`requirements`] - Interpreter discovery, version gate, package resolution
//! - [`services`] - Service descriptors, process launching, readiness
//! - [`shell`] - Shell command execution
//! - [`supervisor`] - Startup sequence, supervision session, signal handling
//! - [`sys`] - PATH lookup and browser launching
//! - [`ui`] - Spinners, hints, and terminal output
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use rxboot::config::StackLayout;
//!
//! let layout = StackLayout::new("/srv/prescriptions");
//! let plan = layout.plan(Path::new("/usr/bin/python3"));
//! assert_eq!(plan.services.len(), 2);
//! assert_eq!(plan.api_docs, "http://localhost:8000/api/docs");
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod requirements;
pub mod services;
pub mod shell;
pub mod supervisor;
pub mod sys;
pub mod ui;

pub use config::StackLayout;
pub use error::{Result, RxbootError};
pub use supervisor::{Bootstrap, BootstrapOutcome, Interrupt};

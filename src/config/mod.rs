//! Stack layout and local configuration.
//!
//! # Modules
//!
//! - [`layout`] - Project paths, ports, readiness delays and launch commands
//! - [`env_file`] - Creating `.env` from its template

pub mod env_file;
pub mod layout;

pub use env_file::{EnvironmentFile, FileState, ProvisionOutcome};
pub use layout::{LaunchPlan, StackLayout};

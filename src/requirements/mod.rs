//! Runtime prerequisites for the services.
//!
//! # Modules
//!
//! - [`interpreter`] - Locating and talking to the Python interpreter
//! - [`version`] - Minimum runtime version gate
//! - [`packages`] - Detecting and installing required libraries

pub mod interpreter;
pub mod packages;
pub mod version;

pub use interpreter::{Interpreter, PythonRuntime, INTERPRETER_CANDIDATES};
pub use packages::{resolve, scan, DependencySpec, PackageCheck, PackageStatus, Resolution};
pub use version::{ensure_minimum, RuntimeVersion, MINIMUM_PYTHON};

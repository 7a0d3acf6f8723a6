//! The Python interpreter the services run on.
//!
//! [`PythonRuntime`] is the seam between the startup checks and the real
//! interpreter: the version gate and the dependency resolver only talk to
//! the trait, so both can be driven by a fake runtime in tests.

use std::path::{Path, PathBuf};

use crate::error::{RxbootError, Result};
use crate::requirements::version::RuntimeVersion;
use crate::shell::{
    describe_command, execute, execute_check, execute_streaming, CommandOptions, OutputCallback,
};
use crate::sys;

/// Interpreter names tried on PATH, in order, when none is configured.
pub const INTERPRETER_CANDIDATES: &[&str] = &["python3", "python"];

/// Operations the bootstrap needs from the host runtime.
pub trait PythonRuntime {
    /// Path to the interpreter executable, used to launch the services.
    fn executable(&self) -> &Path;

    /// Query the interpreter's version.
    fn version(&self) -> Result<RuntimeVersion>;

    /// Whether `module` resolves through the interpreter's import system.
    fn can_import(&self, module: &str) -> bool;

    /// Install `packages` with a single package-installer invocation.
    ///
    /// Installer output is handed to `on_output` line by line.
    fn install(&self, packages: &[String], on_output: OutputCallback) -> Result<()>;
}

/// A concrete interpreter on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    path: PathBuf,
}

impl Interpreter {
    /// Wrap an interpreter path without checking it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Locate the interpreter.
    ///
    /// An explicit path must point at an existing file. Without one, the
    /// first of [`INTERPRETER_CANDIDATES`] found on PATH is used.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        Self::discover_in(explicit, &sys::parse_system_path())
    }

    /// [`Interpreter::discover`] against an explicit list of PATH entries.
    pub fn discover_in(explicit: Option<&Path>, path_entries: &[PathBuf]) -> Result<Self> {
        if let Some(path) = explicit {
            if path.is_file() {
                return Ok(Self::new(path));
            }
            return Err(RxbootError::RuntimeNotFound {
                message: format!("{} does not exist", path.display()),
            });
        }

        INTERPRETER_CANDIDATES
            .iter()
            .find_map(|name| sys::resolve_tool_path(name, path_entries))
            .map(Self::new)
            .ok_or_else(|| RxbootError::RuntimeNotFound {
                message: format!(
                    "none of {} found on PATH",
                    INTERPRETER_CANDIDATES.join(", ")
                ),
            })
    }
}

impl PythonRuntime for Interpreter {
    fn executable(&self) -> &Path {
        &self.path
    }

    fn version(&self) -> Result<RuntimeVersion> {
        let options = CommandOptions {
            capture_stdout: true,
            capture_stderr: true,
        };
        let result =
            execute(&self.path, &["--version"], &options).map_err(|e| match e {
                RxbootError::SpawnFailed { message, .. } => RxbootError::RuntimeNotFound {
                    message: format!("{}: {}", self.path.display(), message),
                },
                other => other,
            })?;

        // Python 2 prints its banner on stderr.
        let banner = format!("{}{}", result.stdout, result.stderr);
        RuntimeVersion::parse(&banner).ok_or_else(|| RxbootError::VersionUnparseable {
            output: banner.trim().to_string(),
        })
    }

    fn can_import(&self, module: &str) -> bool {
        let statement = format!("import {}", module);
        execute_check(&self.path, &["-c", statement.as_str()])
    }

    fn install(&self, packages: &[String], on_output: OutputCallback) -> Result<()> {
        let mut args = vec![
            "-m".to_string(),
            "pip".to_string(),
            "install".to_string(),
        ];
        args.extend(packages.iter().cloned());

        tracing::info!("Installing: {}", describe_command(&self.path, &args));

        let result = execute_streaming(&self.path, &args, on_output)?;
        if result.success {
            Ok(())
        } else {
            Err(RxbootError::InstallFailed {
                packages: packages.join(", "),
                code: result.exit_code,
            })
        }
    }
}

//! Third-party library resolution.
//!
//! Every required name is checked through the interpreter's import system.
//! Whatever is missing gets installed with one batched installer call.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::Result;
use crate::requirements::interpreter::PythonRuntime;
use crate::shell::OutputCallback;
use crate::supervisor::signal::Interrupt;
use crate::ui::{live_output_callback, UserInterface};

/// Set of required library names. Unique and unordered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DependencySpec(BTreeSet<String>);

impl DependencySpec {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageStatus {
    Present,
    Missing,
}

/// Import check result for one library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageCheck {
    pub name: String,
    pub status: PackageStatus,
}

/// What the resolver ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Everything was already importable.
    AllPresent,
    /// The listed libraries were installed.
    Installed(Vec<String>),
    /// The operator interrupted the scan or the install.
    Cancelled,
}

/// Check every library in `spec`.
///
/// Returns `None` as soon as `interrupt` is set. A check that ran while the
/// interrupt arrived is discarded, since the interrupt also reaches the
/// interpreter and makes the import look like it failed.
pub fn scan(
    spec: &DependencySpec,
    runtime: &dyn PythonRuntime,
    interrupt: &Interrupt,
) -> Option<Vec<PackageCheck>> {
    let mut checks = Vec::with_capacity(spec.len());
    for name in spec.iter() {
        let importable = runtime.can_import(name);
        if interrupt.is_set() {
            tracing::debug!("Dependency scan interrupted at {}", name);
            return None;
        }
        let status = if importable {
            PackageStatus::Present
        } else {
            PackageStatus::Missing
        };
        tracing::debug!("Dependency {}: {:?}", name, status);
        checks.push(PackageCheck {
            name: name.to_string(),
            status,
        });
    }
    Some(checks)
}

/// Names from a scan that need installing.
pub fn missing(checks: &[PackageCheck]) -> Vec<String> {
    checks
        .iter()
        .filter(|c| c.status == PackageStatus::Missing)
        .map(|c| c.name.clone())
        .collect()
}

/// Ensure every library in `spec` is importable.
///
/// Installer failure is returned as-is; nothing is retried. An interrupt
/// yields [`Resolution::Cancelled`] whatever the installer reported.
pub fn resolve(
    spec: &DependencySpec,
    runtime: &dyn PythonRuntime,
    ui: &mut dyn UserInterface,
    interrupt: &Interrupt,
) -> Result<Resolution> {
    let Some(checks) = scan(spec, runtime, interrupt) else {
        return Ok(Resolution::Cancelled);
    };

    for check in &checks {
        match check.status {
            PackageStatus::Present => ui.success(&format!("{} is installed", check.name)),
            PackageStatus::Missing => ui.warning(&format!("{} is missing", check.name)),
        }
    }

    let missing = missing(&checks);
    if missing.is_empty() {
        return Ok(Resolution::AllPresent);
    }
    if interrupt.is_set() {
        return Ok(Resolution::Cancelled);
    }

    let message = format!("Installing {}...", missing.join(", "));
    let mut spinner = ui.start_spinner(&message);
    let on_output: OutputCallback = match spinner.progress_bar() {
        Some(bar) => live_output_callback(bar, message.clone(), 4, 3),
        None => Box::new(|_| {}),
    };

    let result = runtime.install(&missing, on_output);
    if interrupt.is_set() {
        if let Err(e) = &result {
            tracing::debug!("Installer stopped by interrupt: {}", e);
        }
        spinner.finish_error("Installation cancelled");
        return Ok(Resolution::Cancelled);
    }

    match result {
        Ok(()) => {
            spinner.finish_success(&format!("Installed {}", missing.join(", ")));
            Ok(Resolution::Installed(missing))
        }
        Err(e) => {
            spinner.finish_error(&format!("Failed to install {}", missing.join(", ")));
            Err(e)
        }
    }
}

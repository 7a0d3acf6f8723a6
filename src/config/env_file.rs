//! Local configuration file provisioning.
//!
//! The services read secrets from a `.env` file that is never checked in.
//! On first run it is created from the checked-in template; an existing
//! file is never touched.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{RxbootError, Result};

/// Whether a file is on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileState {
    Absent,
    Present,
}

impl FileState {
    fn of(path: &Path) -> Self {
        if path.exists() {
            FileState::Present
        } else {
            FileState::Absent
        }
    }
}

/// What provisioning did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The target was created from the template.
    Created,
    /// The target already existed and was left alone.
    AlreadyPresent,
    /// Neither target nor template exists. The run continues without config.
    Missing,
}

/// Target configuration path and the template it is seeded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentFile {
    pub target: PathBuf,
    pub template: PathBuf,
}

impl EnvironmentFile {
    pub fn new(target: impl Into<PathBuf>, template: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            template: template.into(),
        }
    }

    /// `dir/target_name` seeded from `dir/template_name`.
    pub fn in_dir(dir: &Path, target_name: &str, template_name: &str) -> Self {
        Self::new(dir.join(target_name), dir.join(template_name))
    }

    pub fn state(&self) -> FileState {
        FileState::of(&self.target)
    }

    pub fn template_state(&self) -> FileState {
        FileState::of(&self.template)
    }

    /// Make sure the target exists, copying the template byte-for-byte if
    /// it does not.
    pub fn provision(&self) -> Result<ProvisionOutcome> {
        if self.state() == FileState::Present {
            tracing::debug!("{} already present", self.target.display());
            return Ok(ProvisionOutcome::AlreadyPresent);
        }

        if self.template_state() == FileState::Absent {
            tracing::warn!(
                "Neither {} nor {} exists",
                self.target.display(),
                self.template.display()
            );
            return Ok(ProvisionOutcome::Missing);
        }

        let contents = fs::read(&self.template).map_err(|e| self.provision_error(e))?;

        // create_new so a file appearing between the check and the write is kept.
        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.target)
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Ok(ProvisionOutcome::AlreadyPresent);
            }
            Err(e) => return Err(self.provision_error(e)),
        };
        file.write_all(&contents)
            .map_err(|e| self.provision_error(e))?;

        tracing::debug!(
            "Created {} from {}",
            self.target.display(),
            self.template.display()
        );
        Ok(ProvisionOutcome::Created)
    }

    fn provision_error(&self, e: std::io::Error) -> RxbootError {
        RxbootError::ProvisionFailed {
            path: self.target.clone(),
            message: e.to_string(),
        }
    }
}

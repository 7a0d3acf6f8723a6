//! Starting service processes.

use std::process::{Command, Stdio};

use crate::error::{RxbootError, Result};
use crate::services::descriptor::{OutputPolicy, ServiceDescriptor};
use crate::services::output::OutputTail;
use crate::services::process::{ChildProcess, ServiceProcess};
use crate::shell::describe_command;

/// Starts one service and hands back its handle without waiting on it.
pub trait Launcher {
    fn launch(&mut self, descriptor: &ServiceDescriptor) -> Result<Box<dyn ServiceProcess>>;
}

/// [`Launcher`] that spawns real OS processes.
#[derive(Debug, Default)]
pub struct ProcessLauncher;

impl ProcessLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl Launcher for ProcessLauncher {
    fn launch(&mut self, descriptor: &ServiceDescriptor) -> Result<Box<dyn ServiceProcess>> {
        if let Some(missing) = descriptor.required_dirs().find(|dir| !dir.is_dir()) {
            return Err(RxbootError::DirectoryNotFound {
                service: descriptor.name.clone(),
                path: missing.clone(),
            });
        }

        let mut cmd = Command::new(&descriptor.program);
        cmd.args(&descriptor.args)
            .current_dir(&descriptor.working_dir)
            .envs(&descriptor.env);

        match descriptor.output {
            OutputPolicy::Capture => {
                cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
            }
            OutputPolicy::Inherit => {
                cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            }
        }

        if descriptor.detached {
            cmd.stdin(Stdio::null());
            #[cfg(unix)]
            {
                use std::os::unix::process::CommandExt;
                cmd.process_group(0);
            }
        }

        tracing::debug!(
            "Spawning {} in {}: {}",
            descriptor.name,
            descriptor.working_dir.display(),
            describe_command(&descriptor.program, &descriptor.args)
        );

        let mut child = cmd.spawn().map_err(|e| RxbootError::SpawnFailed {
            service: descriptor.name.clone(),
            message: e.to_string(),
        })?;

        let tail = match descriptor.output {
            OutputPolicy::Capture => {
                let tail = OutputTail::default();
                if let Some(stdout) = child.stdout.take() {
                    tail.drain(stdout);
                }
                if let Some(stderr) = child.stderr.take() {
                    tail.drain(stderr);
                }
                Some(tail)
            }
            OutputPolicy::Inherit => None,
        };

        tracing::debug!("{} started with pid {}", descriptor.name, child.id());

        let group = cfg!(unix) && descriptor.detached;
        Ok(Box::new(ChildProcess::new(
            descriptor.name.clone(),
            child,
            group,
            tail,
        )))
    }
}

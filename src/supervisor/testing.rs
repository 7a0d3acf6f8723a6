//! In-memory stand-ins for processes, launchers and the interpreter.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{RxbootError, Result};
use crate::requirements::{PythonRuntime, RuntimeVersion};
use crate::services::{
    Launcher, ProcessExit, Readiness, ReadinessGate, ServiceDescriptor, ServiceProcess,
};
use crate::shell::OutputCallback;
use crate::supervisor::signal::Interrupt;

#[derive(Debug, Default)]
struct FakeState {
    exit: Option<ProcessExit>,
    terminate_calls: usize,
    kill_calls: usize,
    /// Exit with this status after this many `try_wait` polls.
    exit_after: Option<(usize, ProcessExit)>,
    ignores_terminate: bool,
    output: Vec<String>,
}

/// Scripted process. Clones share state, so a test can keep one while the
/// supervisor owns the other.
#[derive(Debug, Clone)]
pub struct FakeProcess {
    name: String,
    state: Arc<Mutex<FakeState>>,
}

impl FakeProcess {
    pub fn running(name: &str) -> Self {
        Self {
            name: name.to_string(),
            state: Arc::default(),
        }
    }

    pub fn exited(name: &str, exit: ProcessExit) -> Self {
        let process = Self::running(name);
        process.state.lock().unwrap().exit = Some(exit);
        process
    }

    pub fn exiting_after(name: &str, polls: usize, exit: ProcessExit) -> Self {
        let process = Self::running(name);
        process.state.lock().unwrap().exit_after = Some((polls, exit));
        process
    }

    pub fn ignoring_terminate(self) -> Self {
        self.state.lock().unwrap().ignores_terminate = true;
        self
    }

    pub fn with_output(self, lines: &[&str]) -> Self {
        self.state.lock().unwrap().output = lines.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn terminate_calls(&self) -> usize {
        self.state.lock().unwrap().terminate_calls
    }

    pub fn kill_calls(&self) -> usize {
        self.state.lock().unwrap().kill_calls
    }

    pub fn has_exited(&self) -> bool {
        self.state.lock().unwrap().exit.is_some()
    }
}

impl ServiceProcess for FakeProcess {
    fn id(&self) -> u32 {
        4242
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn try_wait(&mut self) -> Result<Option<ProcessExit>> {
        let mut state = self.state.lock().unwrap();
        if state.exit.is_none() {
            if let Some((polls, exit)) = state.exit_after {
                if polls == 0 {
                    state.exit = Some(exit);
                } else {
                    state.exit_after = Some((polls - 1, exit));
                }
            }
        }
        Ok(state.exit)
    }

    fn wait(&mut self) -> Result<ProcessExit> {
        loop {
            if let Some(exit) = self.try_wait()? {
                return Ok(exit);
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    fn terminate(&mut self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.terminate_calls += 1;
        if state.exit.is_none() && !state.ignores_terminate {
            state.exit = Some(ProcessExit::signaled(15));
        }
        Ok(())
    }

    fn kill(&mut self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.kill_calls += 1;
        if state.exit.is_none() {
            state.exit = Some(ProcessExit::signaled(9));
        }
        Ok(())
    }

    fn captured_output(&self) -> Vec<String> {
        self.state.lock().unwrap().output.clone()
    }
}

/// What [`FakeLauncher`] does for a given service name.
#[derive(Debug, Clone)]
pub enum LaunchScript {
    Start(FakeProcess),
    MissingDirectory,
}

/// Launcher that hands out scripted processes and records every call.
#[derive(Debug, Default, Clone)]
pub struct FakeLauncher {
    scripts: HashMap<String, LaunchScript>,
    launched: Rc<RefCell<Vec<ServiceDescriptor>>>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(mut self, name: &str, script: LaunchScript) -> Self {
        self.scripts.insert(name.to_string(), script);
        self
    }

    /// Names of every service a launch was attempted for, in order.
    pub fn launched(&self) -> Vec<String> {
        self.launched
            .borrow()
            .iter()
            .map(|d| d.name.clone())
            .collect()
    }

    pub fn descriptors(&self) -> Vec<ServiceDescriptor> {
        self.launched.borrow().clone()
    }
}

impl Launcher for FakeLauncher {
    fn launch(&mut self, descriptor: &ServiceDescriptor) -> Result<Box<dyn ServiceProcess>> {
        self.launched.borrow_mut().push(descriptor.clone());
        match self.scripts.get(&descriptor.name) {
            Some(LaunchScript::Start(process)) => Ok(Box::new(process.clone())),
            Some(LaunchScript::MissingDirectory) => Err(RxbootError::DirectoryNotFound {
                service: descriptor.name.clone(),
                path: descriptor.working_dir.clone(),
            }),
            None => Ok(Box::new(FakeProcess::running(&descriptor.name))),
        }
    }
}

/// Interpreter with a fixed version and import set.
#[derive(Debug)]
pub struct FakeRuntime {
    pub version: RuntimeVersion,
    pub importable: BTreeSet<String>,
    pub install_calls: RefCell<Vec<Vec<String>>>,
    pub version_calls: RefCell<usize>,
    pub import_calls: RefCell<usize>,
    fail_install: bool,
    /// Importing this module interrupts the run, as a Ctrl+C during the import would.
    interrupt_on_import: Option<(String, Interrupt)>,
    /// Installing interrupts the run and the installer exits on the signal.
    interrupt_on_install: Option<Interrupt>,
}

impl FakeRuntime {
    pub fn new(version: RuntimeVersion, importable: &[&str]) -> Self {
        Self {
            version,
            importable: importable.iter().map(|s| s.to_string()).collect(),
            install_calls: RefCell::new(Vec::new()),
            version_calls: RefCell::new(0),
            import_calls: RefCell::new(0),
            fail_install: false,
            interrupt_on_import: None,
            interrupt_on_install: None,
        }
    }

    pub fn failing_install(mut self) -> Self {
        self.fail_install = true;
        self
    }

    pub fn interrupting_import(mut self, module: &str, interrupt: &Interrupt) -> Self {
        self.interrupt_on_import = Some((module.to_string(), interrupt.clone()));
        self
    }

    pub fn interrupting_install(mut self, interrupt: &Interrupt) -> Self {
        self.interrupt_on_install = Some(interrupt.clone());
        self
    }
}

impl PythonRuntime for FakeRuntime {
    fn executable(&self) -> &Path {
        Path::new("/usr/bin/python3")
    }

    fn version(&self) -> Result<RuntimeVersion> {
        *self.version_calls.borrow_mut() += 1;
        Ok(self.version)
    }

    fn can_import(&self, module: &str) -> bool {
        *self.import_calls.borrow_mut() += 1;
        if let Some((target, interrupt)) = &self.interrupt_on_import {
            if target == module {
                interrupt.trigger();
                return false;
            }
        }
        self.importable.contains(module)
    }

    fn install(&self, packages: &[String], _on_output: OutputCallback) -> Result<()> {
        self.install_calls.borrow_mut().push(packages.to_vec());
        if let Some(interrupt) = &self.interrupt_on_install {
            interrupt.trigger();
            return Err(RxbootError::InstallFailed {
                packages: packages.join(", "),
                code: None,
            });
        }
        if self.fail_install {
            return Err(RxbootError::InstallFailed {
                packages: packages.join(", "),
                code: Some(1),
            });
        }
        Ok(())
    }
}

/// Readiness gate that reports an interrupt when waiting on `service`.
#[derive(Debug)]
pub struct InterruptDuring {
    pub service: String,
}

impl ReadinessGate for InterruptDuring {
    fn wait_ready(
        &self,
        process: &mut dyn ServiceProcess,
        _delay: Duration,
        interrupt: &Interrupt,
    ) -> Result<Readiness> {
        if process.name() == self.service {
            interrupt.trigger();
            return Ok(Readiness::Interrupted);
        }
        Ok(Readiness::Ready)
    }
}

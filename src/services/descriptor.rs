//! Launch descriptions for the managed services.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Serialize, Serializer};

/// Where a service's stdout/stderr go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputPolicy {
    /// Piped into a bounded tail kept for diagnostics.
    Capture,
    /// Attached to the controlling terminal.
    Inherit,
}

/// Everything needed to start one service. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDescriptor {
    /// Human-readable name used in messages ("Backend API").
    pub name: String,

    /// Directory the process is started in.
    pub working_dir: PathBuf,

    /// Directory holding the service's code when it is not `working_dir`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_dir: Option<PathBuf>,

    pub program: PathBuf,

    pub args: Vec<String>,

    /// Extra environment for the child only.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,

    /// Port the service listens on, for reporting only.
    pub port: u16,

    #[serde(serialize_with = "serialize_secs")]
    pub ready_delay: Duration,

    pub output: OutputPolicy,

    /// Start in a separate process group so terminal signals reach only
    /// the supervisor, which then forwards termination itself.
    pub detached: bool,
}

impl ServiceDescriptor {
    pub fn new(
        name: impl Into<String>,
        working_dir: impl Into<PathBuf>,
        program: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            working_dir: working_dir.into(),
            app_dir: None,
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            port: 0,
            ready_delay: Duration::ZERO,
            output: OutputPolicy::Inherit,
            detached: false,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn app_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.app_dir = Some(dir.into());
        self
    }

    /// Directories that must exist before the service can start.
    pub fn required_dirs(&self) -> impl Iterator<Item = &PathBuf> {
        std::iter::once(&self.working_dir).chain(self.app_dir.iter())
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn ready_delay(mut self, delay: Duration) -> Self {
        self.ready_delay = delay;
        self
    }

    pub fn output(mut self, output: OutputPolicy) -> Self {
        self.output = output;
        self
    }

    pub fn detached(mut self, detached: bool) -> Self {
        self.detached = detached;
        self
    }

    /// Local URL the service is reachable at.
    pub fn url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }
}

fn serialize_secs<S: Serializer>(delay: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(delay.as_secs_f64())
}

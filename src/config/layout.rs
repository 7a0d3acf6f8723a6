//! Where the stack lives on disk and how each service is started.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::config::env_file::EnvironmentFile;
use crate::requirements::{DependencySpec, RuntimeVersion, MINIMUM_PYTHON};
use crate::services::{OutputPolicy, ServiceDescriptor};

pub const BACKEND_DIR: &str = "backend";
pub const API_ENTRY: &str = "main.py";
pub const API_PORT: u16 = 8000;
pub const API_DOCS_PATH: &str = "/api/docs";
pub const API_READY_DELAY: Duration = Duration::from_secs(3);

pub const UI_DIR: &str = "frontend/streamlit_app";
pub const UI_ENTRY: &str = "main.py";
pub const UI_PORT: u16 = 8501;
pub const UI_READY_DELAY: Duration = Duration::from_secs(5);

pub const ENV_FILE: &str = ".env";
pub const ENV_TEMPLATE: &str = ".env.template";

/// Libraries the services import at startup.
pub const REQUIRED_PACKAGES: &[&str] = &["fastapi", "streamlit", "uvicorn"];

/// The flag that switches the API into debug/auto-reload behavior.
pub const DEBUG_ENV_VAR: &str = "DEBUG";

/// Project paths and per-service launch parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackLayout {
    pub root: PathBuf,
    pub api_port: u16,
    pub ui_port: u16,
    pub api_ready_delay: Duration,
    pub ui_ready_delay: Duration,
    pub env_file: EnvironmentFile,
    pub dependencies: DependencySpec,
    pub minimum_python: RuntimeVersion,
}

impl StackLayout {
    /// Default layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            env_file: EnvironmentFile::in_dir(&root, ENV_FILE, ENV_TEMPLATE),
            root,
            api_port: API_PORT,
            ui_port: UI_PORT,
            api_ready_delay: API_READY_DELAY,
            ui_ready_delay: UI_READY_DELAY,
            dependencies: DependencySpec::new(REQUIRED_PACKAGES.iter().copied()),
            minimum_python: MINIMUM_PYTHON,
        }
    }

    /// Same layout with both readiness waits replaced.
    pub fn with_ready_delays(mut self, api: Duration, ui: Duration) -> Self {
        self.api_ready_delay = api;
        self.ui_ready_delay = ui;
        self
    }

    pub fn backend_dir(&self) -> PathBuf {
        self.root.join(BACKEND_DIR)
    }

    pub fn ui_dir(&self) -> PathBuf {
        self.root.join(UI_DIR)
    }

    /// The API as started by the dual-service bootstrap.
    pub fn api(&self, python: &Path) -> ServiceDescriptor {
        ServiceDescriptor::new("Backend API", self.backend_dir(), python)
            .args([API_ENTRY])
            .port(self.api_port)
            .ready_delay(self.api_ready_delay)
            .output(OutputPolicy::Capture)
            .detached(true)
    }

    /// The UI. Runs from the project root so relative paths in the app
    /// resolve against it.
    pub fn ui(&self, python: &Path) -> ServiceDescriptor {
        let entry = Path::new(UI_DIR).join(UI_ENTRY);
        ServiceDescriptor::new("Frontend UI", &self.root, python)
            .app_dir(self.ui_dir())
            .args([
                "-m".to_string(),
                "streamlit".to_string(),
                "run".to_string(),
                entry.display().to_string(),
                "--server.port".to_string(),
                self.ui_port.to_string(),
            ])
            .port(self.ui_port)
            .ready_delay(self.ui_ready_delay)
            .output(OutputPolicy::Inherit)
    }

    /// The API under the ASGI dev server with auto-reload, for API-only runs.
    pub fn api_dev_server(&self, python: &Path) -> ServiceDescriptor {
        let app = format!("{}:app", API_ENTRY.trim_end_matches(".py"));
        ServiceDescriptor::new("Backend API", self.backend_dir(), python)
            .args([
                "-m".to_string(),
                "uvicorn".to_string(),
                app,
                "--host".to_string(),
                "127.0.0.1".to_string(),
                "--port".to_string(),
                self.api_port.to_string(),
                "--reload".to_string(),
                "--log-level".to_string(),
                "info".to_string(),
            ])
            .env(DEBUG_ENV_VAR, "True")
            .port(self.api_port)
            .output(OutputPolicy::Inherit)
    }

    pub fn api_url(&self) -> String {
        format!("http://localhost:{}", self.api_port)
    }

    pub fn docs_url(&self) -> String {
        format!("{}{}", self.api_url(), API_DOCS_PATH)
    }

    pub fn ui_url(&self) -> String {
        format!("http://localhost:{}", self.ui_port)
    }

    /// Everything a run would do, for display.
    pub fn plan(&self, python: &Path) -> LaunchPlan {
        LaunchPlan {
            root: self.root.clone(),
            python: python.to_path_buf(),
            minimum_python: self.minimum_python.short(),
            dependencies: self.dependencies.clone(),
            env_file: self.env_file.clone(),
            services: vec![self.api(python), self.ui(python)],
            api_docs: self.docs_url(),
        }
    }
}

/// Serializable view of a dual-service run.
#[derive(Debug, Clone, Serialize)]
pub struct LaunchPlan {
    pub root: PathBuf,
    pub python: PathBuf,
    pub minimum_python: String,
    pub dependencies: DependencySpec,
    pub env_file: EnvironmentFile,
    pub services: Vec<ServiceDescriptor>,
    pub api_docs: String,
}

//! Contextual hints for startup failures.
//!
//! Each hint suggests the next thing the operator can try.

use crate::error::RxbootError;

/// Hint shown when the API-only dev server cannot start.
pub fn backend_install() -> &'static str {
    "Make sure the server libraries are installed: `pip install fastapi uvicorn`."
}

/// Hint for a failed dual-service start, if there is a useful one.
pub fn for_startup_error(err: &RxbootError) -> Option<String> {
    match err {
        RxbootError::RuntimeNotFound { .. } => {
            Some("Install Python 3.8+ or point rxboot at one with `--python <PATH>`.".to_string())
        }
        RxbootError::RuntimeTooOld { required, .. } => Some(format!(
            "Install Python {} or newer, or pass `--python <PATH>`.",
            required
        )),
        RxbootError::InstallFailed { packages, .. } => Some(format!(
            "Run `python -m pip install {}` yourself to see the full error.",
            packages.replace(", ", " ")
        )),
        RxbootError::DirectoryNotFound { .. } => {
            Some("Run rxboot from the project root or pass `--project <DIR>`.".to_string())
        }
        RxbootError::ProvisionFailed { path, .. } => Some(format!(
            "Create {} by hand from the template and re-run.",
            path.display()
        )),
        _ => None,
    }
}

/// Whether `err` happened while launching a service rather than while
/// checking prerequisites.
pub fn is_launch_failure(err: &RxbootError) -> bool {
    matches!(
        err,
        RxbootError::DirectoryNotFound { .. }
            | RxbootError::SpawnFailed { .. }
            | RxbootError::ExitedBeforeReady { .. }
    )
}

//! Runtime version gate.
//!
//! Parses the interpreter's version banner and refuses to continue when it
//! is older than [`MINIMUM_PYTHON`].

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{RxbootError, Result};

/// Oldest interpreter the services support.
pub const MINIMUM_PYTHON: RuntimeVersion = RuntimeVersion::new(3, 8, 0);

static VERSION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").unwrap());

/// Semantic version of the host runtime.
///
/// Ordering is lexicographic over (major, minor, patch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuntimeVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl RuntimeVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Extract the first `major.minor[.patch]` found in `text`.
    ///
    /// Accepts banners such as `Python 3.11.4` or `Python 3.13.0rc1`.
    pub fn parse(text: &str) -> Option<Self> {
        let caps = VERSION_REGEX.captures(text)?;
        let major = caps.get(1)?.as_str().parse().ok()?;
        let minor = caps.get(2)?.as_str().parse().ok()?;
        let patch = caps
            .get(3)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);

        Some(Self::new(major, minor, patch))
    }

    /// `major.minor`, the form requirements are stated in.
    pub fn short(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }
}

impl fmt::Display for RuntimeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Fail with [`RxbootError::RuntimeTooOld`] when `detected < required`.
pub fn ensure_minimum(detected: RuntimeVersion, required: RuntimeVersion) -> Result<()> {
    if detected < required {
        return Err(RxbootError::RuntimeTooOld {
            detected: detected.to_string(),
            required: required.short(),
        });
    }
    Ok(())
}

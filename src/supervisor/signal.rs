//! Operator interrupts.
//!
//! SIGINT and SIGTERM only set a flag. Every blocking wait in the
//! supervisor polls that flag, so an interrupt is observed within one poll
//! interval wherever the supervisor happens to be.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::Result;

/// Shared "operator asked us to stop" flag.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    /// A flag no signal handler is attached to.
    pub fn new() -> Self {
        Self::default()
    }

    /// A flag set by SIGINT and SIGTERM.
    ///
    /// On platforms without Unix signals the flag is returned unattached.
    pub fn install() -> Result<Self> {
        let interrupt = Self::new();
        register_handlers(&interrupt.flag)?;
        Ok(interrupt)
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

#[cfg(unix)]
fn register_handlers(flag: &Arc<AtomicBool>) -> Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};

    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(flag))?;
    }
    tracing::debug!("Installed SIGINT/SIGTERM handlers");
    Ok(())
}

#[cfg(not(unix))]
fn register_handlers(_flag: &Arc<AtomicBool>) -> Result<()> {
    tracing::debug!("Signal handlers are not supported on this platform");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_flag_is_clear() {
        assert!(!Interrupt::new().is_set());
    }

    #[test]
    fn trigger_is_visible_through_clones() {
        let interrupt = Interrupt::new();
        let observer = interrupt.clone();

        interrupt.trigger();

        assert!(observer.is_set());
    }

    #[cfg(unix)]
    #[test]
    fn sigterm_sets_installed_flag() {
        let interrupt = Interrupt::install().unwrap();
        let unattached = Interrupt::new();

        signal_hook::low_level::raise(signal_hook::consts::SIGTERM).unwrap();

        assert!(interrupt.is_set());
        assert!(!unattached.is_set());
    }
}

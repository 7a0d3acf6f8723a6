//! Progress spinners.

use indicatif::{ProgressBar, ProgressStyle};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::shell::OutputLine;

use super::theme::RxTheme;
use super::SpinnerHandle;

/// A progress spinner for long-running operations.
pub struct ProgressSpinner {
    bar: ProgressBar,
}

impl ProgressSpinner {
    /// Create a new spinner with a message.
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
        {
            bar.set_style(style);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));

        Self { bar }
    }

    /// Create a spinner that doesn't show (for silent mode).
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    fn finish_with(&mut self, formatted: String) {
        if let Ok(style) = ProgressStyle::default_spinner().template("{msg}") {
            self.bar.set_style(style);
        }
        self.bar.finish_with_message(formatted);
    }
}

impl SpinnerHandle for ProgressSpinner {
    fn set_message(&mut self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }

    fn finish_success(&mut self, msg: &str) {
        let formatted = RxTheme::new().format_success(msg);
        self.finish_with(formatted);
    }

    fn finish_error(&mut self, msg: &str) {
        let formatted = RxTheme::new().format_error(msg);
        self.finish_with(formatted);
    }

    fn progress_bar(&self) -> Option<ProgressBar> {
        Some(self.bar.clone())
    }
}

/// Create an output callback that updates a spinner with live output lines.
///
/// The callback keeps the last `max_lines` non-empty lines and renders them
/// beneath `base_message`, indented by `indent` spaces.
pub fn live_output_callback(
    bar: ProgressBar,
    base_message: String,
    indent: usize,
    max_lines: usize,
) -> crate::shell::OutputCallback {
    let buffer: Arc<Mutex<VecDeque<String>>> = Arc::new(Mutex::new(VecDeque::new()));
    let theme = RxTheme::new();

    Box::new(move |line: OutputLine| {
        let text = match &line {
            OutputLine::Stdout(s) => s.trim_end().to_string(),
            OutputLine::Stderr(s) => s.trim_end().to_string(),
        };

        if text.is_empty() {
            return;
        }

        let display_text = if text.chars().count() > 72 {
            let head: String = text.chars().take(69).collect();
            format!("{}...", head)
        } else {
            text
        };

        let Ok(mut buf) = buffer.lock() else {
            return;
        };
        buf.push_back(display_text);
        while buf.len() > max_lines {
            buf.pop_front();
        }

        let prefix = " ".repeat(indent);
        let mut msg = base_message.clone();
        for line in buf.iter() {
            msg.push('\n');
            msg.push_str(&prefix);
            msg.push_str(&theme.dim.apply_to(format!("» {}", line)).to_string());
        }

        bar.set_message(msg);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_spinner_finishes() {
        let mut spinner = ProgressSpinner::hidden();
        spinner.finish_success("Done");
    }

    #[test]
    fn spinner_finish_error() {
        let mut spinner = ProgressSpinner::hidden();
        spinner.set_message("Installing");
        spinner.finish_error("Failed");
    }

    #[test]
    fn hidden_spinner_progress_bar_returns_some() {
        let spinner = ProgressSpinner::hidden();
        assert!(spinner.progress_bar().is_some());
    }

    #[test]
    fn live_output_callback_keeps_last_lines() {
        let bar = ProgressBar::hidden();
        let callback = live_output_callback(bar.clone(), "Installing...".to_string(), 4, 2);

        callback(OutputLine::Stdout("Collecting fastapi".to_string()));
        let msg = bar.message();
        assert!(msg.contains("Installing..."));
        assert!(msg.contains("Collecting fastapi"));

        callback(OutputLine::Stderr("Collecting uvicorn".to_string()));
        callback(OutputLine::Stdout("Successfully installed".to_string()));
        let msg = bar.message();
        assert!(!msg.contains("Collecting fastapi"));
        assert!(msg.contains("Collecting uvicorn"));
        assert!(msg.contains("Successfully installed"));

        bar.finish();
    }

    #[test]
    fn live_output_callback_skips_empty_lines() {
        let bar = ProgressBar::hidden();
        let callback = live_output_callback(bar.clone(), "Installing...".to_string(), 4, 2);

        callback(OutputLine::Stdout("".to_string()));
        callback(OutputLine::Stdout("real output".to_string()));

        let msg = bar.message();
        assert!(msg.contains("real output"));
        assert_eq!(msg.matches('\n').count(), 1);

        bar.finish();
    }

    #[test]
    fn live_output_callback_truncates_long_lines() {
        let bar = ProgressBar::hidden();
        let callback = live_output_callback(bar.clone(), "Installing...".to_string(), 4, 2);

        callback(OutputLine::Stdout("x".repeat(100)));
        let msg = bar.message();
        assert!(msg.contains("..."));
        assert!(!msg.contains(&"x".repeat(100)));

        bar.finish();
    }
}

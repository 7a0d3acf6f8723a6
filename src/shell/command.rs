//! Blocking command execution.
//!
//! Used for the short-lived helper invocations made during startup
//! (interpreter version query, import checks, package installation).
//! Long-running services are spawned through [`crate::services::launcher`].

use crate::error::{RxbootError, Result};
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of executing a command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
        }
    }
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Capture stdout (if false, inherits from parent).
    pub capture_stdout: bool,

    /// Capture stderr (if false, inherits from parent).
    pub capture_stderr: bool,
}

/// Output line from command execution.
#[derive(Debug, Clone)]
pub enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Callback for streaming output.
pub type OutputCallback = Box<dyn Fn(OutputLine) + Send>;

/// Render a program and its arguments the way an operator would type them.
pub fn describe_command<S: AsRef<str>>(program: &Path, args: &[S]) -> String {
    let mut rendered = program.display().to_string();
    for arg in args {
        rendered.push(' ');
        rendered.push_str(arg.as_ref());
    }
    rendered
}

fn build_command<S: AsRef<str>>(program: &Path, args: &[S]) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args.iter().map(|a| a.as_ref()));
    cmd
}

/// Execute a program and wait for it to finish.
pub fn execute<S: AsRef<str>>(
    program: &Path,
    args: &[S],
    options: &CommandOptions,
) -> Result<CommandResult> {
    let start = Instant::now();
    let mut cmd = build_command(program, args);

    if options.capture_stdout {
        cmd.stdout(Stdio::piped());
    } else {
        cmd.stdout(Stdio::inherit());
    }

    if options.capture_stderr {
        cmd.stderr(Stdio::piped());
    } else {
        cmd.stderr(Stdio::inherit());
    }

    tracing::debug!("Executing: {}", describe_command(program, args));

    let output = cmd.output().map_err(|e| RxbootError::SpawnFailed {
        service: describe_command(program, args),
        message: e.to_string(),
    })?;

    let duration = start.elapsed();

    let stdout = if options.capture_stdout {
        String::from_utf8_lossy(&output.stdout).to_string()
    } else {
        String::new()
    };

    let stderr = if options.capture_stderr {
        String::from_utf8_lossy(&output.stderr).to_string()
    } else {
        String::new()
    };

    if output.status.success() {
        Ok(CommandResult::success(stdout, stderr, duration))
    } else {
        Ok(CommandResult::failure(
            output.status.code(),
            stdout,
            stderr,
            duration,
        ))
    }
}

/// Execute a program quietly and return whether it exited 0.
///
/// Spawn failures count as `false`.
pub fn execute_check<S: AsRef<str>>(program: &Path, args: &[S]) -> bool {
    let options = CommandOptions {
        capture_stdout: true,
        capture_stderr: true,
    };

    execute(program, args, &options)
        .map(|r| r.success)
        .unwrap_or(false)
}

/// Execute a program, handing each output line to `callback` as it arrives.
pub fn execute_streaming<S: AsRef<str>>(
    program: &Path,
    args: &[S],
    callback: OutputCallback,
) -> Result<CommandResult> {
    let start = Instant::now();
    let mut cmd = build_command(program, args);

    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    tracing::debug!("Executing (streaming): {}", describe_command(program, args));

    let spawn_error = |message: String| RxbootError::SpawnFailed {
        service: describe_command(program, args),
        message,
    };

    let mut child = cmd.spawn().map_err(|e| spawn_error(e.to_string()))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| spawn_error("stdout was not captured".to_string()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| spawn_error("stderr was not captured".to_string()))?;

    let (tx, rx) = mpsc::channel();
    let tx_stdout = tx.clone();
    let tx_stderr = tx;

    let stdout_handle = thread::spawn(move || {
        let reader = BufReader::new(stdout);
        let mut output = String::new();
        for line in reader.lines().map_while(std::result::Result::ok) {
            output.push_str(&line);
            output.push('\n');
            let _ = tx_stdout.send(OutputLine::Stdout(line));
        }
        output
    });

    let stderr_handle = thread::spawn(move || {
        let reader = BufReader::new(stderr);
        let mut output = String::new();
        for line in reader.lines().map_while(std::result::Result::ok) {
            output.push_str(&line);
            output.push('\n');
            let _ = tx_stderr.send(OutputLine::Stderr(line));
        }
        output
    });

    for line in rx {
        callback(line);
    }

    let stdout_output = stdout_handle.join().unwrap_or_default();
    let stderr_output = stderr_handle.join().unwrap_or_default();

    let status = child.wait().map_err(|e| spawn_error(e.to_string()))?;

    let duration = start.elapsed();

    if status.success() {
        Ok(CommandResult::success(
            stdout_output,
            stderr_output,
            duration,
        ))
    } else {
        Ok(CommandResult::failure(
            status.code(),
            stdout_output,
            stderr_output,
            duration,
        ))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sh() -> PathBuf {
        PathBuf::from("/bin/sh")
    }

    fn captured() -> CommandOptions {
        CommandOptions {
            capture_stdout: true,
            capture_stderr: true,
        }
    }

    #[test]
    fn execute_successful_command() {
        let result = execute(&sh(), &["-c", "echo hello"], &captured()).unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert!(result.stdout.contains("hello"));
    }

    #[test]
    fn execute_failing_command() {
        let result = execute(&sh(), &["-c", "exit 3"], &captured()).unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
    }

    #[test]
    fn execute_passes_arguments_without_shell_splitting() {
        let result = execute(
            &sh(),
            &["-c", "printf '%s' \"$1\"", "sh", "two words"],
            &captured(),
        )
        .unwrap();

        assert_eq!(result.stdout, "two words");
    }

    #[test]
    fn execute_without_capture_returns_empty_output() {
        let result = execute(&sh(), &["-c", "exit 0"], &CommandOptions::default()).unwrap();

        assert!(result.success);
        assert!(result.stdout.is_empty());
        assert!(result.stderr.is_empty());
    }

    #[test]
    fn execute_missing_program_is_spawn_failure() {
        let err = execute(
            Path::new("/definitely/not/a/program"),
            &["--version"],
            &captured(),
        )
        .unwrap_err();

        assert!(matches!(err, RxbootError::SpawnFailed { .. }));
    }

    #[test]
    fn execute_check_returns_bool() {
        assert!(execute_check(&sh(), &["-c", "exit 0"]));
        assert!(!execute_check(&sh(), &["-c", "exit 1"]));
        assert!(!execute_check(Path::new("/definitely/not/a/program"), &["x"]));
    }

    #[test]
    fn execute_streaming_captures_both_streams() {
        use std::sync::{Arc, Mutex};

        let lines = Arc::new(Mutex::new(Vec::new()));
        let lines_clone = Arc::clone(&lines);

        let callback: OutputCallback = Box::new(move |line| {
            lines_clone.lock().unwrap().push(line);
        });

        let result = execute_streaming(
            &sh(),
            &["-c", "echo out && echo err >&2"],
            callback,
        )
        .unwrap();

        assert!(result.success);
        assert!(result.stdout.contains("out"));
        assert!(result.stderr.contains("err"));

        let captured = lines.lock().unwrap();
        assert!(captured.iter().any(|l| matches!(l, OutputLine::Stdout(_))));
        assert!(captured.iter().any(|l| matches!(l, OutputLine::Stderr(_))));
    }

    #[test]
    fn describe_command_joins_program_and_args() {
        let rendered = describe_command(Path::new("/usr/bin/python3"), &["-m", "pip", "install"]);
        assert_eq!(rendered, "/usr/bin/python3 -m pip install");
    }
}

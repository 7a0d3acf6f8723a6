//! Bounded capture of a service's output.

use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// Lines kept per service.
pub const DEFAULT_TAIL_LINES: usize = 200;

/// The last N lines a process wrote, shared with the reader threads that
/// drain its pipes.
#[derive(Debug, Clone)]
pub struct OutputTail {
    lines: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl OutputTail {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn push(&self, line: String) {
        let Ok(mut lines) = self.lines.lock() else {
            return;
        };
        lines.push_back(line);
        while lines.len() > self.capacity {
            lines.pop_front();
        }
    }

    /// Copy of the retained lines, oldest first.
    pub fn snapshot(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Read `source` to EOF on a background thread, keeping each line.
    ///
    /// Bytes that are not UTF-8 are replaced rather than ending the read;
    /// the child must never see its pipe close while it is alive.
    pub fn drain<R: Read + Send + 'static>(&self, source: R) -> JoinHandle<()> {
        let tail = self.clone();
        thread::spawn(move || {
            let mut reader = BufReader::new(source);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) => break,
                    Ok(_) => {
                        let line = String::from_utf8_lossy(&buf);
                        tail.push(line.trim_end_matches(['\n', '\r']).to_string());
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        tracing::debug!("Stopped reading service output: {}", e);
                        break;
                    }
                }
            }
        })
    }
}

impl Default for OutputTail {
    fn default() -> Self {
        Self::new(DEFAULT_TAIL_LINES)
    }
}

//! Run transcript
//!
//! Human-readable record of a run, mirrored to the console and to a log file.
//! Every record carries a timestamp and a label, followed by the text
//! indented by two spaces.
//!
//! # Example
//!
//! ```ignore
//! let transcript = Transcript::open("agent_run.log")?;
//! transcript.start_round(1);
//! transcript.record("思考", "need to read the config first");
//! ```

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};

/// Placeholder written for empty record bodies
const EMPTY_BODY: &str = "(空)";

/// Serialized console + file writer for run records
pub struct Transcript {
    /// Output sinks, written in order under one lock
    sinks: Mutex<Vec<Box<dyn Write + Send>>>,
    /// Log file path, when writing to a file
    path: Option<PathBuf>,
}

impl Transcript {
    /// Write to stdout and append to `path`, creating parent directories
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;

        tracing::info!("[Transcript] Writing run log to {}", path.display());

        Ok(Self {
            sinks: Mutex::new(vec![Box::new(io::stdout()), Box::new(file)]),
            path: Some(path.to_path_buf()),
        })
    }

    /// Write to a single arbitrary sink
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            sinks: Mutex::new(vec![Box::new(writer)]),
            path: None,
        }
    }

    /// Create a transcript that drops everything
    pub fn disabled() -> Self {
        Self {
            sinks: Mutex::new(Vec::new()),
            path: None,
        }
    }

    /// Log file path, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write a round heading
    pub fn start_round(&self, round: usize) {
        self.write_all(&format!("\n==== Round {} ====\n", round));
    }

    /// Write a labeled, timestamped block
    pub fn record(&self, label: &str, content: &str) {
        tracing::debug!("[Transcript] {}: {}", label, content);

        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let body = content.trim_end_matches(['\r', '\n']);
        let body = if body.is_empty() { EMPTY_BODY } else { body };

        let mut block = format!("[{}] [{}]\n", timestamp, label);
        for line in body.split('\n') {
            block.push_str("  ");
            block.push_str(line.trim_end_matches([' ', '\t']));
            block.push('\n');
        }
        block.push('\n');

        self.write_all(&block);
    }

    fn write_all(&self, text: &str) {
        let mut sinks = match self.sinks.lock() {
            Ok(sinks) => sinks,
            Err(poisoned) => poisoned.into_inner(),
        };
        for sink in sinks.iter_mut() {
            if let Err(e) = sink.write_all(text.as_bytes()).and_then(|_| sink.flush()) {
                tracing::warn!("[Transcript] Failed to write record: {}", e);
            }
        }
    }
}

/// Where the run log goes
///
/// An explicit path is used as given when absolute and joined to the project
/// directory when relative. Without one the log is
/// `<project>/agent_run_YYYYMMDD_HHMMSS.log`.
pub fn resolve_log_path(project_dir: &Path, log_file: Option<&Path>) -> PathBuf {
    match log_file.filter(|p| !p.as_os_str().is_empty()) {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => project_dir.join(path),
        None => project_dir.join(format!(
            "agent_run_{}.log",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        )),
    }
}

impl std::fmt::Debug for Transcript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transcript").field("path", &self.path).finish()
    }
}

/// In-memory sink whose contents can be read back, for tests and embedding
#[derive(Clone, Default)]
pub struct SharedBuffer(std::sync::Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded
    pub fn contents(&self) -> String {
        let bytes = match self.0.lock() {
            Ok(bytes) => bytes.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.0.lock() {
            Ok(mut bytes) => bytes.extend_from_slice(buf),
            Err(poisoned) => poisoned.into_inner().extend_from_slice(buf),
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

//! run_terminal_command tool
//!
//! Executes a shell command in the project directory. Every invocation goes
//! through the operator confirmation gate first.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;

use super::super::tool::{expect_args, Tool};

pub const RUN_TERMINAL_COMMAND: &str = "run_terminal_command";

/// Maximum runtime for a single command (10 minutes)
const MAX_RUNTIME: Duration = Duration::from_secs(600);
/// Maximum output length in characters
const MAX_OUTPUT_LENGTH: usize = 30000;

/// Shell tool for executing terminal commands
pub struct TerminalTool {
    /// Working directory for command execution
    working_dir: PathBuf,
}

impl TerminalTool {
    /// Create a new terminal tool running commands in `working_dir`
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    fn shell_command(command: &str) -> Command {
        if cfg!(windows) {
            let mut cmd = Command::new("powershell");
            cmd.arg("-Command").arg(command);
            cmd
        } else {
            let mut cmd = Command::new("bash");
            cmd.arg("-lc").arg(command);
            cmd
        }
    }

    async fn run_command(&self, command: &str) -> Result<String> {
        tracing::info!("[Terminal] Executing: {}", command);
        tracing::debug!("[Terminal] Working directory: {}", self.working_dir.display());

        let output_future = Self::shell_command(command)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match timeout(MAX_RUNTIME, output_future).await {
            Ok(result) => result?,
            Err(_) => anyhow::bail!("命令执行超时（{} 秒）", MAX_RUNTIME.as_secs()),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("{}: {}", output.status, truncate(stderr.trim()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let result = stdout.trim();
        tracing::debug!("[Terminal] Output length: {} chars", result.len());

        if result.is_empty() {
            Ok("命令执行成功（无输出）".to_string())
        } else {
            Ok(truncate(result))
        }
    }
}

fn truncate(text: &str) -> String {
    match text.char_indices().nth(MAX_OUTPUT_LENGTH) {
        Some((cut, _)) => format!("{}\n... (输出已截断)", &text[..cut]),
        None => text.to_string(),
    }
}

impl Default for TerminalTool {
    fn default() -> Self {
        Self::new(".")
    }
}

#[async_trait]
impl Tool for TerminalTool {
    fn name(&self) -> &str {
        RUN_TERMINAL_COMMAND
    }

    fn signature(&self) -> &str {
        "(command string)"
    }

    fn description(&self) -> &str {
        "执行本地终端命令"
    }

    async fn execute(&self, args: &[String]) -> Result<String> {
        expect_args(RUN_TERMINAL_COMMAND, args, 1)?;
        self.run_command(&args[0]).await
    }

    fn requires_confirmation(&self) -> bool {
        true
    }
}

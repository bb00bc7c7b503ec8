//! write_to_file tool
//!
//! Writes content to files on the local filesystem. Arguments arrive with
//! newlines still written as `\n`; this is where they become line breaks.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::super::tool::{expect_args, Tool};

pub const WRITE_TO_FILE: &str = "write_to_file";

/// Write tool for creating or overwriting files
pub struct WriteFileTool {
    /// Base directory for relative paths
    base_dir: PathBuf,
}

impl WriteFileTool {
    /// Create a new write tool resolving relative paths against `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

impl Default for WriteFileTool {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Turn the two-character escape `\n` into a newline
pub fn unescape_newlines(content: &str) -> String {
    content.replace("\\n", "\n")
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        WRITE_TO_FILE
    }

    fn signature(&self) -> &str {
        "(file_path string, content string)"
    }

    fn description(&self) -> &str {
        "将内容写入目标文件"
    }

    async fn execute(&self, args: &[String]) -> Result<String> {
        expect_args(WRITE_TO_FILE, args, 2)?;

        let path = self.resolve_path(&args[0]);
        let content = unescape_newlines(&args[1]);
        tracing::info!("[WriteFile] Writing {} ({} bytes)", path.display(), content.len());

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("创建目录失败: {}", parent.display()))?;
        }

        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("写入文件失败: {}", path.display()))?;

        Ok("写入成功".to_string())
    }
}

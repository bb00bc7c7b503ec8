//! read_file tool
//!
//! Reads a file from the local filesystem.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::super::tool::{expect_args, Tool};

pub const READ_FILE: &str = "read_file";

/// Read tool for file contents
pub struct ReadFileTool {
    /// Base directory for relative paths
    base_dir: PathBuf,
}

impl ReadFileTool {
    /// Create a new read tool resolving relative paths against `base_dir`
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

impl Default for ReadFileTool {
    fn default() -> Self {
        Self::new(".")
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        READ_FILE
    }

    fn signature(&self) -> &str {
        "(file_path string)"
    }

    fn description(&self) -> &str {
        "用于读取文件内容"
    }

    async fn execute(&self, args: &[String]) -> Result<String> {
        expect_args(READ_FILE, args, 1)?;

        let path = self.resolve_path(&args[0]);
        tracing::info!("[ReadFile] Reading {}", path.display());

        let data = tokio::fs::read(&path)
            .await
            .with_context(|| format!("读取文件失败: {}", path.display()))?;

        Ok(String::from_utf8_lossy(&data).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_read_relative_and_absolute() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "第一行\nsecond").unwrap();
        let tool = ReadFileTool::new(dir.path());

        let relative = tool.execute(&["notes.txt".to_string()]).await.unwrap();
        assert_eq!(relative, "第一行\nsecond");

        let absolute = dir.path().join("notes.txt").to_string_lossy().to_string();
        assert_eq!(tool.execute(&[absolute]).await.unwrap(), "第一行\nsecond");
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let tool = ReadFileTool::new(dir.path());
        let err = tool.execute(&["absent.txt".to_string()]).await.unwrap_err();
        assert!(err.to_string().starts_with("读取文件失败"));
    }

    #[tokio::test]
    async fn test_arity() {
        let tool = ReadFileTool::default();
        assert!(tool.execute(&[]).await.is_err());
    }
}

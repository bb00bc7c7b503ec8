//! System prompt rendering
//!
//! The template is rendered once per run with the tool list, the OS name
//! and the entries of the project directory.

mod template;

use std::path::{Path, PathBuf};

pub use template::REACT_SYSTEM_PROMPT;

use crate::tools::ToolRegistry;

const TOOL_LIST: &str = "tool_list";
const OPERATING_SYSTEM: &str = "operating_system";
const FILE_LIST: &str = "file_list";

/// Runtime values substituted into the template
#[derive(Debug, Clone, Default)]
pub struct PromptContext {
    pub tool_list: String,
    pub operating_system: String,
    pub file_list: String,
}

impl PromptContext {
    /// Snapshot the registry and project directory
    pub fn collect(tools: &ToolRegistry, project_dir: &Path) -> Self {
        Self {
            tool_list: tools.describe(),
            operating_system: operating_system_name().to_string(),
            file_list: project_files(project_dir).join(", "),
        }
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        match key {
            TOOL_LIST => Some(&self.tool_list),
            OPERATING_SYSTEM => Some(&self.operating_system),
            FILE_LIST => Some(&self.file_list),
            _ => None,
        }
    }
}

/// Substitute `${...}` placeholders in a single pass
///
/// Substituted text is never rescanned, and unknown placeholders are left
/// untouched.
pub fn render_system_prompt(template: &str, context: &PromptContext) -> String {
    let mut out = String::with_capacity(template.len() + context.tool_list.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => match context.lookup(&after[..end]) {
                Some(value) => {
                    out.push_str(value);
                    rest = &after[end + 1..];
                }
                None => {
                    out.push_str("${");
                    rest = after;
                }
            },
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Human-readable name of the host OS
pub fn operating_system_name() -> &'static str {
    match std::env::consts::OS {
        "macos" => "macOS",
        "windows" => "Windows",
        "linux" => "Linux",
        _ => "Unknown",
    }
}

/// Sorted absolute paths of the immediate entries of `dir`
///
/// An unreadable directory yields an empty list.
pub fn project_files(dir: &Path) -> Vec<String> {
    let base = absolute_dir(dir);
    let entries = match std::fs::read_dir(&base) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("[Prompt] Cannot list {}: {}", base.display(), e);
            return Vec::new();
        }
    };

    let mut paths: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| base.join(entry.file_name()).to_string_lossy().into_owned())
        .collect();
    paths.sort();
    paths
}

fn absolute_dir(dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        return dir.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(dir),
        Err(_) => dir.to_path_buf(),
    }
}

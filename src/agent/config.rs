//! Agent Configuration
//!
//! Configuration options for the ReActAgent.

use std::path::{Path, PathBuf};

use crate::prompt::REACT_SYSTEM_PROMPT;

/// Model used when none is given
pub const DEFAULT_MODEL: &str = "qwen3-max";

/// Configuration for a ReActAgent
///
/// Use the builder pattern to configure the agent:
///
/// ```ignore
/// let config = AgentConfig::new("qwen3-max")
///     .with_project_dir("/srv/project")
///     .with_template(MY_TEMPLATE);
/// ```
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Model name sent with every completion request
    pub model: String,

    /// Directory listed in the system prompt
    pub project_dir: PathBuf,

    /// System prompt template with `${tool_list}`, `${operating_system}`
    /// and `${file_list}` placeholders
    pub prompt_template: String,
}

impl AgentConfig {
    /// Create a configuration for a model
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            project_dir: PathBuf::from("."),
            prompt_template: REACT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Set the project directory
    pub fn with_project_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.project_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Replace the system prompt template
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = template.into();
        self
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

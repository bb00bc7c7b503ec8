//! Process configuration
//!
//! Settings come from `.env` files layered over the process environment.
//! Files are read without touching the process environment; later files win
//! over earlier ones, and any file wins over the environment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::core::{AgentError, AgentResult};
use crate::llm::DEFAULT_BASE_URL;

pub const API_KEY_VAR: &str = "DASHSCOPE_API_KEY";
pub const FALLBACK_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";
pub const DISQL_PATH_VAR: &str = "DM_DISQL_PATH";

/// Key/value pairs read from a `.env` file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    vars: HashMap<String, String>,
}

impl EnvFile {
    /// Parse `.env` content
    ///
    /// Blank lines and `#` comments are skipped, lines without `=` are
    /// ignored, surrounding quotes are stripped from values.
    pub fn parse(content: &str) -> Self {
        let vars = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once('='))
            .filter_map(|(key, value)| {
                let key = key.trim();
                if key.is_empty() {
                    return None;
                }
                let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
                Some((key.to_string(), value.to_string()))
            })
            .collect();
        Self { vars }
    }

    /// Load a `.env` file; a missing or unreadable file is empty
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                tracing::info!("[Config] Loaded {}", path.display());
                Self::parse(&content)
            }
            Err(e) => {
                tracing::debug!("[Config] Skipping {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

/// Resolved runtime settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_key: String,
    pub base_url: String,
    pub disql_path: PathBuf,
}

impl Settings {
    /// Load `<project>/.env`, then `./.env`, over the process environment
    pub fn load(project_dir: &Path) -> AgentResult<Self> {
        let layers = vec![
            EnvFile::load(&project_dir.join(".env")),
            EnvFile::load(Path::new(".env")),
        ];
        Self::resolve(&layers, |key| std::env::var(key).ok())
    }

    /// Resolve settings from env-file layers (last wins) and a fallback lookup
    pub fn resolve<F>(layers: &[EnvFile], env: F) -> AgentResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| -> Option<String> {
            layers
                .iter()
                .rev()
                .find_map(|layer| layer.get(key).map(str::to_string))
                .or_else(|| env(key))
                .filter(|value| !value.trim().is_empty())
        };

        let api_key = lookup(API_KEY_VAR)
            .or_else(|| lookup(FALLBACK_API_KEY_VAR))
            .ok_or_else(|| {
                AgentError::InvalidConfig(format!(
                    "缺少 API 密钥，请设置 {} 或 {}",
                    API_KEY_VAR, FALLBACK_API_KEY_VAR
                ))
            })?;

        Ok(Self {
            api_key,
            base_url: lookup(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            disql_path: lookup(DISQL_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("disql")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_env_file() {
        let env = EnvFile::parse(
            "# comment\n\nDASHSCOPE_API_KEY = \"sk-123\"\nOPENAI_BASE_URL='http://x/v1'\nNOT A PAIR\n=novalue\nEMPTY=\n",
        );
        assert_eq!(env.get("DASHSCOPE_API_KEY"), Some("sk-123"));
        assert_eq!(env.get("OPENAI_BASE_URL"), Some("http://x/v1"));
        assert_eq!(env.get("EMPTY"), Some(""));
        assert_eq!(env.get("NOT A PAIR"), None);
        assert_eq!(env.get(""), None);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        assert_eq!(EnvFile::load(&dir.path().join(".env")), EnvFile::default());
    }

    #[test]
    fn test_later_layers_win() {
        let project = EnvFile::parse("DASHSCOPE_API_KEY=project\nDM_DISQL_PATH=/opt/dm/bin/disql");
        let cwd = EnvFile::parse("DASHSCOPE_API_KEY=cwd");
        let settings = Settings::resolve(&[project, cwd], |key| match key {
            "DASHSCOPE_API_KEY" => Some("process".into()),
            "OPENAI_BASE_URL" => Some("http://proxy/v1".into()),
            _ => None,
        })
        .unwrap();

        assert_eq!(settings.api_key, "cwd");
        assert_eq!(settings.base_url, "http://proxy/v1");
        assert_eq!(settings.disql_path, PathBuf::from("/opt/dm/bin/disql"));
    }

    #[test]
    fn test_defaults_and_fallback_key() {
        let settings =
            Settings::resolve(&[], |key| (key == "OPENAI_API_KEY").then(|| "sk-openai".into()))
                .unwrap();
        assert_eq!(settings.api_key, "sk-openai");
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.disql_path, PathBuf::from("disql"));
    }

    #[test]
    fn test_missing_api_key() {
        let err = Settings::resolve(&[EnvFile::parse("DASHSCOPE_API_KEY=  ")], |_| None)
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidConfig(_)));
    }
}

//! query_database tool
//!
//! Runs SQL against a DM (Dameng) database. The connection string has the
//! form `dm://user:password@host:port/schema`; execution is delegated to a
//! `SqlClient` so the transport can be swapped out.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use url::Url;

use super::super::tool::{expect_args, Tool};
use crate::protocol::validate::{DSN_SCHEME, QUERY_DATABASE};

/// Port DM listens on when the DSN does not say
pub const DEFAULT_DM_PORT: u16 = 5236;

/// Longest a single `disql` session may run (5 minutes)
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(300);

/// A parsed DM connection string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DmDsn {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub schema: Option<String>,
}

impl DmDsn {
    /// Parse a normalized `dm://` connection string
    pub fn parse(dsn: &str) -> Result<Self> {
        let url = Url::parse(dsn).context("数据库连接串格式不正确")?;

        let user = urlencoding::decode(url.username())
            .context("数据库用户名编码不正确")?
            .into_owned();
        if user.is_empty() {
            anyhow::bail!("数据库连接串缺少用户名");
        }

        let password = match url.password() {
            Some(raw) => urlencoding::decode(raw)
                .context("数据库密码编码不正确")?
                .into_owned(),
            None => String::new(),
        };

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .context("数据库连接串缺少主机")?
            .to_string();

        let schema = Some(url.path().trim_matches('/'))
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            user,
            password,
            host,
            port: url.port().unwrap_or(DEFAULT_DM_PORT),
            schema,
        })
    }

    /// Login string understood by `disql`: `user/"password"@host:port`
    pub fn login(&self) -> String {
        format!(
            "{}/\"{}\"@{}:{}",
            self.user, self.password, self.host, self.port
        )
    }
}

/// Strip BOM and whitespace and force a lowercase `dm://` scheme
pub fn normalize_dm_dsn(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_start_matches('\u{feff}').trim();
    if trimmed.is_empty() {
        anyhow::bail!("数据库连接串不能为空");
    }

    let prefix_len = DSN_SCHEME.len();
    match trimmed.get(..prefix_len) {
        Some(prefix) if prefix.eq_ignore_ascii_case(DSN_SCHEME) => {
            Ok(format!("{}{}", DSN_SCHEME, &trimmed[prefix_len..]))
        }
        Some(_) => anyhow::bail!("数据库连接串必须以 dm:// 开头"),
        None => anyhow::bail!("数据库连接串格式不正确"),
    }
}

/// Executes a statement and renders the result as text
#[async_trait]
pub trait SqlClient: Send + Sync {
    async fn query(&self, dsn: &DmDsn, sql: &str) -> Result<String>;
}

/// `SqlClient` backed by DM's `disql` console client
pub struct DisqlClient {
    program: PathBuf,
    timeout: Duration,
}

impl DisqlClient {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Kill the session if it runs longer than `limit`
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = limit;
        self
    }

    fn script(dsn: &DmDsn, sql: &str) -> String {
        let mut script = String::new();
        if let Some(schema) = &dsn.schema {
            script.push_str(&format!("SET SCHEMA {};\n", quote_identifier(schema)));
        }
        script.push_str(sql.trim());
        if !sql.trim_end().ends_with(';') {
            script.push(';');
        }
        script.push_str("\nexit;\n");
        script
    }
}

impl Default for DisqlClient {
    fn default() -> Self {
        Self::new("disql")
    }
}

#[async_trait]
impl SqlClient for DisqlClient {
    async fn query(&self, dsn: &DmDsn, sql: &str) -> Result<String> {
        tracing::info!(
            "[Disql] Querying {}@{}:{}",
            dsn.user,
            dsn.host,
            dsn.port
        );

        let mut child = Command::new(&self.program)
            .arg("-S")
            .arg("-L")
            .arg(dsn.login())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("数据库不可用: 无法启动 {}", self.program.display()))?;

        let script = Self::script(dsn, sql);
        let session = async move {
            if let Some(mut stdin) = child.stdin.take() {
                stdin
                    .write_all(script.as_bytes())
                    .await
                    .context("发送 SQL 失败")?;
            }
            child.wait_with_output().await.context("查询失败")
        };

        // Dropping the session kills the child
        let output = match timeout(self.timeout, session).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!("[Disql] Session exceeded {:?}, killed", self.timeout);
                anyhow::bail!("查询超时（超过 {:?}），已终止 disql", self.timeout);
            }
        };
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = if stderr.trim().is_empty() {
                stdout.trim()
            } else {
                stderr.trim()
            };
            anyhow::bail!("查询失败: {}: {}", output.status, detail);
        }

        Ok(stdout)
    }
}

/// Double-quote a DM identifier, doubling embedded quotes
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Database tool for running SQL
pub struct QueryDatabaseTool {
    client: Arc<dyn SqlClient>,
}

impl QueryDatabaseTool {
    pub fn new(client: Arc<dyn SqlClient>) -> Self {
        Self { client }
    }
}

impl Default for QueryDatabaseTool {
    fn default() -> Self {
        Self::new(Arc::new(DisqlClient::default()))
    }
}

#[async_trait]
impl Tool for QueryDatabaseTool {
    fn name(&self) -> &str {
        QUERY_DATABASE
    }

    fn signature(&self) -> &str {
        "(dsn string, sql string)"
    }

    fn description(&self) -> &str {
        "连接达梦数据库并执行查询，返回表格化结果"
    }

    async fn execute(&self, args: &[String]) -> Result<String> {
        expect_args(QUERY_DATABASE, args, 2)?;

        let dsn = DmDsn::parse(&normalize_dm_dsn(&args[0])?)?;
        let sql = args[1].trim();
        if sql.is_empty() {
            anyhow::bail!("SQL 语句不能为空");
        }

        let output = self.client.query(&dsn, sql).await?;
        let output = output.trim();
        if output.is_empty() {
            return Ok("查询成功，但没有数据返回".to_string());
        }
        Ok(output.to_string())
    }
}

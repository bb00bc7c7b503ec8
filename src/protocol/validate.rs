//! Per-tool argument policies
//!
//! Runs before dispatch so placeholder or half-filled calls never reach a
//! handler with side effects. Every message tells the model to ask the
//! operator through `request_user_input` instead of guessing.

use thiserror::Error;

use super::action::ActionCall;

/// Tool name guarded by the database policy
pub const QUERY_DATABASE: &str = "query_database";

/// Placeholder the model tends to copy from examples
pub const DSN_PLACEHOLDER: &str = "your_dsn_here";

/// Scheme every DM connection string must start with
pub const DSN_SCHEME: &str = "dm://";

/// A rejected tool call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("query_database 需要同时提供 dsn 与 sql 参数，例如 query_database(\"dm://用户名:密码@主机:端口/数据库\", \"SELECT ...\")。缺失信息时请先调用 request_user_input。")]
    QueryArity,

    #[error("缺少有效的 dsn。请先调用 request_user_input(\"请提供形如 dm://用户名:密码@主机:端口/数据库 的达梦连接串\") 获取真实连接串。")]
    MissingDsn,

    #[error("达梦连接串必须以 dm:// 开头，可提示用户按照 dm://用户名:密码@主机:端口/数据库 的格式提供。")]
    DsnScheme,

    #[error("dsn 缺少主机信息，请确认包含 \"@主机:端口\" 段，并在必要时向用户询问完整连接串。")]
    DsnMissingHost,

    #[error("SQL 语句不能为空。请先调用 request_user_input(\"需要执行的 SQL 是什么？\") 获取真实语句。")]
    EmptyQuery,
}

/// Check the semantic preconditions of `call`
///
/// Tools without a policy always pass; their handlers enforce arity.
pub fn validate_action(call: &ActionCall) -> Result<(), ValidationError> {
    match call.name.as_str() {
        QUERY_DATABASE => validate_query(&call.args),
        _ => Ok(()),
    }
}

fn validate_query(args: &[String]) -> Result<(), ValidationError> {
    let [dsn, query] = args else {
        return Err(ValidationError::QueryArity);
    };

    let dsn = dsn.trim();
    if dsn.is_empty() || dsn.eq_ignore_ascii_case(DSN_PLACEHOLDER) {
        return Err(ValidationError::MissingDsn);
    }
    if !dsn.to_lowercase().starts_with(DSN_SCHEME) {
        return Err(ValidationError::DsnScheme);
    }
    if !dsn.contains('@') {
        return Err(ValidationError::DsnMissingHost);
    }
    if query.trim().is_empty() {
        return Err(ValidationError::EmptyQuery);
    }
    Ok(())
}

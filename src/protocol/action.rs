//! Action payload parsing
//!
//! An action payload looks like `tool_name("arg one", "arg two")`. The first
//! `(` and the last `)` delimit the argument text, which must be a
//! comma-separated list of JSON string literals.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// A parsed tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionCall {
    /// Bare tool name, never empty
    pub name: String,
    /// Positional string arguments
    pub args: Vec<String>,
}

impl ActionCall {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

impl fmt::Display for ActionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}((无参数))", self.name)
        } else {
            write!(f, "{}({})", self.name, self.args.join(", "))
        }
    }
}

/// Why an action payload could not be parsed
#[derive(Error, Debug)]
pub enum ActionParseError {
    #[error("action 内容为空")]
    Empty,

    #[error("无法解析函数调用: {0}")]
    Unbalanced(String),

    #[error("缺少函数名: {0}")]
    MissingName(String),

    #[error("action 参数必须是合法的 JSON 字面量: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("第 {position} 个参数必须是字符串，实际为 {found}")]
    NonString { position: usize, found: &'static str },
}

/// Parse an `<action>` payload into a tool name and its arguments
pub fn parse_action(payload: &str) -> Result<ActionCall, ActionParseError> {
    let payload = payload.trim();
    if payload.is_empty() {
        return Err(ActionParseError::Empty);
    }

    let (open, close) = match (payload.find('('), payload.rfind(')')) {
        (Some(open), Some(close)) if open < close => (open, close),
        _ => return Err(ActionParseError::Unbalanced(payload.to_string())),
    };

    let name = payload[..open].trim();
    if name.is_empty() {
        return Err(ActionParseError::MissingName(payload.to_string()));
    }

    let args = parse_arguments(&payload[open + 1..close])?;
    Ok(ActionCall::new(name, args))
}

/// Decode a raw argument list; only JSON string literals are accepted
fn parse_arguments(raw: &str) -> Result<Vec<String>, ActionParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    let wrapped = format!("[{}]", preserve_newline_escapes(raw));
    let values: Vec<Value> =
        serde_json::from_str(&wrapped).map_err(ActionParseError::InvalidJson)?;

    values
        .into_iter()
        .enumerate()
        .map(|(i, value)| match value {
            Value::String(s) => Ok(s),
            other => Err(ActionParseError::NonString {
                position: i + 1,
                found: json_kind(&other),
            }),
        })
        .collect()
}

/// Re-escape `\n` so decoding yields the two characters `\` `n`
///
/// Newline escapes stay visible in the argument; the write tool turns them
/// into real line breaks.
fn preserve_newline_escapes(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 8);
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push_str("\\\\n"),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "布尔值",
        Value::Number(_) => "数字",
        Value::String(_) => "字符串",
        Value::Array(_) => "数组",
        Value::Object(_) => "对象",
    }
}

//! Interactive gate
//!
//! Everything the loop needs from the human operator goes through the
//! `Operator` trait: yes/no confirmation before dangerous tools, and the
//! `request_user_input` tool. Terminal use is handled by `cli::Console`;
//! `ScriptedOperator` feeds canned answers for tests and unattended runs.

use std::collections::VecDeque;
use std::io;

use async_trait::async_trait;

use crate::core::{AgentError, AgentResult};
use crate::helpers::Transcript;

/// Name of the auto-registered interactive tool
pub const REQUEST_USER_INPUT: &str = "request_user_input";
pub const REQUEST_USER_INPUT_SIGNATURE: &str = "(prompt string)";
pub const REQUEST_USER_INPUT_DESCRIPTION: &str = "当信息不足时向终端用户提问并等待回复";

const DEFAULT_INPUT_PROMPT: &str = "模型需要更多信息，请输入补充内容: ";
const CONFIRM_PROMPT: &str = "是否继续执行终端命令? (Y/N): ";
const INPUT_LINE_PROMPT: &str = "请输入补充信息: ";

/// Source of operator input
#[async_trait]
pub trait Operator: Send {
    /// Show `prompt` and read one line
    ///
    /// End of input must be reported as `io::ErrorKind::UnexpectedEof`.
    async fn read_line(&mut self, prompt: &str) -> io::Result<String>;

    /// Show an informational message
    fn notify(&mut self, message: &str);
}

/// Ask the operator to approve a dangerous action
///
/// Only `y`/`Y` counts as approval.
pub async fn confirm(operator: &mut dyn Operator) -> AgentResult<bool> {
    let answer = operator
        .read_line(CONFIRM_PROMPT)
        .await
        .map_err(AgentError::OperatorInput)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// Run the `request_user_input` tool
///
/// Blank answers are rejected and asked again; the first non-empty line is
/// returned trimmed. Read failures end the run.
pub async fn request_user_input(
    operator: &mut dyn Operator,
    transcript: &Transcript,
    args: &[String],
) -> AgentResult<String> {
    let prompt = args
        .first()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_INPUT_PROMPT);

    transcript.record("补充信息请求", prompt);
    operator.notify(&format!("\n模型请求补充信息: {}", prompt));

    loop {
        let line = operator
            .read_line(INPUT_LINE_PROMPT)
            .await
            .map_err(AgentError::OperatorInput)?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            operator.notify("输入不能为空，请重新输入。");
            continue;
        }
        transcript.record("用户补充信息", trimmed);
        return Ok(trimmed.to_string());
    }
}

/// Operator that replays a fixed list of answers
///
/// Once the answers run out every read fails with `UnexpectedEof`.
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    answers: VecDeque<String>,
    prompts: Vec<String>,
    notices: Vec<String>,
}

impl ScriptedOperator {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Prompts shown so far, in order
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Notices shown so far, in order
    pub fn notices(&self) -> &[String] {
        &self.notices
    }
}

#[async_trait]
impl Operator for ScriptedOperator {
    async fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted answer left")
        })
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}

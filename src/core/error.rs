//! Agent error types
//!
//! Only the fatal outcomes of a run live here. Parse, validation and dispatch
//! failures are folded back into the conversation as observations and never
//! surface as an `AgentError`.

use thiserror::Error;

/// Errors that terminate a ReAct run
#[derive(Error, Debug)]
pub enum AgentError {
    /// The model call itself failed (network, HTTP status, decoding)
    #[error("模型调用失败: {0:#}")]
    Transport(anyhow::Error),

    /// The model answered with no choices or empty content
    #[error("模型返回为空")]
    EmptyResponse,

    /// The reply carried neither `<final_answer>` nor `<action>`
    #[error("模型输出缺少 <action>，无法继续执行")]
    MissingAction,

    /// The operator declined a dangerous action
    #[error("操作被用户取消")]
    Cancelled,

    /// The caller's cancellation token fired
    #[error("运行被中断")]
    Interrupted,

    /// Reading from the operator failed (end of input included)
    #[error("读取用户输入失败: {0}")]
    OperatorInput(#[source] std::io::Error),

    /// Invalid configuration
    #[error("配置无效: {0}")]
    InvalidConfig(String),
}

impl AgentError {
    /// Whether the operator chose to stop the run
    pub fn is_cancellation(&self) -> bool {
        matches!(self, AgentError::Cancelled | AgentError::Interrupted)
    }
}

/// Result type alias for agent operations
pub type AgentResult<T> = Result<T, AgentError>;

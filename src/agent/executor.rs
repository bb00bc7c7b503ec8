//! Tool Executor
//!
//! Resolves a parsed action against the registry and turns the outcome into
//! observation text. Only operator failures escape as errors.

use crate::core::AgentResult;
use crate::gate::{self, Operator};
use crate::helpers::Transcript;
use crate::protocol::ActionCall;
use crate::tools::{ToolHandler, ToolRegistry};

/// Handles tool dispatch for the conversation loop
pub struct ToolExecutor;

impl ToolExecutor {
    /// Execute an action and return the observation text
    ///
    /// - Unknown tool: `未知工具: {name}`
    /// - Handler failure: `工具执行错误: {error}`
    /// - Operator tool: the operator's answer (read failures are fatal)
    pub async fn execute(
        tools: &ToolRegistry,
        operator: &mut dyn Operator,
        transcript: &Transcript,
        call: &ActionCall,
    ) -> AgentResult<String> {
        let Some(entry) = tools.get(&call.name) else {
            tracing::warn!("[Executor] Unknown tool: {}", call.name);
            return Ok(format!("未知工具: {}", call.name));
        };

        match &entry.handler {
            ToolHandler::Native(tool) => {
                tracing::info!(
                    "[Executor] Executing {} with {} args",
                    call.name,
                    call.args.len()
                );
                match tool.execute(&call.args).await {
                    Ok(output) => {
                        tracing::debug!("[Executor] {} returned {} bytes", call.name, output.len());
                        Ok(output)
                    }
                    Err(e) => {
                        tracing::warn!("[Executor] {} failed: {:#}", call.name, e);
                        Ok(format!("工具执行错误: {:#}", e))
                    }
                }
            }
            ToolHandler::Operator => {
                tracing::info!("[Executor] Waiting for operator input ({})", call.name);
                gate::request_user_input(operator, transcript, &call.args).await
            }
        }
    }
}

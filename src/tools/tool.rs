//! Tool trait definition
//!
//! All in-process tools implement this trait to provide a consistent interface.

use anyhow::Result;
use async_trait::async_trait;

/// Trait for tools that the agent can invoke from an `<action>`
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name used in the action payload
    fn name(&self) -> &str;

    /// Display signature shown to the model, e.g. `(file_path string)`
    fn signature(&self) -> &str;

    /// Get a description of this tool
    fn description(&self) -> &str;

    /// Execute the tool with positional string arguments
    ///
    /// An `Err` is not fatal: the loop reports it back to the model as an
    /// observation.
    async fn execute(&self, args: &[String]) -> Result<String>;

    /// Check if the operator must confirm every invocation
    ///
    /// Default is false - only tools with unbounded side effects opt in.
    fn requires_confirmation(&self) -> bool {
        false
    }
}

/// Fail unless exactly `expected` arguments were passed
pub fn expect_args(tool: &str, args: &[String], expected: usize) -> Result<()> {
    if args.len() != expected {
        anyhow::bail!("{} 需要 {} 个参数", tool, expected);
    }
    Ok(())
}

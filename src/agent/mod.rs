//! ReAct agent
//!
//! - `ReActAgent` - the conversation loop
//! - `AgentConfig` - model, project directory and prompt template
//! - `ToolExecutor` - turns parsed actions into observations

mod config;
mod executor;
mod react_loop;

pub use config::{AgentConfig, DEFAULT_MODEL};
pub use executor::ToolExecutor;
pub use react_loop::ReActAgent;

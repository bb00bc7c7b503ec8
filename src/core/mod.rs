//! Core types for the agent
//!
//! - `AgentError` - Fatal run errors
//! - `LoopState` - Current state of the conversation loop

pub mod error;
pub mod state;

pub use error::{AgentError, AgentResult};
pub use state::LoopState;

//! Helpers shared by the agent and the binary

pub mod transcript;

pub use transcript::{resolve_log_path, SharedBuffer, Transcript};

pub mod core;
pub mod protocol;
pub mod tools;

// Operator interaction and prompt rendering
pub mod gate;
pub mod prompt;

// Optional components
pub mod cli;
pub mod config;
pub mod llm;
pub mod logging;

// Useful helpers for agent implementations
pub mod helpers;

// ReAct conversation loop
pub mod agent;

//! Tool system
//!
//! This module provides:
//! - `Tool` trait - Interface for implementing tools
//! - `ToolRegistry` - Ordered set of tools offered to the model
//! - `common` - Built-in tools (read, write, terminal, database)

mod registry;
mod tool;

/// Common/built-in tools
pub mod common;

use std::path::Path;
use std::sync::Arc;

// Core exports
pub use registry::{ToolEntry, ToolHandler, ToolRegistry};
pub use tool::{expect_args, Tool};

// Re-export common tools for convenience
pub use common::{
    DisqlClient, DmDsn, QueryDatabaseTool, ReadFileTool, SqlClient, TerminalTool, WriteFileTool,
};

/// The standard tool set, in the order it is described to the model
pub fn default_tools(project_dir: &Path, disql_path: &Path) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(ReadFileTool::new(project_dir)),
        Arc::new(WriteFileTool::new(project_dir)),
        Arc::new(TerminalTool::new(project_dir)),
        Arc::new(QueryDatabaseTool::new(Arc::new(DisqlClient::new(disql_path)))),
    ]
}

//! Built-in tools
//!
//! - `ReadFileTool` - Read file contents
//! - `WriteFileTool` - Write files
//! - `TerminalTool` - Execute shell commands (needs confirmation)
//! - `QueryDatabaseTool` - Run SQL against a DM database

pub mod query_database;
pub mod read_file;
pub mod terminal;
pub mod write_file;

pub use crate::protocol::validate::QUERY_DATABASE;
pub use query_database::{DisqlClient, DmDsn, QueryDatabaseTool, SqlClient};
pub use read_file::{ReadFileTool, READ_FILE};
pub use terminal::{TerminalTool, RUN_TERMINAL_COMMAND};
pub use write_file::{WriteFileTool, WRITE_TO_FILE};

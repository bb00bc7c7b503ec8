//! ReAct wire protocol
//!
//! - `tags` - Tag extraction from model replies
//! - `action` - Action payload parsing
//! - `validate` - Per-tool argument policies

pub mod action;
pub mod tags;
pub mod validate;

pub use action::{parse_action, ActionCall, ActionParseError};
pub use tags::{extract_tag, wrap_tag};
pub use validate::{validate_action, ValidationError};

//! Tool registry for managing available tools
//!
//! The registry is built once from an explicit tool list and keeps
//! registration order, which is also the order tools are described to the
//! model. Lookup goes through a name index built as tools are added.

use std::collections::HashMap;
use std::sync::Arc;

use super::tool::Tool;

/// How an invocation is carried out
#[derive(Clone)]
pub enum ToolHandler {
    /// Runs in-process against the validated arguments
    Native(Arc<dyn Tool>),
    /// Suspends the loop until the operator answers
    Operator,
}

impl std::fmt::Debug for ToolHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolHandler::Native(tool) => write!(f, "Native({})", tool.name()),
            ToolHandler::Operator => write!(f, "Operator"),
        }
    }
}

/// A registered tool
#[derive(Debug, Clone)]
pub struct ToolEntry {
    pub name: String,
    pub signature: String,
    pub description: String,
    pub handler: ToolHandler,
}

impl ToolEntry {
    /// Check if the operator must confirm this tool before it runs
    pub fn requires_confirmation(&self) -> bool {
        match &self.handler {
            ToolHandler::Native(tool) => tool.requires_confirmation(),
            ToolHandler::Operator => false,
        }
    }

    /// One line of the tool list rendered into the system prompt
    pub fn describe(&self) -> String {
        format!("- {}{}: {}", self.name, self.signature, self.description)
    }
}

/// Registry that holds all available tools
#[derive(Debug, Default)]
pub struct ToolRegistry {
    entries: Vec<ToolEntry>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create a new empty tool registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of tools, in order
    pub fn from_tools(tools: Vec<Arc<dyn Tool>>) -> Self {
        let mut registry = Self::new();
        for tool in tools {
            registry.register_arc(tool);
        }
        registry
    }

    /// Register a native tool in the registry
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.register_arc(Arc::new(tool));
    }

    /// Register a shared native tool
    ///
    /// A tool with an existing name replaces the old entry in place.
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        let entry = ToolEntry {
            name: tool.name().to_string(),
            signature: tool.signature().to_string(),
            description: tool.description().to_string(),
            handler: ToolHandler::Native(tool),
        };
        self.insert(entry);
    }

    /// Add an operator-backed tool unless the name is already taken
    ///
    /// Returns whether the tool was added.
    pub fn ensure_operator_tool(
        &mut self,
        name: &str,
        signature: &str,
        description: &str,
    ) -> bool {
        if self.contains(name) {
            tracing::info!(
                "[ToolRegistry] '{}' already registered, keeping existing handler",
                name
            );
            return false;
        }

        self.insert(ToolEntry {
            name: name.to_string(),
            signature: signature.to_string(),
            description: description.to_string(),
            handler: ToolHandler::Operator,
        });
        true
    }

    fn insert(&mut self, entry: ToolEntry) {
        tracing::info!("[ToolRegistry] Registering tool: {}", entry.name);
        match self.index.get(&entry.name) {
            Some(&slot) => {
                tracing::warn!("[ToolRegistry] Replacing tool: {}", entry.name);
                self.entries[slot] = entry;
            }
            None => {
                self.index.insert(entry.name.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&ToolEntry> {
        self.index.get(name).map(|&slot| &self.entries[slot])
    }

    /// Check if a tool is registered
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Check if a tool requires operator confirmation
    ///
    /// Unknown names never do; they become an observation instead.
    pub fn requires_confirmation(&self, name: &str) -> bool {
        self.get(name)
            .map(ToolEntry::requires_confirmation)
            .unwrap_or(false)
    }

    /// Tool list as rendered into the system prompt
    pub fn describe(&self) -> String {
        self.entries
            .iter()
            .map(ToolEntry::describe)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Get the list of tool names in registration order
    pub fn tool_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;

    struct Fixed {
        name: &'static str,
        dangerous: bool,
    }

    #[async_trait]
    impl Tool for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn signature(&self) -> &str {
            "(x string)"
        }

        fn description(&self) -> &str {
            "fixed output"
        }

        async fn execute(&self, _args: &[String]) -> Result<String> {
            Ok(self.name.to_string())
        }

        fn requires_confirmation(&self) -> bool {
            self.dangerous
        }
    }

    #[test]
    fn test_empty_registry() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.get("nonexistent").is_none());
        assert!(!registry.requires_confirmation("nonexistent"));
    }

    #[test]
    fn test_keeps_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register(Fixed { name: "b", dangerous: false });
        registry.register(Fixed { name: "a", dangerous: true });
        assert!(registry.ensure_operator_tool("ask", "(prompt string)", "ask the operator"));

        assert_eq!(registry.tool_names(), vec!["b", "a", "ask"]);
        assert_eq!(
            registry.describe(),
            "- b(x string): fixed output\n- a(x string): fixed output\n- ask(prompt string): ask the operator"
        );
        assert!(registry.requires_confirmation("a"));
        assert!(!registry.requires_confirmation("b"));
        assert!(!registry.requires_confirmation("ask"));
    }

    #[test]
    fn test_operator_tool_not_added_twice() {
        let mut registry = ToolRegistry::new();
        registry.register(Fixed { name: "ask", dangerous: false });
        assert!(!registry.ensure_operator_tool("ask", "(prompt string)", "ask"));
        assert_eq!(registry.len(), 1);
        assert!(matches!(
            registry.get("ask").map(|e| &e.handler),
            Some(ToolHandler::Native(_))
        ));
    }

    #[test]
    fn test_replacing_keeps_slot() {
        let mut registry = ToolRegistry::new();
        registry.register(Fixed { name: "a", dangerous: false });
        registry.register(Fixed { name: "b", dangerous: false });
        registry.register(Fixed { name: "a", dangerous: true });
        assert_eq!(registry.tool_names(), vec!["a", "b"]);
        assert!(registry.requires_confirmation("a"));
    }
}

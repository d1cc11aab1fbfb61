//! Tool schema conversion port.
//!
//! Separates "which tools exist" (domain [`ToolDescriptor`]) from "how the
//! model API wants them serialized" (infrastructure).

use mcpflow_domain::tool::ToolDescriptor;
use serde_json::Value;

/// Port for converting tool descriptors to function declarations.
pub trait ToolSchemaPort: Send + Sync {
    /// Encode one descriptor. Never fails.
    fn to_function_declaration(&self, tool: &ToolDescriptor) -> Value;

    /// Encode all descriptors, sorted by name.
    fn function_declarations(&self, tools: &[&ToolDescriptor]) -> Vec<Value> {
        let mut sorted: Vec<&ToolDescriptor> = tools.to_vec();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));
        sorted
            .into_iter()
            .map(|t| self.to_function_declaration(t))
            .collect()
    }
}

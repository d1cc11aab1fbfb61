//! Tool domain entities

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Parameter types understood by the model's function-calling API.
///
/// Anything a provider declares outside this set is coerced to
/// [`ParamType::String`] by the schema bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Integer => "integer",
            ParamType::Boolean => "boolean",
            ParamType::Array => "array",
            ParamType::Object => "object",
        }
    }

    /// Parse a JSON Schema type name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "string" => Some(ParamType::String),
            "number" => Some(ParamType::Number),
            "integer" => Some(ParamType::Integer),
            "boolean" => Some(ParamType::Boolean),
            "array" => Some(ParamType::Array),
            "object" => Some(ParamType::Object),
            _ => None,
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single declared parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    pub param_type: ParamType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Allowed values, in declaration order. Never empty when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    /// Element sub-schema; always present for [`ParamType::Array`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Value>,
}

impl PropertySchema {
    pub fn new(param_type: ParamType) -> Self {
        let items = (param_type == ParamType::Array).then(default_items);
        Self {
            param_type,
            description: None,
            enum_values: None,
            items,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_enum(mut self, values: Vec<Value>) -> Self {
        if !values.is_empty() {
            self.enum_values = Some(values);
        }
        self
    }

    pub fn with_items(mut self, items: Value) -> Self {
        self.items = Some(items);
        self
    }
}

/// Item schema used when an array parameter does not declare one.
pub fn default_items() -> Value {
    serde_json::json!({ "type": "string" })
}

/// Parameters of a tool: declared properties plus the required-name set.
///
/// Properties are kept in a `BTreeMap` so encoded declarations are stable
/// across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    pub properties: BTreeMap<String, PropertySchema>,
    /// Always a subset of `properties`' keys.
    pub required: Vec<String>,
}

impl ParameterSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property(mut self, name: impl Into<String>, property: PropertySchema) -> Self {
        self.properties.insert(name.into(), property);
        self
    }

    /// Mark a declared property as required. Undeclared names are ignored.
    pub fn with_required(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if self.properties.contains_key(&name) && !self.required.contains(&name) {
            self.required.push(name);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// A tool advertised by a provider, in model-agnostic form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: ParameterSchema,
}

impl ToolDescriptor {
    /// Create a descriptor. A blank description is replaced by
    /// [`placeholder_description`].
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let name = name.into();
        let description = description.into();
        let description = if description.trim().is_empty() {
            placeholder_description(&name)
        } else {
            description
        };
        Self {
            name,
            description,
            parameters: ParameterSchema::default(),
        }
    }

    pub fn with_parameters(mut self, parameters: ParameterSchema) -> Self {
        self.parameters = parameters;
        self
    }
}

/// Description substituted when a provider supplies none.
pub fn placeholder_description(name: &str) -> String {
    format!("Tool to perform {}", name)
}

/// A function call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Map::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    pub fn with_args(mut self, args: Map<String, Value>) -> Self {
        self.args = args;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_param_type_parse_is_case_insensitive() {
        assert_eq!(ParamType::parse("Integer"), Some(ParamType::Integer));
        assert_eq!(ParamType::parse("BOOLEAN"), Some(ParamType::Boolean));
        assert_eq!(ParamType::parse("null"), None);
    }

    #[test]
    fn test_array_property_gets_default_items() {
        let prop = PropertySchema::new(ParamType::Array);
        assert_eq!(prop.items, Some(json!({"type": "string"})));

        let prop = PropertySchema::new(ParamType::String);
        assert!(prop.items.is_none());
    }

    #[test]
    fn test_empty_enum_is_not_recorded() {
        let prop = PropertySchema::new(ParamType::String).with_enum(vec![]);
        assert!(prop.enum_values.is_none());
    }

    #[test]
    fn test_required_ignores_undeclared_names() {
        let params = ParameterSchema::new()
            .with_property("a", PropertySchema::new(ParamType::Number))
            .with_required("a")
            .with_required("a")
            .with_required("ghost");
        assert_eq!(params.required, vec!["a".to_string()]);
    }

    #[test]
    fn test_blank_description_uses_placeholder() {
        let tool = ToolDescriptor::new("addNumbers", "  ");
        assert_eq!(tool.description, "Tool to perform addNumbers");

        let tool = ToolDescriptor::new("addNumbers", "Adds two numbers");
        assert_eq!(tool.description, "Adds two numbers");
    }

    #[test]
    fn test_tool_call_builder() {
        let call = ToolCall::new("addNumbers").with_arg("a", 2).with_arg("b", 3);
        assert_eq!(call.args.get("a"), Some(&json!(2)));
        assert_eq!(call.args.len(), 2);
    }
}

//! Function declaration converter.
//!
//! Default implementation of [`ToolSchemaPort`] producing the model API's
//! function-calling format:
//!
//! ```json
//! {
//!   "name": "add",
//!   "description": "Add two numbers",
//!   "parameters": {
//!     "type": "object",
//!     "properties": { "a": { "type": "number" } },
//!     "required": ["a"]
//!   }
//! }
//! ```
//!
//! `properties` is always present (possibly empty); `required` is omitted
//! when empty.

use mcpflow_application::ports::tool_schema::ToolSchemaPort;
use mcpflow_domain::tool::{
    PropertySchema, ToolDescriptor, bridge_tool, entities::placeholder_description,
};
use serde_json::{Map, Value, json};
use tracing::debug;

pub struct FunctionDeclarationConverter;

impl FunctionDeclarationConverter {
    /// Decode a function declaration back into a descriptor.
    ///
    /// Goes through the same bridge as provider schemas, so anything the
    /// encoder cannot have produced is degraded the same way. Returns `None`
    /// for a declaration without a name.
    pub fn from_function_declaration(declaration: &Value) -> Option<ToolDescriptor> {
        let name = declaration.get("name").and_then(Value::as_str)?;
        let description = declaration.get("description").and_then(Value::as_str);
        let bridged = bridge_tool(name, description, declaration.get("parameters")).ok()?;
        for diagnostic in &bridged.diagnostics {
            debug!("Decoding declaration: {}", diagnostic);
        }
        Some(bridged.descriptor)
    }
}

fn encode_property(property: &PropertySchema) -> Value {
    let mut prop = Map::new();
    prop.insert("type".to_string(), json!(property.param_type.as_str()));
    if let Some(description) = &property.description {
        prop.insert("description".to_string(), json!(description));
    }
    if let Some(values) = &property.enum_values {
        prop.insert("enum".to_string(), Value::Array(values.clone()));
    }
    if let Some(items) = &property.items {
        prop.insert("items".to_string(), items.clone());
    }
    Value::Object(prop)
}

impl ToolSchemaPort for FunctionDeclarationConverter {
    fn to_function_declaration(&self, tool: &ToolDescriptor) -> Value {
        let properties: Map<String, Value> = tool
            .parameters
            .properties
            .iter()
            .map(|(name, property)| (name.clone(), encode_property(property)))
            .collect();

        let mut parameters = Map::new();
        parameters.insert("type".to_string(), json!("object"));
        parameters.insert("properties".to_string(), Value::Object(properties));
        if !tool.parameters.required.is_empty() {
            parameters.insert("required".to_string(), json!(tool.parameters.required));
        }

        let description = if tool.description.trim().is_empty() {
            placeholder_description(&tool.name)
        } else {
            tool.description.clone()
        };

        json!({
            "name": tool.name,
            "description": description,
            "parameters": parameters,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpflow_domain::tool::{ParamType, ParameterSchema};

    fn add_numbers() -> ToolDescriptor {
        ToolDescriptor::new("add_numbers", "Add two numbers").with_parameters(
            ParameterSchema::new()
                .with_property(
                    "a",
                    PropertySchema::new(ParamType::Number).with_description("First addend"),
                )
                .with_property("b", PropertySchema::new(ParamType::Number))
                .with_required("a")
                .with_required("b"),
        )
    }

    #[test]
    fn test_to_function_declaration() {
        let declaration = FunctionDeclarationConverter.to_function_declaration(&add_numbers());

        assert_eq!(declaration["name"], "add_numbers");
        assert_eq!(declaration["description"], "Add two numbers");
        assert_eq!(declaration["parameters"]["type"], "object");
        assert_eq!(declaration["parameters"]["properties"]["a"]["type"], "number");
        assert_eq!(
            declaration["parameters"]["properties"]["a"]["description"],
            "First addend"
        );
        assert!(
            declaration["parameters"]["properties"]["b"]
                .get("description")
                .is_none()
        );
        assert_eq!(declaration["parameters"]["required"], json!(["a", "b"]));
    }

    #[test]
    fn test_empty_required_is_omitted() {
        let tool = ToolDescriptor::new("list_cities", "List cities").with_parameters(
            ParameterSchema::new().with_property("country", PropertySchema::new(ParamType::String)),
        );
        let declaration = FunctionDeclarationConverter.to_function_declaration(&tool);

        assert!(declaration["parameters"].get("required").is_none());
    }

    #[test]
    fn test_no_parameters_still_has_properties() {
        let tool = ToolDescriptor::new("now", "");
        let declaration = FunctionDeclarationConverter.to_function_declaration(&tool);

        assert_eq!(declaration["description"], "Tool to perform now");
        assert_eq!(declaration["parameters"]["properties"], json!({}));
    }

    #[test]
    fn test_enum_and_items_are_encoded() {
        let tool = ToolDescriptor::new("forecast", "Weather forecast").with_parameters(
            ParameterSchema::new()
                .with_property(
                    "unit",
                    PropertySchema::new(ParamType::String)
                        .with_enum(vec![json!("celsius"), json!("fahrenheit")]),
                )
                .with_property("days", PropertySchema::new(ParamType::Array)),
        );
        let declaration = FunctionDeclarationConverter.to_function_declaration(&tool);
        let properties = &declaration["parameters"]["properties"];

        assert_eq!(properties["unit"]["enum"], json!(["celsius", "fahrenheit"]));
        assert_eq!(properties["days"]["items"], json!({"type": "string"}));
    }

    #[test]
    fn test_round_trip_preserves_names_required_and_types() {
        let tool = ToolDescriptor::new("search", "Search documents").with_parameters(
            ParameterSchema::new()
                .with_property("query", PropertySchema::new(ParamType::String))
                .with_property("limit", PropertySchema::new(ParamType::Integer))
                .with_property("exact", PropertySchema::new(ParamType::Boolean))
                .with_property("score", PropertySchema::new(ParamType::Number))
                .with_required("query"),
        );

        let declaration = FunctionDeclarationConverter.to_function_declaration(&tool);
        let decoded = FunctionDeclarationConverter::from_function_declaration(&declaration).unwrap();

        assert_eq!(decoded, tool);
    }

    #[test]
    fn test_function_declarations_sorted_by_name() {
        let b = ToolDescriptor::new("beta", "B");
        let a = ToolDescriptor::new("alpha", "A");
        let declarations = FunctionDeclarationConverter.function_declarations(&[&b, &a]);

        let names: Vec<&str> = declarations
            .iter()
            .map(|d| d["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_nameless_declaration_is_rejected() {
        assert!(
            FunctionDeclarationConverter::from_function_declaration(&json!({"description": "x"}))
                .is_none()
        );
    }
}

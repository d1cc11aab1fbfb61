//! Provider schema → [`ToolDescriptor`] conversion.
//!
//! MCP servers describe their parameters with free-form JSON Schema. The
//! model API only accepts a small, typed subset. [`bridge_tool`] narrows the
//! provider's schema to that subset and never fails on malformed input:
//! every lossy step is reported as a [`SchemaDiagnostic`] for the caller to
//! log.
//!
//! | Provider input | Result |
//! |---|---|
//! | missing or unknown `type` | `string` |
//! | `enum` that is not a non-empty array | dropped |
//! | array without an object `items` | `items: {type: string}` |
//! | non-object property entry | skipped |
//! | `required` with non-string members | dropped entirely |
//! | `required` naming undeclared properties | those names dropped |
//! | missing or non-object schema | no parameters |

use super::entities::{
    ParamType, ParameterSchema, PropertySchema, ToolDescriptor, default_items,
    placeholder_description,
};
use serde_json::Value;

/// A lossy step taken while bridging a provider schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaDiagnostic {
    /// The provider listed a tool without a name; it is skipped.
    UnnamedTool,
    /// No description was given; the placeholder was substituted.
    PlaceholderDescription { tool: String },
    /// The input schema was present but not a JSON object.
    MalformedSchema { tool: String },
    /// A property entry was not a JSON object and was skipped.
    MalformedProperty { tool: String, property: String },
    /// A property type was missing (`found: None`) or unsupported and was
    /// coerced to `string`.
    CoercedType {
        tool: String,
        property: String,
        found: Option<String>,
    },
    /// An `enum` that was not a non-empty array was dropped.
    DroppedEnum { tool: String, property: String },
    /// An array property had no usable `items`; the default was used.
    DefaultedItems { tool: String, property: String },
    /// The `required` list was malformed and dropped.
    DroppedRequired { tool: String },
    /// A required name did not match any declared property.
    UndeclaredRequired { tool: String, name: String },
}

impl std::fmt::Display for SchemaDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaDiagnostic::UnnamedTool => write!(f, "tool without a name skipped"),
            SchemaDiagnostic::PlaceholderDescription { tool } => {
                write!(f, "{}: no description, using placeholder", tool)
            }
            SchemaDiagnostic::MalformedSchema { tool } => {
                write!(f, "{}: input schema is not an object, no parameters", tool)
            }
            SchemaDiagnostic::MalformedProperty { tool, property } => {
                write!(f, "{}.{}: property is not an object, skipped", tool, property)
            }
            SchemaDiagnostic::CoercedType {
                tool,
                property,
                found: None,
            } => write!(f, "{}.{}: missing type, defaulting to string", tool, property),
            SchemaDiagnostic::CoercedType {
                tool,
                property,
                found: Some(found),
            } => write!(
                f,
                "{}.{}: unsupported type '{}', defaulting to string",
                tool, property, found
            ),
            SchemaDiagnostic::DroppedEnum { tool, property } => {
                write!(f, "{}.{}: enum is not a non-empty list, dropped", tool, property)
            }
            SchemaDiagnostic::DefaultedItems { tool, property } => write!(
                f,
                "{}.{}: array without items schema, defaulting to string items",
                tool, property
            ),
            SchemaDiagnostic::DroppedRequired { tool } => {
                write!(f, "{}: required list is malformed, dropped", tool)
            }
            SchemaDiagnostic::UndeclaredRequired { tool, name } => {
                write!(f, "{}: required name '{}' is not declared, dropped", tool, name)
            }
        }
    }
}

/// A bridged descriptor plus the degradations applied to produce it.
#[derive(Debug, Clone)]
pub struct BridgedTool {
    pub descriptor: ToolDescriptor,
    pub diagnostics: Vec<SchemaDiagnostic>,
}

/// Convert a provider-native tool (name, description, JSON Schema) into a
/// [`ToolDescriptor`].
///
/// Only an empty name is rejected, since a tool without a name cannot be
/// called.
pub fn bridge_tool(
    name: &str,
    description: Option<&str>,
    input_schema: Option<&Value>,
) -> Result<BridgedTool, SchemaDiagnostic> {
    if name.trim().is_empty() {
        return Err(SchemaDiagnostic::UnnamedTool);
    }

    let mut diagnostics = Vec::new();

    let description = match description.filter(|d| !d.trim().is_empty()) {
        Some(d) => d.to_string(),
        None => {
            diagnostics.push(SchemaDiagnostic::PlaceholderDescription {
                tool: name.to_string(),
            });
            placeholder_description(name)
        }
    };

    let parameters = match input_schema {
        None | Some(Value::Null) => ParameterSchema::default(),
        Some(schema @ Value::Object(_)) => bridge_parameters(name, schema, &mut diagnostics),
        Some(_) => {
            diagnostics.push(SchemaDiagnostic::MalformedSchema {
                tool: name.to_string(),
            });
            ParameterSchema::default()
        }
    };

    Ok(BridgedTool {
        descriptor: ToolDescriptor::new(name, description).with_parameters(parameters),
        diagnostics,
    })
}

fn bridge_parameters(
    tool: &str,
    schema: &Value,
    diagnostics: &mut Vec<SchemaDiagnostic>,
) -> ParameterSchema {
    let mut params = ParameterSchema::default();

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (prop_name, raw) in properties {
            if !raw.is_object() {
                diagnostics.push(SchemaDiagnostic::MalformedProperty {
                    tool: tool.to_string(),
                    property: prop_name.clone(),
                });
                continue;
            }
            let property = bridge_property(tool, prop_name, raw, diagnostics);
            params.properties.insert(prop_name.clone(), property);
        }
    }

    match schema.get("required") {
        None | Some(Value::Null) => {}
        Some(Value::Array(names)) if names.iter().all(Value::is_string) => {
            for required in names.iter().filter_map(Value::as_str) {
                if params.properties.contains_key(required) {
                    if !params.required.iter().any(|r| r == required) {
                        params.required.push(required.to_string());
                    }
                } else {
                    diagnostics.push(SchemaDiagnostic::UndeclaredRequired {
                        tool: tool.to_string(),
                        name: required.to_string(),
                    });
                }
            }
        }
        Some(_) => diagnostics.push(SchemaDiagnostic::DroppedRequired {
            tool: tool.to_string(),
        }),
    }

    params
}

fn bridge_property(
    tool: &str,
    name: &str,
    raw: &Value,
    diagnostics: &mut Vec<SchemaDiagnostic>,
) -> PropertySchema {
    let declared = raw.get("type");
    let param_type = match declared.and_then(Value::as_str).and_then(ParamType::parse) {
        Some(t) => t,
        None => {
            diagnostics.push(SchemaDiagnostic::CoercedType {
                tool: tool.to_string(),
                property: name.to_string(),
                found: declared.map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                }),
            });
            ParamType::String
        }
    };

    let mut property = PropertySchema::new(param_type);

    if let Some(description) = raw.get("description").and_then(Value::as_str) {
        property.description = Some(description.to_string());
    }

    match raw.get("enum") {
        None => {}
        Some(Value::Array(values)) if !values.is_empty() => {
            property.enum_values = Some(values.clone());
        }
        Some(_) => diagnostics.push(SchemaDiagnostic::DroppedEnum {
            tool: tool.to_string(),
            property: name.to_string(),
        }),
    }

    if param_type == ParamType::Array {
        match raw.get("items") {
            Some(items @ Value::Object(_)) => property.items = Some(items.clone()),
            _ => {
                diagnostics.push(SchemaDiagnostic::DefaultedItems {
                    tool: tool.to_string(),
                    property: name.to_string(),
                });
                property.items = Some(default_items());
            }
        }
    }

    property
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bridge(schema: Value) -> BridgedTool {
        bridge_tool("addNumbers", Some("Adds two numbers"), Some(&schema)).unwrap()
    }

    #[test]
    fn test_well_formed_schema_bridges_without_diagnostics() {
        let bridged = bridge(json!({
            "type": "object",
            "properties": {
                "a": {"type": "number", "description": "first"},
                "b": {"type": "number"}
            },
            "required": ["a", "b"]
        }));

        assert!(bridged.diagnostics.is_empty());
        let params = &bridged.descriptor.parameters;
        assert_eq!(params.properties["a"].param_type, ParamType::Number);
        assert_eq!(params.properties["a"].description.as_deref(), Some("first"));
        assert_eq!(params.required, vec!["a", "b"]);
    }

    #[test]
    fn test_missing_type_becomes_string() {
        let bridged = bridge(json!({"properties": {"x": {"description": "untyped"}}}));

        assert_eq!(
            bridged.descriptor.parameters.properties["x"].param_type,
            ParamType::String
        );
        assert_eq!(
            bridged.diagnostics,
            vec![SchemaDiagnostic::CoercedType {
                tool: "addNumbers".into(),
                property: "x".into(),
                found: None,
            }]
        );
    }

    #[test]
    fn test_unknown_type_is_coerced() {
        let bridged = bridge(json!({"properties": {"x": {"type": "null"}, "y": {"type": ["string", "null"]}}}));
        let props = &bridged.descriptor.parameters.properties;
        assert_eq!(props["x"].param_type, ParamType::String);
        assert_eq!(props["y"].param_type, ParamType::String);
        assert_eq!(bridged.diagnostics.len(), 2);
    }

    #[test]
    fn test_uppercase_type_is_accepted() {
        let bridged = bridge(json!({"properties": {"n": {"type": "INTEGER"}}}));
        assert_eq!(
            bridged.descriptor.parameters.properties["n"].param_type,
            ParamType::Integer
        );
        assert!(bridged.diagnostics.is_empty());
    }

    #[test]
    fn test_enum_kept_only_when_non_empty_list() {
        let bridged = bridge(json!({"properties": {
            "unit": {"type": "string", "enum": ["c", "f"]},
            "mode": {"type": "string", "enum": []},
            "kind": {"type": "string", "enum": "c"}
        }}));
        let props = &bridged.descriptor.parameters.properties;
        assert_eq!(props["unit"].enum_values, Some(vec![json!("c"), json!("f")]));
        assert!(props["mode"].enum_values.is_none());
        assert!(props["kind"].enum_values.is_none());
        assert_eq!(bridged.diagnostics.len(), 2);
    }

    #[test]
    fn test_array_items_default_and_passthrough() {
        let bridged = bridge(json!({"properties": {
            "tags": {"type": "array"},
            "ids": {"type": "array", "items": {"type": "integer"}}
        }}));
        let props = &bridged.descriptor.parameters.properties;
        assert_eq!(props["tags"].items, Some(json!({"type": "string"})));
        assert_eq!(props["ids"].items, Some(json!({"type": "integer"})));
        assert!(matches!(
            bridged.diagnostics.as_slice(),
            [SchemaDiagnostic::DefaultedItems { property, .. }] if property == "tags"
        ));
    }

    #[test]
    fn test_non_object_property_is_skipped() {
        let bridged = bridge(json!({"properties": {"ok": {"type": "string"}, "bad": 42}}));
        let props = &bridged.descriptor.parameters.properties;
        assert!(props.contains_key("ok"));
        assert!(!props.contains_key("bad"));
    }

    #[test]
    fn test_required_with_non_strings_is_dropped() {
        let bridged = bridge(json!({
            "properties": {"a": {"type": "string"}},
            "required": ["a", 1]
        }));
        assert!(bridged.descriptor.parameters.required.is_empty());
        assert!(
            bridged
                .diagnostics
                .contains(&SchemaDiagnostic::DroppedRequired { tool: "addNumbers".into() })
        );
    }

    #[test]
    fn test_required_undeclared_name_is_dropped() {
        let bridged = bridge(json!({
            "properties": {"a": {"type": "string"}},
            "required": ["a", "ghost"]
        }));
        assert_eq!(bridged.descriptor.parameters.required, vec!["a"]);
        assert!(bridged.diagnostics.contains(&SchemaDiagnostic::UndeclaredRequired {
            tool: "addNumbers".into(),
            name: "ghost".into(),
        }));
    }

    #[test]
    fn test_missing_or_malformed_schema_yields_no_parameters() {
        let bridged = bridge_tool("ping", Some("Ping"), None).unwrap();
        assert!(bridged.descriptor.parameters.is_empty());
        assert!(bridged.diagnostics.is_empty());

        let bridged = bridge_tool("ping", Some("Ping"), Some(&json!("nope"))).unwrap();
        assert!(bridged.descriptor.parameters.is_empty());
        assert_eq!(
            bridged.diagnostics,
            vec![SchemaDiagnostic::MalformedSchema { tool: "ping".into() }]
        );
    }

    #[test]
    fn test_description_preserved_or_placeholder() {
        let bridged = bridge_tool("echo", Some("Echo input"), None).unwrap();
        assert_eq!(bridged.descriptor.description, "Echo input");

        for missing in [None, Some(""), Some("   ")] {
            let bridged = bridge_tool("echo", missing, None).unwrap();
            assert_eq!(bridged.descriptor.description, "Tool to perform echo");
            assert!(matches!(
                bridged.diagnostics.as_slice(),
                [SchemaDiagnostic::PlaceholderDescription { .. }]
            ));
        }
    }

    #[test]
    fn test_description_is_kept_verbatim() {
        let raw = "  Adds two numbers.\n";
        let bridged = bridge_tool("addNumbers", Some(raw), None).unwrap();
        assert_eq!(bridged.descriptor.description, raw);
        assert!(bridged.diagnostics.is_empty());
    }

    #[test]
    fn test_unnamed_tool_is_rejected() {
        let err = bridge_tool("", Some("nothing"), None).unwrap_err();
        assert_eq!(err, SchemaDiagnostic::UnnamedTool);
    }
}

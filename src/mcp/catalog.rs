use crate::errors::{ErrorCode, McpError};
use crate::utils::suggest::suggest;
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Value>,
}

static TOOL_CATALOG: Lazy<Vec<ToolDef>> = Lazy::new(|| {
    let raw = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tool_catalog.json"));
    serde_json::from_str(raw).expect("tool_catalog.json must be valid JSON")
});

static TOOL_MAP: Lazy<HashMap<String, ToolDef>> = Lazy::new(|| {
    TOOL_CATALOG
        .iter()
        .cloned()
        .map(|tool| (tool.name.clone(), tool))
        .collect()
});

static TOOL_VALIDATORS: Lazy<HashMap<String, JSONSchema>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for tool in TOOL_CATALOG.iter() {
        if let Ok(schema) = JSONSchema::compile(&tool.input_schema) {
            map.insert(tool.name.clone(), schema);
        }
    }
    map
});

pub fn tool_catalog() -> &'static Vec<ToolDef> {
    &TOOL_CATALOG
}

pub fn tool_by_name(name: &str) -> Option<&'static ToolDef> {
    TOOL_MAP.get(name)
}

/// Catalog as advertised by `tools/list`.
pub fn list_tools() -> Vec<ToolDef> {
    TOOL_CATALOG
        .iter()
        .map(|tool| ToolDef {
            input_schema: normalize_schema_for_listing(&tool.input_schema),
            ..tool.clone()
        })
        .collect()
}

pub fn validate_tool_args(tool_name: &str, args: &Value) -> Result<(), McpError> {
    let Some(tool) = tool_by_name(tool_name) else {
        return Ok(());
    };
    let Some(schema) = TOOL_VALIDATORS.get(tool_name) else {
        return Ok(());
    };
    if let Err(errors) = schema.validate(args) {
        let message = format_schema_errors(tool_name, args, errors, &tool.input_schema);
        return Err(McpError::new(ErrorCode::InvalidParams, message));
    }
    Ok(())
}

fn format_schema_errors(
    tool_name: &str,
    args: &Value,
    errors: jsonschema::ErrorIterator,
    schema: &Value,
) -> String {
    let mut rendered = Vec::new();
    let mut did_you_means = Vec::new();
    let known_fields: Vec<String> = schema
        .get("properties")
        .and_then(|v| v.as_object())
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default();

    for err in errors.take(10) {
        let instance_path = err.instance_path.to_string();
        let location = if instance_path.is_empty() {
            "(root)".to_string()
        } else {
            instance_path.clone()
        };
        match &err.kind {
            jsonschema::error::ValidationErrorKind::AdditionalProperties { unexpected } => {
                for unknown in unexpected {
                    rendered.push(format!("{}: unknown field '{}'", location, unknown));
                    let suggestions = suggest(unknown, known_fields.iter().map(String::as_str), 3);
                    if !suggestions.is_empty() {
                        did_you_means.push(format!(
                            "field '{}': {}",
                            unknown,
                            suggestions.join(", ")
                        ));
                    }
                }
            }
            jsonschema::error::ValidationErrorKind::Enum { options } => {
                let allowed: Vec<String> = options
                    .as_array()
                    .map(|arr| {
                        arr.iter()
                            .map(|v| {
                                v.as_str()
                                    .map(|s| s.to_string())
                                    .unwrap_or_else(|| v.to_string())
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                rendered.push(format!(
                    "{}: expected one of {}",
                    location,
                    allowed.join(", ")
                ));
                let received = value_at(args, &instance_path);
                let received = received.as_str().unwrap_or("");
                let suggestions = suggest(received, allowed.iter().map(String::as_str), 3);
                if !suggestions.is_empty() {
                    did_you_means.push(format!("{}: {}", location, suggestions.join(", ")));
                }
            }
            jsonschema::error::ValidationErrorKind::Required { property } => {
                let prop = property
                    .as_str()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| property.to_string());
                rendered.push(format!("{}: missing required field '{}'", location, prop));
            }
            jsonschema::error::ValidationErrorKind::Type { kind } => {
                rendered.push(format!("{}: expected {}", location, format_type_kind(kind)));
            }
            _ => {
                rendered.push(format!("{}: {}", location, err));
            }
        }
    }

    let mut lines = vec![format!("Invalid arguments for {}", tool_name)];
    lines.extend(rendered.iter().map(|line| format!("- {}", line)));
    if !did_you_means.is_empty() {
        lines.push(format!(
            "Did you mean: {}",
            did_you_means
                .iter()
                .take(3)
                .cloned()
                .collect::<Vec<_>>()
                .join(" | ")
        ));
    }
    lines.join("\n")
}

fn format_type_kind(kind: &jsonschema::error::TypeKind) -> String {
    match kind {
        jsonschema::error::TypeKind::Single(primitive) => primitive.to_string(),
        jsonschema::error::TypeKind::Multiple(types) => {
            let list: Vec<String> = (*types).into_iter().map(|t| t.to_string()).collect();
            if list.is_empty() {
                "unknown".to_string()
            } else {
                list.join(" | ")
            }
        }
    }
}

fn value_at(root: &Value, instance_path: &str) -> Value {
    if instance_path.is_empty() {
        return root.clone();
    }
    root.pointer(instance_path).cloned().unwrap_or(Value::Null)
}

/// Rewrites `"type": [..]` unions as `anyOf`, which more tool-calling clients accept.
pub fn normalize_schema_for_listing(schema: &Value) -> Value {
    match schema {
        Value::Array(items) => Value::Array(items.iter().map(normalize_schema_for_listing).collect()),
        Value::Object(map) => {
            let mut out = map.clone();
            if let Some(props) = out.get("properties").and_then(|v| v.as_object()) {
                let normalized: serde_json::Map<String, Value> = props
                    .iter()
                    .map(|(key, value)| (key.clone(), normalize_schema_for_listing(value)))
                    .collect();
                out.insert("properties".to_string(), Value::Object(normalized));
            }
            if let Some(items) = out.get("items") {
                out.insert("items".to_string(), normalize_schema_for_listing(items));
            }
            if let Some(types) = out.get("type").and_then(|v| v.as_array()).cloned() {
                out.remove("type");
                let any_of = types
                    .iter()
                    .filter_map(|t| t.as_str())
                    .map(|t| serde_json::json!({ "type": t }))
                    .collect();
                out.insert("anyOf".to_string(), Value::Array(any_of));
            }
            Value::Object(out)
        }
        _ => schema.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn catalog_names_are_unique() {
        assert_eq!(tool_catalog().len(), TOOL_MAP.len());
    }

    #[test]
    fn every_catalog_schema_compiles() {
        assert_eq!(TOOL_VALIDATORS.len(), tool_catalog().len());
    }

    #[test]
    fn missing_required_field_is_reported() {
        let err = validate_tool_args("get_product", &json!({})).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParams);
        assert!(err.message.contains("missing required field 'product_id'"));
    }

    #[test]
    fn unknown_field_gets_a_suggestion() {
        let err = validate_tool_args("list_products", &json!({"page_sizes": "10"})).unwrap_err();
        assert!(err.message.contains("unknown field 'page_sizes'"));
        assert!(err.message.contains("page_size"));
    }

    #[test]
    fn enum_violation_lists_allowed_values() {
        let err = validate_tool_args(
            "list_sales",
            &json!({"start_date": "2024-01-01", "end_date": "2024-01-31", "status": "aproved"}),
        )
        .unwrap_err();
        assert!(err.message.contains("expected one of"));
        assert!(err.message.contains("Did you mean: /status: approved"));
    }

    #[test]
    fn listing_rewrites_type_unions() {
        let tool = list_tools()
            .into_iter()
            .find(|tool| tool.name == "list_products")
            .expect("list_products");
        let page_size = &tool.input_schema["properties"]["page_size"];
        assert!(page_size.get("type").is_none());
        assert_eq!(page_size["anyOf"][0]["type"], "string");
        assert_eq!(page_size["anyOf"][1]["type"], "integer");
    }
}

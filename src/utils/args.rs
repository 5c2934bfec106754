//! Accessors for tool arguments that have already passed schema validation.

use crate::errors::ToolError;
use serde_json::Value;
use url::Url;

pub fn optional_str(args: &Value, key: &str) -> Option<String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

pub fn required_str(args: &Value, key: &str) -> Result<String, ToolError> {
    optional_str(args, key)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ToolError::invalid_params(format!("{} is required", key)))
}

/// Paging values arrive as strings or integers; both go out as text.
pub fn optional_text(args: &Value, key: &str) -> Option<String> {
    match args.get(key)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Booleans travel as `"true"`/`"false"` in query strings.
pub fn optional_bool_string(args: &Value, key: &str) -> Option<String> {
    args.get(key).and_then(|v| v.as_bool()).map(|b| b.to_string())
}

pub fn required_uuid(args: &Value, key: &str) -> Result<String, ToolError> {
    let raw = required_str(args, key)?;
    uuid::Uuid::parse_str(raw.trim())
        .map(|id| id.hyphenated().to_string())
        .map_err(|_| {
            ToolError::invalid_params(format!("{} must be a UUID", key))
                .with_details(serde_json::json!({ "field": key, "value": raw }))
        })
}

pub fn optional_uuid(args: &Value, key: &str) -> Result<Option<String>, ToolError> {
    match optional_str(args, key) {
        Some(raw) if !raw.trim().is_empty() => required_uuid(args, key).map(Some),
        _ => Ok(None),
    }
}

pub fn required_url(args: &Value, key: &str) -> Result<String, ToolError> {
    let raw = required_str(args, key)?;
    let parsed = Url::parse(raw.trim()).map_err(|_| {
        ToolError::invalid_params(format!("{} must be a valid URL", key))
            .with_details(serde_json::json!({ "field": key, "value": raw }))
    })?;
    Ok(parsed.to_string())
}

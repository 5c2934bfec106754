use crate::errors::ToolError;
use crate::utils::suggest::suggest;

pub fn unknown_tool_error(tool: &str, known_tools: &[&str]) -> ToolError {
    let suggestions = suggest(tool, known_tools.iter().copied(), 5);
    let hint = if suggestions.is_empty() {
        "Call tools/list to see the available tools.".to_string()
    } else {
        format!(
            "Did you mean: {}? (or call tools/list for the full list)",
            suggestions.join(", ")
        )
    };
    ToolError::invalid_params(format!("Unknown tool: {}", tool))
        .with_hint(hint)
        .with_details(serde_json::json!({ "did_you_mean": suggestions }))
}

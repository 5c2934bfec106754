//! MCP `tools/call` result envelopes.

use serde_json::Value;

fn text_content(text: String) -> Value {
    serde_json::json!([{ "type": "text", "text": text }])
}

/// Successful payload, pretty-printed as a single text block.
pub fn tool_result(data: &Value) -> Value {
    let text = serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());
    serde_json::json!({ "content": text_content(text) })
}

/// Error-flagged text block; the call itself still succeeds at the protocol level.
pub fn tool_error(message: &str) -> Value {
    serde_json::json!({
        "isError": true,
        "content": text_content(message.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn result_is_pretty_printed_text() {
        let envelope = tool_result(&json!({"available": 236961}));
        assert!(envelope.get("isError").is_none());
        assert_eq!(envelope["content"][0]["type"], "text");
        assert_eq!(
            envelope["content"][0]["text"],
            "{\n  \"available\": 236961\n}"
        );
    }

    #[test]
    fn error_is_flagged() {
        let envelope = tool_error("Failed to get balance: boom");
        assert_eq!(envelope["isError"], true);
        assert_eq!(envelope["content"][0]["text"], "Failed to get balance: boom");
    }
}

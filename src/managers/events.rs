use crate::errors::ToolError;
use crate::services::gateway::ApiGateway;
use crate::services::logger::Logger;
use crate::utils::args::{
    optional_bool_string, optional_str, optional_text, optional_uuid, required_uuid,
};
use crate::utils::tool_errors::unknown_tool_error;
use serde_json::Value;
use std::sync::Arc;

const EVENT_TOOLS: &[&str] = &["list_event_participants"];

#[derive(Clone)]
pub struct EventManager {
    logger: Logger,
    gateway: Arc<ApiGateway>,
}

impl EventManager {
    pub fn new(logger: Logger, gateway: Arc<ApiGateway>) -> Self {
        Self {
            logger: logger.child("events"),
            gateway,
        }
    }

    pub async fn handle_tool(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        match tool {
            "list_event_participants" => self.list_participants(&args).await,
            _ => Err(unknown_tool_error(tool, EVENT_TOOLS)),
        }
    }

    async fn list_participants(&self, args: &Value) -> Result<Value, ToolError> {
        let product_id = required_uuid(args, "product_id")?;
        let query = [
            ("checked_in", optional_bool_string(args, "checked_in")),
            ("page_size", optional_text(args, "page_size")),
            ("page_number", optional_text(args, "page_number")),
            (
                "created_at_start_date",
                optional_str(args, "created_at_start_date"),
            ),
            (
                "created_at_end_date",
                optional_str(args, "created_at_end_date"),
            ),
            ("batch_id", optional_uuid(args, "batch_id")?),
            ("phone", optional_str(args, "phone")),
            ("cpf", optional_str(args, "cpf")),
            ("order_id", optional_uuid(args, "order_id")?),
        ];
        self.gateway
            .get_with_query(&format!("/events/{}/participants", product_id), &query)
            .await
            .map_err(|err| ToolError::upstream("list event participants", &err))
    }
}

#[async_trait::async_trait]
impl crate::services::tool_executor::ToolHandler for EventManager {
    fn tools(&self) -> &'static [&'static str] {
        EVENT_TOOLS
    }

    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.logger.debug(tool, None);
        self.handle_tool(tool, args).await
    }
}

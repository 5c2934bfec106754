use crate::errors::ToolError;
use crate::services::gateway::ApiGateway;
use crate::services::logger::Logger;
use crate::utils::args::{optional_text, required_uuid};
use crate::utils::tool_errors::unknown_tool_error;
use serde_json::Value;
use std::sync::Arc;

const PRODUCT_TOOLS: &[&str] = &["list_products", "get_product"];

#[derive(Clone)]
pub struct ProductManager {
    logger: Logger,
    gateway: Arc<ApiGateway>,
}

impl ProductManager {
    pub fn new(logger: Logger, gateway: Arc<ApiGateway>) -> Self {
        Self {
            logger: logger.child("products"),
            gateway,
        }
    }

    pub async fn handle_tool(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        match tool {
            "list_products" => self.list_products(&args).await,
            "get_product" => self.get_product(&args).await,
            _ => Err(unknown_tool_error(tool, PRODUCT_TOOLS)),
        }
    }

    async fn list_products(&self, args: &Value) -> Result<Value, ToolError> {
        let query = [
            ("page_size", optional_text(args, "page_size")),
            ("page_number", optional_text(args, "page_number")),
        ];
        self.gateway
            .get_with_query("/products", &query)
            .await
            .map_err(|err| ToolError::upstream("list products", &err))
    }

    async fn get_product(&self, args: &Value) -> Result<Value, ToolError> {
        let product_id = required_uuid(args, "product_id")?;
        self.gateway
            .get(&format!("/products/{}", product_id))
            .await
            .map_err(|err| ToolError::upstream("get product", &err))
    }
}

#[async_trait::async_trait]
impl crate::services::tool_executor::ToolHandler for ProductManager {
    fn tools(&self) -> &'static [&'static str] {
        PRODUCT_TOOLS
    }

    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.logger.debug(tool, None);
        self.handle_tool(tool, args).await
    }
}

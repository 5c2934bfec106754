use crate::errors::ToolError;
use crate::services::gateway::ApiGateway;
use crate::services::logger::Logger;
use crate::utils::args::{
    optional_bool_string, optional_str, optional_text, optional_uuid, required_uuid,
};
use crate::utils::tool_errors::unknown_tool_error;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;

const SALES_TOOLS: &[&str] = &["list_sales", "get_sale", "refund_sale", "get_sales_stats"];

#[derive(Clone)]
pub struct SalesManager {
    logger: Logger,
    gateway: Arc<ApiGateway>,
}

impl SalesManager {
    pub fn new(logger: Logger, gateway: Arc<ApiGateway>) -> Self {
        Self {
            logger: logger.child("sales"),
            gateway,
        }
    }

    pub async fn handle_tool(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        match tool {
            "list_sales" => self.list_sales(&args).await,
            "get_sale" => self.get_sale(&args).await,
            "refund_sale" => self.refund_sale(&args).await,
            "get_sales_stats" => self.get_sales_stats(&args).await,
            _ => Err(unknown_tool_error(tool, SALES_TOOLS)),
        }
    }

    async fn list_sales(&self, args: &Value) -> Result<Value, ToolError> {
        let query = [
            ("start_date", optional_str(args, "start_date")),
            ("end_date", optional_str(args, "end_date")),
            ("status", optional_str(args, "status")),
            ("payment_method", optional_str(args, "payment_method")),
            ("product_id", optional_uuid(args, "product_id")?),
            ("affiliate_id", optional_uuid(args, "affiliate_id")?),
            (
                "view_full_sale_details",
                optional_bool_string(args, "view_full_sale_details"),
            ),
            ("page_size", optional_text(args, "page_size")),
            ("page_number", optional_text(args, "page_number")),
        ];
        self.gateway
            .get_with_query("/sales", &query)
            .await
            .map_err(|err| ToolError::upstream("list sales", &err))
    }

    async fn get_sale(&self, args: &Value) -> Result<Value, ToolError> {
        let sale_id = required_uuid(args, "sale_id")?;
        self.gateway
            .get(&format!("/sales/{}", sale_id))
            .await
            .map_err(|err| ToolError::upstream("get sale", &err))
    }

    async fn refund_sale(&self, args: &Value) -> Result<Value, ToolError> {
        let sale_id = required_uuid(args, "sale_id")?;
        let body = optional_str(args, "pix_key")
            .filter(|key| !key.is_empty())
            .map(|key| serde_json::json!({ "pixKey": key }));
        self.gateway
            .request(
                &format!("/sales/{}/refund", sale_id),
                Method::POST,
                body.as_ref(),
                None,
            )
            .await
            .map_err(|err| ToolError::upstream("refund sale", &err))
    }

    async fn get_sales_stats(&self, args: &Value) -> Result<Value, ToolError> {
        let query = [
            ("product_id", optional_uuid(args, "product_id")?),
            ("start_date", optional_str(args, "start_date")),
            ("end_date", optional_str(args, "end_date")),
        ];
        self.gateway
            .get_with_query("/stats", &query)
            .await
            .map_err(|err| ToolError::upstream("get sales stats", &err))
    }
}

#[async_trait::async_trait]
impl crate::services::tool_executor::ToolHandler for SalesManager {
    fn tools(&self) -> &'static [&'static str] {
        SALES_TOOLS
    }

    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.logger.debug(tool, None);
        self.handle_tool(tool, args).await
    }
}

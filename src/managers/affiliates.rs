use crate::errors::ToolError;
use crate::services::gateway::ApiGateway;
use crate::services::logger::Logger;
use crate::utils::args::{optional_str, optional_text, optional_uuid, required_uuid};
use crate::utils::tool_errors::unknown_tool_error;
use reqwest::Method;
use serde_json::{Map, Value};
use std::sync::Arc;

const AFFILIATE_TOOLS: &[&str] = &["list_affiliates", "get_affiliate", "edit_affiliate"];
const DEFAULT_PAGE_SIZE: &str = "100";

#[derive(Clone)]
pub struct AffiliateManager {
    logger: Logger,
    gateway: Arc<ApiGateway>,
}

impl AffiliateManager {
    pub fn new(logger: Logger, gateway: Arc<ApiGateway>) -> Self {
        Self {
            logger: logger.child("affiliates"),
            gateway,
        }
    }

    pub async fn handle_tool(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        match tool {
            "list_affiliates" => self.list_affiliates(&args).await,
            "get_affiliate" => self.get_affiliate(&args).await,
            "edit_affiliate" => self.edit_affiliate(&args).await,
            _ => Err(unknown_tool_error(tool, AFFILIATE_TOOLS)),
        }
    }

    async fn list_affiliates(&self, args: &Value) -> Result<Value, ToolError> {
        let page_size =
            optional_text(args, "page_size").or_else(|| Some(DEFAULT_PAGE_SIZE.to_string()));
        let query = [
            ("status", optional_str(args, "status")),
            ("product_id", optional_uuid(args, "product_id")?),
            ("search", optional_str(args, "search")),
            ("page_size", page_size),
            ("page_number", optional_text(args, "page_number")),
        ];
        self.gateway
            .get_with_query("/affiliates", &query)
            .await
            .map_err(|err| ToolError::upstream("list affiliates", &err))
    }

    async fn get_affiliate(&self, args: &Value) -> Result<Value, ToolError> {
        let affiliate_id = required_uuid(args, "affiliate_id")?;
        self.gateway
            .get(&format!("/affiliates/{}", affiliate_id))
            .await
            .map_err(|err| ToolError::upstream("get affiliate", &err))
    }

    async fn edit_affiliate(&self, args: &Value) -> Result<Value, ToolError> {
        let affiliate_id = required_uuid(args, "affiliate_id")?;
        let mut body = Map::new();
        if let Some(commission) = args.get("commission").filter(|v| v.is_number()) {
            body.insert("commission".to_string(), commission.clone());
        }
        if let Some(status) = optional_str(args, "status") {
            body.insert("status".to_string(), Value::String(status));
        }
        self.gateway
            .request(
                &format!("/affiliates/{}", affiliate_id),
                Method::PUT,
                Some(&Value::Object(body)),
                None,
            )
            .await
            .map_err(|err| ToolError::upstream("edit affiliate", &err))
    }
}

#[async_trait::async_trait]
impl crate::services::tool_executor::ToolHandler for AffiliateManager {
    fn tools(&self) -> &'static [&'static str] {
        AFFILIATE_TOOLS
    }

    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.logger.debug(tool, None);
        self.handle_tool(tool, args).await
    }
}

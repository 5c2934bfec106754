use crate::errors::ToolError;
use crate::services::gateway::ApiGateway;
use crate::services::logger::Logger;
use crate::utils::args::{optional_text, optional_uuid};
use crate::utils::tool_errors::unknown_tool_error;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;

const FINANCE_TOOLS: &[&str] = &["get_balance", "list_payouts", "create_payout"];

#[derive(Clone)]
pub struct FinanceManager {
    logger: Logger,
    gateway: Arc<ApiGateway>,
}

impl FinanceManager {
    pub fn new(logger: Logger, gateway: Arc<ApiGateway>) -> Self {
        Self {
            logger: logger.child("finance"),
            gateway,
        }
    }

    pub async fn handle_tool(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        match tool {
            "get_balance" => self
                .gateway
                .get("/balance")
                .await
                .map_err(|err| ToolError::upstream("get balance", &err)),
            "list_payouts" => self.list_payouts(&args).await,
            "create_payout" => self.create_payout(&args).await,
            _ => Err(unknown_tool_error(tool, FINANCE_TOOLS)),
        }
    }

    async fn list_payouts(&self, args: &Value) -> Result<Value, ToolError> {
        let query = [
            ("legal_entity_id", optional_uuid(args, "legal_entity_id")?),
            ("page_size", optional_text(args, "page_size")),
            ("page_number", optional_text(args, "page_number")),
        ];
        self.gateway
            .get_with_query("/payouts", &query)
            .await
            .map_err(|err| ToolError::upstream("list payouts", &err))
    }

    async fn create_payout(&self, args: &Value) -> Result<Value, ToolError> {
        let amount = args
            .get("amount")
            .filter(|v| v.as_f64().map(|n| n > 0.0).unwrap_or(false))
            .cloned()
            .ok_or_else(|| ToolError::invalid_params("amount must be a positive number"))?;
        // Trailing slash is what the payouts endpoint expects for creation.
        self.gateway
            .request(
                "/payouts/",
                Method::POST,
                Some(&serde_json::json!({ "amount": amount })),
                None,
            )
            .await
            .map_err(|err| ToolError::upstream("create payout", &err))
    }
}

#[async_trait::async_trait]
impl crate::services::tool_executor::ToolHandler for FinanceManager {
    fn tools(&self) -> &'static [&'static str] {
        FINANCE_TOOLS
    }

    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.logger.debug(tool, None);
        self.handle_tool(tool, args).await
    }
}

use crate::errors::ToolError;
use crate::services::gateway::ApiGateway;
use crate::services::logger::Logger;
use crate::utils::tool_errors::unknown_tool_error;
use serde_json::Value;
use std::sync::Arc;

const ACCOUNT_TOOLS: &[&str] = &["get_account_details"];

#[derive(Clone)]
pub struct AccountManager {
    logger: Logger,
    gateway: Arc<ApiGateway>,
}

impl AccountManager {
    pub fn new(logger: Logger, gateway: Arc<ApiGateway>) -> Self {
        Self {
            logger: logger.child("account"),
            gateway,
        }
    }

    pub async fn handle_tool(&self, tool: &str, _args: Value) -> Result<Value, ToolError> {
        match tool {
            "get_account_details" => self
                .gateway
                .get("/account-details")
                .await
                .map_err(|err| ToolError::upstream("get account details", &err)),
            _ => Err(unknown_tool_error(tool, ACCOUNT_TOOLS)),
        }
    }
}

#[async_trait::async_trait]
impl crate::services::tool_executor::ToolHandler for AccountManager {
    fn tools(&self) -> &'static [&'static str] {
        ACCOUNT_TOOLS
    }

    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.logger.debug(tool, None);
        self.handle_tool(tool, args).await
    }
}

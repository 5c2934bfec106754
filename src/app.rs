use crate::config::Config;
use crate::constants::api;
use crate::errors::ToolError;
use crate::managers;
use crate::mcp::catalog::tool_catalog;
use crate::services::gateway::ApiGateway;
use crate::services::logger::Logger;
use crate::services::token_manager::TokenManager;
use crate::services::tool_executor::{ToolExecutor, ToolHandler};
use reqwest::Client;
use std::sync::Arc;

pub struct App {
    pub logger: Logger,
    pub tool_executor: Arc<ToolExecutor>,
}

impl App {
    fn validate_tool_wiring(executor: &ToolExecutor) -> Result<(), ToolError> {
        let mut missing: Vec<String> = tool_catalog()
            .iter()
            .filter(|tool| !executor.has_tool(&tool.name))
            .map(|tool| tool.name.clone())
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        missing.sort();
        Err(ToolError::internal("Tool wiring is incomplete")
            .with_hint(
                "Every tool in tool_catalog.json must be served by a handler.".to_string(),
            )
            .with_details(serde_json::json!({ "missing_tools": missing })))
    }

    pub fn initialize(config: &Config, logger: Logger) -> Result<Self, ToolError> {
        let client = Client::builder()
            .user_agent(api::USER_AGENT)
            .build()
            .map_err(|err| ToolError::internal(format!("Failed to build HTTP client: {}", err)))?;
        let tokens = Arc::new(TokenManager::new(logger.clone(), client.clone(), config));
        let gateway = Arc::new(ApiGateway::new(logger.clone(), client, config, tokens));
        Self::with_gateway(logger, gateway)
    }

    pub fn with_gateway(logger: Logger, gateway: Arc<ApiGateway>) -> Result<Self, ToolError> {
        let groups: Vec<Arc<dyn ToolHandler>> = vec![
            Arc::new(managers::account::AccountManager::new(
                logger.clone(),
                gateway.clone(),
            )),
            Arc::new(managers::products::ProductManager::new(
                logger.clone(),
                gateway.clone(),
            )),
            Arc::new(managers::sales::SalesManager::new(
                logger.clone(),
                gateway.clone(),
            )),
            Arc::new(managers::affiliates::AffiliateManager::new(
                logger.clone(),
                gateway.clone(),
            )),
            Arc::new(managers::finance::FinanceManager::new(
                logger.clone(),
                gateway.clone(),
            )),
            Arc::new(managers::webhooks::WebhookManager::new(
                logger.clone(),
                gateway.clone(),
            )),
            Arc::new(managers::events::EventManager::new(
                logger.clone(),
                gateway,
            )),
        ];
        let tool_executor = ToolExecutor::new(logger.clone(), groups);
        Self::validate_tool_wiring(&tool_executor)?;

        Ok(Self {
            logger,
            tool_executor: Arc::new(tool_executor),
        })
    }
}

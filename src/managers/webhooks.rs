use crate::errors::ToolError;
use crate::services::gateway::ApiGateway;
use crate::services::logger::Logger;
use crate::utils::args::{
    optional_str, optional_text, optional_uuid, required_str, required_url, required_uuid,
};
use crate::utils::tool_errors::unknown_tool_error;
use reqwest::Method;
use serde_json::{Map, Value};
use std::sync::Arc;

const WEBHOOK_TOOLS: &[&str] = &["list_webhooks", "create_webhook", "delete_webhook"];

pub const WEBHOOK_TRIGGERS: &[&str] = &[
    "boleto_gerado",
    "pix_gerado",
    "carrinho_abandonado",
    "compra_recusada",
    "compra_aprovada",
    "compra_reembolsada",
    "chargeback",
    "subscription_canceled",
    "subscription_late",
    "subscription_renewed",
];

#[derive(Clone)]
pub struct WebhookManager {
    logger: Logger,
    gateway: Arc<ApiGateway>,
}

impl WebhookManager {
    pub fn new(logger: Logger, gateway: Arc<ApiGateway>) -> Self {
        Self {
            logger: logger.child("webhooks"),
            gateway,
        }
    }

    pub async fn handle_tool(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        match tool {
            "list_webhooks" => self.list_webhooks(&args).await,
            "create_webhook" => self.create_webhook(&args).await,
            "delete_webhook" => self.delete_webhook(&args).await,
            _ => Err(unknown_tool_error(tool, WEBHOOK_TOOLS)),
        }
    }

    async fn list_webhooks(&self, args: &Value) -> Result<Value, ToolError> {
        let query = [
            ("product_id", optional_uuid(args, "product_id")?),
            ("search", optional_str(args, "search")),
            ("page_size", optional_text(args, "page_size")),
            ("page_number", optional_text(args, "page_number")),
        ];
        self.gateway
            .get_with_query("/webhooks", &query)
            .await
            .map_err(|err| ToolError::upstream("list webhooks", &err))
    }

    async fn create_webhook(&self, args: &Value) -> Result<Value, ToolError> {
        let mut body = Map::new();
        body.insert("name".to_string(), Value::String(required_str(args, "name")?));
        body.insert("url".to_string(), Value::String(required_url(args, "url")?));
        body.insert(
            "products".to_string(),
            Value::String(required_str(args, "products")?),
        );
        body.insert("triggers".to_string(), Value::Array(triggers(args)?));
        if let Some(token) = optional_str(args, "token").filter(|t| !t.is_empty()) {
            body.insert("token".to_string(), Value::String(token));
        }
        self.gateway
            .request("/webhooks", Method::POST, Some(&Value::Object(body)), None)
            .await
            .map_err(|err| ToolError::upstream("create webhook", &err))
    }

    async fn delete_webhook(&self, args: &Value) -> Result<Value, ToolError> {
        let webhook_id = required_uuid(args, "webhook_id")?;
        self.gateway
            .request(
                &format!("/webhooks/{}", webhook_id),
                Method::DELETE,
                None,
                None,
            )
            .await
            .map_err(|err| ToolError::upstream("delete webhook", &err))?;
        Ok(serde_json::json!({ "deleted": true }))
    }
}

fn triggers(args: &Value) -> Result<Vec<Value>, ToolError> {
    let list = args
        .get("triggers")
        .and_then(|v| v.as_array())
        .filter(|arr| !arr.is_empty())
        .ok_or_else(|| ToolError::invalid_params("triggers must list at least one trigger"))?;
    let mut out = Vec::with_capacity(list.len());
    for item in list {
        match item.as_str() {
            Some(name) if WEBHOOK_TRIGGERS.contains(&name) => out.push(item.clone()),
            _ => {
                return Err(ToolError::invalid_params(format!(
                    "Unknown webhook trigger: {}",
                    item
                ))
                .with_hint(format!("Use one of: {}.", WEBHOOK_TRIGGERS.join(", "))))
            }
        }
    }
    Ok(out)
}

#[async_trait::async_trait]
impl crate::services::tool_executor::ToolHandler for WebhookManager {
    fn tools(&self) -> &'static [&'static str] {
        WEBHOOK_TOOLS
    }

    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.logger.debug(tool, None);
        self.handle_tool(tool, args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn triggers_must_be_known() {
        let ok = json!({"triggers": ["compra_aprovada", "chargeback"]});
        assert_eq!(triggers(&ok).expect("valid").len(), 2);

        let unknown = json!({"triggers": ["compra_aprovada", "sale_approved"]});
        let err = triggers(&unknown).unwrap_err();
        assert!(err.message.contains("sale_approved"));

        assert!(triggers(&json!({"triggers": []})).is_err());
    }
}

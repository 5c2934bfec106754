use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::utils::tool_errors::unknown_tool_error;

use serde_json::Value;

/// A group of tools served by one handler; dispatch is on the tool name.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn tools(&self) -> &'static [&'static str];

    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError>;
}

#[derive(Clone)]
pub struct ToolExecutor {
    logger: Logger,
    handlers: Arc<HashMap<&'static str, Arc<dyn ToolHandler>>>,
}

impl ToolExecutor {
    pub fn new(logger: Logger, groups: Vec<Arc<dyn ToolHandler>>) -> Self {
        let mut handlers: HashMap<&'static str, Arc<dyn ToolHandler>> = HashMap::new();
        for group in groups {
            for tool in group.tools() {
                handlers.insert(*tool, group.clone());
            }
        }
        Self {
            logger: logger.child("executor"),
            handlers: Arc::new(handlers),
        }
    }

    pub fn has_tool(&self, tool: &str) -> bool {
        self.handlers.contains_key(tool)
    }

    pub fn tool_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub async fn execute(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        let Some(handler) = self.handlers.get(tool) else {
            return Err(unknown_tool_error(tool, &self.tool_names()));
        };

        let started = Instant::now();
        let result = handler.handle(tool, args).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => self.logger.debug(
                tool,
                Some(&serde_json::json!({ "status": "ok", "duration_ms": duration_ms })),
            ),
            Err(err) => self.logger.warn(
                tool,
                Some(&serde_json::json!({
                    "status": "error",
                    "code": err.code,
                    "message": err.message,
                    "duration_ms": duration_ms,
                })),
            ),
        }
        result
    }
}

use crate::app::App;
use crate::config::Config;
use crate::constants::server;
use crate::errors::{ErrorCode, McpError, ToolError, ToolErrorKind};
use crate::mcp::catalog::{list_tools, validate_tool_args};
use crate::mcp::envelope::{tool_error, tool_result};
use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse, ToolCallParams};
use crate::services::logger::Logger;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

fn map_tool_error(tool: &str, error: &ToolError) -> McpError {
    let mut lines = vec![format!("{} ({}): {}", tool, error.code, error.message)];
    if let Some(hint) = &error.hint {
        lines.push(format!("hint: {}", hint));
    }
    let message = lines.join("\n");
    match error.kind {
        ToolErrorKind::InvalidParams => McpError::new(ErrorCode::InvalidParams, message),
        _ => McpError::new(ErrorCode::InternalError, message),
    }
}

pub struct McpServer {
    app: Arc<App>,
    logger: Logger,
}

impl McpServer {
    pub fn new(app: App) -> Self {
        let logger = app.logger.child("mcp");
        Self {
            app: Arc::new(app),
            logger,
        }
    }

    fn handle_initialize(&self) -> Value {
        serde_json::json!({
            "protocolVersion": server::PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": { "name": server::NAME, "version": server::VERSION },
        })
    }

    fn handle_tools_list(&self) -> Value {
        serde_json::json!({ "tools": list_tools() })
    }

    async fn handle_tools_call(&self, params: Value) -> Result<Value, McpError> {
        let params: ToolCallParams = serde_json::from_value(params)
            .map_err(|err| McpError::new(ErrorCode::InvalidParams, err.to_string()))?;
        let name = params.name.trim();
        if name.is_empty() {
            return Err(McpError::new(ErrorCode::InvalidParams, "Missing tool name"));
        }
        let args = match params.arguments {
            None | Some(Value::Null) => Value::Object(Default::default()),
            Some(args) => args,
        };

        validate_tool_args(name, &args)?;

        match self.app.tool_executor.execute(name, args).await {
            Ok(result) => Ok(tool_result(&result)),
            Err(err) if err.kind == ToolErrorKind::Upstream => Ok(tool_error(&err.message)),
            Err(err) => Err(map_tool_error(name, &err)),
        }
    }

    async fn dispatch(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::failure(
                request.id.unwrap_or(Value::Null),
                ErrorCode::InvalidRequest.as_i32(),
                "Invalid request".to_string(),
            ));
        }
        // Notifications never get a response.
        let id = request.id?;
        let outcome = match request.method.as_str() {
            "initialize" => Ok(self.handle_initialize()),
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => Ok(self.handle_tools_list()),
            "tools/call" => self.handle_tools_call(request.params).await,
            method if method.starts_with("notifications/") => Ok(serde_json::json!({})),
            _ => Err(McpError::new(ErrorCode::MethodNotFound, "Method not found")),
        };
        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => JsonRpcResponse::from_error(id, err),
        })
    }

    /// Handles one protocol line; `None` means nothing is written back.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        let parsed: Value = match serde_json::from_str(trimmed) {
            Ok(value) => value,
            Err(_) => {
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    ErrorCode::ParseError.as_i32(),
                    "Parse error".to_string(),
                ))
            }
        };
        let id = parsed.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<JsonRpcRequest>(parsed) {
            Ok(request) => self.dispatch(request).await,
            Err(_) => Some(JsonRpcResponse::failure(
                id,
                ErrorCode::InvalidRequest.as_i32(),
                "Invalid request".to_string(),
            )),
        }
    }

    pub async fn serve<R, W>(&self, input: R, output: W) -> Result<(), ToolError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut reader = BufReader::new(input).lines();
        let mut writer = BufWriter::new(output);

        while let Some(line) = reader.next_line().await? {
            let Some(response) = self.handle_line(&line).await else {
                continue;
            };
            let payload = serde_json::to_string(&response)
                .map_err(|err| ToolError::internal(err.to_string()))?;
            writer.write_all(payload.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        self.logger.debug("input closed", None);
        Ok(())
    }

    pub async fn run_stdio(&self) -> Result<(), ToolError> {
        self.logger.info(
            &format!("{} server running on stdio", server::NAME),
            None,
        );
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }
}

pub async fn run_stdio(config: &Config, logger: Logger) -> Result<(), ToolError> {
    let app = App::initialize(config, logger)?;
    McpServer::new(app).run_stdio().await
}

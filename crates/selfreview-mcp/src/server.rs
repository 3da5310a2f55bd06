//! MCP server implementation.
//!
//! The server handles the MCP protocol lifecycle:
//! 1. Initialize - exchange capabilities
//! 2. Handle tool calls - one at a time, through the tool handler
//! 3. Shutdown - on EOF or when the shutdown future resolves

use std::future::Future;
use std::io;

use selfreview_core::Result;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::handlers::ToolHandler;
use crate::protocol::{
    InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId,
    ServerCapabilities, ServerInfo, ToolCallParams, ToolsCapability, ToolsListResult, MCP_VERSION,
};
use crate::transport::{IncomingMessage, Transport};

/// Name reported in the initialize handshake.
pub const SERVER_NAME: &str = "selfreview";

/// MCP server for selfreview.
pub struct McpServer {
    handler: ToolHandler,
    initialized: bool,
}

impl McpServer {
    /// Create a new MCP server around a tool handler.
    pub fn new(handler: ToolHandler) -> Self {
        Self {
            handler,
            initialized: false,
        }
    }

    /// Whether the client has completed the initialize handshake.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the MCP server main loop until EOF or shutdown.
    ///
    /// The shutdown future is raced against both the next read and the
    /// request being handled. A request still in flight when it resolves is
    /// dropped, which aborts its outstanding HTTP calls, and the client gets
    /// an internal error for it.
    pub async fn run<R, W, S>(&mut self, transport: &mut Transport<R, W>, shutdown: S) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
        S: Future<Output = ()>,
    {
        tracing::info!(
            "Starting MCP server with {} tools",
            self.handler.available_tools().len()
        );

        tokio::pin!(shutdown);

        loop {
            let incoming = tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested");
                    break;
                }
                incoming = transport.read_message() => incoming,
            };

            let msg = match incoming {
                Ok(Some(msg)) => msg,
                Ok(None) => {
                    tracing::info!("EOF received, shutting down");
                    break;
                }
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    let error_resp = JsonRpcResponse::error(
                        RequestId::Null,
                        JsonRpcError::parse_error(&e.to_string()),
                    );
                    transport.write_response(&error_resp).await?;
                    continue;
                }
                Err(e) => {
                    tracing::error!("Transport error: {}", e);
                    return Err(e.into());
                }
            };

            let pending_id = match &msg {
                IncomingMessage::Request(req) => Some(req.id.clone()),
                IncomingMessage::Notification(_) => None,
            };

            let response = tokio::select! {
                response = self.handle_message(msg) => response,
                _ = &mut shutdown => {
                    tracing::warn!("Shutdown requested, cancelling in-flight request");
                    if let Some(id) = pending_id {
                        let cancelled = JsonRpcResponse::error(
                            id,
                            JsonRpcError::internal_error("server shutting down"),
                        );
                        if let Err(e) = transport.write_response(&cancelled).await {
                            tracing::debug!("Could not report cancelled request: {}", e);
                        }
                    }
                    break;
                }
            };

            if let Some(resp) = response {
                if let Err(e) = transport.write_response(&resp).await {
                    tracing::error!("Failed to write response: {}", e);
                    return Err(e.into());
                }
            }
        }

        tracing::info!("MCP server stopped");
        Ok(())
    }

    /// Handle an incoming message.
    async fn handle_message(&mut self, msg: IncomingMessage) -> Option<JsonRpcResponse> {
        match msg {
            IncomingMessage::Request(req) => Some(self.handle_request(req).await),
            IncomingMessage::Notification(notif) => {
                self.handle_notification(&notif.method);
                None
            }
        }
    }

    /// Handle a JSON-RPC request.
    async fn handle_request(&mut self, req: JsonRpcRequest) -> JsonRpcResponse {
        tracing::debug!("Handling request: {} (id: {:?})", req.method, req.id);

        match req.method.as_str() {
            "initialize" => self.handle_initialize(req.id, req.params),
            "tools/list" => self.handle_tools_list(req.id),
            "tools/call" => self.handle_tools_call(req.id, req.params).await,
            "ping" => self.handle_ping(req.id),
            method => {
                tracing::warn!("Unknown method: {}", method);
                JsonRpcResponse::error(req.id, JsonRpcError::method_not_found(method))
            }
        }
    }

    /// Handle notifications (no response).
    fn handle_notification(&mut self, method: &str) {
        match method {
            "initialized" | "notifications/initialized" => {
                tracing::info!("Client initialized");
            }
            "notifications/cancelled" => {
                tracing::debug!("Request cancelled by client");
            }
            _ => {
                tracing::debug!("Ignoring notification: {}", method);
            }
        }
    }

    /// Handle initialize request.
    fn handle_initialize(&mut self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        if self.initialized {
            return JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request("Server already initialized"),
            );
        }

        if let Some(params) = params {
            match serde_json::from_value::<InitializeParams>(params) {
                Ok(init_params) => {
                    tracing::info!(
                        "Client: {} v{} (protocol: {})",
                        init_params.client_info.name,
                        init_params.client_info.version,
                        init_params.protocol_version
                    );
                }
                Err(e) => {
                    tracing::warn!("Failed to parse initialize params: {}", e);
                }
            }
        }

        self.initialized = true;

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        JsonRpcResponse::from_result(id, &result)
    }

    /// Handle tools/list request.
    fn handle_tools_list(&self, id: RequestId) -> JsonRpcResponse {
        let result = ToolsListResult {
            tools: self.handler.available_tools(),
        };
        JsonRpcResponse::from_result(id, &result)
    }

    /// Handle tools/call request.
    async fn handle_tools_call(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        JsonRpcError::invalid_params(&e.to_string()),
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(id, JsonRpcError::invalid_params("Missing params"));
            }
        };

        tracing::info!("Calling tool: {}", params.name);

        let result = self.handler.execute(&params.name, params.arguments).await;
        JsonRpcResponse::from_result(id, &result)
    }

    /// Handle ping request.
    fn handle_ping(&self, id: RequestId) -> JsonRpcResponse {
        JsonRpcResponse::success(id, serde_json::json!({}))
    }
}

//! MCP client side: start server processes, enumerate and invoke their
//! tools, resources and prompts.
//!
//! ```rust,ignore
//! let client = McpClient::spawn("booking", &McpServerConfig::builtin("booking")).await?;
//! for tool in client.list_tools().await? {
//!     println!("{}", tool.name);
//! }
//! let text = client.call_tool_text("get_all_turfs", json!({})).await?;
//! client.close().await?;
//! ```

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, GetPromptRequestParam, GetPromptResult, JsonObject,
    Prompt, PromptMessageContent, ReadResourceRequestParam, Resource, ResourceContents,
    ResourceTemplate, ServerInfo, Tool as McpToolInfo,
};
use rmcp::service::{Peer, RunningService};
use rmcp::transport::{ConfigureCommandExt, IntoTransport, TokioChildProcess};
use rmcp::{RoleClient, ServiceExt};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::from_service_error;
use crate::tools::{Tool, ToolRegistry};
use crate::types::{AppError, Result};
use crate::utils::toml_config::McpServerConfig;

fn to_arguments(args: Value) -> Result<Option<JsonObject>> {
    match args {
        Value::Null => Ok(None),
        Value::Object(map) if map.is_empty() => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        other => Err(AppError::Validation(format!(
            "Tool arguments must be a JSON object, got {}",
            other
        ))),
    }
}

/// Concatenated text content of a tool result.
pub fn result_text(result: &CallToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|c| c.as_text().map(|t| t.text.clone()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text of the first message of a rendered prompt.
pub fn prompt_text(result: &GetPromptResult) -> Option<String> {
    result.messages.first().and_then(|m| match &m.content {
        PromptMessageContent::Text { text } => Some(text.clone()),
        _ => None,
    })
}

/// One connected MCP server.
pub struct McpClient {
    name: String,
    service: RunningService<RoleClient, ()>,
}

impl McpClient {
    /// Start the server process and complete the MCP handshake.
    pub async fn spawn(name: &str, config: &McpServerConfig) -> Result<Self> {
        debug!(server = name, command = %config.command, args = ?config.args, "spawning MCP server");

        let command = tokio::process::Command::new(&config.command).configure(|cmd| {
            cmd.args(&config.args).envs(&config.env);
        });
        let transport = TokioChildProcess::new(command).map_err(|e| {
            AppError::Upstream(format!(
                "Failed to start MCP server '{}' ({}): {}",
                name, config.command, e
            ))
        })?;

        Self::connect(name, transport).await
    }

    /// Handshake over an arbitrary transport (child process, duplex pipe).
    pub async fn connect<T, E, A>(name: &str, transport: T) -> Result<Self>
    where
        T: IntoTransport<RoleClient, E, A>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let service = ().serve(transport).await.map_err(|e| {
            AppError::Upstream(format!("Failed to connect to MCP server '{}': {}", name, e))
        })?;

        if let Some(info) = service.peer_info() {
            info!(
                server = name,
                remote = %info.server_info.name,
                version = %info.server_info.version,
                "connected to MCP server"
            );
        }

        Ok(Self {
            name: name.to_string(),
            service,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn server_info(&self) -> Option<&ServerInfo> {
        self.service.peer_info()
    }

    pub fn peer(&self) -> Peer<RoleClient> {
        self.service.peer().clone()
    }

    pub async fn list_tools(&self) -> Result<Vec<McpToolInfo>> {
        self.service
            .list_all_tools()
            .await
            .map_err(from_service_error)
    }

    pub async fn list_resources(&self) -> Result<Vec<Resource>> {
        self.service
            .list_all_resources()
            .await
            .map_err(from_service_error)
    }

    pub async fn list_resource_templates(&self) -> Result<Vec<ResourceTemplate>> {
        self.service
            .list_all_resource_templates()
            .await
            .map_err(from_service_error)
    }

    pub async fn list_prompts(&self) -> Result<Vec<Prompt>> {
        self.service
            .list_all_prompts()
            .await
            .map_err(from_service_error)
    }

    pub async fn call_tool(&self, name: &str, args: Value) -> Result<CallToolResult> {
        call_tool(&self.service, name, args).await
    }

    /// Call a tool and return its text. A result flagged as an error
    /// becomes [`AppError::Upstream`] carrying the server's text.
    pub async fn call_tool_text(&self, name: &str, args: Value) -> Result<String> {
        let result = self.call_tool(name, args).await?;
        let text = result_text(&result);
        if result.is_error == Some(true) {
            return Err(AppError::Upstream(text));
        }
        Ok(text)
    }

    pub async fn read_resource(&self, uri: &str) -> Result<String> {
        let result = self
            .service
            .read_resource(ReadResourceRequestParam {
                uri: uri.to_string(),
            })
            .await
            .map_err(from_service_error)?;

        Ok(result
            .contents
            .into_iter()
            .filter_map(|c| match c {
                ResourceContents::TextResourceContents { text, .. } => Some(text),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n"))
    }

    pub async fn get_prompt(
        &self,
        name: &str,
        args: &HashMap<String, String>,
    ) -> Result<GetPromptResult> {
        let arguments: JsonObject = args
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();

        self.service
            .get_prompt(GetPromptRequestParam {
                name: name.to_string(),
                arguments: if arguments.is_empty() {
                    None
                } else {
                    Some(arguments)
                },
            })
            .await
            .map_err(from_service_error)
    }

    /// Tools of this server wrapped as local [`Tool`]s.
    pub async fn tools(&self) -> Result<Vec<Arc<dyn Tool>>> {
        let peer = self.peer();
        Ok(self
            .list_tools()
            .await?
            .into_iter()
            .map(|info| Arc::new(McpTool::new(&self.name, info, peer.clone())) as Arc<dyn Tool>)
            .collect())
    }

    /// Ask the server to shut down and wait for the connection task.
    pub async fn close(self) -> Result<()> {
        let name = self.name;
        self.service
            .cancel()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to close MCP client '{}': {}", name, e)))?;
        debug!(server = %name, "MCP client closed");
        Ok(())
    }
}

async fn call_tool(peer: &Peer<RoleClient>, name: &str, args: Value) -> Result<CallToolResult> {
    peer.call_tool(CallToolRequestParam {
        name: Cow::Owned(name.to_string()),
        arguments: to_arguments(args)?,
    })
    .await
    .map_err(from_service_error)
}

/// A remote MCP tool usable through the local [`Tool`] trait.
pub struct McpTool {
    server: String,
    info: McpToolInfo,
    peer: Peer<RoleClient>,
}

impl McpTool {
    pub fn new(server: &str, info: McpToolInfo, peer: Peer<RoleClient>) -> Self {
        Self {
            server: server.to_string(),
            info,
            peer,
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }
}

#[async_trait]
impl Tool for McpTool {
    fn name(&self) -> &str {
        &self.info.name
    }

    fn description(&self) -> &str {
        self.info.description.as_deref().unwrap_or_default()
    }

    fn parameters_schema(&self) -> Value {
        Value::Object(self.info.input_schema.as_ref().clone())
    }

    /// Error results are returned as text: the server already rendered
    /// them for the model.
    async fn execute(&self, args: Value) -> Result<Value> {
        let result = call_tool(&self.peer, &self.info.name, args).await?;
        let text = result_text(&result);
        if result.is_error == Some(true) {
            warn!(server = %self.server, tool = %self.info.name, "tool returned an error result");
        }
        Ok(Value::String(text))
    }
}

/// Several MCP servers behind one tool registry.
pub struct MultiServerClient {
    clients: Vec<McpClient>,
}

impl MultiServerClient {
    /// Connect to every named server. Fails on the first server that
    /// cannot be started, after closing the ones already connected.
    pub async fn connect_all(servers: &[(String, McpServerConfig)]) -> Result<Self> {
        let mut clients = Vec::with_capacity(servers.len());
        for (name, config) in servers {
            match McpClient::spawn(name, config).await {
                Ok(client) => clients.push(client),
                Err(e) => {
                    for client in clients {
                        client.close().await.ok();
                    }
                    return Err(e);
                }
            }
        }
        Ok(Self { clients })
    }

    pub fn from_clients(clients: Vec<McpClient>) -> Self {
        Self { clients }
    }

    pub fn clients(&self) -> &[McpClient] {
        &self.clients
    }

    /// All tools of all servers. On a name clash the later server wins.
    pub async fn registry(&self) -> Result<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        for client in &self.clients {
            let tools = client.tools().await?;
            info!(server = client.name(), tools = tools.len(), "registered MCP tools");
            registry.register_all(tools);
        }
        Ok(registry)
    }

    pub async fn close(self) {
        for client in self.clients {
            let name = client.name().to_string();
            if let Err(e) = client.close().await {
                warn!(server = %name, error = %e, "failed to close MCP client");
            }
        }
    }
}

//! Blocking facade over the async agent.
//!
//! [`SyncAgent`] owns one [`Worker`] and one agent session living on that
//! worker's runtime. Dashboard handlers and the CLI call it from plain
//! threads; every call waits a bounded time and every failure comes back
//! as text (or as [`AppError`] from the `try_` variants).

use crate::agents::agent::ToolAgent;
use crate::agents::worker::{Ticket, Worker};
use crate::llm::{LLMClient, Provider};
use crate::mcp::{prompts, MultiServerClient};
use crate::render::render_error;
use crate::types::{AppError, Result};
use crate::utils::toml_config::{AgentConfig, McpServerConfig, ToolDeckConfig};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

pub const SETUP_FAILED: &str = "Agent not initialized. Setup failed.";
pub const MESSAGE_TIMEOUT_TEXT: &str = "❌ Request timed out. Please try again with a simpler query.";
pub const PROMPT_TIMEOUT_TEXT: &str = "❌ Prompt processing timed out. Please try again.";

const WORKER_NAME: &str = "tooldeck-agent";

/// Builds a connected agent session. Runs on the worker's runtime.
#[async_trait]
pub trait AgentConnector: Send + Sync + 'static {
    async fn connect(&self) -> Result<Box<dyn AgentSession>>;
}

/// A connected agent that answers one message at a time.
#[async_trait]
pub trait AgentSession: Send {
    async fn send(&mut self, message: &str) -> Result<String>;

    /// Release servers and connections.
    async fn close(self: Box<Self>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentTimeouts {
    pub start: Duration,
    pub setup: Duration,
    pub message: Duration,
}

impl Default for AgentTimeouts {
    fn default() -> Self {
        Self::from(&AgentConfig::default())
    }
}

impl From<&AgentConfig> for AgentTimeouts {
    fn from(config: &AgentConfig) -> Self {
        Self {
            start: Duration::from_secs(config.start_timeout_secs),
            setup: Duration::from_secs(config.setup_timeout_secs),
            message: Duration::from_secs(config.message_timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentStatus {
    pub initialized: bool,
    pub worker_alive: bool,
}

type SessionSlot = Arc<tokio::sync::Mutex<Option<Box<dyn AgentSession>>>>;

pub struct SyncAgent {
    connector: Arc<dyn AgentConnector>,
    timeouts: AgentTimeouts,
    initialized: AtomicBool,
    worker: Mutex<Option<Worker>>,
    setup_lock: Mutex<()>,
    session: SessionSlot,
}

impl SyncAgent {
    pub fn new(connector: Arc<dyn AgentConnector>, timeouts: AgentTimeouts) -> Self {
        Self {
            connector,
            timeouts,
            initialized: AtomicBool::new(false),
            worker: Mutex::new(None),
            setup_lock: Mutex::new(()),
            session: Arc::new(tokio::sync::Mutex::new(None)),
        }
    }

    /// Agent over the MCP servers and model named in `config`.
    pub fn from_config(config: &ToolDeckConfig) -> Self {
        Self::new(
            Arc::new(McpAgentConnector::new(config.clone())),
            AgentTimeouts::from(&config.agent),
        )
    }

    pub fn timeouts(&self) -> AgentTimeouts {
        self.timeouts
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Start the worker and connect the agent. Idempotent; returns `false`
    /// on failure or timeout and stays uninitialized.
    pub fn setup(&self) -> bool {
        let _guard = self.setup_lock.lock();
        if self.is_initialized() {
            return true;
        }

        info!("initializing agent");
        match self.connect() {
            Ok(()) => {
                self.initialized.store(true, Ordering::SeqCst);
                info!("agent ready");
                true
            }
            Err(e) => {
                error!(error = %e, "agent setup failed");
                false
            }
        }
    }

    fn connect(&self) -> Result<()> {
        let connector = Arc::clone(&self.connector);
        let slot = Arc::clone(&self.session);

        let ticket = self.submit(async move {
            let session = connector.connect().await?;
            let mut current = slot.lock().await;
            if let Some(stale) = current.replace(session) {
                stale.close().await;
            }
            Ok::<(), AppError>(())
        })?;

        ticket.wait(self.timeouts.setup)?
    }

    /// Queue a job, starting (or restarting) the worker when needed.
    fn submit<F, T>(&self, job: F) -> Result<Ticket<T>>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let mut worker = self.worker.lock();
        let running = worker.as_ref().is_some_and(Worker::is_alive);
        if !running {
            *worker = Some(Worker::start(WORKER_NAME, self.timeouts.start)?);
        }
        match worker.as_ref() {
            Some(worker) => Ok(worker.submit(job)),
            None => Err(AppError::Internal("Agent worker is not running".to_string())),
        }
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() || self.setup() {
            Ok(())
        } else {
            Err(AppError::Upstream(SETUP_FAILED.to_string()))
        }
    }

    fn ask(&self, message: String) -> Result<String> {
        let slot = Arc::clone(&self.session);
        let ticket = self.submit(async move {
            let mut session = slot.lock().await;
            match session.as_mut() {
                Some(session) => session.send(&message).await,
                None => Err(AppError::Internal("Agent session is not connected".to_string())),
            }
        })?;
        ticket.wait(self.timeouts.message)?
    }

    /// Send a message and return the agent's reply.
    pub fn try_send_message(&self, message: &str) -> Result<String> {
        self.ensure_initialized()?;
        self.ask(message.to_string())
    }

    /// Like [`try_send_message`](Self::try_send_message) with failures as text.
    pub fn send_message(&self, message: &str) -> String {
        match self.try_send_message(message) {
            Ok(reply) => reply,
            Err(AppError::Timeout(_)) => MESSAGE_TIMEOUT_TEXT.to_string(),
            Err(e) => render_error(&e),
        }
    }

    /// Render a booking prompt template and send it to the agent.
    pub fn try_process_prompt(&self, name: &str, args: &HashMap<String, String>) -> Result<String> {
        let rendered = prompts::render(name, args)?;
        self.ensure_initialized()?;
        self.ask(rendered.text)
    }

    pub fn process_prompt(&self, name: &str, args: &HashMap<String, String>) -> String {
        match self.try_process_prompt(name, args) {
            Ok(reply) => reply,
            Err(AppError::Timeout(_)) => PROMPT_TIMEOUT_TEXT.to_string(),
            Err(e) => render_error(&e),
        }
    }

    pub fn status(&self) -> AgentStatus {
        AgentStatus {
            initialized: self.is_initialized(),
            worker_alive: self.worker.lock().as_ref().is_some_and(Worker::is_alive),
        }
    }

    /// Close the session and stop the worker. A later call sets up again.
    pub fn shutdown(&self) {
        let _guard = self.setup_lock.lock();
        let mut worker = self.worker.lock();
        if let Some(mut running) = worker.take() {
            if running.is_alive() {
                let slot = Arc::clone(&self.session);
                let ticket = running.submit(async move {
                    if let Some(session) = slot.lock().await.take() {
                        session.close().await;
                    }
                });
                if let Err(e) = ticket.wait(self.timeouts.start) {
                    warn!(error = %e, "agent session did not close cleanly");
                }
            }
            running.shutdown();
        }
        self.initialized.store(false, Ordering::SeqCst);
        info!("agent shut down");
    }
}

impl Drop for SyncAgent {
    fn drop(&mut self) {
        if self.worker.get_mut().is_some() {
            self.shutdown();
        }
    }
}

/// Connects the configured MCP servers and binds their tools to the model.
pub struct McpAgentConnector {
    config: ToolDeckConfig,
}

impl McpAgentConnector {
    pub fn new(config: ToolDeckConfig) -> Self {
        Self { config }
    }

    fn servers(&self) -> Result<Vec<(String, McpServerConfig)>> {
        self.config
            .agent
            .servers
            .iter()
            .map(|name| {
                self.config
                    .get_server(name)
                    .cloned()
                    .map(|server| (name.clone(), server))
                    .ok_or_else(|| AppError::Config(format!("Unknown MCP server: {}", name)))
            })
            .collect()
    }
}

#[async_trait]
impl AgentConnector for McpAgentConnector {
    async fn connect(&self) -> Result<Box<dyn AgentSession>> {
        let provider = Provider::from_config(&self.config)?;
        let servers = self.servers()?;

        let clients = MultiServerClient::connect_all(&servers).await?;
        let tools = match clients.registry().await {
            Ok(tools) => tools,
            Err(e) => {
                clients.close().await;
                return Err(e);
            }
        };
        info!(
            provider = provider.name(),
            model = provider.model(),
            tools = ?tools.tool_names(),
            "agent connected"
        );

        let llm: Arc<dyn LLMClient> = Arc::from(provider.create_client(&self.config.llm));
        let mut agent = ToolAgent::new(llm, tools)
            .with_max_tool_iterations(self.config.llm.max_tool_iterations);
        if let Some(prompt) = &self.config.llm.system_prompt {
            agent = agent.with_system_prompt(prompt.clone());
        }

        Ok(Box::new(McpAgentSession { agent, clients }))
    }
}

struct McpAgentSession {
    agent: ToolAgent,
    clients: MultiServerClient,
}

#[async_trait]
impl AgentSession for McpAgentSession {
    /// Every message is answered in a fresh conversation.
    async fn send(&mut self, message: &str) -> Result<String> {
        self.agent.clear_history();
        let response = self.agent.run(message).await?;
        Ok(response.content)
    }

    async fn close(self: Box<Self>) {
        self.clients.close().await;
    }
}

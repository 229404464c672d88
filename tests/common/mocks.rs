//! Test doubles for the model and the agent session.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tooldeck::agents::{AgentConnector, AgentSession};
use tooldeck::llm::{ChatMessage, LLMClient, LLMResponse};
use tooldeck::types::{AppError, Result, ToolCall, ToolDefinition};

/// Replays queued responses in order and records every request.
pub struct ScriptedLLM {
    responses: Mutex<VecDeque<LLMResponse>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
    tool_names: Mutex<Vec<String>>,
}

impl ScriptedLLM {
    pub fn new(responses: Vec<LLMResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            tool_names: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().clone()
    }

    /// Tool names offered on the last request.
    pub fn offered_tools(&self) -> Vec<String> {
        self.tool_names.lock().clone()
    }
}

#[async_trait]
impl LLMClient for ScriptedLLM {
    async fn chat(&self, messages: &[ChatMessage], tools: &[ToolDefinition]) -> Result<LLMResponse> {
        self.requests.lock().push(messages.to_vec());
        *self.tool_names.lock() = tools.iter().map(|t| t.name.clone()).collect();
        self.responses
            .lock()
            .pop_front()
            .ok_or_else(|| AppError::LLM("script exhausted".to_string()))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

pub fn tool_call(id: &str, name: &str, arguments: serde_json::Value) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments,
    }
}

/// Session that answers after `delay`, echoing the message.
pub struct DelayedEcho {
    delay: Duration,
}

#[async_trait]
impl AgentSession for DelayedEcho {
    async fn send(&mut self, message: &str) -> Result<String> {
        tokio::time::sleep(self.delay).await;
        Ok(format!("echo: {}", message))
    }

    async fn close(self: Box<Self>) {}
}

/// Connector whose sessions echo after a fixed delay. Counts connects.
pub struct EchoConnector {
    delay: Duration,
    connects: AtomicUsize,
}

impl EchoConnector {
    pub fn new() -> Arc<Self> {
        Self::with_delay(Duration::ZERO)
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            connects: AtomicUsize::new(0),
        })
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AgentConnector for EchoConnector {
    async fn connect(&self) -> Result<Box<dyn AgentSession>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(DelayedEcho { delay: self.delay }))
    }
}

/// Connector that fails every attempt.
pub struct FailingConnector {
    attempts: AtomicUsize,
}

impl FailingConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            attempts: AtomicUsize::new(0),
        })
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AgentConnector for FailingConnector {
    async fn connect(&self) -> Result<Box<dyn AgentSession>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(AppError::Upstream(
            "Failed to start MCP server 'booking': not found".to_string(),
        ))
    }
}

/// Connector that never finishes within any reasonable setup timeout.
pub struct HangingConnector;

#[async_trait]
impl AgentConnector for HangingConnector {
    async fn connect(&self) -> Result<Box<dyn AgentSession>> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Err(AppError::Internal("unreachable".to_string()))
    }
}

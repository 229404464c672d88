//! Tool-calling agent loop
//!
//! The agent sends the conversation and the tool definitions to the model,
//! executes any tool calls it asks for, appends the results and repeats
//! until the model answers in plain text or the iteration limit is hit.

use crate::llm::{ChatMessage, LLMClient};
use crate::render::render_error;
use crate::tools::ToolRegistry;
use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a helpful assistant for a turf booking service. You can also do integer \
arithmetic, look up the weather and answer questions about PDF documents when \
those tools are available.

Booking tools:
1. get_all_turfs() - all turfs with location, rate, capacity and facilities
2. get_all_bookings() - current bookings
3. check_turf_availability(turf_id, date) - free and booked hourly slots
4. make_booking(turf_id, customer_name, customer_phone, booking_date, start_time, end_time)

Instructions:
- Use the exact tool names above; never invent results a tool could provide.
- Dates are YYYY-MM-DD and times are HH:MM in 24-hour format.
- Show the complete output from tools instead of summarizing it.
- Check availability before making a booking.
- If a request is unclear or missing details, ask for them.";

/// Record of a tool call execution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCallRecord {
    pub id: String,
    pub name: String,
    pub arguments: Value,
    /// Text handed back to the model
    pub result: String,
    pub success: bool,
    pub duration_ms: u64,
}

/// Result of one agent run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Final text response
    pub content: String,
    /// All tool calls made during the run, in order
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of model round trips
    pub iterations: usize,
}

pub struct ToolAgent {
    llm: Arc<dyn LLMClient>,
    tools: ToolRegistry,
    system_prompt: String,
    history: Vec<ChatMessage>,
    max_tool_iterations: usize,
}

impl ToolAgent {
    pub fn new(llm: Arc<dyn LLMClient>, tools: ToolRegistry) -> Self {
        Self {
            llm,
            tools,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            history: Vec::new(),
            max_tool_iterations: 8,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_max_tool_iterations(mut self, max: usize) -> Self {
        self.max_tool_iterations = max.max(1);
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    /// Run one user turn to completion.
    pub async fn run(&mut self, prompt: &str) -> Result<AgentResponse> {
        self.history.push(ChatMessage::user(prompt));

        let definitions = self.tools.get_tool_definitions();
        let mut records = Vec::new();
        let mut iterations = 0;

        loop {
            iterations += 1;
            if iterations > self.max_tool_iterations {
                return Err(AppError::LLM(format!(
                    "Max tool iterations ({}) exceeded",
                    self.max_tool_iterations
                )));
            }

            let mut messages = Vec::with_capacity(self.history.len() + 1);
            messages.push(ChatMessage::system(self.system_prompt.clone()));
            messages.extend(self.history.iter().cloned());

            let response = self.llm.chat(&messages, &definitions).await?;

            if response.tool_calls.is_empty() {
                self.history
                    .push(ChatMessage::assistant(response.content.clone(), Vec::new()));
                return Ok(AgentResponse {
                    content: response.content,
                    tool_calls: records,
                    iterations,
                });
            }

            self.history.push(ChatMessage::assistant(
                response.content.clone(),
                response.tool_calls.clone(),
            ));

            for call in &response.tool_calls {
                debug!(tool = %call.name, args = %call.arguments, "executing tool");
                let start = Instant::now();
                let result = self.tools.execute(&call.name, call.arguments.clone()).await;
                let duration_ms = start.elapsed().as_millis() as u64;

                let (text, success) = match result {
                    Ok(Value::String(text)) => (text, true),
                    Ok(value) => (value.to_string(), true),
                    Err(e) => {
                        warn!(tool = %call.name, error = %e, "tool call failed");
                        (render_error(&e), false)
                    }
                };

                self.history
                    .push(ChatMessage::tool_result(call.id.clone(), text.clone()));
                records.push(ToolCallRecord {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    arguments: call.arguments.clone(),
                    result: text,
                    success,
                    duration_ms,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::MockLLMClient;
    use crate::llm::{LLMResponse, Role};
    use crate::tools::calculator::{Add, Multiply};
    use crate::tools::Tool;
    use crate::types::ToolCall;
    use serde_json::json;

    fn calculator_tools() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register_all([Arc::new(Add) as Arc<dyn Tool>, Arc::new(Multiply)]);
        registry
    }

    fn call(id: &str, name: &str, arguments: Value) -> ToolCall {
        ToolCall {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    #[tokio::test]
    async fn test_plain_answer_needs_one_round_trip() {
        let mut llm = MockLLMClient::new();
        llm.expect_chat()
            .times(1)
            .returning(|_, _| Ok(LLMResponse::text("Hello!")));

        let mut agent = ToolAgent::new(Arc::new(llm), calculator_tools());
        let response = agent.run("hi").await.unwrap();

        assert_eq!(response.content, "Hello!");
        assert_eq!(response.iterations, 1);
        assert!(response.tool_calls.is_empty());
        assert_eq!(agent.history().len(), 2);
    }

    #[tokio::test]
    async fn test_tool_results_are_fed_back() {
        let mut llm = MockLLMClient::new();
        let mut seq = mockall::Sequence::new();
        llm.expect_chat()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, tools| {
                assert_eq!(tools.len(), 2);
                Ok(LLMResponse::with_tool_calls(vec![call(
                    "c1",
                    "multiply",
                    json!({"a": 6, "b": 7}),
                )]))
            });
        llm.expect_chat()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|messages, _| {
                let last = messages.last().unwrap();
                assert_eq!(last.role, Role::Tool);
                assert_eq!(last.content, "42");
                assert_eq!(last.tool_call_id.as_deref(), Some("c1"));
                Ok(LLMResponse::text("6 × 7 = 42"))
            });

        let mut agent = ToolAgent::new(Arc::new(llm), calculator_tools());
        let response = agent.run("what is 6 times 7?").await.unwrap();

        assert_eq!(response.content, "6 × 7 = 42");
        assert_eq!(response.iterations, 2);
        assert_eq!(response.tool_calls.len(), 1);
        assert!(response.tool_calls[0].success);
        assert_eq!(response.tool_calls[0].result, "42");
    }

    #[tokio::test]
    async fn test_tool_failure_becomes_error_result() {
        let mut llm = MockLLMClient::new();
        let mut seq = mockall::Sequence::new();
        llm.expect_chat()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| {
                Ok(LLMResponse::with_tool_calls(vec![call(
                    "c1",
                    "divide",
                    json!({}),
                )]))
            });
        llm.expect_chat()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|messages, _| {
                assert!(messages.last().unwrap().content.contains("Tool not found: divide"));
                Ok(LLMResponse::text("I can't divide."))
            });

        let mut agent = ToolAgent::new(Arc::new(llm), calculator_tools());
        let response = agent.run("10 / 2").await.unwrap();

        assert_eq!(response.content, "I can't divide.");
        assert!(!response.tool_calls[0].success);
    }

    #[tokio::test]
    async fn test_iteration_limit() {
        let mut llm = MockLLMClient::new();
        llm.expect_chat().returning(|_, _| {
            Ok(LLMResponse::with_tool_calls(vec![call(
                "c",
                "add",
                json!({"a": 1, "b": 1}),
            )]))
        });

        let mut agent =
            ToolAgent::new(Arc::new(llm), calculator_tools()).with_max_tool_iterations(3);
        let err = agent.run("loop forever").await.unwrap_err();
        assert_eq!(err, AppError::LLM("Max tool iterations (3) exceeded".into()));
    }

    #[tokio::test]
    async fn test_llm_error_propagates() {
        let mut llm = MockLLMClient::new();
        llm.expect_chat()
            .returning(|_, _| Err(AppError::LLM("rate limited".into())));

        let mut agent = ToolAgent::new(Arc::new(llm), ToolRegistry::new());
        assert!(matches!(agent.run("hi").await, Err(AppError::LLM(_))));
    }
}

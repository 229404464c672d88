use crate::llm::client::{ChatMessage, LLMClient, LLMResponse, Role};
use crate::types::{AppError, Result, ToolCall, ToolDefinition};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Chat-completions client for OpenAI-compatible APIs (Groq, OpenAI,
/// local gateways).
pub struct OpenAICompatibleClient {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAICompatibleClient {
    pub fn new(api_key: String, api_base: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            model,
            temperature: 0.0,
            max_tokens: 1024,
        }
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    fn request_body(&self, messages: &[ChatMessage], tools: &[ToolDefinition]) -> Value {
        let messages: Vec<Value> = messages.iter().map(message_json).collect();

        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });

        if !tools.is_empty() {
            let tools: Vec<Value> = tools
                .iter()
                .map(|t| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters
                        }
                    })
                })
                .collect();
            body["tools"] = Value::Array(tools);
            body["tool_choice"] = json!("auto");
        }

        body
    }
}

fn message_json(msg: &ChatMessage) -> Value {
    match msg.role {
        Role::System => json!({"role": "system", "content": msg.content}),
        Role::User => json!({"role": "user", "content": msg.content}),
        Role::Assistant if msg.tool_calls.is_empty() => {
            json!({"role": "assistant", "content": msg.content})
        }
        Role::Assistant => {
            let tool_calls: Vec<Value> = msg
                .tool_calls
                .iter()
                .map(|tc| {
                    json!({
                        "id": tc.id,
                        "type": "function",
                        "function": {
                            "name": tc.name,
                            // the API expects arguments as a JSON-encoded string
                            "arguments": tc.arguments.to_string()
                        }
                    })
                })
                .collect();
            json!({
                "role": "assistant",
                "content": msg.content,
                "tool_calls": tool_calls
            })
        }
        Role::Tool => json!({
            "role": "tool",
            "tool_call_id": msg.tool_call_id.clone().unwrap_or_default(),
            "content": msg.content
        }),
    }
}

/// Parse a chat-completions response body.
pub fn parse_completion(body: &Value) -> Result<LLMResponse> {
    let choice = body
        .get("choices")
        .and_then(|c| c.get(0))
        .ok_or_else(|| AppError::LLM("No choices in model response".to_string()))?;
    let message = choice
        .get("message")
        .ok_or_else(|| AppError::LLM("No message in model response".to_string()))?;

    let content = message
        .get("content")
        .and_then(|c| c.as_str())
        .unwrap_or_default()
        .to_string();

    let tool_calls = message
        .get("tool_calls")
        .and_then(|v| v.as_array())
        .map(|calls| calls.iter().filter_map(parse_tool_call).collect())
        .unwrap_or_default();

    let finish_reason = choice
        .get("finish_reason")
        .and_then(|r| r.as_str())
        .unwrap_or("unknown")
        .to_string();

    Ok(LLMResponse {
        content,
        tool_calls,
        finish_reason,
    })
}

fn parse_tool_call(call: &Value) -> Option<ToolCall> {
    let function = call.get("function")?;
    let name = function.get("name")?.as_str()?.to_string();
    let id = call
        .get("id")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| format!("call_{}", uuid::Uuid::new_v4().simple()));

    let arguments = match function.get("arguments") {
        Some(Value::String(raw)) if raw.trim().is_empty() => json!({}),
        Some(Value::String(raw)) => serde_json::from_str(raw).unwrap_or_else(|e| {
            warn!(tool = %name, error = %e, "model sent unparseable tool arguments");
            json!({})
        }),
        Some(other) => other.clone(),
        None => json!({}),
    };

    Some(ToolCall {
        id,
        name,
        arguments,
    })
}

#[async_trait]
impl LLMClient for OpenAICompatibleClient {
    async fn chat(&self, messages: &[ChatMessage], tools: &[ToolDefinition]) -> Result<LLMResponse> {
        let url = format!("{}/chat/completions", self.api_base);
        let body = self.request_body(messages, tools);
        debug!(model = %self.model, messages = messages.len(), tools = tools.len(), "chat completion");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout(format!("Model request timed out: {}", e))
                } else {
                    AppError::LLM(format!("HTTP request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::LLM(format!(
                "Chat completion failed ({}): {}",
                status, text
            )));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| AppError::LLM(format!("Failed to parse response: {}", e)))?;

        parse_completion(&json)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

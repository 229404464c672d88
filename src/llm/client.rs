//! LLM client abstraction and provider selection
//!
//! The agent only needs one operation from a model: given the conversation
//! so far and the available tools, produce either text or tool calls.
//! [`LLMClient::chat`] is that operation. Every provider in [`Provider`]
//! speaks the OpenAI chat-completions dialect, so a single HTTP client
//! covers them all.

use crate::types::{AppError, Result, ToolCall, ToolDefinition};
use crate::utils::toml_config::{LlmConfig, ToolDeckConfig};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Role of a conversation message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// One message of a chat conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Tool calls requested by the assistant in this turn
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Set on tool results: the call this message answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::new(Role::Assistant, content)
        }
    }

    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(call_id.into()),
            ..Self::new(Role::Tool, content)
        }
    }
}

/// Response from an LLM generation request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LLMResponse {
    /// The text content of the response
    pub content: String,
    /// Any tool calls requested by the model
    pub tool_calls: Vec<ToolCall>,
    /// The reason generation stopped (e.g., "stop", "tool_calls", "length")
    pub finish_reason: String,
}

impl LLMResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
            finish_reason: "stop".to_string(),
        }
    }

    pub fn with_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: String::new(),
            tool_calls,
            finish_reason: "tool_calls".to_string(),
        }
    }
}

/// Generic LLM client trait for provider abstraction
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// One completion over the whole conversation. `tools` may be empty.
    async fn chat(&self, messages: &[ChatMessage], tools: &[ToolDefinition]) -> Result<LLMResponse>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Provider enum for runtime selection
///
/// | Provider | Base URL | Key variable |
/// |----------|----------|--------------|
/// | Groq | `https://api.groq.com/openai/v1` | `GROQ_API_KEY` |
/// | OpenAI-compatible | any chat-completions endpoint | configurable |
#[derive(Debug, Clone, PartialEq)]
pub enum Provider {
    /// Groq's hosted models (the default)
    Groq { api_key: String, model: String },

    /// Any OpenAI-compatible chat-completions API
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::OpenAI {
    ///     api_key: "sk-...".to_string(),
    ///     api_base: "https://api.openai.com/v1".to_string(),
    ///     model: "gpt-4o-mini".to_string(),
    /// };
    /// ```
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
    },
}

impl Provider {
    /// Pick the provider described by `[llm]` with an already resolved key.
    pub fn from_llm_config(llm: &LlmConfig, api_key: String) -> Self {
        let base = llm.base_url.trim_end_matches('/');
        if base == GROQ_API_BASE {
            Provider::Groq {
                api_key,
                model: llm.model.clone(),
            }
        } else {
            Provider::OpenAI {
                api_key,
                api_base: base.to_string(),
                model: llm.model.clone(),
            }
        }
    }

    /// Resolve the API key from the environment and pick the provider.
    pub fn from_config(config: &ToolDeckConfig) -> Result<Self> {
        let api_key = config.llm_api_key().map_err(|e| {
            AppError::Config(format!(
                "{}. Set it in your environment or .env file.",
                e
            ))
        })?;
        Ok(Self::from_llm_config(&config.llm, api_key))
    }

    pub fn api_base(&self) -> &str {
        match self {
            Provider::Groq { .. } => GROQ_API_BASE,
            Provider::OpenAI { api_base, .. } => api_base,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Provider::Groq { model, .. } | Provider::OpenAI { model, .. } => model,
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Groq { .. } => "Groq",
            Provider::OpenAI { .. } => "OpenAI",
        }
    }

    /// Create a client instance for this provider with the sampling
    /// settings from `[llm]`.
    pub fn create_client(&self, llm: &LlmConfig) -> Box<dyn LLMClient> {
        let (api_key, api_base, model) = match self {
            Provider::Groq { api_key, model } => (api_key, GROQ_API_BASE, model),
            Provider::OpenAI {
                api_key,
                api_base,
                model,
            } => (api_key, api_base.as_str(), model),
        };

        Box::new(
            super::openai::OpenAICompatibleClient::new(
                api_key.clone(),
                api_base.to_string(),
                model.clone(),
            )
            .with_sampling(llm.temperature, llm.max_tokens),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groq_is_default_provider() {
        let provider = Provider::from_llm_config(&LlmConfig::default(), "gsk-test".into());
        assert_eq!(provider.name(), "Groq");
        assert_eq!(provider.api_base(), GROQ_API_BASE);
        assert_eq!(provider.model(), "llama-3.3-70b-versatile");
    }

    #[test]
    fn test_custom_base_selects_openai() {
        let llm = LlmConfig {
            base_url: "http://localhost:8080/v1/".to_string(),
            model: "local".to_string(),
            ..LlmConfig::default()
        };
        let provider = Provider::from_llm_config(&llm, "key".into());
        assert_eq!(
            provider,
            Provider::OpenAI {
                api_key: "key".into(),
                api_base: "http://localhost:8080/v1".into(),
                model: "local".into(),
            }
        );
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let mut config = ToolDeckConfig::default();
        config.llm.api_key_env = "TOOLDECK_TEST_UNSET_LLM_KEY".to_string();
        let err = Provider::from_config(&config).unwrap_err();
        assert!(matches!(err, AppError::Config(ref msg) if msg.contains("TOOLDECK_TEST_UNSET_LLM_KEY")));
    }

    #[test]
    fn test_message_constructors() {
        let msg = ChatMessage::tool_result("call_1", "42");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));

        let json = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hi"}));
    }
}

//! LLM provider clients
//!
//! - [`LLMClient`] - the trait the agent talks to
//! - [`Provider`] - provider selection from `[llm]` in `tooldeck.toml`
//! - [`OpenAICompatibleClient`] - chat completions over HTTP with tool calling
//!
//! # Example
//!
//! ```ignore
//! use tooldeck::llm::{ChatMessage, Provider};
//!
//! let provider = Provider::from_config(&config)?;
//! let client = provider.create_client(&config.llm);
//! let response = client.chat(&[ChatMessage::user("What is 2+2?")], &[]).await?;
//! println!("{}", response.content);
//! ```

/// Core LLM client trait, messages and provider selection.
pub mod client;
/// OpenAI-compatible chat-completions client.
pub mod openai;

pub use client::{ChatMessage, LLMClient, LLMResponse, Provider, Role};
pub use openai::OpenAICompatibleClient;

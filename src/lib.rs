//! # Tooldeck - MCP tool servers, agent and turf booking dashboard
//!
//! A set of Model Context Protocol servers (calculator, weather, PDF Q&A,
//! turf booking, prompt templates, a small demo server), stdio clients for
//! them, a tool-calling agent that drives an OpenAI-compatible model over
//! those servers, and a server-rendered booking dashboard.
//!
//! ## Overview
//!
//! Tooldeck can be used in two ways:
//!
//! 1. **As a binary** - `tooldeck serve <kind>`, `tooldeck dashboard`,
//!    `tooldeck chat`, `tooldeck client <server>`
//! 2. **As a library** - embed the booking store, the MCP servers or the
//!    agent in your own Rust project
//!
//! ## Quick Start (Library Usage)
//!
//! ### Booking a slot
//!
//! ```rust,ignore
//! use tooldeck::booking::{Clock, SystemClock};
//! use tooldeck::db::DatabaseProvider;
//! use tooldeck::tools::booking::BookingService;
//! use std::sync::Arc;
//!
//! let store = DatabaseProvider::Memory.open().await?;
//! store.seed_if_empty(SystemClock.today()).await?;
//!
//! let service = BookingService::new(Arc::new(store), Arc::new(SystemClock), "₹");
//! println!("{}", service.availability_text(1, "2030-01-02").await?);
//! ```
//!
//! ### Talking to the agent from synchronous code
//!
//! ```rust,ignore
//! use tooldeck::{SyncAgent, ToolDeckConfig};
//!
//! let config = ToolDeckConfig::load_or_default("tooldeck.toml")?;
//! let agent = SyncAgent::from_config(&config);
//! println!("{}", agent.send_message("Show me all turfs"));
//! agent.shutdown();
//! ```
//!
//! ## Modules
//!
//! - [`agents`] - Tool-calling agent, its worker thread and the blocking facade
//! - [`api`] - Dashboard pages and JSON routes
//! - [`booking`] - Booking rules: operating window, overlap, cost
//! - [`db`] - libsql-backed turf store
//! - [`llm`] - OpenAI-compatible chat completions client
//! - [`mcp`] - MCP servers and clients
//! - [`pdf`] - PDF text extraction, cache and keyword search
//! - [`tools`] - Tool trait, registry and the tool implementations
//! - [`types`] - Domain types and error handling
//!
//! ## Configuration
//!
//! Everything lives in `tooldeck.toml`; every section is optional. Secrets
//! stay in the environment (`GROQ_API_KEY`, `OPENWEATHER_API_KEY`), loaded
//! from `.env` when present.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Tool-calling agent, worker thread and synchronous facade.
pub mod agents;
/// Dashboard and JSON API.
pub mod api;
/// Booking rules independent of storage.
pub mod booking;
/// Command line interface.
pub mod cli;
/// Turf and booking storage.
pub mod db;
/// LLM clients.
pub mod llm;
/// Model Context Protocol servers and clients.
pub mod mcp;
/// PDF loading and question answering.
pub mod pdf;
/// Human-readable text for tool and dashboard output.
pub mod render;
/// Tools and the tool registry.
pub mod tools;
/// Core types and errors.
pub mod types;
/// Configuration and logging.
pub mod utils;

// Re-export commonly used types
pub use agents::{SyncAgent, ToolAgent};
pub use db::{DatabaseProvider, TurfStore};
pub use llm::{LLMClient, LLMResponse, Provider};
pub use mcp::{McpClient, MultiServerClient, ServerKind};
pub use tools::booking::BookingService;
pub use tools::registry::ToolRegistry;
pub use types::{AppError, Result};
pub use utils::toml_config::{ConfigManager, ToolDeckConfig};

use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// TOML configuration with manual reload
    pub config_manager: Arc<ConfigManager>,
    /// Booking store and clock
    pub bookings: BookingService,
    /// Blocking agent facade; call it through `spawn_blocking`
    pub agent: Arc<SyncAgent>,
}

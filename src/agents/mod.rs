//! Tool-calling agent and its blocking adapter
//!
//! - [`ToolAgent`] runs the model/tool loop over a [`ToolRegistry`](crate::tools::ToolRegistry)
//! - [`Worker`] owns a background thread with its own runtime
//! - [`SyncAgent`] lets blocking callers talk to the agent through that worker

pub mod agent;
pub mod sync_agent;
pub mod worker;

pub use agent::{AgentResponse, ToolAgent, ToolCallRecord, DEFAULT_SYSTEM_PROMPT};
pub use sync_agent::{
    AgentConnector, AgentSession, AgentStatus, AgentTimeouts, McpAgentConnector, SyncAgent,
};
pub use worker::{Ticket, Worker};

use crate::{
    agents::{AgentStatus, SyncAgent},
    mcp::prompts::{self, PromptSpec},
    types::{AppError, ChatRequest, ChatResponse, Result},
    AppState,
};
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Run a blocking adapter call off the async executor.
pub(crate) async fn on_agent<T, F>(agent: &Arc<SyncAgent>, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&SyncAgent) -> T + Send + 'static,
{
    let agent = Arc::clone(agent);
    tokio::task::spawn_blocking(move || f(&agent))
        .await
        .map_err(|e| AppError::Internal(format!("Agent task failed: {}", e)))
}

/// Send a message to the agent. Agent failures come back as reply text.
pub async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let message = payload.message.trim().to_string();
    if message.is_empty() {
        return Err(AppError::Validation("Message cannot be empty".to_string()));
    }

    let response = on_agent(&state.agent, move |agent| agent.send_message(&message)).await?;
    Ok(Json(ChatResponse { response }))
}

pub async fn list_prompts() -> Json<&'static [PromptSpec]> {
    Json(prompts::CATALOG)
}

/// Render a prompt template and send it to the agent.
pub async fn run_prompt(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(args): Json<HashMap<String, String>>,
) -> Result<Json<ChatResponse>> {
    if prompts::find(&name).is_none() {
        return Err(AppError::NotFound(format!("Prompt not found: {}", name)));
    }

    let response = on_agent(&state.agent, move |agent| agent.process_prompt(&name, &args)).await?;
    Ok(Json(ChatResponse { response }))
}

pub async fn agent_status(State(state): State<AppState>) -> Json<AgentStatus> {
    Json(state.agent.status())
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

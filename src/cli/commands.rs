//! Subcommand implementations

use super::output::Output;
use super::ClientCommands;
use crate::agents::SyncAgent;
use crate::api;
use crate::booking::{Clock, SystemClock};
use crate::db::DatabaseProvider;
use crate::mcp::{self, client::prompt_text, McpClient, ServerKind};
use crate::types::{AppError, Result};
use crate::utils::toml_config::{ConfigManager, ToolDeckConfig};
use crate::AppState;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// `tooldeck serve <kind>`
pub async fn serve(kind: ServerKind, config: &ToolDeckConfig) -> Result<()> {
    mcp::serve_stdio(kind, config).await
}

/// `tooldeck dashboard`
pub async fn dashboard(
    config_manager: Arc<ConfigManager>,
    host: Option<String>,
    port: Option<u16>,
    output: &Output,
) -> Result<()> {
    let config = config_manager.config();
    let bookings = mcp::booking_service(&config).await?;
    let agent = Arc::new(SyncAgent::from_config(&config));

    let state = AppState {
        config_manager,
        bookings,
        agent: Arc::clone(&agent),
    };

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let addr = format!("{}:{}", host, port);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind {}: {}", addr, e)))?;

    output.banner();
    output.success(&format!("Dashboard listening on http://{}", addr));
    output.kv("Database", &config.database.url);
    output.kv("Model", &config.llm.model);
    output.hint("The agent connects to its MCP servers on the first chat message");
    info!(%addr, "dashboard started");

    let served = axum::serve(listener, api::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {}", e)));

    // The agent's worker blocks while it closes its servers.
    tokio::task::spawn_blocking(move || agent.shutdown())
        .await
        .map_err(|e| AppError::Internal(format!("Agent shutdown failed: {}", e)))?;
    info!("dashboard stopped");

    served
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// `tooldeck chat`. Runs on a blocking thread since the agent facade blocks.
pub async fn chat(config: Arc<ToolDeckConfig>, once: Option<String>, colored: bool) -> Result<()> {
    tokio::task::spawn_blocking(move || {
        let output = if colored { Output::new() } else { Output::no_color() };
        chat_blocking(&config, once, &output)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Chat session failed: {}", e)))?
}

fn chat_blocking(config: &ToolDeckConfig, once: Option<String>, output: &Output) -> Result<()> {
    let agent = SyncAgent::from_config(config);

    if let Some(message) = once {
        let reply = agent.try_send_message(&message);
        agent.shutdown();
        let reply = reply?;
        println!("{}", reply);
        return Ok(());
    }

    output.banner();
    output.info(&format!("Model: {}", config.llm.model));
    output.info("Connecting to MCP servers...");
    if agent.setup() {
        output.success("Agent ready");
    } else {
        output.warning("Agent setup failed; it will retry on the next message");
    }
    output.hint("Type 'exit' or 'quit' to leave, '/status' for agent state");

    while let Some(line) = output.read_line("you>") {
        match line.as_str() {
            "" => continue,
            "exit" | "quit" => break,
            "/status" => {
                let status = agent.status();
                output.kv("initialized", &status.initialized.to_string());
                output.kv("worker running", &status.worker_alive.to_string());
            }
            message => {
                let reply = agent.send_message(message);
                output.newline();
                output.block(&reply);
            }
        }
    }

    agent.shutdown();
    output.newline();
    output.info("Bye");
    Ok(())
}

/// `tooldeck client <server> [action]`
pub async fn client(
    config: &ToolDeckConfig,
    server: &str,
    action: ClientCommands,
    output: &Output,
) -> Result<()> {
    let server_config = config.get_server(server).ok_or_else(|| {
        let mut names: Vec<_> = config.servers.keys().cloned().collect();
        names.sort();
        AppError::Config(format!(
            "Unknown server '{}'. Configured servers: {}",
            server,
            names.join(", ")
        ))
    })?;

    let client = McpClient::spawn(server, server_config).await?;
    let result = run_client_action(&client, action, output).await;
    client.close().await.ok();
    result
}

async fn run_client_action(
    client: &McpClient,
    action: ClientCommands,
    output: &Output,
) -> Result<()> {
    match action {
        ClientCommands::List => list_capabilities(client, output).await,
        ClientCommands::Call { tool, args } => {
            let args: Value = serde_json::from_str(&args)
                .map_err(|e| AppError::Validation(format!("Arguments must be JSON: {}", e)))?;
            let text = client.call_tool_text(&tool, args).await?;
            println!("{}", text);
            Ok(())
        }
        ClientCommands::Read { uri } => {
            println!("{}", client.read_resource(&uri).await?);
            Ok(())
        }
        ClientCommands::Prompt { name, args } => {
            let args: HashMap<String, String> = args.into_iter().collect();
            let result = client.get_prompt(&name, &args).await?;
            match prompt_text(&result) {
                Some(text) => println!("{}", text),
                None => output.warning("Prompt returned no text"),
            }
            Ok(())
        }
    }
}

async fn list_capabilities(client: &McpClient, output: &Output) -> Result<()> {
    let capabilities = client
        .server_info()
        .map(|info| info.capabilities.clone())
        .unwrap_or_default();

    if let Some(info) = client.server_info() {
        output.header(&format!(
            "{} v{}",
            info.server_info.name, info.server_info.version
        ));
        if let Some(instructions) = &info.instructions {
            output.info(instructions);
        }
    }

    if capabilities.tools.is_some() {
        output.header("Tools");
        for tool in client.list_tools().await? {
            let description = tool.description.as_deref().unwrap_or("");
            output.list_item(&format!("{} - {}", tool.name, description));
        }
    }

    if capabilities.resources.is_some() {
        output.header("Resources");
        for resource in client.list_resources().await? {
            output.list_item(&format!("{} ({})", resource.uri, resource.name));
        }
        let templates = client.list_resource_templates().await?;
        if !templates.is_empty() {
            output.header("Resource templates");
            for template in templates {
                output.list_item(&format!("{} ({})", template.uri_template, template.name));
            }
        }
    }

    if capabilities.prompts.is_some() {
        output.header("Prompts");
        for prompt in client.list_prompts().await? {
            let args = prompt
                .arguments
                .unwrap_or_default()
                .into_iter()
                .map(|a| a.name)
                .collect::<Vec<_>>()
                .join(", ");
            output.list_item(&format!("{}({})", prompt.name, args));
        }
    }

    output.newline();
    Ok(())
}

/// `tooldeck init-db`
pub async fn init_db(
    config: &ToolDeckConfig,
    database: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut config = config.clone();
    if let Some(url) = database {
        config.database.url = url;
    }

    let store = DatabaseProvider::open_configured(&config).await?;
    let seeded = store.seed_if_empty(SystemClock.today()).await?;

    output.success(&format!("Database ready at {}", config.database.url));
    if seeded {
        output.info("Seeded sample turfs and bookings");
    } else {
        output.info("Existing data kept; nothing seeded");
    }
    Ok(())
}

/// `tooldeck config`
pub fn show_config(
    config_manager: &ConfigManager,
    full: bool,
    validate: bool,
    output: &Output,
) -> Result<()> {
    let config = config_manager.config();

    if validate {
        config.validate()?;
        output.success("Configuration is valid");
    }

    if full {
        let text = toml::to_string_pretty(config.as_ref())
            .map_err(|e| AppError::Internal(format!("Failed to serialize config: {}", e)))?;
        println!("{}", text);
        return Ok(());
    }

    output.header("Configuration");
    output.kv("Server", &format!("{}:{}", config.server.host, config.server.port));
    output.kv("Database", &config.database.url);
    output.kv(
        "Booking hours",
        &format!(
            "{:02}:00 - {:02}:00 ({})",
            config.booking.open_hour, config.booking.close_hour, config.booking.currency
        ),
    );
    output.kv("Model", &format!("{} @ {}", config.llm.model, config.llm.base_url));
    output.kv(
        "API key",
        if config.llm_api_key().is_ok() {
            "set"
        } else {
            "missing"
        },
    );
    output.kv("Agent servers", &config.agent.servers.join(", "));

    let mut names: Vec<_> = config.servers.keys().collect();
    names.sort();
    output.header("MCP servers");
    for name in names {
        if let Some(server) = config.get_server(name) {
            output.list_item(&format!("{}: {} {}", name, server.command, server.args.join(" ")));
        }
    }
    output.newline();
    Ok(())
}

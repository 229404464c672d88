//! Model Context Protocol servers and client
//!
//! Every server speaks MCP over stdio through `rmcp` and is launched as a
//! child process with `tooldeck serve <kind>`:
//!
//! | kind | exposes |
//! |------|---------|
//! | `calculator` | `add`, `multiply` |
//! | `weather` | `get_weather` |
//! | `pdf` | `load_pdf`, `ask_pdf_question`, `list_loaded_pdfs`, `clear_pdf_cache`, `get_pdf_summary` |
//! | `booking` | booking tools, `catalog://` resources, booking prompts |
//! | `prompts` | booking prompts only |
//! | `demo` | `greeting://{name}` resource template, `code_review` prompt |
//!
//! [`client`] starts those processes and bridges their tools into a
//! [`ToolRegistry`](crate::tools::ToolRegistry).

pub mod booking;
pub mod client;
pub mod demo;
pub mod prompts;
pub mod server;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rmcp::model::{
    CallToolResult, Content, ErrorCode, Implementation, ProtocolVersion, ServerCapabilities,
    ServerInfo,
};
use rmcp::{ErrorData as McpError, ServiceError, ServiceExt};
use tracing::info;

use crate::booking::{Clock, SystemClock};
use crate::db::DatabaseProvider;
use crate::pdf::PdfLibrary;
use crate::render;
use crate::tools::booking::BookingService;
use crate::tools::weather::WeatherClient;
use crate::types::{AppError, Result};
use crate::utils::toml_config::ToolDeckConfig;

pub use booking::BookingServer;
pub use client::{McpClient, McpTool, MultiServerClient};
pub use demo::DemoServer;
pub use server::{CalculatorServer, PdfServer, PromptServer, WeatherServer};

/// The servers this binary can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ServerKind {
    Calculator,
    Weather,
    Pdf,
    Booking,
    Prompts,
    Demo,
}

impl ServerKind {
    pub const ALL: [ServerKind; 6] = [
        ServerKind::Calculator,
        ServerKind::Weather,
        ServerKind::Pdf,
        ServerKind::Booking,
        ServerKind::Prompts,
        ServerKind::Demo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServerKind::Calculator => "calculator",
            ServerKind::Weather => "weather",
            ServerKind::Pdf => "pdf",
            ServerKind::Booking => "booking",
            ServerKind::Prompts => "prompts",
            ServerKind::Demo => "demo",
        }
    }
}

impl fmt::Display for ServerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        ServerKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("Unknown server kind: {}", s)))
    }
}

pub(crate) fn server_info(name: &str, instructions: &str, capabilities: ServerCapabilities) -> ServerInfo {
    ServerInfo {
        protocol_version: ProtocolVersion::default(),
        capabilities,
        server_info: Implementation {
            name: name.into(),
            version: env!("CARGO_PKG_VERSION").into(),
            title: None,
            icons: None,
            website_url: None,
        },
        instructions: Some(instructions.into()),
    }
}

/// Tool outcome as an MCP result. Failures become error results carrying
/// the rendered text, so the model sees them instead of a protocol error.
pub(crate) fn text_result(result: Result<String>) -> CallToolResult {
    match result {
        Ok(text) => CallToolResult::success(vec![Content::text(text)]),
        Err(err) => CallToolResult::error(vec![Content::text(render::render_error(&err))]),
    }
}

/// Protocol error for resource and prompt requests.
pub(crate) fn to_mcp_error(err: AppError) -> McpError {
    match err {
        AppError::NotFound(msg) => McpError::resource_not_found(msg, None),
        AppError::Validation(msg) => McpError::invalid_params(msg, None),
        other => McpError::internal_error(other.detail().to_string(), None),
    }
}

/// Map a client-side failure back into the closed error set.
pub(crate) fn from_service_error(err: ServiceError) -> AppError {
    match err {
        ServiceError::McpError(data) if data.code == ErrorCode::RESOURCE_NOT_FOUND => {
            AppError::NotFound(data.message.to_string())
        }
        ServiceError::McpError(data) if data.code == ErrorCode::INVALID_PARAMS => {
            AppError::Validation(data.message.to_string())
        }
        ServiceError::McpError(data) => AppError::Upstream(data.message.to_string()),
        other => AppError::Upstream(format!("MCP request failed: {}", other)),
    }
}

/// Booking service over the configured database, seeded on first use.
pub async fn booking_service(config: &ToolDeckConfig) -> Result<BookingService> {
    let store = DatabaseProvider::open_configured(config).await?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    store.seed_if_empty(clock.today()).await?;
    Ok(BookingService::new(
        Arc::new(store),
        clock,
        config.booking.currency.clone(),
    ))
}

async fn run_stdio<S>(server: S) -> Result<()>
where
    S: rmcp::ServerHandler,
{
    let service = server
        .serve(rmcp::transport::io::stdio())
        .await
        .map_err(|e| AppError::Internal(format!("MCP server error: {}", e)))?;
    service
        .waiting()
        .await
        .map_err(|e| AppError::Internal(format!("MCP server task failed: {}", e)))?;
    Ok(())
}

/// Run one server on stdin/stdout until the client disconnects.
pub async fn serve_stdio(kind: ServerKind, config: &ToolDeckConfig) -> Result<()> {
    info!(server = %kind, "starting MCP server on stdio");

    match kind {
        ServerKind::Calculator => run_stdio(CalculatorServer::new()).await,
        ServerKind::Weather => {
            let client = WeatherClient::from_config(config)?;
            run_stdio(WeatherServer::new(Arc::new(client))).await
        }
        ServerKind::Pdf => {
            let library = PdfLibrary::from_config(&config.pdf);
            run_stdio(PdfServer::new(Arc::new(library))).await
        }
        ServerKind::Booking => {
            let service = booking_service(config).await?;
            run_stdio(BookingServer::new(service)).await
        }
        ServerKind::Prompts => run_stdio(PromptServer::new()).await,
        ServerKind::Demo => run_stdio(DemoServer::new()).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_names() {
        for kind in ServerKind::ALL {
            assert_eq!(kind.as_str().parse::<ServerKind>().unwrap(), kind);
        }
        assert!("search".parse::<ServerKind>().is_err());
    }

    #[test]
    fn test_text_result_marks_errors() {
        let ok = text_result(Ok("done".into()));
        assert_ne!(ok.is_error, Some(true));

        let failed = text_result(Err(AppError::Conflict("taken".into())));
        assert_eq!(failed.is_error, Some(true));
        assert_eq!(
            failed.content[0].as_text().map(|t| t.text.clone()),
            Some("❌ taken".to_string())
        );
    }

    #[test]
    fn test_error_codes_map_back() {
        let err = to_mcp_error(AppError::NotFound("Prompt not found: x".into()));
        assert_eq!(
            from_service_error(ServiceError::McpError(err)),
            AppError::NotFound("Prompt not found: x".into())
        );

        let err = to_mcp_error(AppError::Validation("bad".into()));
        assert_eq!(
            from_service_error(ServiceError::McpError(err)),
            AppError::Validation("bad".into())
        );
    }
}

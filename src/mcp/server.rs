use std::sync::Arc;

use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::*,
    service::RequestContext,
    tool, tool_handler, tool_router, ErrorData as McpError, RoleServer, ServerHandler,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{prompts, server_info, text_result, to_mcp_error};
use crate::pdf::PdfLibrary;
use crate::render;
use crate::tools::calculator;
use crate::tools::weather::WeatherClient;
use crate::types::{AppError, Result as AppResult};

/// Parameters for the calculator tools
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct OperandParams {
    /// First operand
    pub a: i64,
    /// Second operand
    pub b: i64,
}

/// Integer arithmetic over MCP
#[derive(Clone)]
pub struct CalculatorServer {
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl CalculatorServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Add two integers")]
    async fn add(
        &self,
        Parameters(params): Parameters<OperandParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(text_result(
            calculator::add(params.a, params.b).map(|v| v.to_string()),
        ))
    }

    #[tool(description = "Multiply two integers")]
    async fn multiply(
        &self,
        Parameters(params): Parameters<OperandParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(text_result(
            calculator::multiply(params.a, params.b).map(|v| v.to_string()),
        ))
    }
}

impl Default for CalculatorServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_handler]
impl ServerHandler for CalculatorServer {
    fn get_info(&self) -> ServerInfo {
        server_info(
            "tooldeck-calculator",
            "Integer arithmetic: use add for addition and multiply for multiplication",
            ServerCapabilities::builder().enable_tools().build(),
        )
    }
}

/// Parameters for the weather lookup
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct WeatherParams {
    /// City name, zip code, or coordinates (e.g. "London", "10001", "48.8566,2.3522")
    pub location: String,
}

/// Current weather over MCP
#[derive(Clone)]
pub struct WeatherServer {
    client: Arc<WeatherClient>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl WeatherServer {
    pub fn new(client: Arc<WeatherClient>) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Get current weather information for a location: temperature, condition, humidity, wind, visibility and local time"
    )]
    async fn get_weather(
        &self,
        Parameters(params): Parameters<WeatherParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .client
            .current(&params.location)
            .await
            .map(|report| render::weather(&report));
        Ok(text_result(result))
    }
}

#[tool_handler]
impl ServerHandler for WeatherServer {
    fn get_info(&self) -> ServerInfo {
        server_info(
            "tooldeck-weather",
            "Weather lookups: call get_weather with a city, zip code or coordinates",
            ServerCapabilities::builder().enable_tools().build(),
        )
    }
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct PdfPathParams {
    /// Full path to the PDF file
    pub file_path: String,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct PdfQuestionParams {
    /// Path to the PDF file (must be loaded first)
    pub file_path: String,
    /// Question about the PDF content
    pub question: String,
}

/// PDF loading and question answering over MCP
#[derive(Clone)]
pub struct PdfServer {
    library: Arc<PdfLibrary>,
    tool_router: ToolRouter<Self>,
}

impl PdfServer {
    async fn on_blocking<T, F>(&self, f: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&PdfLibrary) -> AppResult<T> + Send + 'static,
    {
        let library = Arc::clone(&self.library);
        tokio::task::spawn_blocking(move || f(&library))
            .await
            .map_err(|e| AppError::Internal(format!("PDF task failed: {}", e)))?
    }
}

#[tool_router]
impl PdfServer {
    pub fn new(library: Arc<PdfLibrary>) -> Self {
        Self {
            library,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Load and extract text from a PDF file")]
    async fn load_pdf(
        &self,
        Parameters(params): Parameters<PdfPathParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = params.file_path;
        let result = self
            .on_blocking(move |lib| lib.load(&path))
            .await
            .map(|outcome| render::pdf_loaded(&outcome));
        Ok(text_result(result))
    }

    #[tool(description = "Ask a question about a loaded PDF file")]
    async fn ask_pdf_question(
        &self,
        Parameters(params): Parameters<PdfQuestionParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .library
            .ask(&params.file_path, &params.question)
            .map(|answer| render::pdf_answer(&answer));
        Ok(text_result(result))
    }

    #[tool(description = "List all currently loaded PDF files")]
    async fn list_loaded_pdfs(&self) -> Result<CallToolResult, McpError> {
        Ok(text_result(Ok(render::pdf_list(&self.library.loaded()))))
    }

    #[tool(description = "Clear all loaded PDF files from cache")]
    async fn clear_pdf_cache(&self) -> Result<CallToolResult, McpError> {
        let result = self
            .on_blocking(|lib| {
                lib.clear();
                Ok(())
            })
            .await
            .map(|_| render::pdf_cleared());
        Ok(text_result(result))
    }

    #[tool(description = "Get a summary of a loaded PDF's content")]
    async fn get_pdf_summary(
        &self,
        Parameters(params): Parameters<PdfPathParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .library
            .summary(&params.file_path)
            .map(|summary| render::pdf_summary(&summary));
        Ok(text_result(result))
    }
}

#[tool_handler]
impl ServerHandler for PdfServer {
    fn get_info(&self) -> ServerInfo {
        server_info(
            "tooldeck-pdf",
            "PDF documents: load_pdf first, then ask_pdf_question or get_pdf_summary",
            ServerCapabilities::builder().enable_tools().build(),
        )
    }
}

/// Booking prompt catalog without tools
#[derive(Debug, Clone, Default)]
pub struct PromptServer;

impl PromptServer {
    pub fn new() -> Self {
        Self
    }
}

impl ServerHandler for PromptServer {
    fn get_info(&self) -> ServerInfo {
        server_info(
            "turf-booking-prompts-server",
            "Prompt templates for the turf booking assistant",
            ServerCapabilities::builder().enable_prompts().build(),
        )
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        Ok(ListPromptsResult::with_all_items(
            prompts::CATALOG.iter().map(prompts::to_prompt).collect(),
        ))
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        let args = prompts::string_args(request.arguments.as_ref());
        prompts::render(&request.name, &args)
            .map(prompts::to_result)
            .map_err(to_mcp_error)
    }
}

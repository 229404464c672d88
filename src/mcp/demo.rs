//! Minimal resource and prompt server for trying out MCP clients.

use std::collections::HashMap;

use rmcp::{
    model::*, service::RequestContext, ErrorData as McpError, RoleServer, ServerHandler,
};

use super::{prompts::string_args, server_info, to_mcp_error};
use crate::types::{AppError, Result};

pub const GREETING_TEMPLATE: &str = "greeting://{name}";
const GREETING_PREFIX: &str = "greeting://";

pub fn greeting(name: &str) -> String {
    format!("Hello, {}!", name)
}

pub fn code_review(language: &str, code: &str) -> String {
    format!(
        "Please review this {} code:\n\n```{}\n{}\n```",
        language, language, code
    )
}

fn read_greeting(uri: &str) -> Result<String> {
    match uri.strip_prefix(GREETING_PREFIX) {
        Some(name) if !name.is_empty() => Ok(greeting(name)),
        _ => Err(AppError::NotFound(format!("Unknown resource: {}", uri))),
    }
}

fn render_code_review(args: &HashMap<String, String>) -> Result<String> {
    let field = |key: &str| {
        args.get(key).cloned().ok_or_else(|| {
            AppError::Validation(format!(
                "Missing required argument '{}' for prompt 'code_review'",
                key
            ))
        })
    };
    Ok(code_review(&field("language")?, &field("code")?))
}

#[derive(Debug, Clone, Default)]
pub struct DemoServer;

impl DemoServer {
    pub fn new() -> Self {
        Self
    }
}

impl ServerHandler for DemoServer {
    fn get_info(&self) -> ServerInfo {
        server_info(
            "demo",
            "Demo server with a greeting resource template and a code review prompt",
            ServerCapabilities::builder()
                .enable_resources()
                .enable_prompts()
                .build(),
        )
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(Vec::new()))
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListResourceTemplatesResult, McpError> {
        Ok(ListResourceTemplatesResult::with_all_items(vec![
            RawResourceTemplate {
                uri_template: GREETING_TEMPLATE.to_string(),
                name: "greeting".to_string(),
                title: None,
                description: Some("Personalized greeting resource".to_string()),
                mime_type: Some("text/plain".to_string()),
            }
            .no_annotation(),
        ]))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ReadResourceResult, McpError> {
        let text = read_greeting(&request.uri).map_err(to_mcp_error)?;
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, request.uri)],
        })
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListPromptsResult, McpError> {
        Ok(ListPromptsResult::with_all_items(vec![Prompt::new(
            "code_review",
            Some("Ask the model to review code"),
            Some(vec![
                PromptArgument {
                    name: "language".to_string(),
                    title: None,
                    description: Some("Programming language of the snippet".to_string()),
                    required: Some(true),
                },
                PromptArgument {
                    name: "code".to_string(),
                    title: None,
                    description: Some("Code to review".to_string()),
                    required: Some(true),
                },
            ]),
        )]))
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<GetPromptResult, McpError> {
        if request.name != "code_review" {
            return Err(to_mcp_error(AppError::NotFound(format!(
                "Prompt not found: {}",
                request.name
            ))));
        }
        let text = render_code_review(&string_args(request.arguments.as_ref()))
            .map_err(to_mcp_error)?;
        Ok(GetPromptResult {
            description: Some("Ask the model to review code".to_string()),
            messages: vec![PromptMessage::new_text(PromptMessageRole::User, text)],
        })
    }
}

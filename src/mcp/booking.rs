//! Turf booking MCP server: tools, catalog resources and prompts.

use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::*,
    service::RequestContext,
    tool, tool_handler, tool_router, ErrorData as McpError, RoleServer, ServerHandler,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{prompts, server_info, text_result, to_mcp_error};
use crate::tools::booking::BookingService;
use crate::types::{AppError, NewBooking, Result as AppResult};

pub const TURFS_URI: &str = "catalog://all";
pub const BOOKINGS_URI: &str = "catalog://bookings/all";
pub const AVAILABILITY_TEMPLATE: &str = "catalog://availability/{turf_id}/{date}";
const AVAILABILITY_PREFIX: &str = "catalog://availability/";

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct AvailabilityParams {
    /// ID of the turf
    pub turf_id: i64,
    /// Date in YYYY-MM-DD format
    pub date: String,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct BookingParams {
    /// ID of the turf to book
    pub turf_id: i64,
    /// Customer's name
    pub customer_name: String,
    /// Customer's phone number
    pub customer_phone: String,
    /// Date for booking (YYYY-MM-DD)
    pub booking_date: String,
    /// Start time (HH:MM, 24h)
    pub start_time: String,
    /// End time (HH:MM, 24h)
    pub end_time: String,
}

impl From<BookingParams> for NewBooking {
    fn from(p: BookingParams) -> Self {
        NewBooking {
            turf_id: p.turf_id,
            customer_name: p.customer_name,
            customer_phone: p.customer_phone,
            booking_date: p.booking_date,
            start_time: p.start_time,
            end_time: p.end_time,
        }
    }
}

/// A parsed `catalog://` URI
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogResource {
    Turfs,
    Bookings,
    Availability { turf_id: i64, date: String },
}

impl CatalogResource {
    pub fn parse(uri: &str) -> AppResult<Self> {
        match uri {
            TURFS_URI => return Ok(CatalogResource::Turfs),
            BOOKINGS_URI => return Ok(CatalogResource::Bookings),
            _ => {}
        }

        let rest = uri
            .strip_prefix(AVAILABILITY_PREFIX)
            .ok_or_else(|| AppError::NotFound(format!("Unknown resource: {}", uri)))?;
        let (turf_id, date) = rest
            .split_once('/')
            .ok_or_else(|| AppError::NotFound(format!("Unknown resource: {}", uri)))?;
        let turf_id = turf_id
            .parse()
            .map_err(|_| AppError::Validation(format!("Invalid turf ID: {}", turf_id)))?;

        Ok(CatalogResource::Availability {
            turf_id,
            date: date.to_string(),
        })
    }
}

/// Booking tools plus read-only catalog resources and booking prompts
#[derive(Clone)]
pub struct BookingServer {
    service: BookingService,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl BookingServer {
    pub fn new(service: BookingService) -> Self {
        Self {
            service,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Get all available turfs with their details")]
    async fn get_all_turfs(&self) -> Result<CallToolResult, McpError> {
        Ok(text_result(self.service.turfs_text().await))
    }

    #[tool(description = "Get all bookings (customer details are not included)")]
    async fn get_all_bookings(&self) -> Result<CallToolResult, McpError> {
        Ok(text_result(self.service.bookings_text().await))
    }

    #[tool(description = "Check availability of a specific turf on a given date")]
    async fn check_turf_availability(
        &self,
        Parameters(params): Parameters<AvailabilityParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(text_result(
            self.service
                .availability_text(params.turf_id, &params.date)
                .await,
        ))
    }

    #[tool(description = "Book a turf for a specific date and time slot")]
    async fn make_booking(
        &self,
        Parameters(params): Parameters<BookingParams>,
    ) -> Result<CallToolResult, McpError> {
        let request = NewBooking::from(params);
        Ok(text_result(self.service.book_text(&request).await))
    }

    async fn read_catalog(&self, uri: &str) -> AppResult<String> {
        match CatalogResource::parse(uri)? {
            CatalogResource::Turfs => self.service.turfs_text().await,
            CatalogResource::Bookings => self.service.bookings_text().await,
            CatalogResource::Availability { turf_id, date } => {
                self.service.availability_text(turf_id, &date).await
            }
        }
    }
}

#[tool_handler]
impl ServerHandler for BookingServer {
    fn get_info(&self) -> ServerInfo {
        server_info(
            "turf-booking-server",
            "Turf booking: list turfs, check availability, view bookings and make bookings",
            ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
        )
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(vec![
            RawResource::new(TURFS_URI, "all turfs").no_annotation(),
            RawResource::new(BOOKINGS_URI, "all bookings").no_annotation(),
        ]))
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        Ok(ListResourceTemplatesResult::with_all_items(vec![
            RawResourceTemplate {
                uri_template: AVAILABILITY_TEMPLATE.to_string(),
                name: "turf availability".to_string(),
                title: None,
                description: Some("Booked and free hourly slots for a turf on a date".to_string()),
                mime_type: Some("text/plain".to_string()),
            }
            .no_annotation(),
        ]))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        debug!(uri = %request.uri, "read resource");
        let text = self.read_catalog(&request.uri).await.map_err(to_mcp_error)?;
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, request.uri)],
        })
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_catalog_uris() {
        assert_eq!(CatalogResource::parse("catalog://all").unwrap(), CatalogResource::Turfs);
        assert_eq!(
            CatalogResource::parse("catalog://bookings/all").unwrap(),
            CatalogResource::Bookings
        );
        assert_eq!(
            CatalogResource::parse("catalog://availability/3/2030-01-02").unwrap(),
            CatalogResource::Availability {
                turf_id: 3,
                date: "2030-01-02".into()
            }
        );
    }

    #[test]
    fn test_parse_rejects_unknown_uris() {
        assert!(matches!(
            CatalogResource::parse("catalog://nothing"),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            CatalogResource::parse("catalog://availability/x/2030-01-02"),
            Err(AppError::Validation(_))
        ));
    }
}

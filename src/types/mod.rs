use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============= Booking Domain Types =============

/// A bookable turf from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turf {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub hourly_rate: f64,
    pub capacity: i64,
    pub facilities: String,
}

/// A stored booking row, including customer contact details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub turf_id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub booking_date: String,
    pub start_time: String,
    pub end_time: String,
    pub total_cost: f64,
    pub status: String,
}

/// Public view of a booking. Carries no customer details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingSummary {
    pub id: i64,
    pub turf_name: String,
    pub booking_date: String,
    pub start_time: String,
    pub end_time: String,
    pub total_cost: f64,
    pub status: String,
}

/// Raw booking request as received from a tool call, form or JSON body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBooking {
    pub turf_id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    /// `YYYY-MM-DD`
    pub booking_date: String,
    /// `HH:MM`
    pub start_time: String,
    /// `HH:MM`
    pub end_time: String,
}

/// Result of an accepted booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmedBooking {
    pub booking: Booking,
    pub turf_name: String,
    pub duration_hours: f64,
}

/// A whole-hour slot inside the operating window, `[hour, hour + 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeSlot {
    pub hour: u32,
}

impl TimeSlot {
    pub fn label(&self) -> String {
        format!("{:02}:00 - {:02}:00", self.hour, self.hour + 1)
    }
}

/// Booked/free split of one turf's operating window on one date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Availability {
    pub turf: Turf,
    pub date: NaiveDate,
    /// Confirmed bookings as `(start, end)` pairs, ordered by start.
    pub bookings: Vec<(String, String)>,
    pub booked: Vec<TimeSlot>,
    pub available: Vec<TimeSlot>,
}

impl Availability {
    pub fn is_fully_available(&self) -> bool {
        self.bookings.is_empty()
    }
}

// ============= API Request/Response Types =============

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

// ============= Tool Types =============

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

// ============= Error Types =============

/// Closed set of failures. Text for end users is produced by
/// [`crate::render::render_error`] at the presentation boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream unavailable: {0}")]
    Upstream(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// The human-readable detail without the kind prefix.
    pub fn detail(&self) -> &str {
        match self {
            AppError::Validation(msg)
            | AppError::Conflict(msg)
            | AppError::NotFound(msg)
            | AppError::Upstream(msg)
            | AppError::Timeout(msg)
            | AppError::Database(msg)
            | AppError::LLM(msg)
            | AppError::Config(msg)
            | AppError::Internal(msg) => msg,
        }
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Database(_)
            | AppError::LLM(_)
            | AppError::Config(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "error": self.detail()
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<crate::utils::toml_config::ConfigError> for AppError {
    fn from(err: crate::utils::toml_config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

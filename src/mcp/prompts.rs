//! Turf booking prompt templates
//!
//! Each prompt renders to a single user message that tells the model which
//! booking tools to call. The same catalog backs the MCP prompt endpoints
//! and the dashboard's smart prompts.

use std::collections::HashMap;

use rmcp::model::{GetPromptResult, Prompt, PromptArgument, PromptMessage, PromptMessageRole};

use crate::types::{AppError, Result};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ArgSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PromptSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub arguments: &'static [ArgSpec],
}

const fn arg(name: &'static str, description: &'static str, required: bool) -> ArgSpec {
    ArgSpec {
        name,
        description,
        required,
    }
}

pub const CATALOG: &[PromptSpec] = &[
    PromptSpec {
        name: "check-availability",
        description: "Check turf availability for a specific date and turf",
        arguments: &[
            arg("turf_id", "ID of the turf to check", true),
            arg("date", "Date to check availability (YYYY-MM-DD format)", true),
            arg(
                "preferred_time",
                "Preferred time slot (optional, e.g., '14:00-16:00')",
                false,
            ),
        ],
    },
    PromptSpec {
        name: "list-turfs",
        description: "Get information about all available turfs",
        arguments: &[arg(
            "filter_by",
            "Optional filter (e.g., 'location', 'price_range')",
            false,
        )],
    },
    PromptSpec {
        name: "make-booking",
        description: "Make a turf booking with customer details",
        arguments: &[
            arg("turf_id", "ID of the turf to book", true),
            arg("customer_name", "Customer's name", true),
            arg("customer_phone", "Customer's phone number", true),
            arg("booking_date", "Date for booking (YYYY-MM-DD)", true),
            arg("start_time", "Start time (HH:MM format)", true),
            arg("end_time", "End time (HH:MM format)", true),
        ],
    },
    PromptSpec {
        name: "view-bookings",
        description: "View current bookings",
        arguments: &[
            arg(
                "date_filter",
                "Optional date to filter bookings (YYYY-MM-DD)",
                false,
            ),
            arg("turf_filter", "Optional turf ID to filter bookings", false),
        ],
    },
    PromptSpec {
        name: "booking-summary",
        description: "Generate a booking summary and recommendations",
        arguments: &[
            arg("turf_id", "Turf ID for the summary", true),
            arg(
                "date_range",
                "Date range for summary (e.g., 'this_week', 'next_month')",
                false,
            ),
        ],
    },
];

pub fn find(name: &str) -> Option<&'static PromptSpec> {
    CATALOG.iter().find(|spec| spec.name == name)
}

/// A rendered prompt: one user message.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPrompt {
    pub description: String,
    pub text: String,
}

fn value<'a>(args: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    args.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Fill a prompt template. Blank values count as absent.
pub fn render(name: &str, args: &HashMap<String, String>) -> Result<RenderedPrompt> {
    let spec = find(name).ok_or_else(|| AppError::NotFound(format!("Prompt not found: {}", name)))?;

    let get = |key: &str| value(args, key);

    if let Some(missing) = spec
        .arguments
        .iter()
        .find(|a| a.required && get(a.name).is_none())
    {
        return Err(AppError::Validation(format!(
            "Missing required argument '{}' for prompt '{}'",
            missing.name, name
        )));
    }
    let req = |key: &str| get(key).unwrap_or_default();

    let text = match spec.name {
        "check-availability" => {
            let time = get("preferred_time")
                .map(|t| format!(" for preferred time {}", t))
                .unwrap_or_default();
            format!(
                "Check the availability of turf {} on {}{}. \
                 Please use the check_turf_availability tool and show me all available time slots \
                 along with any existing bookings. Also provide the turf details like location and rates.",
                req("turf_id"),
                req("date"),
                time
            )
        }
        "list-turfs" => {
            let filter = get("filter_by")
                .map(|f| format!(" filtered by {}", f))
                .unwrap_or_default();
            format!(
                "Show me all available turfs{}. \
                 Please use the get_all_turfs tool and display the complete information including \
                 IDs, names, locations, rates per hour, capacity, and facilities for each turf.",
                filter
            )
        }
        "make-booking" => format!(
            "Please make a booking for turf {} with the following details:\n\
             Customer Name: {}\n\
             Phone: {}\n\
             Date: {}\n\
             Time: {} to {}\n\n\
             Use the make_booking tool to process this booking. First check if the slot is available, \
             then proceed with the booking and provide confirmation details including total cost.",
            req("turf_id"),
            req("customer_name"),
            req("customer_phone"),
            req("booking_date"),
            req("start_time"),
            req("end_time")
        ),
        "view-bookings" => {
            let filter = match (get("date_filter"), get("turf_filter")) {
                (Some(date), Some(turf)) => format!(" for turf {} on {}", turf, date),
                (Some(date), None) => format!(" for {}", date),
                (None, Some(turf)) => format!(" for turf {}", turf),
                (None, None) => String::new(),
            };
            format!(
                "Show me all current bookings{}. \
                 Please use the get_all_bookings tool and display the booking information \
                 in a clear, organized format including booking IDs, turf names, dates, times, \
                 costs, and status.",
                filter
            )
        }
        "booking-summary" => format!(
            "Generate a comprehensive summary for turf {} ({}). Please:\n\
             1. Use get_all_turfs to get turf details\n\
             2. Use get_all_bookings to get booking information\n\
             3. Use check_turf_availability to check upcoming availability\n\n\
             Provide insights on booking patterns, popular time slots, revenue information, \
             and recommendations for optimal booking times.",
            req("turf_id"),
            get("date_range").unwrap_or("current")
        ),
        other => {
            return Err(AppError::Internal(format!(
                "Prompt {} has no template",
                other
            )))
        }
    };

    Ok(RenderedPrompt {
        description: spec.description.to_string(),
        text,
    })
}

/// MCP listing entry for a catalog prompt.
pub fn to_prompt(spec: &PromptSpec) -> Prompt {
    Prompt::new(
        spec.name,
        Some(spec.description),
        Some(
            spec.arguments
                .iter()
                .map(|a| PromptArgument {
                    name: a.name.to_string(),
                    title: None,
                    description: Some(a.description.to_string()),
                    required: Some(a.required),
                })
                .collect(),
        ),
    )
}

pub fn to_result(rendered: RenderedPrompt) -> GetPromptResult {
    GetPromptResult {
        description: Some(rendered.description),
        messages: vec![PromptMessage::new_text(
            PromptMessageRole::User,
            rendered.text,
        )],
    }
}

/// Prompt arguments arrive as a JSON object; keep the string values and
/// stringify numbers.
pub fn string_args(arguments: Option<&serde_json::Map<String, serde_json::Value>>) -> HashMap<String, String> {
    arguments
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| match v {
                    serde_json::Value::String(s) => Some((k.clone(), s.clone())),
                    serde_json::Value::Number(n) => Some((k.clone(), n.to_string())),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

//! API request handlers.

/// Turf catalog, availability and booking JSON endpoints.
pub mod booking;
/// Agent chat, prompt templates, status and health.
pub mod chat;
/// HTML dashboard pages and form posts.
pub mod dashboard;

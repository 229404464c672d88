//! Dashboard HTTP layer
//!
//! Built on axum. Blocking agent calls run on the blocking pool.
//!
//! # Pages
//!
//! - `GET /` - HTML dashboard with availability, booking and chat forms
//! - `POST /dashboard/availability` - availability form
//! - `POST /dashboard/book` - booking form
//! - `POST /dashboard/chat` - chat form
//! - `GET /health` - health check
//!
//! # JSON API (`/api`)
//!
//! - `GET /api/turfs` - turfs ordered by name
//! - `GET /api/bookings` - bookings without customer details
//! - `POST /api/bookings` - create a booking
//! - `GET /api/availability/{turf_id}/{date}` - booked and free slots
//! - `POST /api/chat` - send a message to the agent
//! - `GET /api/prompts` - prompt template catalog
//! - `POST /api/prompts/{name}` - run a prompt template through the agent
//! - `GET /api/agent/status` - agent initialization and worker state
//!
//! Errors are returned as `{"error": "..."}` with a status per error kind.

/// Request and response handlers for all endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

pub use routes::{app, create_router};

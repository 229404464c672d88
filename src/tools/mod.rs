//! Built-in tools
//!
//! Every capability the MCP servers expose is first a [`Tool`]: the servers
//! wrap these, and the agent can also call them in process through a
//! [`ToolRegistry`].
//!
//! # Module Structure
//!
//! - [`calculator`] - `add` and `multiply` on integers
//! - [`weather`] - current conditions from WeatherAPI.com
//! - [`pdf`] - load PDFs and answer questions about them
//! - [`booking`] - turf catalog, bookings, availability and reservations
//! - [`registry`] - tool registration and dispatch
//!
//! ```ignore
//! let mut registry = ToolRegistry::new();
//! registry.register(Arc::new(calculator::Add));
//! let sum = registry.execute("add", json!({"a": 2, "b": 3})).await?;
//! ```

pub mod booking;
pub mod calculator;
pub mod pdf;
pub mod registry;
pub mod weather;

pub use registry::{Tool, ToolRegistry};

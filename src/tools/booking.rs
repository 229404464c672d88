//! Turf booking tools and the service they share with the MCP server and
//! the dashboard.

use crate::booking::{parse_date, Clock, OperatingWindow};
use crate::db::TurfStore;
use crate::render;
use crate::tools::registry::{int_arg, str_arg, Tool};
use crate::types::{ConfirmedBooking, NewBooking, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

/// Store, clock and presentation settings behind every booking surface.
#[derive(Clone)]
pub struct BookingService {
    store: Arc<TurfStore>,
    clock: Arc<dyn Clock>,
    currency: String,
}

impl BookingService {
    pub fn new(store: Arc<TurfStore>, clock: Arc<dyn Clock>, currency: impl Into<String>) -> Self {
        Self {
            store,
            clock,
            currency: currency.into(),
        }
    }

    pub fn store(&self) -> &Arc<TurfStore> {
        &self.store
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn window(&self) -> OperatingWindow {
        self.store.window()
    }

    pub async fn turfs_text(&self) -> Result<String> {
        Ok(render::turf_list(&self.store.list_turfs().await?, &self.currency))
    }

    pub async fn bookings_text(&self) -> Result<String> {
        Ok(render::booking_list(
            &self.store.list_bookings().await?,
            &self.currency,
        ))
    }

    pub async fn availability_text(&self, turf_id: i64, date: &str) -> Result<String> {
        let date = parse_date(date)?;
        let avail = self.store.availability(turf_id, date).await?;
        Ok(render::availability(&avail, &self.window(), &self.currency))
    }

    pub async fn book(&self, request: &NewBooking) -> Result<ConfirmedBooking> {
        self.store.book(request, self.clock.now()).await
    }

    pub async fn book_text(&self, request: &NewBooking) -> Result<String> {
        let confirmed = self.book(request).await?;
        Ok(render::confirmation(&confirmed, &self.currency))
    }
}

pub struct GetAllTurfs(pub BookingService);

#[async_trait]
impl Tool for GetAllTurfs {
    fn name(&self) -> &str {
        "get_all_turfs"
    }

    fn description(&self) -> &str {
        "List every turf with its ID, name, location, hourly rate, capacity and facilities"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _args: Value) -> Result<Value> {
        Ok(Value::String(self.0.turfs_text().await?))
    }
}

pub struct GetAllBookings(pub BookingService);

#[async_trait]
impl Tool for GetAllBookings {
    fn name(&self) -> &str {
        "get_all_bookings"
    }

    fn description(&self) -> &str {
        "List all bookings with turf name, date, time, cost and status"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _args: Value) -> Result<Value> {
        Ok(Value::String(self.0.bookings_text().await?))
    }
}

pub struct CheckTurfAvailability(pub BookingService);

#[async_trait]
impl Tool for CheckTurfAvailability {
    fn name(&self) -> &str {
        "check_turf_availability"
    }

    fn description(&self) -> &str {
        "Show booked and available hourly slots for a turf on a date"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "turf_id": { "type": "integer", "description": "Turf ID" },
                "date": { "type": "string", "description": "Date in YYYY-MM-DD format" }
            },
            "required": ["turf_id", "date"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let turf_id = int_arg(&args, "turf_id")?;
        let date = str_arg(&args, "date")?;
        Ok(Value::String(self.0.availability_text(turf_id, date).await?))
    }
}

pub struct MakeBooking(pub BookingService);

#[async_trait]
impl Tool for MakeBooking {
    fn name(&self) -> &str {
        "make_booking"
    }

    fn description(&self) -> &str {
        "Book a turf for a customer. Rejects past slots and overlaps with existing bookings"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "turf_id": { "type": "integer", "description": "Turf ID" },
                "customer_name": { "type": "string" },
                "customer_phone": { "type": "string" },
                "booking_date": { "type": "string", "description": "YYYY-MM-DD" },
                "start_time": { "type": "string", "description": "HH:MM (24h)" },
                "end_time": { "type": "string", "description": "HH:MM (24h)" }
            },
            "required": ["turf_id", "customer_name", "customer_phone", "booking_date", "start_time", "end_time"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let request = NewBooking {
            turf_id: int_arg(&args, "turf_id")?,
            customer_name: str_arg(&args, "customer_name")?.to_string(),
            customer_phone: str_arg(&args, "customer_phone")?.to_string(),
            booking_date: str_arg(&args, "booking_date")?.to_string(),
            start_time: str_arg(&args, "start_time")?.to_string(),
            end_time: str_arg(&args, "end_time")?.to_string(),
        };
        Ok(Value::String(self.0.book_text(&request).await?))
    }
}

/// The four booking tools over one service.
pub fn booking_tools(service: &BookingService) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(GetAllTurfs(service.clone())),
        Arc::new(GetAllBookings(service.clone())),
        Arc::new(CheckTurfAvailability(service.clone())),
        Arc::new(MakeBooking(service.clone())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::FixedClock;
    use crate::types::AppError;

    async fn service() -> BookingService {
        let store = TurfStore::new_memory().await.unwrap();
        store
            .seed_if_empty(parse_date("2030-01-01").unwrap())
            .await
            .unwrap();
        let now = parse_date("2030-01-01")
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        BookingService::new(Arc::new(store), Arc::new(FixedClock(now)), "₹")
    }

    #[tokio::test]
    async fn test_make_booking_tool_confirms() {
        let tool = MakeBooking(service().await);
        let text = tool
            .execute(json!({
                "turf_id": 1,
                "customer_name": "Asha",
                "customer_phone": "9840012345",
                "booking_date": "2030-01-01",
                "start_time": "14:00",
                "end_time": "16:00"
            }))
            .await
            .unwrap();
        let text = text.as_str().unwrap();
        assert!(text.starts_with("✅ Booking Confirmed!"));
        assert!(text.contains("Total Cost: ₹1600"));
    }

    #[tokio::test]
    async fn test_availability_tool_rejects_bad_date() {
        let tool = CheckTurfAvailability(service().await);
        let err = tool
            .execute(json!({"turf_id": 1, "date": "01/01/2030"}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_turfs_tool_lists_catalog() {
        let tool = GetAllTurfs(service().await);
        let text = tool.execute(json!({})).await.unwrap();
        assert_eq!(text.as_str().unwrap().matches("ID: ").count(), 5);
    }
}

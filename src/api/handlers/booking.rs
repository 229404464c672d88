use crate::{
    booking::{format_date, parse_date},
    types::{Availability, BookingSummary, ConfirmedBooking, NewBooking, Result, Turf},
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

/// Availability as returned by the JSON API, with slot labels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailabilityView {
    pub turf_id: i64,
    pub turf_name: String,
    pub date: String,
    pub hourly_rate: f64,
    pub bookings: Vec<BookedRange>,
    pub booked_slots: Vec<String>,
    pub available_slots: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookedRange {
    pub start_time: String,
    pub end_time: String,
}

impl From<Availability> for AvailabilityView {
    fn from(avail: Availability) -> Self {
        Self {
            turf_id: avail.turf.id,
            turf_name: avail.turf.name,
            date: format_date(avail.date),
            hourly_rate: avail.turf.hourly_rate,
            bookings: avail
                .bookings
                .into_iter()
                .map(|(start_time, end_time)| BookedRange {
                    start_time,
                    end_time,
                })
                .collect(),
            booked_slots: avail.booked.iter().map(|s| s.label()).collect(),
            available_slots: avail.available.iter().map(|s| s.label()).collect(),
        }
    }
}

/// List turfs ordered by name
pub async fn list_turfs(State(state): State<AppState>) -> Result<Json<Vec<Turf>>> {
    Ok(Json(state.bookings.store().list_turfs().await?))
}

/// List bookings without customer details
pub async fn list_bookings(State(state): State<AppState>) -> Result<Json<Vec<BookingSummary>>> {
    Ok(Json(state.bookings.store().list_bookings().await?))
}

pub async fn availability(
    State(state): State<AppState>,
    Path((turf_id, date)): Path<(i64, String)>,
) -> Result<Json<AvailabilityView>> {
    let date = parse_date(&date)?;
    let avail = state.bookings.store().availability(turf_id, date).await?;
    Ok(Json(avail.into()))
}

pub async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<NewBooking>,
) -> Result<(StatusCode, Json<ConfirmedBooking>)> {
    let confirmed = state.bookings.book(&payload).await?;
    tracing::info!(
        booking_id = confirmed.booking.id,
        turf_id = payload.turf_id,
        date = %payload.booking_date,
        "booking created via API"
    );
    Ok((StatusCode::CREATED, Json(confirmed)))
}

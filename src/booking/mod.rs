//! Turf booking rules
//!
//! Pure functions behind the reservation flow: parsing, the operating
//! window, overlap detection, availability split and pricing. Nothing here
//! touches the database; [`crate::db::TurfStore`] applies these rules inside
//! its transaction.
//!
//! Intervals are half-open, `[start, end)`, so a booking ending at 16:00
//! never conflicts with one starting at 16:00.

use crate::types::{AppError, NewBooking, Result, TimeSlot};
use crate::utils::toml_config::BookingConfig;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

const FORMAT_HINT: &str =
    "Invalid date or time format. Use YYYY-MM-DD for date and HH:MM for time";

/// Source of "now" for the past-booking rule.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| AppError::Validation(FORMAT_HINT.to_string()))
}

pub fn parse_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
        .map_err(|_| AppError::Validation(FORMAT_HINT.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// A half-open wall-clock interval within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self> {
        if end <= start {
            return Err(AppError::Validation(
                "End time must be after start time".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_time(start)?, parse_time(end)?)
    }

    /// True unless one interval ends at or before the other starts.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        !(self.end <= other.start || self.start >= other.end)
    }

    pub fn duration_hours(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64 / 3600.0
    }
}

/// Contiguous whole-hour slots a turf can be booked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatingWindow {
    pub open_hour: u32,
    pub close_hour: u32,
}

impl Default for OperatingWindow {
    fn default() -> Self {
        Self {
            open_hour: 6,
            close_hour: 23,
        }
    }
}

impl From<&BookingConfig> for OperatingWindow {
    fn from(config: &BookingConfig) -> Self {
        Self {
            open_hour: config.open_hour,
            close_hour: config.close_hour,
        }
    }
}

impl OperatingWindow {
    pub fn slots(&self) -> Vec<TimeSlot> {
        (self.open_hour..self.close_hour)
            .map(|hour| TimeSlot { hour })
            .collect()
    }

    /// The interval a slot covers. A slot ending at 24:00 is capped at 23:59:59.
    pub fn slot_range(&self, slot: TimeSlot) -> TimeRange {
        let start = NaiveTime::from_hms_opt(slot.hour, 0, 0).unwrap_or(NaiveTime::MIN);
        let end = NaiveTime::from_hms_opt(slot.hour + 1, 0, 0)
            .or_else(|| NaiveTime::from_hms_opt(23, 59, 59))
            .unwrap_or(NaiveTime::MIN);
        TimeRange { start, end }
    }

    pub fn label(&self) -> String {
        format!("{:02}:00 - {:02}:00", self.open_hour, self.close_hour)
    }
}

/// Split the window into (booked, available). A slot is booked when any
/// booking overlaps it, so the two lists always partition the window.
pub fn split_slots(
    window: &OperatingWindow,
    bookings: &[TimeRange],
) -> (Vec<TimeSlot>, Vec<TimeSlot>) {
    window.slots().into_iter().partition(|slot| {
        let range = window.slot_range(*slot);
        bookings.iter().any(|b| b.overlaps(&range))
    })
}

/// First existing interval the candidate collides with.
pub fn find_conflict(candidate: &TimeRange, existing: &[TimeRange]) -> Option<TimeRange> {
    existing.iter().copied().find(|e| candidate.overlaps(e))
}

pub fn cost(range: &TimeRange, hourly_rate: f64) -> f64 {
    range.duration_hours() * hourly_rate
}

/// A booking request whose fields have been parsed and checked against the
/// clock. Turf existence and conflicts are checked by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedBooking {
    pub turf_id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub date: NaiveDate,
    pub range: TimeRange,
}

impl ValidatedBooking {
    pub fn start_instant(&self) -> NaiveDateTime {
        self.date.and_time(self.range.start)
    }
}

/// Parse and check a raw request.
///
/// Order matters for the reported message: format, then past start, then
/// end-after-start.
pub fn validate(request: &NewBooking, now: NaiveDateTime) -> Result<ValidatedBooking> {
    let date = parse_date(&request.booking_date)?;
    let start = parse_time(&request.start_time)?;
    let end = parse_time(&request.end_time)?;

    if date.and_time(start) < now {
        return Err(AppError::Validation(
            "Cannot book slots in the past".to_string(),
        ));
    }

    let range = TimeRange::new(start, end)?;

    let customer_name = request.customer_name.trim();
    let customer_phone = request.customer_phone.trim();
    if customer_name.is_empty() || customer_phone.is_empty() {
        return Err(AppError::Validation(
            "Customer name and phone are required".to_string(),
        ));
    }

    Ok(ValidatedBooking {
        turf_id: request.turf_id,
        customer_name: customer_name.to_string(),
        customer_phone: customer_phone.to_string(),
        date,
        range,
    })
}

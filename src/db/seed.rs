//! Fixed demo catalog loaded into an empty database.

use chrono::{Days, NaiveDate};

pub(crate) struct SeedTurf {
    pub name: &'static str,
    pub location: &'static str,
    pub hourly_rate: f64,
    pub capacity: i64,
    pub facilities: &'static str,
}

pub(crate) const TURFS: &[SeedTurf] = &[
    SeedTurf {
        name: "Green Valley Turf",
        location: "Chennai - Velachery",
        hourly_rate: 800.0,
        capacity: 22,
        facilities: "Floodlights, Parking, Restrooms",
    },
    SeedTurf {
        name: "City Sports Arena",
        location: "Chennai - T Nagar",
        hourly_rate: 1200.0,
        capacity: 22,
        facilities: "Floodlights, Parking, Restrooms, Cafeteria",
    },
    SeedTurf {
        name: "Phoenix Turf",
        location: "Chennai - OMR",
        hourly_rate: 1000.0,
        capacity: 18,
        facilities: "Floodlights, Parking, Equipment Rental",
    },
    SeedTurf {
        name: "Champions Ground",
        location: "Chennai - Adyar",
        hourly_rate: 1500.0,
        capacity: 22,
        facilities: "Premium Grass, Floodlights, Parking, Restrooms, Changing Rooms",
    },
    SeedTurf {
        name: "Sportz Zone",
        location: "Chennai - Porur",
        hourly_rate: 900.0,
        capacity: 20,
        facilities: "Floodlights, Parking, Restrooms",
    },
];

pub(crate) struct SeedBooking {
    pub turf_id: i64,
    pub customer_name: &'static str,
    pub customer_phone: &'static str,
    /// Days after the seeding day
    pub day_offset: u64,
    pub start_time: &'static str,
    pub end_time: &'static str,
}

pub(crate) const BOOKINGS: &[SeedBooking] = &[
    SeedBooking {
        turf_id: 1,
        customer_name: "Rajesh Kumar",
        customer_phone: "9876543210",
        day_offset: 0,
        start_time: "06:00",
        end_time: "08:00",
    },
    SeedBooking {
        turf_id: 1,
        customer_name: "Priya Sharma",
        customer_phone: "9876543211",
        day_offset: 0,
        start_time: "18:00",
        end_time: "20:00",
    },
    SeedBooking {
        turf_id: 2,
        customer_name: "Arun Raj",
        customer_phone: "9876543212",
        day_offset: 1,
        start_time: "09:00",
        end_time: "11:00",
    },
    SeedBooking {
        turf_id: 3,
        customer_name: "Karthik S",
        customer_phone: "9876543213",
        day_offset: 1,
        start_time: "16:00",
        end_time: "18:00",
    },
    SeedBooking {
        turf_id: 4,
        customer_name: "Divya M",
        customer_phone: "9876543214",
        day_offset: 2,
        start_time: "10:00",
        end_time: "12:00",
    },
];

impl SeedBooking {
    pub fn date(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_add_days(Days::new(self.day_offset))
            .unwrap_or(today)
    }
}

#![allow(dead_code)]

pub mod mocks;

use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;
use tooldeck::booking::FixedClock;
use tooldeck::db::DatabaseProvider;
use tooldeck::tools::booking::BookingService;

/// Monday 2030-01-07, 09:30
pub fn now() -> NaiveDateTime {
    today().and_hms_opt(9, 30, 0).unwrap()
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 1, 7).unwrap()
}

pub fn day(offset: u64) -> String {
    today()
        .checked_add_days(chrono::Days::new(offset))
        .unwrap()
        .format("%Y-%m-%d")
        .to_string()
}

/// In-memory store, seeded relative to [`today`], behind a fixed clock.
pub async fn seeded_service() -> BookingService {
    let store = DatabaseProvider::Memory.open().await.unwrap();
    store.seed_if_empty(today()).await.unwrap();
    BookingService::new(Arc::new(store), Arc::new(FixedClock(now())), "₹")
}

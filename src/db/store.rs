use crate::booking::{self, format_date, format_time, OperatingWindow, TimeRange};
use crate::db::seed;
use crate::types::{
    AppError, Availability, Booking, BookingSummary, ConfirmedBooking, NewBooking, Result, Turf,
};
use chrono::{NaiveDate, NaiveDateTime};
use libsql::{Builder, Connection, Database, Row, TransactionBehavior};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// How long a write waits on a lock held by another process.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Turf catalog and bookings on a local libsql database.
///
/// One connection is shared by every caller. Writes that must be atomic
/// (the booking insert) additionally hold `write_lock` and run inside an
/// `IMMEDIATE` transaction, so the conflict check and the insert can never
/// interleave with another booking. Other processes (the dashboard and a
/// `serve booking` child) may open the same file; their writes are
/// serialized by SQLite's lock, waited on for up to the busy timeout.
pub struct TurfStore {
    // Owns the database the connection belongs to.
    _db: Database,
    conn: Connection,
    write_lock: Mutex<()>,
    window: OperatingWindow,
}

impl TurfStore {
    /// In-memory database. Lives as long as the store.
    pub async fn new_memory() -> Result<Self> {
        Self::new_local(":memory:").await
    }

    /// File-backed database, created if missing.
    pub async fn new_local(path: &str) -> Result<Self> {
        Self::connect(path, DEFAULT_BUSY_TIMEOUT).await
    }

    /// Open `path` (or `:memory:`) with an explicit busy timeout. File
    /// databases use WAL so readers never wait on a booking in progress.
    pub async fn connect(path: &str, busy_timeout: Duration) -> Result<Self> {
        if path != ":memory:" {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        AppError::Database(format!("Failed to create {:?}: {}", parent, e))
                    })?;
                }
            }
        }

        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database {}: {}", path, e)))?;
        let conn = db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))?;

        pragma(&conn, &format!("PRAGMA busy_timeout = {}", busy_timeout.as_millis())).await?;
        if path != ":memory:" {
            pragma(&conn, "PRAGMA journal_mode = WAL").await?;
        }

        let store = Self {
            _db: db,
            conn,
            write_lock: Mutex::new(()),
            window: OperatingWindow::default(),
        };
        store.initialize_schema().await?;

        info!(path, "booking store ready");
        Ok(store)
    }

    pub fn with_window(mut self, window: OperatingWindow) -> Self {
        self.window = window;
        self
    }

    pub fn window(&self) -> OperatingWindow {
        self.window
    }

    pub fn connection(&self) -> Connection {
        self.conn.clone()
    }

    async fn initialize_schema(&self) -> Result<()> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS turfs (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    location TEXT NOT NULL,
                    hourly_rate REAL NOT NULL,
                    capacity INTEGER NOT NULL,
                    facilities TEXT
                )",
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to create turfs table: {}", e)))?;

        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS bookings (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    turf_id INTEGER NOT NULL,
                    customer_name TEXT NOT NULL,
                    customer_phone TEXT NOT NULL,
                    booking_date TEXT NOT NULL,
                    start_time TEXT NOT NULL,
                    end_time TEXT NOT NULL,
                    total_cost REAL NOT NULL,
                    status TEXT NOT NULL DEFAULT 'confirmed',
                    created_at TEXT DEFAULT CURRENT_TIMESTAMP,
                    FOREIGN KEY (turf_id) REFERENCES turfs(id)
                )",
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to create bookings table: {}", e)))?;

        self.conn
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_bookings_turf_date
                 ON bookings (turf_id, booking_date)",
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to create bookings index: {}", e)))?;

        Ok(())
    }

    /// Insert the demo catalog when the turfs table is empty. Returns whether
    /// anything was inserted.
    pub async fn seed_if_empty(&self, today: NaiveDate) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        // The emptiness check runs under the write lock so that two
        // processes opening a fresh file seed it once.
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin seed: {}", e)))?;

        let mut rows = tx
            .query("SELECT COUNT(*) FROM turfs", ())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count turfs: {}", e)))?;
        let count: i64 = match rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            Some(row) => row.get(0).map_err(|e| AppError::Database(e.to_string()))?,
            None => 0,
        };
        drop(rows);
        if count > 0 {
            tx.rollback().await.ok();
            return Ok(false);
        }

        for (idx, turf) in seed::TURFS.iter().enumerate() {
            tx.execute(
                "INSERT INTO turfs (id, name, location, hourly_rate, capacity, facilities)
                 VALUES (?, ?, ?, ?, ?, ?)",
                (
                    idx as i64 + 1,
                    turf.name,
                    turf.location,
                    turf.hourly_rate,
                    turf.capacity,
                    turf.facilities,
                ),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to seed turf: {}", e)))?;
        }

        for seeded in seed::BOOKINGS {
            let range = TimeRange::parse(seeded.start_time, seeded.end_time)?;
            let rate = seed::TURFS
                .get(seeded.turf_id as usize - 1)
                .map(|t| t.hourly_rate)
                .unwrap_or_default();
            tx.execute(
                "INSERT INTO bookings (turf_id, customer_name, customer_phone, booking_date,
                                       start_time, end_time, total_cost, status)
                 VALUES (?, ?, ?, ?, ?, ?, ?, 'confirmed')",
                (
                    seeded.turf_id,
                    seeded.customer_name,
                    seeded.customer_phone,
                    format_date(seeded.date(today)),
                    seeded.start_time,
                    seeded.end_time,
                    booking::cost(&range, rate),
                ),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to seed booking: {}", e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit seed: {}", e)))?;

        info!(
            turfs = seed::TURFS.len(),
            bookings = seed::BOOKINGS.len(),
            "seeded booking store"
        );
        Ok(true)
    }

    pub async fn list_turfs(&self) -> Result<Vec<Turf>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, name, location, hourly_rate, capacity, facilities
                 FROM turfs ORDER BY name",
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query turfs: {}", e)))?;

        let mut turfs = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            turfs.push(turf_from_row(&row)?);
        }
        Ok(turfs)
    }

    pub async fn get_turf(&self, turf_id: i64) -> Result<Option<Turf>> {
        fetch_turf(&self.conn, turf_id).await
    }

    /// Like [`get_turf`](Self::get_turf) but a missing turf is an error.
    pub async fn require_turf(&self, turf_id: i64) -> Result<Turf> {
        self.get_turf(turf_id)
            .await?
            .ok_or_else(|| turf_not_found(turf_id))
    }

    /// Every booking, newest date first. Customer details are not included.
    pub async fn list_bookings(&self) -> Result<Vec<BookingSummary>> {
        let mut rows = self
            .conn
            .query(
                "SELECT b.id, t.name, b.booking_date, b.start_time, b.end_time,
                        b.total_cost, b.status
                 FROM bookings b
                 JOIN turfs t ON b.turf_id = t.id
                 ORDER BY b.booking_date DESC, b.start_time",
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query bookings: {}", e)))?;

        let mut bookings = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            bookings.push(BookingSummary {
                id: row.get(0).map_err(|e| AppError::Database(e.to_string()))?,
                turf_name: row.get(1).map_err(|e| AppError::Database(e.to_string()))?,
                booking_date: row.get(2).map_err(|e| AppError::Database(e.to_string()))?,
                start_time: row.get(3).map_err(|e| AppError::Database(e.to_string()))?,
                end_time: row.get(4).map_err(|e| AppError::Database(e.to_string()))?,
                total_cost: row.get(5).map_err(|e| AppError::Database(e.to_string()))?,
                status: row.get(6).map_err(|e| AppError::Database(e.to_string()))?,
            });
        }
        Ok(bookings)
    }

    /// Confirmed bookings for one turf on one date, ordered by start time.
    pub async fn bookings_for(&self, turf_id: i64, date: NaiveDate) -> Result<Vec<Booking>> {
        fetch_confirmed(&self.conn, turf_id, date).await
    }

    pub async fn availability(&self, turf_id: i64, date: NaiveDate) -> Result<Availability> {
        let turf = self.require_turf(turf_id).await?;
        let bookings = self.bookings_for(turf_id, date).await?;

        let ranges = bookings
            .iter()
            .map(|b| TimeRange::parse(&b.start_time, &b.end_time))
            .collect::<Result<Vec<_>>>()?;
        let (booked, available) = booking::split_slots(&self.window, &ranges);

        Ok(Availability {
            turf,
            date,
            bookings: bookings
                .into_iter()
                .map(|b| (b.start_time, b.end_time))
                .collect(),
            booked,
            available,
        })
    }

    /// Validate and insert a booking as one atomic conditional insert.
    pub async fn book(&self, request: &NewBooking, now: NaiveDateTime) -> Result<ConfirmedBooking> {
        let validated = booking::validate(request, now)?;
        let date = format_date(validated.date);
        let start = format_time(validated.range.start);
        let end = format_time(validated.range.end);

        let _guard = self.write_lock.lock().await;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin booking: {}", e)))?;

        let turf = match fetch_turf(&tx, validated.turf_id).await? {
            Some(turf) => turf,
            None => {
                tx.rollback().await.ok();
                return Err(turf_not_found(validated.turf_id));
            }
        };

        let existing = fetch_confirmed(&tx, turf.id, validated.date)
            .await?
            .iter()
            .map(|b| TimeRange::parse(&b.start_time, &b.end_time))
            .collect::<Result<Vec<_>>>()?;

        if let Some(conflict) = booking::find_conflict(&validated.range, &existing) {
            tx.rollback().await.ok();
            debug!(
                turf_id = turf.id,
                %date,
                existing_start = %format_time(conflict.start),
                "booking rejected: overlap"
            );
            return Err(AppError::Conflict(
                "Time slot conflicts with existing booking. Check availability first.".to_string(),
            ));
        }

        let total_cost = booking::cost(&validated.range, turf.hourly_rate);
        tx.execute(
            "INSERT INTO bookings (turf_id, customer_name, customer_phone, booking_date,
                                   start_time, end_time, total_cost, status)
             VALUES (?, ?, ?, ?, ?, ?, ?, 'confirmed')",
            (
                turf.id,
                validated.customer_name.as_str(),
                validated.customer_phone.as_str(),
                date.as_str(),
                start.as_str(),
                end.as_str(),
                total_cost,
            ),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert booking: {}", e)))?;
        let id = tx.last_insert_rowid();

        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit booking: {}", e)))?;

        info!(booking_id = id, turf_id = turf.id, %date, %start, %end, "booking confirmed");

        Ok(ConfirmedBooking {
            booking: Booking {
                id,
                turf_id: turf.id,
                customer_name: validated.customer_name,
                customer_phone: validated.customer_phone,
                booking_date: date,
                start_time: start,
                end_time: end,
                total_cost,
                status: "confirmed".to_string(),
            },
            turf_name: turf.name,
            duration_hours: validated.range.duration_hours(),
        })
    }
}

/// PRAGMAs that answer with a row run through `query`; stepping once applies them.
async fn pragma(conn: &Connection, statement: &str) -> Result<()> {
    let mut rows = conn
        .query(statement, ())
        .await
        .map_err(|e| AppError::Database(format!("Failed to run {}: {}", statement, e)))?;
    rows.next()
        .await
        .map_err(|e| AppError::Database(format!("Failed to run {}: {}", statement, e)))?;
    Ok(())
}

fn turf_not_found(turf_id: i64) -> AppError {
    AppError::NotFound(format!("Turf with ID {} not found", turf_id))
}

fn turf_from_row(row: &Row) -> Result<Turf> {
    Ok(Turf {
        id: row.get(0).map_err(|e| AppError::Database(e.to_string()))?,
        name: row.get(1).map_err(|e| AppError::Database(e.to_string()))?,
        location: row.get(2).map_err(|e| AppError::Database(e.to_string()))?,
        hourly_rate: row.get(3).map_err(|e| AppError::Database(e.to_string()))?,
        capacity: row.get(4).map_err(|e| AppError::Database(e.to_string()))?,
        facilities: row
            .get::<Option<String>>(5)
            .map_err(|e| AppError::Database(e.to_string()))?
            .unwrap_or_default(),
    })
}

async fn fetch_turf(conn: &Connection, turf_id: i64) -> Result<Option<Turf>> {
    let mut rows = conn
        .query(
            "SELECT id, name, location, hourly_rate, capacity, facilities
             FROM turfs WHERE id = ?",
            [turf_id],
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to query turf: {}", e)))?;

    match rows
        .next()
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
    {
        Some(row) => Ok(Some(turf_from_row(&row)?)),
        None => Ok(None),
    }
}

async fn fetch_confirmed(conn: &Connection, turf_id: i64, date: NaiveDate) -> Result<Vec<Booking>> {
    let mut rows = conn
        .query(
            "SELECT id, turf_id, customer_name, customer_phone, booking_date,
                    start_time, end_time, total_cost, status
             FROM bookings
             WHERE turf_id = ? AND booking_date = ? AND status = 'confirmed'
             ORDER BY start_time",
            (turf_id, format_date(date)),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to query bookings: {}", e)))?;

    let mut bookings = Vec::new();
    while let Some(row) = rows
        .next()
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
    {
        bookings.push(Booking {
            id: row.get(0).map_err(|e| AppError::Database(e.to_string()))?,
            turf_id: row.get(1).map_err(|e| AppError::Database(e.to_string()))?,
            customer_name: row.get(2).map_err(|e| AppError::Database(e.to_string()))?,
            customer_phone: row.get(3).map_err(|e| AppError::Database(e.to_string()))?,
            booking_date: row.get(4).map_err(|e| AppError::Database(e.to_string()))?,
            start_time: row.get(5).map_err(|e| AppError::Database(e.to_string()))?,
            end_time: row.get(6).map_err(|e| AppError::Database(e.to_string()))?,
            total_cost: row.get(7).map_err(|e| AppError::Database(e.to_string()))?,
            status: row.get(8).map_err(|e| AppError::Database(e.to_string()))?,
        });
    }
    Ok(bookings)
}

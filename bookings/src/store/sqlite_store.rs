//! SQLiteBookingStore
//! -------------------
//! SQLite-backed `DesiredBookingStore`. The table layout is shared with the
//! small admin page that members use to queue requests, so column names and
//! the integer status codes must stay as they are:
//!
//!  - `date`   ISO calendar date (`YYYY-MM-DD`)
//!  - `time`   start time (`HH:MM`)
//!  - `status` 0 = pending, 1 = booked
use std::str::FromStr;

use anyhow::{Context, bail};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::sqlite::{SqliteConnectOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::{info, warn};

use super::DesiredBookingStore;
use crate::model::{
    BookingId, BookingStatus, DATE_FORMAT, DesiredBooking, ListFilter, TIME_FORMAT, parse_date,
    parse_time,
};

pub struct SQLiteBookingStore {
    pool: SqlitePool,
}

impl SQLiteBookingStore {
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) the database at `url` and ensure the schema.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let opts = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("invalid database url '{url}'"))?
            .create_if_missing(true);

        let pool = SqlitePool::connect_with(opts)
            .await
            .with_context(|| format!("failed to open database '{url}'"))?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS Booking (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                time TEXT NOT NULL,
                status INTEGER NOT NULL
            );
        "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl DesiredBookingStore for SQLiteBookingStore {
    async fn pending(&self) -> anyhow::Result<Vec<DesiredBooking>> {
        let rows = sqlx::query("SELECT id, date, time, status FROM Booking WHERE status = ? ORDER BY id")
            .bind(BookingStatus::Pending.code())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows_to_bookings(&rows))
    }

    async fn mark_booked(&self, id: BookingId) -> anyhow::Result<()> {
        let result = sqlx::query("UPDATE Booking SET status = ? WHERE id = ?")
            .bind(BookingStatus::Booked.code())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            bail!("no desired booking with id {id}");
        }

        info!(booking_id = id, "updated booking status to booked");
        Ok(())
    }

    async fn create(
        &self,
        date: NaiveDate,
        time: NaiveTime,
    ) -> anyhow::Result<Option<DesiredBooking>> {
        let date_str = date.format(DATE_FORMAT).to_string();
        let time_str = time.format(TIME_FORMAT).to_string();

        let existing: i64 = sqlx::query("SELECT COUNT(*) FROM Booking WHERE date = ? AND time = ?")
            .bind(&date_str)
            .bind(&time_str)
            .fetch_one(&self.pool)
            .await?
            .try_get(0usize)?;

        if existing > 0 {
            warn!(date = %date_str, time = %time_str, "duplicate booking request ignored");
            return Ok(None);
        }

        let result = sqlx::query("INSERT INTO Booking (date, time, status) VALUES (?, ?, ?)")
            .bind(&date_str)
            .bind(&time_str)
            .bind(BookingStatus::Pending.code())
            .execute(&self.pool)
            .await?;

        Ok(Some(DesiredBooking {
            id: result.last_insert_rowid(),
            date,
            time,
            status: BookingStatus::Pending,
        }))
    }

    async fn delete(&self, id: BookingId) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM Booking WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, filter: ListFilter) -> anyhow::Result<Vec<DesiredBooking>> {
        let rows = match filter {
            ListFilter::Status(status) => {
                sqlx::query(
                    "SELECT id, date, time, status FROM Booking WHERE status = ? ORDER BY date ASC, time ASC",
                )
                .bind(status.code())
                .fetch_all(&self.pool)
                .await?
            }
            // ISO dates compare correctly as text
            ListFilter::Upcoming(from) => {
                sqlx::query(
                    "SELECT id, date, time, status FROM Booking WHERE date >= ? ORDER BY date ASC, time ASC",
                )
                .bind(from.format(DATE_FORMAT).to_string())
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows_to_bookings(&rows))
    }
}

/* =========================
Row mapping
========================= */

fn rows_to_bookings(rows: &[SqliteRow]) -> Vec<DesiredBooking> {
    let mut out = Vec::with_capacity(rows.len());
    for r in rows {
        match row_to_booking(r) {
            Ok(b) => out.push(b),
            Err(e) => {
                // a hand-edited row must not block every other request
                warn!(error = %e, "skipping malformed booking row");
            }
        }
    }
    out
}

fn row_to_booking(r: &SqliteRow) -> anyhow::Result<DesiredBooking> {
    let id: i64 = r.try_get("id")?;
    let date: String = r.try_get("date")?;
    let time: String = r.try_get("time")?;
    let status: i64 = r.try_get("status")?;

    Ok(DesiredBooking {
        id,
        date: parse_date(&date).with_context(|| format!("booking {id}"))?,
        time: parse_time(&time).with_context(|| format!("booking {id}"))?,
        status: BookingStatus::from_code(status).with_context(|| format!("booking {id}"))?,
    })
}

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

pub type BookingId = i64;

/// Storage format of the `date` column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Storage format of the `time` column.
pub const TIME_FORMAT: &str = "%H:%M";

/// Pending → Booked is the only transition, and it is never reversed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Booked,
}

impl BookingStatus {
    pub fn code(self) -> i64 {
        match self {
            BookingStatus::Pending => 0,
            BookingStatus::Booked => 1,
        }
    }

    pub fn from_code(code: i64) -> anyhow::Result<Self> {
        match code {
            0 => Ok(BookingStatus::Pending),
            1 => Ok(BookingStatus::Booked),
            other => Err(anyhow::anyhow!("Invalid BookingStatus code: {}", other)),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Booked => "Booked",
        };
        f.write_str(s)
    }
}

impl FromStr for BookingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "booked" => Ok(BookingStatus::Booked),
            other => Err(anyhow::anyhow!("Invalid BookingStatus value: {}", other)),
        }
    }
}

/// Which requests `list` shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFilter {
    /// Every request dated on or after the given day, whatever its status.
    Upcoming(NaiveDate),
    /// Every request with this status, past ones included.
    Status(BookingStatus),
}

/// A (date, time) the member wants a court for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredBooking {
    pub id: BookingId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: BookingStatus,
}

impl DesiredBooking {
    /// True when the start of `date` lies within `[now, now + lookahead]`.
    ///
    /// Dates are compared at midnight, so today's requests are already out
    /// of reach and the last day of the window is still in.
    pub fn is_due(&self, now: NaiveDateTime, lookahead: TimeDelta) -> bool {
        let day_start = self.date.and_time(NaiveTime::MIN);
        // a window reaching past chrono's range has no upper bound
        now <= day_start
            && now
                .checked_add_signed(lookahead)
                .is_none_or(|end| day_start <= end)
    }
}

pub fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| anyhow::anyhow!("invalid date '{}': {}", raw, e))
}

/// Accepts `HH:MM` and `HH:MM:SS`.
pub fn parse_time(raw: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|e| anyhow::anyhow!("invalid time '{}': {}", raw, e))
}

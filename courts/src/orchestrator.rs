use chrono::{NaiveDate, NaiveTime};
use common::logger::{Phase, phase_span};
use serde::Deserialize;
use serde_json::{Value, json};
use session::{SessionError, SessionManager};
use tracing::{Instrument, debug, info};

use crate::priority::CourtId;
use crate::resolver::{CourtChoice, CourtResolver, NoCourtReason, Resolution};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoldStatus {
    Held,
    Provisional,
    #[serde(other)]
    Unknown,
}

/// A court held for the member during one attempt. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingHold {
    pub encoded_booking_reference: String,
    pub court_id: CourtId,
    pub date: String,
    pub start_time: String,
    pub status: HoldStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HoldResponse {
    encoded_booking_reference: String,
    #[serde(default)]
    status: Option<HoldStatus>,
}

#[derive(Debug, Default, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    status: Option<HoldStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedBooking {
    pub choice: CourtChoice,
    pub hold: BookingHold,
}

/// Result of an attempt that did not hit a request error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    Booked(ConfirmedBooking),
    NoCourt(NoCourtReason),
}

impl BookingOutcome {
    pub fn is_booked(&self) -> bool {
        matches!(self, BookingOutcome::Booked(_))
    }
}

/// Drives resolve → hold → make → confirm for one (date, time) request.
///
/// Nothing is caught here: a failed call at any step ends the attempt with
/// the `SessionError` it produced. "No court" is an outcome, not an error.
pub struct BookingOrchestrator {
    session: SessionManager,
    resolver: CourtResolver,
    sports_package_id: u32,
}

impl BookingOrchestrator {
    pub fn new(session: SessionManager, resolver: CourtResolver, sports_package_id: u32) -> Self {
        Self {
            session,
            resolver,
            sports_package_id,
        }
    }

    pub async fn attempt_booking(
        &self,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<BookingOutcome, SessionError> {
        let formats = self.resolver.formats();
        let (date_str, time_str) = (formats.date(date), formats.time(time));
        info!(date = %date_str, time = %time_str, "attempting to book a court");

        let choice = match self
            .resolver
            .resolve(&self.session, date, time)
            .instrument(phase_span(Phase::Resolve))
            .await?
        {
            Resolution::Court(choice) => choice,
            Resolution::NoCourt(reason) => return Ok(BookingOutcome::NoCourt(reason)),
        };

        let hold = self
            .hold(choice.court_id, &date_str, &time_str)
            .instrument(phase_span(Phase::Hold))
            .await?;

        let hold = self
            .confirm(hold)
            .instrument(phase_span(Phase::Confirm))
            .await?;

        info!(
            court = %self.resolver.priority().label(choice.court_id),
            date = %date_str,
            time = %time_str,
            "booked court"
        );

        Ok(BookingOutcome::Booked(ConfirmedBooking { choice, hold }))
    }

    /// Check/hold the court, read recent players, then make the booking.
    async fn hold(
        &self,
        court_id: CourtId,
        date: &str,
        time: &str,
    ) -> Result<BookingHold, SessionError> {
        let member = self.session.member_id();
        let endpoints = self.session.endpoints();

        let url = endpoints.check_court_url();
        let body = self
            .session
            .post(
                &url,
                json!({
                    "bookedMemberEncodedContactId": member,
                    "courtId": court_id,
                    "date": date,
                    "startTime": time,
                    "sportsPackageId": self.sports_package_id,
                    "playersEncodedContactIds": [member],
                }),
            )
            .await?;

        let held: HoldResponse =
            serde_json::from_value(body).map_err(|source| SessionError::Decode { url, source })?;
        info!(
            court = %self.resolver.priority().label(court_id),
            date,
            time,
            "checked court"
        );

        let hold = BookingHold {
            encoded_booking_reference: held.encoded_booking_reference,
            court_id,
            date: date.to_string(),
            start_time: time.to_string(),
            status: held.status.unwrap_or(HoldStatus::Held),
        };

        // Mirrors what the web client does between hold and booking. Failures
        // propagate like any other call.
        self.session.get(&endpoints.recent_players_url()).await?;
        debug!("fetched recent players");

        self.session
            .put(
                &endpoints.booking_url(&hold.encoded_booking_reference),
                json!({ "playersEncodedContactIds": [member] }),
            )
            .await?;
        info!("made booking");

        Ok(hold)
    }

    async fn confirm(&self, mut hold: BookingHold) -> Result<BookingHold, SessionError> {
        let url = self
            .session
            .endpoints()
            .confirm_url(&hold.encoded_booking_reference);

        let body = self
            .session
            .post(&url, json!({ "courtConfirmationType": "provisional" }))
            .await?;

        hold.status = status_of(body).unwrap_or(HoldStatus::Provisional);
        info!(status = ?hold.status, "confirmed booking");
        Ok(hold)
    }
}

fn status_of(body: Value) -> Option<HoldStatus> {
    serde_json::from_value::<StatusResponse>(body)
        .unwrap_or_default()
        .status
}

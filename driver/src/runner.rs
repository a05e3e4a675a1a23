//! One cron run: walk the due requests in order, one attempt at a time.
//!
//! Per-request failures are logged and skipped so the remaining requests
//! still get their turn; the failed request stays pending for the next run.
//! A fatal session error ends the run.

use anyhow::Context;
use bookings::DesiredBookingStore;
use chrono::{NaiveDateTime, TimeDelta};
use courts::{BookingOrchestrator, BookingOutcome};
use tracing::{Instrument, error, info, info_span};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub attempted: usize,
    pub booked: usize,
    pub no_court: usize,
    pub failed: usize,
}

pub async fn run_pending(
    orchestrator: &BookingOrchestrator,
    store: &dyn DesiredBookingStore,
    now: NaiveDateTime,
    lookahead: TimeDelta,
) -> anyhow::Result<RunSummary> {
    let due = store
        .pending_due(now, lookahead)
        .await
        .context("failed to load pending bookings")?;

    info!(
        count = due.len(),
        lookahead_days = lookahead.num_days(),
        "pending bookings due"
    );

    let mut summary = RunSummary::default();

    for booking in due {
        summary.attempted += 1;

        let span = info_span!(
            "booking",
            booking_id = booking.id,
            date = %booking.date,
            time = %booking.time
        );

        let outcome = orchestrator
            .attempt_booking(booking.date, booking.time)
            .instrument(span.clone())
            .await;

        match outcome {
            Ok(BookingOutcome::Booked(_)) => {
                // committed straight away so a crash later in the run cannot
                // lose it
                store
                    .mark_booked(booking.id)
                    .instrument(span)
                    .await
                    .with_context(|| {
                        format!("booked court but failed to record booking {}", booking.id)
                    })?;
                summary.booked += 1;
            }
            Ok(BookingOutcome::NoCourt(reason)) => {
                span.in_scope(|| info!(?reason, "no court booked, request stays pending"));
                summary.no_court += 1;
            }
            Err(e) if e.is_fatal() => {
                span.in_scope(|| error!(error = %e, "fatal error, abandoning the run"));
                return Err(anyhow::Error::new(e)
                    .context(format!("run aborted at booking {}", booking.id)));
            }
            Err(e) => {
                span.in_scope(|| {
                    error!(
                        error = %e,
                        date = %booking.date,
                        time = %booking.time,
                        "failed trying to book court"
                    )
                });
                summary.failed += 1;
            }
        }
    }

    info!(
        attempted = summary.attempted,
        booked = summary.booked,
        no_court = summary.no_court,
        failed = summary.failed,
        "run finished"
    );

    Ok(summary)
}

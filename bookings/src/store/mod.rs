pub mod sqlite_store;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::model::{BookingId, DesiredBooking, ListFilter};

#[async_trait::async_trait]
pub trait DesiredBookingStore: Send + Sync {
    /// Every pending request, in insertion order.
    async fn pending(&self) -> anyhow::Result<Vec<DesiredBooking>>;

    async fn mark_booked(&self, id: BookingId) -> anyhow::Result<()>;

    /// Queue a new request. `None` when one already exists for the same
    /// date and time.
    async fn create(&self, date: NaiveDate, time: NaiveTime)
    -> anyhow::Result<Option<DesiredBooking>>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: BookingId) -> anyhow::Result<bool>;

    /// Ordered by date then time.
    async fn list(&self, filter: ListFilter) -> anyhow::Result<Vec<DesiredBooking>>;

    /// Pending requests whose date is due within the lookahead window.
    async fn pending_due(
        &self,
        now: NaiveDateTime,
        lookahead: TimeDelta,
    ) -> anyhow::Result<Vec<DesiredBooking>> {
        let pending = self.pending().await?;
        Ok(pending
            .into_iter()
            .filter(|b| b.is_due(now, lookahead))
            .collect())
    }
}

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::Value;
use session::{SessionError, SessionManager};
use tracing::info;

use crate::priority::{CourtId, CourtPriority, Tier};

/// One bookable slot as listed by the availability endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtSlot {
    pub court_id: CourtId,
    pub start_time: String,
    #[serde(default)]
    pub duration: u32,
}

#[derive(Debug, Deserialize)]
struct AvailabilityResponse {
    #[serde(default)]
    slots: Vec<CourtSlot>,
}

/// Wire formats for dates and start times. Slot matching compares the
/// formatted time against `startTime` as plain strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SlotFormats {
    pub date: String,
    pub time: String,
}

impl Default for SlotFormats {
    fn default() -> Self {
        Self {
            date: "%Y-%m-%d".into(),
            time: "%H:%M".into(),
        }
    }
}

impl SlotFormats {
    pub fn date(&self, date: NaiveDate) -> String {
        date.format(&self.date).to_string()
    }

    pub fn time(&self, time: NaiveTime) -> String {
        time.format(&self.time).to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourtChoice {
    pub court_id: CourtId,
    pub tier: Tier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoCourtReason {
    /// The service listed nothing at all for the date: soft blocked, or we
    /// already hold that slot.
    NoSlots,
    /// Slots exist, but none at the requested time on a listed court.
    NoEligibleCourt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Court(CourtChoice),
    NoCourt(NoCourtReason),
}

pub struct CourtResolver {
    priority: CourtPriority,
    formats: SlotFormats,
}

impl CourtResolver {
    pub fn new(priority: CourtPriority, formats: SlotFormats) -> Self {
        Self { priority, formats }
    }

    pub fn priority(&self) -> &CourtPriority {
        &self.priority
    }

    pub fn formats(&self) -> &SlotFormats {
        &self.formats
    }

    /// All slots the service lists for `date`. Empty is a normal answer.
    pub async fn find_available_courts(
        &self,
        session: &SessionManager,
        date: NaiveDate,
    ) -> Result<Vec<CourtSlot>, SessionError> {
        let date = self.formats.date(date);
        let url = session.endpoints().courts_url(&date, session.member_id());

        let body = session.get(&url).await?;
        let slots = parse_slots(body).map_err(|source| SessionError::Decode { url, source })?;

        info!(date = %date, slots = slots.len(), "fetched courts");
        Ok(slots)
    }

    /// Picks the first hard court starting exactly at `time`, else the first
    /// such carpet court, in the order the slots were listed.
    pub fn select_court(&self, slots: &[CourtSlot], time: &str) -> Option<CourtChoice> {
        let at_time: Vec<&CourtSlot> = slots.iter().filter(|s| s.start_time == time).collect();

        [Tier::Hard, Tier::Carpet].into_iter().find_map(|tier| {
            at_time
                .iter()
                .find(|s| self.priority.tier_of(s.court_id) == Some(tier))
                .map(|s| CourtChoice {
                    court_id: s.court_id,
                    tier,
                })
        })
    }

    /// Availability lookup plus selection for one (date, time) request.
    pub async fn resolve(
        &self,
        session: &SessionManager,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<Resolution, SessionError> {
        let slots = self.find_available_courts(session, date).await?;
        let date = self.formats.date(date);
        let time = self.formats.time(time);

        if slots.is_empty() {
            info!(
                date = %date,
                "no courts found, probably soft blocked or already booked at this time"
            );
            return Ok(Resolution::NoCourt(NoCourtReason::NoSlots));
        }

        match self.select_court(&slots, &time) {
            Some(choice) => {
                info!(
                    date = %date,
                    time = %time,
                    court_id = choice.court_id,
                    court = %self.priority.label(choice.court_id),
                    tier = %choice.tier,
                    "selected court"
                );
                Ok(Resolution::Court(choice))
            }
            None => {
                info!(date = %date, time = %time, "no indoor courts available");
                Ok(Resolution::NoCourt(NoCourtReason::NoEligibleCourt))
            }
        }
    }
}

/// Availability body → slots. A missing `slots` key or an empty body is an
/// empty list.
fn parse_slots(body: Value) -> Result<Vec<CourtSlot>, serde_json::Error> {
    if body.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value::<AvailabilityResponse>(body).map(|a| a.slots)
}

pub mod orchestrator;
pub mod priority;
pub mod resolver;

pub use orchestrator::{BookingHold, BookingOrchestrator, BookingOutcome, ConfirmedBooking, HoldStatus};
pub use priority::{Court, CourtId, CourtPriority, Tier};
pub use resolver::{CourtChoice, CourtResolver, CourtSlot, NoCourtReason, Resolution, SlotFormats};

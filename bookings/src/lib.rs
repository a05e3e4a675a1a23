pub mod model;
pub mod store;

pub use model::{BookingId, BookingStatus, DesiredBooking, ListFilter};
pub use store::DesiredBookingStore;
pub use store::sqlite_store::SQLiteBookingStore;

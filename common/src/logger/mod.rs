mod init;
mod phase;
mod trace_id;

pub use init::init_logger;
pub use phase::{Phase, phase_span, root_span};
pub use trace_id::TraceId;

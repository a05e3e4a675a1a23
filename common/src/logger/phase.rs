use std::fmt;

use tracing::Span;

use super::TraceId;

/// Protocol phase a log event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Login,
    Resolve,
    Hold,
    Confirm,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Login => "login",
            Phase::Resolve => "resolve",
            Phase::Hold => "hold",
            Phase::Confirm => "confirm",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root span for a run / command.
pub fn root_span(name: &'static str, trace_id: &TraceId) -> Span {
    tracing::info_span!("run", name = %name, trace_id = %trace_id)
}

/// Child span for a single protocol phase. Inherits the run's trace id.
pub fn phase_span(phase: Phase) -> Span {
    tracing::info_span!("phase", phase = %phase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_names_are_stable() {
        let names: Vec<_> = [Phase::Login, Phase::Resolve, Phase::Hold, Phase::Confirm]
            .iter()
            .map(Phase::as_str)
            .collect();
        assert_eq!(names, ["login", "resolve", "hold", "confirm"]);
    }

    #[test]
    fn trace_ids_are_unique() {
        assert_ne!(TraceId::new(), TraceId::new());
        assert_eq!(TraceId::new().to_string().len(), 36);
    }
}

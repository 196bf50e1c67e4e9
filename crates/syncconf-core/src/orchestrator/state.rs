use std::fmt;

/// State of the configuration orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrchestratorState {
    /// Nothing configured; initial state
    Stopped,
    /// Waiting for the backend to acknowledge a pause
    PausePending,
    /// Backend paused, starting domains one at a time
    Configuring,
    /// All starts done, waiting for the backend to acknowledge a resume
    ResumePending,
    /// Desired configuration reached
    Configured,
    /// Tearing down; configure requests are refused
    Stopping,
    /// A newer configuration arrived while an asynchronous step was in flight
    Restarting,
}

impl OrchestratorState {
    /// States from which a new cycle can begin without waiting on anything.
    pub fn is_steady(self) -> bool {
        matches!(self, Self::Stopped | Self::Configured)
    }

    /// States that wait on a backend acknowledgement or a controller start.
    pub fn is_waiting(self) -> bool {
        matches!(
            self,
            Self::PausePending | Self::Configuring | Self::ResumePending
        )
    }
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::PausePending => write!(f, "pause_pending"),
            Self::Configuring => write!(f, "configuring"),
            Self::ResumePending => write!(f, "resume_pending"),
            Self::Configured => write!(f, "configured"),
            Self::Stopping => write!(f, "stopping"),
            Self::Restarting => write!(f, "restarting"),
        }
    }
}

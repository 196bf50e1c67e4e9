//! Ordered record of calls made by the orchestrator

use std::sync::{Arc, Mutex};

use syncconf_core::{ControllerState, DomainId};

/// One call observed by a fake collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `start` on a controller, with the state it was in when called
    Start {
        domain: DomainId,
        prior: ControllerState,
    },
    /// `stop` on a controller, with the state it was in when called
    Stop {
        domain: DomainId,
        prior: ControllerState,
    },
    Pause,
    Resume,
}

/// Shared log; clones append to the same record.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.calls.lock().unwrap().is_empty()
    }

    /// Domains passed to `start`, in call order.
    pub fn starts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Start { domain, .. } => Some(domain.to_string()),
                _ => None,
            })
            .collect()
    }

    /// Domains passed to `stop`, in call order.
    pub fn stops(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Stop { domain, .. } => Some(domain.to_string()),
                _ => None,
            })
            .collect()
    }

    /// Pause and resume requests, in call order.
    pub fn backend_requests(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Pause | Call::Resume))
            .collect()
    }

    /// Position of the first call matching `predicate`.
    pub fn position(&self, predicate: impl Fn(&Call) -> bool) -> Option<usize> {
        self.calls().iter().position(predicate)
    }
}

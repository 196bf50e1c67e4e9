//! Domain controller contract
//!
//! A controller owns the lifecycle of one domain. The orchestrator only reads
//! its state and asks it to start or stop; everything about how a domain
//! associates its data lives behind this trait.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::DomainId;
use crate::events::{ControlEvent, EventSender};

/// Lifecycle state of a domain controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerState {
    NotRunning,
    ModelStarting,
    Associating,
    Running,
    Stopping,
}

impl ControllerState {
    /// Started or on the way there.
    pub fn is_active(self) -> bool {
        matches!(self, Self::ModelStarting | Self::Associating | Self::Running)
    }

    /// Eligible for a fresh `start`.
    pub fn is_startable(self) -> bool {
        matches!(self, Self::NotRunning | Self::Stopping)
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRunning => write!(f, "not_running"),
            Self::ModelStarting => write!(f, "model_starting"),
            Self::Associating => write!(f, "associating"),
            Self::Running => write!(f, "running"),
            Self::Stopping => write!(f, "stopping"),
        }
    }
}

/// Result reported by a controller when its start completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartResult {
    /// Started normally
    Ok,
    /// Started, and this was the first association for the domain
    OkFirstRun,
    /// Start requested while a previous start was still running
    Busy,
    /// The domain is disabled and cannot start
    NotEnabled,
    /// Associating local and remote data failed
    AssociationFailed,
    /// The start was cancelled by a stop
    Aborted,
    /// A failure that leaves the domain unusable
    UnrecoverableError,
}

impl StartResult {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Ok | Self::OkFirstRun)
    }
}

impl fmt::Display for StartResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::OkFirstRun => write!(f, "ok_first_run"),
            Self::Busy => write!(f, "busy"),
            Self::NotEnabled => write!(f, "not_enabled"),
            Self::AssociationFailed => write!(f, "association_failed"),
            Self::Aborted => write!(f, "aborted"),
            Self::UnrecoverableError => write!(f, "unrecoverable_error"),
        }
    }
}

/// One-shot completion handed to [`DomainController::start`].
///
/// Consumed by [`StartCallback::run`], so it can fire at most once. It may be
/// run synchronously inside `start` or later from any thread; either way the
/// result is queued onto the orchestrator's control context.
#[derive(Debug)]
pub struct StartCallback {
    domain: DomainId,
    events: EventSender,
    completed: bool,
}

impl StartCallback {
    pub fn new(domain: DomainId, events: EventSender) -> Self {
        Self {
            domain,
            events,
            completed: false,
        }
    }

    pub fn domain(&self) -> &DomainId {
        &self.domain
    }

    pub fn run(mut self, result: StartResult) {
        self.completed = true;
        self.events.send(ControlEvent::StartCompleted {
            domain: self.domain.clone(),
            result,
        });
    }
}

impl Drop for StartCallback {
    fn drop(&mut self) {
        if !self.completed {
            tracing::warn!(domain = %self.domain, "start callback dropped without a result");
        }
    }
}

/// A state-carrying unit responsible for synchronizing one domain.
///
/// Implementations may run their work on other executors, but must deliver
/// start completions through the supplied [`StartCallback`].
pub trait DomainController: Send + Sync {
    /// Identity of the domain this controller manages.
    fn domain(&self) -> &DomainId;

    /// Current lifecycle state. Owned and mutated by the controller alone.
    fn state(&self) -> ControllerState;

    /// Begin starting the domain. `on_complete` must be run exactly once.
    fn start(&self, first_run: bool, on_complete: StartCallback);

    /// Stop synchronously. Idempotent; always leaves the controller
    /// not-running. Stopping a controller mid-start must complete its
    /// pending start callback.
    fn stop(&self);
}

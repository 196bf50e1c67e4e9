//! Typed events exchanged between the orchestrator and its collaborators
//!
//! Inbound signals (backend acknowledgements, controller start completions)
//! travel as [`ControlEvent`] over one channel owned by the orchestrator.
//! Outbound notifications go to a [`ConfigureObserver`] supplied by the owner.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::controller::StartResult;
use crate::domain::DomainId;

/// Completion signals published by the sync backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendEvent {
    /// A pause request has taken effect
    Paused,
    /// A resume request has taken effect
    Resumed,
}

impl fmt::Display for BackendEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paused => write!(f, "paused"),
            Self::Resumed => write!(f, "resumed"),
        }
    }
}

/// Everything that can wake the orchestrator up between suspension points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEvent {
    Backend(BackendEvent),
    StartCompleted { domain: DomainId, result: StartResult },
}

/// Sending half of the orchestrator's control channel.
///
/// Sends never block. A send after the orchestrator is dropped is discarded,
/// since nobody is left to act on it.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<ControlEvent>,
}

impl EventSender {
    pub(crate) fn new(tx: mpsc::UnboundedSender<ControlEvent>) -> Self {
        Self { tx }
    }

    pub fn send(&self, event: ControlEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("control channel closed, event dropped");
        }
    }

    /// Narrow this sender to backend events only.
    pub fn backend_notifier(&self) -> BackendNotifier {
        BackendNotifier {
            events: self.clone(),
        }
    }
}

/// Handle given to the backend on every pause or resume request.
#[derive(Debug, Clone)]
pub struct BackendNotifier {
    events: EventSender,
}

impl BackendNotifier {
    pub fn notify(&self, event: BackendEvent) {
        self.events.send(ControlEvent::Backend(event));
    }

    pub fn paused(&self) {
        self.notify(BackendEvent::Paused);
    }

    pub fn resumed(&self) {
        self.notify(BackendEvent::Resumed);
    }
}

/// Terminal result of one configure cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigureOutcome {
    Ok,
    Aborted,
    AssociationFailed,
    UnrecoverableError,
}

impl ConfigureOutcome {
    /// Map a failed start result onto the outcome reported to the owner.
    ///
    /// Returns `None` for results that a controller must never report as a
    /// failure (the two success variants, busy and not-enabled).
    pub fn from_start_failure(result: StartResult) -> Option<Self> {
        match result {
            StartResult::Aborted => Some(Self::Aborted),
            StartResult::AssociationFailed => Some(Self::AssociationFailed),
            StartResult::UnrecoverableError => Some(Self::UnrecoverableError),
            StartResult::Ok
            | StartResult::OkFirstRun
            | StartResult::Busy
            | StartResult::NotEnabled => None,
        }
    }
}

impl fmt::Display for ConfigureOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Aborted => write!(f, "aborted"),
            Self::AssociationFailed => write!(f, "association_failed"),
            Self::UnrecoverableError => write!(f, "unrecoverable_error"),
        }
    }
}

/// Notification emitted to the orchestrator's owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigureNotification {
    Started,
    Done(ConfigureOutcome),
}

/// Receives the start/done pair that brackets every configure cycle.
pub trait ConfigureObserver: Send {
    fn on_configure_start(&mut self);

    fn on_configure_done(&mut self, outcome: ConfigureOutcome);
}

/// Forward notifications into a channel owned by the caller.
impl ConfigureObserver for mpsc::UnboundedSender<ConfigureNotification> {
    fn on_configure_start(&mut self) {
        let _ = self.send(ConfigureNotification::Started);
    }

    fn on_configure_done(&mut self, outcome: ConfigureOutcome) {
        let _ = self.send(ConfigureNotification::Done(outcome));
    }
}

/// Observer that discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl ConfigureObserver for NullObserver {
    fn on_configure_start(&mut self) {}

    fn on_configure_done(&mut self, _outcome: ConfigureOutcome) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StartResult::Aborted, Some(ConfigureOutcome::Aborted))]
    #[case(StartResult::AssociationFailed, Some(ConfigureOutcome::AssociationFailed))]
    #[case(StartResult::UnrecoverableError, Some(ConfigureOutcome::UnrecoverableError))]
    #[case(StartResult::Busy, None)]
    #[case(StartResult::NotEnabled, None)]
    #[case(StartResult::Ok, None)]
    fn start_failure_mapping(#[case] result: StartResult, #[case] expected: Option<ConfigureOutcome>) {
        assert_eq!(ConfigureOutcome::from_start_failure(result), expected);
    }

    #[test]
    fn channel_observer_forwards_notifications() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut observer = tx;
        observer.on_configure_start();
        observer.on_configure_done(ConfigureOutcome::Ok);

        assert_eq!(rx.try_recv().unwrap(), ConfigureNotification::Started);
        assert_eq!(
            rx.try_recv().unwrap(),
            ConfigureNotification::Done(ConfigureOutcome::Ok)
        );
    }

    #[test]
    fn notifier_sends_backend_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let notifier = EventSender::new(tx).backend_notifier();
        notifier.paused();
        notifier.resumed();

        assert_eq!(rx.try_recv().unwrap(), ControlEvent::Backend(BackendEvent::Paused));
        assert_eq!(rx.try_recv().unwrap(), ControlEvent::Backend(BackendEvent::Resumed));
    }
}

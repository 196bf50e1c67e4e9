//! Observer that records configure notifications

use std::sync::{Arc, Mutex};

use syncconf_core::{ConfigureNotification, ConfigureObserver, ConfigureOutcome};

/// Clones share one record, so a test can keep a clone after handing one to
/// the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    notifications: Arc<Mutex<Vec<ConfigureNotification>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<ConfigureNotification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn outcomes(&self) -> Vec<ConfigureOutcome> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                ConfigureNotification::Done(outcome) => Some(outcome),
                ConfigureNotification::Started => None,
            })
            .collect()
    }

    pub fn last_outcome(&self) -> Option<ConfigureOutcome> {
        self.outcomes().last().copied()
    }

    pub fn starts(&self) -> usize {
        self.notifications()
            .iter()
            .filter(|n| matches!(n, ConfigureNotification::Started))
            .count()
    }

    pub fn clear(&self) {
        self.notifications.lock().unwrap().clear();
    }
}

impl ConfigureObserver for RecordingObserver {
    fn on_configure_start(&mut self) {
        self.notifications
            .lock()
            .unwrap()
            .push(ConfigureNotification::Started);
    }

    fn on_configure_done(&mut self, outcome: ConfigureOutcome) {
        self.notifications
            .lock()
            .unwrap()
            .push(ConfigureNotification::Done(outcome));
    }
}

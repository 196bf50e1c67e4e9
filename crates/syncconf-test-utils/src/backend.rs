//! Scriptable sync backend

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use syncconf_core::{BackendEvent, BackendNotifier, SyncBackend};

use crate::log::{Call, CallLog};

/// How a [`FakeBackend`] answers pause and resume requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckBehavior {
    /// Acknowledge before the request call returns
    Immediate,
    /// Hold the acknowledgement until [`FakeBackend::ack`]
    Defer,
    /// Refuse the request
    Reject,
    /// Acknowledge from a spawned tokio task
    Spawn,
}

/// Backend fake that records requests into a [`CallLog`].
pub struct FakeBackend {
    behavior: Mutex<AckBehavior>,
    outstanding: Mutex<Option<(BackendEvent, BackendNotifier)>>,
    overlapping: AtomicUsize,
    log: CallLog,
}

impl FakeBackend {
    pub fn new(behavior: AckBehavior, log: CallLog) -> Self {
        Self {
            behavior: Mutex::new(behavior),
            outstanding: Mutex::new(None),
            overlapping: AtomicUsize::new(0),
            log,
        }
    }

    pub fn set_behavior(&self, behavior: AckBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    /// Deliver the held acknowledgement. Returns false if none was held.
    pub fn ack(&self) -> bool {
        let outstanding = self.outstanding.lock().unwrap().take();
        match outstanding {
            Some((event, notifier)) => {
                notifier.notify(event);
                true
            }
            None => false,
        }
    }

    /// The held acknowledgement, if any.
    pub fn outstanding(&self) -> Option<BackendEvent> {
        self.outstanding.lock().unwrap().as_ref().map(|(event, _)| *event)
    }

    /// Requests received while a deferred one was still unacknowledged.
    pub fn overlapping_requests(&self) -> usize {
        self.overlapping.load(Ordering::SeqCst)
    }

    fn request(&self, event: BackendEvent, notifier: BackendNotifier) -> bool {
        self.log.push(match event {
            BackendEvent::Paused => Call::Pause,
            BackendEvent::Resumed => Call::Resume,
        });
        if self.outstanding.lock().unwrap().is_some() {
            self.overlapping.fetch_add(1, Ordering::SeqCst);
        }

        let behavior = *self.behavior.lock().unwrap();
        match behavior {
            AckBehavior::Immediate => notifier.notify(event),
            AckBehavior::Defer => *self.outstanding.lock().unwrap() = Some((event, notifier)),
            AckBehavior::Reject => return false,
            AckBehavior::Spawn => {
                tokio::spawn(async move {
                    tokio::task::yield_now().await;
                    notifier.notify(event);
                });
            }
        }
        true
    }
}

impl SyncBackend for FakeBackend {
    fn request_pause(&self, notifier: BackendNotifier) -> bool {
        self.request(BackendEvent::Paused, notifier)
    }

    fn request_resume(&self, notifier: BackendNotifier) -> bool {
        self.request(BackendEvent::Resumed, notifier)
    }
}

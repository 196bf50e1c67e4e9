//! Scriptable domain controller

use std::sync::{Arc, Mutex};

use syncconf_core::{ControllerState, DomainController, DomainId, StartCallback, StartResult};

use crate::log::{Call, CallLog};

/// How a [`FakeController`] answers `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartBehavior {
    /// Complete inside `start` with the given result
    Complete(StartResult),
    /// Hold the callback until [`FakeController::complete`] is called
    Defer,
    /// Complete with the given result from a spawned tokio task
    Spawn(StartResult),
}

struct Shared {
    state: Mutex<ControllerState>,
    pending: Mutex<Option<StartCallback>>,
}

impl Shared {
    fn new() -> Self {
        Self {
            state: Mutex::new(ControllerState::NotRunning),
            pending: Mutex::new(None),
        }
    }

    fn state(&self) -> ControllerState {
        *self.state.lock().unwrap()
    }

    fn set_state(&self, state: ControllerState) {
        *self.state.lock().unwrap() = state;
    }

    /// Finish the pending start, if there still is one.
    fn settle(&self, result: StartResult) -> bool {
        let Some(callback) = self.pending.lock().unwrap().take() else {
            return false;
        };
        self.set_state(if result.is_success() {
            ControllerState::Running
        } else {
            ControllerState::NotRunning
        });
        callback.run(result);
        true
    }
}

/// Controller fake that records every call into a [`CallLog`].
///
/// Stopping it mid-start completes the pending start with
/// [`StartResult::Aborted`], like a real controller cancelling association.
pub struct FakeController {
    domain: DomainId,
    shared: Arc<Shared>,
    behavior: Mutex<StartBehavior>,
    first_runs: Mutex<Vec<bool>>,
    log: CallLog,
}

impl FakeController {
    /// A not-running controller that completes every start with `Ok`.
    pub fn new(domain: impl Into<DomainId>, log: CallLog) -> Arc<Self> {
        Arc::new(Self {
            domain: domain.into(),
            shared: Arc::new(Shared::new()),
            behavior: Mutex::new(StartBehavior::Complete(StartResult::Ok)),
            first_runs: Mutex::new(Vec::new()),
            log,
        })
    }

    pub fn set_behavior(&self, behavior: StartBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    /// Force the reported state, e.g. to model a controller mid-teardown.
    pub fn force_state(&self, state: ControllerState) {
        self.shared.set_state(state);
    }

    /// Whether a deferred start is waiting for [`FakeController::complete`].
    pub fn is_pending(&self) -> bool {
        self.shared.pending.lock().unwrap().is_some()
    }

    /// Complete a deferred start. Returns false if none was pending.
    pub fn complete(&self, result: StartResult) -> bool {
        self.shared.settle(result)
    }

    /// `first_run` flags received by every start, in order.
    pub fn first_runs(&self) -> Vec<bool> {
        self.first_runs.lock().unwrap().clone()
    }
}

impl DomainController for FakeController {
    fn domain(&self) -> &DomainId {
        &self.domain
    }

    fn state(&self) -> ControllerState {
        self.shared.state()
    }

    fn start(&self, first_run: bool, on_complete: StartCallback) {
        self.log.push(Call::Start {
            domain: self.domain.clone(),
            prior: self.state(),
        });
        self.first_runs.lock().unwrap().push(first_run);
        self.shared.set_state(ControllerState::ModelStarting);
        *self.shared.pending.lock().unwrap() = Some(on_complete);

        let behavior = *self.behavior.lock().unwrap();
        match behavior {
            StartBehavior::Complete(result) => {
                self.shared.settle(result);
            }
            StartBehavior::Defer => {}
            StartBehavior::Spawn(result) => {
                let shared = self.shared.clone();
                tokio::spawn(async move {
                    tokio::task::yield_now().await;
                    shared.settle(result);
                });
            }
        }
    }

    fn stop(&self) {
        self.log.push(Call::Stop {
            domain: self.domain.clone(),
            prior: self.state(),
        });
        let pending = self.shared.pending.lock().unwrap().take();
        self.shared.set_state(ControllerState::NotRunning);
        if let Some(callback) = pending {
            callback.run(StartResult::Aborted);
        }
    }
}

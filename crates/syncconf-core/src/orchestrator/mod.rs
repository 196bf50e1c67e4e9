//! Configuration orchestrator
//!
//! Brings the registered domain controllers into a desired running set:
//! diff against live controller state, stop what is no longer wanted, pause
//! the backend, start what is missing one at a time in priority order, then
//! resume the backend and report the outcome.
//!
//! All transitions run on one control context. Collaborator completions are
//! queued as [`ControlEvent`]s and applied once the current transition has
//! returned, so a controller that completes inside `start` is handled the
//! same way as one that completes later from another thread.
//!
//! # Example
//!
//! ```ignore
//! use syncconf_core::{domain_set, NullObserver, Orchestrator};
//!
//! let mut orchestrator = Orchestrator::new(controllers, backend, Box::new(NullObserver))?;
//! orchestrator.configure(domain_set(["bookmarks", "preferences"]));
//! // ... backend and controllers deliver their events ...
//! orchestrator.stop();
//! ```

mod state;

pub use state::OrchestratorState;

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::backend::SyncBackend;
use crate::config::OrchestratorConfig;
use crate::controller::{ControllerState, DomainController, StartCallback, StartResult};
use crate::domain::{DomainId, DomainSet};
use crate::error::{Error, Result};
use crate::events::{
    BackendEvent, ConfigureObserver, ConfigureOutcome, ControlEvent, EventSender,
};
use crate::priority::PriorityTable;

/// Shared, non-owning view of a controller. Lifetime is managed by whoever
/// registered it.
pub type ControllerRef = Arc<dyn DomainController>;

/// State machine that drives domain controllers into a desired configuration.
pub struct Orchestrator {
    controllers: BTreeMap<DomainId, ControllerRef>,
    backend: Arc<dyn SyncBackend>,
    priorities: PriorityTable,
    observer: Box<dyn ConfigureObserver>,
    first_run: bool,

    state: OrchestratorState,
    desired: DomainSet,
    needs_start: Vec<ControllerRef>,
    needs_stop: Vec<ControllerRef>,
    /// Controller whose start is in flight
    current: Option<ControllerRef>,
    /// Backend request issued and not yet acknowledged
    awaiting: Option<BackendEvent>,
    /// A pause acknowledged by the backend that has not been released yet
    paused: bool,

    events: EventSender,
    inbox: mpsc::UnboundedReceiver<ControlEvent>,
}

impl Orchestrator {
    /// Create an orchestrator over a fixed controller registry.
    ///
    /// Uses the built-in start order and passes `first_run = true` to every
    /// start; see [`Orchestrator::with_priorities`] and
    /// [`Orchestrator::with_first_run`].
    ///
    /// # Errors
    ///
    /// Returns an error if two controllers share a domain, or if any
    /// controller is not `NotRunning`.
    pub fn new<I>(
        controllers: I,
        backend: Arc<dyn SyncBackend>,
        observer: Box<dyn ConfigureObserver>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = ControllerRef>,
    {
        let mut registry = BTreeMap::new();
        for controller in controllers {
            let domain = controller.domain().clone();
            let state = controller.state();
            if state != ControllerState::NotRunning {
                return Err(Error::ControllerNotStopped { domain, state });
            }
            if registry.insert(domain.clone(), controller).is_some() {
                return Err(Error::DuplicateController { domain });
            }
        }

        let (tx, inbox) = mpsc::unbounded_channel();

        Ok(Self {
            controllers: registry,
            backend,
            priorities: PriorityTable::default(),
            observer,
            first_run: true,
            state: OrchestratorState::Stopped,
            desired: DomainSet::new(),
            needs_start: Vec::new(),
            needs_stop: Vec::new(),
            current: None,
            awaiting: None,
            paused: false,
            events: EventSender::new(tx),
            inbox,
        })
    }

    /// Create an orchestrator using the start order and first-run flag from
    /// a parsed configuration.
    pub fn from_config<I>(
        config: &OrchestratorConfig,
        controllers: I,
        backend: Arc<dyn SyncBackend>,
        observer: Box<dyn ConfigureObserver>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = ControllerRef>,
    {
        Ok(Self::new(controllers, backend, observer)?
            .with_priorities(config.priority_table()?)
            .with_first_run(config.first_run))
    }

    pub fn with_priorities(mut self, priorities: PriorityTable) -> Self {
        self.priorities = priorities;
        self
    }

    pub fn with_first_run(mut self, first_run: bool) -> Self {
        self.first_run = first_run;
        self
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    /// The most recently requested configuration.
    pub fn desired(&self) -> &DomainSet {
        &self.desired
    }

    /// Domain whose start is currently in flight, if any.
    pub fn in_flight(&self) -> Option<&DomainId> {
        self.current.as_ref().map(|c| c.domain())
    }

    /// Domains whose controllers currently report `Running`.
    pub fn running_domains(&self) -> DomainSet {
        self.controllers
            .values()
            .filter(|c| c.state() == ControllerState::Running)
            .map(|c| c.domain().clone())
            .collect()
    }

    pub fn controller(&self, domain: &DomainId) -> Option<&ControllerRef> {
        self.controllers.get(domain)
    }

    /// Sender for delivering control events onto this orchestrator.
    pub fn event_sender(&self) -> EventSender {
        self.events.clone()
    }

    /// Request a new configuration.
    ///
    /// Refused while stopping. When nothing needs to change and nothing is in
    /// flight, the cycle completes immediately with [`ConfigureOutcome::Ok`]
    /// without touching the backend.
    pub fn configure(&mut self, desired: DomainSet) {
        if self.state == OrchestratorState::Stopping {
            error!(state = %self.state, "configuration requested while stopping, ignored");
            return;
        }

        for domain in desired.iter().filter(|d| !self.controllers.contains_key(*d)) {
            warn!(domain = %domain, "no controller registered for domain");
        }

        self.desired = desired;
        self.build_work_lists();

        if self.needs_start.is_empty() && self.needs_stop.is_empty() && self.is_idle() {
            debug!("configuration unchanged");
            self.state = OrchestratorState::Configured;
            self.notify_start();
            self.notify_done(ConfigureOutcome::Ok);
        } else {
            self.restart();
        }

        self.drain_events();
    }

    /// Tear down every running domain and return to `Stopped`.
    ///
    /// A start in flight is cancelled by stopping its controller; the
    /// resulting completion finishes the teardown and reports
    /// [`ConfigureOutcome::Aborted`].
    pub fn stop(&mut self) {
        if self.state == OrchestratorState::Stopped {
            return;
        }

        match (self.state, self.current.clone()) {
            (OrchestratorState::Configuring, Some(controller)) => {
                info!(domain = %controller.domain(), "aborting start in flight");
                self.state = OrchestratorState::Stopping;
                controller.stop();
            }
            (state, _) => {
                if let Some(event) = self.awaiting {
                    debug!(%state, awaiting = %event, "no longer waiting on backend");
                }
                self.state = OrchestratorState::Stopping;
                self.finish_stop();
            }
        }

        self.drain_events();
    }

    /// Apply one control event, then everything it caused to be queued.
    pub fn handle_event(&mut self, event: ControlEvent) {
        self.apply(event);
        self.drain_events();
    }

    /// Apply every control event already queued. Returns how many were applied.
    pub fn drain_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.inbox.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Wait for the next queued control event.
    pub async fn next_event(&mut self) -> Option<ControlEvent> {
        self.inbox.recv().await
    }

    fn is_idle(&self) -> bool {
        self.state.is_steady() && self.awaiting.is_none() && self.current.is_none()
    }

    fn build_work_lists(&mut self) {
        self.needs_start = self
            .desired
            .iter()
            .filter_map(|domain| self.controllers.get(domain))
            .filter(|c| c.state().is_startable())
            .cloned()
            .collect();
        self.priorities
            .sort_by_rank(&mut self.needs_start, |c| c.domain());

        // Same ascending order as starts.
        self.needs_stop = self
            .controllers
            .values()
            .filter(|c| !self.desired.contains(c.domain()) && c.state().is_active())
            .cloned()
            .collect();
        self.priorities
            .sort_by_rank(&mut self.needs_stop, |c| c.domain());

        for controller in &self.needs_start {
            debug!(domain = %controller.domain(), "will start");
        }
        for controller in &self.needs_stop {
            debug!(domain = %controller.domain(), "will stop");
        }
    }

    fn restart(&mut self) {
        info!(state = %self.state, "restarting configuration");

        if self.state.is_waiting() || self.awaiting.is_some() || self.current.is_some() {
            // Picked up by whichever completion arrives next.
            if self.state.is_steady() {
                self.notify_start();
            }
            self.state = OrchestratorState::Restarting;
            return;
        }

        if self.state == OrchestratorState::Restarting {
            self.build_work_lists();
        } else {
            self.notify_start();
        }
        self.current = None;

        for controller in std::mem::take(&mut self.needs_stop) {
            info!(domain = %controller.domain(), "stopping");
            controller.stop();
        }

        self.state = OrchestratorState::PausePending;
        self.pause_backend();
    }

    fn start_next(&mut self) {
        if let Some(controller) = self.needs_start.first().cloned() {
            info!(domain = %controller.domain(), "starting");
            self.current = Some(controller.clone());
            let callback = StartCallback::new(controller.domain().clone(), self.events.clone());
            controller.start(self.first_run, callback);
            return;
        }

        self.state = OrchestratorState::ResumePending;
        self.resume_backend();
    }

    fn pause_backend(&mut self) {
        self.request_backend(BackendEvent::Paused);
    }

    fn resume_backend(&mut self) {
        self.request_backend(BackendEvent::Resumed);
    }

    fn request_backend(&mut self, completion: BackendEvent) {
        self.awaiting = Some(completion);
        let notifier = self.events.backend_notifier();
        let accepted = match completion {
            BackendEvent::Paused => self.backend.request_pause(notifier),
            BackendEvent::Resumed => self.backend.request_resume(notifier),
        };

        if !accepted {
            error!(awaiting = %completion, "backend rejected request");
            self.awaiting = None;
            self.finish_stop();
            self.notify_done(ConfigureOutcome::UnrecoverableError);
        }
    }

    fn finish_stop(&mut self) {
        for controller in self.controllers.values() {
            if controller.state() == ControllerState::Running {
                controller.stop();
                info!(domain = %controller.domain(), "stopped");
            }
        }
        self.state = OrchestratorState::Stopped;
        self.paused = false;
    }

    fn apply(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::Backend(BackendEvent::Paused) => self.on_paused(),
            ControlEvent::Backend(BackendEvent::Resumed) => self.on_resumed(),
            ControlEvent::StartCompleted { domain, result } => {
                self.on_start_completed(domain, result)
            }
        }
    }

    /// Clear the awaited backend event if `event` is the one we asked for.
    fn acknowledge(&mut self, event: BackendEvent) -> bool {
        if self.awaiting != Some(event) {
            warn!(%event, state = %self.state, "unexpected backend event discarded");
            return false;
        }
        self.awaiting = None;
        true
    }

    fn on_paused(&mut self) {
        if !self.acknowledge(BackendEvent::Paused) {
            return;
        }

        match self.state {
            OrchestratorState::Restarting => {
                debug!("paused during restart, resuming before re-evaluating");
                self.paused = true;
                self.resume_backend();
            }
            OrchestratorState::PausePending => {
                self.paused = true;
                self.state = OrchestratorState::Configuring;
                self.start_next();
            }
            state => debug!(%state, "pause acknowledged after the wait was cancelled"),
        }
    }

    fn on_resumed(&mut self) {
        if !self.acknowledge(BackendEvent::Resumed) {
            return;
        }
        self.paused = false;

        match self.state {
            OrchestratorState::Restarting => self.restart(),
            OrchestratorState::ResumePending => {
                self.state = OrchestratorState::Configured;
                info!(running = self.running_domains().len(), "configuration complete");
                self.notify_done(ConfigureOutcome::Ok);
            }
            state => debug!(%state, "resume acknowledged after the wait was cancelled"),
        }
    }

    fn on_start_completed(&mut self, domain: DomainId, result: StartResult) {
        let Some(current) = self.current.clone() else {
            warn!(%domain, %result, "start completion with no start in flight discarded");
            return;
        };
        if current.domain() != &domain {
            warn!(%domain, expected = %current.domain(), "start completion for another domain discarded");
            return;
        }

        if self.state == OrchestratorState::Restarting {
            self.current = None;
            if self.paused {
                self.resume_backend();
            } else {
                self.restart();
            }
            return;
        }

        if self
            .needs_start
            .first()
            .is_some_and(|head| head.domain() == &domain)
        {
            self.needs_start.remove(0);
        }
        self.current = None;

        match self.state {
            OrchestratorState::Stopping => {
                self.finish_stop();
                self.notify_done(ConfigureOutcome::Aborted);
            }
            OrchestratorState::Stopped => {
                error!(%domain, %result, "start completed after the orchestrator stopped");
                if current.state() == ControllerState::Running {
                    current.stop();
                }
            }
            OrchestratorState::Configuring if result.is_success() => {
                info!(%domain, %result, "started");
                self.start_next();
            }
            OrchestratorState::Configuring => {
                warn!(%domain, %result, "start failed");
                self.finish_stop();
                let outcome = ConfigureOutcome::from_start_failure(result).unwrap_or_else(|| {
                    error!(%domain, %result, "controller reported a result with no configure outcome");
                    ConfigureOutcome::Aborted
                });
                self.notify_done(outcome);
            }
            state => warn!(%domain, %state, "start completion in unexpected state discarded"),
        }
    }

    fn notify_start(&mut self) {
        debug!("configure started");
        self.observer.on_configure_start();
    }

    fn notify_done(&mut self, outcome: ConfigureOutcome) {
        info!(%outcome, "configure done");
        self.observer.on_configure_done(outcome);
    }
}

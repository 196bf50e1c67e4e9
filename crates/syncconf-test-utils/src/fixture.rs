//! [`Fixture`]: an orchestrator wired to fakes

use std::collections::BTreeMap;
use std::sync::Arc;

use syncconf_core::{
    ControllerRef, DomainController, DomainId, Orchestrator, PriorityTable, StartResult,
    domain_set,
};

use crate::backend::{AckBehavior, FakeBackend};
use crate::controller::{FakeController, StartBehavior};
use crate::log::CallLog;
use crate::observer::RecordingObserver;

/// Orchestrator over one [`FakeController`] per name, ranked in the order the
/// names are given, with an immediately acknowledging [`FakeBackend`].
///
/// # Example
///
/// ```rust
/// use syncconf_test_utils::Fixture;
///
/// let mut fixture = Fixture::new(&["a", "b", "c"]);
/// fixture.configure(&["a", "c"]);
/// assert_eq!(fixture.log.starts(), vec!["a", "c"]);
/// ```
pub struct Fixture {
    pub orchestrator: Orchestrator,
    pub backend: Arc<FakeBackend>,
    pub controllers: BTreeMap<DomainId, Arc<FakeController>>,
    pub observer: RecordingObserver,
    pub log: CallLog,
}

impl Fixture {
    pub fn new(names: &[&str]) -> Self {
        let priorities = PriorityTable::from_order(names.iter().map(|n| DomainId::new(*n)))
            .expect("Fixture: duplicate controller names");
        Self::with_priorities(names, priorities)
    }

    /// Like [`Fixture::new`], with an explicit priority table.
    pub fn with_priorities(names: &[&str], priorities: PriorityTable) -> Self {
        let log = CallLog::new();
        let controllers: BTreeMap<DomainId, Arc<FakeController>> = names
            .iter()
            .map(|n| (DomainId::new(*n), FakeController::new(*n, log.clone())))
            .collect();
        let backend = Arc::new(FakeBackend::new(AckBehavior::Immediate, log.clone()));
        let observer = RecordingObserver::new();

        let orchestrator = Orchestrator::new(
            controllers.values().map(|c| c.clone() as ControllerRef),
            backend.clone(),
            Box::new(observer.clone()),
        )
        .expect("Fixture: failed to build orchestrator")
        .with_priorities(priorities);

        Self {
            orchestrator,
            backend,
            controllers,
            observer,
            log,
        }
    }

    pub fn controller(&self, name: &str) -> &Arc<FakeController> {
        self.controllers
            .get(name)
            .unwrap_or_else(|| panic!("Fixture: no controller named {name}"))
    }

    /// Apply `behavior` to every controller.
    pub fn set_start_behavior(&self, behavior: StartBehavior) {
        for controller in self.controllers.values() {
            controller.set_behavior(behavior);
        }
    }

    pub fn configure(&mut self, names: &[&str]) {
        self.orchestrator.configure(domain_set(names.iter().copied()));
    }

    /// Deliver a held backend acknowledgement and let the orchestrator react.
    pub fn ack_backend(&mut self) -> bool {
        let acked = self.backend.ack();
        self.orchestrator.drain_events();
        acked
    }

    /// Complete a deferred start and let the orchestrator react.
    pub fn complete(&mut self, name: &str, result: StartResult) -> bool {
        let completed = self.controller(name).complete(result);
        self.orchestrator.drain_events();
        completed
    }

    /// Names of controllers currently reporting `Running`.
    pub fn running(&self) -> Vec<String> {
        self.orchestrator
            .running_domains()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Deliver every deferred acknowledgement and complete every deferred
    /// start with `Ok` until nothing is left waiting.
    pub fn settle(&mut self) {
        for _ in 0..1000 {
            let mut progressed = self.ack_backend();
            let pending: Vec<String> = self
                .controllers
                .values()
                .filter(|c| c.is_pending())
                .map(|c| c.domain().to_string())
                .collect();
            for name in pending {
                progressed |= self.complete(&name, StartResult::Ok);
            }
            if !progressed {
                return;
            }
        }
        panic!("Fixture::settle: orchestrator did not settle");
    }
}

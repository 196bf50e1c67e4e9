//! End-to-end tests for the orchestrator service
//!
//! Controllers and the backend complete on their own tokio tasks, so every
//! completion crosses back onto the service task through the control channel.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use syncconf_core::{
    ConfigureNotification, ConfigureOutcome, ControllerRef, ControllerState, DomainController,
    DomainId, Error, Orchestrator, OrchestratorHandle, OrchestratorService, OrchestratorState,
    StartResult, domain_set,
};
use syncconf_test_utils::{AckBehavior, CallLog, FakeBackend, FakeController, StartBehavior};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;

// =============================================================================
// Test Infrastructure
// =============================================================================

const NAMES: [&str; 4] = ["bookmarks", "preferences", "autofill", "typed_urls"];

struct Service {
    handle: OrchestratorHandle,
    task: JoinHandle<Orchestrator>,
    controllers: Vec<Arc<FakeController>>,
    log: CallLog,
    notifications: mpsc::UnboundedReceiver<ConfigureNotification>,
}

impl Service {
    fn spawn() -> Self {
        let log = CallLog::new();
        let controllers: Vec<Arc<FakeController>> = NAMES
            .iter()
            .map(|name| {
                let controller = FakeController::new(*name, log.clone());
                controller.set_behavior(StartBehavior::Spawn(StartResult::Ok));
                controller
            })
            .collect();
        let backend = Arc::new(FakeBackend::new(AckBehavior::Spawn, log.clone()));
        let (tx, notifications) = mpsc::unbounded_channel();

        let orchestrator = Orchestrator::new(
            controllers.iter().map(|c| c.clone() as ControllerRef),
            backend,
            Box::new(tx),
        )
        .unwrap();
        let (handle, task) = OrchestratorService::spawn(orchestrator);

        Self {
            handle,
            task,
            controllers,
            log,
            notifications,
        }
    }

    fn controller(&self, name: &str) -> &Arc<FakeController> {
        self.controllers
            .iter()
            .find(|c| c.domain().as_str() == name)
            .unwrap()
    }

    fn running(&self) -> Vec<String> {
        self.controllers
            .iter()
            .filter(|c| c.state() == ControllerState::Running)
            .map(|c| c.domain().to_string())
            .collect()
    }

    async fn next_notification(&mut self) -> ConfigureNotification {
        timeout(Duration::from_secs(5), self.notifications.recv())
            .await
            .expect("timed out waiting for a configure notification")
            .expect("observer channel closed")
    }

    async fn next_outcome(&mut self) -> ConfigureOutcome {
        loop {
            if let ConfigureNotification::Done(outcome) = self.next_notification().await {
                return outcome;
            }
        }
    }

    async fn shutdown(self) -> Orchestrator {
        self.handle.shutdown().await.unwrap();
        timeout(Duration::from_secs(5), self.task)
            .await
            .expect("service did not exit")
            .unwrap()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_service_configures_with_async_collaborators() {
    let mut service = Service::spawn();

    service
        .handle
        .configure(domain_set(["autofill", "bookmarks"]))
        .await
        .unwrap();

    assert_eq!(service.next_notification().await, ConfigureNotification::Started);
    assert_eq!(service.next_outcome().await, ConfigureOutcome::Ok);
    assert_eq!(service.log.starts(), vec!["bookmarks", "autofill"]);
    assert_eq!(service.running(), vec!["bookmarks", "autofill"]);

    let orchestrator = service.shutdown().await;
    assert_eq!(orchestrator.state(), OrchestratorState::Stopped);
    assert!(orchestrator.running_domains().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_latest_configuration_wins() {
    let mut service = Service::spawn();

    service
        .handle
        .configure(domain_set(["bookmarks"]))
        .await
        .unwrap();
    service
        .handle
        .configure(domain_set(["bookmarks", "preferences", "typed_urls"]))
        .await
        .unwrap();

    // The first request may or may not finish before the second lands; either
    // way the last reported OK must leave the latest set running.
    loop {
        assert_eq!(service.next_outcome().await, ConfigureOutcome::Ok);
        if service.running().len() == 3 {
            break;
        }
    }

    assert_eq!(
        service.running(),
        vec!["bookmarks", "preferences", "typed_urls"]
    );
    let orchestrator = service.shutdown().await;
    assert_eq!(
        orchestrator.desired(),
        &domain_set(["bookmarks", "preferences", "typed_urls"])
    );
}

#[tokio::test]
async fn test_stop_through_handle() {
    let mut service = Service::spawn();
    service
        .handle
        .configure(domain_set(NAMES))
        .await
        .unwrap();
    assert_eq!(service.next_outcome().await, ConfigureOutcome::Ok);

    service.handle.stop().await.unwrap();
    service.handle.configure(domain_set(["bookmarks"])).await.unwrap();
    assert_eq!(service.next_outcome().await, ConfigureOutcome::Ok);

    assert_eq!(service.running(), vec!["bookmarks"]);
    let mut stopped = service.log.stops();
    stopped.sort();
    assert_eq!(stopped, vec!["autofill", "bookmarks", "preferences", "typed_urls"]);
    service.shutdown().await;
}

#[tokio::test]
async fn test_association_failure_through_service() {
    let mut service = Service::spawn();
    service
        .controller("autofill")
        .set_behavior(StartBehavior::Spawn(StartResult::AssociationFailed));

    service
        .handle
        .configure(domain_set(["bookmarks", "autofill"]))
        .await
        .unwrap();

    assert_eq!(service.next_outcome().await, ConfigureOutcome::AssociationFailed);
    assert!(service.running().is_empty());

    let orchestrator = service.shutdown().await;
    assert_eq!(orchestrator.state(), OrchestratorState::Stopped);
}

#[tokio::test]
async fn test_handle_fails_after_shutdown() {
    let service = Service::spawn();
    let handle = service.handle.clone();

    service.shutdown().await;

    let result = handle.configure(domain_set(["bookmarks"])).await;
    assert!(matches!(result, Err(Error::ServiceClosed)));
}

#[tokio::test]
async fn test_dropping_every_handle_ends_service() {
    let Service { handle, task, .. } = Service::spawn();
    drop(handle);

    let orchestrator = timeout(Duration::from_secs(5), task)
        .await
        .expect("service did not exit")
        .unwrap();
    assert_eq!(orchestrator.state(), OrchestratorState::Stopped);
    assert!(orchestrator.desired().is_empty());
    assert_eq!(
        orchestrator
            .controller(&DomainId::AUTOFILL)
            .map(|c| c.state()),
        Some(ControllerState::NotRunning)
    );
}

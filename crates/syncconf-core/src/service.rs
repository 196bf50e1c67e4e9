//! Async service owning an orchestrator on a single tokio task
//!
//! The task is the orchestrator's control context: owner commands and
//! collaborator events are applied there one at a time, in arrival order,
//! with commands taking precedence when both are ready.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::domain::DomainSet;
use crate::error::{Error, Result};
use crate::orchestrator::Orchestrator;

/// Commands accepted by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorCommand {
    Configure(DomainSet),
    Stop,
    /// Stop the orchestrator and end the task
    Shutdown,
}

/// Cloneable front for a running [`OrchestratorService`].
#[derive(Debug, Clone)]
pub struct OrchestratorHandle {
    commands: mpsc::Sender<OrchestratorCommand>,
}

impl OrchestratorHandle {
    pub async fn configure(&self, desired: DomainSet) -> Result<()> {
        self.send(OrchestratorCommand::Configure(desired)).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.send(OrchestratorCommand::Stop).await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.send(OrchestratorCommand::Shutdown).await
    }

    async fn send(&self, command: OrchestratorCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| Error::ServiceClosed)
    }
}

pub struct OrchestratorService;

impl OrchestratorService {
    pub const COMMAND_BUFFER: usize = 32;

    /// Move `orchestrator` onto its own task.
    ///
    /// The join handle yields the orchestrator back after shutdown, or once
    /// every handle has been dropped.
    pub fn spawn(orchestrator: Orchestrator) -> (OrchestratorHandle, JoinHandle<Orchestrator>) {
        let (tx, rx) = mpsc::channel(Self::COMMAND_BUFFER);
        let task = tokio::spawn(run(orchestrator, rx));
        (OrchestratorHandle { commands: tx }, task)
    }
}

async fn run(
    mut orchestrator: Orchestrator,
    mut commands: mpsc::Receiver<OrchestratorCommand>,
) -> Orchestrator {
    info!("orchestrator service started");

    loop {
        tokio::select! {
            biased;

            command = commands.recv() => match command {
                Some(OrchestratorCommand::Configure(desired)) => orchestrator.configure(desired),
                Some(OrchestratorCommand::Stop) => orchestrator.stop(),
                Some(OrchestratorCommand::Shutdown) | None => {
                    orchestrator.stop();
                    break;
                }
            },
            Some(event) = orchestrator.next_event() => orchestrator.handle_event(event),
        }
    }

    info!(state = %orchestrator.state(), "orchestrator service stopped");
    orchestrator
}

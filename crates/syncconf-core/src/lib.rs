//! Configuration orchestrator for sync domains
//!
//! Brings a set of independently managed data-synchronization domains into a
//! desired running configuration against a shared backend that must be
//! paused before domain membership changes and resumed afterward.
//!
//! - **Domains**: [`DomainId`] identities and the [`DomainController`]
//!   contract each domain implements
//! - **Backend gate**: the [`SyncBackend`] pause/resume requests
//! - **Priority table**: the static start order used for every work list
//! - **Orchestrator**: the configure/restart/stop state machine
//! - **Service**: a tokio task that serializes commands and completions
//!
//! # Architecture
//!
//! ```text
//!            owner (configure / stop)
//!                      |
//!       OrchestratorService (one task)
//!                      |
//!                Orchestrator ---- ConfigureObserver
//!               /             \
//!   DomainController ...   SyncBackend
//! ```

pub mod backend;
pub mod config;
pub mod controller;
pub mod domain;
pub mod error;
pub mod events;
pub mod logging;
pub mod orchestrator;
pub mod priority;
pub mod service;

pub use backend::SyncBackend;
pub use config::OrchestratorConfig;
pub use controller::{ControllerState, DomainController, StartCallback, StartResult};
pub use domain::{DomainId, DomainSet, domain_set};
pub use error::{Error, Result};
pub use events::{
    BackendEvent, BackendNotifier, ConfigureNotification, ConfigureObserver, ConfigureOutcome,
    ControlEvent, EventSender, NullObserver,
};
pub use orchestrator::{ControllerRef, Orchestrator, OrchestratorState};
pub use priority::{DEFAULT_START_ORDER, PriorityTable};
pub use service::{OrchestratorCommand, OrchestratorHandle, OrchestratorService};

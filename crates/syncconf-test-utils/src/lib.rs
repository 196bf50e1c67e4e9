//! Shared test utilities for the syncconf workspace.
//!
//! Fakes for every collaborator the orchestrator talks to. It is a
//! dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`log`]: [`CallLog`], one ordered record of controller and backend calls
//! - [`controller`]: [`FakeController`] with scriptable start completion
//! - [`backend`]: [`FakeBackend`] with scriptable pause/resume acknowledgement
//! - [`observer`]: [`RecordingObserver`] capturing configure notifications
//! - [`fixture`]: [`Fixture`] wiring all of the above into an orchestrator

pub mod backend;
pub mod controller;
pub mod fixture;
pub mod log;
pub mod observer;

pub use backend::{AckBehavior, FakeBackend};
pub use controller::{FakeController, StartBehavior};
pub use fixture::Fixture;
pub use log::{Call, CallLog};
pub use observer::RecordingObserver;

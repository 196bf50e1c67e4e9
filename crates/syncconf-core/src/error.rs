//! Error types for syncconf-core

use crate::controller::ControllerState;
use crate::domain::DomainId;

/// Result type for syncconf-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or driving an orchestrator
///
/// Configure outcomes (aborted, association failure, ...) are not errors in
/// this sense; they are reported through [`crate::ConfigureObserver`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two controllers were registered for the same domain
    #[error("Controller for {domain} registered more than once")]
    DuplicateController { domain: DomainId },

    /// A controller was handed over in a state other than not-running
    #[error("Controller for {domain} must be not_running at registration, found {state}")]
    ControllerNotStopped {
        domain: DomainId,
        state: ControllerState,
    },

    /// A domain appears twice in a start order
    #[error("Domain {domain} appears more than once in the start order")]
    DuplicatePriority { domain: DomainId },

    /// Configuration file content is invalid
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The orchestrator service task has exited
    #[error("Orchestrator service is no longer running")]
    ServiceClosed,

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}

//! Sync backend gate
//!
//! The backend is the one resource shared by every domain. It must be paused
//! before the set of running domains changes and resumed afterward.

use crate::events::BackendNotifier;

/// Pause/resume gate around domain membership changes.
///
/// Both requests are asynchronous: returning `true` only means the request
/// was accepted, and completion is signalled later through the notifier
/// (at most once per request). Returning `false` is an immediate rejection.
pub trait SyncBackend: Send + Sync {
    fn request_pause(&self, notifier: BackendNotifier) -> bool;

    fn request_resume(&self, notifier: BackendNotifier) -> bool;
}

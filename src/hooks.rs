//! External capabilities consumed by the coordinator
//!
//! The coordinator never trains, serializes or persists anything itself. The
//! surrounding system supplies those behaviours through [`CoordinatorHooks`],
//! injected once at construction time.
//!
//! Hooks are invoked synchronously, some of them while the registry holds its
//! write lock so that external mirrors observe admissions in registry order.
//! Implementations must be fast and must not call back into the coordinator.

use bytes::Bytes;
use uuid::Uuid;

use crate::io_struct::RegisterReqInput;

pub trait CoordinatorHooks: Send + Sync + 'static {
    /// Accept or reject the credential presented on self-registration.
    fn validate_credential(&self, credential: &RegisterReqInput) -> bool;

    /// Fresh identity for a self-registered worker.
    fn generate_identity(&self) -> String {
        Uuid::new_v4().to_string()
    }

    /// Current human-readable status of the global model.
    fn current_model_status(&self) -> String;

    /// Current serialized global model.
    fn current_model_blob(&self) -> Bytes;

    fn on_worker_registered(&self, _worker_id: &str) {}

    fn on_worker_unregistered(&self, _worker_id: &str) {}

    /// Notification only; the confirmation sent back to the worker is built by the core.
    fn on_update_received(&self, _worker_id: &str, _update: &Bytes) {}
}

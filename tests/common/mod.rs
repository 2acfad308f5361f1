use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use fl_coordinator::CoordinatorHooks;
use fl_coordinator::io_struct::RegisterReqInput;
use parking_lot::Mutex;

/// Hooks that mirror the coordinator's view into plain collections, the way an
/// embedding application would.
#[derive(Default)]
pub struct RecordingHooks {
    pub reject: AtomicBool,
    pub status: Mutex<String>,
    pub model: Mutex<Bytes>,
    pub worker_ids: Mutex<Vec<String>>,
    pub worker_updates: Mutex<HashMap<String, Bytes>>,
}

#[allow(dead_code)]
impl RecordingHooks {
    pub fn new(status: &str, model: &'static [u8]) -> Arc<Self> {
        let hooks = Self::default();
        *hooks.status.lock() = status.to_string();
        *hooks.model.lock() = Bytes::from_static(model);
        Arc::new(hooks)
    }

    pub fn set_status(&self, status: &str) {
        *self.status.lock() = status.to_string();
    }

    pub fn set_reject(&self, reject: bool) {
        self.reject.store(reject, Ordering::SeqCst);
    }

    pub fn ids(&self) -> Vec<String> {
        self.worker_ids.lock().clone()
    }

    pub fn update_for(&self, worker_id: &str) -> Option<Bytes> {
        self.worker_updates.lock().get(worker_id).cloned()
    }
}

impl CoordinatorHooks for RecordingHooks {
    fn validate_credential(&self, _credential: &RegisterReqInput) -> bool {
        !self.reject.load(Ordering::SeqCst)
    }

    fn current_model_status(&self) -> String {
        self.status.lock().clone()
    }

    fn current_model_blob(&self) -> Bytes {
        self.model.lock().clone()
    }

    fn on_worker_registered(&self, worker_id: &str) {
        self.worker_ids.lock().push(worker_id.to_string());
    }

    fn on_worker_unregistered(&self, worker_id: &str) {
        self.worker_ids.lock().retain(|id| id != worker_id);
    }

    fn on_update_received(&self, worker_id: &str, update: &Bytes) {
        self.worker_updates
            .lock()
            .insert(worker_id.to_string(), update.clone());
    }
}

#[allow(dead_code)]
pub fn dummy_credential() -> RegisterReqInput {
    RegisterReqInput {
        public_key: "dummy public key".to_string(),
        signed_phrase: "dummy signed phrase".to_string(),
    }
}

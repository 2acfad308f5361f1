//! Global model owned outside the coordinator core
//!
//! [`SharedGlobalModel`] is the piece a training loop publishes into. Reads take
//! a snapshot under a read lock, so a reader always sees a blob and status that
//! were published together.
//!
//! [`StandaloneHooks`] wires a shared model and an optional public-key allow-list
//! into [`CoordinatorHooks`] for the standalone binary.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use log::{info, warn};
use parking_lot::RwLock;

use crate::hooks::CoordinatorHooks;
use crate::io_struct::RegisterReqInput;

#[derive(Debug, Clone)]
struct ModelSnapshot {
    blob: Bytes,
    status: String,
}

#[derive(Debug)]
pub struct SharedGlobalModel {
    current: RwLock<ModelSnapshot>,
}

impl SharedGlobalModel {
    pub fn new(blob: impl Into<Bytes>, status: impl Into<String>) -> Self {
        Self {
            current: RwLock::new(ModelSnapshot {
                blob: blob.into(),
                status: status.into(),
            }),
        }
    }

    /// Replace blob and status in one step.
    pub fn publish(&self, blob: impl Into<Bytes>, status: impl Into<String>) {
        let mut current = self.current.write();
        current.blob = blob.into();
        current.status = status.into();
    }

    pub fn set_status(&self, status: impl Into<String>) {
        self.current.write().status = status.into();
    }

    pub fn status(&self) -> String {
        self.current.read().status.clone()
    }

    pub fn blob(&self) -> Bytes {
        self.current.read().blob.clone()
    }

    pub fn snapshot(&self) -> (Bytes, String) {
        let current = self.current.read();
        (current.blob.clone(), current.status.clone())
    }
}

/// Reads an allow-list file: one public key per line, `#` comments and blank lines skipped.
pub fn load_authorized_keys(path: impl AsRef<Path>) -> anyhow::Result<HashSet<String>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read authorized keys from {}", path.display()))?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Hooks used by the standalone server binary.
#[derive(Debug)]
pub struct StandaloneHooks {
    model: Arc<SharedGlobalModel>,
    authorized_keys: Option<HashSet<String>>,
}

impl StandaloneHooks {
    /// With `authorized_keys` set to `None` every registration is accepted.
    pub fn new(model: Arc<SharedGlobalModel>, authorized_keys: Option<HashSet<String>>) -> Self {
        if authorized_keys.is_none() {
            warn!("No authorized keys configured, accepting every registration");
        }
        Self {
            model,
            authorized_keys,
        }
    }
}

impl CoordinatorHooks for StandaloneHooks {
    fn validate_credential(&self, credential: &RegisterReqInput) -> bool {
        match &self.authorized_keys {
            Some(keys) => keys.contains(&credential.public_key),
            None => true,
        }
    }

    fn current_model_status(&self) -> String {
        self.model.status()
    }

    fn current_model_blob(&self) -> Bytes {
        self.model.blob()
    }

    fn on_worker_registered(&self, worker_id: &str) {
        info!("Worker {} joined the federation", worker_id);
    }

    fn on_worker_unregistered(&self, worker_id: &str) {
        info!("Worker {} left the federation", worker_id);
    }

    fn on_update_received(&self, worker_id: &str, update: &Bytes) {
        info!(
            "Stored update of {} bytes from worker {}",
            update.len(),
            worker_id
        );
    }
}

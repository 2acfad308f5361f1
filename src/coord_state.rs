//! State shared by the worker and admin servers: registry, update collector and model access.

use std::sync::Arc;

use bytes::Bytes;
use log::{debug, warn};

use crate::error::{CoordinatorError, CoordinatorResult};
use crate::hooks::CoordinatorHooks;
use crate::io_struct::{AdminAddInput, RegisterReqInput, UNREGISTERED_WORKER, update_confirmation};
use crate::registry::WorkerRegistry;
use crate::update_collector::UpdateCollector;

/// Result of an update submission. Both variants travel back to the worker as a
/// successful response; only the payload tells them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Accepted { worker_id: String },
    Unregistered,
}

impl UpdateOutcome {
    pub fn message(&self) -> String {
        match self {
            UpdateOutcome::Accepted { worker_id } => update_confirmation(worker_id),
            UpdateOutcome::Unregistered => UNREGISTERED_WORKER.to_string(),
        }
    }
}

/// Shared state behind both the worker server and the admin server.
#[derive(Clone)]
pub struct CoordState {
    registry: Arc<WorkerRegistry>,
    updates: Arc<UpdateCollector>,
    hooks: Arc<dyn CoordinatorHooks>,
}

impl CoordState {
    pub fn new(hooks: Arc<dyn CoordinatorHooks>) -> Self {
        Self {
            registry: Arc::new(WorkerRegistry::new(hooks.clone())),
            updates: Arc::new(UpdateCollector::new()),
            hooks,
        }
    }

    pub fn registry(&self) -> &WorkerRegistry {
        &self.registry
    }

    pub fn updates(&self) -> &UpdateCollector {
        &self.updates
    }

    pub fn register(&self, credential: &RegisterReqInput) -> CoordinatorResult<String> {
        self.registry.register(credential)
    }

    pub fn global_model_status(&self, worker_id: &str) -> CoordinatorResult<String> {
        self.ensure_known(worker_id)?;
        debug!("Worker {} queried the global model status", worker_id);
        Ok(self.hooks.current_model_status())
    }

    pub fn global_model(&self, worker_id: &str) -> CoordinatorResult<Bytes> {
        self.ensure_known(worker_id)?;
        debug!("Worker {} fetched the global model", worker_id);
        Ok(self.hooks.current_model_blob())
    }

    pub fn submit_update(&self, worker_id: &str, update: Bytes) -> UpdateOutcome {
        let accepted = self.registry.with_member(worker_id, || {
            self.updates.store(worker_id, update.clone());
            self.hooks.on_update_received(worker_id, &update);
        });
        match accepted {
            Some(()) => UpdateOutcome::Accepted {
                worker_id: worker_id.to_string(),
            },
            None => {
                warn!("Unregistered worker {} tried to send an update", worker_id);
                UpdateOutcome::Unregistered
            }
        }
    }

    pub fn list_workers(&self) -> Vec<String> {
        self.registry.list()
    }

    pub fn admin_add(&self, input: &AdminAddInput) -> CoordinatorResult<Vec<String>> {
        self.registry.admin_add(input)?;
        Ok(self.registry.list())
    }

    pub fn admin_remove(&self, worker_id: &str) -> Vec<String> {
        self.registry.admin_remove(worker_id);
        self.registry.list()
    }

    fn ensure_known(&self, worker_id: &str) -> CoordinatorResult<()> {
        if self.registry.contains(worker_id) {
            Ok(())
        } else {
            warn!("Unknown worker {} denied access to the global model", worker_id);
            Err(CoordinatorError::UnknownWorker {
                worker_id: worker_id.to_string(),
            })
        }
    }
}

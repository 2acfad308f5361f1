//! Worker Registry
//!
//! The single source of truth for which identities may talk to the coordinator.
//! Identities are kept in admission order so the admin listing is reproducible.
//!
//! Every mutation runs under one write lock: identity generation, the uniqueness
//! check, the insert and the external notification happen as one step, so two
//! concurrent admissions can never observe the same free slot.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use parking_lot::RwLock;

use crate::error::{CoordinatorError, CoordinatorResult};
use crate::hooks::CoordinatorHooks;
use crate::io_struct::{AdminAddInput, RegisterReqInput};

/// Attempts at drawing an unused identity before giving up.
const MAX_IDENTITY_ATTEMPTS: usize = 16;

/// How a worker came to be in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionPath {
    SelfRegistered,
    Admin,
}

#[derive(Debug, Clone)]
pub struct WorkerRecord {
    pub worker_id: String,
    pub public_key: String,
    pub admission: AdmissionPath,
    pub registered_at: DateTime<Utc>,
}

enum IdentitySource<'a> {
    Generated,
    Provided(&'a str),
}

#[derive(Default)]
struct RegistryInner {
    order: Vec<String>,
    records: HashMap<String, WorkerRecord>,
}

pub struct WorkerRegistry {
    inner: RwLock<RegistryInner>,
    hooks: Arc<dyn CoordinatorHooks>,
}

impl std::fmt::Debug for WorkerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerRegistry")
            .field("workers", &self.list())
            .finish()
    }
}

impl WorkerRegistry {
    pub fn new(hooks: Arc<dyn CoordinatorHooks>) -> Self {
        Self {
            inner: RwLock::new(RegistryInner::default()),
            hooks,
        }
    }

    /// Self-registration: validate the credential, then admit under a fresh identity.
    pub fn register(&self, credential: &RegisterReqInput) -> CoordinatorResult<String> {
        if !self.hooks.validate_credential(credential) {
            warn!(
                "Rejected registration for public key {}",
                credential.public_key
            );
            return Err(CoordinatorError::RegistrationRejected {
                public_key: credential.public_key.clone(),
            });
        }
        self.admit(IdentitySource::Generated, &credential.public_key)
    }

    /// Admin add. The public key doubles as the identity; without one nothing happens.
    /// An empty or blank key counts as missing, since that identity could never be
    /// addressed by an admin removal.
    pub fn admin_add(&self, input: &AdminAddInput) -> CoordinatorResult<Option<String>> {
        match input
            .public_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
        {
            Some(public_key) => self
                .admit(IdentitySource::Provided(public_key), public_key)
                .map(Some),
            None => {
                debug!("Admin add without a public key, ignoring");
                Ok(None)
            }
        }
    }

    /// Removes `worker_id` if present. Removing an unknown identity is a no-op.
    pub fn unregister(&self, worker_id: &str) -> bool {
        let mut inner = self.inner.write();
        if !inner.records.contains_key(worker_id) {
            debug!("Worker {} not registered, skipping removal", worker_id);
            return false;
        }
        self.hooks.on_worker_unregistered(worker_id);
        inner.records.remove(worker_id);
        inner.order.retain(|id| id != worker_id);
        info!("Removed worker: {}", worker_id);
        true
    }

    pub fn admin_remove(&self, worker_id: &str) -> bool {
        self.unregister(worker_id)
    }

    pub fn contains(&self, worker_id: &str) -> bool {
        self.inner.read().records.contains_key(worker_id)
    }

    /// Runs `f` only if `worker_id` is registered, holding the read lock throughout
    /// so a concurrent removal cannot land between the check and `f`.
    pub fn with_member<R>(&self, worker_id: &str, f: impl FnOnce() -> R) -> Option<R> {
        let inner = self.inner.read();
        if inner.records.contains_key(worker_id) {
            Some(f())
        } else {
            None
        }
    }

    /// Live identities in admission order.
    pub fn list(&self) -> Vec<String> {
        self.inner.read().order.clone()
    }

    pub fn get(&self, worker_id: &str) -> Option<WorkerRecord> {
        self.inner.read().records.get(worker_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn admit(&self, source: IdentitySource<'_>, public_key: &str) -> CoordinatorResult<String> {
        let mut inner = self.inner.write();
        let (worker_id, admission) = match source {
            IdentitySource::Provided(id) => {
                if inner.records.contains_key(id) {
                    warn!("Worker {} already registered, keeping existing record", id);
                    return Ok(id.to_string());
                }
                (id.to_string(), AdmissionPath::Admin)
            }
            IdentitySource::Generated => {
                let fresh = (0..MAX_IDENTITY_ATTEMPTS)
                    .map(|_| self.hooks.generate_identity())
                    .find(|id| !inner.records.contains_key(id))
                    .ok_or(CoordinatorError::IdentityExhausted {
                        attempts: MAX_IDENTITY_ATTEMPTS,
                    })?;
                (fresh, AdmissionPath::SelfRegistered)
            }
        };

        inner.records.insert(
            worker_id.clone(),
            WorkerRecord {
                worker_id: worker_id.clone(),
                public_key: public_key.to_string(),
                admission,
                registered_at: Utc::now(),
            },
        );
        inner.order.push(worker_id.clone());
        self.hooks.on_worker_registered(&worker_id);
        info!("Registered worker {} ({:?})", worker_id, admission);
        Ok(worker_id)
    }
}

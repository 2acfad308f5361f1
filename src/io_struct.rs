use serde::{Deserialize, Serialize};

pub const REGISTER_WORKER_ROUTE: &str = "/register_worker";
pub const QUERY_GLOBAL_MODEL_STATUS_ROUTE: &str = "/query_global_model_status";
pub const RETURN_GLOBAL_MODEL_ROUTE: &str = "/return_global_model";
pub const RECEIVE_WORKER_UPDATE_ROUTE: &str = "/receive_worker_update";
pub const ADMIN_WORKERS_ROUTE: &str = "/workers";

/// Payload returned, with a 200 status, when an update arrives for an identity
/// the registry does not know.
pub const UNREGISTERED_WORKER: &str = "UNREGISTERED_WORKER";

pub fn update_confirmation(worker_id: &str) -> String {
    format!("Update received for worker {}.", worker_id)
}

/// Credential material presented by a worker on self-registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RegisterReqInput {
    #[serde(alias = "public_key_str")]
    pub public_key: String,
    #[serde(default)]
    pub signed_phrase: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WorkerIdInput {
    pub worker_id: String,
}

/// Admin add request. A missing `public_key` makes the request a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AdminAddInput {
    #[serde(default, alias = "public_key_str")]
    pub public_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

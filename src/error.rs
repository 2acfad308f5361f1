//! Error types for the coordinator
//!
//! `CoordinatorError` is raised on the server side and maps onto HTTP statuses;
//! `ClientError` is what a [`crate::client::WorkerClient`] hands back to its caller.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};

use crate::io_struct::ErrorBody;

/// Server-side errors for worker-facing operations
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error("Registration rejected for public key {public_key}")]
    RegistrationRejected { public_key: String },

    #[error("Unknown worker: {worker_id}")]
    UnknownWorker { worker_id: String },

    #[error("Could not generate a unique worker identity after {attempts} attempts")]
    IdentityExhausted { attempts: usize },
}

/// Result type for coordinator operations
pub type CoordinatorResult<T> = Result<T, CoordinatorError>;

impl ResponseError for CoordinatorError {
    fn status_code(&self) -> StatusCode {
        match self {
            CoordinatorError::RegistrationRejected { .. } => StatusCode::FORBIDDEN,
            CoordinatorError::UnknownWorker { .. } => StatusCode::NOT_FOUND,
            CoordinatorError::IdentityExhausted { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

/// Errors surfaced by the worker client
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Worker is not registered; call register() first")]
    NotRegistered,

    #[error("Worker is already registered as {worker_id}")]
    AlreadyRegistered { worker_id: String },

    #[error("Invalid server URL: {url}")]
    InvalidUrl { url: String },

    #[error("Registration rejected by server: {message}")]
    Rejected { message: String },

    #[error("Server does not know worker {worker_id}")]
    UnknownWorker { worker_id: String },

    #[error("Unexpected status {status} from {url}: {body}")]
    UnexpectedStatus {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let rejected = CoordinatorError::RegistrationRejected {
            public_key: "k".to_string(),
        };
        assert_eq!(rejected.status_code(), StatusCode::FORBIDDEN);

        let unknown = CoordinatorError::UnknownWorker {
            worker_id: "3".to_string(),
        };
        assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(unknown.to_string(), "Unknown worker: 3");
    }

    #[test]
    fn test_client_error_display() {
        assert_eq!(
            ClientError::NotRegistered.to_string(),
            "Worker is not registered; call register() first"
        );
        let err = ClientError::UnexpectedStatus {
            url: "http://127.0.0.1:8080/health".to_string(),
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unexpected status 500 from http://127.0.0.1:8080/health: boom"
        );
    }
}

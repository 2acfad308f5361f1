//! Worker-side client
//!
//! A [`WorkerClient`] registers once, then every call carries the identity the
//! server assigned. Calls made before registration fail with
//! [`ClientError::NotRegistered`] without touching the network.

use std::time::Duration;

use bytes::Bytes;
use log::{debug, info};
use reqwest::{StatusCode, Url};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::io_struct::{
    QUERY_GLOBAL_MODEL_STATUS_ROUTE, RECEIVE_WORKER_UPDATE_ROUTE, REGISTER_WORKER_ROUTE,
    RETURN_GLOBAL_MODEL_ROUTE, RegisterReqInput, WorkerIdInput,
};

#[derive(Debug, Clone)]
pub struct WorkerClient {
    base_url: Url,
    client: reqwest::Client,
    worker_id: Option<String>,
    last_status: Option<String>,
}

impl WorkerClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let base_url = Url::parse(&config.server_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ClientError::InvalidUrl {
                url: config.server_url.clone(),
            })?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            base_url,
            client,
            worker_id: None,
            last_status: None,
        })
    }

    pub fn worker_id(&self) -> Option<&str> {
        self.worker_id.as_deref()
    }

    /// Registers with the server and remembers the assigned identity.
    pub async fn register(&mut self, credential: &RegisterReqInput) -> ClientResult<String> {
        if let Some(worker_id) = &self.worker_id {
            return Err(ClientError::AlreadyRegistered {
                worker_id: worker_id.clone(),
            });
        }
        let url = self.endpoint(&[REGISTER_WORKER_ROUTE]);
        let resp = self.client.post(url.clone()).json(credential).send().await?;
        let worker_id = match resp.status() {
            StatusCode::OK => resp.text().await?,
            StatusCode::FORBIDDEN => {
                return Err(ClientError::Rejected {
                    message: resp.text().await.unwrap_or_default(),
                });
            }
            status => return Err(unexpected(url, status, resp).await),
        };
        info!("Registered with {} as worker {}", self.base_url, worker_id);
        self.worker_id = Some(worker_id.clone());
        Ok(worker_id)
    }

    pub async fn global_model_status(&self) -> ClientResult<String> {
        let resp = self.post_worker_id(QUERY_GLOBAL_MODEL_STATUS_ROUTE).await?;
        Ok(resp.text().await?)
    }

    pub async fn global_model(&self) -> ClientResult<Bytes> {
        let resp = self.post_worker_id(RETURN_GLOBAL_MODEL_ROUTE).await?;
        Ok(resp.bytes().await?)
    }

    /// Sends an update and returns the server's reply. An identity the server no
    /// longer knows comes back as the `UNREGISTERED_WORKER` payload, not as an error.
    pub async fn send_model_update(&self, update: impl Into<Bytes>) -> ClientResult<String> {
        let worker_id = self.require_id()?;
        let url = self.endpoint(&[RECEIVE_WORKER_UPDATE_ROUTE, worker_id]);
        let resp = self
            .client
            .post(url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(update.into())
            .send()
            .await?;
        match resp.status() {
            StatusCode::OK => Ok(resp.text().await?),
            status => Err(unexpected(url, status, resp).await),
        }
    }

    /// Downloads the global model only when its status differs from the last one seen.
    pub async fn fetch_if_changed(&mut self) -> ClientResult<Option<Bytes>> {
        let status = self.global_model_status().await?;
        if self.last_status.as_ref() == Some(&status) {
            debug!("Global model status unchanged: {}", status);
            return Ok(None);
        }
        let model = self.global_model().await?;
        info!("Global model status changed to {}", status);
        self.last_status = Some(status);
        Ok(Some(model))
    }

    fn require_id(&self) -> ClientResult<&str> {
        self.worker_id.as_deref().ok_or(ClientError::NotRegistered)
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot-be-a-base URLs are rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for segment in segments {
                path.push(segment.trim_start_matches('/'));
            }
        }
        url
    }

    async fn post_worker_id(&self, route: &str) -> ClientResult<reqwest::Response> {
        let worker_id = self.require_id()?;
        let url = self.endpoint(&[route]);
        let resp = self
            .client
            .post(url.clone())
            .json(&WorkerIdInput {
                worker_id: worker_id.to_string(),
            })
            .send()
            .await?;
        match resp.status() {
            StatusCode::OK => Ok(resp),
            StatusCode::NOT_FOUND => Err(ClientError::UnknownWorker {
                worker_id: worker_id.to_string(),
            }),
            status => Err(unexpected(url, status, resp).await),
        }
    }
}

async fn unexpected(url: Url, status: StatusCode, resp: reqwest::Response) -> ClientError {
    ClientError::UnexpectedStatus {
        url: url.to_string(),
        status: status.as_u16(),
        body: resp.text().await.unwrap_or_default(),
    }
}

use std::{error::Error, fmt, time::Duration};

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;
use weaviate_store::models::{BatchObject, BatchObjectResponse, BatchRequest, GraphQlRequest};
use weaviate_store::schema::{PATH_BATCH_OBJECTS, PATH_GRAPHQL, PATH_READY};

use crate::connection::{ConnectionDescriptor, ConnectionError};

const READY_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug)]
pub enum StoreError {
    Http(reqwest::Error),
    Status { status: u16, body: String },
    Decode(serde_json::Error),
    NotReady(Duration),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(err) => write!(f, "weaviate request failed: {err}"),
            Self::Status { status, body } => {
                if body.is_empty() {
                    write!(f, "weaviate returned status {status}")
                } else {
                    write!(f, "weaviate returned status {status}: {body}")
                }
            }
            Self::Decode(err) => write!(f, "decode weaviate response: {err}"),
            Self::NotReady(timeout) => {
                write!(f, "weaviate was not ready within {}s", timeout.as_secs())
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Http(err) => Some(err),
            Self::Decode(err) => Some(err),
            Self::Status { .. } | Self::NotReady(_) => None,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// HTTP client bound to one Weaviate instance.
///
/// Cloning is cheap and clones share the underlying connection pool.
#[derive(Clone)]
pub struct WeaviateStore {
    http: Client,
    batch_objects_url: Url,
    graphql_url: Url,
    ready_url: Url,
}

impl WeaviateStore {
    /// Builds a client for the descriptor without contacting the backend.
    ///
    /// # Errors
    /// Returns `ConnectionError` if the host, credential, or HTTP client is invalid.
    pub fn connect(descriptor: &ConnectionDescriptor) -> Result<Self, ConnectionError> {
        let base = descriptor.base_url()?;
        let join = |path: &str| {
            base.join(path)
                .map_err(|_| ConnectionError::InvalidHost(descriptor.host().to_string()))
        };

        let mut headers = HeaderMap::new();
        if let Some(key) = descriptor.credential() {
            let mut value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|_| ConnectionError::InvalidCredential)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .connect_timeout(descriptor.startup_timeout())
            .build()?;

        Ok(Self {
            batch_objects_url: join(PATH_BATCH_OBJECTS)?,
            graphql_url: join(PATH_GRAPHQL)?,
            ready_url: join(PATH_READY)?,
            http,
        })
    }

    /// Submits objects to the batch endpoint and returns one entry per object.
    ///
    /// Per-object failures are reported inside the entries, not as an error.
    ///
    /// # Errors
    /// Returns `StoreError` if the request fails, the status is not 2xx, or the body is malformed.
    pub async fn batch_objects(
        &self,
        objects: Vec<BatchObject>,
    ) -> StoreResult<Vec<BatchObjectResponse>> {
        let response = self
            .http
            .post(self.batch_objects_url.clone())
            .json(&BatchRequest { objects })
            .send()
            .await?;
        decode(response).await
    }

    /// Runs a GraphQL query and returns the response envelope untouched.
    ///
    /// # Errors
    /// Returns `StoreError` if the request fails, the status is not 2xx, or the body is not JSON.
    pub async fn graphql(&self, query: String) -> StoreResult<Value> {
        let response = self
            .http
            .post(self.graphql_url.clone())
            .json(&GraphQlRequest { query })
            .send()
            .await?;
        decode(response).await
    }

    /// Polls the readiness endpoint until it answers 2xx or `timeout` elapses.
    ///
    /// A probe that is still in flight at the deadline is abandoned.
    ///
    /// # Errors
    /// Returns `StoreError::NotReady` when the deadline passes first.
    pub async fn wait_until_ready(&self, timeout: Duration) -> StoreResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            let probe = self.http.get(self.ready_url.clone()).send();
            match tokio::time::timeout_at(deadline, probe).await {
                Err(_) => return Err(StoreError::NotReady(timeout)),
                Ok(Ok(response)) if response.status().is_success() => return Ok(()),
                Ok(Ok(response)) => debug!(status = %response.status(), "weaviate not ready yet"),
                Ok(Err(err)) => debug!(error = %err, "weaviate readiness probe failed"),
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(StoreError::NotReady(timeout));
            }
            tokio::time::sleep(READY_POLL_INTERVAL.min(deadline - now)).await;
        }
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> StoreResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(StoreError::Status {
            status: status.as_u16(),
            body: body.trim().to_string(),
        });
    }
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

//! Backend bridge between tool-level requests and the Weaviate client.

use std::{error::Error, fmt, future::Future, time::Duration};

use weaviate_store::models::{InsertResult, QueryRequest, QueryResult, RecordProperties};

use crate::connection::{ConnectionDescriptor, ConnectionError};
use crate::store::{StoreError, StoreResult, WeaviateStore};

pub mod insert;
pub mod query;

pub use insert::{BatchReport, ObjectError, PartialWriteError};

#[derive(Debug)]
pub enum BridgeError {
    Store(StoreError),
    PartialWrite(PartialWriteError),
    EmptyResponse,
    MissingId,
    Timeout(Duration),
    Encode(serde_json::Error),
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::PartialWrite(err) => write!(f, "{err}"),
            Self::EmptyResponse => write!(f, "weaviate returned no batch entries"),
            Self::MissingId => write!(f, "weaviate did not report an object id"),
            Self::Timeout(timeout) => {
                write!(f, "weaviate call timed out after {}ms", timeout.as_millis())
            }
            Self::Encode(err) => write!(f, "encode query response: {err}"),
        }
    }
}

impl Error for BridgeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::PartialWrite(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::EmptyResponse | Self::MissingId | Self::Timeout(_) => None,
        }
    }
}

impl From<StoreError> for BridgeError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<PartialWriteError> for BridgeError {
    fn from(err: PartialWriteError) -> Self {
        Self::PartialWrite(err)
    }
}

/// Domain operations the dispatcher needs from a backend.
///
/// Implementations are shared across concurrent invocations, so they must be
/// usable through `&self` alone. Dropping a returned future abandons the call.
pub trait Bridge: Send + Sync + 'static {
    /// Inserts one record and returns the identifier the backend assigned.
    fn insert_one(
        &self,
        collection: &str,
        properties: RecordProperties,
    ) -> impl Future<Output = Result<InsertResult, BridgeError>> + Send;

    /// Runs a hybrid search and returns the serialized response envelope.
    fn query(
        &self,
        request: QueryRequest,
    ) -> impl Future<Output = Result<QueryResult, BridgeError>> + Send;
}

/// Bridge backed by a Weaviate instance.
#[derive(Clone)]
pub struct WeaviateBridge {
    store: WeaviateStore,
    request_timeout: Duration,
}

impl WeaviateBridge {
    #[must_use]
    pub const fn new(store: WeaviateStore, request_timeout: Duration) -> Self {
        Self {
            store,
            request_timeout,
        }
    }

    /// Builds the backend client for `descriptor`. No request is sent.
    ///
    /// # Errors
    /// Returns `ConnectionError` if the client cannot be constructed.
    pub fn connect(descriptor: &ConnectionDescriptor) -> Result<Self, ConnectionError> {
        let store = WeaviateStore::connect(descriptor)?;
        Ok(Self::new(store, descriptor.request_timeout()))
    }

    #[must_use]
    pub const fn store(&self) -> &WeaviateStore {
        &self.store
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    async fn within_deadline<T>(
        &self,
        call: impl Future<Output = StoreResult<T>>,
    ) -> Result<T, BridgeError> {
        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(BridgeError::Timeout(self.request_timeout)),
        }
    }
}

impl Bridge for WeaviateBridge {
    async fn insert_one(
        &self,
        collection: &str,
        properties: RecordProperties,
    ) -> Result<InsertResult, BridgeError> {
        self.insert_object(collection, properties).await
    }

    async fn query(&self, request: QueryRequest) -> Result<QueryResult, BridgeError> {
        self.hybrid_query(request).await
    }
}

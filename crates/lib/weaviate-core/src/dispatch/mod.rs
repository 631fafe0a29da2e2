//! Tool dispatch: untyped invocation in, protocol-ready result out.
//!
//! Each invocation is validated synchronously, handed to the bridge, and the
//! outcome is folded into a `ToolResult`. Nothing is retained between calls.

use std::{error::Error, fmt, sync::Arc};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::bridge::{Bridge, BridgeError};

pub mod extract;

pub use extract::{ToolCall, ValidationError};

pub const INSERT_FAILED: &str = "failed to insert object";
pub const QUERY_FAILED: &str = "failed to process query";

/// A single tool call as received from the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub tool_name: String,
    pub arguments: Map<String, Value>,
}

impl ToolInvocation {
    #[must_use]
    pub fn new(tool_name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
        }
    }
}

#[derive(Debug)]
pub enum DispatchError {
    Validation(ValidationError),
    Bridge(BridgeError),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Bridge(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Bridge(err) => Some(err),
        }
    }
}

/// Outcome handed back to the transport for one invocation.
#[derive(Debug)]
pub enum ToolResult {
    Success(String),
    Failure {
        message: String,
        cause: Option<DispatchError>,
    },
}

impl ToolResult {
    fn rejected(err: ValidationError) -> Self {
        Self::Failure {
            message: err.to_string(),
            cause: Some(DispatchError::Validation(err)),
        }
    }

    fn bridge_failed(prefix: &str, err: BridgeError) -> Self {
        Self::Failure {
            message: format!("{prefix}: {err}"),
            cause: Some(DispatchError::Bridge(err)),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The text shown to the caller: the payload on success, the message on failure.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Success(text) | Self::Failure { message: text, .. } => text,
        }
    }

    #[must_use]
    pub const fn cause(&self) -> Option<&DispatchError> {
        match self {
            Self::Success(_) => None,
            Self::Failure { cause, .. } => cause.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    EmptyDefaultCollection,
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDefaultCollection => write!(f, "default collection must not be empty"),
        }
    }
}

impl Error for ContextError {}

/// Process-wide state shared by every invocation: the bridge and the
/// collection used when a caller does not name one.
pub struct DispatchContext<B: Bridge> {
    bridge: Arc<B>,
    default_collection: String,
}

impl<B: Bridge> DispatchContext<B> {
    /// # Errors
    /// Returns `ContextError::EmptyDefaultCollection` for a blank default collection.
    pub fn new(bridge: B, default_collection: impl Into<String>) -> Result<Self, ContextError> {
        Self::with_shared_bridge(Arc::new(bridge), default_collection)
    }

    /// # Errors
    /// Returns `ContextError::EmptyDefaultCollection` for a blank default collection.
    pub fn with_shared_bridge(
        bridge: Arc<B>,
        default_collection: impl Into<String>,
    ) -> Result<Self, ContextError> {
        let default_collection = default_collection.into();
        if default_collection.trim().is_empty() {
            return Err(ContextError::EmptyDefaultCollection);
        }
        Ok(Self {
            bridge,
            default_collection,
        })
    }

    #[must_use]
    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    #[must_use]
    pub fn default_collection(&self) -> &str {
        &self.default_collection
    }
}

/// Routes tool invocations to bridge operations.
pub struct Dispatcher<B: Bridge> {
    context: Arc<DispatchContext<B>>,
}

impl<B: Bridge> Clone for Dispatcher<B> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
        }
    }
}

impl<B: Bridge> Dispatcher<B> {
    #[must_use]
    pub const fn new(context: Arc<DispatchContext<B>>) -> Self {
        Self { context }
    }

    #[must_use]
    pub fn context(&self) -> &DispatchContext<B> {
        &self.context
    }

    /// Validates an invocation without calling the bridge.
    ///
    /// # Errors
    /// Returns `ValidationError` for unknown tools and missing or malformed arguments.
    pub fn validate(&self, invocation: ToolInvocation) -> Result<ToolCall, ValidationError> {
        ToolCall::extract(invocation, self.context.default_collection())
    }

    /// Validates and runs one invocation. Failures are returned, never raised.
    pub async fn dispatch(&self, invocation: ToolInvocation) -> ToolResult {
        let tool = invocation.tool_name.clone();
        match self.validate(invocation) {
            Ok(call) => self.execute(call).await,
            Err(err) => {
                debug!(%tool, error = %err, "rejected tool arguments");
                ToolResult::rejected(err)
            }
        }
    }

    /// Runs an already validated call against the bridge.
    pub async fn execute(&self, call: ToolCall) -> ToolResult {
        let bridge = self.context.bridge();
        match call {
            ToolCall::InsertOne {
                collection,
                properties,
            } => match bridge.insert_one(&collection, properties).await {
                Ok(inserted) => ToolResult::Success(inserted.id),
                Err(err) => {
                    warn!(%collection, error = %err, "{INSERT_FAILED}");
                    ToolResult::bridge_failed(INSERT_FAILED, err)
                }
            },
            ToolCall::Query(request) => {
                let collection = request.collection.clone();
                match bridge.query(request).await {
                    Ok(result) => ToolResult::Success(result.into_string()),
                    Err(err) => {
                        warn!(%collection, error = %err, "{QUERY_FAILED}");
                        ToolResult::bridge_failed(QUERY_FAILED, err)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use serde_json::json;
    use weaviate_store::models::{
        BatchObjectResponse,
        InsertResult,
        QueryRequest,
        QueryResult,
        RecordProperties,
    };

    use crate::bridge::BatchReport;

    #[derive(Default)]
    struct RecordingBridge {
        insert_calls: AtomicUsize,
        query_calls: AtomicUsize,
        inserts: Mutex<Vec<(String, RecordProperties)>>,
        queries: Mutex<Vec<QueryRequest>>,
        rejections: Vec<&'static str>,
        unavailable: bool,
    }

    impl RecordingBridge {
        fn rejecting(messages: Vec<&'static str>) -> Self {
            Self {
                rejections: messages,
                ..Self::default()
            }
        }

        fn unavailable() -> Self {
            Self {
                unavailable: true,
                ..Self::default()
            }
        }
    }

    impl Bridge for RecordingBridge {
        async fn insert_one(
            &self,
            collection: &str,
            properties: RecordProperties,
        ) -> Result<InsertResult, BridgeError> {
            self.insert_calls.fetch_add(1, Ordering::SeqCst);
            self.inserts
                .lock()
                .expect("insert log poisoned")
                .push((collection.to_string(), properties));
            if self.unavailable {
                return Err(BridgeError::Timeout(Duration::from_secs(1)));
            }
            if !self.rejections.is_empty() {
                let errors: Vec<_> = self
                    .rejections
                    .iter()
                    .map(|message| json!({"message": message}))
                    .collect();
                let entry: BatchObjectResponse =
                    serde_json::from_value(json!({"result": {"errors": {"error": errors}}}))
                        .expect("entry should decode");
                let report = BatchReport::from_responses(vec![entry]);
                return Err(report.errors.expect("errors expected").into());
            }
            Ok(InsertResult {
                id: "abc-123".to_string(),
            })
        }

        async fn query(&self, request: QueryRequest) -> Result<QueryResult, BridgeError> {
            self.query_calls.fetch_add(1, Ordering::SeqCst);
            let fields = request.target_properties.clone();
            self.queries.lock().expect("query log poisoned").push(request);
            if self.unavailable {
                return Err(BridgeError::Timeout(Duration::from_secs(1)));
            }
            let document = json!({"data": {"Get": {"Product": [{"fields": fields}]}}});
            Ok(QueryResult::new(document.to_string()))
        }
    }

    fn dispatcher(bridge: RecordingBridge) -> Dispatcher<RecordingBridge> {
        let context = DispatchContext::new(bridge, "DefaultCollection").expect("valid context");
        Dispatcher::new(Arc::new(context))
    }

    fn invocation(tool: &str, arguments: Value) -> ToolInvocation {
        let Value::Object(arguments) = arguments else {
            panic!("test arguments must be an object");
        };
        ToolInvocation::new(tool, arguments)
    }

    #[tokio::test]
    async fn insert_without_collection_uses_default() {
        let dispatcher = dispatcher(RecordingBridge::default());
        let result = dispatcher
            .dispatch(invocation("insert-one", json!({"properties": {"name": "Alice"}})))
            .await;

        assert!(result.is_success());
        assert_eq!(result.text(), "abc-123");
        let inserts = dispatcher.context().bridge().inserts.lock().expect("insert log");
        assert_eq!(inserts.len(), 1);
        assert_eq!(inserts[0].0, "DefaultCollection");
        assert_eq!(Value::Object(inserts[0].1.clone()), json!({"name": "Alice"}));
    }

    #[tokio::test]
    async fn insert_reports_every_nested_error() {
        let dispatcher = dispatcher(RecordingBridge::rejecting(vec![
            "invalid property 'age'",
            "vectorizer unavailable",
        ]));
        let result = dispatcher
            .dispatch(invocation(
                "insert-one",
                json!({"collection": "People", "properties": {"age": "old"}}),
            ))
            .await;

        assert!(!result.is_success());
        assert_eq!(
            result.text(),
            "failed to insert object: invalid property 'age'\nvectorizer unavailable"
        );
        assert!(matches!(
            result.cause(),
            Some(DispatchError::Bridge(BridgeError::PartialWrite(errors))) if errors.len() == 2
        ));
        let inserts = dispatcher.context().bridge().inserts.lock().expect("insert log");
        assert_eq!(inserts[0].0, "People");
    }

    #[tokio::test]
    async fn query_returns_backend_document() {
        let dispatcher = dispatcher(RecordingBridge::default());
        let result = dispatcher
            .dispatch(invocation(
                "query",
                json!({"query": "red shoes", "targetProperties": ["name", "price"]}),
            ))
            .await;

        assert!(result.is_success());
        let document: Value = serde_json::from_str(result.text()).expect("result should be JSON");
        assert_eq!(
            document,
            json!({"data": {"Get": {"Product": [{"fields": ["name", "price"]}]}}})
        );
        let queries = dispatcher.context().bridge().queries.lock().expect("query log");
        assert_eq!(
            queries[0],
            QueryRequest {
                collection: "DefaultCollection".to_string(),
                query: "red shoes".to_string(),
                target_properties: vec!["name".to_string(), "price".to_string()],
            }
        );
    }

    #[tokio::test]
    async fn non_string_target_property_never_reaches_bridge() {
        let dispatcher = dispatcher(RecordingBridge::default());
        let result = dispatcher
            .dispatch(invocation(
                "query",
                json!({"query": "x", "targetProperties": ["name", 42]}),
            ))
            .await;

        assert!(!result.is_success());
        assert_eq!(result.text(), "targetProperties must contain only strings");
        assert!(matches!(result.cause(), Some(DispatchError::Validation(_))));
        assert_eq!(dispatcher.context().bridge().query_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_field_name_never_reaches_bridge() {
        let dispatcher = dispatcher(RecordingBridge::default());
        let result = dispatcher
            .dispatch(invocation(
                "query",
                json!({"query": "x", "targetProperties": ["name } } Get { Secret { token"]}),
            ))
            .await;

        assert!(!result.is_success());
        assert!(matches!(
            result.cause(),
            Some(DispatchError::Validation(ValidationError::InvalidName { .. }))
        ));
        assert_eq!(dispatcher.context().bridge().query_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_properties_never_reaches_bridge() {
        let dispatcher = dispatcher(RecordingBridge::default());
        let result = dispatcher
            .dispatch(invocation("insert-one", json!({"collection": "People"})))
            .await;

        assert_eq!(result.text(), "properties is required");
        assert_eq!(dispatcher.context().bridge().insert_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn bridge_failures_carry_fixed_prefix() {
        let dispatcher = dispatcher(RecordingBridge::unavailable());

        let insert = dispatcher
            .dispatch(invocation("insert-one", json!({"properties": {"name": "Alice"}})))
            .await;
        assert_eq!(
            insert.text(),
            "failed to insert object: weaviate call timed out after 1000ms"
        );

        let query = dispatcher
            .dispatch(invocation("query", json!({"query": "x", "targetProperties": ["name"]})))
            .await;
        assert_eq!(
            query.text(),
            "failed to process query: weaviate call timed out after 1000ms"
        );
    }

    #[tokio::test]
    async fn concurrent_invocations_are_independent() {
        let dispatcher = dispatcher(RecordingBridge::default());
        let calls = (0..16).map(|index| {
            let dispatcher = dispatcher.clone();
            async move {
                dispatcher
                    .dispatch(invocation(
                        "insert-one",
                        json!({"collection": format!("C{index}"), "properties": {"n": index}}),
                    ))
                    .await
            }
        });

        let results = futures::future::join_all(calls).await;
        assert!(results.iter().all(ToolResult::is_success));
        assert_eq!(dispatcher.context().bridge().insert_calls.load(Ordering::SeqCst), 16);
    }

    #[test]
    fn blank_default_collection_is_rejected() {
        let err = DispatchContext::new(RecordingBridge::default(), " ")
            .err()
            .expect("blank default should fail");
        assert_eq!(err, ContextError::EmptyDefaultCollection);
    }
}

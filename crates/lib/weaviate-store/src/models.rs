use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Field values for a single record. Weaviate infers the collection schema on write.
pub type RecordProperties = Map<String, Value>;

/// Outcome of a successful single-record insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InsertResult {
    pub id: String,
}

/// Hybrid search request against one collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryRequest {
    pub collection: String,
    pub query: String,
    pub target_properties: Vec<String>,
}

/// Raw backend response envelope serialized as JSON text.
///
/// The bridge never interprets the document; callers parse it if they care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    document: String,
}

impl QueryResult {
    #[must_use]
    pub const fn new(document: String) -> Self {
        Self { document }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.document
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.document
    }
}

/// A single object submitted to the batch endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchObject {
    pub class: String,
    pub properties: RecordProperties,
}

/// Request body for `POST /v1/batch/objects`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BatchRequest {
    pub objects: Vec<BatchObject>,
}

/// One response entry per submitted batch object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchObjectResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time_unix: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ObjectResult>,
}

impl BatchObjectResponse {
    /// Returns the nested error messages for this entry, or `None` when it succeeded.
    ///
    /// The returned list is never empty.
    #[must_use]
    pub fn error_messages(&self) -> Option<Vec<&str>> {
        let errors = self.result.as_ref()?.errors.as_ref()?;
        let messages: Vec<&str> = errors
            .error
            .iter()
            .map(|item| item.message.as_str())
            .collect();
        if messages.is_empty() {
            None
        } else {
            Some(messages)
        }
    }
}

/// Per-object status reported by the batch endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<ErrorResponse>,
}

/// Weaviate's `{"error": [{"message": ...}]}` error envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Vec<ErrorItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorItem {
    pub message: String,
}

/// Request body for `POST /v1/graphql`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GraphQlRequest {
    pub query: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn batch_response_without_errors_has_no_messages() {
        let entries: Vec<BatchObjectResponse> = serde_json::from_value(json!([{
            "class": "Article",
            "id": "6a5c2c64-7b1d-4e8e-9d0b-3f7d8f0c1a2b",
            "creationTimeUnix": 1_700_000_000_000_i64,
            "properties": {"name": "Alice"},
            "result": {"status": "SUCCESS"}
        }]))
        .expect("batch response should decode");

        assert_eq!(entries.len(), 1);
        assert!(entries[0].error_messages().is_none());
        assert_eq!(
            entries[0].id.map(|id| id.to_string()).as_deref(),
            Some("6a5c2c64-7b1d-4e8e-9d0b-3f7d8f0c1a2b")
        );
    }

    #[test]
    fn batch_response_collects_nested_messages_in_order() {
        let entry: BatchObjectResponse = serde_json::from_value(json!({
            "class": "Article",
            "result": {
                "status": "FAILED",
                "errors": {"error": [{"message": "first"}, {"message": "second"}]}
            }
        }))
        .expect("batch entry should decode");

        assert_eq!(entry.error_messages(), Some(vec!["first", "second"]));
        assert!(entry.id.is_none());
    }

    #[test]
    fn empty_error_list_counts_as_success() {
        let entry: BatchObjectResponse = serde_json::from_value(json!({
            "result": {"errors": {"error": []}}
        }))
        .expect("batch entry should decode");

        assert!(entry.error_messages().is_none());
    }

    #[test]
    fn batch_request_uses_weaviate_field_names() {
        let mut properties = RecordProperties::new();
        properties.insert("name".to_string(), json!("Alice"));
        let request = BatchRequest {
            objects: vec![BatchObject {
                class: "People".to_string(),
                properties,
            }],
        };

        let encoded = serde_json::to_value(&request).expect("request should encode");
        assert_eq!(
            encoded,
            json!({"objects": [{"class": "People", "properties": {"name": "Alice"}}]})
        );
    }
}

use serde_json::Value;

pub const DEFAULT_HOST: &str = "localhost:8080";
pub const DEFAULT_COLLECTION: &str = "DefaultCollection";

pub const PATH_BATCH_OBJECTS: &str = "v1/batch/objects";
pub const PATH_GRAPHQL: &str = "v1/graphql";
pub const PATH_READY: &str = "v1/.well-known/ready";

pub const STATUS_SUCCESS: &str = "SUCCESS";
pub const STATUS_FAILED: &str = "FAILED";

/// Builds a `Get` query running a hybrid search over `collection`.
///
/// Only the query text is escaped. Callers must pass field names that are
/// GraphQL identifiers; the collection is used as given.
#[must_use]
pub fn hybrid_get_query(collection: &str, query: &str, fields: &[String]) -> String {
    let query = Value::String(query.to_string());
    let fields = fields.join(" ");
    format!("{{ Get {{ {collection}(hybrid: {{query: {query}}}) {{ {fields} }} }} }}")
}

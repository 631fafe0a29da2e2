use tracing::{debug, warn};
use weaviate_store::models::{QueryRequest, QueryResult};
use weaviate_store::schema::hybrid_get_query;

use super::{BridgeError, WeaviateBridge};

impl WeaviateBridge {
    /// Runs a hybrid (keyword + vector) search returning only the requested fields.
    ///
    /// Ranking and limits are left at the backend defaults. The response
    /// envelope is re-encoded as JSON without inspecting its contents.
    ///
    /// # Errors
    /// Returns `BridgeError` if the backend call fails or times out.
    pub async fn hybrid_query(&self, request: QueryRequest) -> Result<QueryResult, BridgeError> {
        let QueryRequest {
            collection,
            query,
            target_properties,
        } = request;

        let graphql = hybrid_get_query(&collection, &query, &target_properties);
        let envelope = self
            .within_deadline(self.store.graphql(graphql))
            .await
            .inspect_err(|err| warn!(%collection, error = %err, "hybrid query failed"))?;

        let document = serde_json::to_string(&envelope).map_err(BridgeError::Encode)?;
        debug!(%collection, fields = target_properties.len(), "hybrid query completed");
        Ok(QueryResult::new(document))
    }
}

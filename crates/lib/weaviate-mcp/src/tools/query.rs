use std::borrow::Cow;

use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, JsonObject},
    schemars::{JsonSchema, Schema, SchemaGenerator},
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};
use weaviate_core::bridge::Bridge;
use weaviate_core::catalog::ToolKind;

use super::catalog_schema;
use crate::WeaviateMcp;

/// Raw arguments for `query`. Shape checks happen in the dispatcher.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryArguments(pub JsonObject);

impl JsonSchema for QueryArguments {
    fn schema_name() -> Cow<'static, str> {
        Cow::Borrowed("QueryArguments")
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        catalog_schema(ToolKind::Query)
    }
}

#[tool_router(router = tool_router_query, vis = "pub")]
impl<B: Bridge> WeaviateMcp<B> {
    #[tool(name = "query")]
    pub(crate) async fn query(
        &self,
        Parameters(arguments): Parameters<QueryArguments>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(self.invoke(ToolKind::Query, arguments.0).await)
    }
}

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

/// Raw arguments for `insert-one`. Shape checks happen in the dispatcher.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InsertOneArguments(pub JsonObject);

impl JsonSchema for InsertOneArguments {
    fn schema_name() -> Cow<'static, str> {
        Cow::Borrowed("InsertOneArguments")
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        catalog_schema(ToolKind::InsertOne)
    }
}

#[tool_router(router = tool_router_insert, vis = "pub")]
impl<B: Bridge> WeaviateMcp<B> {
    #[tool(name = "insert-one")]
    pub(crate) async fn insert_one(
        &self,
        Parameters(arguments): Parameters<InsertOneArguments>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(self.invoke(ToolKind::InsertOne, arguments.0).await)
    }
}

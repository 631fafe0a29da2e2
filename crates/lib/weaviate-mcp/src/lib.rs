//! MCP server implementation for weaviate-mcp.
//!
//! This crate wires the dispatcher into rmcp tool handlers. Tool arguments are
//! accepted as raw JSON objects and validated by the dispatcher, so malformed
//! calls come back as tool errors rather than protocol faults.

mod tools;
pub mod server;

use std::borrow::Cow;
use std::sync::Arc;

use rmcp::{
    ServerHandler,
    handler::server::tool::ToolRouter,
    model::{CallToolResult, Content, JsonObject, ServerCapabilities, ServerInfo},
    tool_handler,
};
use weaviate_core::bridge::Bridge;
use weaviate_core::catalog::{self, TOOL_CATALOG, ToolKind};
use weaviate_core::dispatch::{DispatchContext, Dispatcher, ToolInvocation, ToolResult};

pub use tools::{InsertOneArguments, QueryArguments};

const SERVER_INSTRUCTIONS: &str = r"weaviate-mcp exposes a Weaviate instance through two tools.

- `insert-one`: insert a single object. `properties` is a required, non-empty object.
  `collection` is optional and defaults to the server's configured collection.
  Returns the id Weaviate assigned to the object.
- `query`: run a hybrid (keyword + vector) search. `query` is the search text and
  `targetProperties` lists the fields to return. `collection` is optional.
  Returns the raw GraphQL response as JSON.

Collections are created on first write and their schema is inferred from the inserted properties.";

/// MCP server wrapper around the dispatcher and tool routers.
pub struct WeaviateMcp<B: Bridge> {
    tool_router: ToolRouter<Self>,
    dispatcher: Dispatcher<B>,
}

impl<B: Bridge> Clone for WeaviateMcp<B> {
    fn clone(&self) -> Self {
        Self {
            tool_router: self.tool_router.clone(),
            dispatcher: self.dispatcher.clone(),
        }
    }
}

impl<B: Bridge> WeaviateMcp<B> {
    /// Creates a new server owning its dispatch context.
    #[must_use]
    pub fn new(context: DispatchContext<B>) -> Self {
        Self::with_context(Arc::new(context))
    }

    /// Creates a new server using a shared dispatch context.
    #[must_use]
    pub fn with_context(context: Arc<DispatchContext<B>>) -> Self {
        Self {
            tool_router: Self::catalog_router(),
            dispatcher: Dispatcher::new(context),
        }
    }

    /// Combines the tool routers and advertises each tool as the catalog declares it.
    fn catalog_router() -> ToolRouter<Self> {
        let mut router = Self::tool_router_insert() + Self::tool_router_query();
        for declaration in TOOL_CATALOG {
            if let Some(route) = router.map.get_mut(declaration.name) {
                route.attr.description = Some(Cow::Borrowed(declaration.description));
                route.attr.input_schema = Arc::new(declaration.input_schema());
            }
        }
        router
    }

    pub(crate) async fn invoke(&self, tool: ToolKind, arguments: JsonObject) -> CallToolResult {
        let invocation = ToolInvocation::new(catalog::declaration(tool).name, arguments);
        into_call_tool_result(self.dispatcher.dispatch(invocation).await)
    }
}

/// Converts a dispatcher outcome into the MCP tool result envelope.
#[must_use]
pub fn into_call_tool_result(result: ToolResult) -> CallToolResult {
    match result {
        ToolResult::Success(text) => CallToolResult::success(vec![Content::text(text)]),
        ToolResult::Failure { message, .. } => CallToolResult::error(vec![Content::text(message)]),
    }
}

#[tool_handler]
impl<B: Bridge> ServerHandler for WeaviateMcp<B> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}

//! MCP tool modules.
//!
//! One module per catalog entry. Argument types deserialize any JSON object
//! and advertise the schema declared in the catalog.

mod insert;
mod query;

pub use insert::InsertOneArguments;
pub use query::QueryArguments;

use rmcp::schemars::Schema;
use weaviate_core::catalog::{self, ToolKind};

fn catalog_schema(tool: ToolKind) -> Schema {
    Schema::from(catalog::declaration(tool).input_schema())
}

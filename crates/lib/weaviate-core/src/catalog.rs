//! Static declarations of the tools this server exposes.
//!
//! The transport advertises these schemas and the dispatcher validates
//! against the same argument names, so both read from here.

use serde_json::{Map, Value, json};

pub const INSERT_ONE_TOOL: &str = "insert-one";
pub const QUERY_TOOL: &str = "query";

pub const ARG_COLLECTION: &str = "collection";
pub const ARG_PROPERTIES: &str = "properties";
pub const ARG_QUERY: &str = "query";
pub const ARG_TARGET_PROPERTIES: &str = "targetProperties";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    InsertOne,
    Query,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    String,
    Object,
    StringArray,
}

impl ArgumentKind {
    fn schema(self, description: &str) -> Value {
        match self {
            Self::String => json!({"type": "string", "description": description}),
            Self::Object => json!({"type": "object", "description": description}),
            Self::StringArray => json!({
                "type": "array",
                "items": {"type": "string"},
                "description": description,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgumentDeclaration {
    pub name: &'static str,
    pub kind: ArgumentKind,
    pub required: bool,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolDeclaration {
    pub kind: ToolKind,
    pub name: &'static str,
    pub description: &'static str,
    pub arguments: &'static [ArgumentDeclaration],
}

impl ToolDeclaration {
    /// Renders the argument list as a JSON Schema object.
    #[must_use]
    pub fn input_schema(&self) -> Map<String, Value> {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for argument in self.arguments {
            properties.insert(
                argument.name.to_string(),
                argument.kind.schema(argument.description),
            );
            if argument.required {
                required.push(Value::String(argument.name.to_string()));
            }
        }

        let mut schema = Map::new();
        schema.insert("type".to_string(), Value::String("object".to_string()));
        schema.insert("properties".to_string(), Value::Object(properties));
        schema.insert("required".to_string(), Value::Array(required));
        schema
    }

    pub fn required_arguments(&self) -> impl Iterator<Item = &'static str> {
        self.arguments
            .iter()
            .filter(|argument| argument.required)
            .map(|argument| argument.name)
    }
}

const COLLECTION_ARGUMENT: ArgumentDeclaration = ArgumentDeclaration {
    name: ARG_COLLECTION,
    kind: ArgumentKind::String,
    required: false,
    description: "Name of the target collection",
};

pub static INSERT_ONE: ToolDeclaration = ToolDeclaration {
    kind: ToolKind::InsertOne,
    name: INSERT_ONE_TOOL,
    description: "Insert one object into a Weaviate collection and return its id.",
    arguments: &[
        COLLECTION_ARGUMENT,
        ArgumentDeclaration {
            name: ARG_PROPERTIES,
            kind: ArgumentKind::Object,
            required: true,
            description: "Object properties to insert",
        },
    ],
};

pub static QUERY: ToolDeclaration = ToolDeclaration {
    kind: ToolKind::Query,
    name: QUERY_TOOL,
    description: "Run a hybrid search against a Weaviate collection and return the raw response as JSON.",
    arguments: &[
        COLLECTION_ARGUMENT,
        ArgumentDeclaration {
            name: ARG_QUERY,
            kind: ArgumentKind::String,
            required: true,
            description: "Query data within Weaviate",
        },
        ArgumentDeclaration {
            name: ARG_TARGET_PROPERTIES,
            kind: ArgumentKind::StringArray,
            required: true,
            description: "Properties to return with the query",
        },
    ],
};

pub static TOOL_CATALOG: [&ToolDeclaration; 2] = [&INSERT_ONE, &QUERY];

/// Finds a tool by its advertised name.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static ToolDeclaration> {
    TOOL_CATALOG
        .iter()
        .copied()
        .find(|declaration| declaration.name == name)
}

#[must_use]
pub fn declaration(kind: ToolKind) -> &'static ToolDeclaration {
    match kind {
        ToolKind::InsertOne => &INSERT_ONE,
        ToolKind::Query => &QUERY,
    }
}

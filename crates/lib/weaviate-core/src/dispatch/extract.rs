use std::{error::Error, fmt};

use serde_json::{Map, Value};
use weaviate_store::models::{QueryRequest, RecordProperties};

use crate::catalog::{
    self,
    ARG_COLLECTION,
    ARG_PROPERTIES,
    ARG_QUERY,
    ARG_TARGET_PROPERTIES,
    ToolKind,
};

use super::ToolInvocation;

/// Rejected tool arguments. The message is shown to the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    UnknownTool(String),
    Missing(&'static str),
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
    Empty(&'static str),
    NonStringElement(&'static str),
    EmptyElement(&'static str),
    InvalidName {
        field: &'static str,
        name: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTool(name) => write!(f, "unknown tool: {name}"),
            Self::Missing(field) => write!(f, "{field} is required"),
            Self::WrongType { field, expected } => write!(f, "{field} must be {expected}"),
            Self::Empty(field) => write!(f, "{field} must not be empty"),
            Self::NonStringElement(field) => write!(f, "{field} must contain only strings"),
            Self::EmptyElement(field) => write!(f, "{field} must not contain empty names"),
            Self::InvalidName { field, name } => {
                write!(f, "{field} must contain only GraphQL field names, got {name:?}")
            }
        }
    }
}

impl Error for ValidationError {}

/// A validated invocation, ready for the bridge.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    InsertOne {
        collection: String,
        properties: RecordProperties,
    },
    Query(QueryRequest),
}

impl ToolCall {
    /// Extracts typed arguments for the named tool.
    ///
    /// A `collection` that is absent or not a string resolves to
    /// `default_collection`. Every other argument must match its declared
    /// shape exactly.
    ///
    /// # Errors
    /// Returns `ValidationError` for unknown tools and missing or malformed arguments.
    pub fn extract(
        invocation: ToolInvocation,
        default_collection: &str,
    ) -> Result<Self, ValidationError> {
        let ToolInvocation {
            tool_name,
            mut arguments,
        } = invocation;
        let tool = catalog::lookup(&tool_name).ok_or(ValidationError::UnknownTool(tool_name))?;
        let collection = resolve_collection(&mut arguments, default_collection);

        match tool.kind {
            ToolKind::InsertOne => Ok(Self::InsertOne {
                collection,
                properties: extract_properties(&mut arguments)?,
            }),
            ToolKind::Query => {
                let query = extract_query(&mut arguments)?;
                let target_properties = extract_target_properties(&mut arguments)?;
                Ok(Self::Query(QueryRequest {
                    collection,
                    query,
                    target_properties,
                }))
            }
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ToolKind {
        match self {
            Self::InsertOne { .. } => ToolKind::InsertOne,
            Self::Query(_) => ToolKind::Query,
        }
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        match self {
            Self::InsertOne { collection, .. } => collection,
            Self::Query(request) => &request.collection,
        }
    }
}

fn resolve_collection(arguments: &mut Map<String, Value>, default_collection: &str) -> String {
    match arguments.remove(ARG_COLLECTION) {
        Some(Value::String(collection)) => collection,
        _ => default_collection.to_string(),
    }
}

fn required(arguments: &mut Map<String, Value>, field: &'static str) -> Result<Value, ValidationError> {
    match arguments.remove(field) {
        None | Some(Value::Null) => Err(ValidationError::Missing(field)),
        Some(value) => Ok(value),
    }
}

fn extract_properties(arguments: &mut Map<String, Value>) -> Result<RecordProperties, ValidationError> {
    let Value::Object(properties) = required(arguments, ARG_PROPERTIES)? else {
        return Err(ValidationError::WrongType {
            field: ARG_PROPERTIES,
            expected: "an object",
        });
    };
    if properties.is_empty() {
        return Err(ValidationError::Empty(ARG_PROPERTIES));
    }
    Ok(properties)
}

fn extract_query(arguments: &mut Map<String, Value>) -> Result<String, ValidationError> {
    let Value::String(query) = required(arguments, ARG_QUERY)? else {
        return Err(ValidationError::WrongType {
            field: ARG_QUERY,
            expected: "a string",
        });
    };
    if query.trim().is_empty() {
        return Err(ValidationError::Empty(ARG_QUERY));
    }
    Ok(query)
}

fn extract_target_properties(arguments: &mut Map<String, Value>) -> Result<Vec<String>, ValidationError> {
    let Value::Array(items) = required(arguments, ARG_TARGET_PROPERTIES)? else {
        return Err(ValidationError::WrongType {
            field: ARG_TARGET_PROPERTIES,
            expected: "an array",
        });
    };
    if items.is_empty() {
        return Err(ValidationError::Empty(ARG_TARGET_PROPERTIES));
    }

    items
        .into_iter()
        .map(|item| match item {
            Value::String(name) if name.trim().is_empty() => {
                Err(ValidationError::EmptyElement(ARG_TARGET_PROPERTIES))
            }
            Value::String(name) if !is_graphql_name(&name) => Err(ValidationError::InvalidName {
                field: ARG_TARGET_PROPERTIES,
                name,
            }),
            Value::String(name) => Ok(name),
            _ => Err(ValidationError::NonStringElement(ARG_TARGET_PROPERTIES)),
        })
        .collect()
}

// Field names are spliced into the query text, so only `[_A-Za-z][_0-9A-Za-z]*` passes.
fn is_graphql_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first == '_' || first.is_ascii_alphabetic())
        && chars.all(|rest| rest == '_' || rest.is_ascii_alphanumeric())
}

use thiserror::Error;
use crate::graph::NodeId;

/// Structural failures that abort graph construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Edge from node {src} to node {dst} references a node outside the graph ({node_count} nodes)")]
    DanglingEdge {
        src: NodeId,
        dst: NodeId,
        node_count: usize,
    },

    #[error("Failed to chain actions for {container}: {source}")]
    Chain {
        container: String,
        #[source]
        source: Box<GraphError>,
    },
}

/// Failures of the narrow accessors over schema-less payloads.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReflectError {
    #[error("expected an object but found {found}")]
    NotAnObject { found: String },

    #[error("expected a list but found {found}")]
    NotAList { found: String },

    #[error("field '{field}' is missing")]
    MissingField { field: String },

    #[error("field '{field}' should be {expected} but is {found}")]
    WrongType {
        field: String,
        expected: &'static str,
        found: String,
    },

    #[error("dynamic reference in '{field}' is not supported: {reference}")]
    DynamicReference { field: String, reference: String },

    #[error("invalid {what} configuration: {found}")]
    Malformed { what: &'static str, found: String },
}

/// Reasons an action node could not be created at all.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActionError {
    #[error("unknown action type '{0}'")]
    UnknownActionType(String),

    #[error("unknown loop type '{0}'")]
    UnknownLoopType(String),
}

/// Why a single analyzer row could not be inspected. Attached to the row,
/// never raised.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InspectionError {
    #[error("action resource not found")]
    ActionNotFound,

    #[error("action inputs malformed or missing")]
    MalformedInputs,

    #[error("cannot inspect action inputs: {0}")]
    Reference(#[from] ReflectError),
}

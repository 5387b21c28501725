//! Error types for the graph module.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors raised while reading or validating a diagram graph.
///
/// Structural variants carry the id of the offending node or edge so the
/// caller can point the user at the part of the diagram that needs fixing.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Element has an empty id")]
    EmptyId,

    #[error("Duplicate node id: {0}")]
    DuplicateNode(String),

    #[error("Duplicate edge id: {0}")]
    DuplicateEdge(String),

    #[error("Edge {edge} references missing node {endpoint}")]
    DanglingEdge { edge: String, endpoint: String },

    #[error("Containment cycle detected at node {node}")]
    ContainsCycle { node: String },

    #[error("Edge {edge}: {parent} cannot contain {child}")]
    InvalidContainment {
        edge: String,
        parent: String,
        child: String,
    },

    #[error("Node {node} is contained by more than one network")]
    MultipleParents { node: String },

    #[error("Node {node} must be inside a network")]
    Uncontained { node: String },

    #[error("Edge {edge}: source and destination cannot be the same")]
    SelfConnection { edge: String },

    #[error("Edge {edge}: port {port} outside the range [1,65535]")]
    InvalidPort { edge: String, port: u16 },

    #[error("Edge {edge}: node {node} cannot carry a security group")]
    NotSecurable { edge: String, node: String },

    #[error("Edge {edge}: endpoints belong to different networks")]
    CrossNetwork { edge: String },

    #[error("Invalid stack name '{name}': only letters, digits, '_' and '-' are allowed")]
    InvalidStackName { name: String },

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl GraphError {
    /// Id of the node or edge this error points at, if any.
    pub fn element_id(&self) -> Option<&str> {
        match self {
            GraphError::DuplicateNode(id) | GraphError::DuplicateEdge(id) => Some(id),
            GraphError::DanglingEdge { edge, .. }
            | GraphError::InvalidContainment { edge, .. }
            | GraphError::SelfConnection { edge }
            | GraphError::InvalidPort { edge, .. }
            | GraphError::NotSecurable { edge, .. }
            | GraphError::CrossNetwork { edge } => Some(edge),
            GraphError::ContainsCycle { node }
            | GraphError::MultipleParents { node }
            | GraphError::Uncontained { node } => Some(node),
            _ => None,
        }
    }
}

//! Error types for stack generation.

use thiserror::Error;

use hermes_graph::GraphError;

/// Result type alias for generation operations.
pub type CdkResult<T> = Result<T, CdkError>;

/// Errors that abort a generation request.
///
/// No partial stack is ever returned; every variant names the node or edge
/// the caller has to fix.
#[derive(Error, Debug)]
pub enum CdkError {
    #[error("Invalid graph: {0}")]
    Graph(#[from] GraphError),

    #[error("Unsupported configuration on node {node}: {reason}")]
    UnsupportedConfiguration { node: String, reason: String },

    #[error("Unresolvable relationship on edge {edge}: {reason}")]
    UnresolvableRelationship { edge: String, reason: String },

    #[error("Dependency cycle involving node {node}")]
    DependencyCycle { node: String },

    #[error("Fragment {origin} references {identifier} before it is defined")]
    UndefinedReference { origin: String, identifier: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl CdkError {
    pub(crate) fn unsupported(node: &str, reason: impl Into<String>) -> Self {
        CdkError::UnsupportedConfiguration {
            node: node.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unresolvable(edge: &str, reason: impl Into<String>) -> Self {
        CdkError::UnresolvableRelationship {
            edge: edge.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the error stems from the graph's structure rather than its content.
    pub fn is_structural(&self) -> bool {
        matches!(self, CdkError::Graph(_) | CdkError::DependencyCycle { .. })
    }
}

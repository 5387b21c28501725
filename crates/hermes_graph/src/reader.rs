//! Graph reading utilities.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::diagram::DiagramDocument;
use crate::error::{GraphError, GraphResult};
use crate::models::Graph;

/// Reader for serialized graphs.
///
/// Accepts both the flat graph schema (`nodes` / `edges`) and the editor's
/// document format (`blocks` / `connections`), detected by its top-level keys.
pub struct GraphReader;

impl GraphReader {
    /// Read a graph from a JSON or YAML file, chosen by extension.
    pub fn read_file(path: impl AsRef<Path>) -> GraphResult<Graph> {
        let path = path.as_ref();
        debug!("Reading graph from {:?}", path);

        let content = fs::read_to_string(path)?;
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "json" => Self::from_json_str(&content),
            "yaml" | "yml" => Self::from_yaml_str(&content),
            _ => Err(GraphError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Parse a graph from JSON text.
    pub fn from_json_str(content: &str) -> GraphResult<Graph> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(value)
    }

    /// Parse a graph from YAML text.
    pub fn from_yaml_str(content: &str) -> GraphResult<Graph> {
        let value: Value = serde_yaml::from_str(content)?;
        Self::from_value(value)
    }

    /// Build a graph from an already parsed document.
    pub fn from_value(value: Value) -> GraphResult<Graph> {
        if Self::is_editor_document(&value) {
            let document: DiagramDocument = serde_json::from_value(value)?;
            debug!("Lowering editor document '{}'", document.name);
            return Ok(document.into_graph());
        }

        let graph: Graph = serde_json::from_value(value)?;
        Ok(graph)
    }

    /// Whether a parsed file path has a supported graph extension.
    pub fn is_graph_file(path: &Path) -> bool {
        path.extension()
            .map_or(false, |ext| ext == "json" || ext == "yaml" || ext == "yml")
    }

    fn is_editor_document(value: &Value) -> bool {
        value.get("blocks").is_some() && value.get("nodes").is_none()
    }
}

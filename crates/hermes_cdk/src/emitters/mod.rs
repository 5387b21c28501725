//! Per-kind resource emitters.
//!
//! Each emitter renders one node's declaration together with the resources it
//! always needs (security group, role) and the outputs that expose it.

pub mod bucket;
pub mod database;
pub mod instance;
pub mod satellite;
pub mod vpc;

use serde_json::Value;
use tracing::warn;

use hermes_graph::{Graph, GraphError, Node, NodeKind};

use crate::config::GeneratorConfig;
use crate::error::{CdkError, CdkResult};
use crate::fragment::EmittedFragment;
use crate::naming::{Symbol, SymbolTable};

pub use database::DatabaseEngine;

/// Everything an emitter may consult besides the node itself.
pub struct EmitContext<'a> {
    pub graph: &'a Graph,
    pub symbols: &'a SymbolTable,
    pub config: &'a GeneratorConfig,
    pub stack_name: &'a str,
}

impl<'a> EmitContext<'a> {
    pub fn symbol(&self, node: &Node) -> CdkResult<&'a Symbol> {
        self.symbols
            .get(&node.id)
            .ok_or_else(|| CdkError::unsupported(&node.id, "no identifier allocated"))
    }

    /// The network a compute node is placed in.
    pub fn network_of(&self, node: &Node) -> CdkResult<&'a Symbol> {
        let symbol = match self.graph.parent_of(&node.id) {
            Some(parent) => self.symbols.get(&parent.id),
            None => self.symbols.default_network(),
        };

        symbol.ok_or_else(|| {
            CdkError::Graph(GraphError::Uncontained {
                node: node.id.clone(),
            })
        })
    }

    pub fn is_public(&self, node: &Node) -> bool {
        self.graph.is_public(&node.id)
    }
}

/// Render the declaration of a node.
pub fn emit(node: &Node, ctx: &EmitContext<'_>) -> CdkResult<EmittedFragment> {
    match node.kind {
        NodeKind::Vpc => vpc::emit(node, ctx),
        NodeKind::Instance => instance::emit(node, ctx),
        NodeKind::Database => database::emit(node, ctx),
        NodeKind::Bucket => bucket::emit(node, ctx),
    }
}

/// Typed access to a node's free-form properties.
pub(crate) struct Properties<'a> {
    node: &'a Node,
}

impl<'a> Properties<'a> {
    pub fn of(node: &'a Node) -> Self {
        Self { node }
    }

    /// A non-empty string property.
    pub fn string(&self, key: &str) -> CdkResult<Option<&'a str>> {
        match self.node.property(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(CdkError::unsupported(
                &self.node.id,
                format!("property '{}' must be a string, got {}", key, other),
            )),
        }
    }

    /// A positive integer property.
    pub fn positive(&self, key: &str) -> CdkResult<Option<u32>> {
        match self.node.property(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_u64()
                .filter(|&n| n > 0)
                .and_then(|n| u32::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| {
                    CdkError::unsupported(
                        &self.node.id,
                        format!("property '{}' must be a positive integer, got {}", key, value),
                    )
                }),
        }
    }

    /// Log properties this emitter ignores.
    pub fn warn_unknown(&self, known: &[&str]) {
        for key in self.node.properties.keys() {
            if !known.contains(&key.as_str()) {
                warn!(
                    "Ignoring unknown property '{}' on {} node {}",
                    key, self.node.kind, self.node.id
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_property() {
        let node = Node::instance("i", "web")
            .with_property("ami_id", "ami-1")
            .with_property("user_data", "")
            .with_property("app_path", 3);
        let props = Properties::of(&node);

        assert_eq!(props.string("ami_id").unwrap(), Some("ami-1"));
        assert_eq!(props.string("user_data").unwrap(), None);
        assert_eq!(props.string("missing").unwrap(), None);
        assert!(matches!(
            props.string("app_path"),
            Err(CdkError::UnsupportedConfiguration { .. })
        ));
    }

    #[test]
    fn test_positive_property() {
        let node = Node::database("d", "db", "mysql")
            .with_property("allocated_storage", 20)
            .with_property("bad", -1);
        let props = Properties::of(&node);

        assert_eq!(props.positive("allocated_storage").unwrap(), Some(20));
        assert!(props.positive("bad").is_err());
    }
}

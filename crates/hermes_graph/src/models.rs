//! Data models for diagram graphs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reserved endpoint id standing for any external source (0.0.0.0/0).
///
/// Edges may reference it without a matching node.
pub const INTERNET: &str = "Internet";

/// Free-form node properties as authored in the diagram editor.
pub type Properties = BTreeMap<String, Value>;

/// Well-known property keys.
pub mod property {
    pub const AMI_ID: &str = "ami_id";
    pub const AVAILABILITY_ZONE: &str = "availability_zone";
    pub const INSTANCE_TYPE: &str = "instance_type";
    pub const USER_DATA: &str = "user_data";
    pub const APP_PATH: &str = "app_path";
    pub const ENGINE: &str = "engine";
    pub const ALLOCATED_STORAGE: &str = "allocated_storage";
    pub const INDEX_DOCUMENT: &str = "index_document";
    pub const ERROR_DOCUMENT: &str = "error_document";
}

/// Kind of resource a node represents.
///
/// Security groups and roles are never drawn; they are derived from the
/// compute nodes that own them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Vpc,
    Instance,
    Database,
    Bucket,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Vpc => "vpc",
            NodeKind::Instance => "instance",
            NodeKind::Database => "database",
            NodeKind::Bucket => "bucket",
        }
    }

    /// Name used when a node's display name sanitizes to nothing.
    pub fn default_label(&self) -> &'static str {
        match self {
            NodeKind::Vpc => "Vpc",
            NodeKind::Instance => "Instance",
            NodeKind::Database => "Database",
            NodeKind::Bucket => "Bucket",
        }
    }

    /// Whether nodes of this kind own a generated security group.
    pub fn has_security_group(&self) -> bool {
        matches!(self, NodeKind::Instance | NodeKind::Database)
    }

    /// Whether nodes of this kind must live inside a network.
    pub fn needs_network(&self) -> bool {
        self.has_security_group()
    }

    /// Whether a node of this kind may contain a node of kind `child`.
    pub fn can_contain(&self, child: NodeKind) -> bool {
        matches!(self, NodeKind::Vpc) && child.needs_network()
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A diagram node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    /// Display name shown in the editor; resource names derive from it.
    #[serde(alias = "display_name")]
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: Properties,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            properties: Properties::new(),
        }
    }

    pub fn vpc(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Vpc, name)
    }

    pub fn instance(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Instance, name)
    }

    pub fn database(id: impl Into<String>, name: impl Into<String>, engine: impl Into<String>) -> Self {
        let engine: String = engine.into();
        Self::new(id, NodeKind::Database, name).with_property("engine", engine)
    }

    pub fn bucket(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Bucket, name)
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

/// Relationship carried by an edge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EdgeKind {
    /// `from` (a network) contains `to`.
    Contains,
    /// Traffic from `from` may reach `to` on each listed port.
    ///
    /// With no ports the port is resolved from `service`.
    NetworkAccess {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        ports: Vec<u16>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        service: Option<String>,
    },
}

/// A directed diagram edge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Edge {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(flatten)]
    pub kind: EdgeKind,
}

impl Edge {
    pub fn contains(id: impl Into<String>, parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            from: parent.into(),
            to: child.into(),
            kind: EdgeKind::Contains,
        }
    }

    pub fn network(
        id: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        ports: Vec<u16>,
    ) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            kind: EdgeKind::NetworkAccess {
                ports,
                service: None,
            },
        }
    }

    /// Network edge with no explicit port, resolved from a service name.
    pub fn service(
        id: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            kind: EdgeKind::NetworkAccess {
                ports: Vec::new(),
                service: Some(service.into()),
            },
        }
    }

    pub fn is_contains(&self) -> bool {
        matches!(self.kind, EdgeKind::Contains)
    }

    pub fn is_network(&self) -> bool {
        matches!(self.kind, EdgeKind::NetworkAccess { .. })
    }

    pub fn touches(&self, id: &str) -> bool {
        self.from == id || self.to == id
    }

    /// The endpoint opposite to `id`, if `id` is an endpoint.
    pub fn other_end(&self, id: &str) -> Option<&str> {
        if self.from == id {
            Some(&self.to)
        } else if self.to == id {
            Some(&self.from)
        } else {
            None
        }
    }
}

/// A finalized diagram: nodes in insertion order plus edges.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Graph {
    #[serde(default)]
    pub id: String,
    /// Diagram name, used as the stack id.
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_edge(mut self, edge: Edge) -> Self {
        self.edges.push(edge);
        self
    }

    /// Add `child` to the graph inside the network `parent`.
    pub fn with_child(mut self, parent: &str, child: Node) -> Self {
        let edge_id = format!("{}/{}", parent, child.id);
        self.edges.push(Edge::contains(edge_id, parent, child.id.clone()));
        self.nodes.push(child);
        self
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    pub fn contains_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|e| e.is_contains())
    }

    pub fn network_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|e| e.is_network())
    }

    /// The network containing `id`, if any.
    pub fn parent_of(&self, id: &str) -> Option<&Node> {
        self.contains_edges()
            .find(|e| e.to == id)
            .and_then(|e| self.node(&e.from))
    }

    pub fn children_of(&self, id: &str) -> Vec<&Node> {
        self.contains_edges()
            .filter(|e| e.from == id)
            .filter_map(|e| self.node(&e.to))
            .collect()
    }

    /// Whether `endpoint` acts as an unrestricted source for `node`.
    ///
    /// That is the internet marker, or the network that contains `node`.
    pub fn is_any_source_for(&self, endpoint: &str, node: &str) -> bool {
        endpoint == INTERNET || self.parent_of(node).map_or(false, |p| p.id == endpoint)
    }

    /// Whether `id` is reachable from outside its network.
    pub fn is_public(&self, id: &str) -> bool {
        self.network_edges().any(|e| {
            e.other_end(id)
                .map_or(false, |other| self.is_any_source_for(other, id))
        })
    }
}

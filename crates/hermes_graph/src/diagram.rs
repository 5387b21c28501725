//! The diagram editor's persisted document format.
//!
//! The editor saves blocks with nested VPC children and connections carrying
//! port lists. [`DiagramDocument::into_graph`] lowers that shape into the flat
//! [`Graph`] IR: children become `Contains` edges and connections become
//! `NetworkAccess` edges.

use serde::{Deserialize, Serialize};

use crate::models::{property, Edge, Graph, Node};

const DEFAULT_AVAILABILITY_ZONE: &str = "us-east-1";
const DEFAULT_INDEX_DOCUMENT: &str = "index.html";
const DEFAULT_ERROR_DOCUMENT: &str = "error.html";

/// Editor document: top-level blocks plus connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramDocument {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

/// A block drawn on the canvas.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Block {
    #[serde(rename = "VPC")]
    Vpc(VpcBlock),
    WebServer(WebServerBlock),
    Database(DatabaseBlock),
    StorageContainer(StorageContainerBlock),
    StaticWebsite(StaticWebsiteBlock),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VpcBlock {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub children: Vec<Block>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebServerBlock {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub ami_id: String,
    #[serde(default)]
    pub availability_zone: String,
    #[serde(default)]
    pub user_data_script: Option<String>,
    #[serde(default)]
    pub app_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseBlock {
    pub id: String,
    pub name: String,
    pub engine: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageContainerBlock {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticWebsiteBlock {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub index_file: String,
    #[serde(default)]
    pub error_file: String,
    #[serde(default)]
    pub app_path: Option<String>,
}

/// A connection dragged between two blocks (or a block and the internet).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    pub source_id: String,
    pub destination_id: String,
    #[serde(default)]
    pub ports: Vec<u16>,
}

impl Block {
    pub fn id(&self) -> &str {
        match self {
            Block::Vpc(b) => &b.id,
            Block::WebServer(b) => &b.id,
            Block::Database(b) => &b.id,
            Block::StorageContainer(b) => &b.id,
            Block::StaticWebsite(b) => &b.id,
        }
    }

    fn to_node(&self) -> Node {
        match self {
            Block::Vpc(b) => Node::vpc(&b.id, &b.name),
            Block::WebServer(b) => {
                let zone = non_empty(&b.availability_zone).unwrap_or(DEFAULT_AVAILABILITY_ZONE);
                let mut node = Node::instance(&b.id, &b.name)
                    .with_property(property::AMI_ID, b.ami_id.clone())
                    .with_property(property::AVAILABILITY_ZONE, zone);
                if let Some(script) = b.user_data_script.as_deref().and_then(non_empty) {
                    node = node.with_property(property::USER_DATA, script);
                }
                if let Some(path) = b.app_path.as_deref().and_then(non_empty) {
                    node = node.with_property(property::APP_PATH, path);
                }
                node
            }
            Block::Database(b) => Node::database(&b.id, &b.name, &b.engine),
            Block::StorageContainer(b) => Node::bucket(&b.id, &b.name),
            Block::StaticWebsite(b) => {
                let index = non_empty(&b.index_file).unwrap_or(DEFAULT_INDEX_DOCUMENT);
                let error = non_empty(&b.error_file).unwrap_or(DEFAULT_ERROR_DOCUMENT);
                let mut node = Node::bucket(&b.id, &b.name)
                    .with_property(property::INDEX_DOCUMENT, index)
                    .with_property(property::ERROR_DOCUMENT, error);
                if let Some(path) = b.app_path.as_deref().and_then(non_empty) {
                    node = node.with_property(property::APP_PATH, path);
                }
                node
            }
        }
    }
}

impl DiagramDocument {
    /// Lower the editor document into the graph IR.
    pub fn into_graph(self) -> Graph {
        let mut graph = Graph::new(self.id, self.name);

        for block in &self.blocks {
            graph.nodes.push(block.to_node());
            if let Block::Vpc(vpc) = block {
                for child in &vpc.children {
                    graph = graph.with_child(&vpc.id, child.to_node());
                }
            }
        }

        for connection in self.connections {
            graph.edges.push(Edge::network(
                connection.id,
                connection.source_id,
                connection.destination_id,
                connection.ports,
            ));
        }

        graph
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

//! # hermes_graph
//!
//! Diagram graph model for Hermes: the typed node/edge representation of an
//! infrastructure diagram, its readers, and structural validation.
//!
//! ## Features
//!
//! - **Graph IR**: networks, instances, databases and buckets joined by
//!   containment and network-access edges
//! - **Readers**: flat JSON/YAML graphs and the editor's document format
//! - **Validation**: dangling edges, containment cycles, unsecurable or
//!   cross-network connections, invalid ports and stack names
//!
//! ## Example
//!
//! ```rust
//! use hermes_graph::{Edge, Graph, GraphValidator, Node, INTERNET};
//!
//! let graph = Graph::new("id", "Diagram")
//!     .with_node(Node::vpc("net", "VPC"))
//!     .with_child("net", Node::instance("web", "web_server"))
//!     .with_edge(Edge::network("http", INTERNET, "web", vec![80]));
//!
//! GraphValidator::validate(&graph).unwrap();
//! ```

pub mod diagram;
pub mod error;
pub mod models;
pub mod reader;
pub mod validator;

pub use diagram::DiagramDocument;
pub use error::{GraphError, GraphResult};
pub use models::*;
pub use reader::GraphReader;
pub use validator::{GraphValidator, ValidationReport};

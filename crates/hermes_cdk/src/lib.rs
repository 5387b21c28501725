//! # hermes_cdk
//!
//! Compiles Hermes diagram graphs into AWS CDK (Python) stack programs.
//!
//! Generation is a pure, synchronous pipeline: validate the graph, order its
//! nodes, allocate identifiers, emit one fragment per node, resolve network
//! edges into security group rules, and assemble the fragments into a single
//! stack document.
//!
//! ## Features
//!
//! - Per-kind emitters for networks, instances, databases and buckets
//! - Security groups and roles derived from their owning node
//! - Configurable default ports for service-labelled connections
//! - Deterministic identifiers, stable across re-generation
//!
//! ## Example
//!
//! ```rust
//! use hermes_cdk::{GeneratorConfig, StackGenerator};
//! use hermes_graph::{Edge, Graph, Node};
//!
//! let graph = Graph::new("id", "Diagram")
//!     .with_node(Node::vpc("net", "VPC"))
//!     .with_child("net", Node::instance("a", "frontend"))
//!     .with_child("net", Node::instance("b", "backend"))
//!     .with_edge(Edge::network("api", "a", "b", vec![8080]));
//!
//! let stack = StackGenerator::new(GeneratorConfig::default())
//!     .generate(&graph)
//!     .unwrap();
//!
//! println!("{}", stack.source());
//! println!("{}", stack.report().unwrap());
//! ```

pub mod assembler;
pub mod config;
pub mod emitters;
pub mod error;
pub mod fragment;
pub mod generator;
pub mod naming;
pub mod orderer;
pub mod resolver;

pub use assembler::{StackAssembler, StackDefinition};
pub use config::{GeneratorConfig, NamingScheme, Service, ServiceCatalog};
pub use emitters::{DatabaseEngine, EmitContext};
pub use error::{CdkError, CdkResult};
pub use fragment::{EmittedFragment, FragmentOrigin, Import, StackOutput};
pub use generator::{StackGenerator, DEFAULT_NETWORK_NAME};
pub use naming::{IdentifierAllocator, SatelliteKind, Symbol, SymbolTable};
pub use orderer::DependencyOrderer;
pub use resolver::RelationshipResolver;

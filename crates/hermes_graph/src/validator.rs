//! Structural validation of diagram graphs.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::models::{Edge, EdgeKind, Graph, NodeKind, INTERNET};

/// Validation outcome listing every problem found.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<GraphError>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: GraphError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Convert into a result carrying the first error found.
    pub fn into_result(self) -> GraphResult<()> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// How a network edge endpoint takes part in a security rule.
enum Endpoint<'a> {
    /// The internet marker.
    Internet,
    /// A network node; only meaningful for its own members.
    Network(&'a str),
    /// A node owning a security group, with its containing network.
    Compute(Option<&'a str>),
}

/// Validator for diagram graphs.
pub struct GraphValidator;

impl GraphValidator {
    /// Validate a graph, failing with the first structural error.
    pub fn validate(graph: &Graph) -> GraphResult<()> {
        Self::check(graph).into_result()
    }

    /// Run every check and collect all errors and warnings.
    pub fn check(graph: &Graph) -> ValidationReport {
        let mut report = ValidationReport::new();
        Self::check_stack_name(&graph.name, &mut report);
        Self::check_structure(graph, &mut report);
        report
    }

    /// Run every check except the stack name, for callers that deploy the
    /// graph under a name of their own.
    pub fn check_structure(graph: &Graph, report: &mut ValidationReport) {
        Self::check_ids(graph, report);
        Self::check_endpoints(graph, report);
        Self::check_containment(graph, report);
        for edge in graph.network_edges() {
            if let Err(e) = Self::check_connection(graph, edge) {
                report.add_error(e);
            }
        }

        for node in &graph.nodes {
            if node.name.trim().is_empty() {
                report.add_warning(format!(
                    "Node {} has an empty name; a default name will be generated",
                    node.id
                ));
            }
            if node.kind == NodeKind::Vpc && graph.children_of(&node.id).is_empty() {
                report.add_warning(format!("Network {} contains no resources", node.id));
            }
        }

        debug!(
            "Validated graph '{}': {} error(s), {} warning(s)",
            graph.name,
            report.errors.len(),
            report.warnings.len()
        );
    }

    /// Check that a name can be used as the stack id.
    pub fn check_stack_name(name: &str, report: &mut ValidationReport) {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            report.add_error(GraphError::InvalidStackName {
                name: name.to_string(),
            });
        }
    }

    fn check_ids(graph: &Graph, report: &mut ValidationReport) {
        let mut seen = HashSet::new();
        for node in &graph.nodes {
            if node.id.is_empty() {
                report.add_error(GraphError::EmptyId);
            } else if node.id == INTERNET || !seen.insert(node.id.as_str()) {
                report.add_error(GraphError::DuplicateNode(node.id.clone()));
            }
        }

        let mut seen = HashSet::new();
        for edge in &graph.edges {
            if edge.id.is_empty() {
                report.add_error(GraphError::EmptyId);
            } else if !seen.insert(edge.id.as_str()) {
                report.add_error(GraphError::DuplicateEdge(edge.id.clone()));
            }
        }
    }

    fn check_endpoints(graph: &Graph, report: &mut ValidationReport) {
        let ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();

        for edge in &graph.edges {
            for endpoint in [&edge.from, &edge.to] {
                let marker = edge.is_network() && endpoint == INTERNET;
                if !marker && !ids.contains(endpoint.as_str()) {
                    report.add_error(GraphError::DanglingEdge {
                        edge: edge.id.clone(),
                        endpoint: endpoint.clone(),
                    });
                }
            }
        }
    }

    fn check_containment(graph: &Graph, report: &mut ValidationReport) {
        if let Some(node) = Self::find_contains_cycle(graph) {
            report.add_error(GraphError::ContainsCycle { node });
            return;
        }

        let mut parents: HashMap<&str, usize> = HashMap::new();
        for edge in graph.contains_edges() {
            let (Some(parent), Some(child)) = (graph.node(&edge.from), graph.node(&edge.to)) else {
                continue;
            };

            if !parent.kind.can_contain(child.kind) {
                report.add_error(GraphError::InvalidContainment {
                    edge: edge.id.clone(),
                    parent: parent.kind.to_string(),
                    child: child.kind.to_string(),
                });
            }

            let count = parents.entry(child.id.as_str()).or_insert(0);
            *count += 1;
            if *count == 2 {
                report.add_error(GraphError::MultipleParents {
                    node: child.id.clone(),
                });
            }
        }
    }

    /// Depth-first search over containment, returning a node on a cycle.
    fn find_contains_cycle(graph: &Graph) -> Option<String> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
        for edge in graph.contains_edges() {
            adjacency.entry(edge.from.as_str()).or_default().push(edge.to.as_str());
        }

        let mut marks: HashMap<&str, Mark> = HashMap::new();
        for node in &graph.nodes {
            if marks.get(node.id.as_str()).copied().unwrap_or(Mark::Unvisited) != Mark::Unvisited {
                continue;
            }

            // Iterative DFS: (node, index of the next child to visit)
            let mut stack: Vec<(&str, usize)> = vec![(node.id.as_str(), 0)];
            marks.insert(node.id.as_str(), Mark::InProgress);

            while let Some((current, next)) = stack.pop() {
                let children = adjacency.get(current).map(Vec::as_slice).unwrap_or(&[]);
                if let Some(&child) = children.get(next) {
                    stack.push((current, next + 1));
                    match marks.get(child).copied().unwrap_or(Mark::Unvisited) {
                        Mark::InProgress => return Some(child.to_string()),
                        Mark::Unvisited => {
                            marks.insert(child, Mark::InProgress);
                            stack.push((child, 0));
                        }
                        Mark::Done => {}
                    }
                } else {
                    marks.insert(current, Mark::Done);
                }
            }
        }

        None
    }

    fn check_connection(graph: &Graph, edge: &Edge) -> GraphResult<()> {
        if edge.from == edge.to {
            return Err(GraphError::SelfConnection {
                edge: edge.id.clone(),
            });
        }

        if let EdgeKind::NetworkAccess { ports, .. } = &edge.kind {
            if let Some(&port) = ports.iter().find(|&&p| p == 0) {
                return Err(GraphError::InvalidPort {
                    edge: edge.id.clone(),
                    port,
                });
            }
        }

        let from = Self::classify(graph, edge, &edge.from)?;
        let to = Self::classify(graph, edge, &edge.to)?;
        let cross = || GraphError::CrossNetwork {
            edge: edge.id.clone(),
        };

        match (from, to) {
            (Endpoint::Compute(a), Endpoint::Compute(b)) if a != b => Err(cross()),
            (Endpoint::Compute(_), Endpoint::Compute(_)) => Ok(()),
            (Endpoint::Internet, Endpoint::Compute(_)) | (Endpoint::Compute(_), Endpoint::Internet) => Ok(()),
            (Endpoint::Network(net), Endpoint::Compute(parent))
            | (Endpoint::Compute(parent), Endpoint::Network(net)) => {
                if parent == Some(net) {
                    Ok(())
                } else {
                    Err(cross())
                }
            }
            _ => Err(cross()),
        }
    }

    fn classify<'a>(graph: &'a Graph, edge: &Edge, endpoint: &'a str) -> GraphResult<Endpoint<'a>> {
        if endpoint == INTERNET {
            return Ok(Endpoint::Internet);
        }

        let node = graph.node(endpoint).ok_or_else(|| GraphError::DanglingEdge {
            edge: edge.id.clone(),
            endpoint: endpoint.to_string(),
        })?;

        match node.kind {
            NodeKind::Vpc => Ok(Endpoint::Network(node.id.as_str())),
            NodeKind::Instance | NodeKind::Database => {
                Ok(Endpoint::Compute(graph.parent_of(&node.id).map(|p| p.id.as_str())))
            }
            NodeKind::Bucket => Err(GraphError::NotSecurable {
                edge: edge.id.clone(),
                node: node.id.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Node;

    fn network() -> Graph {
        Graph::new("g", "mydiagram")
            .with_node(Node::vpc("vpc", "vpc"))
            .with_child("vpc", Node::instance("web", "webserver"))
    }

    #[test]
    fn test_valid_graph() {
        let graph = network()
            .with_child("vpc", Node::database("db", "Database", "postgres"))
            .with_node(Node::bucket("files", "storage"))
            .with_edge(Edge::network("e1", "vpc", "web", vec![80]))
            .with_edge(Edge::network("e2", "web", "db", vec![5432]))
            .with_edge(Edge::network("e3", INTERNET, "web", vec![443]));

        assert!(GraphValidator::validate(&graph).is_ok());
    }

    #[test]
    fn test_invalid_stack_name() {
        let graph = Graph::new("g", "my diagram");
        let err = GraphValidator::validate(&graph).unwrap_err();
        assert!(matches!(err, GraphError::InvalidStackName { .. }));
    }

    #[test]
    fn test_structure_check_ignores_graph_name() {
        let graph = Graph::new("g", "my diagram").with_node(Node::vpc("vpc", "VPC"));
        let mut report = ValidationReport::new();
        GraphValidator::check_structure(&graph, &mut report);
        assert!(report.is_valid());
    }

    #[test]
    fn test_dangling_edge() {
        let graph = network().with_edge(Edge::network("e", "web", "ghost", vec![80]));
        let err = GraphValidator::validate(&graph).unwrap_err();
        assert!(matches!(
            err,
            GraphError::DanglingEdge { ref edge, ref endpoint } if edge == "e" && endpoint == "ghost"
        ));
    }

    #[test]
    fn test_internet_only_allowed_on_network_edges() {
        let graph = network().with_edge(Edge::contains("c", INTERNET, "web"));
        let err = GraphValidator::validate(&graph).unwrap_err();
        assert!(matches!(err, GraphError::DanglingEdge { .. }));
    }

    #[test]
    fn test_contains_cycle() {
        let graph = Graph::new("g", "d")
            .with_node(Node::vpc("a", "a"))
            .with_node(Node::vpc("b", "b"))
            .with_edge(Edge::contains("ab", "a", "b"))
            .with_edge(Edge::contains("ba", "b", "a"));

        let err = GraphValidator::validate(&graph).unwrap_err();
        assert!(matches!(err, GraphError::ContainsCycle { .. }));
    }

    #[test]
    fn test_vpc_cannot_contain_itself() {
        let graph = Graph::new("g", "d")
            .with_node(Node::vpc("a", "a"))
            .with_edge(Edge::contains("aa", "a", "a"));

        let err = GraphValidator::validate(&graph).unwrap_err();
        assert!(matches!(err, GraphError::ContainsCycle { ref node } if node == "a"));
    }

    #[test]
    fn test_bucket_inside_vpc() {
        let graph = Graph::new("g", "d")
            .with_node(Node::vpc("vpc", "vpc"))
            .with_child("vpc", Node::bucket("b", "block"));

        let err = GraphValidator::validate(&graph).unwrap_err();
        assert!(matches!(err, GraphError::InvalidContainment { .. }));
    }

    #[test]
    fn test_self_connection() {
        let graph = network().with_edge(Edge::network("e", "web", "web", vec![80]));
        let err = GraphValidator::validate(&graph).unwrap_err();
        assert!(matches!(err, GraphError::SelfConnection { .. }));
    }

    #[test]
    fn test_port_zero_rejected() {
        let graph = network().with_edge(Edge::network("e", "vpc", "web", vec![0]));
        let err = GraphValidator::validate(&graph).unwrap_err();
        assert!(matches!(err, GraphError::InvalidPort { port: 0, .. }));
    }

    #[test]
    fn test_bucket_not_securable() {
        let graph = network()
            .with_node(Node::bucket("files", "files"))
            .with_edge(Edge::network("e", "web", "files", vec![443]));

        let err = GraphValidator::validate(&graph).unwrap_err();
        assert!(matches!(err, GraphError::NotSecurable { ref node, .. } if node == "files"));
    }

    #[test]
    fn test_cross_network_connection() {
        let graph = network()
            .with_node(Node::vpc("vpc2", "vpc"))
            .with_child("vpc2", Node::instance("web2", "webserver2"))
            .with_edge(Edge::network("e", "web", "web2", vec![80]));

        let err = GraphValidator::validate(&graph).unwrap_err();
        assert!(matches!(err, GraphError::CrossNetwork { .. }));

        let graph = network()
            .with_node(Node::vpc("vpc2", "vpc"))
            .with_edge(Edge::network("e", "web", "vpc2", vec![80]));
        assert!(matches!(
            GraphValidator::validate(&graph).unwrap_err(),
            GraphError::CrossNetwork { .. }
        ));
    }

    #[test]
    fn test_check_collects_every_error() {
        let graph = Graph::new("g", "bad name")
            .with_node(Node::instance("a", "a"))
            .with_node(Node::instance("a", "b"))
            .with_edge(Edge::network("e", "a", "missing", vec![80]));

        let report = GraphValidator::check(&graph);
        assert!(!report.is_valid());
        assert!(report.errors.len() >= 3);
    }

    #[test]
    fn test_warnings_for_empty_names_and_networks() {
        let graph = Graph::new("g", "d").with_node(Node::vpc("v", ""));
        let report = GraphValidator::check(&graph);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 2);
    }
}

//! Emission order.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use tracing::debug;

use hermes_graph::{Graph, GraphError, Node};

use crate::error::{CdkError, CdkResult};

/// Orders nodes so that every network precedes the nodes it contains.
pub struct DependencyOrderer;

impl DependencyOrderer {
    /// Topologically sort `graph`'s nodes, breaking ties by input order.
    pub fn order(graph: &Graph) -> CdkResult<Vec<&Node>> {
        let index: HashMap<&str, usize> = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.as_str(), i))
            .collect();

        let mut in_degree = vec![0usize; graph.nodes.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); graph.nodes.len()];

        for edge in graph.contains_edges() {
            let parent = Self::position(&index, &edge.id, &edge.from)?;
            let child = Self::position(&index, &edge.id, &edge.to)?;
            dependents[parent].push(child);
            in_degree[child] += 1;
        }

        // Min-heap on insertion index keeps independent nodes in input order
        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &degree)| degree == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut order = Vec::with_capacity(graph.nodes.len());
        while let Some(Reverse(current)) = ready.pop() {
            order.push(&graph.nodes[current]);
            for &dependent in &dependents[current] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.push(Reverse(dependent));
                }
            }
        }

        if order.len() < graph.nodes.len() {
            let stuck = in_degree
                .iter()
                .position(|&degree| degree > 0)
                .map(|i| graph.nodes[i].id.clone())
                .unwrap_or_default();
            return Err(CdkError::DependencyCycle { node: stuck });
        }

        debug!(
            "Emission order: {}",
            order.iter().map(|n| n.id.as_str()).collect::<Vec<_>>().join(", ")
        );
        Ok(order)
    }

    fn position(index: &HashMap<&str, usize>, edge: &str, endpoint: &str) -> CdkResult<usize> {
        index.get(endpoint).copied().ok_or_else(|| {
            GraphError::DanglingEdge {
                edge: edge.to_string(),
                endpoint: endpoint.to_string(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_graph::Edge;

    fn ids(order: Vec<&Node>) -> Vec<&str> {
        order.into_iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_parents_move_before_children() {
        let graph = Graph::new("g", "d")
            .with_node(Node::instance("web", "web"))
            .with_node(Node::bucket("files", "files"))
            .with_node(Node::vpc("net", "net"))
            .with_edge(Edge::contains("c", "net", "web"));

        let order = DependencyOrderer::order(&graph).unwrap();
        assert_eq!(ids(order), vec!["files", "net", "web"]);
    }

    #[test]
    fn test_independent_nodes_keep_input_order() {
        let graph = Graph::new("g", "d")
            .with_node(Node::vpc("b", "b"))
            .with_node(Node::vpc("a", "a"))
            .with_node(Node::bucket("c", "c"));

        let order = DependencyOrderer::order(&graph).unwrap();
        assert_eq!(ids(order), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_cycle_is_reported() {
        let graph = Graph::new("g", "d")
            .with_node(Node::bucket("free", "free"))
            .with_node(Node::vpc("x", "x"))
            .with_node(Node::vpc("y", "y"))
            .with_edge(Edge::contains("c1", "x", "y"))
            .with_edge(Edge::contains("c2", "y", "x"));

        match DependencyOrderer::order(&graph) {
            Err(CdkError::DependencyCycle { node }) => assert_eq!(node, "x"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_dangling_contains_edge() {
        let graph = Graph::new("g", "d")
            .with_node(Node::vpc("net", "net"))
            .with_edge(Edge::contains("c", "net", "ghost"));

        assert!(matches!(
            DependencyOrderer::order(&graph),
            Err(CdkError::Graph(GraphError::DanglingEdge { .. }))
        ));
    }
}

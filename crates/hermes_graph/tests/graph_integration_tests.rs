//! Integration tests for reading and validating diagram graphs.

use std::fs;
use tempfile::tempdir;

use hermes_graph::{
    Edge, EdgeKind, Graph, GraphError, GraphReader, GraphValidator, Node, NodeKind, INTERNET,
};

const FLAT_YAML: &str = r#"
id: g1
name: shop
nodes:
  - id: net
    kind: vpc
    name: Shop VPC
  - id: web
    kind: instance
    display_name: web
    properties:
      ami_id: ami-0abc
      user_data: "echo hi"
  - id: db
    kind: database
    name: orders
    properties:
      engine: postgres
edges:
  - { id: c1, from: net, to: web, kind: contains }
  - { id: c2, from: net, to: db, kind: contains }
  - { id: e1, from: Internet, to: web, kind: network_access, ports: [80, 443] }
  - { id: e2, from: web, to: db, kind: network_access, service: database }
"#;

/// Read a flat YAML graph from disk and validate it.
#[test]
fn test_flat_yaml_file_workflow() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("shop.yaml");
    fs::write(&path, FLAT_YAML).unwrap();

    let graph = GraphReader::read_file(&path).unwrap();
    assert_eq!(graph.name, "shop");
    assert_eq!(graph.nodes.len(), 3);
    assert_eq!(graph.node("db").unwrap().kind, NodeKind::Database);
    assert_eq!(graph.parent_of("db").unwrap().id, "net");

    let report = GraphValidator::check(&graph);
    assert!(report.is_valid(), "unexpected errors: {:?}", report.errors);
    assert!(graph.is_public("web"));
    assert!(!graph.is_public("db"));
}

/// The editor's nested document lowers to the same IR as a flat graph.
#[test]
fn test_editor_document_workflow() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("diagram.json");
    fs::write(
        &path,
        r#"{
            "id": "42",
            "name": "my_diagram",
            "blocks": [
                {"type": "VPC", "id": "v", "name": "VPC", "children": [
                    {"type": "WebServer", "id": "w", "name": "my_web_server", "amiId": "ami-1", "availabilityZone": "eu-west-1a"}
                ]},
                {"type": "StorageContainer", "id": "s", "name": "files"}
            ],
            "connections": [
                {"id": "c", "source_id": "Internet", "destination_id": "w", "ports": [22]}
            ]
        }"#,
    )
    .unwrap();

    let graph = GraphReader::read_file(&path).unwrap();
    GraphValidator::validate(&graph).unwrap();

    assert_eq!(graph.id, "42");
    assert_eq!(graph.contains_edges().count(), 1);
    let web = graph.node("w").unwrap();
    assert_eq!(web.property("availability_zone").unwrap(), "eu-west-1a");

    let access = graph.network_edges().next().unwrap();
    assert_eq!(access.from, INTERNET);
    assert_eq!(
        access.kind,
        EdgeKind::NetworkAccess {
            ports: vec![22],
            service: None
        }
    );
}

#[test]
fn test_unsupported_extension() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("diagram.xml");
    fs::write(&path, "<diagram/>").unwrap();

    assert!(!GraphReader::is_graph_file(&path));
    assert!(matches!(
        GraphReader::read_file(&path),
        Err(GraphError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_malformed_json_is_reported() {
    assert!(matches!(
        GraphReader::from_json_str("{\"name\": "),
        Err(GraphError::Json(_))
    ));
}

/// Every structural problem is collected, not just the first.
#[test]
fn test_report_collects_all_errors() {
    let graph = Graph::new("g", "bad name")
        .with_node(Node::vpc("net", "net"))
        .with_node(Node::vpc("net", "again"))
        .with_child("net", Node::instance("web", "web"))
        .with_node(Node::bucket("files", "files"))
        .with_edge(Edge::network("e1", "web", "files", vec![443]))
        .with_edge(Edge::network("e2", "web", "ghost", vec![80]))
        .with_edge(Edge::network("e3", "web", "web", vec![80]));

    let report = GraphValidator::check(&graph);
    assert!(!report.is_valid());

    let has = |f: fn(&GraphError) -> bool| report.errors.iter().any(f);
    assert!(has(|e| matches!(e, GraphError::InvalidStackName { .. })));
    assert!(has(|e| matches!(e, GraphError::DuplicateNode(id) if id == "net")));
    assert!(has(|e| matches!(e, GraphError::NotSecurable { node, .. } if node == "files")));
    assert!(has(|e| matches!(e, GraphError::DanglingEdge { endpoint, .. } if endpoint == "ghost")));
    assert!(has(|e| matches!(e, GraphError::SelfConnection { edge } if edge == "e3")));
}

#[test]
fn test_containment_rules() {
    let nested = Graph::new("g", "d")
        .with_node(Node::vpc("outer", "outer"))
        .with_child("outer", Node::vpc("inner", "inner"));
    assert!(matches!(
        GraphValidator::validate(&nested),
        Err(GraphError::InvalidContainment { .. })
    ));

    let cyclic = Graph::new("g", "d")
        .with_node(Node::vpc("a", "a"))
        .with_node(Node::vpc("b", "b"))
        .with_edge(Edge::contains("ab", "a", "b"))
        .with_edge(Edge::contains("ba", "b", "a"));
    assert!(matches!(
        GraphValidator::validate(&cyclic),
        Err(GraphError::ContainsCycle { .. })
    ));

    let shared = Graph::new("g", "d")
        .with_node(Node::vpc("a", "a"))
        .with_node(Node::vpc("b", "b"))
        .with_child("a", Node::instance("web", "web"))
        .with_edge(Edge::contains("b/web", "b", "web"));
    assert!(matches!(
        GraphValidator::validate(&shared),
        Err(GraphError::MultipleParents { node }) if node == "web"
    ));
}

#[test]
fn test_cross_network_edge_is_rejected() {
    let graph = Graph::new("g", "d")
        .with_node(Node::vpc("a", "a"))
        .with_node(Node::vpc("b", "b"))
        .with_child("a", Node::instance("x", "x"))
        .with_child("b", Node::instance("y", "y"))
        .with_edge(Edge::network("e", "x", "y", vec![80]));

    let error = GraphValidator::validate(&graph).unwrap_err();
    assert_eq!(error.element_id(), Some("e"));
}

#[test]
fn test_graph_json_round_trip_preserves_edges() {
    let graph = Graph::new("g", "d")
        .with_node(Node::vpc("net", "net"))
        .with_child("net", Node::database("db", "db", "mysql"))
        .with_edge(Edge::service("e", INTERNET, "db", "mysql"));

    let json = serde_json::to_string(&graph).unwrap();
    let back = GraphReader::from_json_str(&json).unwrap();
    assert_eq!(back, graph);
}

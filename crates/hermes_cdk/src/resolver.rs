//! Relationship resolution.
//!
//! Runs after every node is emitted and turns each network-access edge into
//! security group rules, plus credential grants for instances that talk to a
//! database. Rules are never merged: every edge and every port is its own
//! authorization.

use std::collections::HashSet;

use tracing::debug;

use hermes_graph::{Edge, EdgeKind, Graph, GraphError, Node, NodeKind};

use crate::config::ServiceCatalog;
use crate::emitters::DatabaseEngine;
use crate::error::{CdkError, CdkResult};
use crate::fragment::{escape_literal, EmittedFragment, FragmentOrigin, Import};
use crate::naming::{SatelliteKind, Symbol, SymbolTable};

/// Where the traffic of a rule comes from.
enum Source<'g> {
    /// Unrestricted (`0.0.0.0/0`).
    Anywhere,
    /// Members of another node's security group.
    Group(&'g Node),
}

/// A rule to place on `target`'s security group.
struct Rule<'g> {
    target: &'g Node,
    source: Source<'g>,
}

pub struct RelationshipResolver<'a> {
    services: &'a ServiceCatalog,
}

impl<'a> RelationshipResolver<'a> {
    pub fn new(services: &'a ServiceCatalog) -> Self {
        Self { services }
    }

    /// Emit one fragment per network-access edge, in edge order.
    pub fn resolve(&self, graph: &Graph, symbols: &SymbolTable) -> CdkResult<Vec<EmittedFragment>> {
        let mut granted: HashSet<(&str, &str)> = HashSet::new();
        let mut fragments = Vec::new();

        for edge in graph.network_edges() {
            let EdgeKind::NetworkAccess { ports, service } = &edge.kind else {
                continue;
            };

            let rule = Self::classify(graph, edge)?;
            let ports = self.ports(edge, rule.target, ports, service.as_deref())?;

            let mut fragment = EmittedFragment::new(FragmentOrigin::Edge(edge.id.clone()));
            fragment.import(Import::Ec2);

            let target_sg = lookup(symbols, edge, rule.target)?.satellite(SatelliteKind::SecurityGroup);
            fragment.reference(target_sg.variable.as_str());

            for port in &ports {
                let label = escape_literal(self.services.label_for(*port, service.as_deref()));
                let line = match &rule.source {
                    Source::Anywhere => format!(
                        "{}.add_ingress_rule(ec2.Peer.any_ipv4(), ec2.Port.tcp({}), '{}')",
                        target_sg.variable, port, label
                    ),
                    Source::Group(source) => {
                        let source_sg = lookup(symbols, edge, source)?.satellite(SatelliteKind::SecurityGroup);
                        fragment.reference(source_sg.variable.as_str());
                        format!(
                            "{}.connections.allow_from(ec2.Connections(security_groups=[{}]), ec2.Port.tcp({}), '{}')",
                            target_sg.variable, source_sg.variable, port, label
                        )
                    }
                };
                fragment.line(line);
            }

            if let Source::Group(source) = rule.source {
                let pair = (source.id.as_str(), rule.target.id.as_str());
                if source.kind == NodeKind::Instance
                    && rule.target.kind == NodeKind::Database
                    && granted.insert(pair)
                {
                    let database = lookup(symbols, edge, rule.target)?;
                    let role = lookup(symbols, edge, source)?.satellite(SatelliteKind::Role);
                    fragment
                        .reference(database.variable.as_str())
                        .reference(role.variable.as_str())
                        .line(format!(
                            "{}.secret.grant_read({})",
                            database.variable, role.variable
                        ));
                }
            }

            debug!("Resolved edge {} into {} line(s)", edge.id, fragment.lines.len());
            fragments.push(fragment);
        }

        Ok(fragments)
    }

    /// Decide which security group receives the rule and from where.
    fn classify<'g>(graph: &'g Graph, edge: &Edge) -> CdkResult<Rule<'g>> {
        let from = graph.node(&edge.from);
        let to = graph.node(&edge.to);
        let secured = |node: Option<&'g Node>| node.filter(|n| n.kind.has_security_group());

        match (secured(from), secured(to)) {
            (Some(source), Some(target)) => Ok(Rule {
                target,
                source: Source::Group(source),
            }),
            (None, Some(target)) if graph.is_any_source_for(&edge.from, &target.id) => Ok(Rule {
                target,
                source: Source::Anywhere,
            }),
            (Some(target), None) if graph.is_any_source_for(&edge.to, &target.id) => Ok(Rule {
                target,
                source: Source::Anywhere,
            }),
            _ => {
                let bucket = [from, to]
                    .into_iter()
                    .flatten()
                    .find(|n| n.kind == NodeKind::Bucket);
                let error = match bucket {
                    Some(node) => GraphError::NotSecurable {
                        edge: edge.id.clone(),
                        node: node.id.clone(),
                    },
                    None => GraphError::CrossNetwork {
                        edge: edge.id.clone(),
                    },
                };
                Err(error.into())
            }
        }
    }

    /// Explicit ports, or the default port of the edge's service.
    fn ports(&self, edge: &Edge, target: &Node, ports: &[u16], service: Option<&str>) -> CdkResult<Vec<u16>> {
        if !ports.is_empty() {
            return Ok(ports.to_vec());
        }

        let Some(service) = service else {
            return Err(CdkError::unresolvable(&edge.id, "no port and no service given"));
        };

        if service.eq_ignore_ascii_case("database") && target.kind == NodeKind::Database {
            if let Some(engine) = DatabaseEngine::of(target) {
                return Ok(vec![engine.default_port()]);
            }
        }

        self.services
            .port_for(service)
            .map(|port| vec![port])
            .ok_or_else(|| {
                CdkError::unresolvable(&edge.id, format!("service '{}' has no default port", service))
            })
    }
}

fn lookup<'t>(symbols: &'t SymbolTable, edge: &Edge, node: &Node) -> CdkResult<&'t Symbol> {
    symbols.get(&node.id).ok_or_else(|| {
        CdkError::unresolvable(&edge.id, format!("endpoint {} was never emitted", node.id))
    })
}

//! Identifier allocation.
//!
//! Each node gets two identifiers: a Python variable (`a1`, `a2`, ...) numbered
//! in emission order, and a construct id derived from its display name. Owned
//! resources (security groups, roles, assets) derive both from their owner.

use std::collections::{HashMap, HashSet};

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use hermes_graph::Node;

use crate::config::NamingScheme;

/// Identifiers allocated to one resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Symbol {
    /// Python variable holding the construct.
    pub variable: String,
    /// Construct id inside the stack.
    pub resource: String,
}

impl Symbol {
    pub fn new(variable: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            resource: resource.into(),
        }
    }

    /// Identifiers of a resource owned by this one.
    pub fn satellite(&self, kind: SatelliteKind) -> Symbol {
        Symbol {
            variable: format!("{}{}", self.variable, kind.variable_suffix()),
            resource: format!("{}{}", self.resource, kind.resource_suffix()),
        }
    }
}

/// Resources generated on behalf of a node rather than drawn in the diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SatelliteKind {
    SecurityGroup,
    Role,
    Asset,
    Deployment,
}

impl SatelliteKind {
    pub const ALL: [SatelliteKind; 4] = [
        SatelliteKind::SecurityGroup,
        SatelliteKind::Role,
        SatelliteKind::Asset,
        SatelliteKind::Deployment,
    ];

    pub fn variable_suffix(&self) -> &'static str {
        match self {
            SatelliteKind::SecurityGroup => "_sg",
            SatelliteKind::Role => "_role",
            SatelliteKind::Asset => "_asset",
            SatelliteKind::Deployment => "_deployment",
        }
    }

    pub fn resource_suffix(&self) -> &'static str {
        match self {
            SatelliteKind::SecurityGroup => "-SecurityGroup",
            SatelliteKind::Role => " Role",
            SatelliteKind::Asset => " Asset",
            SatelliteKind::Deployment => " Deployment",
        }
    }
}

/// Node id to symbol mapping, in allocation order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SymbolTable {
    entries: Vec<(String, Symbol)>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    /// Network generated for nodes drawn outside any VPC.
    default_network: Option<Symbol>,
}

impl SymbolTable {
    pub fn get(&self, node_id: &str) -> Option<&Symbol> {
        self.index.get(node_id).map(|&i| &self.entries[i].1)
    }

    pub fn default_network(&self) -> Option<&Symbol> {
        self.default_network.as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Symbol)> {
        self.entries.iter().map(|(id, symbol)| (id.as_str(), symbol))
    }

    fn insert(&mut self, node_id: &str, symbol: Symbol) {
        self.index.insert(node_id.to_string(), self.entries.len());
        self.entries.push((node_id.to_string(), symbol));
    }
}

/// Deterministic, collision-free identifier allocator.
///
/// One allocator serves one generation pass; running the same graph through a
/// fresh allocator yields the same identifiers.
pub struct IdentifierAllocator {
    scheme: NamingScheme,
    disallowed: Regex,
    next_variable: usize,
    counters: HashMap<String, u32>,
    taken: HashSet<String>,
    table: SymbolTable,
}

impl IdentifierAllocator {
    pub fn new(scheme: NamingScheme) -> Self {
        Self {
            scheme,
            disallowed: Regex::new(r"[^A-Za-z0-9_ \-]").expect("identifier pattern is valid"),
            next_variable: 0,
            counters: HashMap::new(),
            taken: HashSet::new(),
            table: SymbolTable::default(),
        }
    }

    /// Allocate identifiers for a node. Allocating the same node twice
    /// returns the first allocation.
    pub fn allocate(&mut self, node: &Node) -> Symbol {
        if let Some(symbol) = self.table.get(&node.id) {
            return symbol.clone();
        }

        let base = self.sanitize(&node.name, node.kind.default_label());
        let symbol = self.next_symbol(&base);
        debug!("Allocated {} / '{}' for node {}", symbol.variable, symbol.resource, node.id);

        self.table.insert(&node.id, symbol.clone());
        symbol
    }

    /// Allocate the generated default network.
    pub fn allocate_default_network(&mut self, name: &str) -> Symbol {
        if let Some(symbol) = self.table.default_network() {
            return symbol.clone();
        }

        let base = self.sanitize(name, "Vpc");
        let symbol = self.next_symbol(&base);
        self.table.default_network = Some(symbol.clone());
        symbol
    }

    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    pub fn into_table(self) -> SymbolTable {
        self.table
    }

    /// Replace characters that cannot appear in a construct id.
    pub fn sanitize(&self, name: &str, fallback: &str) -> String {
        let cleaned = self.disallowed.replace_all(name, "_");
        let trimmed = cleaned.trim();
        if trimmed.is_empty() {
            fallback.to_string()
        } else {
            trimmed.to_string()
        }
    }

    fn next_symbol(&mut self, base: &str) -> Symbol {
        self.next_variable += 1;
        let variable = format!("a{}", self.next_variable);
        let resource = self.unique_resource(base);
        Symbol::new(variable, resource)
    }

    fn unique_resource(&mut self, base: &str) -> String {
        loop {
            let count = self.counters.entry(base.to_string()).or_insert(0);
            let candidate = match self.scheme {
                NamingScheme::Counted => {
                    *count += 1;
                    format!("{}{}", base, count)
                }
                NamingScheme::Bare => {
                    let candidate = if *count == 0 {
                        base.to_string()
                    } else {
                        format!("{}{}", base, count)
                    };
                    *count += 1;
                    candidate
                }
            };

            if self.is_free(&candidate) {
                self.reserve(&candidate);
                return candidate;
            }
        }
    }

    /// A name is free when neither it nor any derived satellite name is taken.
    fn is_free(&self, candidate: &str) -> bool {
        !self.taken.contains(candidate)
            && SatelliteKind::ALL
                .iter()
                .all(|kind| !self.taken.contains(&format!("{}{}", candidate, kind.resource_suffix())))
    }

    fn reserve(&mut self, candidate: &str) {
        self.taken.insert(candidate.to_string());
        for kind in SatelliteKind::ALL {
            self.taken.insert(format!("{}{}", candidate, kind.resource_suffix()));
        }
    }
}

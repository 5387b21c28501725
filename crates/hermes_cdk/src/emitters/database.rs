//! Managed database emitter.

use std::fmt;
use std::str::FromStr;

use hermes_graph::{property, Node};

use crate::error::{CdkError, CdkResult};
use crate::fragment::{escape_literal, EmittedFragment, FragmentOrigin, Import};

use super::{satellite, EmitContext, Properties};

const KNOWN: &[&str] = &[
    property::ENGINE,
    property::INSTANCE_TYPE,
    property::ALLOCATED_STORAGE,
];

/// Database engines the generator can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseEngine {
    Mysql,
    Postgres,
}

impl DatabaseEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseEngine::Mysql => "mysql",
            DatabaseEngine::Postgres => "postgres",
        }
    }

    /// Constant on `rds.DatabaseInstanceEngine`.
    pub fn cdk_constant(&self) -> &'static str {
        match self {
            DatabaseEngine::Mysql => "MYSQL",
            DatabaseEngine::Postgres => "POSTGRES",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            DatabaseEngine::Mysql => 3306,
            DatabaseEngine::Postgres => 5432,
        }
    }

    /// Engine of a database node, if it names a supported one.
    pub fn of(node: &Node) -> Option<Self> {
        node.property(property::ENGINE)
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok())
    }
}

impl FromStr for DatabaseEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(DatabaseEngine::Mysql),
            "postgres" | "postgresql" => Ok(DatabaseEngine::Postgres),
            other => Err(format!("unsupported database engine '{}'", other)),
        }
    }
}

impl fmt::Display for DatabaseEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub fn emit(node: &Node, ctx: &EmitContext<'_>) -> CdkResult<EmittedFragment> {
    let props = Properties::of(node);
    props.warn_unknown(KNOWN);

    let engine = props
        .string(property::ENGINE)?
        .ok_or_else(|| CdkError::unsupported(&node.id, "database engine is required"))?
        .parse::<DatabaseEngine>()
        .map_err(|reason: String| CdkError::unsupported(&node.id, reason))?;
    let instance_type = props
        .string(property::INSTANCE_TYPE)?
        .unwrap_or(ctx.config.database_instance_type.as_str());
    let storage = props
        .positive(property::ALLOCATED_STORAGE)?
        .unwrap_or(ctx.config.allocated_storage);

    let symbol = ctx.symbol(node)?;
    let network = ctx.network_of(node)?;
    let database_name = format!(
        "{}-{}-{}",
        ctx.config.database_name_prefix, ctx.stack_name, symbol.resource
    );

    let mut fragment = EmittedFragment::new(FragmentOrigin::Node(node.id.clone()));
    let sg = satellite::security_group(&mut fragment, symbol, network);

    fragment
        .import(Import::Rds)
        .line(format!(
            "{} = rds.DatabaseInstance(self, '{}',",
            symbol.variable, symbol.resource
        ))
        .indent()
        .line(format!(
            "instance_type=ec2.InstanceType('{}'), ",
            escape_literal(instance_type)
        ))
        .line(format!("engine=rds.DatabaseInstanceEngine.{},", engine.cdk_constant()))
        .line(format!("vpc={}, ", network.variable))
        .line(format!("security_groups=[{}],", sg.variable));
    if ctx.is_public(node) {
        fragment.line("vpc_subnets=ec2.SubnetSelection(subnet_type=ec2.SubnetType.PUBLIC),");
    }
    fragment
        .line(format!(
            "credentials=rds.Credentials.from_generated_secret('{}_user'),",
            engine
        ))
        .line(format!("database_name='{}',", escape_literal(&database_name)))
        .line(format!("allocated_storage={},", storage))
        .line("multi_az=False")
        .dedent()
        .line(")")
        .define(symbol.variable.as_str());

    Ok(fragment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::naming::IdentifierAllocator;
    use hermes_graph::Graph;

    fn render(node: Node) -> CdkResult<EmittedFragment> {
        let graph = Graph::new("g", "d")
            .with_node(Node::vpc("net", "VPC"))
            .with_child("net", node);
        let config = GeneratorConfig::default();
        let mut allocator = IdentifierAllocator::new(config.naming);
        for node in &graph.nodes {
            allocator.allocate(node);
        }
        let symbols = allocator.into_table();
        let ctx = EmitContext {
            graph: &graph,
            symbols: &symbols,
            config: &config,
            stack_name: "shop",
        };
        emit(&graph.nodes[1], &ctx)
    }

    #[test]
    fn test_engine_parsing() {
        assert_eq!("MySQL".parse::<DatabaseEngine>(), Ok(DatabaseEngine::Mysql));
        assert_eq!("postgres".parse::<DatabaseEngine>(), Ok(DatabaseEngine::Postgres));
        assert!("oracle".parse::<DatabaseEngine>().is_err());
        assert_eq!(DatabaseEngine::Postgres.default_port(), 5432);
    }

    #[test]
    fn test_postgres_database() {
        let fragment = render(Node::database("db", "orders", "Postgres").with_property("allocated_storage", 50)).unwrap();
        let lines: Vec<_> = fragment.lines.iter().map(|l| l.text.as_str()).collect();

        assert!(lines.contains(&"engine=rds.DatabaseInstanceEngine.POSTGRES,"));
        assert!(lines.contains(&"credentials=rds.Credentials.from_generated_secret('postgres_user'),"));
        assert!(lines.contains(&"database_name='hermes-shop-orders1',"));
        assert!(lines.contains(&"allocated_storage=50,"));
        assert_eq!(fragment.defines, vec!["a2_sg", "a2"]);
    }

    #[test]
    fn test_unsupported_engine() {
        let err = render(Node::database("db", "legacy", "oracle")).unwrap_err();
        match err {
            CdkError::UnsupportedConfiguration { node, reason } => {
                assert_eq!(node, "db");
                assert!(reason.contains("oracle"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_engine() {
        let err = render(Node::new("db", hermes_graph::NodeKind::Database, "db")).unwrap_err();
        assert!(matches!(err, CdkError::UnsupportedConfiguration { .. }));
    }
}

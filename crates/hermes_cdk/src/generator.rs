//! The generation pipeline.

use tracing::{debug, info};

use hermes_graph::{Graph, GraphError, GraphValidator, ValidationReport};

use crate::assembler::{StackAssembler, StackDefinition};
use crate::config::GeneratorConfig;
use crate::emitters::{self, vpc, EmitContext};
use crate::error::CdkResult;
use crate::naming::IdentifierAllocator;
use crate::orderer::DependencyOrderer;
use crate::resolver::RelationshipResolver;

/// Display name of the network generated for uncontained compute nodes.
pub const DEFAULT_NETWORK_NAME: &str = "DefaultVpc";

/// Compiles diagram graphs into stack definitions.
///
/// A generator only holds configuration; every call allocates its own
/// identifiers, so one generator can serve concurrent requests.
///
/// ```rust
/// use hermes_cdk::{GeneratorConfig, StackGenerator};
/// use hermes_graph::{Graph, Node};
///
/// let graph = Graph::new("id", "Diagram").with_node(Node::vpc("net", "MyVPC"));
/// let stack = StackGenerator::new(GeneratorConfig::default()).generate(&graph).unwrap();
///
/// assert!(stack.source().contains("a1 = ec2.Vpc(self, 'MyVPC1', nat_gateways=1)"));
/// ```
pub struct StackGenerator {
    config: GeneratorConfig,
    assembler: StackAssembler,
}

impl StackGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        let assembler = StackAssembler::new(config.stack_class.clone());
        Self { config, assembler }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate a stack named after the graph.
    pub fn generate(&self, graph: &Graph) -> CdkResult<StackDefinition> {
        self.generate_named(graph, &graph.name)
    }

    /// Generate a stack under an explicit name.
    pub fn generate_named(&self, graph: &Graph, stack_name: &str) -> CdkResult<StackDefinition> {
        info!(
            "Generating stack '{}' from {} node(s) and {} edge(s)",
            stack_name,
            graph.nodes.len(),
            graph.edges.len()
        );

        self.config.validate()?;
        let mut report = ValidationReport::new();
        GraphValidator::check_stack_name(stack_name, &mut report);
        GraphValidator::check_structure(graph, &mut report);
        report.into_result()?;
        self.check_placement(graph)?;

        let order = DependencyOrderer::order(graph)?;
        let mut allocator = IdentifierAllocator::new(self.config.naming);
        let mut fragments = Vec::with_capacity(order.len() + graph.edges.len());

        for node in order {
            let uncontained = node.kind.needs_network() && graph.parent_of(&node.id).is_none();
            if uncontained && allocator.table().default_network().is_none() {
                let network = allocator.allocate_default_network(DEFAULT_NETWORK_NAME);
                debug!("Placing uncontained nodes in generated network {}", network.variable);
                fragments.push(vpc::emit_default(&network, &self.config));
            }

            allocator.allocate(node);
            let ctx = EmitContext {
                graph,
                symbols: allocator.table(),
                config: &self.config,
                stack_name,
            };
            let fragment = emitters::emit(node, &ctx)?;
            debug!("Emitted {} {} as {:?}", node.kind, node.id, fragment.defines);
            fragments.push(fragment);
        }

        let symbols = allocator.into_table();
        let rules = RelationshipResolver::new(&self.config.services).resolve(graph, &symbols)?;
        fragments.extend(rules);

        let stack = self.assembler.assemble(&fragments, stack_name)?;
        Ok(stack.with_symbols(symbols))
    }

    fn check_placement(&self, graph: &Graph) -> CdkResult<()> {
        if self.config.implicit_vpc {
            return Ok(());
        }

        match graph
            .nodes
            .iter()
            .find(|n| n.kind.needs_network() && graph.parent_of(&n.id).is_none())
        {
            Some(node) => Err(GraphError::Uncontained {
                node: node.id.clone(),
            }
            .into()),
            None => Ok(()),
        }
    }
}

impl Default for StackGenerator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

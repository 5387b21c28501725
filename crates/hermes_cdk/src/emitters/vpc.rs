//! Network emitter.

use hermes_graph::Node;

use crate::config::GeneratorConfig;
use crate::error::CdkResult;
use crate::fragment::{EmittedFragment, FragmentOrigin, Import};
use crate::naming::Symbol;

use super::{EmitContext, Properties};

pub fn emit(node: &Node, ctx: &EmitContext<'_>) -> CdkResult<EmittedFragment> {
    Properties::of(node).warn_unknown(&[]);
    let symbol = ctx.symbol(node)?;
    Ok(declare(FragmentOrigin::Node(node.id.clone()), symbol, ctx.config))
}

/// Network generated for compute nodes drawn outside any VPC.
pub fn emit_default(symbol: &Symbol, config: &GeneratorConfig) -> EmittedFragment {
    declare(FragmentOrigin::DefaultNetwork, symbol, config)
}

fn declare(origin: FragmentOrigin, symbol: &Symbol, config: &GeneratorConfig) -> EmittedFragment {
    let mut fragment = EmittedFragment::new(origin);
    fragment
        .import(Import::Ec2)
        .line(format!(
            "{} = ec2.Vpc(self, '{}', nat_gateways={})",
            symbol.variable, symbol.resource, config.nat_gateways
        ))
        .define(symbol.variable.as_str());
    fragment
}

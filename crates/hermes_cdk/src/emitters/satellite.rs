//! Resources owned by a compute node.

use crate::config::GeneratorConfig;
use crate::fragment::{EmittedFragment, Import};
use crate::naming::{SatelliteKind, Symbol};

/// Declare the owner's security group inside `network`.
pub fn security_group(fragment: &mut EmittedFragment, owner: &Symbol, network: &Symbol) -> Symbol {
    let sg = owner.satellite(SatelliteKind::SecurityGroup);
    fragment
        .import(Import::Ec2)
        .reference(network.variable.as_str())
        .line(format!(
            "{} = ec2.SecurityGroup(self, '{}', vpc={})",
            sg.variable, sg.resource, network.variable
        ))
        .define(sg.variable.as_str());
    sg
}

/// Declare the owner's instance role with the baseline managed policy.
pub fn instance_role(fragment: &mut EmittedFragment, owner: &Symbol, config: &GeneratorConfig) -> Symbol {
    let role = owner.satellite(SatelliteKind::Role);
    fragment
        .import(Import::Iam)
        .line(format!(
            "{}=iam.Role(self, '{}', assumed_by=iam.ServicePrincipal('ec2.amazonaws.com'))",
            role.variable, role.resource
        ))
        .line(format!(
            "{}.add_managed_policy(iam.ManagedPolicy.from_aws_managed_policy_name('{}'))",
            role.variable, config.managed_policy
        ))
        .define(role.variable.as_str());
    role
}

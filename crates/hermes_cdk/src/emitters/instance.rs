//! Compute instance emitter.

use hermes_graph::{property, Node};

use crate::error::CdkResult;
use crate::fragment::{escape_literal, EmittedFragment, FragmentOrigin, Import};
use crate::naming::SatelliteKind;

use super::{satellite, EmitContext, Properties};

const KNOWN: &[&str] = &[
    property::AMI_ID,
    property::AVAILABILITY_ZONE,
    property::INSTANCE_TYPE,
    property::USER_DATA,
    property::APP_PATH,
];

const AMAZON_LINUX_2: &str = "ec2.AmazonLinuxImage(generation=ec2.AmazonLinuxGeneration.AMAZON_LINUX_2)";

pub fn emit(node: &Node, ctx: &EmitContext<'_>) -> CdkResult<EmittedFragment> {
    let props = Properties::of(node);
    props.warn_unknown(KNOWN);

    let ami = props.string(property::AMI_ID)?;
    let zone = props
        .string(property::AVAILABILITY_ZONE)?
        .unwrap_or(ctx.config.default_availability_zone.as_str());
    let instance_type = props
        .string(property::INSTANCE_TYPE)?
        .unwrap_or(ctx.config.instance_type.as_str());
    let user_data = props.string(property::USER_DATA)?;
    let app_path = props.string(property::APP_PATH)?;

    let symbol = ctx.symbol(node)?;
    let network = ctx.network_of(node)?;
    let var = symbol.variable.as_str();

    let mut fragment = EmittedFragment::new(FragmentOrigin::Node(node.id.clone()));
    let sg = satellite::security_group(&mut fragment, symbol, network);
    let role = satellite::instance_role(&mut fragment, symbol, ctx.config);

    let machine_image = match ami {
        Some(ami) => format!(
            "ec2.MachineImage.generic_linux({{\"{}\": \"{}\"}})",
            escape_literal(zone),
            escape_literal(ami)
        ),
        None => AMAZON_LINUX_2.to_string(),
    };

    fragment
        .line(format!("{} = ec2.Instance(self, '{}',", var, symbol.resource))
        .indent()
        .line(format!(
            "instance_type=ec2.InstanceType('{}'),",
            escape_literal(instance_type)
        ))
        .line(format!("machine_image={},", machine_image));
    if ctx.is_public(node) {
        fragment.line("vpc_subnets=ec2.SubnetSelection(subnet_type=ec2.SubnetType.PUBLIC),");
    }
    fragment
        .line(format!("vpc={},", network.variable))
        .line(format!("security_group={},", sg.variable))
        .line(format!("role={}", role.variable))
        .dedent()
        .line(")")
        .define(var);

    if let Some(path) = app_path {
        let asset = symbol.satellite(SatelliteKind::Asset);
        let filepath = format!("{}_filepath", var);
        fragment
            .import(Import::S3Assets)
            .line(format!(
                "{}=s3assets.Asset(self, '{}', path='{}')",
                asset.variable,
                asset.resource,
                escape_literal(path)
            ))
            .line(format!("{}.grant_read({})", asset.variable, role.variable))
            .line(format!(
                "{}={}.user_data.add_s3_download_command(bucket={}.bucket, bucket_key={}.s3_object_key)",
                filepath, var, asset.variable, asset.variable
            ))
            .line(format!("{}.user_data.add_commands(f'cp {{{}}} app.zip')", var, filepath))
            .line(format!("{}.user_data.add_commands('unzip app.zip')", var))
            .define(asset.variable.as_str())
            .define(filepath);
    }

    if let Some(script) = user_data {
        fragment.line(format!("{}.add_user_data('{}')", var, escape_literal(script)));
    }

    fragment.output(
        &node.id,
        format!("{} IP Address", symbol.resource),
        format!("{}.instance_public_ip", var),
    );

    Ok(fragment)
}

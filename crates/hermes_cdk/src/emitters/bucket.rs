//! Object storage emitter.
//!
//! Buckets are private unless an index document turns them into a static
//! website. They live outside any network and own no security group.

use hermes_graph::{property, Node};

use crate::error::CdkResult;
use crate::fragment::{escape_literal, EmittedFragment, FragmentOrigin, Import};
use crate::naming::SatelliteKind;

use super::{EmitContext, Properties};

const KNOWN: &[&str] = &[
    property::INDEX_DOCUMENT,
    property::ERROR_DOCUMENT,
    property::APP_PATH,
];

const DEFAULT_ERROR_DOCUMENT: &str = "error.html";

pub fn emit(node: &Node, ctx: &EmitContext<'_>) -> CdkResult<EmittedFragment> {
    let props = Properties::of(node);
    props.warn_unknown(KNOWN);

    let index = props.string(property::INDEX_DOCUMENT)?;
    let error = props
        .string(property::ERROR_DOCUMENT)?
        .unwrap_or(DEFAULT_ERROR_DOCUMENT);
    let app_path = props.string(property::APP_PATH)?;

    let symbol = ctx.symbol(node)?;
    let var = symbol.variable.as_str();

    let mut fragment = EmittedFragment::new(FragmentOrigin::Node(node.id.clone()));
    fragment
        .import(Import::S3)
        .line(format!("{} = s3.Bucket(self, '{}',", var, symbol.resource))
        .indent()
        .line("auto_delete_objects=True,");
    match index {
        Some(index) => {
            fragment
                .line("public_read_access=True,")
                .line("block_public_access=s3.BlockPublicAccess.BLOCK_ACLS,")
                .line(format!("website_index_document='{}',", escape_literal(index)))
                .line(format!("website_error_document='{}',", escape_literal(error)));
        }
        None => {
            fragment.line("public_read_access=False,");
        }
    }
    fragment
        .line("removal_policy= cdk.RemovalPolicy.DESTROY")
        .dedent()
        .line(")")
        .define(var);

    if let Some(path) = app_path {
        let deployment = symbol.satellite(SatelliteKind::Deployment);
        fragment
            .import(Import::S3Deployment)
            .line(format!(
                "s3_deployment.BucketDeployment(self, '{}',",
                deployment.resource
            ))
            .indent()
            .line(format!(
                "sources=[s3_deployment.Source.asset('{}')],",
                escape_literal(path)
            ))
            .line(format!("destination_bucket={}", var))
            .dedent()
            .line(")");
    }

    if index.is_some() {
        fragment.output(
            &node.id,
            format!("{} Website URL", symbol.resource),
            format!("{}.bucket_website_url", var),
        );
    }

    Ok(fragment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::naming::IdentifierAllocator;
    use hermes_graph::Graph;

    fn render(node: Node) -> EmittedFragment {
        let graph = Graph::new("g", "d").with_node(node);
        let config = GeneratorConfig::default();
        let mut allocator = IdentifierAllocator::new(config.naming);
        allocator.allocate(&graph.nodes[0]);
        let symbols = allocator.into_table();
        let ctx = EmitContext {
            graph: &graph,
            symbols: &symbols,
            config: &config,
            stack_name: "d",
        };
        emit(&graph.nodes[0], &ctx).unwrap()
    }

    #[test]
    fn test_private_bucket() {
        let fragment = render(Node::bucket("b", "s3bucket"));
        let lines: Vec<_> = fragment.lines.iter().map(|l| l.text.as_str()).collect();

        assert_eq!(
            lines,
            vec![
                "a1 = s3.Bucket(self, 's3bucket1',",
                "auto_delete_objects=True,",
                "public_read_access=False,",
                "removal_policy= cdk.RemovalPolicy.DESTROY",
                ")",
            ]
        );
        assert!(fragment.outputs.is_empty());
        assert!(fragment.references.is_empty());
    }

    #[test]
    fn test_static_website_with_deployment() {
        let fragment = render(
            Node::bucket("b", "site")
                .with_property("index_document", "home.html")
                .with_property("app_path", "./site"),
        );
        let lines: Vec<_> = fragment.lines.iter().map(|l| l.text.as_str()).collect();

        assert!(lines.contains(&"website_index_document='home.html',"));
        assert!(lines.contains(&"website_error_document='error.html',"));
        assert!(lines.contains(&"s3_deployment.BucketDeployment(self, 'site1 Deployment',"));
        assert_eq!(fragment.imports, vec![Import::S3, Import::S3Deployment]);
        assert_eq!(fragment.outputs[0].output_id, "site1 Website URL");
        assert_eq!(fragment.outputs[0].value, "a1.bucket_website_url");
    }
}

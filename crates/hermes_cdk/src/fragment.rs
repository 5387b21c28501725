//! Emitted source fragments.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// CDK modules a fragment may need imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Import {
    Ec2,
    Iam,
    Rds,
    S3,
    S3Assets,
    S3Deployment,
}

impl Import {
    pub fn statement(&self) -> &'static str {
        match self {
            Import::Ec2 => "from aws_cdk import aws_ec2 as ec2",
            Import::Iam => "from aws_cdk import aws_iam as iam",
            Import::Rds => "from aws_cdk import aws_rds as rds",
            Import::S3 => "from aws_cdk import aws_s3 as s3",
            Import::S3Assets => "from aws_cdk import aws_s3_assets as s3assets",
            Import::S3Deployment => "from aws_cdk import aws_s3_deployment as s3_deployment",
        }
    }
}

/// What a fragment was emitted for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum FragmentOrigin {
    Node(String),
    Edge(String),
    /// The generated default network.
    DefaultNetwork,
}

impl fmt::Display for FragmentOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FragmentOrigin::Node(id) => write!(f, "node {}", id),
            FragmentOrigin::Edge(id) => write!(f, "edge {}", id),
            FragmentOrigin::DefaultNetwork => write!(f, "default network"),
        }
    }
}

/// A stack output exported for observing a resource after deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackOutput {
    /// Node the output describes.
    pub node_id: String,
    /// Output id as it appears in the deployed stack.
    pub output_id: String,
    /// Python expression providing the value.
    pub value: String,
}

/// One source line with its indentation relative to the stack body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub indent: usize,
    pub text: String,
}

/// Ordered statements declaring one node or one relationship.
#[derive(Debug, Clone)]
pub struct EmittedFragment {
    pub origin: FragmentOrigin,
    pub lines: Vec<Line>,
    pub imports: Vec<Import>,
    /// Variables defined, in definition order.
    pub defines: Vec<String>,
    /// Variables used that other fragments define.
    pub references: BTreeSet<String>,
    pub outputs: Vec<StackOutput>,
    depth: usize,
}

impl EmittedFragment {
    pub fn new(origin: FragmentOrigin) -> Self {
        Self {
            origin,
            lines: Vec::new(),
            imports: Vec::new(),
            defines: Vec::new(),
            references: BTreeSet::new(),
            outputs: Vec::new(),
            depth: 0,
        }
    }

    pub fn line(&mut self, text: impl Into<String>) -> &mut Self {
        self.lines.push(Line {
            indent: self.depth,
            text: text.into(),
        });
        self
    }

    pub fn indent(&mut self) -> &mut Self {
        self.depth += 1;
        self
    }

    pub fn dedent(&mut self) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self
    }

    pub fn import(&mut self, import: Import) -> &mut Self {
        if !self.imports.contains(&import) {
            self.imports.push(import);
        }
        self
    }

    pub fn define(&mut self, variable: impl Into<String>) -> &mut Self {
        let variable = variable.into();
        if !self.defines.contains(&variable) {
            self.defines.push(variable);
        }
        self
    }

    /// Record a variable defined by another fragment.
    pub fn reference(&mut self, variable: impl Into<String>) -> &mut Self {
        let variable = variable.into();
        if !self.defines.contains(&variable) {
            self.references.insert(variable);
        }
        self
    }

    /// Export an output and write its declaration.
    pub fn output(&mut self, node_id: &str, output_id: String, value: String) -> &mut Self {
        self.line(format!("cdk.CfnOutput(self, '{}', value={})", output_id, value));
        self.outputs.push(StackOutput {
            node_id: node_id.to_string(),
            output_id,
            value,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Escape text for a single- or double-quoted Python string literal.
pub fn escape_literal(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\r' => {}
            '\n' => escaped.push_str("\\n"),
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\'' => escaped.push_str("\\'"),
            other => escaped.push(other),
        }
    }
    escaped
}

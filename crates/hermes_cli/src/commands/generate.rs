//! Generate command - Compile one diagram into a CDK stack.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use hermes_cdk::StackGenerator;
use hermes_graph::GraphReader;

use super::load_config;

#[derive(Args)]
pub struct GenerateArgs {
    /// Diagram file (.json, .yaml or .yml)
    input: PathBuf,

    /// Write the stack program here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write a JSON report of declared identifiers and outputs
    #[arg(long)]
    report: Option<PathBuf>,

    /// Generator configuration file (.yaml, .yml or .toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stack id to use instead of the diagram name
    #[arg(long)]
    stack_name: Option<String>,
}

pub async fn execute(args: GenerateArgs) -> Result<()> {
    info!("Generating stack from {}", args.input.display());

    let config = load_config(args.config.as_deref())?;
    let graph = GraphReader::read_file(&args.input)
        .with_context(|| format!("Failed to read diagram {}", args.input.display()))?;

    let generator = StackGenerator::new(config);
    let stack = match &args.stack_name {
        Some(name) => generator.generate_named(&graph, name),
        None => generator.generate(&graph),
    }
    .with_context(|| format!("Failed to generate stack from {}", args.input.display()))?;

    match &args.output {
        Some(path) => {
            fs::write(path, stack.source())
                .with_context(|| format!("Failed to write stack to {}", path.display()))?;
            println!("✅ Stack '{}' written to {}", stack.stack_name(), path.display());
            for output in stack.outputs() {
                println!("   📤 {} → {}", output.node_id, output.output_id);
            }
        }
        None => print!("{}", stack.source()),
    }

    if let Some(path) = &args.report {
        fs::write(path, stack.report()?)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!("Report written to {}", path.display());
    }

    Ok(())
}

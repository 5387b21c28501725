//! Validate command - Check a diagram for structural errors.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use hermes_graph::{GraphReader, GraphValidator};

#[derive(Args)]
pub struct ValidateArgs {
    /// Diagram file (.json, .yaml or .yml)
    input: PathBuf,
}

pub async fn execute(args: ValidateArgs) -> Result<()> {
    info!("Validating diagram: {}", args.input.display());

    let graph = GraphReader::read_file(&args.input)
        .with_context(|| format!("Failed to read diagram {}", args.input.display()))?;
    let report = GraphValidator::check(&graph);

    println!(
        "📋 Diagram '{}': {} node(s), {} edge(s)",
        graph.name,
        graph.nodes.len(),
        graph.edges.len()
    );

    for warning in &report.warnings {
        println!("   ⚠️  {}", warning);
    }

    if report.is_valid() {
        println!("   ✅ Diagram is valid");
        return Ok(());
    }

    println!("   ❌ {} error(s):", report.errors.len());
    for error in &report.errors {
        println!("      - {}", error);
    }

    report
        .into_result()
        .with_context(|| format!("Diagram {} failed validation", args.input.display()))
}

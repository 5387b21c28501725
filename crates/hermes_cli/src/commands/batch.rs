//! Batch command - Compile every diagram in a directory.
//!
//! Each diagram is an independent generation request and runs on the blocking
//! pool; the generator is shared read-only between them.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use hermes_cdk::StackGenerator;
use hermes_graph::GraphReader;

use super::load_config;

#[derive(Args)]
pub struct BatchArgs {
    /// Directory searched recursively for diagram files
    input_dir: PathBuf,

    /// Directory receiving one `.py` per input, mirroring the input layout
    #[arg(short, long)]
    output_dir: PathBuf,

    /// Generator configuration file (.yaml, .yml or .toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

pub async fn execute(args: BatchArgs) -> Result<()> {
    info!("Generating stacks for diagrams in {}", args.input_dir.display());

    if !args.input_dir.is_dir() {
        anyhow::bail!("Input directory not found: {}", args.input_dir.display());
    }

    let diagrams = discover(&args.input_dir);
    if diagrams.is_empty() {
        println!("⚠️  No diagrams found in {}", args.input_dir.display());
        return Ok(());
    }

    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Failed to create {}", args.output_dir.display()))?;

    let jobs = plan(&args.input_dir, &args.output_dir, diagrams)?;
    let generator = Arc::new(StackGenerator::new(load_config(args.config.as_deref())?));
    println!("🏗️  Generating {} stack(s)...\n", jobs.len());

    let mut tasks = JoinSet::new();
    for (input, output) in jobs {
        let generator = Arc::clone(&generator);
        tasks.spawn_blocking(move || {
            let result = compile(&generator, &input, &output);
            (input, output, result)
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        results.push(joined.context("Generation task panicked")?);
    }
    results.sort_by(|a, b| a.0.cmp(&b.0));

    let mut failed = 0;
    for (input, output, result) in &results {
        match result {
            Ok(()) => println!("✅ {} → {}", input.display(), output.display()),
            Err(e) => {
                failed += 1;
                warn!("Generation failed for {}: {:#}", input.display(), e);
                println!("❌ {}: {:#}", input.display(), e);
            }
        }
    }

    println!();
    println!("📊 {} passed, {} failed", results.len() - failed, failed);

    if failed > 0 {
        anyhow::bail!("{} of {} diagram(s) failed", failed, results.len());
    }
    Ok(())
}

/// Diagram files under `dir`, sorted by path.
fn discover(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file() && GraphReader::is_graph_file(e.path()))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    debug!("Discovered {} diagram(s)", files.len());
    files
}

/// `<output_dir>/<input path relative to input_dir>.py`
fn output_path(input_dir: &Path, output_dir: &Path, input: &Path) -> PathBuf {
    let relative = input.strip_prefix(input_dir).unwrap_or(input);
    output_dir.join(relative).with_extension("py")
}

/// Pair every input with its output, failing if two inputs share a target.
fn plan(input_dir: &Path, output_dir: &Path, inputs: Vec<PathBuf>) -> Result<Vec<(PathBuf, PathBuf)>> {
    let mut targets: HashMap<PathBuf, PathBuf> = HashMap::new();
    let mut jobs = Vec::with_capacity(inputs.len());

    for input in inputs {
        let output = output_path(input_dir, output_dir, &input);
        if let Some(previous) = targets.insert(output.clone(), input.clone()) {
            anyhow::bail!(
                "{} and {} would both be written to {}",
                previous.display(),
                input.display(),
                output.display()
            );
        }
        jobs.push((input, output));
    }
    Ok(jobs)
}

fn compile(generator: &StackGenerator, input: &Path, output: &Path) -> Result<()> {
    let graph = GraphReader::read_file(input)?;
    let stack = generator.generate(&graph)?;
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, stack.source())?;
    Ok(())
}

//! CLI command definitions.
//!
//! Each subcommand wraps one use of the generation core: compiling a single
//! diagram, checking a diagram, or compiling a directory of diagrams.

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use hermes_cdk::GeneratorConfig;

pub mod batch;
pub mod generate;
pub mod validate;

/// Hermes - compile infrastructure diagrams into AWS CDK stacks
#[derive(Parser)]
#[command(name = "hermes")]
#[command(version, about = "Hermes - compile infrastructure diagrams into AWS CDK stacks")]
#[command(long_about = r#"
Hermes turns diagram graphs (networks, instances, databases and buckets joined
by containment and network-access edges) into a deployable AWS CDK Python stack.

COMMANDS:
  generate  → Compile one diagram into a stack program
  validate  → Check a diagram for structural errors
  batch     → Compile every diagram in a directory

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments or unreadable input
  3 - Graph validation failure
  4 - Generation failure
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a CDK stack from a diagram
    Generate(generate::GenerateArgs),

    /// Validate a diagram without generating
    Validate(validate::ValidateArgs),

    /// Generate stacks for every diagram in a directory
    Batch(batch::BatchArgs),
}

/// Load generator configuration, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<GeneratorConfig> {
    match path {
        Some(path) => GeneratorConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(GeneratorConfig::default()),
    }
}

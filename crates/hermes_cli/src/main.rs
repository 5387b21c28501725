//! Hermes CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments or unreadable input
//! - 3: Graph validation failure
//! - 4: Generation failure

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hermes_cdk::CdkError;
use hermes_graph::GraphError;

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VALIDATION_FAILURE: u8 = 3;
    pub const GENERATION_ERROR: u8 = 4;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json);

    let result = match cli.command {
        Commands::Generate(args) => commands::generate::execute(args).await,
        Commands::Validate(args) => commands::validate::execute(args).await,
        Commands::Batch(args) => commands::batch::execute(args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

fn init_logging(verbose: bool, json: bool) {
    let level = if verbose { "hermes=debug" } else { "hermes=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("{},warn", level)));

    // Logs go to stderr; stdout carries generated stacks
    let result = tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_target(false).with_writer(std::io::stderr)))
        .try_init();

    if result.is_err() {
        // Logging already initialized, continue
    }
}

/// Map an error to its exit code by the first typed cause in the chain.
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(error) = cause.downcast_ref::<GraphError>() {
            return graph_exit_code(error);
        }
        if let Some(error) = cause.downcast_ref::<CdkError>() {
            return match error {
                CdkError::Graph(graph) => graph_exit_code(graph),
                CdkError::Config(_)
                | CdkError::Io(_)
                | CdkError::Json(_)
                | CdkError::Yaml(_)
                | CdkError::Toml(_) => ExitCodes::INVALID_ARGS,
                CdkError::DependencyCycle { .. } => ExitCodes::VALIDATION_FAILURE,
                _ => ExitCodes::GENERATION_ERROR,
            };
        }
        if cause.downcast_ref::<std::io::Error>().is_some() {
            return ExitCodes::INVALID_ARGS;
        }
    }
    ExitCodes::GENERAL_ERROR
}

fn graph_exit_code(error: &GraphError) -> u8 {
    match error {
        GraphError::Io(_) | GraphError::Json(_) | GraphError::Yaml(_) | GraphError::UnsupportedFormat(_) => {
            ExitCodes::INVALID_ARGS
        }
        _ => ExitCodes::VALIDATION_FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_exit_codes_follow_error_kind() {
        let dangling: anyhow::Result<()> = Err(GraphError::DanglingEdge {
            edge: "e".into(),
            endpoint: "x".into(),
        })
        .context("Failed to generate stack");
        assert_eq!(categorize_error(&dangling.unwrap_err()), ExitCodes::VALIDATION_FAILURE);

        let engine = anyhow::Error::new(CdkError::UnsupportedConfiguration {
            node: "db".into(),
            reason: "unsupported database engine 'oracle'".into(),
        });
        assert_eq!(categorize_error(&engine), ExitCodes::GENERATION_ERROR);

        let wrapped = anyhow::Error::new(CdkError::Graph(GraphError::UnsupportedFormat("a.xml".into())));
        assert_eq!(categorize_error(&wrapped), ExitCodes::INVALID_ARGS);

        assert_eq!(categorize_error(&anyhow::anyhow!("2 of 3 diagrams failed")), ExitCodes::GENERAL_ERROR);
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! deployflow - CDK deployment workflow generator
//!
//! Turn a list of deployment stages into GitHub Actions workflows.

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deployflow::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deployflow=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    // Change to specified directory if provided
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir).map_err(|e| {
            miette::miette!("Failed to change to directory '{}': {}", dir.display(), e)
        })?;
    }

    // Dispatch to command handlers
    match cli.command {
        Commands::Init {
            stack_prefix,
            namespace,
            role_arn,
            force,
        } => deployflow::cli::init::run(stack_prefix, namespace, role_arn, force, cli.verbose).await,
        Commands::Validate { definition } => {
            deployflow::cli::validate::run(definition, cli.verbose).await
        }
        Commands::Synth {
            definition,
            out_dir,
            check,
        } => deployflow::cli::synth::run(definition, out_dir, check, cli.verbose).await,
        Commands::Graph { definition, format } => {
            deployflow::cli::graph::run(definition, format, cli.verbose).await
        }
        Commands::Tasks { definition } => deployflow::cli::tasks::run(definition, cli.verbose).await,
    }
}

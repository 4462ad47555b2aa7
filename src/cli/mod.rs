// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for deployflow.

pub mod graph;
pub mod init;
pub mod synth;
pub mod tasks;
pub mod validate;

use clap::{Parser, Subcommand};
use miette::Result;
use std::path::{Path, PathBuf};

use crate::pipeline::{PipelineDefinition, DEFAULT_DEFINITION_FILE};

/// CDK deployment workflow generator
///
/// Turn a list of deployment stages into GitHub Actions workflows.
#[derive(Parser, Debug)]
#[clap(
    name = "deployflow",
    version,
    about = "Generate GitHub Actions deployment workflows for multi-stage CDK applications",
    long_about = None,
    after_help = "Examples:\n\
        deployflow init --stack-prefix MyApp    Create a starter .deployflow.yaml\n\
        deployflow validate                     Check stages and dependencies\n\
        deployflow synth                        Write workflows to .github/workflows\n\
        deployflow synth --check                Fail if generated files are stale\n\n\
        See 'deployflow <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a starter definition file
    Init {
        /// Prefix for CloudFormation stack names (defaults to current directory name)
        #[clap(long)]
        stack_prefix: Option<String>,

        /// npm scope for the versioned assembly package
        #[clap(long, default_value = "@my-org")]
        namespace: String,

        /// Default IAM role assumed through GitHub OIDC
        #[clap(long, default_value = "arn:aws:iam::123456789012:role/GitHubActionsRole")]
        role_arn: String,

        /// Overwrite an existing definition
        #[clap(short, long)]
        force: bool,
    },

    /// Validate stages, dependencies and role configuration
    Validate {
        /// Definition file to validate
        #[clap(default_value = DEFAULT_DEFINITION_FILE)]
        definition: PathBuf,
    },

    /// Generate workflow and task files
    Synth {
        /// Definition file
        #[clap(default_value = DEFAULT_DEFINITION_FILE)]
        definition: PathBuf,

        /// Directory for workflow files
        #[clap(long, value_name = "DIR", default_value = crate::workflow::WORKFLOWS_DIR)]
        out_dir: PathBuf,

        /// Write nothing; fail if files on disk differ from the generated ones
        #[clap(long)]
        check: bool,
    },

    /// Show the stage dependency graph
    Graph {
        /// Definition file
        #[clap(default_value = DEFAULT_DEFINITION_FILE)]
        definition: PathBuf,

        /// Output format (text, dot, mermaid)
        #[clap(short, long, default_value = "text")]
        format: GraphFormat,
    },

    /// List local deploy commands
    Tasks {
        /// Definition file
        #[clap(default_value = DEFAULT_DEFINITION_FILE)]
        definition: PathBuf,
    },
}

/// Graph output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    Text,
    Dot,
    Mermaid,
}

impl std::str::FromStr for GraphFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "dot" => Ok(Self::Dot),
            "mermaid" => Ok(Self::Mermaid),
            _ => Err(format!("Unknown graph format: {}", s)),
        }
    }
}

/// Load a definition for a command handler
pub(crate) fn load_definition(path: &Path) -> Result<PipelineDefinition> {
    Ok(PipelineDefinition::from_file(path)?)
}

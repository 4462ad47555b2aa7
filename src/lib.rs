// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! # deployflow - CDK deployment workflow generator
//!
//! `deployflow` turns an ordered list of deployment stages into GitHub Actions
//! workflows for a multi-account CDK application.
//!
//! ## Features
//!
//! - **Stage graph validation** - Unknown, self, out-of-order and circular dependencies are rejected
//! - **Push pipeline** - Synthesize once, publish assets, deploy auto stages in dependency order
//! - **Manual dispatch** - Deploy or roll back any stage to a published assembly version
//! - **Local tasks** - The same deploy commands, runnable from a workstation
//!
//! ## Quick Start
//!
//! ```bash
//! # Create a starter definition
//! deployflow init --stack-prefix MyApp
//!
//! # Check it
//! deployflow validate
//!
//! # Write .github/workflows/deploy.yml and deploy-dispatch.yml
//! deployflow synth
//! ```

pub mod cli;
pub mod errors;
pub mod naming;
pub mod pipeline;
pub mod tasks;
pub mod workflow;

// Re-export commonly used types
pub use errors::{DeployflowError, DeployflowResult};
pub use pipeline::{synthesize, PipelineDefaults, PipelineDefinition, ResolvedStage, Stage, SynthOutput};
pub use workflow::Workflow;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! GitHub Actions workflow generation
//!
//! Builds the push-triggered deployment workflow and the manual dispatch
//! workflow from resolved stages, and renders them to YAML.

pub mod auto;
pub mod dispatch;
pub mod emitter;
pub mod schema;
pub mod steps;

pub use auto::{auto_needs, build_auto_graph, PUBLISH_ASSETS_JOB, SYNTH_JOB};
pub use dispatch::build_dispatch_graph;
pub use emitter::{FileStatus, GeneratedFile, WORKFLOWS_DIR};
pub use schema::{Job, Step, Workflow};

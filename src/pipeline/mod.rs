// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Pipeline definitions and stage processing
//!
//! Loading a definition, validating its stage graph, resolving stages into
//! deployable form and synthesizing the workflows.

mod compiler;
mod dag;
mod definition;
mod synth;
mod validation;

pub use compiler::{resolve, resolve_all, stage_job_id, ResolvedStage, ASSEMBLY_DIR, DEPLOY_JOB_PREFIX};
pub use dag::StageGraph;
pub use definition::*;
pub use synth::{synthesize, SynthOutput};
pub use validation::{StageValidator, ValidatedStages};

// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! End-to-end synthesis
//!
//! Turns a definition into workflows and local tasks. Nothing is produced
//! unless every stage validates and resolves.

use std::path::Path;

use serde::Serialize;

use crate::errors::{DeployflowError, DeployflowResult};
use crate::pipeline::{resolve_all, PipelineDefinition, ResolvedStage, StageValidator};
use crate::tasks::{ProjectTasks, TASKS_FILE};
use crate::workflow::emitter::{self, GeneratedFile};
use crate::workflow::{build_auto_graph, build_dispatch_graph, Workflow};

/// Everything generated from one definition
#[derive(Debug, Clone, Serialize)]
pub struct SynthOutput {
    /// Push-triggered workflow
    pub deploy: Workflow,
    /// Manual dispatch workflow, when enabled
    pub dispatch: Option<Workflow>,
    /// Local convenience commands
    pub tasks: ProjectTasks,
    /// Stages in declaration order
    pub resolved: Vec<ResolvedStage>,
}

impl SynthOutput {
    /// Render all outputs as files.
    ///
    /// Workflows land in `workflows_dir`, the tasks file at its fixed
    /// location relative to the project root.
    pub fn files(&self, workflows_dir: &Path) -> DeployflowResult<Vec<GeneratedFile>> {
        let mut files = vec![emitter::render_workflow(&self.deploy, workflows_dir)?];
        if let Some(dispatch) = &self.dispatch {
            files.push(emitter::render_workflow(dispatch, workflows_dir)?);
        }
        files.push(GeneratedFile {
            path: TASKS_FILE.into(),
            contents: emitter::render_yaml(&self.tasks)?,
        });
        Ok(files)
    }
}

/// Validate, resolve and build both workflows
pub fn synthesize(definition: &PipelineDefinition) -> DeployflowResult<SynthOutput> {
    let defaults = &definition.defaults;
    let validated = StageValidator::validate(&definition.stages)?;

    if defaults.use_github_packages_for_assembly
        && defaults
            .pkg_namespace
            .as_deref()
            .map_or(true, |ns| ns.trim().is_empty())
    {
        return Err(DeployflowError::missing_namespace());
    }

    let resolved = resolve_all(&validated, defaults)?;
    let publish_role = defaults
        .pipeline_role_arn()
        .ok_or_else(DeployflowError::missing_pipeline_role_arn)?;

    let mut tasks = ProjectTasks::new();
    let deploy = build_auto_graph(&resolved, defaults, publish_role, &mut tasks);
    let dispatch = defaults
        .dispatch_enabled()
        .then(|| build_dispatch_graph(&resolved, defaults));

    tracing::debug!(
        stages = resolved.len(),
        auto_jobs = deploy.jobs.len(),
        dispatch = dispatch.is_some(),
        "synthesized workflows"
    );

    Ok(SynthOutput {
        deploy,
        dispatch,
        tasks,
        resolved,
    })
}

// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Manual deployment and rollback workflow
//!
//! One job per stage, manual-approval stages included. Each run targets a
//! single stage chosen through the `environment` input and deploys a
//! previously published assembly version. Jobs have no `needs` between
//! them; every job other than the chosen one is skipped by its `if` guard.

use indexmap::IndexMap;

use super::schema::{
    Concurrency, InputType, Job, Step, Workflow, WorkflowDispatchTrigger, WorkflowInput,
    WorkflowTriggers,
};
use super::steps;
use crate::pipeline::{PipelineDefaults, ResolvedStage};

/// Workflow name and file stem
pub const DISPATCH_WORKFLOW: &str = "deploy-dispatch";
pub const ENVIRONMENT_INPUT: &str = "environment";
pub const VERSION_INPUT: &str = "version";

/// Build the dispatch workflow.
///
/// Only meaningful when assembly versioning is enabled, since every job
/// replays a published assembly version.
pub fn build_dispatch_graph(stages: &[ResolvedStage], defaults: &PipelineDefaults) -> Workflow {
    let mut inputs = IndexMap::new();
    inputs.insert(
        ENVIRONMENT_INPUT.to_string(),
        WorkflowInput {
            description: "Target environment to deploy to".to_string(),
            required: true,
            input_type: InputType::Choice,
            options: stages.iter().map(|s| s.gating_environment.clone()).collect(),
        },
    );
    inputs.insert(
        VERSION_INPUT.to_string(),
        WorkflowInput {
            description: "Assembly version to deploy (e.g., 1.3.4)".to_string(),
            required: true,
            input_type: InputType::String,
            options: Vec::new(),
        },
    );

    let jobs = stages
        .iter()
        .map(|stage| (stage.job_id.clone(), dispatch_job(stage, defaults)))
        .collect();

    Workflow {
        name: DISPATCH_WORKFLOW.to_string(),
        on: WorkflowTriggers {
            push: None,
            workflow_dispatch: Some(WorkflowDispatchTrigger { inputs }),
        },
        jobs,
    }
}

/// Run-time guard selecting the job for the chosen environment.
///
/// Expression string literals escape `'` by doubling it.
pub fn environment_guard(gating_environment: &str) -> String {
    format!(
        "github.event.inputs.{} == '{}'",
        ENVIRONMENT_INPUT,
        gating_environment.replace('\'', "''")
    )
}

/// Fetch `{namespace}/{app}@<version>` from GitHub Packages and unpack it as `cdk.out`
fn download_versioned_assembly(defaults: &PipelineDefaults) -> Step {
    let command = format!(
        "npm pack {}/{}@${{{{ github.event.inputs.{} }}}} --registry={} && tar -xzf *.tgz && mv package cdk.out",
        defaults.pkg_namespace.as_deref().unwrap_or_default(),
        defaults.app_name(),
        VERSION_INPUT,
        steps::GITHUB_PACKAGES_REGISTRY
    );
    steps::with_package_token(Step::run(command).with_name("Download versioned assembly"))
}

fn dispatch_job(stage: &ResolvedStage, defaults: &PipelineDefaults) -> Job {
    let mut job_steps = steps::prepare(defaults);
    job_steps.push(download_versioned_assembly(defaults));
    job_steps.push(steps::aws_credentials(&stage.role_arn, &stage.role_region));
    job_steps.push(steps::deploy(stage));

    Job {
        name: format!("Deploy {} (manual)", stage.name),
        needs: Vec::new(),
        if_condition: Some(environment_guard(&stage.gating_environment)),
        runs_on: steps::runs_on(),
        defaults: steps::job_defaults(defaults),
        environment: Some(stage.gating_environment.clone()),
        concurrency: Some(Concurrency {
            group: stage.concurrency_group.clone(),
            cancel_in_progress: false,
        }),
        permissions: steps::deploy_permissions(),
        env: steps::job_env(),
        steps: job_steps,
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Stage compilation
//!
//! Resolves the effective settings of each stage. Every overridable field
//! follows the same precedence: stage value, then pipeline default, then
//! a hard-coded fallback.

use serde::Serialize;

use crate::errors::DeployflowError;
use crate::naming::{to_job_id, to_kebab_case};
use crate::pipeline::{PipelineDefaults, Stage, ValidatedStages};

/// Prefix of every per-stage job id
pub const DEPLOY_JOB_PREFIX: &str = "deploy-";

/// Relative path of the cloud assembly passed to `cdk deploy --app`
pub const ASSEMBLY_DIR: &str = "cdk.out";

/// Effective settings of one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedStage {
    /// Stage name as declared
    pub name: String,
    /// Workflow job id, `deploy-<kebab(name)>`
    pub job_id: String,
    /// Concurrency group shared by every run deploying this stage
    pub concurrency_group: String,
    /// GitHub Environment gating the job
    pub gating_environment: String,
    /// Target AWS account
    pub account: String,
    /// OIDC role to assume
    pub role_arn: String,
    /// Region used when assuming the role
    pub role_region: String,
    /// CDK stacks deployed by this stage, in order
    pub stacks: Vec<String>,
    /// Deploy command run in CI against the downloaded assembly
    pub deploy_command: String,
    /// Deploy command for local use, synthesizing on the fly
    pub local_command: String,
    /// Declared dependencies (stage names)
    pub depends_on: Vec<String>,
    /// Excluded from the push pipeline
    pub manual_approval: bool,
}

/// Job id for a stage name
pub fn stage_job_id(stage_name: &str) -> String {
    to_job_id(&format!("{}{}", DEPLOY_JOB_PREFIX, to_kebab_case(stage_name)))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Resolve the effective settings of a stage
pub fn resolve(stage: &Stage, defaults: &PipelineDefaults) -> Result<ResolvedStage, DeployflowError> {
    let role_arn = non_empty(stage.iam_role_arn.as_deref())
        .or(non_empty(defaults.iam_role_arn.as_deref()))
        .ok_or_else(|| DeployflowError::missing_role_arn(&stage.name))?
        .to_string();

    let role_region = non_empty(stage.iam_role_region.as_deref())
        .or(non_empty(Some(defaults.iam_role_region.as_str())))
        .unwrap_or(&stage.env.region)
        .to_string();

    let gating_environment = non_empty(stage.environment.as_deref())
        .unwrap_or(&stage.name)
        .to_string();

    let stacks = match &stage.stacks {
        Some(stacks) if !stacks.is_empty() => stacks.clone(),
        _ => vec![format!("{}-{}", defaults.stack_prefix, stage.name)],
    };

    let job_id = stage_job_id(&stage.name);

    let resolved = ResolvedStage {
        name: stage.name.clone(),
        concurrency_group: job_id.clone(),
        job_id,
        gating_environment,
        account: stage.env.account.clone(),
        role_arn,
        role_region,
        deploy_command: deploy_command(&defaults.cdk_command, &stacks, Some(ASSEMBLY_DIR)),
        local_command: deploy_command(&defaults.cdk_command, &stacks, None),
        stacks,
        depends_on: stage.depends_on.clone(),
        manual_approval: stage.manual_approval,
    };

    tracing::debug!(
        stage = %resolved.name,
        job = %resolved.job_id,
        environment = %resolved.gating_environment,
        "stage resolved"
    );

    Ok(resolved)
}

/// Resolve every validated stage, in declaration order
pub fn resolve_all(
    validated: &ValidatedStages<'_>,
    defaults: &PipelineDefaults,
) -> Result<Vec<ResolvedStage>, DeployflowError> {
    validated
        .stages()
        .iter()
        .map(|stage| resolve(stage, defaults))
        .collect()
}

/// One `cdk deploy` per stack, chained with `&&` so a failure stops the rest
fn deploy_command(cdk_command: &str, stacks: &[String], app: Option<&str>) -> String {
    stacks
        .iter()
        .map(|stack| match app {
            Some(app) => format!("{cdk_command} deploy {stack} --require-approval never --app {app}"),
            None => format!("{cdk_command} deploy {stack} --require-approval never"),
        })
        .collect::<Vec<_>>()
        .join(" && ")
}

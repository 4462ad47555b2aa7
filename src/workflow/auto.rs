// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Push-triggered deployment workflow
//!
//! `synth` builds the cloud assembly, `publish-assets` uploads its assets
//! (and optionally a versioned copy of the assembly), then one job per
//! auto-deploy stage deploys it. Manual-approval stages are left out.

use indexmap::IndexMap;

use super::schema::{
    Concurrency, Job, PushTrigger, Step, Workflow, WorkflowDispatchTrigger, WorkflowTriggers,
};
use super::steps;
use crate::pipeline::{stage_job_id, PipelineDefaults, ResolvedStage};
use crate::tasks::{LocalTask, TaskRegistry};

/// Workflow name and file stem
pub const AUTO_WORKFLOW: &str = "deploy";
pub const SYNTH_JOB: &str = "synth";
pub const PUBLISH_ASSETS_JOB: &str = "publish-assets";

/// Build the push-triggered workflow.
///
/// `publish_role` is the role `publish-assets` assumes; that job belongs to
/// no stage, so it always uses the pipeline-level role. Registers a local
/// `deploy:<Stage>` task for every stage it includes.
pub fn build_auto_graph(
    stages: &[ResolvedStage],
    defaults: &PipelineDefaults,
    publish_role: &str,
    tasks: &mut impl TaskRegistry,
) -> Workflow {
    let mut jobs = IndexMap::new();
    jobs.insert(SYNTH_JOB.to_string(), synth_job(defaults));
    jobs.insert(
        PUBLISH_ASSETS_JOB.to_string(),
        publish_assets_job(defaults, publish_role),
    );

    for stage in stages.iter().filter(|s| !s.manual_approval) {
        tracing::debug!(job = %stage.job_id, needs = ?auto_needs(stage), "adding deploy job");
        jobs.insert(stage.job_id.clone(), deploy_job(stage, defaults));

        tasks.add_task(
            &format!("deploy:{}", stage.name),
            LocalTask {
                description: format!("Deploy to {}", stage.name),
                exec: stage.local_command.clone(),
            },
        );
    }

    Workflow {
        name: AUTO_WORKFLOW.to_string(),
        on: WorkflowTriggers {
            push: Some(PushTrigger {
                branches: vec![defaults.branch_name.clone()],
            }),
            workflow_dispatch: Some(WorkflowDispatchTrigger::default()),
        },
        jobs,
    }
}

/// Jobs a stage waits for: its declared dependencies, or `publish-assets` when it has none
pub fn auto_needs(stage: &ResolvedStage) -> Vec<String> {
    if stage.depends_on.is_empty() {
        vec![PUBLISH_ASSETS_JOB.to_string()]
    } else {
        stage.depends_on.iter().map(|dep| stage_job_id(dep)).collect()
    }
}

fn synth_job(defaults: &PipelineDefaults) -> Job {
    Job {
        name: "Synthesize CDK application".to_string(),
        needs: Vec::new(),
        if_condition: None,
        runs_on: steps::runs_on(),
        defaults: steps::job_defaults(defaults),
        environment: None,
        concurrency: None,
        permissions: steps::read_permissions(),
        env: steps::job_env(),
        steps: vec![
            steps::checkout_full_history(),
            steps::setup_node(defaults),
            steps::install(defaults),
            Step::run(format!("{} synth", defaults.cdk_command)).with_name("Synth"),
            steps::upload_assembly(defaults),
        ],
    }
}

fn publish_assets_job(defaults: &PipelineDefaults, role_arn: &str) -> Job {
    let mut job_steps = vec![
        steps::checkout_full_history(),
        steps::setup_node(defaults),
        steps::install(defaults),
        steps::download_assembly(defaults),
        steps::aws_credentials(role_arn, &defaults.iam_role_region),
        Step::run(
            "for manifest in $(find cdk.out -name \"*-assets.json\"); do npx cdk-assets publish -p \"$manifest\"; done",
        )
        .with_name("Publish assets"),
    ];

    if defaults.use_github_packages_for_assembly {
        job_steps.extend(versioning_steps(defaults));
    }

    Job {
        name: "Publish assets to AWS".to_string(),
        needs: vec![SYNTH_JOB.to_string()],
        if_condition: None,
        runs_on: steps::runs_on(),
        defaults: steps::job_defaults(defaults),
        environment: None,
        concurrency: None,
        permissions: steps::publish_permissions(),
        env: steps::job_env(),
        steps: job_steps,
    }
}

/// Package the assembly under `{namespace}/{app}` with the next patch version and publish it
fn versioning_steps(defaults: &PipelineDefaults) -> Vec<Step> {
    let package = format!(
        "{}/{}",
        defaults.pkg_namespace.as_deref().unwrap_or_default(),
        defaults.app_name()
    );
    let manifest = serde_json::json!({
        "name": package,
        "publishConfig": { "registry": steps::GITHUB_PACKAGES_REGISTRY },
    });

    let create_package = [
        format!("PKG_NAME=\"{}\"", package),
        format!(
            "LATEST=$(npm view \"$PKG_NAME\" version --registry={} 2>/dev/null || echo \"0.0.0\")",
            steps::GITHUB_PACKAGES_REGISTRY
        ),
        format!(
            "echo '{}' | jq --arg v \"$LATEST\" '. + {{version: $v}}' > cdk.out/package.json",
            manifest
        ),
        "cd cdk.out && npm version --no-git-tag-version patch".to_string(),
    ]
    .join("\n");

    vec![
        Step::run(
            [
                "git config user.name \"github-actions[bot]\"",
                "git config user.email \"41898282+github-actions[bot]@users.noreply.github.com\"",
            ]
            .join("\n"),
        )
        .with_name("Configure git identity"),
        steps::with_package_token(Step::run(create_package).with_name("Create assembly package")),
        steps::with_package_token(
            Step::run(format!(
                "cd cdk.out && npm publish --registry={}",
                steps::GITHUB_PACKAGES_REGISTRY
            ))
            .with_name("Publish assembly to GitHub Packages"),
        ),
    ]
}

fn deploy_job(stage: &ResolvedStage, defaults: &PipelineDefaults) -> Job {
    let mut job_steps = steps::prepare(defaults);
    job_steps.push(steps::download_assembly(defaults));
    job_steps.push(steps::aws_credentials(&stage.role_arn, &stage.role_region));
    job_steps.push(steps::deploy(stage));

    Job {
        name: format!("Deploy {}", stage.name),
        needs: auto_needs(stage),
        if_condition: None,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{resolve, Stage};
    use crate::tasks::ProjectTasks;

    const ROLE: &str = "arn:aws:iam::111111111111:role/GitHubOidc";

    fn defaults() -> PipelineDefaults {
        PipelineDefaults::new("TestApp", ROLE)
            .with_pkg_namespace("@test-org")
    }

    fn resolved(stages: &[Stage]) -> Vec<ResolvedStage> {
        stages.iter().map(|s| resolve(s, &defaults()).unwrap()).collect()
    }

    #[test]
    fn test_infrastructure_jobs_come_first() {
        let stages = resolved(&[Stage::new("Dev", "222222222222", "us-east-1")]);
        let workflow = build_auto_graph(&stages, &defaults(), ROLE, &mut ProjectTasks::new());

        assert_eq!(workflow.job_ids(), vec!["synth", "publish-assets", "deploy-dev"]);
        assert!(workflow.job("synth").unwrap().needs.is_empty());
        assert_eq!(workflow.job("publish-assets").unwrap().needs, vec!["synth"]);
    }

    #[test]
    fn test_stage_without_dependencies_needs_publish_assets() {
        let stages = resolved(&[Stage::new("Dev", "222222222222", "us-east-1")]);
        let workflow = build_auto_graph(&stages, &defaults(), ROLE, &mut ProjectTasks::new());

        let job = workflow.job("deploy-dev").unwrap();
        assert_eq!(job.needs, vec!["publish-assets"]);
        assert_eq!(job.environment.as_deref(), Some("Dev"));
        assert_eq!(
            job.concurrency,
            Some(Concurrency {
                group: "deploy-dev".into(),
                cancel_in_progress: false,
            })
        );
    }

    #[test]
    fn test_manual_stages_are_skipped() {
        let stages = resolved(&[
            Stage::new("Dev", "222222222222", "us-east-1"),
            Stage::new("Production", "333333333333", "us-east-1").with_manual_approval(),
        ]);
        let mut tasks = ProjectTasks::new();
        let workflow = build_auto_graph(&stages, &defaults(), ROLE, &mut tasks);

        assert!(workflow.job("deploy-production").is_none());
        assert!(tasks.get("deploy:Production").is_none());
        assert_eq!(
            tasks.get("deploy:Dev").unwrap().exec,
            "npx cdk deploy TestApp-Dev --require-approval never"
        );
    }

    #[test]
    fn test_versioning_steps_toggle() {
        let stages = resolved(&[Stage::new("Dev", "222222222222", "us-east-1")]);
        let step_names = |defaults: &PipelineDefaults| -> Vec<String> {
            build_auto_graph(&stages, defaults, ROLE, &mut ProjectTasks::new())
                .job(PUBLISH_ASSETS_JOB)
                .unwrap()
                .steps
                .iter()
                .filter_map(|s| s.name.clone())
                .collect()
        };

        let with_versioning = step_names(&defaults());
        assert!(with_versioning.contains(&"Publish assembly to GitHub Packages".to_string()));

        let mut plain = defaults();
        plain.use_github_packages_for_assembly = false;
        let without = step_names(&plain);
        assert_eq!(without.last().map(String::as_str), Some("Publish assets"));
    }

    #[test]
    fn test_package_name_uses_namespace_and_app() {
        let steps = versioning_steps(&defaults());
        let create = steps[1].run.as_deref().unwrap();
        assert!(create.starts_with("PKG_NAME=\"@test-org/testapp\""));
        assert!(create.contains("\"publishConfig\":{\"registry\":\"https://npm.pkg.github.com\"}"));
    }

    #[test]
    fn test_publish_assets_assumes_pipeline_role() {
        let stages = resolved(&[Stage::new("Dev", "222222222222", "us-east-1")
            .with_iam_role_arn("arn:aws:iam::222222222222:role/Dev")]);
        let workflow = build_auto_graph(&stages, &defaults(), ROLE, &mut ProjectTasks::new());

        let credentials = |job: &str| {
            workflow
                .job(job)
                .unwrap()
                .steps
                .iter()
                .find(|s| s.name.as_deref() == Some("AWS Credentials"))
                .unwrap()
                .with_inputs["role-to-assume"]
                .clone()
        };
        assert_eq!(credentials(PUBLISH_ASSETS_JOB), serde_yaml::Value::from(ROLE));
        assert_eq!(
            credentials("deploy-dev"),
            serde_yaml::Value::from("arn:aws:iam::222222222222:role/Dev")
        );
    }
}

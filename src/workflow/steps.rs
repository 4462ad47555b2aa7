// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Shared job pieces
//!
//! Steps, permissions and job settings used by both generated workflows.

use indexmap::IndexMap;

use super::schema::{Defaults, PermissionLevel, Permissions, RunDefaults, RunsOn, Step};
use crate::pipeline::{PipelineDefaults, ResolvedStage};

pub const CHECKOUT_VERSION: &str = "v5";
pub const SETUP_NODE_VERSION: &str = "v5";
pub const AWS_CREDENTIALS_VERSION: &str = "v5";
pub const UPLOAD_ARTIFACT_VERSION: &str = "v4";
pub const DOWNLOAD_ARTIFACT_VERSION: &str = "v5";

/// npm registry backing GitHub Packages
pub const GITHUB_PACKAGES_REGISTRY: &str = "https://npm.pkg.github.com";

/// Artifact name of the synthesized cloud assembly
pub const ASSEMBLY_ARTIFACT: &str = "cloud-assembly";

const GITHUB_TOKEN_EXPR: &str = "${{ secrets.GITHUB_TOKEN }}";

/// Runner for every generated job
pub fn runs_on() -> RunsOn {
    RunsOn::Labels(vec!["ubuntu-latest".to_string()])
}

/// `CI=true` for every generated job
pub fn job_env() -> IndexMap<String, String> {
    IndexMap::from([("CI".to_string(), "true".to_string())])
}

/// `defaults.run.working-directory`, only when a working directory is configured
pub fn job_defaults(defaults: &PipelineDefaults) -> Option<Defaults> {
    defaults.normalized_working_directory().map(|dir| Defaults {
        run: RunDefaults {
            working_directory: dir.to_string(),
        },
    })
}

/// Read-only contents and packages
pub fn read_permissions() -> Permissions {
    Permissions {
        contents: Some(PermissionLevel::Read),
        packages: Some(PermissionLevel::Read),
        id_token: None,
    }
}

/// Read-only contents and packages, plus an OIDC token for AWS
pub fn deploy_permissions() -> Permissions {
    Permissions {
        id_token: Some(PermissionLevel::Write),
        ..read_permissions()
    }
}

/// Write access to contents and packages, plus an OIDC token for AWS
pub fn publish_permissions() -> Permissions {
    Permissions {
        contents: Some(PermissionLevel::Write),
        packages: Some(PermissionLevel::Write),
        id_token: Some(PermissionLevel::Write),
    }
}

/// Attach the token env vars needed to reach GitHub Packages
pub fn with_package_token(step: Step) -> Step {
    step.with_env("NODE_AUTH_TOKEN", GITHUB_TOKEN_EXPR)
        .with_env("GITHUB_TOKEN", GITHUB_TOKEN_EXPR)
}

pub fn checkout() -> Step {
    Step::uses(format!("actions/checkout@{}", CHECKOUT_VERSION)).with_name("Checkout")
}

/// Checkout with full history, needed for versioning
pub fn checkout_full_history() -> Step {
    checkout().with_input("fetch-depth", 0)
}

pub fn setup_node(defaults: &PipelineDefaults) -> Step {
    Step::uses(format!("actions/setup-node@{}", SETUP_NODE_VERSION))
        .with_name("Setup Node.js")
        .with_input("node-version", defaults.node_version.as_str())
        .with_input("registry-url", GITHUB_PACKAGES_REGISTRY)
}

pub fn install(defaults: &PipelineDefaults) -> Step {
    with_package_token(Step::run(defaults.install_command.as_str()).with_name("Install dependencies"))
}

pub fn upload_assembly(defaults: &PipelineDefaults) -> Step {
    Step::uses(format!("actions/upload-artifact@{}", UPLOAD_ARTIFACT_VERSION))
        .with_name("Upload cloud assembly")
        .with_input("name", ASSEMBLY_ARTIFACT)
        .with_input("path", defaults.assembly_path())
}

pub fn download_assembly(defaults: &PipelineDefaults) -> Step {
    Step::uses(format!("actions/download-artifact@{}", DOWNLOAD_ARTIFACT_VERSION))
        .with_name("Download cloud assembly")
        .with_input("name", ASSEMBLY_ARTIFACT)
        .with_input("path", defaults.assembly_path())
}

/// Assume an AWS role through GitHub OIDC
pub fn aws_credentials(role_arn: &str, region: &str) -> Step {
    Step::uses(format!(
        "aws-actions/configure-aws-credentials@{}",
        AWS_CREDENTIALS_VERSION
    ))
    .with_name("AWS Credentials")
    .with_input("role-to-assume", role_arn)
    .with_input("role-session-name", "GitHubAction")
    .with_input("aws-region", region)
}

/// The stage's chained `cdk deploy` invocations
pub fn deploy(stage: &ResolvedStage) -> Step {
    Step::run(stage.deploy_command.as_str()).with_name(format!("Deploy {}", stage.name))
}

/// Steps shared by every deploy job before the assembly is fetched
pub fn prepare(defaults: &PipelineDefaults) -> Vec<Step> {
    vec![checkout(), setup_node(defaults), install(defaults)]
}

// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Pipeline definition structures
//!
//! Defines the schema for .deployflow.yaml files.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::DeployflowError;

/// Default definition file name
pub const DEFAULT_DEFINITION_FILE: &str = ".deployflow.yaml";

/// Pipeline definition from .deployflow.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineDefinition {
    /// Pipeline-level defaults
    #[serde(flatten)]
    pub defaults: PipelineDefaults,

    /// Deployment stages in declaration order
    pub stages: Vec<Stage>,
}

impl PipelineDefinition {
    /// Load a definition, picking the format from the file extension
    pub fn from_file(path: &Path) -> Result<Self, DeployflowError> {
        if !path.exists() {
            return Err(DeployflowError::DefinitionNotFound {
                path: path.to_path_buf(),
            });
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| DeployflowError::FileReadError {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml(&content),
            Some("json") => serde_json::from_str(&content).map_err(Into::into),
            Some("toml") => toml::from_str(&content).map_err(Into::into),
            _ => Err(DeployflowError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Parse a definition from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, DeployflowError> {
        serde_yaml::from_str(yaml).map_err(Into::into)
    }

    /// Serialize the definition to YAML
    pub fn to_yaml(&self) -> Result<String, DeployflowError> {
        serde_yaml::to_string(self).map_err(Into::into)
    }

    /// Get all stage names
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name.as_str()).collect()
    }
}

/// AWS target for a deployment stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsEnvironment {
    /// AWS account ID
    pub account: String,
    /// AWS region
    pub region: String,
}

/// A single deployment stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    /// Stage name (unique, case-sensitive). Used in job ids and stack names.
    pub name: String,

    /// AWS target environment
    pub env: AwsEnvironment,

    /// GitHub Environment used for protection rules and approvals.
    /// Defaults to the stage name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,

    /// Override of the pipeline OIDC role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iam_role_arn: Option<String>,

    /// Override of the region used for credential assumption
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iam_role_region: Option<String>,

    /// Stages that must deploy successfully first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    /// CDK stacks to deploy. Defaults to `{stackPrefix}-{name}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stacks: Option<Vec<String>>,

    /// Exclude from the push pipeline; deployable only through dispatch
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub manual_approval: bool,
}

impl Stage {
    /// Create a stage targeting the given account and region
    pub fn new(name: impl Into<String>, account: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            env: AwsEnvironment {
                account: account.into(),
                region: region.into(),
            },
            environment: None,
            iam_role_arn: None,
            iam_role_region: None,
            depends_on: Vec::new(),
            stacks: None,
            manual_approval: false,
        }
    }

    /// Set the dependencies
    pub fn with_depends_on<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = deps.into_iter().map(Into::into).collect();
        self
    }

    /// Set the GitHub Environment name
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Mark the stage as manual-approval only
    pub fn with_manual_approval(mut self) -> Self {
        self.manual_approval = true;
        self
    }

    /// Set explicit stacks
    pub fn with_stacks<I, S>(mut self, stacks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stacks = Some(stacks.into_iter().map(Into::into).collect());
        self
    }

    /// Override the role used for this stage
    pub fn with_iam_role_arn(mut self, arn: impl Into<String>) -> Self {
        self.iam_role_arn = Some(arn.into());
        self
    }

    /// Override the credential region for this stage
    pub fn with_iam_role_region(mut self, region: impl Into<String>) -> Self {
        self.iam_role_region = Some(region.into());
        self
    }

    /// Whether this stage is part of the push-triggered pipeline
    pub fn is_auto_deploy(&self) -> bool {
        !self.manual_approval
    }
}

/// Pipeline-level defaults shared by every stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineDefaults {
    /// npm scope for versioned cloud assembly packages (e.g. '@my-org')
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pkg_namespace: Option<String>,

    /// Stack name prefix; stage names are appended with a dash
    pub stack_prefix: String,

    /// Default OIDC role ARN
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iam_role_arn: Option<String>,

    /// Default region for credential assumption
    #[serde(default = "default_role_region")]
    pub iam_role_region: String,

    /// Node.js version for workflow runners
    #[serde(default = "default_node_version")]
    pub node_version: String,

    /// CDK CLI command prefix
    #[serde(default = "default_cdk_command")]
    pub cdk_command: String,

    /// Package install command
    #[serde(default = "default_install_command")]
    pub install_command: String,

    /// Generate the manual dispatch workflow
    #[serde(default = "default_true")]
    pub manual_deployment: bool,

    /// Version and publish the cloud assembly to GitHub Packages
    #[serde(default = "default_true")]
    pub use_github_packages_for_assembly: bool,

    /// Branch whose pushes trigger deployments
    #[serde(default = "default_branch")]
    pub branch_name: String,

    /// CDK app directory relative to the repository root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,

    /// Package name of the versioned assembly. Defaults to the lowercased stack prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
}

impl PipelineDefaults {
    /// Defaults for a stack prefix and role, everything else at its fallback
    pub fn new(stack_prefix: impl Into<String>, iam_role_arn: impl Into<String>) -> Self {
        Self {
            pkg_namespace: None,
            stack_prefix: stack_prefix.into(),
            iam_role_arn: Some(iam_role_arn.into()),
            iam_role_region: default_role_region(),
            node_version: default_node_version(),
            cdk_command: default_cdk_command(),
            install_command: default_install_command(),
            manual_deployment: true,
            use_github_packages_for_assembly: true,
            branch_name: default_branch(),
            working_directory: None,
            app_name: None,
        }
    }

    /// Set the package namespace
    pub fn with_pkg_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.pkg_namespace = Some(namespace.into());
        self
    }

    /// Set the working directory
    pub fn with_working_directory(mut self, dir: impl Into<String>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    /// Resolved assembly package name
    pub fn app_name(&self) -> String {
        self.app_name
            .clone()
            .unwrap_or_else(|| self.stack_prefix.to_lowercase())
    }

    /// Working directory with trailing separators removed.
    ///
    /// Returns `None` when unset or when nothing remains after normalization.
    pub fn normalized_working_directory(&self) -> Option<&str> {
        self.working_directory
            .as_deref()
            .map(|d| d.trim_end_matches('/'))
            .filter(|d| !d.is_empty())
    }

    /// Path of the synthesized cloud assembly, relative to the repository root
    pub fn assembly_path(&self) -> String {
        match self.normalized_working_directory() {
            Some(dir) => format!("{}/cdk.out/", dir),
            None => "cdk.out/".to_string(),
        }
    }

    /// Pipeline-level role, ignoring an empty value
    pub fn pipeline_role_arn(&self) -> Option<&str> {
        self.iam_role_arn.as_deref().filter(|arn| !arn.trim().is_empty())
    }

    /// Whether the dispatch workflow should be generated
    pub fn dispatch_enabled(&self) -> bool {
        self.manual_deployment && self.use_github_packages_for_assembly
    }
}

fn default_role_region() -> String {
    "us-east-1".to_string()
}

fn default_node_version() -> String {
    "24.x".to_string()
}

fn default_cdk_command() -> String {
    "npx cdk".to_string()
}

fn default_install_command() -> String {
    "yarn install --check-files --frozen-lockfile".to_string()
}

fn default_true() -> bool {
    true
}

fn default_branch() -> String {
    "main".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_definition() {
        let yaml = r#"
pkgNamespace: "@test-org"
stackPrefix: TestApp
iamRoleArn: arn:aws:iam::111111111111:role/GitHubOidc
stages:
  - name: Dev
    env:
      account: "222222222222"
      region: us-east-1
"#;

        let def = PipelineDefinition::from_yaml(yaml).unwrap();
        assert_eq!(def.stages.len(), 1);
        assert_eq!(def.defaults.iam_role_region, "us-east-1");
        assert_eq!(def.defaults.node_version, "24.x");
        assert_eq!(def.defaults.cdk_command, "npx cdk");
        assert_eq!(
            def.defaults.install_command,
            "yarn install --check-files --frozen-lockfile"
        );
        assert!(def.defaults.manual_deployment);
        assert!(def.defaults.use_github_packages_for_assembly);
        assert_eq!(def.defaults.branch_name, "main");
        assert!(!def.stages[0].manual_approval);
    }

    #[test]
    fn test_parse_stage_options() {
        let yaml = r#"
stackPrefix: TestApp
stages:
  - name: Production
    env: { account: "333333333333", region: eu-west-1 }
    environment: production
    iamRoleArn: arn:aws:iam::333333333333:role/Prod
    iamRoleRegion: eu-west-1
    dependsOn: [Sandbox, Dev]
    stacks: [Api, Web]
    manualApproval: true
"#;

        let def = PipelineDefinition::from_yaml(yaml).unwrap();
        let stage = &def.stages[0];
        assert_eq!(stage.environment.as_deref(), Some("production"));
        assert_eq!(stage.depends_on, vec!["Sandbox", "Dev"]);
        assert_eq!(stage.stacks.as_deref(), Some(&["Api".to_string(), "Web".to_string()][..]));
        assert!(stage.manual_approval);
        assert!(!stage.is_auto_deploy());
    }

    #[test]
    fn test_working_directory_normalization() {
        let defaults = PipelineDefaults::new("App", "arn").with_working_directory("infra/");
        assert_eq!(defaults.normalized_working_directory(), Some("infra"));
        assert_eq!(defaults.assembly_path(), "infra/cdk.out/");

        let root = PipelineDefaults::new("App", "arn");
        assert_eq!(root.normalized_working_directory(), None);
        assert_eq!(root.assembly_path(), "cdk.out/");
    }

    #[test]
    fn test_app_name_defaults_to_lowercase_prefix() {
        let defaults = PipelineDefaults::new("TestApp", "arn");
        assert_eq!(defaults.app_name(), "testapp");
    }

    #[test]
    fn test_round_trip_yaml() {
        let def = PipelineDefinition {
            defaults: PipelineDefaults::new("App", "arn:aws:iam::1:role/R")
                .with_pkg_namespace("@org"),
            stages: vec![
                Stage::new("Dev", "1", "us-east-1"),
                Stage::new("Prod", "2", "us-west-2").with_depends_on(["Dev"]),
            ],
        };

        let yaml = def.to_yaml().unwrap();
        let parsed = PipelineDefinition::from_yaml(&yaml).unwrap();

        assert_eq!(parsed.defaults, def.defaults);
        assert_eq!(parsed.stages, def.stages);
    }
}

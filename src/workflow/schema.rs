// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! GitHub Actions workflow model
//!
//! The job graph handed to the emitter. Maps preserve insertion order so
//! the rendered file follows the order jobs and inputs were added.
//! See: <https://docs.github.com/en/actions/using-workflows/workflow-syntax-for-github-actions>

use indexmap::IndexMap;
use serde::Serialize;

/// A GitHub Actions workflow definition
#[derive(Debug, Clone, Serialize)]
pub struct Workflow {
    /// Workflow name displayed in GitHub UI
    pub name: String,

    /// Trigger configuration
    #[serde(rename = "on")]
    pub on: WorkflowTriggers,

    /// Job definitions keyed by job id
    pub jobs: IndexMap<String, Job>,
}

impl Workflow {
    /// Get a job by id
    pub fn job(&self, id: &str) -> Option<&Job> {
        self.jobs.get(id)
    }

    /// Job ids in order
    pub fn job_ids(&self) -> Vec<&str> {
        self.jobs.keys().map(String::as_str).collect()
    }
}

/// Workflow trigger configuration
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkflowTriggers {
    /// Trigger on push events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push: Option<PushTrigger>,

    /// Manual trigger with optional inputs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_dispatch: Option<WorkflowDispatchTrigger>,
}

/// Push event trigger configuration
#[derive(Debug, Clone, Default, Serialize)]
pub struct PushTrigger {
    /// Branches to trigger on
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<String>,
}

/// Manual workflow dispatch trigger configuration
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkflowDispatchTrigger {
    /// Input parameters for manual trigger
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub inputs: IndexMap<String, WorkflowInput>,
}

/// Input definition for `workflow_dispatch` triggers
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowInput {
    /// Human-readable description of the input
    pub description: String,

    /// Whether the input is required
    pub required: bool,

    /// Input type
    #[serde(rename = "type")]
    pub input_type: InputType,

    /// Allowed values for choice inputs
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// `workflow_dispatch` input types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    /// Free text
    String,
    /// One of `options`
    Choice,
}

/// Concurrency configuration for a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Concurrency {
    /// Concurrency group name
    pub group: String,

    /// Whether a new run cancels the one in progress
    pub cancel_in_progress: bool,
}

/// `GITHUB_TOKEN` permissions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Permissions {
    /// Repository contents permission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<PermissionLevel>,

    /// GitHub Packages permission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packages: Option<PermissionLevel>,

    /// OIDC token permission (for cloud authentication)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<PermissionLevel>,
}

/// Permission level for `GITHUB_TOKEN` scopes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    /// Read-only access
    Read,
    /// Read and write access
    Write,
}

/// Job-level defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Defaults {
    /// Defaults for `run` steps
    pub run: RunDefaults,
}

/// Defaults applied to every `run` step of a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RunDefaults {
    /// Directory `run` steps execute in
    pub working_directory: String,
}

/// Runner specification
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RunsOn {
    /// Single runner label
    Label(String),
    /// Runner must match all labels
    Labels(Vec<String>),
}

/// A job in a workflow
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Job {
    /// Job display name
    pub name: String,

    /// Jobs that must complete first
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub needs: Vec<String>,

    /// Conditional execution expression
    #[serde(rename = "if", skip_serializing_if = "Option::is_none")]
    pub if_condition: Option<String>,

    /// Runner label(s)
    pub runs_on: RunsOn,

    /// Defaults for run steps
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Defaults>,

    /// GitHub Environment gating the job
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,

    /// Job concurrency settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<Concurrency>,

    /// Token permissions
    pub permissions: Permissions,

    /// Job-level environment variables
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub env: IndexMap<String, String>,

    /// Job steps
    pub steps: Vec<Step>,
}

/// A step in a job; either `uses` an action or `run`s a command
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Step {
    /// Step display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Action to use (e.g., "actions/checkout@v5")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,

    /// Shell command(s) to run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,

    /// Action inputs
    #[serde(rename = "with", skip_serializing_if = "IndexMap::is_empty")]
    pub with_inputs: IndexMap<String, serde_yaml::Value>,

    /// Step environment variables
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub env: IndexMap<String, String>,
}

impl Step {
    /// Create a step that uses an action
    pub fn uses(action: impl Into<String>) -> Self {
        Self {
            uses: Some(action.into()),
            ..Default::default()
        }
    }

    /// Create a step that runs a shell command
    pub fn run(command: impl Into<String>) -> Self {
        Self {
            run: Some(command.into()),
            ..Default::default()
        }
    }

    /// Set the step name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a with input
    #[must_use]
    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<serde_yaml::Value>) -> Self {
        self.with_inputs.insert(key.into(), value.into());
        self
    }

    /// Add an environment variable
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_builder() {
        let step = Step::uses("actions/checkout@v5")
            .with_name("Checkout")
            .with_input("fetch-depth", 0);

        assert_eq!(step.name.as_deref(), Some("Checkout"));
        assert_eq!(step.uses.as_deref(), Some("actions/checkout@v5"));
        assert!(step.run.is_none());
        assert_eq!(step.with_inputs["fetch-depth"], serde_yaml::Value::from(0));
    }

    #[test]
    fn test_job_serialization_keys() {
        let job = Job {
            name: "Deploy Dev".into(),
            needs: vec!["publish-assets".into()],
            if_condition: None,
            runs_on: RunsOn::Labels(vec!["ubuntu-latest".into()]),
            defaults: Some(Defaults {
                run: RunDefaults {
                    working_directory: "infra".into(),
                },
            }),
            environment: Some("Dev".into()),
            concurrency: Some(Concurrency {
                group: "deploy-dev".into(),
                cancel_in_progress: false,
            }),
            permissions: Permissions {
                contents: Some(PermissionLevel::Read),
                packages: None,
                id_token: Some(PermissionLevel::Write),
            },
            env: IndexMap::new(),
            steps: vec![Step::run("echo hi")],
        };

        let yaml = serde_yaml::to_string(&job).unwrap();
        assert!(yaml.contains("runs-on:"));
        assert!(yaml.contains("working-directory: infra"));
        assert!(yaml.contains("cancel-in-progress: false"));
        assert!(yaml.contains("id-token: write"));
        assert!(!yaml.contains("packages"));
        assert!(!yaml.contains("if:"));
    }

    #[test]
    fn test_empty_dispatch_trigger() {
        let triggers = WorkflowTriggers {
            push: None,
            workflow_dispatch: Some(WorkflowDispatchTrigger::default()),
        };

        let yaml = serde_yaml::to_string(&triggers).unwrap();
        assert_eq!(yaml.trim(), "workflow_dispatch: {}");
    }
}

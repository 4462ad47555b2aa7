// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Error types
//!
//! Every pipeline-definition error is fatal and carries enough context to
//! find the offending stage declaration without reading generated output.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for deployflow operations
pub type DeployflowResult<T> = Result<T, DeployflowError>;

/// Main error type for deployflow
#[derive(Error, Debug, Diagnostic)]
pub enum DeployflowError {
    // ─────────────────────────────────────────────────────────────────────────
    // Stage Graph Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("At least one deployment stage must be defined")]
    #[diagnostic(
        code(deployflow::empty_stage_set),
        help("Add a stage under 'stages:', e.g. '- name: Dev'")
    )]
    EmptyStageSet,

    #[error("Stage '{stage}' is defined more than once")]
    #[diagnostic(
        code(deployflow::duplicate_stage),
        help("Stage names are case-sensitive and must be unique")
    )]
    DuplicateStage { stage: String },

    #[error("Stages '{first}' and '{second}' both map to job id '{job_id}'")]
    #[diagnostic(
        code(deployflow::job_id_collision),
        help("Rename one of the stages so their kebab-case forms differ")
    )]
    JobIdCollision {
        first: String,
        second: String,
        job_id: String,
    },

    #[error(
        "Stage '{stage}' depends on '{dependency}', which is not a defined stage. Available: {}",
        available.join(", ")
    )]
    #[diagnostic(
        code(deployflow::unknown_dependency),
        help("Check the spelling of '{dependency}' in the dependsOn list of '{stage}'")
    )]
    UnknownDependency {
        stage: String,
        dependency: String,
        available: Vec<String>,
    },

    #[error("Stage '{stage}' cannot depend on itself")]
    #[diagnostic(
        code(deployflow::self_dependency),
        help("Remove '{stage}' from its own dependsOn list")
    )]
    SelfDependency { stage: String },

    #[error("Stage '{stage}' lists '{dependency}' more than once in dependsOn")]
    #[diagnostic(
        code(deployflow::duplicate_dependency),
        help("Remove the repeated '{dependency}' entry from the dependsOn list of '{stage}'")
    )]
    DuplicateDependency { stage: String, dependency: String },

    #[error(
        "Stage '{stage}' depends on '{dependency}', which has manualApproval enabled. \
         Auto-deploy stages cannot depend on manual-approval stages."
    )]
    #[diagnostic(
        code(deployflow::invalid_ordering),
        help(
            "Either set manualApproval on '{stage}' as well, or drop '{dependency}' from its dependsOn"
        )
    )]
    InvalidOrdering { stage: String, dependency: String },

    #[error("Circular dependency detected: {}", path.join(" -> "))]
    #[diagnostic(
        code(deployflow::circular_dependency),
        help("Review your stage dependencies to remove the cycle")
    )]
    CircularDependency { path: Vec<String> },

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("{field} is required {context}")]
    #[diagnostic(code(deployflow::missing_required_config))]
    MissingRequiredConfig {
        field: String,
        context: String,
        #[help]
        help: Option<String>,
    },

    #[error("Unsupported definition format: {path}")]
    #[diagnostic(
        code(deployflow::unsupported_format),
        help("Use a .yaml, .yml, .json or .toml pipeline definition")
    )]
    UnsupportedFormat { path: PathBuf },

    // ─────────────────────────────────────────────────────────────────────────
    // File Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Pipeline definition not found: {path}")]
    #[diagnostic(
        code(deployflow::definition_not_found),
        help("Create one with 'deployflow init' or pass the path explicitly")
    )]
    DefinitionNotFound { path: PathBuf },

    #[error("Failed to read file '{path}': {error}")]
    #[diagnostic(code(deployflow::file_read_error))]
    FileReadError { path: PathBuf, error: String },

    #[error("Failed to write file '{path}': {error}")]
    #[diagnostic(code(deployflow::file_write_error))]
    FileWriteError { path: PathBuf, error: String },

    #[error("Generated files are out of date: {}", paths.join(", "))]
    #[diagnostic(
        code(deployflow::out_of_date),
        help("Run 'deployflow synth' and commit the result")
    )]
    OutOfDate { paths: Vec<String> },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/Parse Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("IO error: {message}")]
    #[diagnostic(code(deployflow::io_error))]
    Io { message: String },

    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(deployflow::yaml_error))]
    Yaml { message: String },

    #[error("JSON parsing error: {message}")]
    #[diagnostic(code(deployflow::json_error))]
    Json { message: String },

    #[error("TOML parsing error: {message}")]
    #[diagnostic(code(deployflow::toml_error))]
    Toml { message: String },
}

impl From<std::io::Error> for DeployflowError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for DeployflowError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for DeployflowError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl From<toml::de::Error> for DeployflowError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml { message: e.to_string() }
    }
}

impl DeployflowError {
    /// Missing package namespace while assembly versioning is enabled
    pub fn missing_namespace() -> Self {
        Self::MissingRequiredConfig {
            field: "pkgNamespace".into(),
            context: "when useGithubPackagesForAssembly is enabled".into(),
            help: Some(
                "Set pkgNamespace (e.g. '@my-org') or disable useGithubPackagesForAssembly".into(),
            ),
        }
    }

    /// No pipeline-level role for the jobs that are not tied to a stage
    pub fn missing_pipeline_role_arn() -> Self {
        Self::MissingRequiredConfig {
            field: "iamRoleArn".into(),
            context: "for the publish-assets job".into(),
            help: Some(
                "Set a pipeline-level iamRoleArn; publish-assets has no stage to take a role from"
                    .into(),
            ),
        }
    }

    /// No role could be resolved for a stage
    pub fn missing_role_arn(stage: &str) -> Self {
        Self::MissingRequiredConfig {
            field: "iamRoleArn".into(),
            context: format!("for stage '{}'", stage),
            help: Some(format!(
                "Set a pipeline-level iamRoleArn or an iamRoleArn on stage '{}'",
                stage
            )),
        }
    }

    /// Whether this error comes from stage graph validation
    pub fn is_graph_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyStageSet
                | Self::DuplicateStage { .. }
                | Self::JobIdCollision { .. }
                | Self::UnknownDependency { .. }
                | Self::SelfDependency { .. }
                | Self::DuplicateDependency { .. }
                | Self::InvalidOrdering { .. }
                | Self::CircularDependency { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_dependency_lists_available() {
        let err = DeployflowError::UnknownDependency {
            stage: "Dev".into(),
            dependency: "NonExistent".into(),
            available: vec!["Dev".into(), "Prod".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("depends on 'NonExistent', which is not a defined stage"));
        assert!(msg.contains("Available: Dev, Prod"));
    }

    #[test]
    fn test_cycle_message_shows_path() {
        let err = DeployflowError::CircularDependency {
            path: vec!["A".into(), "B".into(), "A".into()],
        };
        assert_eq!(err.to_string(), "Circular dependency detected: A -> B -> A");
        assert!(err.is_graph_error());
    }

    #[test]
    fn test_missing_role_mentions_stage() {
        let err = DeployflowError::missing_role_arn("Prod");
        assert_eq!(err.to_string(), "iamRoleArn is required for stage 'Prod'");
        assert!(!err.is_graph_error());
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Rendering and writing generated files

use std::path::{Path, PathBuf};

use super::schema::Workflow;
use crate::errors::{DeployflowError, DeployflowResult};

/// Directory GitHub reads workflows from, relative to the repository root
pub const WORKFLOWS_DIR: &str = ".github/workflows";

const HEADER: &str = "# Generated by deployflow - do not edit\n# Source: .deployflow.yaml\n\n";

/// A file ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path relative to the output root
    pub path: PathBuf,
    pub contents: String,
}

/// What happened to a file on write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Created,
    Updated,
    Unchanged,
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileStatus::Created => write!(f, "created"),
            FileStatus::Updated => write!(f, "updated"),
            FileStatus::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Workflow file name: `<name>.yml`
pub fn workflow_file_name(workflow: &Workflow) -> String {
    format!("{}.yml", workflow.name)
}

/// Render YAML with the generated-file header
pub fn render_yaml<T: serde::Serialize>(value: &T) -> DeployflowResult<String> {
    let body = serde_yaml::to_string(value)?;
    Ok(format!("{}{}", HEADER, body))
}

/// Render a workflow as a file under `workflows_dir`
pub fn render_workflow(workflow: &Workflow, workflows_dir: &Path) -> DeployflowResult<GeneratedFile> {
    Ok(GeneratedFile {
        path: workflows_dir.join(workflow_file_name(workflow)),
        contents: render_yaml(workflow)?,
    })
}

/// Write a file below `root`, creating parent directories.
///
/// Files whose contents already match are left untouched.
pub fn write_file(root: &Path, file: &GeneratedFile) -> DeployflowResult<FileStatus> {
    let target = root.join(&file.path);

    let status = match std::fs::read_to_string(&target) {
        Ok(existing) if existing == file.contents => return Ok(FileStatus::Unchanged),
        Ok(_) => FileStatus::Updated,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileStatus::Created,
        Err(e) => {
            return Err(DeployflowError::FileReadError {
                path: target,
                error: e.to_string(),
            })
        }
    };

    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(|e| DeployflowError::FileWriteError {
            path: parent.to_path_buf(),
            error: e.to_string(),
        })?;
    }

    std::fs::write(&target, &file.contents).map_err(|e| DeployflowError::FileWriteError {
        path: target.clone(),
        error: e.to_string(),
    })?;

    tracing::info!(path = %target.display(), %status, "wrote generated file");
    Ok(status)
}

/// Paths (relative to `root`) whose contents on disk differ from `files`
pub fn stale_files(root: &Path, files: &[GeneratedFile]) -> Vec<String> {
    files
        .iter()
        .filter(|file| {
            std::fs::read_to_string(root.join(&file.path))
                .map(|existing| existing != file.contents)
                .unwrap_or(true)
        })
        .map(|file| file.path.display().to_string())
        .collect()
}

/// Fail with `OutOfDate` when any file is stale
pub fn check_files(root: &Path, files: &[GeneratedFile]) -> DeployflowResult<()> {
    let stale = stale_files(root, files);
    if stale.is_empty() {
        Ok(())
    } else {
        Err(DeployflowError::OutOfDate { paths: stale })
    }
}

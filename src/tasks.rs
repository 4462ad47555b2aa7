// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Local project tasks
//!
//! Convenience commands registered while building the push pipeline, so a
//! stage can be deployed from a workstation without going through CI.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Default location of the tasks file, relative to the project root
pub const TASKS_FILE: &str = ".deployflow/tasks.yaml";

/// A named shell command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalTask {
    /// What the task does
    pub description: String,
    /// Command to execute
    pub exec: String,
}

/// Receiver of task registrations
pub trait TaskRegistry {
    /// Register a task, replacing any existing task with the same name
    fn add_task(&mut self, name: &str, task: LocalTask);
}

/// Ordered collection of project tasks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectTasks {
    tasks: IndexMap<String, LocalTask>,
}

impl ProjectTasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&LocalTask> {
        self.tasks.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LocalTask)> {
        self.tasks.iter().map(|(name, task)| (name.as_str(), task))
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl TaskRegistry for ProjectTasks {
    fn add_task(&mut self, name: &str, task: LocalTask) {
        self.tasks.insert(name.to_string(), task);
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Stage set validation
//!
//! Checks run in a fixed order and stop at the first violation:
//! empty set, duplicate names and job ids, dependency references,
//! manual-approval ordering, then cycles over the full dependency relation.

use std::collections::{HashMap, HashSet};

use crate::errors::DeployflowError;
use crate::pipeline::{stage_job_id, Stage, StageGraph};

/// A stage list that passed validation, together with its dependency graph
#[derive(Debug)]
pub struct ValidatedStages<'a> {
    stages: &'a [Stage],
    graph: StageGraph,
}

impl<'a> ValidatedStages<'a> {
    /// Stages in declaration order
    pub fn stages(&self) -> &'a [Stage] {
        self.stages
    }

    /// Dependency graph of the stages
    pub fn graph(&self) -> &StageGraph {
        &self.graph
    }
}

/// Stage set validator
pub struct StageValidator;

impl StageValidator {
    /// Validate a stage list, failing on the first problem found
    pub fn validate(stages: &[Stage]) -> Result<ValidatedStages<'_>, DeployflowError> {
        if stages.is_empty() {
            return Err(DeployflowError::EmptyStageSet);
        }

        Self::check_unique_names(stages)?;
        Self::check_job_ids(stages)?;
        Self::check_references(stages)?;
        Self::check_ordering(stages)?;

        let graph = StageGraph::build(stages)?;
        if let Some(path) = graph.find_cycle() {
            return Err(DeployflowError::CircularDependency { path });
        }

        tracing::debug!(stages = stages.len(), "stage graph validated");

        Ok(ValidatedStages { stages, graph })
    }

    fn check_unique_names(stages: &[Stage]) -> Result<(), DeployflowError> {
        let mut seen = HashSet::new();
        for stage in stages {
            if !seen.insert(stage.name.as_str()) {
                return Err(DeployflowError::DuplicateStage {
                    stage: stage.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Distinct names can still collapse to the same job id ("Prod EU" / "prod-eu")
    fn check_job_ids(stages: &[Stage]) -> Result<(), DeployflowError> {
        let mut seen: HashMap<String, &str> = HashMap::new();
        for stage in stages {
            let job_id = stage_job_id(&stage.name);
            if let Some(first) = seen.get(&job_id) {
                return Err(DeployflowError::JobIdCollision {
                    first: (*first).to_string(),
                    second: stage.name.clone(),
                    job_id,
                });
            }
            seen.insert(job_id, &stage.name);
        }
        Ok(())
    }

    fn check_references(stages: &[Stage]) -> Result<(), DeployflowError> {
        let names: HashSet<&str> = stages.iter().map(|s| s.name.as_str()).collect();

        for stage in stages {
            let mut listed = HashSet::new();
            for dep in &stage.depends_on {
                if !names.contains(dep.as_str()) {
                    return Err(DeployflowError::UnknownDependency {
                        stage: stage.name.clone(),
                        dependency: dep.clone(),
                        available: stages.iter().map(|s| s.name.clone()).collect(),
                    });
                }
                if *dep == stage.name {
                    return Err(DeployflowError::SelfDependency {
                        stage: stage.name.clone(),
                    });
                }
                if !listed.insert(dep.as_str()) {
                    return Err(DeployflowError::DuplicateDependency {
                        stage: stage.name.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Auto-deploy stages may not wait on manual-approval stages.
    /// Manual-approval stages may depend on anything that exists.
    fn check_ordering(stages: &[Stage]) -> Result<(), DeployflowError> {
        for stage in stages.iter().filter(|s| s.is_auto_deploy()) {
            for dep in &stage.depends_on {
                let dep_is_manual = stages
                    .iter()
                    .find(|s| s.name == *dep)
                    .is_some_and(|s| s.manual_approval);

                if dep_is_manual {
                    return Err(DeployflowError::InvalidOrdering {
                        stage: stage.name.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(name: &str, deps: &[&str]) -> Stage {
        Stage::new(name, "111111111111", "us-east-1").with_depends_on(deps.iter().copied())
    }

    #[test]
    fn test_validate_empty() {
        let result = StageValidator::validate(&[]);
        assert!(matches!(result, Err(DeployflowError::EmptyStageSet)));
    }

    #[test]
    fn test_validate_duplicate_names() {
        let stages = vec![stage("Dev", &[]), stage("Dev", &[])];
        let result = StageValidator::validate(&stages);
        assert!(matches!(result, Err(DeployflowError::DuplicateStage { stage }) if stage == "Dev"));
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let stages = vec![stage("dev", &[]), stage("Dev", &["dev"])];
        assert!(StageValidator::validate(&stages).is_ok());
    }

    #[test]
    fn test_validate_job_id_collision() {
        let stages = vec![stage("Prod EU", &[]), stage("prod-eu", &[])];
        let result = StageValidator::validate(&stages);
        assert!(matches!(
            result,
            Err(DeployflowError::JobIdCollision { job_id, .. }) if job_id == "deploy-prod-eu"
        ));
    }

    #[test]
    fn test_validate_unknown_dependency() {
        let stages = vec![stage("Dev", &[]), stage("Prod", &["NonExistent"])];
        match StageValidator::validate(&stages) {
            Err(DeployflowError::UnknownDependency {
                stage,
                dependency,
                available,
            }) => {
                assert_eq!(stage, "Prod");
                assert_eq!(dependency, "NonExistent");
                assert_eq!(available, vec!["Dev", "Prod"]);
            }
            other => panic!("Expected UnknownDependency, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_self_dependency() {
        let stages = vec![stage("Dev", &["Dev"])];
        let result = StageValidator::validate(&stages);
        assert!(matches!(result, Err(DeployflowError::SelfDependency { stage }) if stage == "Dev"));
    }

    #[test]
    fn test_validate_invalid_ordering() {
        let stages = vec![
            stage("Dev", &[]).with_manual_approval(),
            stage("Prod", &["Dev"]),
        ];
        let result = StageValidator::validate(&stages);
        assert!(matches!(
            result,
            Err(DeployflowError::InvalidOrdering { stage, dependency })
                if stage == "Prod" && dependency == "Dev"
        ));
    }

    #[test]
    fn test_manual_stage_may_depend_on_auto_stage() {
        let stages = vec![
            stage("Dev", &[]),
            stage("Prod", &["Dev"]).with_manual_approval(),
        ];
        let validated = StageValidator::validate(&stages).unwrap();
        assert_eq!(validated.graph().dependencies("Prod").unwrap(), vec!["Dev"]);
    }

    #[test]
    fn test_validate_repeated_dependency() {
        let stages = vec![stage("Dev", &[]), stage("Prod", &["Dev", "Dev"])];
        let result = StageValidator::validate(&stages);
        assert!(matches!(
            result,
            Err(DeployflowError::DuplicateDependency { stage, dependency })
                if stage == "Prod" && dependency == "Dev"
        ));
    }

    #[test]
    fn test_validate_cycle() {
        let stages = vec![stage("A", &["B"]), stage("B", &["A"])];
        let result = StageValidator::validate(&stages);
        assert!(matches!(
            result,
            Err(DeployflowError::CircularDependency { path }) if path == vec!["A", "B", "A"]
        ));
    }

    #[test]
    fn test_cycle_among_manual_stages_is_rejected() {
        let stages = vec![
            stage("A", &["B"]).with_manual_approval(),
            stage("B", &["A"]).with_manual_approval(),
        ];
        let result = StageValidator::validate(&stages);
        assert!(matches!(result, Err(DeployflowError::CircularDependency { .. })));
    }

    #[test]
    fn test_reference_errors_win_over_ordering() {
        let stages = vec![
            stage("Dev", &[]).with_manual_approval(),
            stage("Prod", &["Dev", "Missing"]),
        ];
        let result = StageValidator::validate(&stages);
        assert!(matches!(result, Err(DeployflowError::UnknownDependency { .. })));
    }

    #[test]
    fn test_ordering_wins_over_cycles() {
        let stages = vec![
            stage("A", &["B"]).with_manual_approval(),
            stage("B", &["A"]),
        ];
        let result = StageValidator::validate(&stages);
        assert!(matches!(result, Err(DeployflowError::InvalidOrdering { .. })));
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Property-based tests for name normalization and job wiring.

use deployflow::naming::{to_job_id, to_kebab_case};
use deployflow::pipeline::{resolve, stage_job_id, PipelineDefaults, Stage};
use deployflow::tasks::ProjectTasks;
use deployflow::workflow::{auto_needs, build_auto_graph};
use proptest::prelude::*;

const ROLE: &str = "arn:aws:iam::111111111111:role/Oidc";

fn defaults() -> PipelineDefaults {
    PipelineDefaults::new("App", ROLE).with_pkg_namespace("@org")
}

/// Names with at least one character that survives job-id normalization
fn legal_name_strategy() -> impl Strategy<Value = String> {
    "[ A-Za-z0-9_.-]{0,8}[A-Za-z0-9_][ A-Za-z0-9_.-]{0,8}".prop_map(String::from)
}

proptest! {
    #[test]
    fn kebab_case_is_idempotent(s in any::<String>()) {
        let once = to_kebab_case(&s);
        prop_assert_eq!(to_kebab_case(&once), once);
    }

    #[test]
    fn kebab_case_charset(s in any::<String>()) {
        let out = to_kebab_case(&s);
        prop_assert!(out.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        prop_assert!(!out.starts_with('-') && !out.ends_with('-'));
        prop_assert!(!out.contains("--"));
    }

    #[test]
    fn job_id_is_idempotent(s in legal_name_strategy()) {
        let once = to_job_id(&s);
        prop_assert_eq!(to_job_id(&once), once);
    }

    #[test]
    fn job_id_is_legal(s in any::<String>()) {
        let out = to_job_id(&s);
        prop_assert!(!out.is_empty());
        prop_assert!(out.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
        let first = out.chars().next().unwrap();
        prop_assert!(first.is_ascii_alphabetic() || first == '_');
    }

    #[test]
    fn resolve_is_deterministic(name in "[A-Z][a-z]{1,10}", region in "(us|eu)-(east|west)-[12]") {
        let stage = Stage::new(name, "222222222222", region);
        prop_assert_eq!(resolve(&stage, &defaults()).unwrap(), resolve(&stage, &defaults()).unwrap());
    }

    #[test]
    fn needs_follow_declared_dependencies(deps in proptest::collection::vec("[A-Z][a-z]{1,8}", 1..4)) {
        let stage = Stage::new("Target", "222222222222", "us-east-1").with_depends_on(deps.clone());
        let resolved = resolve(&stage, &defaults()).unwrap();

        let expected: Vec<String> = deps.iter().map(|d| stage_job_id(d)).collect();
        prop_assert_eq!(auto_needs(&resolved), expected);
    }

    #[test]
    fn manual_stages_never_become_jobs(manual in proptest::collection::vec(any::<bool>(), 1..6)) {
        let stages: Vec<_> = manual
            .iter()
            .enumerate()
            .map(|(i, &m)| {
                let s = Stage::new(format!("Stage{i}"), "222222222222", "us-east-1");
                let s = if m { s.with_manual_approval() } else { s };
                resolve(&s, &defaults()).unwrap()
            })
            .collect();

        let workflow = build_auto_graph(&stages, &defaults(), ROLE, &mut ProjectTasks::new());
        for (stage, &m) in stages.iter().zip(&manual) {
            prop_assert_eq!(workflow.job(&stage.job_id).is_some(), !m);
        }
        prop_assert_eq!(workflow.jobs.len(), 2 + manual.iter().filter(|m| !**m).count());
    }
}

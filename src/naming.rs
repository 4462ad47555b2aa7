// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Name normalization
//!
//! Turns free-form stage names into tokens that are safe to use as
//! workflow job keys, concurrency groups, and file names.

use std::sync::LazyLock;

use regex::Regex;

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9]+").expect("valid regex"));

static NON_JOB_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_-]+").expect("valid regex"));

static REPEATED_HYPHENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-+").expect("valid regex"));

/// Prefix added to job ids that would otherwise not start with a letter or underscore
pub const JOB_ID_SENTINEL: &str = "s-";

/// Convert a string to kebab-case.
///
/// Every run of non-alphanumeric characters becomes a single hyphen,
/// leading and trailing hyphens are removed, and the result is lowercased.
///
/// ```
/// assert_eq!(deployflow::naming::to_kebab_case("My App__Prod!"), "my-app-prod");
/// ```
pub fn to_kebab_case(s: &str) -> String {
    NON_ALPHANUMERIC
        .replace_all(s, "-")
        .trim_matches('-')
        .to_lowercase()
}

/// Convert a string to a legal GitHub Actions job id.
///
/// Job ids must start with a letter or underscore and may only contain
/// alphanumerics, `-` and `_`. Anything else is prefixed with [`JOB_ID_SENTINEL`].
pub fn to_job_id(s: &str) -> String {
    let replaced = NON_JOB_ID.replace_all(s, "-");
    let collapsed = REPEATED_HYPHENS.replace_all(&replaced, "-");
    let out = collapsed.trim_matches('-').to_lowercase();

    let starts_legal = out
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');

    if starts_legal {
        out
    } else {
        format!("{JOB_ID_SENTINEL}{out}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kebab_case_basic() {
        assert_eq!(to_kebab_case("Production"), "production");
        assert_eq!(to_kebab_case("Sandbox Account"), "sandbox-account");
        assert_eq!(to_kebab_case("us_east--1"), "us-east-1");
    }

    #[test]
    fn test_kebab_case_strips_edges() {
        assert_eq!(to_kebab_case("--Dev--"), "dev");
        assert_eq!(to_kebab_case("  spaced  "), "spaced");
        assert_eq!(to_kebab_case("***"), "");
    }

    #[test]
    fn test_kebab_case_is_idempotent() {
        let once = to_kebab_case("Prod / EU (West)");
        assert_eq!(once, "prod-eu-west");
        assert_eq!(to_kebab_case(&once), once);
    }

    #[test]
    fn test_job_id_keeps_underscores() {
        assert_eq!(to_job_id("deploy_Prod"), "deploy_prod");
        assert_eq!(to_job_id("_private"), "_private");
    }

    #[test]
    fn test_job_id_collapses_and_trims() {
        assert_eq!(to_job_id("a  b..c"), "a-b-c");
        assert_eq!(to_job_id("-a--b-"), "a-b");
    }

    #[test]
    fn test_job_id_sentinel() {
        assert_eq!(to_job_id("1st-stage"), "s-1st-stage");
        assert_eq!(to_job_id(""), "s-");
        assert_eq!(to_job_id("!!!"), "s-");
    }

    #[test]
    fn test_job_id_is_idempotent() {
        for input in ["Prod EU", "9lives", "__x__", "deploy-dev"] {
            let once = to_job_id(input);
            assert_eq!(to_job_id(&once), once, "input: {input}");
        }
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Validate command - check a pipeline definition

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use crate::pipeline::synthesize;

/// Run the validate command
pub async fn run(definition_path: PathBuf, verbose: bool) -> Result<()> {
    println!("{}", "Validating pipeline...".bold());
    println!();

    let definition = match super::load_definition(&definition_path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("  {} Failed to load definition", "✗".red());
            eprintln!();
            return Err(e);
        }
    };

    println!(
        "  {} Definition parsed (stages: {})",
        "✓".green(),
        definition.stage_names().join(", ")
    );

    let output = match synthesize(&definition) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("  {} {}", "✗".red(), e);
            eprintln!();
            return Err(e.into());
        }
    };

    println!("  {} Stage dependencies are valid", "✓".green());
    println!("  {} All stages resolved", "✓".green());

    if verbose {
        println!();
        println!("{}:", "Stages".bold());
        for stage in &output.resolved {
            let deps = if stage.depends_on.is_empty() {
                String::new()
            } else {
                format!(" [depends: {}]", stage.depends_on.join(", "))
            };
            let mode = if stage.manual_approval { "manual" } else { "auto" };
            println!(
                "    - {} ({}, {}){}",
                stage.name,
                stage.job_id.cyan(),
                mode,
                deps.dimmed()
            );
            println!(
                "        account {} via {} in {}",
                stage.account, stage.role_arn, stage.role_region
            );
        }
    }

    println!();
    println!("{}", "Pipeline is valid!".green().bold());
    Ok(())
}

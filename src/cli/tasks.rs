// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Tasks command - list local deploy commands

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use crate::pipeline::synthesize;

/// Run the tasks command
pub async fn run(definition_path: PathBuf, _verbose: bool) -> Result<()> {
    let definition = super::load_definition(&definition_path)?;
    let output = synthesize(&definition)?;

    if output.tasks.is_empty() {
        println!("{}", "No auto-deploy stages, so no local tasks.".yellow());
        return Ok(());
    }

    for (name, task) in output.tasks.iter() {
        println!("{}  {}", name.cyan().bold(), task.description);
        println!("    {}", task.exec.dimmed());
    }

    Ok(())
}

// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Synth command - generate workflow and task files

use colored::Colorize;
use miette::Result;
use std::path::{Path, PathBuf};

use crate::pipeline::synthesize;
use crate::workflow::emitter::{self, FileStatus};

/// Run the synth command
pub async fn run(definition_path: PathBuf, out_dir: PathBuf, check: bool, verbose: bool) -> Result<()> {
    let definition = super::load_definition(&definition_path)?;
    let output = synthesize(&definition)?;
    let files = output.files(&out_dir)?;
    let root = Path::new(".");

    if check {
        emitter::check_files(root, &files)?;
        println!("{}", "Generated files are up to date.".green().bold());
        return Ok(());
    }

    println!("{}", "Generating workflows...".bold());
    println!();

    for file in &files {
        let status = emitter::write_file(root, file)?;
        let marker = match status {
            FileStatus::Created | FileStatus::Updated => "✓".green(),
            FileStatus::Unchanged => "•".dimmed(),
        };
        println!("  {} {} ({})", marker, file.path.display(), status);
    }

    if verbose {
        println!();
        println!("{}:", "Deploy jobs".bold());
        for id in output.deploy.job_ids() {
            println!("    - {}", id);
        }
        if output.dispatch.is_none() {
            println!("  {}", "Dispatch workflow disabled".dimmed());
        }
    }

    println!();
    println!("{}", "Done!".green().bold());
    Ok(())
}

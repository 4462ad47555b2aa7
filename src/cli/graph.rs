// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Graph command - visualize stage dependencies

use miette::Result;
use std::path::PathBuf;

use super::GraphFormat;
use crate::pipeline::StageValidator;

/// Run the graph command
pub async fn run(definition_path: PathBuf, format: GraphFormat, _verbose: bool) -> Result<()> {
    let definition = super::load_definition(&definition_path)?;
    let validated = StageValidator::validate(&definition.stages)?;
    let graph = validated.graph();

    let output = match format {
        GraphFormat::Text => graph.to_text(validated.stages())?,
        GraphFormat::Dot => graph.to_dot(validated.stages()),
        GraphFormat::Mermaid => graph.to_mermaid(validated.stages()),
    };

    println!("{}", output);

    Ok(())
}

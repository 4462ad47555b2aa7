// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Init command - create a starter definition

use colored::Colorize;
use miette::Result;
use std::path::Path;

use crate::pipeline::{PipelineDefaults, PipelineDefinition, Stage, DEFAULT_DEFINITION_FILE};

/// Run the init command
pub async fn run(
    stack_prefix: Option<String>,
    namespace: String,
    role_arn: String,
    force: bool,
    verbose: bool,
) -> Result<()> {
    let stack_prefix = stack_prefix.unwrap_or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|p| p.file_name().map(|s| s.to_string_lossy().to_string()))
            .unwrap_or_else(|| "MyApp".to_string())
    });

    println!("{}", "Initializing deployflow...".bold());
    println!();

    if Path::new(DEFAULT_DEFINITION_FILE).exists() && !force {
        return Err(miette::miette!(
            "{} already exists. Use --force to overwrite.",
            DEFAULT_DEFINITION_FILE
        ));
    }

    let content = generate_template(&stack_prefix, &namespace, &role_arn)?;

    tokio::fs::write(DEFAULT_DEFINITION_FILE, &content)
        .await
        .map_err(|e| miette::miette!("Failed to write {}: {}", DEFAULT_DEFINITION_FILE, e))?;

    println!("  {} Created {}", "✓".green(), DEFAULT_DEFINITION_FILE);
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit {} to set your accounts and stages",
        DEFAULT_DEFINITION_FILE.cyan()
    );
    println!("  2. Run {} to check it", "deployflow validate".cyan());
    println!("  3. Run {} to write the workflows", "deployflow synth".cyan());
    println!();

    if verbose {
        println!("{}", "Generated definition:".dimmed());
        println!("{}", "─".repeat(50).dimmed());
        println!("{}", content.dimmed());
    }

    Ok(())
}

fn generate_template(stack_prefix: &str, namespace: &str, role_arn: &str) -> Result<String> {
    let definition = PipelineDefinition {
        defaults: PipelineDefaults::new(stack_prefix, role_arn).with_pkg_namespace(namespace),
        stages: vec![
            Stage::new("Dev", "111111111111", "us-east-1").with_environment("development"),
            Stage::new("Production", "222222222222", "us-east-1")
                .with_environment("production")
                .with_depends_on(["Dev"])
                .with_manual_approval(),
        ],
    };

    Ok(format!(
        "# deployflow pipeline definition\n{}\n\
         # Further options:\n\
         # workingDirectory: infra\n\
         # appName: my-app\n",
        definition.to_yaml()?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::synthesize;

    #[test]
    fn test_template_synthesizes() {
        let yaml =
            generate_template("MyApp", "@my-org", "arn:aws:iam::123456789012:role/Oidc").unwrap();
        let definition = PipelineDefinition::from_yaml(&yaml).unwrap();
        assert_eq!(definition.stage_names(), vec!["Dev", "Production"]);

        let output = synthesize(&definition).unwrap();
        assert!(output.deploy.job("deploy-dev").is_some());
        assert!(output.deploy.job("deploy-production").is_none());
        assert!(output.dispatch.is_some());
    }

    #[test]
    fn test_template_quotes_awkward_prefix() {
        let prefix = r#"my "app" \ dir: #1"#;
        let yaml = generate_template(prefix, "@my-org", "arn:aws:iam::123456789012:role/Oidc").unwrap();

        let definition = PipelineDefinition::from_yaml(&yaml).unwrap();
        assert_eq!(definition.defaults.stack_prefix, prefix);
        assert!(synthesize(&definition).is_ok());
    }
}

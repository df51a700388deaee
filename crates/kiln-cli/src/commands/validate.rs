//! `kiln validate`: parse a template and report whether it is valid.

use anyhow::Context;
use clap::Args;

/// Arguments for the `validate` command.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the template file, or `-` for standard input.
    pub file: String,
}

/// Executes the `validate` command.
///
/// # Errors
///
/// Returns an error if the template cannot be read or is invalid.
pub fn execute(args: &ValidateArgs) -> anyhow::Result<()> {
    tracing::info!(file = %args.file, "validating template");
    let template = kiln_template::parse_template_file(&args.file)
        .with_context(|| format!("template {} is invalid", args.file))?;
    tracing::debug!(builds = template.builders.len(), "template parsed");
    println!("Template validated successfully.");
    Ok(())
}

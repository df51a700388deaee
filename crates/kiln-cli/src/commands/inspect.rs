//! `kiln inspect`: describe what a template declares.

use anyhow::Context;
use clap::{Args, ValueEnum};
use kiln_common::config::KilnConfig;

use crate::output;

/// Output format for `inspect`.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InspectFormat {
    /// Sectioned, human-readable listing.
    #[default]
    Text,
    /// The parsed template as pretty-printed JSON.
    Json,
}

/// Arguments for the `inspect` command.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the template file, or `-` for standard input.
    pub file: String,

    /// Output format.
    #[arg(long, value_enum, default_value_t = InspectFormat::Text)]
    pub format: InspectFormat,
}

/// Executes the `inspect` command.
///
/// # Errors
///
/// Returns an error if the template cannot be read or is invalid.
pub fn execute(args: &InspectArgs, config: &KilnConfig) -> anyhow::Result<()> {
    let template = kiln_template::parse_template_file(&args.file)
        .with_context(|| format!("template {} is invalid", args.file))?;

    let rendered = match args.format {
        InspectFormat::Text => output::render_template(&template, config),
        InspectFormat::Json => serde_json::to_string_pretty(&template)?,
    };
    println!("{rendered}");
    Ok(())
}

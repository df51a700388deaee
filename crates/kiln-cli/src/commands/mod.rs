//! CLI command definitions and dispatch.

pub mod inspect;
pub mod validate;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use kiln_common::config::KilnConfig;

/// Kiln: image build template tooling.
#[derive(Parser, Debug)]
#[command(name = kiln_common::constants::BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Path to a JSON file with the build flags (`debug`, `force`).
    #[arg(long, global = true, env = "KILN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Mark builds as running in debug mode.
    #[arg(long, global = true)]
    pub debug: bool,

    /// Mark builds as forced.
    #[arg(long, global = true)]
    pub force: bool,
}

impl Cli {
    /// Loads the config file, if any, and applies the flag overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    pub fn kiln_config(&self) -> anyhow::Result<KilnConfig> {
        let mut config = match &self.config {
            Some(path) => KilnConfig::from_file(path)?,
            None => KilnConfig::default(),
        };
        config.debug |= self.debug;
        config.force |= self.force;
        Ok(config)
    }
}

/// Log output format.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse and validate a template.
    Validate(validate::ValidateArgs),
    /// Show the variables, builds and pipelines of a template.
    Inspect(inspect::InspectArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = cli.kiln_config()?;
    match cli.command {
        Command::Validate(args) => validate::execute(&args),
        Command::Inspect(args) => inspect::execute(&args, &config),
    }
}

//! CLI interface and argument parsing
//!
//! Thin surface over the library: commands load configuration, read plain
//! text in, and write anonymized text, reversals and reports out.

pub mod commands;

use clap::{Parser, Subcommand};

/// Sigilo - PII anonymization for Brazilian legal documents
#[derive(Parser, Debug)]
#[command(name = "sigilo")]
#[command(version, about, long_about = None)]
#[command(author = "Sigilo Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "sigilo.toml", env = "SIGILO_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SIGILO_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Anonymize a text document and persist its reversal mapping
    Anonymize(commands::anonymize::AnonymizeArgs),

    /// Revert an anonymized document using a stored mapping
    Revert(commands::revert::RevertArgs),

    /// Scan anonymized text for residual PII with the validation model
    Scan(commands::scan::ScanArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

//! Anonymize command implementation

use crate::config::{load_config, SubstitutionMode};
use crate::engine::AnonymizationEngine;
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use tokio::sync::watch;

/// Arguments for the anonymize command
#[derive(Args, Debug)]
pub struct AnonymizeArgs {
    /// Input text file (UTF-8, already extracted from the document)
    pub input: PathBuf,

    /// Output file for the anonymized text (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Force placeholder mode regardless of configuration
    #[arg(long)]
    pub placeholder: bool,

    /// Print the session report as JSON instead of the console format
    #[arg(long)]
    pub json_report: bool,
}

impl AnonymizeArgs {
    /// Execute the anonymize command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let mut config = load_config(config_path)?;
        if self.placeholder {
            config.substitution.mode = SubstitutionMode::Placeholder;
        }

        let engine = AnonymizationEngine::new(config)?;

        let text = std::fs::read_to_string(&self.input)
            .with_context(|| format!("failed to read input file {}", self.input.display()))?;

        let outcome = engine.anonymize(&text, Some(shutdown)).await?;

        match &self.output {
            Some(path) => {
                std::fs::write(path, &outcome.session.anonymized_text)
                    .with_context(|| format!("failed to write output {}", path.display()))?;
                println!("✅ Anonymized text written to {}", path.display());
            }
            None => println!("{}", outcome.session.anonymized_text),
        }

        println!(
            "🔑 Session {} (mapping: {})",
            outcome.session.id,
            engine.store().path_for(&outcome.session.id).display()
        );

        if self.json_report {
            println!("{}", outcome.report.format_json()?);
        } else {
            println!("{}", outcome.report.format_console());
        }

        Ok(0)
    }
}

//! Scan command implementation
//!
//! Second-pass leak scan over anonymized text. Findings are advisory; the
//! command only reports them and sets the exit code.

use crate::config::load_config;
use crate::engine::AnonymizationEngine;
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the scan command
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Anonymized input text file
    pub input: PathBuf,

    /// Print findings as JSON
    #[arg(long)]
    pub json: bool,
}

impl ScanArgs {
    /// Execute the scan command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = load_config(config_path)?;
        let engine = AnonymizationEngine::new(config)?;

        let text = std::fs::read_to_string(&self.input)
            .with_context(|| format!("failed to read input file {}", self.input.display()))?;

        let outcome = engine.validate(&text).await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&outcome.findings)?);
        } else if outcome.findings.is_empty() {
            println!("✅ No residual PII flagged");
        } else {
            println!("⚠️  {} suspected residual PII finding(s):", outcome.findings.len());
            for finding in &outcome.findings {
                let category = finding
                    .category_guess
                    .map(|c| c.label())
                    .unwrap_or("UNKNOWN");
                let offset = finding
                    .offset_hint
                    .map(|o| o.to_string())
                    .unwrap_or_else(|| "?".to_string());
                println!(
                    "  • [{}] \"{}\" (offset {}, confidence {:.2})",
                    category, finding.excerpt, offset, finding.confidence
                );
            }
        }

        for warning in &outcome.warnings {
            eprintln!("warning: {warning}");
        }

        Ok(if outcome.findings.is_empty() { 0 } else { 4 })
    }
}

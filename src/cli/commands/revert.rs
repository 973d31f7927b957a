//! Revert command implementation
//!
//! Reverses an anonymized document using a stored session mapping or an
//! explicit mapping file. Unresolved synthetic tokens are reported, never
//! fatal.

use crate::config::load_config;
use crate::domain::SessionId;
use crate::mapping::{self, store, MappingStore};
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the revert command
#[derive(Args, Debug)]
pub struct RevertArgs {
    /// Anonymized input text file
    pub input: PathBuf,

    /// Session id whose stored mapping should be used
    #[arg(short, long, conflicts_with = "mapping")]
    pub session_id: Option<String>,

    /// Explicit mapping JSON file (instead of a stored session)
    #[arg(short, long)]
    pub mapping: Option<PathBuf>,

    /// Output file for the reverted text (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl RevertArgs {
    /// Execute the revert command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let table = match (&self.session_id, &self.mapping) {
            (Some(id), None) => {
                let config = load_config(config_path)?;
                let store = MappingStore::new(config.mapping.store_dir)?;
                let session_id = SessionId::parse(id)
                    .with_context(|| format!("invalid session id '{id}'"))?;
                store.load(&session_id)?
            }
            (None, Some(path)) => store::load_from_path(path)?,
            _ => {
                eprintln!("Error: provide exactly one of --session-id or --mapping");
                return Ok(2);
            }
        };

        let anonymized = std::fs::read_to_string(&self.input)
            .with_context(|| format!("failed to read input file {}", self.input.display()))?;

        let outcome = mapping::reverse(&anonymized, &table);

        match &self.output {
            Some(path) => {
                std::fs::write(path, &outcome.text)
                    .with_context(|| format!("failed to write output {}", path.display()))?;
                println!("✅ Reverted text written to {}", path.display());
            }
            None => println!("{}", outcome.text),
        }

        if !outcome.unresolved.is_empty() {
            println!(
                "⚠️  {} synthetic token(s) had no mapping entry and were left unchanged:",
                outcome.unresolved.len()
            );
            for unresolved in &outcome.unresolved {
                println!("  • {} (offset {})", unresolved.token, unresolved.offset);
            }
        }

        Ok(0)
    }
}

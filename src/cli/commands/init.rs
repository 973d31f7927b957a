//! Init command implementation
//!
//! Writes a commented starter configuration file.

use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

const DEFAULT_CONFIG: &str = r#"# Sigilo configuration

[application]
log_level = "info"
locale = "pt-BR"

[detection]
# Built-in Brazilian patterns and stop terms are used when these are unset.
# pattern_library = "patterns/pii_patterns.toml"
# stop_terms = "patterns/stop_terms.toml"
confidence_threshold = 0.7
ner_enabled = true
# lexicon_dir = "lexicons"
entity_only = true

[substitution]
# "realistic" generates fake-but-plausible values; "placeholder" emits
# deterministic [CATEGORY_N] tags.
mode = "realistic"
# seed = 42

[mapping]
store_dir = "./mappings"

[validation]
enabled = false
# endpoint = "https://api.openai.com/v1"
# model = "gpt-4o-mini"
# api_key = "${SIGILO_VALIDATION_API_KEY}"
max_chunk_chars = 2000
timeout_secs = 30
max_findings = 50

[audit]
enabled = true
log_path = "./audit/anonymization.log"

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"
"#;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Destination path for the new configuration file
    #[arg(short, long, default_value = "sigilo.toml")]
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        if self.path.exists() && !self.force {
            eprintln!(
                "Error: {} already exists (use --force to overwrite)",
                self.path.display()
            );
            return Ok(2);
        }

        std::fs::write(&self.path, DEFAULT_CONFIG)
            .with_context(|| format!("failed to write {}", self.path.display()))?;

        println!("✅ Configuration written to {}", self.path.display());
        println!("   Edit it, then run: sigilo validate-config");
        Ok(0)
    }
}

//! Validate config command implementation

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Locale:            {}", config.application.locale);
        println!("  Log Level:         {}", config.application.log_level);
        println!(
            "  Pattern Library:   {}",
            config
                .detection
                .pattern_library
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "built-in".to_string())
        );
        println!(
            "  Stop Terms:        {}",
            config
                .detection
                .stop_terms
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "built-in".to_string())
        );
        println!("  NER Enabled:       {}", config.detection.ner_enabled);
        println!("  Substitution Mode: {}", config.substitution.mode);
        println!(
            "  Mapping Store:     {}",
            config.mapping.store_dir.display()
        );
        println!("  Validation:        {}", config.validation.enabled);
        if config.validation.enabled {
            println!(
                "  Validation Model:  {} via {}",
                config.validation.model,
                config.validation.endpoint.as_deref().unwrap_or("-")
            );
        }
        println!("  Audit Logging:     {}", config.audit.enabled);

        Ok(0)
    }
}

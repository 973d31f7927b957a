//! Configuration management for Sigilo.
//!
//! TOML-based configuration loading, parsing, and validation with support
//! for environment variable substitution (`${VAR_NAME}`), default values,
//! and `SIGILO_*` overrides.
//!
//! # Example configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//! locale = "pt-BR"
//!
//! [detection]
//! confidence_threshold = 0.7
//! ner_enabled = true
//! entity_only = true
//!
//! [substitution]
//! mode = "realistic"
//!
//! [mapping]
//! store_dir = "./mappings"
//!
//! [validation]
//! enabled = false
//! endpoint = "https://api.openai.com/v1"
//! model = "gpt-4o-mini"
//! api_key = "${SIGILO_VALIDATION_API_KEY}"
//!
//! [audit]
//! enabled = true
//! log_path = "./audit/anonymization.log"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, AuditConfig, DetectionConfig, LoggingConfig, MappingConfig, SigiloConfig,
    SubstitutionConfig, SubstitutionMode, ValidationConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};

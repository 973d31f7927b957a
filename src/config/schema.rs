//! Configuration schema types
//!
//! This module defines the configuration structure for Sigilo. The schema
//! maps one-to-one onto the TOML file; every section validates itself on
//! load so a bad pattern path or unknown substitution mode is reported
//! before any document is touched.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Substitution mode selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubstitutionMode {
    /// Replace PII with realistic synthetic values (fake names, format-
    /// matching identifiers). Referentially consistent within a session.
    #[default]
    Realistic,
    /// Replace PII with numbered category tags (`[PERSON_1]`). Deterministic
    /// and byte-identical across runs; for minimization-oriented
    /// deployments that must not fabricate realistic personal data.
    Placeholder,
}

impl std::fmt::Display for SubstitutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Realistic => write!(f, "realistic"),
            Self::Placeholder => write!(f, "placeholder"),
        }
    }
}

/// Main Sigilo configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SigiloConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Detection settings (patterns, stop terms, recognizer)
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Substitution settings
    #[serde(default)]
    pub substitution: SubstitutionConfig,

    /// Mapping store settings
    #[serde(default)]
    pub mapping: MappingConfig,

    /// Leak validation settings (validator disabled when absent)
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Audit logging configuration
    #[serde(default)]
    pub audit: AuditConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SigiloConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error message naming the offending section/value.
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.detection.validate()?;
        self.validation.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Document locale. Only pt-BR is supported; detection patterns,
    /// stop terms and the synthetic generator are all locale-bound.
    #[serde(default = "default_locale")]
    pub locale: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            locale: default_locale(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        if !matches!(self.locale.as_str(), "pt-BR" | "pt_BR") {
            return Err(format!(
                "Unsupported locale '{}': only pt-BR is supported",
                self.locale
            ));
        }
        Ok(())
    }
}

/// Detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Path to a pattern library TOML file. Built-in Brazilian patterns
    /// are used when absent.
    pub pattern_library: Option<PathBuf>,

    /// Path to a stop-term TOML file. Built-in legal/functional terms
    /// are used when absent.
    pub stop_terms: Option<PathBuf>,

    /// Minimum pattern confidence; patterns below it are skipped.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// Enable the named-entity recognizer. When disabled (or when the
    /// lexicon fails to load) the pipeline runs pattern-only.
    #[serde(default = "default_true")]
    pub ner_enabled: bool,

    /// Directory holding recognizer lexicons. Built-in pt-BR lexicons
    /// are used when absent.
    pub lexicon_dir: Option<PathBuf>,

    /// Run the recognizer in entity-only mode, skipping auxiliary
    /// annotation stages not needed for entity recognition.
    #[serde(default = "default_true")]
    pub entity_only: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            pattern_library: None,
            stop_terms: None,
            confidence_threshold: default_confidence_threshold(),
            ner_enabled: true,
            lexicon_dir: None,
            entity_only: true,
        }
    }
}

impl DetectionConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref path) = self.pattern_library {
            if !path.exists() {
                return Err(format!("Pattern library not found: {}", path.display()));
            }
            if path.extension().and_then(|s| s.to_str()) != Some("toml") {
                return Err(format!(
                    "Pattern library must be a TOML file: {}",
                    path.display()
                ));
            }
        }
        if let Some(ref path) = self.stop_terms {
            if !path.exists() {
                return Err(format!("Stop-term file not found: {}", path.display()));
            }
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(format!(
                "confidence_threshold must be within 0.0..=1.0, got {}",
                self.confidence_threshold
            ));
        }
        Ok(())
    }
}

/// Substitution configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SubstitutionConfig {
    /// Substitution mode (realistic or placeholder)
    #[serde(default)]
    pub mode: SubstitutionMode,

    /// Seed for the synthetic generator. Realistic runs are reproducible
    /// when set; placeholder runs are deterministic regardless.
    pub seed: Option<u64>,
}

/// Mapping store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingConfig {
    /// Directory where session mapping files are persisted
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
        }
    }
}

/// Leak validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Enable the second-pass leak validator
    #[serde(default)]
    pub enabled: bool,

    /// OpenAI-compatible chat completions endpoint base URL
    pub endpoint: Option<String>,

    /// Model name passed to the endpoint
    #[serde(default = "default_validation_model")]
    pub model: String,

    /// API key for the endpoint; use `${VAR}` substitution in TOML
    #[serde(default)]
    pub api_key: Option<crate::config::SecretString>,

    /// Maximum chunk size in bytes fed to the model per request
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,

    /// Request timeout in seconds
    #[serde(default = "default_validation_timeout_secs")]
    pub timeout_secs: u64,

    /// Upper bound on findings returned per document
    #[serde(default = "default_max_findings")]
    pub max_findings: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            model: default_validation_model(),
            api_key: None,
            max_chunk_chars: default_max_chunk_chars(),
            timeout_secs: default_validation_timeout_secs(),
            max_findings: default_max_findings(),
        }
    }
}

impl ValidationConfig {
    fn validate(&self) -> Result<(), String> {
        if self.enabled {
            if self.endpoint.as_deref().unwrap_or("").is_empty() {
                return Err(
                    "validation.endpoint is required when validation is enabled".to_string()
                );
            }
            if self.max_chunk_chars < 200 {
                return Err(format!(
                    "validation.max_chunk_chars must be at least 200, got {}",
                    self.max_chunk_chars
                ));
            }
        }
        Ok(())
    }
}

/// Audit logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enable audit logging
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Audit log file path
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_path: default_audit_log_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_log_dir")]
    pub local_path: String,

    /// Rotation policy (daily, hourly)
    #[serde(default = "default_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_log_dir(),
            local_rotation: default_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if !matches!(self.local_rotation.as_str(), "daily" | "hourly") {
            return Err(format!(
                "Invalid local_rotation '{}'. Must be 'daily' or 'hourly'",
                self.local_rotation
            ));
        }
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_locale() -> String {
    "pt-BR".to_string()
}

fn default_confidence_threshold() -> f32 {
    0.7
}

fn default_true() -> bool {
    true
}

fn default_store_dir() -> PathBuf {
    PathBuf::from("./mappings")
}

fn default_validation_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_chunk_chars() -> usize {
    2000
}

fn default_validation_timeout_secs() -> u64 {
    30
}

fn default_max_findings() -> usize {
    50
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/anonymization.log")
}

fn default_log_dir() -> String {
    "./logs".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

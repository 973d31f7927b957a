//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{SigiloConfig, SubstitutionMode};
use crate::domain::errors::SigiloError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`SigiloConfig`]
/// 4. Applies environment variable overrides (`SIGILO_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns a `Configuration` error if the file cannot be read, a referenced
/// environment variable is missing, parsing fails, or validation fails.
pub fn load_config(path: impl AsRef<Path>) -> Result<SigiloConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SigiloError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SigiloError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: SigiloConfig = toml::from_str(&contents)
        .map_err(|e| SigiloError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        SigiloError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`.
/// Comment lines are left untouched. Missing variables are collected and
/// reported together.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(SigiloError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the SIGILO_* prefix
///
/// Variables follow the pattern SIGILO_<SECTION>_<KEY>, for example
/// SIGILO_SUBSTITUTION_MODE or SIGILO_VALIDATION_ENDPOINT.
fn apply_env_overrides(config: &mut SigiloConfig) -> Result<()> {
    if let Ok(val) = std::env::var("SIGILO_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    if let Ok(val) = std::env::var("SIGILO_DETECTION_CONFIDENCE_THRESHOLD") {
        if let Ok(threshold) = val.parse() {
            config.detection.confidence_threshold = threshold;
        }
    }
    if let Ok(val) = std::env::var("SIGILO_DETECTION_NER_ENABLED") {
        config.detection.ner_enabled = val.parse().unwrap_or(true);
    }

    if let Ok(val) = std::env::var("SIGILO_SUBSTITUTION_MODE") {
        config.substitution.mode = match val.to_lowercase().as_str() {
            "realistic" => SubstitutionMode::Realistic,
            "placeholder" => SubstitutionMode::Placeholder,
            _ => {
                return Err(SigiloError::Configuration(format!(
                    "Invalid SIGILO_SUBSTITUTION_MODE: {val}"
                )))
            }
        };
    }

    if let Ok(val) = std::env::var("SIGILO_MAPPING_STORE_DIR") {
        config.mapping.store_dir = val.into();
    }

    if let Ok(val) = std::env::var("SIGILO_VALIDATION_ENDPOINT") {
        config.validation.endpoint = Some(val);
    }
    if let Ok(val) = std::env::var("SIGILO_VALIDATION_MODEL") {
        config.validation.model = val;
    }
    if let Ok(val) = std::env::var("SIGILO_VALIDATION_API_KEY") {
        config.validation.api_key = Some(super::secret::secret_string(val));
    }

    if let Ok(val) = std::env::var("SIGILO_AUDIT_ENABLED") {
        config.audit.enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("SIGILO_AUDIT_LOG_PATH") {
        config.audit.log_path = val.into();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("SIGILO_TEST_SUBST_VAR", "substituted");
        let input = "value = \"${SIGILO_TEST_SUBST_VAR}\"\n";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("substituted"));
        std::env::remove_var("SIGILO_TEST_SUBST_VAR");
    }

    #[test]
    fn test_substitute_missing_var_fails() {
        let input = "value = \"${SIGILO_TEST_DEFINITELY_MISSING}\"\n";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err
            .to_string()
            .contains("SIGILO_TEST_DEFINITELY_MISSING"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        let input = "# uses ${SIGILO_TEST_COMMENTED_VAR}\nvalue = 1\n";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${SIGILO_TEST_COMMENTED_VAR}"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("/nonexistent/sigilo.toml").unwrap_err();
        assert!(matches!(err, SigiloError::Configuration(_)));
    }
}

//! Integration tests for configuration loading

use secrecy::ExposeSecret;
use sigilo::config::{load_config, SubstitutionMode};
use sigilo::domain::SigiloError;
use tempfile::tempdir;

#[test]
fn test_load_full_config_with_env_substitution() {
    std::env::set_var("SIGILO_TEST_CFG_API_KEY", "sk-test-123");

    let dir = tempdir().unwrap();
    let path = dir.path().join("sigilo.toml");
    std::fs::write(
        &path,
        r#"
[application]
log_level = "debug"
locale = "pt-BR"

[detection]
confidence_threshold = 0.8
ner_enabled = true
entity_only = true

[substitution]
mode = "placeholder"
seed = 99

[mapping]
store_dir = "./tmp-mappings"

[validation]
enabled = true
endpoint = "https://llm.interno.example/v1"
model = "scan-model"
api_key = "${SIGILO_TEST_CFG_API_KEY}"

[audit]
enabled = false
"#,
    )
    .unwrap();

    let config = load_config(&path).unwrap();

    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.detection.confidence_threshold, 0.8);
    assert_eq!(config.substitution.mode, SubstitutionMode::Placeholder);
    assert_eq!(config.substitution.seed, Some(99));
    assert!(config.validation.enabled);
    assert_eq!(
        config.validation.api_key.as_ref().unwrap().expose_secret(),
        "sk-test-123"
    );
    assert!(!config.audit.enabled);

    std::env::remove_var("SIGILO_TEST_CFG_API_KEY");
}

#[test]
fn test_missing_env_var_is_configuration_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sigilo.toml");
    std::fs::write(
        &path,
        r#"
[validation]
enabled = true
endpoint = "https://llm.interno.example/v1"
api_key = "${SIGILO_TEST_CFG_MISSING_KEY}"
"#,
    )
    .unwrap();

    let err = load_config(&path).unwrap_err();
    assert!(matches!(err, SigiloError::Configuration(_)));
    assert!(err.to_string().contains("SIGILO_TEST_CFG_MISSING_KEY"));
}

#[test]
fn test_invalid_substitution_mode_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sigilo.toml");
    std::fs::write(
        &path,
        r#"
[substitution]
mode = "scramble"
"#,
    )
    .unwrap();

    let err = load_config(&path).unwrap_err();
    assert!(matches!(err, SigiloError::Configuration(_)));
}

#[test]
fn test_unsupported_locale_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sigilo.toml");
    std::fs::write(
        &path,
        r#"
[application]
locale = "en-US"
"#,
    )
    .unwrap();

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("locale"));
}

#[test]
fn test_minimal_config_uses_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sigilo.toml");
    std::fs::write(&path, "").unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.application.locale, "pt-BR");
    assert_eq!(config.substitution.mode, SubstitutionMode::Realistic);
    assert!(config.detection.ner_enabled);
    assert!(!config.validation.enabled);
}

#[test]
fn test_nonexistent_pattern_library_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sigilo.toml");
    std::fs::write(
        &path,
        r#"
[detection]
pattern_library = "/nonexistent/patterns.toml"
"#,
    )
    .unwrap();

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("Pattern library"));
}

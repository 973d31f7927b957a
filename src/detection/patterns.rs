//! Pattern library for PII detection
//!
//! Patterns load from TOML, either the embedded Brazilian defaults or an
//! external file. Every pattern is compiled and word-bounded at build time;
//! a malformed regex or unknown category is a configuration error reported
//! at startup, never a per-document failure.

use crate::domain::{PiiCategory, Result, SigiloError};
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Pattern definition from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct PatternDefinition {
    /// Regex patterns for this category
    pub patterns: Vec<String>,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
    /// PII category label
    pub category: String,
}

/// Compiled pattern with metadata
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// Pattern name from the library (used in error messages)
    pub name: String,
    /// Compiled regex
    pub regex: Regex,
    /// PII category
    pub category: PiiCategory,
    /// Confidence score
    pub confidence: f32,
}

/// Pattern library container
///
/// BTreeMap keeps compilation order (and therefore candidate emission
/// order) independent of hash seeds.
#[derive(Debug, Deserialize)]
struct PatternLibrary {
    patterns: BTreeMap<String, PatternDefinition>,
}

/// Pattern registry for PII detection
#[derive(Debug)]
pub struct PatternRegistry {
    patterns: Vec<CompiledPattern>,
    patterns_by_category: HashMap<PiiCategory, Vec<CompiledPattern>>,
}

impl PatternRegistry {
    /// Create a new pattern registry from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            SigiloError::Configuration(format!(
                "Failed to read pattern library {}: {e}",
                path.as_ref().display()
            ))
        })?;

        Self::from_toml(&content)
    }

    /// Create a pattern registry from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let library: PatternLibrary = toml::from_str(content).map_err(|e| {
            SigiloError::Configuration(format!("Failed to parse pattern library TOML: {e}"))
        })?;

        let mut patterns = Vec::new();
        let mut patterns_by_category: HashMap<PiiCategory, Vec<CompiledPattern>> = HashMap::new();

        for (name, def) in library.patterns {
            if !(0.0..=1.0).contains(&def.confidence) {
                return Err(SigiloError::Configuration(format!(
                    "Invalid confidence in pattern '{}': {}",
                    name, def.confidence
                )));
            }

            let category = PiiCategory::parse(&def.category).map_err(|e| {
                SigiloError::Configuration(format!("Invalid category in pattern '{name}': {e}"))
            })?;

            for pattern_str in &def.patterns {
                let bounded = ensure_word_bounded(pattern_str);
                let regex = Regex::new(&bounded).map_err(|e| {
                    SigiloError::Configuration(format!(
                        "Invalid regex in pattern '{name}': {pattern_str}: {e}"
                    ))
                })?;

                let compiled = CompiledPattern {
                    name: name.clone(),
                    regex,
                    category,
                    confidence: def.confidence,
                };

                patterns.push(compiled.clone());
                patterns_by_category
                    .entry(category)
                    .or_default()
                    .push(compiled);
            }
        }

        Ok(Self {
            patterns,
            patterns_by_category,
        })
    }

    /// Create a registry with the built-in Brazilian patterns
    pub fn default_patterns() -> Result<Self> {
        let default_toml = include_str!("../../patterns/pii_patterns.toml");
        Self::from_toml(default_toml)
    }

    /// Get all patterns
    pub fn all_patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    /// Get patterns for a specific category
    pub fn patterns_for_category(&self, category: PiiCategory) -> Option<&[CompiledPattern]> {
        self.patterns_by_category
            .get(&category)
            .map(|v| v.as_slice())
    }
}

/// Wrap a pattern in `\b(?:...)\b` unless it already carries its own
/// boundary anchors. Matches must never start or end mid-word.
fn ensure_word_bounded(pattern: &str) -> String {
    if pattern.contains("\\b") {
        pattern.to_string()
    } else {
        format!(r"\b(?:{pattern})\b")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_default_patterns() {
        let registry = PatternRegistry::default_patterns().unwrap();
        assert!(!registry.all_patterns().is_empty());
    }

    #[test]
    fn test_email_pattern() {
        let registry = PatternRegistry::default_patterns().unwrap();
        let email_patterns = registry.patterns_for_category(PiiCategory::Email).unwrap();
        assert!(!email_patterns.is_empty());

        let pattern = &email_patterns[0];
        assert!(pattern.regex.is_match("joana.silva@exemplo.com.br"));
        assert!(!pattern.regex.is_match("not-an-email"));
    }

    #[test]
    fn test_cpf_pattern() {
        let registry = PatternRegistry::default_patterns().unwrap();
        let id_patterns = registry
            .patterns_for_category(PiiCategory::IdNumber)
            .unwrap();

        let text = "CPF: 123.456.789-00";
        let has_match = id_patterns.iter().any(|p| p.regex.is_match(text));
        assert!(has_match);
    }

    #[test]
    fn test_phone_pattern() {
        let registry = PatternRegistry::default_patterns().unwrap();
        let phone_patterns = registry.patterns_for_category(PiiCategory::Phone).unwrap();

        let text = "Seu telefone é (11) 98765-4321";
        let has_match = phone_patterns.iter().any(|p| p.regex.is_match(text));
        assert!(has_match);
    }

    #[test]
    fn test_invalid_regex_is_configuration_error() {
        let toml = r#"
[patterns.bad]
patterns = ['(unclosed']
category = "EMAIL"
confidence = 0.9
"#;
        let err = PatternRegistry::from_toml(toml).unwrap_err();
        assert!(matches!(err, SigiloError::Configuration(_)));
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn test_unknown_category_is_configuration_error() {
        let toml = r#"
[patterns.passport]
patterns = ['[A-Z]{2}\d{6}']
category = "PASSPORT"
confidence = 0.9
"#;
        let err = PatternRegistry::from_toml(toml).unwrap_err();
        assert!(matches!(err, SigiloError::Configuration(_)));
        assert!(err.to_string().contains("passport"));
    }

    #[test]
    fn test_ensure_word_bounded() {
        assert_eq!(ensure_word_bounded(r"\d{3}"), r"\b(?:\d{3})\b");
        assert_eq!(ensure_word_bounded(r"\b\d{3}\b"), r"\b\d{3}\b");
    }

    #[test]
    fn test_word_bounding_prevents_midword_match() {
        let toml = r#"
[patterns.code]
patterns = ['\d{4}']
category = "ID_NUMBER"
confidence = 0.9
"#;
        let registry = PatternRegistry::from_toml(toml).unwrap();
        let pattern = &registry.all_patterns()[0];
        assert!(pattern.regex.is_match("code 1234 end"));
        assert!(!pattern.regex.is_match("abc12345678def"));
    }
}

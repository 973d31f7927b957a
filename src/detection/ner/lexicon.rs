//! Lexicon bundle backing the named-entity recognizer and the synthetic
//! generator.
//!
//! Lists are plain text, one entry per line, `#` comments. The embedded
//! pt-BR bundle is compiled in; an external directory can replace it. A
//! missing or unreadable external bundle is a model-unavailable condition
//! for the recognizer only; the rest of the pipeline keeps working.

use crate::domain::{Result, SigiloError};
use std::collections::HashSet;
use std::path::Path;

/// Shared name/place lexicons for pt-BR.
#[derive(Debug)]
pub struct NameLexicon {
    given_names: HashSet<String>,
    surnames: HashSet<String>,
    municipalities: HashSet<String>,
    /// Every word occurring in any municipality phrase, for joining
    /// multi-word place names during recognition.
    municipality_words: HashSet<String>,
    org_keywords: HashSet<String>,
    /// Street names kept in display form for the synthetic generator.
    streets: Vec<String>,
}

fn municipality_words(municipalities: &HashSet<String>) -> HashSet<String> {
    municipalities
        .iter()
        .flat_map(|m| m.split_whitespace())
        .map(str::to_string)
        .collect()
}

impl NameLexicon {
    /// Load the embedded pt-BR bundle.
    pub fn embedded() -> Self {
        let municipalities = parse_set(include_str!("../../../lexicons/municipalities.txt"));
        Self {
            given_names: parse_set(include_str!("../../../lexicons/given_names.txt")),
            surnames: parse_set(include_str!("../../../lexicons/surnames.txt")),
            municipality_words: municipality_words(&municipalities),
            municipalities,
            org_keywords: parse_set(include_str!("../../../lexicons/org_keywords.txt")),
            streets: parse_list(include_str!("../../../lexicons/streets.txt")),
        }
    }

    /// Load a bundle from a directory holding the five list files.
    ///
    /// # Errors
    ///
    /// Returns `ModelUnavailable` naming the missing file; callers degrade
    /// to pattern-only detection.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let municipalities = parse_set(&read_list(dir, "municipalities.txt")?);
        Ok(Self {
            given_names: parse_set(&read_list(dir, "given_names.txt")?),
            surnames: parse_set(&read_list(dir, "surnames.txt")?),
            municipality_words: municipality_words(&municipalities),
            municipalities,
            org_keywords: parse_set(&read_list(dir, "org_keywords.txt")?),
            streets: parse_list(&read_list(dir, "streets.txt")?),
        })
    }

    pub fn is_given_name(&self, word: &str) -> bool {
        self.given_names.contains(&word.to_lowercase())
    }

    pub fn is_surname(&self, word: &str) -> bool {
        self.surnames.contains(&word.to_lowercase())
    }

    pub fn is_municipality(&self, phrase: &str) -> bool {
        self.municipalities.contains(&phrase.to_lowercase())
    }

    /// True when the word occurs inside any known municipality phrase.
    pub fn is_municipality_word(&self, word: &str) -> bool {
        self.municipality_words.contains(&word.to_lowercase())
    }

    pub fn is_org_keyword(&self, word: &str) -> bool {
        self.org_keywords.contains(&word.to_lowercase())
    }

    pub fn given_names(&self) -> impl Iterator<Item = &str> {
        self.given_names.iter().map(String::as_str)
    }

    pub fn surnames(&self) -> impl Iterator<Item = &str> {
        self.surnames.iter().map(String::as_str)
    }

    pub fn municipalities(&self) -> impl Iterator<Item = &str> {
        self.municipalities.iter().map(String::as_str)
    }

    pub fn streets(&self) -> &[String] {
        &self.streets
    }

    /// True when any list both the recognizer and the generator sample
    /// from is missing its entries.
    pub fn is_empty(&self) -> bool {
        self.given_names.is_empty()
            || self.surnames.is_empty()
            || self.municipalities.is_empty()
            || self.streets.is_empty()
    }
}

fn read_list(dir: &Path, file: &str) -> Result<String> {
    let path = dir.join(file);
    std::fs::read_to_string(&path).map_err(|e| SigiloError::ModelUnavailable {
        component: "ner-lexicon".to_string(),
        reason: format!("failed to read {}: {e}", path.display()),
    })
}

fn parse_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn parse_set(content: &str) -> HashSet<String> {
    parse_list(content)
        .into_iter()
        .map(|l| l.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_bundle_loads() {
        let lexicon = NameLexicon::embedded();
        assert!(!lexicon.is_empty());
        assert!(lexicon.is_given_name("João"));
        assert!(lexicon.is_given_name("maria"));
        assert!(lexicon.is_surname("Silva"));
        assert!(lexicon.is_municipality("São Paulo"));
        assert!(lexicon.is_org_keyword("Ltda"));
        assert!(!lexicon.streets().is_empty());
    }

    #[test]
    fn test_missing_dir_is_model_unavailable() {
        let err = NameLexicon::from_dir("/nonexistent/lexicons").unwrap_err();
        assert!(matches!(err, SigiloError::ModelUnavailable { .. }));
    }

    #[test]
    fn test_comments_and_blanks_skipped() {
        let set = parse_set("# comment\n\nana\nBruno\n");
        assert_eq!(set.len(), 2);
        assert!(set.contains("ana"));
        assert!(set.contains("bruno"));
    }
}

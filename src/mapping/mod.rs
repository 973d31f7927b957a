//! Reversible mapping model
//!
//! The mapping table is the original↔synthetic correspondence for one
//! session, independent of the document text. One entry per unique
//! original value: repeated occurrences always reuse the same synthetic
//! value, which is what makes exact reversal possible.

pub mod store;

pub use store::MappingStore;

use crate::domain::{PiiCategory, Result, SigiloError};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Serialization format version.
const MAPPING_VERSION: u32 = 1;

/// One original→synthetic correspondence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Synthetic replacement value
    pub synthetic_value: String,
    /// PII category of the original value
    pub category: PiiCategory,
    /// Offset where the original value was first seen in the document
    pub first_seen_offset: usize,
}

/// Mapping table keyed by original value.
///
/// BTreeMap keeps serialization deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingTable {
    entries: BTreeMap<String, MappingEntry>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, original: &str) -> Option<&MappingEntry> {
        self.entries.get(original)
    }

    pub fn insert(&mut self, original: impl Into<String>, entry: MappingEntry) {
        self.entries.insert(original.into(), entry);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MappingEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries in a category, used for placeholder counters.
    pub fn count_in_category(&self, category: PiiCategory) -> usize {
        self.entries
            .values()
            .filter(|e| e.category == category)
            .count()
    }

    /// True when any entry already uses this synthetic value.
    pub fn uses_synthetic(&self, value: &str) -> bool {
        self.entries.values().any(|e| e.synthetic_value == value)
    }

    /// Structural validation: non-empty values, and no two distinct
    /// originals sharing one synthetic value (the non-collision invariant;
    /// reversal is value-based, so a table violating it cannot be reversed).
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashSet<&str> = HashSet::new();
        for (original, entry) in &self.entries {
            if original.is_empty() || entry.synthetic_value.is_empty() {
                return Err(SigiloError::Data(
                    "mapping entry with empty original or synthetic value".to_string(),
                ));
            }
            if !seen.insert(entry.synthetic_value.as_str()) {
                return Err(SigiloError::Data(format!(
                    "conflicting mapping entries: synthetic value '{}' maps to more than one original",
                    entry.synthetic_value
                )));
            }
        }
        Ok(())
    }

    /// Wrap into the persisted document form.
    pub fn to_document(&self, session_id: Option<String>) -> MappingDocument {
        MappingDocument {
            version: MAPPING_VERSION,
            session_id,
            created_at: Utc::now(),
            entries: self.entries.clone(),
        }
    }
}

/// Persisted mapping layout: a versioned wrapper around the table, stable
/// across process restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingDocument {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub entries: BTreeMap<String, MappingEntry>,
}

impl MappingDocument {
    /// Unwrap into a validated table.
    ///
    /// # Errors
    ///
    /// `Data` error on version mismatch or structural invalidity.
    pub fn into_table(self) -> Result<MappingTable> {
        if self.version != MAPPING_VERSION {
            return Err(SigiloError::Data(format!(
                "unsupported mapping version {} (expected {MAPPING_VERSION})",
                self.version
            )));
        }
        let table = MappingTable {
            entries: self.entries,
        };
        table.validate()?;
        Ok(table)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| SigiloError::Data(format!("malformed mapping document: {e}")))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }
}

/// A synthetic-looking token found during reversal with no table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedReversal {
    pub token: String,
    pub offset: usize,
}

/// Result of reversing an anonymized text.
#[derive(Debug, Clone)]
pub struct ReversalOutcome {
    pub text: String,
    /// Occurrences left unchanged because the mapping table doesn't know
    /// them. Non-fatal: collected, never aborting the reversal.
    pub unresolved: Vec<UnresolvedReversal>,
}

/// Reverse an anonymized text using the session's mapping table.
///
/// Replaces every synthetic value with its original, longest synthetic
/// first so no synthetic value can partially shadow another. For any text
/// produced by the substitution engine with this same table, the result is
/// the exact original text.
pub fn reverse(anonymized: &str, table: &MappingTable) -> ReversalOutcome {
    let mut pairs: Vec<(&str, &str)> = table
        .iter()
        .map(|(original, entry)| (entry.synthetic_value.as_str(), original.as_str()))
        .collect();
    pairs.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));

    let mut text = anonymized.to_string();
    for (synthetic, original) in pairs {
        if text.contains(synthetic) {
            text = text.replace(synthetic, original);
        }
    }

    let unresolved = find_unresolved_placeholders(&text);
    ReversalOutcome { text, unresolved }
}

/// Placeholder-shaped tokens (`[CATEGORY_N]`) still present after all
/// table entries were applied.
fn find_unresolved_placeholders(text: &str) -> Vec<UnresolvedReversal> {
    let placeholder = Regex::new(r"\[[A-Z][A-Z_]*_\d+\]").unwrap();
    placeholder
        .find_iter(text)
        .map(|m| UnresolvedReversal {
            token: m.as_str().to_string(),
            offset: m.start(),
        })
        .collect()
}

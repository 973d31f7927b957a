//! Span resolution
//!
//! Reduces the union of pattern-matcher and recognizer outputs to a single
//! ordered, non-overlapping [`ResolvedSpanSet`], then strips whitelisted
//! stop-terms. Resolution is a pure function driven by an explicit priority
//! order, testable in isolation from the detectors:
//!
//! 1. sort candidates by `start`, then descending length;
//! 2. sweep left to right; on overlap a pattern-sourced span beats a
//!    model-sourced one, otherwise the longer span wins;
//! 3. drop any span whose exact text matches a stop-term.
//!
//! Zero-length spans are discarded silently; spans that fall outside the
//! document or off a character boundary are discarded with a warning.

use crate::domain::{ResolvedSpanSet, Result, SigiloError, Span};
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::Path;

/// Whitelist of terms that must never be anonymized.
///
/// Comparison is case-insensitive on the trimmed span text.
#[derive(Debug, Clone, Default)]
pub struct StopTermSet {
    terms: HashSet<String>,
}

#[derive(Debug, Deserialize)]
struct StopTermFile {
    terms: Vec<String>,
}

impl StopTermSet {
    /// Load the embedded pt-BR legal/functional whitelist.
    pub fn embedded() -> Result<Self> {
        Self::from_toml(include_str!("../../patterns/stop_terms.toml"))
    }

    /// Load a whitelist from a TOML file (`terms = [...]`).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            SigiloError::Configuration(format!(
                "Failed to read stop-term file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let file: StopTermFile = toml::from_str(content).map_err(|e| {
            SigiloError::Configuration(format!("Failed to parse stop-term TOML: {e}"))
        })?;
        Ok(Self::from_terms(file.terms))
    }

    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            terms: terms
                .into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, text: &str) -> bool {
        self.terms.contains(&text.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Resolves raw candidate spans into the final non-overlapping set.
pub struct SpanResolver {
    stop_terms: StopTermSet,
}

impl SpanResolver {
    pub fn new(stop_terms: StopTermSet) -> Self {
        Self { stop_terms }
    }

    /// Resolve candidates against the document they index.
    pub fn resolve(&self, document: &str, candidates: Vec<Span>) -> Result<ResolvedSpanSet> {
        let mut valid: Vec<Span> = Vec::with_capacity(candidates.len());
        for span in candidates {
            if span.is_empty() {
                continue;
            }
            if !span.is_valid_for(document) {
                tracing::warn!(
                    start = span.start,
                    end = span.end,
                    category = span.category.label(),
                    "discarding span outside document bounds"
                );
                continue;
            }
            valid.push(span);
        }

        valid.sort_by(compare_candidates);

        let mut kept: Vec<Span> = Vec::with_capacity(valid.len());
        for candidate in valid {
            let decision = kept
                .last()
                .map(|last| (last.overlaps(&candidate), wins_over(&candidate, last)));
            match decision {
                Some((true, true)) => {
                    kept.pop();
                    kept.push(candidate);
                }
                Some((true, false)) => {}
                _ => kept.push(candidate),
            }
        }

        kept.retain(|span| {
            if self.stop_terms.contains(&span.text) {
                tracing::debug!(term = %span.text, "dropping whitelisted stop-term span");
                false
            } else {
                true
            }
        });

        ResolvedSpanSet::new(kept)
    }
}

/// Sort order: by start, then descending length (longer span wins ties),
/// then pattern before model so the sweep sees the strongest candidate
/// first.
fn compare_candidates(a: &Span, b: &Span) -> Ordering {
    a.start
        .cmp(&b.start)
        .then_with(|| b.len().cmp(&a.len()))
        .then_with(|| b.source.priority().cmp(&a.source.priority()))
}

/// Priority table for two overlapping spans: pattern-sourced beats
/// model-sourced, otherwise the longer one wins.
fn wins_over(challenger: &Span, incumbent: &Span) -> bool {
    match challenger
        .source
        .priority()
        .cmp(&incumbent.source.priority())
    {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => challenger.len() > incumbent.len(),
    }
}

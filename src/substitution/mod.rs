//! Substitution engine
//!
//! Consumes the resolved span set, generates or reuses synthetic values,
//! and rewrites the text. Substitution is a pure transformation: it takes
//! the existing mapping table by reference and returns a complete new one,
//! so callers commit all-or-nothing: a cancelled session can never leave
//! a partially-mutated table behind.
//!
//! Guarantees:
//! - referential consistency: the same original value always maps to the
//!   same synthetic value within a session;
//! - non-collision: two distinct originals of the same category never share
//!   a synthetic value (checked, regenerated on collision);
//! - every character outside a resolved span is copied verbatim.

pub mod generator;

pub use generator::SyntheticGenerator;

use crate::config::SubstitutionMode;
use crate::domain::{ResolvedSpanSet, Result, SigiloError, Span};
use crate::mapping::{MappingEntry, MappingTable};

const MAX_GENERATION_RETRIES: usize = 64;

/// Result of one substitution pass.
#[derive(Debug)]
pub struct SubstitutionOutcome {
    pub anonymized_text: String,
    /// Complete mapping table: the caller's existing entries plus every
    /// entry added by this pass.
    pub mapping: MappingTable,
}

/// Rewrites text according to the resolved span set and mapping policy.
pub struct Substituter {
    mode: SubstitutionMode,
    generator: SyntheticGenerator,
}

impl Substituter {
    pub fn new(mode: SubstitutionMode, generator: SyntheticGenerator) -> Self {
        Self { mode, generator }
    }

    /// Substitute all resolved spans in `text`, extending `existing` into
    /// the returned table. `existing` itself is never mutated.
    pub fn substitute(
        &mut self,
        text: &str,
        spans: &ResolvedSpanSet,
        existing: &MappingTable,
    ) -> Result<SubstitutionOutcome> {
        let mut table = existing.clone();

        // First pass, in document order: assign mapping entries so
        // placeholder counters follow first appearance.
        for span in spans {
            if table.get(&span.text).is_some() {
                continue;
            }
            let synthetic = self.next_value(text, &table, span)?;
            table.insert(
                span.text.clone(),
                MappingEntry {
                    synthetic_value: synthetic,
                    category: span.category,
                    first_seen_offset: span.start,
                },
            );
        }

        // Second pass, right to left: rewriting at an offset never shifts
        // the offsets of spans with smaller start.
        let mut anonymized = text.to_string();
        for span in spans.as_slice().iter().rev() {
            let entry = table.get(&span.text).ok_or_else(|| {
                SigiloError::Data(format!(
                    "no mapping entry for resolved span at {}..{}",
                    span.start, span.end
                ))
            })?;
            anonymized.replace_range(span.start..span.end, &entry.synthetic_value);
        }

        Ok(SubstitutionOutcome {
            anonymized_text: anonymized,
            mapping: table,
        })
    }

    /// Pick a synthetic value no other entry uses and that does not occur
    /// anywhere in the source text. The second condition keeps value-based
    /// reversal exact: a synthetic that is also a substring of untouched
    /// text would get rewritten during reversal.
    fn next_value(&mut self, text: &str, table: &MappingTable, span: &Span) -> Result<String> {
        match self.mode {
            SubstitutionMode::Placeholder => {
                let mut n = table.count_in_category(span.category) + 1;
                let mut value = format!("[{}_{}]", span.category.label(), n);
                while table.uses_synthetic(&value) || text.contains(&value) {
                    n += 1;
                    value = format!("[{}_{}]", span.category.label(), n);
                }
                Ok(value)
            }
            SubstitutionMode::Realistic => {
                for _ in 0..MAX_GENERATION_RETRIES {
                    let value = self.generator.generate(span.category, &span.text);
                    if !table.uses_synthetic(&value) && !text.contains(&value) {
                        return Ok(value);
                    }
                }
                Err(SigiloError::Data(format!(
                    "unable to generate a unique synthetic value for category {} after {} attempts",
                    span.category.label(),
                    MAX_GENERATION_RETRIES
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::ner::NameLexicon;
    use crate::domain::{PiiCategory, SpanSource};
    use crate::mapping::reverse;
    use std::sync::Arc;

    fn substituter(mode: SubstitutionMode) -> Substituter {
        let lexicon = Arc::new(NameLexicon::embedded());
        Substituter::new(mode, SyntheticGenerator::new(&lexicon, Some(99)))
    }

    fn resolved(document: &str, needles: &[(&str, PiiCategory)]) -> ResolvedSpanSet {
        let mut spans: Vec<Span> = needles
            .iter()
            .map(|(needle, category)| {
                let start = document.find(needle).unwrap();
                Span::new(
                    start,
                    start + needle.len(),
                    *category,
                    SpanSource::Pattern,
                    *needle,
                )
            })
            .collect();
        spans.sort_by_key(|s| s.start);
        ResolvedSpanSet::new(spans).unwrap()
    }

    /// Spans for every occurrence of a needle, not just the first.
    fn resolved_all(document: &str, needle: &str, category: PiiCategory) -> ResolvedSpanSet {
        let mut spans = Vec::new();
        let mut from = 0;
        while let Some(pos) = document[from..].find(needle) {
            let start = from + pos;
            spans.push(Span::new(
                start,
                start + needle.len(),
                category,
                SpanSource::Model,
                needle,
            ));
            from = start + needle.len();
        }
        ResolvedSpanSet::new(spans).unwrap()
    }

    #[test]
    fn test_repeated_value_yields_single_entry() {
        let doc = "João Silva assinou. João Silva reconheceu a firma.";
        let spans = resolved_all(doc, "João Silva", PiiCategory::Person);
        assert_eq!(spans.len(), 2);

        let outcome = substituter(SubstitutionMode::Realistic)
            .substitute(doc, &spans, &MappingTable::new())
            .unwrap();

        assert_eq!(outcome.mapping.len(), 1);
        let synthetic = &outcome.mapping.get("João Silva").unwrap().synthetic_value;
        assert_eq!(outcome.anonymized_text.matches(synthetic.as_str()).count(), 2);
        assert!(!outcome.anonymized_text.contains("João Silva"));
    }

    #[test]
    fn test_text_outside_spans_is_verbatim() {
        let doc = "Contrato entre João Silva (CPF: 123.456.789-00) e terceiros.";
        let spans = resolved(
            doc,
            &[
                ("João Silva", PiiCategory::Person),
                ("123.456.789-00", PiiCategory::IdNumber),
            ],
        );

        let outcome = substituter(SubstitutionMode::Placeholder)
            .substitute(doc, &spans, &MappingTable::new())
            .unwrap();

        assert_eq!(
            outcome.anonymized_text,
            "Contrato entre [PERSON_1] (CPF: [ID_NUMBER_1]) e terceiros."
        );
    }

    #[test]
    fn test_placeholder_mode_is_byte_identical_across_runs() {
        let doc = "Maria Oliveira, CPF 111.222.333-44, e João Silva.";
        let spans = resolved(
            doc,
            &[
                ("Maria Oliveira", PiiCategory::Person),
                ("111.222.333-44", PiiCategory::IdNumber),
                ("João Silva", PiiCategory::Person),
            ],
        );

        let first = substituter(SubstitutionMode::Placeholder)
            .substitute(doc, &spans, &MappingTable::new())
            .unwrap();
        let second = substituter(SubstitutionMode::Placeholder)
            .substitute(doc, &spans, &MappingTable::new())
            .unwrap();

        assert_eq!(first.anonymized_text, second.anonymized_text);
        assert_eq!(first.mapping, second.mapping);
        // Counters follow first appearance.
        assert!(first.anonymized_text.starts_with("[PERSON_1], CPF [ID_NUMBER_1], e [PERSON_2]."));
    }

    #[test]
    fn test_distinct_originals_never_collide() {
        let doc = "A: 111.111.111-11 B: 222.222.222-22 C: 333.333.333-33";
        let spans = resolved(
            doc,
            &[
                ("111.111.111-11", PiiCategory::IdNumber),
                ("222.222.222-22", PiiCategory::IdNumber),
                ("333.333.333-33", PiiCategory::IdNumber),
            ],
        );

        let outcome = substituter(SubstitutionMode::Realistic)
            .substitute(doc, &spans, &MappingTable::new())
            .unwrap();

        let values: Vec<_> = outcome
            .mapping
            .iter()
            .map(|(_, e)| e.synthetic_value.clone())
            .collect();
        let mut deduped = values.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(values.len(), deduped.len());
        assert!(outcome.mapping.validate().is_ok());
    }

    #[test]
    fn test_existing_table_is_reused_and_not_mutated() {
        let doc = "João Silva voltou.";
        let spans = resolved(doc, &[("João Silva", PiiCategory::Person)]);

        let mut existing = MappingTable::new();
        existing.insert(
            "João Silva",
            MappingEntry {
                synthetic_value: "Carlos Pereira".to_string(),
                category: PiiCategory::Person,
                first_seen_offset: 0,
            },
        );
        let before = existing.clone();

        let outcome = substituter(SubstitutionMode::Realistic)
            .substitute(doc, &spans, &existing)
            .unwrap();

        assert_eq!(existing, before);
        assert_eq!(outcome.anonymized_text, "Carlos Pereira voltou.");
    }

    #[test]
    fn test_round_trip_realistic() {
        let doc = "Contrato entre João Silva (CPF: 123.456.789-00) e Maria Oliveira.";
        let spans = resolved(
            doc,
            &[
                ("João Silva", PiiCategory::Person),
                ("123.456.789-00", PiiCategory::IdNumber),
                ("Maria Oliveira", PiiCategory::Person),
            ],
        );

        let outcome = substituter(SubstitutionMode::Realistic)
            .substitute(doc, &spans, &MappingTable::new())
            .unwrap();
        assert!(!outcome.anonymized_text.contains("João Silva"));
        assert!(!outcome.anonymized_text.contains("123.456.789-00"));

        let reverted = reverse(&outcome.anonymized_text, &outcome.mapping);
        assert_eq!(reverted.text, doc);
        assert!(reverted.unresolved.is_empty());
    }

    #[test]
    fn test_round_trip_placeholder() {
        let doc = "Maria Oliveira (CPF: 123.456.789-00) compareceu.";
        let spans = resolved(
            doc,
            &[
                ("Maria Oliveira", PiiCategory::Person),
                ("123.456.789-00", PiiCategory::IdNumber),
            ],
        );

        let outcome = substituter(SubstitutionMode::Placeholder)
            .substitute(doc, &spans, &MappingTable::new())
            .unwrap();
        let reverted = reverse(&outcome.anonymized_text, &outcome.mapping);
        assert_eq!(reverted.text, doc);
    }

    #[test]
    fn test_empty_span_set_is_identity() {
        let doc = "nada para substituir";
        let outcome = substituter(SubstitutionMode::Realistic)
            .substitute(doc, &ResolvedSpanSet::empty(), &MappingTable::new())
            .unwrap();
        assert_eq!(outcome.anonymized_text, doc);
        assert!(outcome.mapping.is_empty());
    }
}

//! Session reporting
//!
//! Per-run statistics formatted for console and JSON: spans by category
//! and source, unique mapping entries, warnings, timing. Reports carry no
//! plaintext PII, only counts and synthetic samples.

use crate::config::SubstitutionMode;
use crate::domain::{PiiCategory, Session, SpanSource};
use serde::Serialize;
use std::collections::HashMap;

/// Report for one anonymization session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub session_id: String,
    pub substitution_mode: String,
    /// Total spans substituted
    pub total_spans: usize,
    /// Span counts by category
    pub spans_by_category: HashMap<PiiCategory, usize>,
    /// Span counts from the pattern matcher
    pub pattern_spans: usize,
    /// Span counts from the named-entity recognizer
    pub model_spans: usize,
    /// Unique mapping entries in the session table
    pub unique_entries: usize,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
    /// Warnings surfaced during the run (degraded detectors etc.)
    pub warnings: Vec<String>,
    /// Synthetic sample values per category (never originals)
    pub samples: Vec<ReportSample>,
}

/// A synthetic replacement value shown in the report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSample {
    pub category: PiiCategory,
    pub synthetic_value: String,
}

const MAX_SAMPLES: usize = 10;

impl SessionReport {
    pub fn new(
        session: &Session,
        mode: SubstitutionMode,
        processing_time_ms: u64,
        warnings: Vec<String>,
    ) -> Self {
        let mut spans_by_category = HashMap::new();
        let mut pattern_spans = 0;
        let mut model_spans = 0;
        for span in &session.resolved {
            *spans_by_category.entry(span.category).or_insert(0) += 1;
            match span.source {
                SpanSource::Pattern => pattern_spans += 1,
                SpanSource::Model => model_spans += 1,
            }
        }

        let samples = session
            .mapping
            .iter()
            .take(MAX_SAMPLES)
            .map(|(_, entry)| ReportSample {
                category: entry.category,
                synthetic_value: entry.synthetic_value.clone(),
            })
            .collect();

        Self {
            session_id: session.id.to_string(),
            substitution_mode: mode.to_string(),
            total_spans: session.resolved.len(),
            spans_by_category,
            pattern_spans,
            model_spans,
            unique_entries: session.mapping.len(),
            processing_time_ms,
            warnings,
            samples,
        }
    }

    /// Format report for console output
    pub fn format_console(&self) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str("                    ANONYMIZATION REPORT                       \n");
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');
        output.push_str(&format!("  Session:          {}\n", self.session_id));
        output.push_str(&format!("  Mode:             {}\n", self.substitution_mode));
        output.push_str(&format!("  Spans Replaced:   {}\n", self.total_spans));
        output.push_str(&format!(
            "  Sources:          {} pattern / {} model\n",
            self.pattern_spans, self.model_spans
        ));
        output.push_str(&format!("  Unique Entities:  {}\n", self.unique_entries));
        output.push_str(&format!(
            "  Processing Time:  {} ms\n",
            self.processing_time_ms
        ));

        if !self.spans_by_category.is_empty() {
            output.push('\n');
            output.push_str("  BY CATEGORY\n");
            output.push_str("  ─────────────────────────────────────────\n");
            let mut categories: Vec<_> = self.spans_by_category.iter().collect();
            categories.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            for (category, count) in categories {
                output.push_str(&format!("  {:24} {:>5}\n", category.label(), count));
            }
        }

        if !self.warnings.is_empty() {
            output.push('\n');
            output.push_str("  WARNINGS\n");
            output.push_str("  ─────────────────────────────────────────\n");
            for warning in &self.warnings {
                output.push_str(&format!("  • {warning}\n"));
            }
        }

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output
    }

    /// Format report as JSON
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

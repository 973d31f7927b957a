//! Regex-based PII detector
//!
//! Deterministic: the same input text always yields the same span set.

use super::patterns::PatternRegistry;
use super::SpanDetector;
use crate::domain::{Span, SpanSource};
use std::sync::Arc;

/// Regex-based PII detector over a compiled pattern registry.
pub struct PatternDetector {
    registry: Arc<PatternRegistry>,
    confidence_threshold: f32,
}

impl PatternDetector {
    /// Create a detector over a pattern registry.
    pub fn new(registry: Arc<PatternRegistry>) -> Self {
        Self {
            registry,
            confidence_threshold: 0.7,
        }
    }

    /// Set the confidence threshold; patterns below it are skipped.
    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold.clamp(0.0, 1.0);
        self
    }
}

impl SpanDetector for PatternDetector {
    fn detect(&self, text: &str) -> Vec<Span> {
        let mut spans = Vec::new();

        for pattern in self.registry.all_patterns() {
            if pattern.confidence < self.confidence_threshold {
                continue;
            }

            for mat in pattern.regex.find_iter(text) {
                if mat.start() == mat.end() {
                    continue;
                }
                spans.push(Span::new(
                    mat.start(),
                    mat.end(),
                    pattern.category,
                    SpanSource::Pattern,
                    mat.as_str(),
                ));
            }
        }

        spans
    }

    fn name(&self) -> &'static str {
        "pattern"
    }
}

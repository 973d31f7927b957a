//! PII detection module
//!
//! Two detectors feed the span resolver:
//! - [`regex::PatternDetector`] for structurally regular PII (identifiers,
//!   phones, emails), driven by a TOML [`patterns::PatternRegistry`];
//! - [`ner::LexiconRecognizer`] for names, addresses and organizations.
//!
//! Both emit raw, possibly overlapping [`Span`]s; overlap resolution and
//! whitelisting belong to the resolver, never to a detector.

pub mod ner;
pub mod patterns;
pub mod regex;

use crate::domain::Span;

/// Trait for span detector implementations.
pub trait SpanDetector: Send + Sync {
    /// Detect PII spans in document text. Offsets returned always slice
    /// the input exactly: `text[span.start..span.end] == span.text`.
    fn detect(&self, text: &str) -> Vec<Span>;

    /// Detector identifier used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Whether the detector's backing data/model is loaded and usable.
    fn is_available(&self) -> bool {
        true
    }
}

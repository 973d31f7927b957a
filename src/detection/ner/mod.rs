//! Named-entity detection
//!
//! The recognizer produces labeled spans for names, addresses and
//! organizations. It is deterministic for a fixed lexicon bundle + input,
//! and every span it emits indexes the original text exactly; no internal
//! re-tokenization ever shifts an offset.
//!
//! The lexicon bundle is loaded once and shared read-only ([`Arc`]) across
//! sessions; it is injected into the recognizer rather than living in a
//! module-level singleton.

pub mod lexicon;
pub mod recognizer;

pub use lexicon::NameLexicon;
pub use recognizer::{LexiconRecognizer, RecognizerOptions};

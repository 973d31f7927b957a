// Sigilo - PII Anonymization for Brazilian Legal Documents
// Copyright (c) 2025 Sigilo Contributors
// Licensed under the MIT License

//! # Sigilo - PII anonymization for Brazilian legal documents
//!
//! Sigilo detects personally identifiable information in extracted
//! document text, replaces it with synthetic substitutes, keeps a
//! reversible mapping, and audits residual leakage.
//!
//! ## Pipeline
//!
//! Data flows strictly left to right:
//!
//! ```text
//! raw text → spans → resolved spans → anonymized text + mapping → validation report
//! ```
//!
//! - **Detection**: a regex [`detection::regex::PatternDetector`] for
//!   structurally regular PII (CPF, CNPJ, RG, CEP, phone, email) and a
//!   lexicon-driven [`detection::ner::LexiconRecognizer`] for names,
//!   addresses and organizations.
//! - **Resolution**: [`resolver::SpanResolver`] merges overlapping spans
//!   (pattern beats model, longer beats shorter) and strips whitelisted
//!   stop-terms.
//! - **Substitution**: [`substitution::Substituter`] rewrites the text
//!   with referentially consistent synthetic values, either realistic or
//!   `[CATEGORY_N]` placeholders.
//! - **Mapping**: [`mapping::MappingStore`] persists the
//!   original↔synthetic table per session; [`mapping::reverse`]
//!   reconstructs the exact original text.
//! - **Validation**: [`validation::Validator`] re-scans anonymized text
//!   with a language model and reports suspected residual PII.
//!
//! Reversal flows right to left using only the mapping store.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sigilo::config::SigiloConfig;
//! use sigilo::engine::AnonymizationEngine;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SigiloConfig::default();
//!     let engine = AnonymizationEngine::new(config)?;
//!
//!     let outcome = engine
//!         .anonymize("Contrato entre João Silva (CPF: 123.456.789-00) e Maria Oliveira.", None)
//!         .await?;
//!
//!     println!("{}", outcome.session.anonymized_text);
//!     let reverted = engine.revert(&outcome.session.anonymized_text, &outcome.session.id)?;
//!     assert!(reverted.unresolved.is_empty());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`domain::Result`] with
//! [`domain::SigiloError`]: configuration problems fail at startup, an
//! unavailable model degrades its component, data problems fail only the
//! operation that hit them.
//!
//! ## Logging
//!
//! Structured logging via `tracing`; call sites log counts, categories and
//! hashes, never plaintext PII.

pub mod audit;
pub mod cli;
pub mod config;
pub mod detection;
pub mod domain;
pub mod engine;
pub mod logging;
pub mod mapping;
pub mod report;
pub mod resolver;
pub mod substitution;
pub mod validation;

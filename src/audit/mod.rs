//! Audit trail for anonymization sessions
//!
//! Records what was anonymized without ever writing plaintext PII: each
//! session appends one JSONL entry carrying SHA-256 hashes of the original
//! values alongside category/source metadata.

pub mod logger;

pub use logger::AuditLogger;

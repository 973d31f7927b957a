//! Audit logger for anonymization sessions

use crate::config::SubstitutionMode;
use crate::domain::{Result, Session, SigiloError};
use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Audit log entry, one JSON line per session.
#[derive(Debug, Serialize)]
struct AuditLogEntry {
    timestamp: String,
    session_id: String,
    substitution_mode: String,
    span_count: usize,
    unique_entries: usize,
    processing_time_ms: u64,
    detections: Vec<AuditDetection>,
}

/// Per-span audit record with hashed original value.
#[derive(Debug, Serialize)]
struct AuditDetection {
    category: String,
    source: String,
    /// SHA-256 hash of the original value (never log plaintext PII)
    value_hash: String,
}

/// Appends session audit entries to a JSONL file.
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    /// Create a new audit logger, ensuring the parent directory exists.
    pub fn new(log_path: PathBuf) -> Result<Self> {
        if let Some(parent) = log_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    SigiloError::Io(format!(
                        "failed to create audit log directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }
        Ok(Self { log_path })
    }

    /// Append one entry for a completed session.
    pub fn log_session(
        &self,
        session: &Session,
        mode: SubstitutionMode,
        processing_time_ms: u64,
    ) -> Result<()> {
        let entry = AuditLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            session_id: session.id.to_string(),
            substitution_mode: mode.to_string(),
            span_count: session.resolved.len(),
            unique_entries: session.mapping.len(),
            processing_time_ms,
            detections: session
                .resolved
                .iter()
                .map(|span| AuditDetection {
                    category: span.category.label().to_string(),
                    source: format!("{:?}", span.source).to_lowercase(),
                    value_hash: hash_value(&span.text),
                })
                .collect(),
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| {
                SigiloError::Io(format!(
                    "failed to open audit log {}: {e}",
                    self.log_path.display()
                ))
            })?;

        let json_line = serde_json::to_string(&entry)?;
        writeln!(file, "{json_line}")
            .map_err(|e| SigiloError::Io(format!("failed to write audit entry: {e}")))?;

        Ok(())
    }
}

/// SHA-256 hash of a PII value for the audit trail.
fn hash_value(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    format!("{result:x}")
}

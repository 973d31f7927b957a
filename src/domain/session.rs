//! Session model
//!
//! A [`Session`] owns everything produced for one document run: the source
//! text, the resolved span set, the mapping table and the anonymized text.
//! Sessions are created per document-processing request; only the mapping
//! table is required to outlive a run (via the mapping store) so that
//! reversal stays possible after a restart.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::span::ResolvedSpanSet;
use crate::mapping::MappingTable;

/// Strongly-typed session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse from its string form.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One document-processing session.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub source_text: String,
    pub resolved: ResolvedSpanSet,
    pub mapping: MappingTable,
    pub anonymized_text: String,
}

impl Session {
    pub fn new(
        id: SessionId,
        source_text: String,
        resolved: ResolvedSpanSet,
        mapping: MappingTable,
        anonymized_text: String,
    ) -> Self {
        Self {
            id,
            source_text,
            resolved,
            mapping,
            anonymized_text,
        }
    }
}

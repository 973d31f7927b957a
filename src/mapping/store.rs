//! File-backed mapping store
//!
//! One JSON file per session id under a configured root directory. The
//! serialized form is loadable without the original document and stable
//! across process restarts; it is the only state required to outlive a
//! run. Single-writer-per-session-id discipline: concurrent saves to the
//! same session id are a caller error.

use super::{MappingDocument, MappingTable};
use crate::domain::{Result, SessionId, SigiloError};
use std::path::{Path, PathBuf};

/// Durable store for session mapping tables.
pub struct MappingStore {
    root: PathBuf,
}

impl MappingStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| {
            SigiloError::Io(format!(
                "failed to create mapping store directory {}: {e}",
                root.display()
            ))
        })?;
        Ok(Self { root })
    }

    /// Path of the mapping file for a session.
    pub fn path_for(&self, session_id: &SessionId) -> PathBuf {
        self.root.join(format!("{session_id}.mapping.json"))
    }

    /// Persist a session's mapping table. Returns the file path.
    pub fn save(&self, session_id: &SessionId, table: &MappingTable) -> Result<PathBuf> {
        table.validate()?;
        let path = self.path_for(session_id);
        let json = table.to_document(Some(session_id.to_string())).to_json()?;
        std::fs::write(&path, json).map_err(|e| {
            SigiloError::Io(format!("failed to write mapping {}: {e}", path.display()))
        })?;
        tracing::info!(session_id = %session_id, path = %path.display(), "mapping saved");
        Ok(path)
    }

    /// Load a session's mapping table.
    ///
    /// # Errors
    ///
    /// `Data` error when the session has no stored mapping or the stored
    /// form is structurally invalid.
    pub fn load(&self, session_id: &SessionId) -> Result<MappingTable> {
        let path = self.path_for(session_id);
        if !path.exists() {
            return Err(SigiloError::Data(format!(
                "no stored mapping for session {session_id}"
            )));
        }
        load_from_path(&path)
    }
}

/// Load a mapping table straight from a file path.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<MappingTable> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|e| {
        SigiloError::Io(format!("failed to read mapping {}: {e}", path.display()))
    })?;
    MappingDocument::from_json(&json)?.into_table()
}

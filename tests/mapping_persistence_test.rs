//! Persistence tests: the mapping store must survive process restarts for
//! the reversal guarantee to hold.

use sigilo::config::{SigiloConfig, SubstitutionMode};
use sigilo::domain::{SessionId, SigiloError};
use sigilo::engine::AnonymizationEngine;
use sigilo::mapping::{self, store, MappingStore};
use std::path::Path;
use tempfile::tempdir;

fn test_config(dir: &Path) -> SigiloConfig {
    let mut config = SigiloConfig::default();
    config.mapping.store_dir = dir.join("mappings");
    config.audit.log_path = dir.join("audit/anonymization.log");
    config.substitution.mode = SubstitutionMode::Realistic;
    config.substitution.seed = Some(7);
    config
}

#[tokio::test]
async fn test_reversal_after_simulated_restart() {
    let dir = tempdir().unwrap();
    let doc = "Contrato entre João Silva (CPF: 123.456.789-00) e Maria Oliveira.";

    // First "process": anonymize and persist.
    let (session_id, anonymized) = {
        let engine = AnonymizationEngine::new(test_config(dir.path())).unwrap();
        let outcome = engine.anonymize(doc, None).await.unwrap();
        (outcome.session.id, outcome.session.anonymized_text)
    };

    // Second "process": only the store directory is needed.
    let store = MappingStore::new(dir.path().join("mappings")).unwrap();
    let table = store.load(&session_id).unwrap();
    let reverted = mapping::reverse(&anonymized, &table);

    assert_eq!(reverted.text, doc);
    assert!(reverted.unresolved.is_empty());
}

#[tokio::test]
async fn test_mapping_file_loadable_by_path() {
    let dir = tempdir().unwrap();
    let engine = AnonymizationEngine::new(test_config(dir.path())).unwrap();

    let outcome = engine
        .anonymize("Depoimento de Maria Oliveira.", None)
        .await
        .unwrap();

    let path = engine.store().path_for(&outcome.session.id);
    let table = store::load_from_path(&path).unwrap();
    assert_eq!(table, outcome.session.mapping);
}

#[tokio::test]
async fn test_load_failure_does_not_affect_other_sessions() {
    let dir = tempdir().unwrap();
    let engine = AnonymizationEngine::new(test_config(dir.path())).unwrap();

    let good = engine.anonymize("Maria Oliveira depôs.", None).await.unwrap();

    // Corrupt an unrelated session file.
    let bad_id = SessionId::generate();
    std::fs::write(engine.store().path_for(&bad_id), "{corrupt").unwrap();
    let err = engine.store().load(&bad_id).unwrap_err();
    assert!(matches!(err, SigiloError::Data(_)));

    // The good session still loads and reverses.
    let reverted = engine
        .revert(&good.session.anonymized_text, &good.session.id)
        .unwrap();
    assert_eq!(reverted.text, "Maria Oliveira depôs.");
}

#[tokio::test]
async fn test_revert_with_foreign_placeholder_reports_unresolved() {
    let dir = tempdir().unwrap();
    let engine = AnonymizationEngine::new(test_config(dir.path())).unwrap();

    let outcome = engine.anonymize("Maria Oliveira depôs.", None).await.unwrap();

    // Tamper: append a placeholder this session never produced.
    let tampered = format!("{} Ver [PERSON_99].", outcome.session.anonymized_text);
    let reverted = engine.revert(&tampered, &outcome.session.id).unwrap();

    assert!(reverted.text.contains("Maria Oliveira"));
    assert_eq!(reverted.unresolved.len(), 1);
    assert_eq!(reverted.unresolved[0].token, "[PERSON_99]");
}

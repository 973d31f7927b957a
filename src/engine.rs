//! Anonymization engine
//!
//! Orchestrates the pipeline for one document session: detection →
//! resolution → substitution → persistence → audit, in strict order.
//! The pipeline is synchronous per session; concurrency exists only at the
//! orchestration boundary (independent documents in a batch, validator
//! chunks). Sessions share nothing mutable, so the engine is `Arc`-shared
//! across tasks.
//!
//! # Degraded mode
//!
//! A recognizer whose lexicon bundle fails to load disables only that
//! component: detection continues pattern-only and the condition surfaces
//! as a warning on every session outcome.
//!
//! # Cancellation
//!
//! Callers may hand in a `watch::Receiver<bool>` (the same channel the CLI
//! wires to SIGINT). Cancellation is honored between stages; because
//! substitution builds a complete new table and commits it afterwards, a
//! cancelled session never leaves a partially-mutated mapping behind.

use crate::audit::AuditLogger;
use crate::config::SigiloConfig;
use crate::detection::ner::{LexiconRecognizer, NameLexicon, RecognizerOptions};
use crate::detection::patterns::PatternRegistry;
use crate::detection::regex::PatternDetector;
use crate::detection::SpanDetector;
use crate::domain::{Result, Session, SessionId, SigiloError};
use crate::mapping::{self, MappingStore, MappingTable, ReversalOutcome};
use crate::report::SessionReport;
use crate::resolver::{SpanResolver, StopTermSet};
use crate::substitution::{Substituter, SyntheticGenerator};
use crate::validation::{HttpCompletionModel, ValidationOutcome, Validator};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Everything a caller receives for one anonymized document.
#[derive(Debug)]
pub struct SessionOutcome {
    pub session: Session,
    /// Warnings attached to the run (degraded detectors etc.)
    pub warnings: Vec<String>,
    pub report: SessionReport,
}

/// Main anonymization engine.
pub struct AnonymizationEngine {
    config: SigiloConfig,
    pattern_detector: PatternDetector,
    recognizer: Option<LexiconRecognizer>,
    /// Lexicon bundle shared by the recognizer and the synthetic
    /// generator; loaded once, read-only thereafter.
    lexicon: Arc<NameLexicon>,
    resolver: SpanResolver,
    store: MappingStore,
    audit_logger: Option<AuditLogger>,
    validator: Option<Validator>,
    degraded_reason: Option<String>,
}

impl AnonymizationEngine {
    /// Create an engine from validated configuration.
    ///
    /// Pattern and stop-term problems are configuration errors and fail
    /// here; a recognizer lexicon problem only degrades the recognizer.
    pub fn new(config: SigiloConfig) -> Result<Self> {
        config
            .validate()
            .map_err(SigiloError::Configuration)?;

        let registry = match &config.detection.pattern_library {
            Some(path) => PatternRegistry::from_file(path)?,
            None => PatternRegistry::default_patterns()?,
        };
        let pattern_detector = PatternDetector::new(Arc::new(registry))
            .with_confidence_threshold(config.detection.confidence_threshold);

        let stop_terms = match &config.detection.stop_terms {
            Some(path) => StopTermSet::from_file(path)?,
            None => StopTermSet::embedded()?,
        };

        let (lexicon, degraded_reason) = match &config.detection.lexicon_dir {
            Some(dir) => match NameLexicon::from_dir(dir) {
                Ok(lexicon) if !lexicon.is_empty() => (Arc::new(lexicon), None),
                Ok(_) => {
                    tracing::warn!(dir = %dir.display(), "lexicon bundle is empty, running pattern-only");
                    (
                        Arc::new(NameLexicon::embedded()),
                        Some(format!("lexicon bundle at {} is empty", dir.display())),
                    )
                }
                Err(e) => {
                    tracing::warn!(error = %e, "recognizer lexicon unavailable, running pattern-only");
                    (Arc::new(NameLexicon::embedded()), Some(e.to_string()))
                }
            },
            None => (Arc::new(NameLexicon::embedded()), None),
        };

        let recognizer = if config.detection.ner_enabled && degraded_reason.is_none() {
            Some(LexiconRecognizer::new(
                lexicon.clone(),
                RecognizerOptions {
                    entity_only: config.detection.entity_only,
                },
            ))
        } else {
            None
        };

        let store = MappingStore::new(config.mapping.store_dir.clone())?;

        let audit_logger = if config.audit.enabled {
            Some(AuditLogger::new(config.audit.log_path.clone())?)
        } else {
            None
        };

        let validator = if config.validation.enabled {
            let model = Arc::new(HttpCompletionModel::from_config(&config.validation)?);
            Some(Validator::new(
                model,
                config.validation.max_chunk_chars,
                config.validation.max_findings,
            ))
        } else {
            None
        };

        Ok(Self {
            config,
            pattern_detector,
            recognizer,
            lexicon,
            resolver: SpanResolver::new(stop_terms),
            store,
            audit_logger,
            validator,
            degraded_reason,
        })
    }

    /// Anonymize one document end-to-end.
    pub async fn anonymize(
        &self,
        text: &str,
        cancel: Option<watch::Receiver<bool>>,
    ) -> Result<SessionOutcome> {
        let start = Instant::now();
        check_cancelled(&cancel)?;

        // Detection must fully complete before resolution.
        let mut candidates = self.pattern_detector.detect(text);
        if let Some(ref recognizer) = self.recognizer {
            candidates.extend(recognizer.detect(text));
        }
        tracing::debug!(candidates = candidates.len(), "detection complete");
        check_cancelled(&cancel)?;

        let resolved = self.resolver.resolve(text, candidates)?;
        check_cancelled(&cancel)?;

        // Substitution is pure: the table commits only into the session
        // created below, after the pass completed in full.
        let mut substituter = Substituter::new(
            self.config.substitution.mode,
            SyntheticGenerator::new(&self.lexicon, self.config.substitution.seed),
        );
        let outcome = substituter.substitute(text, &resolved, &MappingTable::new())?;
        check_cancelled(&cancel)?;

        let session = Session::new(
            SessionId::generate(),
            text.to_string(),
            resolved,
            outcome.mapping,
            outcome.anonymized_text,
        );

        self.store.save(&session.id, &session.mapping)?;

        let processing_time_ms = start.elapsed().as_millis() as u64;
        if let Some(ref logger) = self.audit_logger {
            logger.log_session(&session, self.config.substitution.mode, processing_time_ms)?;
        }

        let mut warnings = Vec::new();
        if let Some(ref reason) = self.degraded_reason {
            warnings.push(format!(
                "named-entity detection disabled, pattern-only coverage: {reason}"
            ));
        }

        let report = SessionReport::new(
            &session,
            self.config.substitution.mode,
            processing_time_ms,
            warnings.clone(),
        );

        tracing::info!(
            session_id = %session.id,
            spans = session.resolved.len(),
            time_ms = processing_time_ms,
            "session anonymized"
        );

        Ok(SessionOutcome {
            session,
            warnings,
            report,
        })
    }

    /// Anonymize a batch of independent documents on parallel tasks.
    ///
    /// Fail-safe per document: a failed document is logged and skipped, it
    /// never aborts the batch or leaks unanonymized data into the result.
    pub async fn anonymize_batch(
        self: Arc<Self>,
        documents: Vec<String>,
        cancel: Option<watch::Receiver<bool>>,
    ) -> Vec<SessionOutcome> {
        let mut handles = Vec::with_capacity(documents.len());
        for document in documents {
            let engine = Arc::clone(&self);
            let cancel = cancel.clone();
            handles.push(tokio::spawn(async move {
                engine.anonymize(&document, cancel).await
            }));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(Ok(outcome)) => outcomes.push(outcome),
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "failed to anonymize document");
                }
                Err(e) => {
                    tracing::error!(error = %e, "anonymization task panicked");
                }
            }
        }
        outcomes
    }

    /// Second-pass leak scan over anonymized text. Advisory; degrades to a
    /// warning when no validation model is configured.
    pub async fn validate(&self, anonymized_text: &str) -> ValidationOutcome {
        match &self.validator {
            Some(validator) => validator.validate(anonymized_text).await,
            None => ValidationOutcome {
                findings: Vec::new(),
                warnings: vec![
                    "leak validation skipped: no validation model configured".to_string()
                ],
            },
        }
    }

    /// Reverse an anonymized text using a stored session mapping.
    pub fn revert(&self, anonymized_text: &str, session_id: &SessionId) -> Result<ReversalOutcome> {
        let table = self.store.load(session_id)?;
        Ok(mapping::reverse(anonymized_text, &table))
    }

    /// Whether the recognizer is running (false in degraded mode).
    pub fn recognizer_active(&self) -> bool {
        self.recognizer.is_some()
    }

    pub fn store(&self) -> &MappingStore {
        &self.store
    }
}

fn check_cancelled(cancel: &Option<watch::Receiver<bool>>) -> Result<()> {
    match cancel {
        Some(rx) if *rx.borrow() => Err(SigiloError::Cancelled),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SubstitutionMode;
    use tempfile::tempdir;

    fn test_config(dir: &std::path::Path) -> SigiloConfig {
        let mut config = SigiloConfig::default();
        config.mapping.store_dir = dir.join("mappings");
        config.audit.log_path = dir.join("audit/audit.log");
        config.substitution.mode = SubstitutionMode::Placeholder;
        config
    }

    #[tokio::test]
    async fn test_example_scenario() {
        let dir = tempdir().unwrap();
        let engine = AnonymizationEngine::new(test_config(dir.path())).unwrap();

        let doc = "Contrato entre João Silva (CPF: 123.456.789-00) e Maria Oliveira.";
        let outcome = engine.anonymize(doc, None).await.unwrap();

        assert!(!outcome.session.anonymized_text.contains("João Silva"));
        assert!(!outcome.session.anonymized_text.contains("123.456.789-00"));
        assert!(!outcome.session.anonymized_text.contains("Maria Oliveira"));
        assert!(outcome.session.mapping.len() >= 3);
    }

    #[tokio::test]
    async fn test_round_trip_via_store() {
        let dir = tempdir().unwrap();
        let engine = AnonymizationEngine::new(test_config(dir.path())).unwrap();

        let doc = "A Sra. Joana Silva (CPF: 987.654.321-00) mora em Curitiba.";
        let outcome = engine.anonymize(doc, None).await.unwrap();

        let reverted = engine
            .revert(&outcome.session.anonymized_text, &outcome.session.id)
            .unwrap();
        assert_eq!(reverted.text, doc);
        assert!(reverted.unresolved.is_empty());
    }

    #[tokio::test]
    async fn test_whitelist_invariance() {
        let dir = tempdir().unwrap();
        let engine = AnonymizationEngine::new(test_config(dir.path())).unwrap();

        // Only whitelisted terms and non-PII text: output must be identical.
        let doc = "O Horário da audiência foi mantido pelo tribunal.";
        let outcome = engine.anonymize(doc, None).await.unwrap();
        assert_eq!(outcome.session.anonymized_text, doc);
        assert!(outcome.session.mapping.is_empty());
    }

    #[tokio::test]
    async fn test_degraded_mode_still_anonymizes_patterns() {
        let dir = tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.detection.lexicon_dir = Some(dir.path().join("no-such-lexicons"));
        let engine = AnonymizationEngine::new(config).unwrap();

        assert!(!engine.recognizer_active());

        let doc = "CPF: 123.456.789-00 conforme registro.";
        let outcome = engine.anonymize(doc, None).await.unwrap();
        assert!(!outcome.session.anonymized_text.contains("123.456.789-00"));
        assert!(outcome
            .warnings
            .iter()
            .any(|w| w.contains("pattern-only")));
    }

    #[tokio::test]
    async fn test_cancelled_session_commits_nothing() {
        let dir = tempdir().unwrap();
        let engine = AnonymizationEngine::new(test_config(dir.path())).unwrap();

        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let err = engine
            .anonymize("João Silva esteve presente.", Some(rx))
            .await
            .unwrap_err();
        assert!(matches!(err, SigiloError::Cancelled));

        // No mapping file may exist for the aborted session.
        let store_dir = dir.path().join("mappings");
        let files: Vec<_> = std::fs::read_dir(&store_dir).unwrap().collect();
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn test_batch_produces_independent_sessions() {
        let dir = tempdir().unwrap();
        let engine = Arc::new(AnonymizationEngine::new(test_config(dir.path())).unwrap());

        let outcomes = Arc::clone(&engine)
            .anonymize_batch(
                vec![
                    "João Silva assinou.".to_string(),
                    "Maria Oliveira assinou.".to_string(),
                ],
                None,
            )
            .await;

        assert_eq!(outcomes.len(), 2);
        assert_ne!(outcomes[0].session.id, outcomes[1].session.id);
    }

    #[tokio::test]
    async fn test_validate_without_model_degrades() {
        let dir = tempdir().unwrap();
        let engine = AnonymizationEngine::new(test_config(dir.path())).unwrap();

        let outcome = engine.validate("texto anonimizado").await;
        assert!(outcome.findings.is_empty());
        assert_eq!(outcome.warnings.len(), 1);
    }
}

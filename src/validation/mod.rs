//! Leak validation
//!
//! Independent second-pass scan of anonymized text for suspected residual
//! PII. Bounded-size chunks are sent to a language model whose verdict is a
//! strict JSON array; a chunk whose call fails or whose verdict doesn't
//! parse degrades to "no findings for this chunk" plus a surfaced warning,
//! never an aborted run.
//!
//! Findings are advisory. The validator never mutates a session, and it is
//! deliberately independent of the stop-term whitelist: it may flag
//! whitelisted terms and the caller decides what to do.

pub mod chunker;
pub mod client;

pub use chunker::{Chunk, TextChunker};
pub use client::{CompletionModel, HttpCompletionModel};

use crate::domain::{PiiCategory, Result};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Concurrent in-flight model calls per document.
const SCAN_CONCURRENCY: usize = 4;

const LEAK_SCAN_PROMPT: &str = "\
Você é um sistema de auditoria de anonimização. O texto fornecido já passou \
por anonimização e NÃO deveria conter dados pessoais reais. Aponte qualquer \
trecho que ainda pareça conter dados pessoais: nomes próprios, endereços, \
e-mails, telefones, CPF, CNPJ, RG ou outros identificadores.

Responda SOMENTE com um array JSON, sem comentários, no formato:
[{\"excerpt\": \"trecho exato\", \"category\": \"PERSON|ADDRESS|EMAIL|PHONE|ID_NUMBER|ORG|OTHER\", \"confidence\": 0.0}]

Se nada for encontrado, responda [].";

/// A suspected residual-PII finding. Advisory, never authoritative.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationFinding {
    /// Exact excerpt the model flagged
    pub excerpt: String,
    /// Category guess, when the model's label maps onto a known category
    pub category_guess: Option<PiiCategory>,
    /// Byte offset of the excerpt in the anonymized text, when locatable
    pub offset_hint: Option<usize>,
    /// Model-reported confidence, clamped to 0.0..=1.0
    pub confidence: f32,
    /// Raw model output the finding was parsed from
    pub raw_model_output: String,
}

/// Validator output: findings plus surfaced per-chunk warnings.
#[derive(Debug, Default)]
pub struct ValidationOutcome {
    pub findings: Vec<ValidationFinding>,
    pub warnings: Vec<String>,
}

/// Second-pass leak validator.
pub struct Validator {
    model: Arc<dyn CompletionModel>,
    chunker: TextChunker,
    max_findings: usize,
}

impl Validator {
    pub fn new(model: Arc<dyn CompletionModel>, max_chunk_chars: usize, max_findings: usize) -> Self {
        Self {
            model,
            chunker: TextChunker::new(max_chunk_chars),
            max_findings,
        }
    }

    /// Scan anonymized text. Chunks are evaluated concurrently against the
    /// shared read-only model client; output order follows chunk offsets.
    pub async fn validate(&self, anonymized_text: &str) -> ValidationOutcome {
        let chunks = self.chunker.chunk(anonymized_text);
        if chunks.is_empty() {
            return ValidationOutcome::default();
        }

        let mut results: Vec<(usize, Result<Vec<ValidationFinding>>)> = stream::iter(chunks)
            .map(|chunk| async move { (chunk.offset, self.scan_chunk(chunk).await) })
            .buffer_unordered(SCAN_CONCURRENCY)
            .collect()
            .await;
        results.sort_by_key(|(offset, _)| *offset);

        let mut outcome = ValidationOutcome::default();
        for (offset, result) in results {
            match result {
                Ok(findings) => outcome.findings.extend(findings),
                Err(e) => {
                    tracing::warn!(offset, error = %e, "leak scan failed for chunk");
                    outcome
                        .warnings
                        .push(format!("chunk at offset {offset}: {e}"));
                }
            }
        }

        if outcome.findings.len() > self.max_findings {
            let dropped = outcome.findings.len() - self.max_findings;
            outcome.findings.truncate(self.max_findings);
            outcome
                .warnings
                .push(format!("{dropped} findings over the limit were dropped"));
        }

        outcome
    }

    async fn scan_chunk(&self, chunk: Chunk<'_>) -> Result<Vec<ValidationFinding>> {
        let raw = self.model.complete(LEAK_SCAN_PROMPT, chunk.text).await?;
        parse_findings(&raw, chunk)
    }
}

#[derive(Debug, Deserialize)]
struct RawFinding {
    excerpt: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    confidence: Option<f32>,
}

/// Parse the model's JSON-array verdict for one chunk.
fn parse_findings(raw: &str, chunk: Chunk<'_>) -> Result<Vec<ValidationFinding>> {
    let array = extract_json_array(raw).ok_or_else(|| {
        crate::domain::SigiloError::Validation("model verdict contains no JSON array".to_string())
    })?;

    let parsed: Vec<RawFinding> = serde_json::from_str(array).map_err(|e| {
        crate::domain::SigiloError::Validation(format!("unparseable model verdict: {e}"))
    })?;

    Ok(parsed
        .into_iter()
        .filter(|f| !f.excerpt.trim().is_empty())
        .map(|f| ValidationFinding {
            offset_hint: chunk.text.find(&f.excerpt).map(|p| chunk.offset + p),
            category_guess: f.category.as_deref().and_then(map_category),
            confidence: f.confidence.unwrap_or(0.5).clamp(0.0, 1.0),
            excerpt: f.excerpt,
            raw_model_output: raw.to_string(),
        })
        .collect())
}

/// Models wrap verdicts in prose or markdown fences; take the outermost
/// bracketed region.
fn extract_json_array(raw: &str) -> Option<&str> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    (end >= start).then(|| &raw[start..=end])
}

/// Loose mapping from model labels to categories.
fn map_category(label: &str) -> Option<PiiCategory> {
    if let Ok(category) = PiiCategory::parse(label) {
        return Some(category);
    }
    let lower = label.to_lowercase();
    if lower.contains("name") || lower.contains("nome") || lower.contains("pessoa") {
        Some(PiiCategory::Person)
    } else if lower.contains("address") || lower.contains("endereço") || lower.contains("local") {
        Some(PiiCategory::Address)
    } else if lower.contains("mail") {
        Some(PiiCategory::Email)
    } else if lower.contains("phone") || lower.contains("telefone") {
        Some(PiiCategory::Phone)
    } else if lower.contains("cpf")
        || lower.contains("cnpj")
        || lower.contains("rg")
        || lower.contains("document")
        || lower.contains("id")
    {
        Some(PiiCategory::IdNumber)
    } else if lower.contains("org") || lower.contains("empresa") {
        Some(PiiCategory::Org)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SigiloError;
    use async_trait::async_trait;

    /// Canned model returning the same output for every chunk.
    struct FixedModel {
        output: String,
    }

    #[async_trait]
    impl CompletionModel for FixedModel {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            Ok(self.output.clone())
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingModel;

    #[async_trait]
    impl CompletionModel for FailingModel {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            Err(SigiloError::Validation("connection refused".to_string()))
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    fn validator(output: &str) -> Validator {
        Validator::new(
            Arc::new(FixedModel {
                output: output.to_string(),
            }),
            2000,
            50,
        )
    }

    #[tokio::test]
    async fn test_findings_parsed_with_offset() {
        let text = "O contrato menciona Joana Silva mais uma vez.";
        let v = validator(
            r#"[{"excerpt": "Joana Silva", "category": "PERSON", "confidence": 0.9}]"#,
        );
        let outcome = v.validate(text).await;

        assert_eq!(outcome.findings.len(), 1);
        let finding = &outcome.findings[0];
        assert_eq!(finding.excerpt, "Joana Silva");
        assert_eq!(finding.category_guess, Some(PiiCategory::Person));
        assert_eq!(finding.offset_hint, Some(text.find("Joana").unwrap()));
        assert!(outcome.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_clean_text_yields_no_findings() {
        let outcome = validator("[]").validate("Texto sem dados pessoais.").await;
        assert!(outcome.findings.is_empty());
        assert!(outcome.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_markdown_fenced_verdict_still_parses() {
        let v = validator(
            "```json\n[{\"excerpt\": \"fulano@mail.com\", \"category\": \"email\"}]\n```",
        );
        let outcome = v.validate("Escreva para fulano@mail.com hoje.").await;
        assert_eq!(outcome.findings.len(), 1);
        assert_eq!(outcome.findings[0].category_guess, Some(PiiCategory::Email));
    }

    #[tokio::test]
    async fn test_unparseable_verdict_degrades_to_warning() {
        let outcome = validator("não encontrei nada de errado")
            .validate("Algum texto anonimizado.")
            .await;
        assert!(outcome.findings.is_empty());
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_model_failure_degrades_to_warning() {
        let v = Validator::new(Arc::new(FailingModel), 2000, 50);
        let outcome = v.validate("Algum texto anonimizado.").await;
        assert!(outcome.findings.is_empty());
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("connection refused"));
    }

    #[tokio::test]
    async fn test_findings_capped_at_max() {
        let v = Validator::new(
            Arc::new(FixedModel {
                output: r#"[{"excerpt": "frase"}, {"excerpt": "frase"}, {"excerpt": "frase"}]"#
                    .to_string(),
            }),
            2000,
            2,
        );
        let outcome = v.validate("Uma frase qualquer.").await;
        assert_eq!(outcome.findings.len(), 2);
        assert!(outcome.warnings.iter().any(|w| w.contains("dropped")));
    }

    #[tokio::test]
    async fn test_whitelisted_terms_may_be_flagged() {
        // The validator is independent of the whitelist by design.
        let v = validator(r#"[{"excerpt": "Horário", "category": "OTHER"}]"#);
        let outcome = v.validate("O Horário foi mantido.").await;
        assert_eq!(outcome.findings.len(), 1);
        assert_eq!(outcome.findings[0].excerpt, "Horário");
    }

    #[tokio::test]
    async fn test_multi_chunk_findings_ordered_by_offset() {
        let text = "Primeira frase longa o bastante aqui. Segunda frase longa o bastante aqui.";
        let v = Validator::new(
            Arc::new(FixedModel {
                output: r#"[{"excerpt": "frase longa"}]"#.to_string(),
            }),
            40,
            50,
        );
        let outcome = v.validate(text).await;
        assert!(outcome.findings.len() >= 2);
        let offsets: Vec<_> = outcome.findings.iter().map(|f| f.offset_hint).collect();
        let mut sorted = offsets.clone();
        sorted.sort();
        assert_eq!(offsets, sorted);
    }

    #[test]
    fn test_extract_json_array() {
        assert_eq!(extract_json_array("[]"), Some("[]"));
        assert_eq!(extract_json_array("texto [1, 2] final"), Some("[1, 2]"));
        assert_eq!(extract_json_array("sem array"), None);
    }
}

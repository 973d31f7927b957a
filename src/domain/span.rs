//! Span data model
//!
//! A [`Span`] is a half-open byte range into the source text tagged with a
//! PII category and the detector that produced it. Spans are immutable once
//! resolved; the [`ResolvedSpanSet`] newtype guarantees ordering and
//! non-overlap for everything downstream of the resolver.

use serde::{Deserialize, Serialize};

use crate::domain::errors::SigiloError;
use crate::domain::result::Result;

/// PII category enumeration.
///
/// A closed set: every category maps to exactly one generation routine and
/// one placeholder label. Unknown category strings in configuration are
/// rejected at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PiiCategory {
    /// Person names (given, full, with connectives)
    Person,
    /// Street addresses, postal codes, municipalities
    Address,
    /// Email addresses
    Email,
    /// Telephone numbers (landline and mobile)
    Phone,
    /// Structured identifiers (CPF, CNPJ, RG and similar)
    IdNumber,
    /// Organization names
    Org,
    /// Anything sensitive that fits no other category
    Other,
}

impl PiiCategory {
    /// Human-readable label, also used for placeholder tokens.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Person => "PERSON",
            Self::Address => "ADDRESS",
            Self::Email => "EMAIL",
            Self::Phone => "PHONE",
            Self::IdNumber => "ID_NUMBER",
            Self::Org => "ORG",
            Self::Other => "OTHER",
        }
    }

    /// Parse a category label from configuration.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "PERSON" => Ok(Self::Person),
            "ADDRESS" | "LOCATION" => Ok(Self::Address),
            "EMAIL" => Ok(Self::Email),
            "PHONE" => Ok(Self::Phone),
            "ID_NUMBER" | "IDENTIFIER" => Ok(Self::IdNumber),
            "ORG" | "ORGANIZATION" => Ok(Self::Org),
            "OTHER" => Ok(Self::Other),
            _ => Err(SigiloError::Configuration(format!(
                "Unknown PII category: {s}"
            ))),
        }
    }

    /// All categories, in placeholder-label order.
    pub fn all() -> [PiiCategory; 7] {
        [
            Self::Person,
            Self::Address,
            Self::Email,
            Self::Phone,
            Self::IdNumber,
            Self::Org,
            Self::Other,
        ]
    }
}

/// Which detector produced a span.
///
/// Pattern matches are structurally certain and outrank model matches for
/// the same text during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanSource {
    /// Regex pattern matcher
    Pattern,
    /// Named-entity recognizer
    Model,
}

impl SpanSource {
    /// Resolution priority: higher wins on overlap.
    pub fn priority(&self) -> u8 {
        match self {
            Self::Pattern => 1,
            Self::Model => 0,
        }
    }
}

/// A detected PII span.
///
/// Offsets are byte offsets into the source text and always fall on UTF-8
/// character boundaries. Invariant: `0 <= start < end <= text.len()` and
/// `text[start..end] == span.text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub category: PiiCategory,
    pub source: SpanSource,
    pub text: String,
}

impl Span {
    pub fn new(
        start: usize,
        end: usize,
        category: PiiCategory,
        source: SpanSource,
        text: impl Into<String>,
    ) -> Self {
        Self {
            start,
            end,
            category,
            source,
            text: text.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// True when this span shares at least one byte with `other`.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Check the span against the document it claims to index: in range,
    /// on char boundaries, and covering exactly its recorded text.
    pub fn is_valid_for(&self, document: &str) -> bool {
        !self.is_empty()
            && self.end <= document.len()
            && document.is_char_boundary(self.start)
            && document.is_char_boundary(self.end)
            && &document[self.start..self.end] == self.text
    }

    /// True when the span neither starts nor ends inside a word: the
    /// characters adjacent to the span (if any) are non-word characters.
    pub fn on_word_boundaries(&self, document: &str) -> bool {
        if !self.is_valid_for(document) {
            return false;
        }
        let before_ok = document[..self.start]
            .chars()
            .next_back()
            .map_or(true, |c| !is_word_char(c));
        let after_ok = document[self.end..]
            .chars()
            .next()
            .map_or(true, |c| !is_word_char(c));
        before_ok && after_ok
    }
}

/// Word character in the detector sense: alphanumeric or underscore,
/// including accented letters.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Ordered sequence of non-overlapping spans sorted by `start`.
///
/// The only span list the substitution engine ever sees. Constructed by the
/// resolver; the constructor re-checks the ordering invariant so a buggy
/// caller cannot smuggle overlaps downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSpanSet(Vec<Span>);

impl ResolvedSpanSet {
    /// Build from spans already sorted by `start`.
    ///
    /// # Errors
    ///
    /// Returns a `Data` error if any adjacent pair violates
    /// `spans[i].end <= spans[i+1].start`.
    pub fn new(spans: Vec<Span>) -> Result<Self> {
        for pair in spans.windows(2) {
            if pair[0].end > pair[1].start {
                return Err(SigiloError::Data(format!(
                    "overlapping spans at {}..{} and {}..{}",
                    pair[0].start, pair[0].end, pair[1].start, pair[1].end
                )));
            }
        }
        Ok(Self(spans))
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Span> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Span] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for ResolvedSpanSet {
    type Item = Span;
    type IntoIter = std::vec::IntoIter<Span>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResolvedSpanSet {
    type Item = &'a Span;
    type IntoIter = std::slice::Iter<'a, Span>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

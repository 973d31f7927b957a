//! Lexicon-driven named-entity recognizer for pt-BR
//!
//! Combines capitalization analysis with the lexicon bundle: honorifics
//! introduce person names, street keywords introduce addresses, org
//! keywords mark organization names, and municipality matches yield
//! locations. All offsets are byte offsets into the original text; the
//! recognizer never re-tokenizes in a way that could drift a boundary.

use super::lexicon::NameLexicon;
use crate::detection::SpanDetector;
use crate::domain::{PiiCategory, Span, SpanSource};
use std::sync::Arc;

const CONNECTIVES: [&str; 5] = ["da", "de", "do", "das", "dos"];
const HONORIFICS: [&str; 10] = [
    "sr", "sra", "srta", "dr", "dra", "prof", "profa", "exmo", "exma", "mm",
];
const STREET_KEYWORDS: [&str; 9] = [
    "rua", "avenida", "av", "alameda", "travessa", "praça", "praca", "rodovia", "estrada",
];

/// Recognizer options.
#[derive(Debug, Clone, Copy)]
pub struct RecognizerOptions {
    /// Skip auxiliary annotation stages not needed for entity recognition.
    ///
    /// The only auxiliary stage is sentence-salience analysis, which
    /// demotes single capitalized given names at sentence starts (they may
    /// be capitalized for syntax, not namehood). Entity-only mode trades
    /// that disambiguation for recall and is the recommended setting for
    /// anonymization.
    pub entity_only: bool,
}

impl Default for RecognizerOptions {
    fn default() -> Self {
        Self { entity_only: true }
    }
}

/// Deterministic named-entity recognizer over a shared lexicon bundle.
pub struct LexiconRecognizer {
    lexicon: Arc<NameLexicon>,
    options: RecognizerOptions,
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    text: &'a str,
    start: usize,
    end: usize,
}

/// A run of capitalized tokens, possibly joined by connectives.
struct Sequence {
    first: usize,
    last: usize,
    cap_indices: Vec<usize>,
}

impl LexiconRecognizer {
    pub fn new(lexicon: Arc<NameLexicon>, options: RecognizerOptions) -> Self {
        Self { lexicon, options }
    }

    fn recognize(&self, text: &str) -> Vec<Span> {
        let tokens = tokenize(text);
        let mut spans = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            let tok = &tokens[i];

            // Honorific introduces a person name even when the lexicon
            // doesn't know it ("O Sr. Kowalski").
            if is_honorific(tok.text) {
                if let Some(seq) = self.capitalized_sequence(text, &tokens, i + 1) {
                    spans.push(self.make_span(
                        text,
                        tokens[seq.first].start,
                        tokens[seq.last].end,
                        PiiCategory::Person,
                    ));
                    i = seq.last + 1;
                    continue;
                }
                i += 1;
                continue;
            }

            if is_capitalized(tok.text) {
                if let Some(seq) = self.capitalized_sequence(text, &tokens, i) {
                    let consumed = seq.last + 1;
                    if let Some(span) = self.classify(text, &tokens, &seq) {
                        spans.push(span);
                    }
                    i = consumed;
                    continue;
                }
            }

            i += 1;
        }

        spans
    }

    fn classify(&self, text: &str, tokens: &[Token<'_>], seq: &Sequence) -> Option<Span> {
        let phrase_start = tokens[seq.first].start;
        let phrase_end = tokens[seq.last].end;
        let phrase = &text[phrase_start..phrase_end];

        if seq.cap_indices.len() >= 2 {
            // Organization keyword anywhere in the run marks an org name.
            // A trailing keyword is a suffix (Ltda, S.A.) covering the
            // whole run; otherwise the keyword itself starts the name.
            if let Some(&kw) = seq
                .cap_indices
                .iter()
                .find(|&&idx| self.lexicon.is_org_keyword(tokens[idx].text))
            {
                let start = if kw == seq.last {
                    phrase_start
                } else {
                    tokens[kw].start
                };
                return Some(self.make_span(text, start, phrase_end, PiiCategory::Org));
            }

            if self.lexicon.is_municipality(phrase) {
                return Some(self.make_span(text, phrase_start, phrase_end, PiiCategory::Address));
            }

            if is_street_keyword(tokens[seq.first].text) {
                let end = extend_street_number(text, phrase_end);
                return Some(self.make_span(text, phrase_start, end, PiiCategory::Address));
            }

            // Person: start at the first token the lexicon recognizes, so
            // leading role words ("O Delegado João Silva") stay outside
            // the span.
            if let Some(&name_start) = seq.cap_indices.iter().find(|&&idx| {
                self.lexicon.is_given_name(tokens[idx].text)
                    || self.lexicon.is_surname(tokens[idx].text)
            }) {
                return Some(self.make_span(
                    text,
                    tokens[name_start].start,
                    phrase_end,
                    PiiCategory::Person,
                ));
            }

            return None;
        }

        // Single capitalized token.
        let word = tokens[seq.first].text;
        if self.lexicon.is_municipality(word) {
            return Some(self.make_span(text, phrase_start, phrase_end, PiiCategory::Address));
        }
        if self.lexicon.is_given_name(word) {
            if !self.options.entity_only && is_sentence_initial(text, phrase_start) {
                // Sentence-salience stage: capitalization at a sentence
                // start carries no namehood evidence on its own.
                return None;
            }
            return Some(self.make_span(text, phrase_start, phrase_end, PiiCategory::Person));
        }

        None
    }

    /// Collect the capitalized run starting at `from`. Connectives join
    /// only after a token the lexicon knows (name, surname, org/street
    /// keyword, municipality word), so "Declaração de Maria" never merges
    /// into one run. Honorifics always terminate a run.
    fn capitalized_sequence(
        &self,
        text: &str,
        tokens: &[Token<'_>],
        from: usize,
    ) -> Option<Sequence> {
        if from >= tokens.len() || !is_capitalized(tokens[from].text) {
            return None;
        }
        if from > 0 {
            let prev = &tokens[from - 1];
            if is_honorific(prev.text)
                && !joined_after_honorific(text, prev.end, tokens[from].start)
            {
                return None;
            }
        }

        let mut cap_indices = vec![from];
        let mut last = from;
        let mut j = from + 1;

        while j < tokens.len() {
            if !joined_by_spaces(text, tokens[last].end, tokens[j].start) {
                break;
            }
            if is_honorific(tokens[j].text) {
                break;
            }
            if is_capitalized(tokens[j].text) {
                cap_indices.push(j);
                last = j;
                j += 1;
            } else if is_connective(tokens[j].text)
                && self.is_namelike(tokens[last].text)
                && j + 1 < tokens.len()
                && is_capitalized(tokens[j + 1].text)
                && joined_by_spaces(text, tokens[j].end, tokens[j + 1].start)
            {
                cap_indices.push(j + 1);
                last = j + 1;
                j += 2;
            } else {
                break;
            }
        }

        Some(Sequence {
            first: from,
            last,
            cap_indices,
        })
    }

    fn is_namelike(&self, word: &str) -> bool {
        self.lexicon.is_given_name(word)
            || self.lexicon.is_surname(word)
            || self.lexicon.is_org_keyword(word)
            || self.lexicon.is_municipality_word(word)
            || is_street_keyword(word)
    }

    fn make_span(&self, text: &str, start: usize, end: usize, category: PiiCategory) -> Span {
        Span::new(start, end, category, SpanSource::Model, &text[start..end])
    }
}

impl SpanDetector for LexiconRecognizer {
    fn detect(&self, text: &str) -> Vec<Span> {
        self.recognize(text)
    }

    fn name(&self) -> &'static str {
        "ner"
    }

    fn is_available(&self) -> bool {
        !self.lexicon.is_empty()
    }
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        if c.is_alphanumeric() {
            if start.is_none() {
                start = Some(i);
            }
        } else if let Some(s) = start.take() {
            tokens.push(Token {
                text: &text[s..i],
                start: s,
                end: i,
            });
        }
    }
    if let Some(s) = start {
        tokens.push(Token {
            text: &text[s..],
            start: s,
            end: text.len(),
        });
    }
    tokens
}

fn is_capitalized(word: &str) -> bool {
    word.chars().next().map_or(false, |c| c.is_uppercase())
}

fn is_connective(word: &str) -> bool {
    CONNECTIVES.contains(&word.to_lowercase().as_str())
}

fn is_honorific(word: &str) -> bool {
    HONORIFICS.contains(&word.to_lowercase().as_str())
}

fn is_street_keyword(word: &str) -> bool {
    STREET_KEYWORDS.contains(&word.to_lowercase().as_str())
}

/// Tokens are only joined when separated by plain spaces, so punctuation
/// (including the sentence period) always terminates a run.
fn joined_by_spaces(text: &str, prev_end: usize, next_start: usize) -> bool {
    text[prev_end..next_start].chars().all(|c| c == ' ')
}

/// Separator allowed after an honorific: optional period plus spaces.
fn joined_after_honorific(text: &str, prev_end: usize, next_start: usize) -> bool {
    let sep = &text[prev_end..next_start];
    let sep = sep.strip_prefix('.').unwrap_or(sep);
    !sep.is_empty() && sep.chars().all(|c| c == ' ')
}

/// Extend a street span over a following house number (", 1000").
fn extend_street_number(text: &str, end: usize) -> usize {
    let rest = &text[end..];
    let mut chars = rest.char_indices().peekable();

    if let Some((_, ',')) = chars.peek().copied() {
        chars.next();
    }
    while let Some((_, ' ')) = chars.peek().copied() {
        chars.next();
    }

    let mut digit_end = None;
    for (i, c) in chars {
        if c.is_ascii_digit() {
            digit_end = Some(i + c.len_utf8());
        } else {
            break;
        }
    }

    match digit_end {
        Some(d) => end + d,
        None => end,
    }
}

/// True when only sentence-terminating punctuation (or document start)
/// precedes the offset.
fn is_sentence_initial(text: &str, offset: usize) -> bool {
    for c in text[..offset].chars().rev() {
        if c == ' ' || c == '\t' {
            continue;
        }
        return matches!(c, '.' | '!' | '?' | '\n');
    }
    true
}

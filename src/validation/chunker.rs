//! Text chunking for model calls
//!
//! Model context is finite, so anonymized text is scanned in bounded
//! chunks. Chunk boundaries fall on sentence enders when possible and on
//! whitespace otherwise, never inside a word. A single word longer than
//! the bound gets its own oversized chunk rather than being split.

/// A chunk of the source text with its byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub text: &'a str,
    pub offset: usize,
}

/// Sentence/whitespace-boundary chunker with a size bound in bytes.
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    max_chars: usize,
}

impl TextChunker {
    pub fn new(max_chars: usize) -> Self {
        Self {
            max_chars: max_chars.max(1),
        }
    }

    pub fn chunk<'a>(&self, text: &'a str) -> Vec<Chunk<'a>> {
        let mut chunks = Vec::new();
        let mut current: Option<(usize, usize)> = None;

        for (start, end) in split_sentences(text) {
            if end - start > self.max_chars {
                if let Some((cs, ce)) = current.take() {
                    chunks.push((cs, ce));
                }
                chunks.extend(split_on_whitespace(text, start, end, self.max_chars));
                continue;
            }

            match current {
                None => current = Some((start, end)),
                Some((cs, _)) if end - cs <= self.max_chars => current = Some((cs, end)),
                Some(done) => {
                    chunks.push(done);
                    current = Some((start, end));
                }
            }
        }
        if let Some(done) = current {
            chunks.push(done);
        }

        chunks
            .into_iter()
            .filter(|(s, e)| !text[*s..*e].trim().is_empty())
            .map(|(s, e)| Chunk {
                text: &text[s..e],
                offset: s,
            })
            .collect()
    }
}

/// Byte ranges of sentences: a sentence ends after `.`/`!`/`?` followed by
/// whitespace, or at a newline.
fn split_sentences(text: &str) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut start = 0;
    let mut prev_was_ender = false;

    for (i, c) in text.char_indices() {
        if c == '\n' {
            let end = i + c.len_utf8();
            ranges.push((start, end));
            start = end;
            prev_was_ender = false;
            continue;
        }
        if prev_was_ender && c.is_whitespace() {
            let end = i + c.len_utf8();
            ranges.push((start, end));
            start = end;
            prev_was_ender = false;
            continue;
        }
        prev_was_ender = matches!(c, '.' | '!' | '?');
    }
    if start < text.len() {
        ranges.push((start, text.len()));
    }
    ranges
}

/// Greedy word grouping for an oversized sentence. Boundaries only at
/// whitespace.
fn split_on_whitespace(
    text: &str,
    start: usize,
    end: usize,
    max_chars: usize,
) -> Vec<(usize, usize)> {
    let slice = &text[start..end];
    let mut words: Vec<(usize, usize)> = Vec::new();
    let mut word_start = None;
    for (i, c) in slice.char_indices() {
        if c.is_whitespace() {
            if let Some(ws) = word_start.take() {
                words.push((start + ws, start + i));
            }
        } else if word_start.is_none() {
            word_start = Some(i);
        }
    }
    if let Some(ws) = word_start {
        words.push((start + ws, end));
    }

    let mut groups = Vec::new();
    let mut current: Option<(usize, usize)> = None;
    for (ws, we) in words {
        match current {
            None => current = Some((ws, we)),
            Some((gs, _)) if we - gs <= max_chars => current = Some((gs, we)),
            Some(done) => {
                groups.push(done);
                current = Some((ws, we));
            }
        }
    }
    if let Some(done) = current {
        groups.push(done);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunks = TextChunker::new(1000).chunk("Uma frase curta.");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].offset, 0);
    }

    #[test]
    fn test_chunks_respect_bound() {
        let text = "Primeira frase aqui. Segunda frase aqui. Terceira frase aqui.";
        for chunk in TextChunker::new(25).chunk(text) {
            assert!(chunk.text.len() <= 25, "chunk too big: {:?}", chunk.text);
        }
    }

    #[test]
    fn test_no_mid_word_split() {
        let text = "palavras separadas por espaços repetidas vezes ".repeat(40);
        for chunk in TextChunker::new(64).chunk(&text) {
            // A boundary inside a word would leave a word fragment at a
            // chunk edge; edges must align with whitespace in the source.
            let before = &text[..chunk.offset];
            if let Some(c) = before.chars().next_back() {
                assert!(c.is_whitespace());
            }
            let after = &text[chunk.offset + chunk.text.len()..];
            if let Some(c) = after.chars().next() {
                let last = chunk.text.chars().next_back().unwrap();
                assert!(c.is_whitespace() || last.is_whitespace());
            }
        }
    }

    #[test]
    fn test_offsets_slice_original() {
        let text = "Primeira frase. Segunda frase!\nTerceira linha aqui.";
        for chunk in TextChunker::new(20).chunk(text) {
            assert_eq!(&text[chunk.offset..chunk.offset + chunk.text.len()], chunk.text);
        }
    }

    #[test]
    fn test_oversized_word_kept_whole() {
        let long_word = "a".repeat(50);
        let text = format!("inicio {long_word} fim");
        let chunks = TextChunker::new(10).chunk(&text);
        assert!(chunks.iter().any(|c| c.text.contains(&long_word)));
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        assert!(TextChunker::new(100).chunk("").is_empty());
        assert!(TextChunker::new(100).chunk("   \n  ").is_empty());
    }
}

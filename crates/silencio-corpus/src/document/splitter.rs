use std::collections::VecDeque;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DocumentError;
use super::types::{Chunk, Document, Span};

/// Separators tried in order by the recursive strategy; `""` splits into characters.
const SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];
const PARAGRAPH_BREAK: &str = "\n\n";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitStrategy {
    #[default]
    Recursive,
    Paragraph,
}

impl FromStr for SplitStrategy {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recursive" => Ok(Self::Recursive),
            "paragraph" => Ok(Self::Paragraph),
            other => Err(DocumentError::InvalidConfig(format!(
                "unknown split strategy: {other}"
            ))),
        }
    }
}

/// Chunk size and overlap are measured in characters.
#[derive(Debug, Clone)]
pub struct SplitterConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub strategy: SplitStrategy,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 120,
            strategy: SplitStrategy::Recursive,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TextSplitter {
    config: SplitterConfig,
}

impl TextSplitter {
    /// # Errors
    ///
    /// Returns [`DocumentError::InvalidConfig`] if `chunk_size` is zero or the
    /// overlap is not smaller than the chunk size.
    pub fn new(config: SplitterConfig) -> Result<Self, DocumentError> {
        if config.chunk_size == 0 {
            return Err(DocumentError::InvalidConfig(
                "chunk_size must be greater than zero".into(),
            ));
        }
        if config.chunk_overlap >= config.chunk_size {
            return Err(DocumentError::InvalidConfig(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                config.chunk_overlap, config.chunk_size
            )));
        }
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    #[must_use]
    pub fn split(&self, document: &Document) -> Vec<Chunk> {
        self.split_text(&document.content)
            .into_iter()
            .enumerate()
            .map(|(i, (content, span))| Chunk {
                content,
                span,
                metadata: document.metadata.clone(),
                chunk_index: i,
            })
            .collect()
    }

    /// Split `text` into trimmed, non-empty chunks with their recovered spans.
    #[must_use]
    pub fn split_text(&self, text: &str) -> Vec<(String, Span)> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let raw = match self.config.strategy {
            SplitStrategy::Recursive => {
                let mut out = Vec::new();
                self.split_recursive(text, &SEPARATORS, &mut out);
                out
            }
            SplitStrategy::Paragraph => self.split_paragraphs(text),
        };

        let pieces: Vec<String> = raw
            .into_iter()
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty())
            .collect();

        locate_spans(text, pieces, self.config.chunk_overlap)
    }

    fn split_recursive(&self, text: &str, separators: &[&str], out: &mut Vec<String>) {
        let mut separator = "";
        let mut remaining: &[&str] = &[];
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() {
                break;
            }
            if text.contains(sep) {
                separator = sep;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut good: Vec<&str> = Vec::new();
        for piece in split_keep_separator(text, separator) {
            if char_len(piece) < self.config.chunk_size {
                good.push(piece);
                continue;
            }
            if !good.is_empty() {
                self.merge_pieces(&good, out);
                good.clear();
            }
            if remaining.is_empty() {
                out.push(piece.to_owned());
            } else {
                self.split_recursive(piece, remaining, out);
            }
        }
        if !good.is_empty() {
            self.merge_pieces(&good, out);
        }
    }

    /// Greedily pack pieces into chunks, carrying a tail of whole pieces no
    /// longer than `chunk_overlap` into the next chunk.
    fn merge_pieces(&self, pieces: &[&str], out: &mut Vec<String>) {
        let size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;

        let mut current: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            if total + len > size && !current.is_empty() {
                out.push(current.iter().map(|(p, _)| *p).collect());
                while total > overlap || (total + len > size && total > 0) {
                    let Some((_, popped)) = current.pop_front() else {
                        break;
                    };
                    total -= popped;
                }
            }
            current.push_back((piece, len));
            total += len;
        }

        if !current.is_empty() {
            out.push(current.iter().map(|(p, _)| *p).collect());
        }
    }

    fn split_paragraphs(&self, text: &str) -> Vec<String> {
        let size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;

        let mut chunks = Vec::new();
        let mut buf = String::new();

        for para in text
            .split(PARAGRAPH_BREAK)
            .map(str::trim)
            .filter(|p| !p.is_empty())
        {
            let para_len = char_len(para);
            if para_len > size {
                if !buf.is_empty() {
                    chunks.push(std::mem::take(&mut buf));
                }
                chunks.extend(char_windows(para, size, size - overlap));
                continue;
            }
            if buf.is_empty() {
                buf.push_str(para);
                continue;
            }
            if char_len(&buf) + PARAGRAPH_BREAK.len() + para_len <= size {
                buf.push_str(PARAGRAPH_BREAK);
                buf.push_str(para);
                continue;
            }

            let seed = tail_chars(&buf, overlap).trim_start().to_owned();
            chunks.push(std::mem::take(&mut buf));
            if !seed.is_empty() && char_len(&seed) + PARAGRAPH_BREAK.len() + para_len <= size {
                buf = seed;
                buf.push_str(PARAGRAPH_BREAK);
            }
            buf.push_str(para);
        }

        if !buf.is_empty() {
            chunks.push(buf);
        }
        chunks
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split on `separator`, attaching each separator to the piece that follows it.
fn split_keep_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut last = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > last {
            pieces.push(&text[last..idx]);
        }
        last = idx;
    }
    if last < text.len() {
        pieces.push(&text[last..]);
    }
    pieces
}

fn char_windows(text: &str, size: usize, step: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let step = step.max(1);
    let mut windows = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + size).min(chars.len());
        windows.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }
    windows
}

fn tail_chars(text: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    match text.char_indices().rev().nth(n - 1) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}

/// Find each piece in `text` from a monotonic cursor and record its char span.
///
/// The cursor starts at the previous located end rewound by `overlap`, and never
/// before the previous start + 1. An unlocatable piece gets `0..len(piece)`.
fn locate_spans(text: &str, pieces: Vec<String>, overlap: usize) -> Vec<(String, Span)> {
    let byte_at: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();

    let find_from = |piece: &str, cursor: usize| -> Option<usize> {
        let from = *byte_at.get(cursor)?;
        let rel = text[from..].find(piece)?;
        byte_at.binary_search(&(from + rel)).ok()
    };

    let mut prev: Option<(usize, usize)> = None;
    let mut out = Vec::with_capacity(pieces.len());

    for piece in pieces {
        let cursor = prev.map_or(0, |(start, end)| end.saturating_sub(overlap).max(start + 1));
        let found = find_from(&piece, cursor)
            .or_else(|| prev.and_then(|(start, _)| find_from(&piece, start + 1)));

        let span = if let Some(start) = found {
            let end = start + char_len(&piece);
            prev = Some((start, end));
            Span {
                start,
                end,
                located: true,
            }
        } else {
            tracing::warn!(
                chunk = out.len(),
                "could not locate chunk in source text, using degraded span"
            );
            Span {
                start: 0,
                end: char_len(&piece),
                located: false,
            }
        };
        out.push((piece, span));
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::document::types::DocumentMetadata;

    fn make_doc(content: &str) -> Document {
        Document {
            content: content.to_owned(),
            metadata: DocumentMetadata {
                source: "test".to_owned(),
                content_type: "text/plain".to_owned(),
                extra: HashMap::new(),
            },
        }
    }

    fn splitter(chunk_size: usize, chunk_overlap: usize, strategy: SplitStrategy) -> TextSplitter {
        TextSplitter::new(SplitterConfig {
            chunk_size,
            chunk_overlap,
            strategy,
        })
        .unwrap()
    }

    /// 2000 characters: a 100-char opening sentence followed by 19 sentences
    /// of 100 chars each, every one starting with the ". " separator.
    fn two_thousand_chars() -> String {
        let mut text = "a".repeat(100);
        for i in 0..18u8 {
            text.push_str(". ");
            text.push_str(&char::from(b'b' + i).to_string().repeat(98));
        }
        text.push_str(". ");
        text.push_str(&"z".repeat(97));
        text.push('.');
        text
    }

    #[test]
    fn zero_chunk_size_rejected() {
        let result = TextSplitter::new(SplitterConfig {
            chunk_size: 0,
            chunk_overlap: 0,
            strategy: SplitStrategy::Recursive,
        });
        assert!(matches!(result, Err(DocumentError::InvalidConfig(_))));
    }

    #[test]
    fn overlap_not_smaller_than_size_rejected() {
        let result = TextSplitter::new(SplitterConfig {
            chunk_size: 100,
            chunk_overlap: 100,
            strategy: SplitStrategy::Paragraph,
        });
        assert!(matches!(result, Err(DocumentError::InvalidConfig(_))));
    }

    #[test]
    fn empty_and_whitespace_documents_produce_nothing() {
        let s = TextSplitter::new(SplitterConfig::default()).unwrap();
        assert!(s.split(&make_doc("")).is_empty());
        assert!(s.split(&make_doc("  \n\n\t ")).is_empty());
    }

    #[test]
    fn single_small_chunk() {
        let s = TextSplitter::new(SplitterConfig::default()).unwrap();
        let chunks = s.split(&make_doc("  Hello world.  "));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Hello world.");
        assert_eq!(
            chunks[0].span,
            Span {
                start: 2,
                end: 14,
                located: true
            }
        );
        assert_eq!(chunks[0].metadata.source, "test");
    }

    #[test]
    fn two_thousand_chars_make_three_chunks() {
        let text = two_thousand_chars();
        assert_eq!(text.chars().count(), 2000);

        let s = splitter(800, 120, SplitStrategy::Recursive);
        let chunks = s.split(&make_doc(&text));
        assert_eq!(chunks.len(), 3);

        let spans: Vec<(usize, usize)> = chunks.iter().map(|c| (c.span.start, c.span.end)).collect();
        assert_eq!(spans, vec![(0, 800), (700, 1500), (1400, 2000)]);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i);
            assert!(chunk.span.located);
            assert!(chunk.content.chars().count() <= 800);
        }
    }

    #[test]
    fn separator_attaches_to_following_piece() {
        let pieces = split_keep_separator("one. two. three", ". ");
        assert_eq!(pieces, vec!["one", ". two", ". three"]);
    }

    #[test]
    fn consecutive_separators_stay_separate() {
        let pieces = split_keep_separator("\n\n\n\nabc", "\n\n");
        assert_eq!(pieces, vec!["\n\n", "\n\nabc"]);
    }

    #[test]
    fn empty_separator_splits_characters() {
        let pieces = split_keep_separator("añb", "");
        assert_eq!(pieces, vec!["a", "ñ", "b"]);
    }

    #[test]
    fn paragraphs_are_preferred_boundaries() {
        let text = "Betty arrives.\n\nRita has amnesia.\n\nThe box opens.";
        let s = splitter(20, 0, SplitStrategy::Recursive);
        let chunks: Vec<String> = s.split_text(text).into_iter().map(|(c, _)| c).collect();
        assert_eq!(
            chunks,
            vec!["Betty arrives.", "Rita has amnesia.", "The box opens."]
        );
    }

    #[test]
    fn oversized_word_falls_back_to_characters() {
        let s = splitter(4, 1, SplitStrategy::Recursive);
        let chunks = s.split_text("abcdefghij");
        assert!(chunks.iter().all(|(c, _)| c.chars().count() <= 4));
        assert_eq!(chunks.first().map(|(c, _)| c.as_str()), Some("abcd"));
        assert!(chunks.iter().all(|(_, span)| span.located));
    }

    #[test]
    fn recursive_overlap_repeats_tail_pieces() {
        let text = "aaaa bbbb cccc dddd";
        let s = splitter(10, 5, SplitStrategy::Recursive);
        let chunks: Vec<String> = s.split_text(text).into_iter().map(|(c, _)| c).collect();
        assert_eq!(chunks, vec!["aaaa bbbb", "bbbb cccc", "cccc dddd"]);
    }

    #[test]
    fn paragraph_strategy_merges_small_paragraphs() {
        let text = "One.\n\nTwo.\n\nThree.";
        let s = splitter(100, 10, SplitStrategy::Paragraph);
        let chunks = s.split_text(text);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].0, text);
        assert_eq!(chunks[0].1.start, 0);
    }

    #[test]
    fn paragraph_strategy_seeds_overlap() {
        let text = "aaaaaaaaaa\n\nbbbbbbbbbb";
        let s = splitter(16, 3, SplitStrategy::Paragraph);
        let chunks: Vec<String> = s.split_text(text).into_iter().map(|(c, _)| c).collect();
        assert_eq!(chunks, vec!["aaaaaaaaaa", "aaa\n\nbbbbbbbbbb"]);
    }

    #[test]
    fn paragraph_strategy_windows_long_paragraph() {
        let text = "x".repeat(25);
        let s = splitter(10, 2, SplitStrategy::Paragraph);
        let chunks = s.split_text(&text);
        let lens: Vec<usize> = chunks.iter().map(|(c, _)| c.len()).collect();
        assert_eq!(lens, vec![10, 10, 9]);
        let starts: Vec<usize> = chunks.iter().map(|(_, s)| s.start).collect();
        assert_eq!(starts, vec![0, 8, 16]);
    }

    #[test]
    fn paragraph_strategy_terminates_when_seed_cannot_fit() {
        let text = "aaaaaaaaa\n\nbbbbbbbbb\n\nccccccccc";
        let s = splitter(10, 5, SplitStrategy::Paragraph);
        let chunks: Vec<String> = s.split_text(text).into_iter().map(|(c, _)| c).collect();
        assert_eq!(chunks, vec!["aaaaaaaaa", "bbbbbbbbb", "ccccccccc"]);
    }

    #[test]
    fn spans_count_characters_not_bytes() {
        let text = "Çağ değişir. Rüya sürer.";
        let s = splitter(14, 0, SplitStrategy::Recursive);
        for (chunk, span) in s.split_text(text) {
            assert!(span.located);
            let slice: String = text
                .chars()
                .skip(span.start)
                .take(span.end - span.start)
                .collect();
            assert_eq!(slice, chunk);
        }
    }

    #[test]
    fn unlocatable_piece_degrades_to_own_length() {
        let text = "alpha beta";
        let spans = locate_spans(text, vec!["alpha".into(), "gamma".into()], 0);
        assert_eq!(
            spans[1].1,
            Span {
                start: 0,
                end: 5,
                located: false
            }
        );
        assert!(spans[0].1.located);
    }

    #[test]
    fn repeated_text_locates_successive_occurrences() {
        let text = "echo echo echo";
        let spans = locate_spans(text, vec!["echo".into(), "echo".into(), "echo".into()], 0);
        let starts: Vec<usize> = spans.iter().map(|(_, s)| s.start).collect();
        assert_eq!(starts, vec![0, 5, 10]);
    }

    #[test]
    fn strategy_parses_from_str() {
        assert_eq!(
            "Paragraph".parse::<SplitStrategy>().unwrap(),
            SplitStrategy::Paragraph
        );
        assert!("semantic".parse::<SplitStrategy>().is_err());
    }

    #[test]
    fn tail_chars_respects_char_boundaries() {
        assert_eq!(tail_chars("abcğü", 2), "ğü");
        assert_eq!(tail_chars("ab", 5), "ab");
        assert_eq!(tail_chars("ab", 0), "");
    }

    mod proptest_splitter {
        use super::*;
        use proptest::prelude::*;

        fn strategy() -> impl Strategy<Value = SplitStrategy> {
            prop_oneof![
                Just(SplitStrategy::Recursive),
                Just(SplitStrategy::Paragraph)
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(500))]

            #[test]
            fn split_never_panics(
                content in "\\PC{0,3000}",
                chunk_size in 1usize..1000,
                overlap_frac in 0.0f64..1.0,
                strategy in strategy(),
            ) {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
                let chunk_overlap = ((chunk_size as f64) * overlap_frac) as usize;
                let s = splitter(chunk_size, chunk_overlap.min(chunk_size - 1), strategy);
                let _ = s.split(&make_doc(&content));
            }

            #[test]
            fn chunks_respect_size_and_are_trimmed(
                content in "[a-zç .\n]{1,1500}",
                chunk_size in 2usize..300,
                strategy in strategy(),
            ) {
                let s = splitter(chunk_size, chunk_size / 4, strategy);
                for chunk in s.split(&make_doc(&content)) {
                    prop_assert!(!chunk.content.is_empty());
                    prop_assert_eq!(chunk.content.trim(), chunk.content.as_str());
                    prop_assert!(chunk.content.chars().count() <= chunk_size);
                }
            }

            #[test]
            fn located_spans_match_source(
                content in "[a-zü .\n]{1,1500}",
                chunk_size in 2usize..300,
                strategy in strategy(),
            ) {
                let s = splitter(chunk_size, chunk_size / 3, strategy);
                let total = content.chars().count();
                for chunk in s.split(&make_doc(&content)) {
                    prop_assert!(chunk.span.start <= chunk.span.end);
                    prop_assert!(chunk.span.end <= total);
                    if chunk.span.located {
                        let slice: String = content
                            .chars()
                            .skip(chunk.span.start)
                            .take(chunk.span.end - chunk.span.start)
                            .collect();
                        prop_assert_eq!(slice, chunk.content);
                    }
                }
            }

            #[test]
            fn non_whitespace_text_is_covered(
                content in "[a-z. ]{1,1500}",
                chunk_size in 2usize..300,
            ) {
                let s = splitter(chunk_size, 0, SplitStrategy::Recursive);
                let chunks = s.split(&make_doc(&content));
                let kept: usize = chunks
                    .iter()
                    .map(|c| c.content.chars().filter(|ch| !ch.is_whitespace()).count())
                    .sum();
                let source = content.chars().filter(|ch| !ch.is_whitespace()).count();
                prop_assert!(kept >= source);
            }

            #[test]
            fn split_is_deterministic(
                content in "[a-z. \n]{0,800}",
                chunk_size in 2usize..200,
                strategy in strategy(),
            ) {
                let s = splitter(chunk_size, chunk_size / 5, strategy);
                let a: Vec<(String, Span)> = s.split_text(&content);
                let b: Vec<(String, Span)> = s.split_text(&content);
                prop_assert_eq!(a, b);
            }

            #[test]
            fn chunk_indices_sequential(
                content in "[a-z. ]{10,1000}",
                chunk_size in 5usize..100,
                strategy in strategy(),
            ) {
                let s = splitter(chunk_size, 0, strategy);
                for (i, chunk) in s.split(&make_doc(&content)).iter().enumerate() {
                    prop_assert_eq!(chunk.chunk_index, i);
                }
            }
        }
    }
}

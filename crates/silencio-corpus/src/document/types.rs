use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct DocumentMetadata {
    pub source: String,
    pub content_type: String,
    pub extra: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct Document {
    pub content: String,
    pub metadata: DocumentMetadata,
}

/// Character offsets of a chunk inside its source text.
///
/// Offsets count Unicode scalar values. When the chunk cannot be located the
/// span is `0..len(chunk)` and `located` is `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub located: bool,
}

#[derive(Debug, Clone)]
pub struct Chunk {
    pub content: String,
    pub span: Span,
    pub metadata: DocumentMetadata,
    pub chunk_index: usize,
}

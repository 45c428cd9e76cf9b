//! JSON Lines persistence for chunk embeddings.
//!
//! One record per line. Writes go to a temporary file in the destination
//! directory and are renamed into place, so readers never see a partial corpus.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::document::Chunk;
use crate::error::CorpusError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub source: String,
    pub chunk_index: usize,
    pub start_char: Option<usize>,
    pub end_char: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub id: String,
    pub text: String,
    pub embedding: Vec<f32>,
    pub metadata: RecordMetadata,
}

impl EmbeddingRecord {
    #[must_use]
    pub fn from_chunk(chunk: &Chunk, embedding: Vec<f32>) -> Self {
        let file_name = Path::new(&chunk.metadata.source)
            .file_name()
            .map_or_else(|| chunk.metadata.source.clone(), |n| n.to_string_lossy().into_owned());
        Self {
            id: format!("{file_name}::chunk_{}", chunk.chunk_index),
            text: chunk.content.clone(),
            embedding,
            metadata: RecordMetadata {
                source: chunk.metadata.source.clone(),
                chunk_index: chunk.chunk_index,
                start_char: Some(chunk.span.start),
                end_char: Some(chunk.span.end),
            },
        }
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }
}

/// Lenient on-disk shape: anything but `text` and `embedding` may be missing.
#[derive(Deserialize)]
struct RawRecord {
    #[serde(default)]
    id: Option<String>,
    text: Option<String>,
    embedding: Option<Vec<f32>>,
    #[serde(default)]
    metadata: Option<RawMetadata>,
}

#[derive(Deserialize, Default)]
struct RawMetadata {
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    chunk_index: Option<usize>,
    #[serde(default)]
    start_char: Option<usize>,
    #[serde(default)]
    end_char: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub loaded: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct RecordWriter {
    output: PathBuf,
}

impl RecordWriter {
    #[must_use]
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
        }
    }

    #[must_use]
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Write one record per chunk, replacing the output file atomically.
    ///
    /// # Errors
    ///
    /// Returns [`CorpusError::CountMismatch`] if `chunks` and `vectors` differ in
    /// length, or an IO error if the file cannot be written.
    pub fn write(&self, chunks: &[Chunk], vectors: Vec<Vec<f32>>) -> Result<usize, CorpusError> {
        if chunks.len() != vectors.len() {
            return Err(CorpusError::CountMismatch {
                chunks: chunks.len(),
                vectors: vectors.len(),
            });
        }

        let dir = match self.output.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let tmp = tempfile::NamedTempFile::new_in(&dir)?;
        {
            let mut out = BufWriter::new(tmp.as_file());
            for (chunk, embedding) in chunks.iter().zip(vectors) {
                let record = EmbeddingRecord::from_chunk(chunk, embedding);
                serde_json::to_writer(&mut out, &record)?;
                out.write_all(b"\n")?;
            }
            out.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.output)?;

        tracing::info!(
            path = %self.output.display(),
            records = chunks.len(),
            "corpus written"
        );
        Ok(chunks.len())
    }
}

/// Read every valid record from a JSONL corpus file.
///
/// Malformed lines, records without `text` or `embedding`, and records whose
/// dimension differs from the first valid record are skipped with a warning.
///
/// # Errors
///
/// Returns [`CorpusError::NotFound`] if the file does not exist or an IO error
/// if it cannot be read.
pub fn load_records(path: &Path) -> Result<(Vec<EmbeddingRecord>, LoadStats), CorpusError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CorpusError::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    let mut records = Vec::new();
    let mut stats = LoadStats::default();
    let mut dimension: Option<usize> = None;

    // Byte lines, so an invalid UTF-8 line is skipped like any other bad line.
    for (line_no, line) in BufReader::new(file).split(b'\n').enumerate() {
        let line = line?;
        if line.trim_ascii().is_empty() {
            continue;
        }
        let line_no = line_no + 1;

        let raw: RawRecord = match serde_json::from_slice(&line) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(line = line_no, "skipping malformed corpus line: {e}");
                stats.skipped += 1;
                continue;
            }
        };

        let (Some(text), Some(embedding)) = (raw.text, raw.embedding) else {
            tracing::warn!(line = line_no, "skipping record without text or embedding");
            stats.skipped += 1;
            continue;
        };

        if embedding.is_empty() {
            tracing::warn!(line = line_no, "skipping record with empty embedding");
            stats.skipped += 1;
            continue;
        }

        match dimension {
            None => dimension = Some(embedding.len()),
            Some(d) if d != embedding.len() => {
                tracing::warn!(
                    line = line_no,
                    expected = d,
                    got = embedding.len(),
                    "skipping record with mismatched dimension"
                );
                stats.skipped += 1;
                continue;
            }
            Some(_) => {}
        }

        let meta = raw.metadata.unwrap_or_default();
        let chunk_index = meta.chunk_index.unwrap_or(records.len());
        records.push(EmbeddingRecord {
            id: raw.id.unwrap_or_else(|| format!("line_{line_no}")),
            text,
            embedding,
            metadata: RecordMetadata {
                source: meta.source.unwrap_or_default(),
                chunk_index,
                start_char: meta.start_char,
                end_char: meta.end_char,
            },
        });
        stats.loaded += 1;
    }

    Ok((records, stats))
}

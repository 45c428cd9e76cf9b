use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use silencio_corpus::document::{SplitterConfig, TextSplitter};
use silencio_corpus::{Corpus, EmbeddingRecord, RecordMetadata};

fn generate_text(size: usize) -> String {
    let paragraph = "Betty and Rita search the apartment for clues. \
                     The blue key turns and the dream folds back on itself.\n\n";
    paragraph.repeat(size / paragraph.len() + 1)[..size].to_string()
}

#[allow(clippy::cast_precision_loss)]
fn synthetic_corpus(rows: usize, dim: usize) -> Corpus {
    let records = (0..rows)
        .map(|i| EmbeddingRecord {
            id: format!("bench::chunk_{i}"),
            text: format!("chunk {i}"),
            embedding: (0..dim).map(|d| ((i * 31 + d * 7) % 97) as f32 / 97.0).collect(),
            metadata: RecordMetadata {
                source: "bench".into(),
                chunk_index: i,
                start_char: None,
                end_char: None,
            },
        })
        .collect();
    Corpus::from_records(records).unwrap()
}

fn retrieval(c: &mut Criterion) {
    let mut group = c.benchmark_group("retrieve_top5");

    for rows in [100, 1_000, 10_000] {
        let corpus = synthetic_corpus(rows, 384);
        let query: Vec<f32> = corpus.matrix().row(rows / 2).unwrap().to_vec();
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::new("dim384", rows), &query, |b, query| {
            b.iter(|| corpus.search(black_box(query), 5));
        });
    }

    group.finish();
}

fn splitting(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_text");
    let splitter = TextSplitter::new(SplitterConfig::default()).unwrap();

    for size in [10_000, 100_000] {
        let input = generate_text(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("recursive", size), &input, |b, input| {
            b.iter(|| splitter.split_text(black_box(input)));
        });
    }

    group.finish();
}

criterion_group!(benches, retrieval, splitting);
criterion_main!(benches);

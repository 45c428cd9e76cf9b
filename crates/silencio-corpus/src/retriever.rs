use std::cmp::Ordering;

use crate::corpus::EmbeddingMatrix;
use crate::store::EmbeddingRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalResult {
    pub record: EmbeddingRecord,
    pub score: f32,
}

/// L2-normalize in place; a zero vector stays zero.
///
/// Components are first scaled by the largest magnitude so the squared sum
/// cannot overflow. Vectors with a non-finite component are left unchanged.
pub fn l2_normalize_in_place(v: &mut [f32]) {
    if v.iter().any(|x| !x.is_finite()) {
        return;
    }
    let scale = max_abs(v);
    if scale == 0.0 {
        return;
    }
    for x in v.iter_mut() {
        *x /= scale;
    }
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    for x in v.iter_mut() {
        *x /= norm;
    }
}

fn max_abs(v: &[f32]) -> f32 {
    v.iter().fold(0.0, |m, x| m.max(x.abs()))
}

/// Cosine between a unit (or zero) query and `row`, computed on the row
/// scaled by its largest magnitude. Zero rows score 0, non-finite rows NaN.
fn cosine_with_unit(unit_query: &[f32], row: &[f32]) -> f32 {
    if row.iter().any(|x| !x.is_finite()) {
        return f32::NAN;
    }
    let scale = max_abs(row);
    if scale == 0.0 {
        return 0.0;
    }
    let (dot, sq) = unit_query
        .iter()
        .zip(row)
        .fold((0.0f32, 0.0f32), |(dot, sq), (q, r)| {
            let r = r / scale;
            (dot + q * r, sq + r * r)
        });
    dot / sq.sqrt()
}

/// Rank `records` by cosine similarity between `query` and each matrix row.
///
/// Returns at most `k` results, highest score first; equal scores keep the
/// lower row index first. Empty query, empty corpus, `k == 0`, a dimension
/// mismatch or a query with a non-finite component yield an empty list.
/// Rows with a non-finite component are left out.
#[must_use]
pub fn retrieve(
    query: &[f32],
    matrix: &EmbeddingMatrix,
    records: &[EmbeddingRecord],
    k: usize,
) -> Vec<RetrievalResult> {
    if k == 0 || query.is_empty() || matrix.is_empty() || records.is_empty() {
        return Vec::new();
    }
    if query.len() != matrix.dim() {
        tracing::warn!(
            query_dim = query.len(),
            corpus_dim = matrix.dim(),
            "query dimension does not match corpus"
        );
        return Vec::new();
    }

    if query.iter().any(|x| !x.is_finite()) {
        tracing::warn!("query embedding has a non-finite component");
        return Vec::new();
    }

    let mut q = query.to_vec();
    l2_normalize_in_place(&mut q);

    let mut scored: Vec<(usize, f32)> = matrix
        .iter_rows()
        .take(records.len())
        .enumerate()
        .filter_map(|(i, row)| {
            let score = cosine_with_unit(&q, row);
            (!score.is_nan()).then_some((i, score))
        })
        .collect();

    // NaN excluded above, so partial_cmp never falls through; sort_by is stable.
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.truncate(k);

    for (i, score) in &scored {
        tracing::debug!(id = %records[*i].id, score, "retrieved");
    }

    scored
        .into_iter()
        .map(|(i, score)| RetrievalResult {
            record: records[i].clone(),
            score,
        })
        .collect()
}

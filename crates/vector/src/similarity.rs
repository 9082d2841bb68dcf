use folio_common::{FolioError, Result};
use std::cmp::Ordering;

/// Scored candidate
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMatch<K> {
    pub id: K,
    pub score: f32,
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// L2 norm
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine similarity between two equal-length vectors.
///
/// Returns 0.0 when either vector has zero norm. That value means "no
/// signal", not "orthogonal".
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(FolioError::dimension_mismatch(a.len(), b.len()));
    }
    Ok(cosine_with_norm(a, l2_norm(a), b))
}

fn cosine_with_norm(query: &[f32], query_norm: f32, target: &[f32]) -> f32 {
    let target_norm = l2_norm(target);
    if query_norm == 0.0 || target_norm == 0.0 {
        return 0.0;
    }
    dot(query, target) / (query_norm * target_norm)
}

/// Rank candidates against a query by cosine similarity.
///
/// Full linear scan. Results are sorted by descending score; equal scores
/// are ordered by ascending id. Candidates below `min_score` are dropped and
/// at most `top_k` results are returned.
pub fn rank<'a, K, I>(
    query: &[f32],
    candidates: I,
    top_k: usize,
    min_score: Option<f32>,
) -> Result<Vec<ScoredMatch<K>>>
where
    K: Ord,
    I: IntoIterator<Item = (K, &'a [f32])>,
{
    let query_norm = l2_norm(query);
    let mut results = Vec::new();

    for (id, vector) in candidates {
        if vector.len() != query.len() {
            return Err(FolioError::dimension_mismatch(query.len(), vector.len()));
        }
        let score = cosine_with_norm(query, query_norm, vector);
        if min_score.map_or(true, |min| score >= min) {
            results.push(ScoredMatch { id, score });
        }
    }

    results.sort_by(|a, b| match b.score.total_cmp(&a.score) {
        Ordering::Equal => a.id.cmp(&b.id),
        other => other,
    });
    results.truncate(top_k);

    Ok(results)
}

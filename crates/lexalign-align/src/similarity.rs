// crates/lexalign-align/src/similarity.rs
//
// Cosine similarity and top-k ranking over dense matrices.

use std::cmp::Ordering;

use nalgebra::DMatrix;

/// Scale each row to unit length. Zero rows stay zero, so they score 0
/// against everything.
pub fn row_normalized(m: &DMatrix<f64>) -> DMatrix<f64> {
    let mut out = m.clone();
    for mut row in out.row_iter_mut() {
        let norm = row.norm();
        if norm > 0.0 {
            row /= norm;
        }
    }
    out
}

/// Pairwise cosine similarity: entry `(i, j)` compares `queries[i]` with
/// `candidates[j]`. Both matrices must have the same column count.
pub fn cosine_similarity_matrix(queries: &DMatrix<f64>, candidates: &DMatrix<f64>) -> DMatrix<f64> {
    let q = row_normalized(queries);
    let c = row_normalized(candidates);
    q * c.transpose()
}

/// Order by descending score, then ascending index. NaN ranks last.
fn by_rank(a: &(usize, f64), b: &(usize, f64)) -> Ordering {
    a.1.is_nan()
        .cmp(&b.1.is_nan())
        .then_with(|| b.1.total_cmp(&a.1))
        .then_with(|| a.0.cmp(&b.0))
}

/// The `k` highest scores as `(index, score)`, best first.
///
/// Equal scores rank the lower index first. `k` larger than the number of
/// scores returns them all.
pub fn top_k<I>(scores: I, k: usize) -> Vec<(usize, f64)>
where
    I: IntoIterator<Item = f64>,
{
    let mut scored: Vec<(usize, f64)> = scores.into_iter().enumerate().collect();
    let k = k.min(scored.len());
    if k == 0 {
        return Vec::new();
    }
    if k < scored.len() {
        scored.select_nth_unstable_by(k - 1, by_rank);
        scored.truncate(k);
    }
    scored.sort_by(by_rank);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_identical_rows() {
        let m = DMatrix::from_row_slice(1, 3, &[1.0, 2.0, 3.0]);
        let sims = cosine_similarity_matrix(&m, &m);
        assert!((sims[(0, 0)] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cosine_orthogonal_and_opposite() {
        let q = DMatrix::from_row_slice(1, 2, &[1.0, 0.0]);
        let c = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, -2.0, 0.0]);
        let sims = cosine_similarity_matrix(&q, &c);
        assert!(sims[(0, 0)].abs() < 1e-12);
        assert!((sims[(0, 1)] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn cosine_zero_vector_scores_zero() {
        let q = DMatrix::from_row_slice(1, 2, &[0.0, 0.0]);
        let c = DMatrix::from_row_slice(1, 2, &[1.0, 1.0]);
        assert_eq!(cosine_similarity_matrix(&q, &c)[(0, 0)], 0.0);
    }

    #[test]
    fn top_k_orders_descending() {
        let ranked = top_k(vec![0.1, 0.9, 0.5, 0.7], 3);
        let ids: Vec<usize> = ranked.iter().map(|(i, _)| *i).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn top_k_ties_prefer_lower_index() {
        let ranked = top_k(vec![0.5, 0.8, 0.5, 0.8, 0.5], 4);
        let ids: Vec<usize> = ranked.iter().map(|(i, _)| *i).collect();
        assert_eq!(ids, vec![1, 3, 0, 2]);
    }

    #[test]
    fn top_k_larger_than_input_returns_all() {
        let ranked = top_k(vec![0.2, 0.4], 10);
        assert_eq!(ranked, vec![(1, 0.4), (0, 0.2)]);
    }

    #[test]
    fn top_k_ranks_nan_last() {
        let ranked = top_k(vec![0.2, f64::NAN, 0.9, -f64::NAN, 0.4], 3);
        let ids: Vec<usize> = ranked.iter().map(|(i, _)| *i).collect();
        assert_eq!(ids, vec![2, 4, 0]);

        let all = top_k(vec![f64::NAN, 0.1], 2);
        assert_eq!(all[0], (1, 0.1));
        assert!(all[1].1.is_nan());
    }

    #[test]
    fn top_k_zero_is_empty() {
        assert!(top_k(vec![1.0], 0).is_empty());
    }
}

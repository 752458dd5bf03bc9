// crates/lexalign-align/src/builder.rs
//
// End-to-end aligner assembly for one ordered (source, target) pair.

use lexalign_core::{EmbeddingSpace, FrequencyTable, LexAlignError};

use crate::aligner::Aligner;
use crate::anchors::{select_anchors, AnchorCap, AnchorList, AnchorPair};
use crate::strategy::{FitOptions, Strategy};

/// Procrustes aligner over an explicit anchor list.
pub fn get_svd_aligner(
    source: EmbeddingSpace,
    target: EmbeddingSpace,
    anchors: &AnchorList,
) -> Result<Aligner, LexAlignError> {
    Aligner::fit(
        Strategy::Procrustes,
        &FitOptions::default(),
        source,
        target,
        anchors.to_pairs(),
    )
}

/// Least-squares aligner over an explicit anchor list.
pub fn get_lstsq_aligner(
    source: EmbeddingSpace,
    target: EmbeddingSpace,
    anchors: &AnchorList,
) -> Result<Aligner, LexAlignError> {
    Aligner::fit(
        Strategy::LeastSquares,
        &FitOptions::default(),
        source,
        target,
        anchors.to_pairs(),
    )
}

/// CCA aligner over an explicit anchor list.
pub fn get_cca_aligner(
    source: EmbeddingSpace,
    target: EmbeddingSpace,
    anchors: &AnchorList,
    options: &FitOptions,
) -> Result<Aligner, LexAlignError> {
    Aligner::fit(Strategy::Cca, options, source, target, anchors.to_pairs())
}

/// Select anchors from `frequencies` and fit `strategy`.
///
/// Corpus names for the frequency lookup are the spaces' names.
pub fn build_aligner(
    strategy: Strategy,
    options: &FitOptions,
    source: EmbeddingSpace,
    target: EmbeddingSpace,
    frequencies: &FrequencyTable,
    cap: AnchorCap,
) -> Result<Aligner, LexAlignError> {
    let anchors = select_anchors(
        source.index(),
        target.index(),
        frequencies,
        source.name(),
        target.name(),
        cap,
    )?;
    Aligner::fit(strategy, options, source, target, anchors.to_pairs())
}

/// Fit `strategy` on a seed dictionary whose source and target words may
/// differ (e.g. a bilingual lexicon).
pub fn build_aligner_with_pairs(
    strategy: Strategy,
    options: &FitOptions,
    source: EmbeddingSpace,
    target: EmbeddingSpace,
    pairs: Vec<AnchorPair>,
) -> Result<Aligner, LexAlignError> {
    Aligner::fit(strategy, options, source, target, pairs)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use nalgebra::DMatrix;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::strategy::AlignmentTransform;

    /// Two spaces over the same `n` words where the target is a rotation of
    /// the source, plus `extra` words private to each side.
    fn rotated_pair(n: usize, dims: usize, seed: u64) -> (EmbeddingSpace, EmbeddingSpace) {
        let mut rng = StdRng::seed_from_u64(seed);
        let base = DMatrix::<f64>::from_fn(n, dims, |_, _| rng.gen_range(-1.0..1.0));
        // Orthogonal factor of a random matrix.
        let q = DMatrix::<f64>::from_fn(dims, dims, |_, _| rng.gen_range(-1.0..1.0))
            .qr()
            .q();
        let rotated = &base * &q;

        let rows = |m: &DMatrix<f64>, extra: &str| {
            let mut rows: Vec<(String, Vec<f32>)> = (0..n)
                .map(|i| {
                    (
                        format!("w{:03}", i),
                        m.row(i).iter().map(|x| *x as f32).collect(),
                    )
                })
                .collect();
            rows.push((extra.to_string(), vec![0.5; dims]));
            rows
        };

        let a = EmbeddingSpace::from_rows("left", rows(&base, "only_left")).unwrap();
        let b = EmbeddingSpace::from_rows("right", rows(&rotated, "only_right")).unwrap();
        (a, b)
    }

    fn counts() -> FrequencyTable {
        let mut left = HashMap::new();
        left.insert("w000".to_string(), 100);
        left.insert("w001".to_string(), 90);
        FrequencyTable::new(HashMap::from([("left".to_string(), left)]))
    }

    fn assert_translates_identically(aligner: &Aligner, n: usize) {
        let queries: Vec<String> = (0..n).map(|i| format!("w{:03}", i)).collect();
        for outcome in aligner.translate_words(&queries, 1).unwrap() {
            let top = outcome.result.unwrap();
            assert_eq!(top[0].word, outcome.word);
        }
    }

    #[test]
    fn build_aligner_selects_ranked_anchors() {
        let (a, b) = rotated_pair(30, 4, 21);
        let aligner = build_aligner(
            Strategy::Procrustes,
            &FitOptions::default(),
            a,
            b,
            &counts(),
            AnchorCap::Limit(10),
        )
        .unwrap();
        assert_eq!(aligner.anchors().len(), 10);
        assert_eq!(aligner.anchors()[0].source, "w000");
        assert_eq!(aligner.anchors()[1].source, "w001");
        assert!(aligner.anchors().iter().all(|p| p.source != "only_left"));
        assert_translates_identically(&aligner, 30);
    }

    #[test]
    fn every_strategy_recovers_a_rotation() {
        for strategy in [Strategy::Procrustes, Strategy::LeastSquares, Strategy::Cca] {
            let (a, b) = rotated_pair(40, 5, 22);
            let aligner = build_aligner(
                strategy,
                &FitOptions::default(),
                a,
                b,
                &counts(),
                AnchorCap::Unbounded,
            )
            .unwrap();
            assert_eq!(aligner.strategy(), strategy);
            assert_translates_identically(&aligner, 40);
        }
    }

    #[test]
    fn explicit_builders_fit_named_strategy() {
        let (a, b) = rotated_pair(20, 3, 23);
        let anchors = select_anchors(
            a.index(),
            b.index(),
            &counts(),
            "left",
            "right",
            AnchorCap::Limit(15),
        )
        .unwrap();

        let svd = get_svd_aligner(a.clone(), b.clone(), &anchors).unwrap();
        assert!(matches!(svd.transform_params(), AlignmentTransform::Linear(_)));
        let lstsq = get_lstsq_aligner(a.clone(), b.clone(), &anchors).unwrap();
        assert_eq!(lstsq.strategy(), Strategy::LeastSquares);
        let cca = get_cca_aligner(a, b, &anchors, &FitOptions::default()).unwrap();
        assert!(matches!(cca.transform_params(), AlignmentTransform::Canonical(_)));
    }

    #[test]
    fn cca_decode_leaves_aligner_untouched() {
        let (a, b) = rotated_pair(30, 3, 24);
        let aligner = build_aligner(
            Strategy::Cca,
            &FitOptions::default(),
            a,
            b,
            &counts(),
            AnchorCap::Unbounded,
        )
        .unwrap();
        let before = aligner.clone();
        aligner.translate_word("w005", 3).unwrap();
        assert_eq!(aligner, before);
    }

    #[test]
    fn disjoint_vocabularies_fail_for_every_strategy() {
        let a = EmbeddingSpace::from_rows("en", vec![("cat", vec![1.0, 0.0])]).unwrap();
        let b = EmbeddingSpace::from_rows("es", vec![("gato", vec![1.0, 0.0])]).unwrap();
        for strategy in [Strategy::Procrustes, Strategy::LeastSquares, Strategy::Cca] {
            let err = build_aligner(
                strategy,
                &FitOptions::default(),
                a.clone(),
                b.clone(),
                &FrequencyTable::default(),
                AnchorCap::Unbounded,
            )
            .unwrap_err();
            assert!(matches!(err, LexAlignError::EmptyAnchorIntersection { .. }));
        }
    }

    #[test]
    fn least_squares_with_too_few_anchors_fails() {
        let (a, b) = rotated_pair(20, 6, 25);
        let err = build_aligner(
            Strategy::LeastSquares,
            &FitOptions::default(),
            a,
            b,
            &counts(),
            AnchorCap::Limit(3),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LexAlignError::UnderdeterminedFit { anchors: 3, required: 6, .. }
        ));
    }

    #[test]
    fn seed_dictionary_pairs() {
        let en = EmbeddingSpace::from_rows(
            "en",
            vec![
                ("cat", vec![1.0, 0.0]),
                ("dog", vec![0.0, 1.0]),
                ("house", vec![0.7, 0.7]),
            ],
        )
        .unwrap();
        // Spanish space rotated by 90 degrees.
        let es = EmbeddingSpace::from_rows(
            "es",
            vec![
                ("gato", vec![0.0, 1.0]),
                ("perro", vec![-1.0, 0.0]),
                ("casa", vec![-0.7, 0.7]),
            ],
        )
        .unwrap();
        let aligner = build_aligner_with_pairs(
            Strategy::Procrustes,
            &FitOptions::default(),
            en,
            es,
            vec![AnchorPair::new("cat", "gato"), AnchorPair::new("dog", "perro")],
        )
        .unwrap();
        assert_eq!(aligner.translate_word("house", 1).unwrap()[0].word, "casa");
    }
}

// crates/lexalign-align/src/strategy.rs
//
// Alignment strategies: fit a transform from paired anchor matrices.
//
// All strategies take `A` (source anchor vectors, one row per anchor) and
// `B` (target anchor vectors, same row order) and produce an
// `AlignmentTransform`. Procrustes and least-squares map only the source
// side; CCA projects both sides into a shared canonical space.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use nalgebra::{DMatrix, DVector, SymmetricEigen};
use serde::{Deserialize, Serialize};

use lexalign_core::LexAlignError;

/// Default ridge added to CCA covariance diagonals.
pub const DEFAULT_CCA_REGULARIZATION: f64 = 1e-6;

/// The available alignment algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Orthogonal Procrustes via SVD of `A^T B`.
    #[serde(rename = "svd")]
    Procrustes,
    /// Minimum-norm least-squares regression `A T ~ B`.
    #[serde(rename = "lstsq")]
    LeastSquares,
    /// Canonical correlation analysis.
    #[serde(rename = "cca")]
    Cca,
}

impl Strategy {
    /// Short name used on the command line and in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Procrustes => "svd",
            Strategy::LeastSquares => "lstsq",
            Strategy::Cca => "cca",
        }
    }

    /// The fitter implementing this strategy.
    pub fn fitter(self, options: &FitOptions) -> Box<dyn AlignmentStrategy> {
        match self {
            Strategy::Procrustes => Box::new(Procrustes),
            Strategy::LeastSquares => Box::new(LeastSquares),
            Strategy::Cca => Box::new(Cca {
                regularization: options.cca_regularization,
            }),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "svd" | "procrustes" => Ok(Strategy::Procrustes),
            "lstsq" | "least-squares" => Ok(Strategy::LeastSquares),
            "cca" => Ok(Strategy::Cca),
            other => Err(format!(
                "unknown alignment method '{}': expected svd, lstsq, or cca",
                other
            )),
        }
    }
}

/// Tunables shared by all fitters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitOptions {
    pub cca_regularization: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            cca_regularization: DEFAULT_CCA_REGULARIZATION,
        }
    }
}

/// A fitter producing an `AlignmentTransform` from paired anchors.
pub trait AlignmentStrategy: Send + Sync {
    fn strategy(&self) -> Strategy;

    /// Fit on row-aligned anchor matrices `source` (n x d_src) and
    /// `target` (n x d_tgt).
    fn fit(
        &self,
        source: &DMatrix<f64>,
        target: &DMatrix<f64>,
    ) -> Result<AlignmentTransform, LexAlignError>;
}

/// Fitted projection bases for CCA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CcaProjection {
    pub x_mean: DVector<f64>,
    pub x_scale: DVector<f64>,
    pub y_mean: DVector<f64>,
    pub y_scale: DVector<f64>,
    /// d_src x r
    pub x_weights: DMatrix<f64>,
    /// d_tgt x r
    pub y_weights: DMatrix<f64>,
    /// Canonical correlations, one per component.
    pub correlations: DVector<f64>,
}

/// The fitted parameters of one strategy. Immutable once fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AlignmentTransform {
    /// `x -> x * T` (Procrustes and least-squares).
    Linear(DMatrix<f64>),
    /// Both sides projected into canonical space.
    Canonical(CcaProjection),
}

impl AlignmentTransform {
    /// Map source-space rows into the comparison space.
    pub fn apply(&self, source: &DMatrix<f64>) -> DMatrix<f64> {
        match self {
            AlignmentTransform::Linear(t) => source * t,
            AlignmentTransform::Canonical(p) => {
                standardize_with(source, &p.x_mean, &p.x_scale) * &p.x_weights
            }
        }
    }

    /// The target matrix as seen by the comparison space.
    ///
    /// Linear transforms compare against the target as-is; CCA returns a
    /// freshly projected copy and never touches the stored matrix.
    pub fn project_target<'a>(&self, target: &'a DMatrix<f64>) -> Cow<'a, DMatrix<f64>> {
        match self {
            AlignmentTransform::Linear(_) => Cow::Borrowed(target),
            AlignmentTransform::Canonical(p) => {
                Cow::Owned(standardize_with(target, &p.y_mean, &p.y_scale) * &p.y_weights)
            }
        }
    }

    /// Dimensionality of the comparison space.
    pub fn output_dims(&self) -> usize {
        match self {
            AlignmentTransform::Linear(t) => t.ncols(),
            AlignmentTransform::Canonical(p) => p.x_weights.ncols(),
        }
    }
}

/// Orthogonal Procrustes: `T = U V^T` where `A^T B = U S V^T`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Procrustes;

impl AlignmentStrategy for Procrustes {
    fn strategy(&self) -> Strategy {
        Strategy::Procrustes
    }

    fn fit(
        &self,
        source: &DMatrix<f64>,
        target: &DMatrix<f64>,
    ) -> Result<AlignmentTransform, LexAlignError> {
        check_rows(source, target)?;
        if source.nrows() < source.ncols() {
            tracing::warn!(
                "Procrustes fit on {} anchors in {} dims is underdetermined; the transform should not be trusted",
                source.nrows(),
                source.ncols()
            );
        }

        let product = source.tr_mul(target);
        let svd = product
            .try_svd(true, true, f64::EPSILON, 0)
            .ok_or_else(|| LexAlignError::FitFailed("SVD did not converge".to_string()))?;
        let u = svd
            .u
            .ok_or_else(|| LexAlignError::FitFailed("SVD produced no U".to_string()))?;
        let v_t = svd
            .v_t
            .ok_or_else(|| LexAlignError::FitFailed("SVD produced no V^T".to_string()))?;

        Ok(AlignmentTransform::Linear(u * v_t))
    }
}

/// Minimum-norm least-squares: `T = pinv(A) B`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeastSquares;

impl AlignmentStrategy for LeastSquares {
    fn strategy(&self) -> Strategy {
        Strategy::LeastSquares
    }

    fn fit(
        &self,
        source: &DMatrix<f64>,
        target: &DMatrix<f64>,
    ) -> Result<AlignmentTransform, LexAlignError> {
        check_rows(source, target)?;
        let (n, d) = source.shape();
        if n < d {
            return Err(LexAlignError::UnderdeterminedFit {
                strategy: Strategy::LeastSquares.to_string(),
                anchors: n,
                required: d,
            });
        }

        let svd = source
            .clone()
            .try_svd(true, true, f64::EPSILON, 0)
            .ok_or_else(|| LexAlignError::FitFailed("SVD did not converge".to_string()))?;
        // Same cutoff as LAPACK's default rcond.
        let cutoff = svd.singular_values.max() * n.max(d) as f64 * f64::EPSILON;
        let t = svd
            .solve(target, cutoff)
            .map_err(|e| LexAlignError::FitFailed(e.to_string()))?;

        Ok(AlignmentTransform::Linear(t))
    }
}

/// Canonical correlation analysis with a small ridge on the covariances.
#[derive(Debug, Clone, Copy)]
pub struct Cca {
    pub regularization: f64,
}

impl Default for Cca {
    fn default() -> Self {
        Self {
            regularization: DEFAULT_CCA_REGULARIZATION,
        }
    }
}

impl AlignmentStrategy for Cca {
    fn strategy(&self) -> Strategy {
        Strategy::Cca
    }

    fn fit(
        &self,
        source: &DMatrix<f64>,
        target: &DMatrix<f64>,
    ) -> Result<AlignmentTransform, LexAlignError> {
        check_rows(source, target)?;
        let n = source.nrows();
        let required = source.ncols().max(target.ncols()).max(2);
        if n < required {
            return Err(LexAlignError::UnderdeterminedFit {
                strategy: Strategy::Cca.to_string(),
                anchors: n,
                required,
            });
        }

        let (x_mean, x_scale) = column_moments(source);
        let (y_mean, y_scale) = column_moments(target);
        let xs = standardize_with(source, &x_mean, &x_scale);
        let ys = standardize_with(target, &y_mean, &y_scale);

        let denom = (n - 1) as f64;
        let cxx = xs.tr_mul(&xs) / denom;
        let cyy = ys.tr_mul(&ys) / denom;
        let cxy = xs.tr_mul(&ys) / denom;

        let wx = inverse_sqrt(cxx, self.regularization)?;
        let wy = inverse_sqrt(cyy, self.regularization)?;

        let whitened = &wx * cxy * &wy;
        let svd = whitened
            .try_svd(true, true, f64::EPSILON, 0)
            .ok_or_else(|| LexAlignError::FitFailed("SVD did not converge".to_string()))?;
        let u = svd
            .u
            .ok_or_else(|| LexAlignError::FitFailed("SVD produced no U".to_string()))?;
        let v_t = svd
            .v_t
            .ok_or_else(|| LexAlignError::FitFailed("SVD produced no V^T".to_string()))?;

        Ok(AlignmentTransform::Canonical(CcaProjection {
            x_mean,
            x_scale,
            y_mean,
            y_scale,
            x_weights: wx * u,
            y_weights: wy * v_t.transpose(),
            correlations: svd.singular_values,
        }))
    }
}

fn check_rows(source: &DMatrix<f64>, target: &DMatrix<f64>) -> Result<(), LexAlignError> {
    if source.nrows() != target.nrows() {
        return Err(LexAlignError::DimensionMismatch {
            expected: source.nrows(),
            found: target.nrows(),
        });
    }
    Ok(())
}

/// Per-column mean and sample standard deviation. A constant column gets
/// scale 1 so standardizing leaves it at zero.
fn column_moments(m: &DMatrix<f64>) -> (DVector<f64>, DVector<f64>) {
    let dof = m.nrows().saturating_sub(1).max(1) as f64;
    let mean = DVector::from_iterator(m.ncols(), m.column_iter().map(|c| c.mean()));
    let scale = DVector::from_iterator(
        m.ncols(),
        m.column_iter().zip(mean.iter()).map(|(c, &mu)| {
            let var = c.iter().map(|x| (x - mu).powi(2)).sum::<f64>() / dof;
            let sd = var.sqrt();
            if sd > f64::EPSILON {
                sd
            } else {
                1.0
            }
        }),
    );
    (mean, scale)
}

fn standardize_with(m: &DMatrix<f64>, mean: &DVector<f64>, scale: &DVector<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(m.nrows(), m.ncols(), |i, j| (m[(i, j)] - mean[j]) / scale[j])
}

/// `(C + ridge I)^{-1/2}` for a symmetric positive semi-definite `C`.
fn inverse_sqrt(cov: DMatrix<f64>, ridge: f64) -> Result<DMatrix<f64>, LexAlignError> {
    let d = cov.nrows();
    let eigen = SymmetricEigen::try_new(cov + DMatrix::identity(d, d) * ridge, f64::EPSILON, 0)
        .ok_or_else(|| LexAlignError::FitFailed("eigendecomposition did not converge".to_string()))?;
    let inv_sqrt = eigen
        .eigenvalues
        .map(|l| 1.0 / l.max(f64::EPSILON).sqrt());
    Ok(&eigen.eigenvectors * DMatrix::from_diagonal(&inv_sqrt) * eigen.eigenvectors.transpose())
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn random_matrix(rows: usize, cols: usize, seed: u64) -> DMatrix<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        DMatrix::from_fn(rows, cols, |_, _| rng.gen_range(-1.0..1.0))
    }

    fn rotation_3d(a: f64, b: f64) -> DMatrix<f64> {
        let rz = DMatrix::from_row_slice(
            3,
            3,
            &[a.cos(), -a.sin(), 0.0, a.sin(), a.cos(), 0.0, 0.0, 0.0, 1.0],
        );
        let rx = DMatrix::from_row_slice(
            3,
            3,
            &[1.0, 0.0, 0.0, 0.0, b.cos(), -b.sin(), 0.0, b.sin(), b.cos()],
        );
        rz * rx
    }

    fn linear(t: AlignmentTransform) -> DMatrix<f64> {
        match t {
            AlignmentTransform::Linear(m) => m,
            other => panic!("expected linear transform, got {:?}", other),
        }
    }

    #[test]
    fn procrustes_is_orthogonal() {
        let a = random_matrix(30, 5, 1);
        let b = random_matrix(30, 5, 2);
        let t = linear(Procrustes.fit(&a, &b).unwrap());
        let gram = t.transpose() * &t;
        assert!((gram - DMatrix::identity(5, 5)).norm() < 1e-9);
    }

    #[test]
    fn procrustes_recovers_rotation() {
        let a = random_matrix(40, 3, 3);
        let r = rotation_3d(0.7, -0.4);
        let b = &a * &r;
        let t = linear(Procrustes.fit(&a, &b).unwrap());
        assert!((t - r).norm() < 1e-9);
    }

    #[test]
    fn procrustes_underdetermined_still_fits() {
        let a = random_matrix(2, 4, 4);
        let b = random_matrix(2, 4, 5);
        let t = linear(Procrustes.fit(&a, &b).unwrap());
        assert_eq!(t.shape(), (4, 4));
    }

    #[test]
    fn procrustes_handles_different_dimensionality() {
        let a = random_matrix(20, 4, 6);
        let b = random_matrix(20, 3, 7);
        let t = linear(Procrustes.fit(&a, &b).unwrap());
        assert_eq!(t.shape(), (4, 3));
        // Semi-orthogonal: columns are orthonormal.
        assert!((t.transpose() * &t - DMatrix::identity(3, 3)).norm() < 1e-9);
    }

    #[test]
    fn least_squares_recovers_general_linear_map() {
        let a = random_matrix(25, 4, 8);
        let map = random_matrix(4, 4, 9) * 3.0;
        let b = &a * &map;
        let t = linear(LeastSquares.fit(&a, &b).unwrap());
        assert!((t - map).norm() < 1e-8);
    }

    #[test]
    fn least_squares_underdetermined_is_an_error() {
        let a = random_matrix(3, 5, 10);
        let b = random_matrix(3, 5, 11);
        let err = LeastSquares.fit(&a, &b).unwrap_err();
        assert!(matches!(
            err,
            LexAlignError::UnderdeterminedFit { anchors: 3, required: 5, .. }
        ));
    }

    #[test]
    fn cca_underdetermined_is_an_error() {
        let a = random_matrix(3, 5, 12);
        let b = random_matrix(3, 5, 13);
        let err = Cca::default().fit(&a, &b).unwrap_err();
        assert!(matches!(err, LexAlignError::UnderdeterminedFit { .. }));
    }

    #[test]
    fn cca_finds_perfect_correlation_under_linear_relation() {
        let a = random_matrix(60, 3, 14);
        let b = &a * rotation_3d(1.1, 0.3) * 2.0;
        let t = Cca::default().fit(&a, &b).unwrap();
        let projection = match &t {
            AlignmentTransform::Canonical(p) => p,
            other => panic!("expected canonical transform, got {:?}", other),
        };
        assert_eq!(projection.correlations.len(), 3);
        for c in projection.correlations.iter() {
            assert!((c - 1.0).abs() < 1e-4, "correlation {} not ~1", c);
        }

        // Projected anchors coincide in canonical space.
        let pa = t.apply(&a);
        let pb = t.project_target(&b);
        assert!((pa - pb.as_ref()).norm() < 1e-2);
    }

    #[test]
    fn mismatched_anchor_rows_rejected() {
        let a = random_matrix(10, 3, 15);
        let b = random_matrix(9, 3, 16);
        for strategy in [Strategy::Procrustes, Strategy::LeastSquares, Strategy::Cca] {
            let err = strategy.fitter(&FitOptions::default()).fit(&a, &b).unwrap_err();
            assert!(matches!(
                err,
                LexAlignError::DimensionMismatch { expected: 10, found: 9 }
            ));
        }
    }

    #[test]
    fn linear_target_projection_borrows() {
        let t = AlignmentTransform::Linear(DMatrix::identity(2, 2));
        let target = random_matrix(4, 2, 17);
        assert!(matches!(t.project_target(&target), Cow::Borrowed(_)));
        assert_eq!(t.output_dims(), 2);
    }

    #[test]
    fn strategy_names_round_trip() {
        for strategy in [Strategy::Procrustes, Strategy::LeastSquares, Strategy::Cca] {
            assert_eq!(strategy.as_str().parse::<Strategy>().unwrap(), strategy);
            assert_eq!(strategy.fitter(&FitOptions::default()).strategy(), strategy);
        }
        assert!("pca".parse::<Strategy>().is_err());
    }
}

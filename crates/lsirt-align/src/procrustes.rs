//! # Orthogonal Procrustes
//!
//! Finds the orthogonal matrix `Q` (rotation or reflection) and uniform
//! scale `b` that minimize `‖Yc − b·Xc·Q‖²`, where `Xc` and `Yc` are the
//! candidate and target configurations with their centroids removed.
//!
//! ## Construction
//!
//! With `Xcᵀ·Yc = U·Σ·Vᵀ`:
//!
//! ```text
//! Q = U·Vᵀ
//! b = trace(Σ) / ‖Xc‖²          (fit_scale = true)
//! b = 1                         (fit_scale = false)
//! aligned   = b·Xc·Q + centroid(Y)
//! disparity = ‖Yc − b·Xc·Q‖² / ‖Yc‖²
//! ```
//!
//! With scale fitting, the disparity equals the classical one obtained by
//! standardizing both configurations to unit Frobenius norm before
//! fitting. The aligned configuration, however, is returned in the
//! target's own frame (its centroid and spread), so an exactly rotated
//! copy of the target maps back onto the target itself.
//!
//! ## Degenerate Configurations
//!
//! The SVD construction is defined for any input. A configuration with
//! fewer than `D` independent directions leaves `Q` non-unique on the
//! missing directions; [`ProcrustesFit::rank`] reports this. A candidate
//! with zero spread collapses onto the target centroid (disparity 1). A
//! target with zero spread cannot be normalized, so the disparity is the
//! raw residual sum of squares.
//!
//! Non-finite entries have no meaningful fit and are rejected before the
//! decomposition runs.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Squared Frobenius norms at or below this are treated as zero spread.
const SPREAD_EPSILON: f64 = 1e-24;

/// Relative singular-value cutoff used for [`ProcrustesFit::rank`].
const RANK_TOLERANCE: f64 = 1e-10;

/// Tuning of the Procrustes fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcrustesOptions {
    /// Fit a uniform scale factor in addition to the orthogonal map.
    pub fit_scale: bool,
}

impl Default for ProcrustesOptions {
    fn default() -> Self {
        Self { fit_scale: true }
    }
}

/// Result of fitting one candidate configuration onto a target.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcrustesFit {
    /// The candidate mapped into the target's frame; same shape as both inputs.
    pub aligned: DMatrix<f64>,
    /// The `D × D` orthogonal matrix applied on the right.
    pub rotation: DMatrix<f64>,
    /// Uniform scale applied after rotation.
    pub scale: f64,
    /// Normalized residual sum of squares after the fit.
    pub disparity: f64,
    /// Number of singular values of `Xcᵀ·Yc` above tolerance.
    pub rank: usize,
}

/// Reasons a fit cannot be computed at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcrustesFailure {
    /// Target and candidate shapes differ.
    ShapeMismatch,
    /// The SVD did not converge or did not return both singular-vector factors.
    Decomposition,
    /// An input contains NaN or an infinite value.
    NonFinite,
}

/// Fit `candidate` onto `target`.
///
/// # Errors
///
/// [`ProcrustesFailure::ShapeMismatch`] when the inputs differ in shape;
/// [`ProcrustesFailure::NonFinite`] when either input holds NaN or an
/// infinity; [`ProcrustesFailure::Decomposition`] if the SVD fails.
pub fn procrustes(
    target: &DMatrix<f64>,
    candidate: &DMatrix<f64>,
    options: ProcrustesOptions,
) -> Result<ProcrustesFit, ProcrustesFailure> {
    if target.shape() != candidate.shape() {
        return Err(ProcrustesFailure::ShapeMismatch);
    }
    if !is_finite(target) || !is_finite(candidate) {
        return Err(ProcrustesFailure::NonFinite);
    }

    let (target_c, target_centroid) = center(target);
    let (candidate_c, _) = center(candidate);
    let target_ss = target_c.norm_squared();
    let candidate_ss = candidate_c.norm_squared();

    let cross = candidate_c.transpose() * &target_c;
    let svd = cross
        .try_svd(true, true, f64::EPSILON, 0)
        .ok_or(ProcrustesFailure::Decomposition)?;
    let trace: f64 = svd.singular_values.iter().sum();
    let largest = svd.singular_values.max();
    let rank = svd
        .singular_values
        .iter()
        .filter(|&&s| s > largest * RANK_TOLERANCE && s > 0.0)
        .count();
    let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
        return Err(ProcrustesFailure::Decomposition);
    };
    let rotation = u * v_t;

    let scale = match (options.fit_scale, candidate_ss > SPREAD_EPSILON) {
        (false, _) => 1.0,
        (true, true) => trace / candidate_ss,
        (true, false) => 0.0,
    };

    let fitted_c = (&candidate_c * &rotation) * scale;
    let residual = (&target_c - &fitted_c).norm_squared();
    let disparity = if target_ss > SPREAD_EPSILON {
        residual / target_ss
    } else {
        residual
    };

    let aligned = DMatrix::from_fn(fitted_c.nrows(), fitted_c.ncols(), |i, j| {
        fitted_c[(i, j)] + target_centroid[j]
    });

    Ok(ProcrustesFit {
        aligned,
        rotation,
        scale,
        disparity,
        rank,
    })
}

/// True when every entry is a finite number.
pub(crate) fn is_finite(m: &DMatrix<f64>) -> bool {
    m.iter().all(|v| v.is_finite())
}

/// Subtract the column means; returns the centered matrix and the means.
fn center(m: &DMatrix<f64>) -> (DMatrix<f64>, Vec<f64>) {
    let centroid: Vec<f64> = if m.nrows() == 0 {
        vec![0.0; m.ncols()]
    } else {
        m.column_iter().map(|column| column.mean()).collect()
    };
    let centered = DMatrix::from_fn(m.nrows(), m.ncols(), |i, j| m[(i, j)] - centroid[j]);
    (centered, centroid)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    fn square() -> DMatrix<f64> {
        DMatrix::from_row_slice(4, 2, &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0])
    }

    fn rotation_2d(theta: f64) -> DMatrix<f64> {
        let (s, c) = theta.sin_cos();
        DMatrix::from_row_slice(2, 2, &[c, s, -s, c])
    }

    fn assert_close(a: &DMatrix<f64>, b: &DMatrix<f64>, tol: f64) {
        assert_eq!(a.shape(), b.shape());
        let diff = (a - b).abs().max();
        assert!(diff < tol, "max deviation {diff}\n{a}\n{b}");
    }

    #[test]
    fn identical_configurations_are_a_fixed_point() {
        let fit = procrustes(&square(), &square(), ProcrustesOptions::default()).unwrap();
        assert_close(&fit.aligned, &square(), TOL);
        assert_close(&fit.rotation, &DMatrix::identity(2, 2), TOL);
        assert!((fit.scale - 1.0).abs() < TOL);
        assert!(fit.disparity.abs() < TOL);
        assert_eq!(fit.rank, 2);
    }

    #[test]
    fn recovers_rotation_scale_and_translation() {
        let target = DMatrix::from_row_slice(
            5,
            2,
            &[0.3, -1.2, 2.0, 0.5, -0.7, 0.9, 1.1, 1.8, -1.5, -0.4],
        );
        let moved = (&target * rotation_2d(1.1)) * 2.5;
        let candidate = DMatrix::from_fn(5, 2, |i, j| moved[(i, j)] + [4.0, -3.0][j]);

        let fit = procrustes(&target, &candidate, ProcrustesOptions::default()).unwrap();
        assert_close(&fit.aligned, &target, 1e-9);
        assert!((fit.scale - 0.4).abs() < 1e-9);
        assert!(fit.disparity < 1e-12);
    }

    #[test]
    fn recovers_reflection() {
        let target = DMatrix::from_row_slice(4, 2, &[0.0, 0.0, 2.0, 0.0, 0.0, 1.0, 3.0, 2.0]);
        let mirror = DMatrix::from_row_slice(2, 2, &[-1.0, 0.0, 0.0, 1.0]);
        let candidate = &target * mirror;

        let fit = procrustes(&target, &candidate, ProcrustesOptions::default()).unwrap();
        assert_close(&fit.aligned, &target, 1e-9);
        assert!(fit.rotation.determinant() < 0.0);
    }

    #[test]
    fn disparity_matches_standardized_definition() {
        let target = square();
        let candidate =
            DMatrix::from_row_slice(4, 2, &[0.1, 0.0, 1.0, 0.2, -0.1, 1.1, 0.9, 0.8]);
        let fit = procrustes(&target, &candidate, ProcrustesOptions::default()).unwrap();

        // Standardize both to unit norm, fit, and compare residuals.
        let (t, _) = center(&target);
        let (c, _) = center(&candidate);
        let t = &t / t.norm();
        let c = &c / c.norm();
        let svd = (c.transpose() * &t).svd(true, true);
        let q = svd.u.unwrap() * svd.v_t.unwrap();
        let s: f64 = svd.singular_values.iter().sum();
        let expected = (&t - (&c * q) * s).norm_squared();

        assert!((fit.disparity - expected).abs() < 1e-12);
        assert!(fit.disparity > 0.0 && fit.disparity < 1.0);
    }

    #[test]
    fn rigid_mode_keeps_candidate_spread() {
        let target = square();
        let candidate = (&target * rotation_2d(0.4)) * 3.0;
        let options = ProcrustesOptions { fit_scale: false };
        let fit = procrustes(&target, &candidate, options).unwrap();

        assert_eq!(fit.scale, 1.0);
        let (aligned_c, _) = center(&fit.aligned);
        let (candidate_c, _) = center(&candidate);
        assert!((aligned_c.norm() - candidate_c.norm()).abs() < 1e-9);
        assert!(fit.disparity > 1.0);
    }

    #[test]
    fn collapsed_candidate_lands_on_target_centroid() {
        let target = square();
        let candidate = DMatrix::from_element(4, 2, 7.0);
        let fit = procrustes(&target, &candidate, ProcrustesOptions::default()).unwrap();

        assert_eq!(fit.scale, 0.0);
        assert_close(&fit.aligned, &DMatrix::from_element(4, 2, 0.5), TOL);
        assert!((fit.disparity - 1.0).abs() < TOL);
        assert_eq!(fit.rank, 0);
    }

    #[test]
    fn collinear_configuration_is_rank_deficient_but_fits() {
        let target = DMatrix::from_row_slice(3, 2, &[0.0, 0.0, 1.0, 1.0, 2.0, 2.0]);
        let candidate = &target * rotation_2d(0.7);
        let fit = procrustes(&target, &candidate, ProcrustesOptions::default()).unwrap();

        assert_eq!(fit.rank, 1);
        assert_close(&fit.aligned, &target, 1e-9);
        assert!(fit.disparity < 1e-12);
    }

    #[test]
    fn shape_mismatch_is_reported() {
        let other = DMatrix::zeros(3, 2);
        assert_eq!(
            procrustes(&square(), &other, ProcrustesOptions::default()),
            Err(ProcrustesFailure::ShapeMismatch)
        );
    }

    #[test]
    fn non_finite_inputs_are_rejected_before_decomposition() {
        let mut candidate = square();
        candidate[(0, 0)] = f64::NAN;
        assert_eq!(
            procrustes(&square(), &candidate, ProcrustesOptions::default()),
            Err(ProcrustesFailure::NonFinite)
        );

        let mut target = square();
        target[(3, 1)] = f64::INFINITY;
        assert_eq!(
            procrustes(&target, &square(), ProcrustesOptions { fit_scale: false }),
            Err(ProcrustesFailure::NonFinite)
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// A random orthogonal matrix from the QR factor of a random square matrix.
    fn orthogonal(d: usize, seed: &[f64]) -> DMatrix<f64> {
        let m = DMatrix::from_fn(d, d, |i, j| seed[i * d + j] + if i == j { 3.0 } else { 0.0 });
        m.qr().q()
    }

    proptest! {
        /// Any similarity transform of a well-spread configuration is undone.
        #[test]
        fn similarity_transforms_are_recovered(
            d in 2usize..=3,
            n in 5usize..12,
            points in prop::collection::vec(-5.0f64..5.0, 36),
            seed in prop::collection::vec(-1.0f64..1.0, 9),
            scale in 0.25f64..4.0,
            shift in prop::collection::vec(-10.0f64..10.0, 3),
            reflect in any::<bool>(),
        ) {
            let target = DMatrix::from_fn(n, d, |i, j| points[i * 3 + j]);
            let (centered, _) = center(&target);
            let spread = centered.clone().svd(false, false).singular_values.min();
            prop_assume!(spread > 0.5);

            let mut q = orthogonal(d, &seed);
            if reflect {
                q.column_mut(0).neg_mut();
            }
            let moved = (&target * q) * scale;
            let candidate = DMatrix::from_fn(n, d, |i, j| moved[(i, j)] + shift[j]);

            let fit = procrustes(&target, &candidate, ProcrustesOptions::default()).unwrap();
            let deviation = (&fit.aligned - &target).abs().max();
            prop_assert!(deviation < 1e-8, "deviation {}", deviation);
            prop_assert!(fit.disparity < 1e-12);
            prop_assert!((fit.scale * scale - 1.0).abs() < 1e-9);
        }

        /// Output shape always equals input shape.
        #[test]
        fn shape_is_preserved(
            n in 1usize..8,
            d in 1usize..4,
            values in prop::collection::vec(-3.0f64..3.0, 64),
        ) {
            let target = DMatrix::from_fn(n, d, |i, j| values[i * 4 + j]);
            let candidate = DMatrix::from_fn(n, d, |i, j| values[32 + i * 4 + j]);
            let fit = procrustes(&target, &candidate, ProcrustesOptions::default()).unwrap();
            prop_assert_eq!(fit.aligned.shape(), (n, d));
            prop_assert_eq!(fit.rotation.shape(), (d, d));
            prop_assert!(fit.disparity >= 0.0);
        }
    }
}

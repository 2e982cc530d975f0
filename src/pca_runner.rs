// pca_runner.rs

use crate::error::{PcaToolError, Result};
use crate::matrix::LabeledMatrix;
use log::{debug, info, warn};
use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2, ArrayView2, Axis};

pub const N_COMPONENTS: usize = 2;

const EIGEN_EPSILON: f64 = 1e-14;
const EIGEN_MAX_ITERATIONS: usize = 10_000;
/// A component whose eigenvalue is at most this fraction of the leading one carries no variance.
const RELATIVE_EIGENVALUE_FLOOR: f64 = 1e-12;

/// Result of a two-component fit on sample-major data.
#[derive(Debug, Clone)]
pub struct PcaResult {
    /// Shape (n_samples, 2): one row per sample, one column per component.
    pub scores: Array2<f64>,
    /// Shape (2, n_features): unit principal axes in feature space.
    pub(crate) components: Array2<f64>,
    /// Eigenvalues of the two retained components, i.e. variance along each axis.
    pub explained_variance: [f64; N_COMPONENTS],
    /// Each retained eigenvalue divided by the sum of all eigenvalues.
    pub explained_variance_ratio: [f64; N_COMPONENTS],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecompositionPath {
    /// Eigen-decompose the (features x features) covariance.
    Covariance,
    /// Eigen-decompose the (samples x samples) Gram matrix; used when features outnumber samples.
    Gram,
}

impl DecompositionPath {
    fn for_shape(n_samples: usize, n_features: usize) -> Self {
        if n_features <= n_samples {
            DecompositionPath::Covariance
        } else {
            DecompositionPath::Gram
        }
    }
}

fn reduction_failed(cause: impl Into<String>) -> PcaToolError {
    let cause = cause.into();
    debug!("PCA failure detail: {}", cause);
    PcaToolError::ReductionFailed(cause)
}

/// Fills missing cells with zero, flips the matrix to sample-major orientation and fits
/// a two-component PCA over the samples.
pub fn run_two_component_pca(matrix: &LabeledMatrix) -> Result<PcaResult> {
    let mut sample_major = matrix.values().t().to_owned();

    let n_missing = matrix.missing_count();
    if n_missing > 0 {
        warn!("Filling {} missing cell(s) with 0.0 before PCA.", n_missing);
        sample_major.mapv_inplace(|v| if v.is_nan() { 0.0 } else { v });
    }

    let (n_samples, n_features) = sample_major.dim();
    let path = DecompositionPath::for_shape(n_samples, n_features);
    info!(
        "Running PCA: {} samples x {} features, k={}, path={:?}",
        n_samples, n_features, N_COMPONENTS, path
    );
    let result = fit_top_components(sample_major, path)?;
    info!(
        "PCA computation complete. Explained variance ratio: pc1={:.6}, pc2={:.6}",
        result.explained_variance_ratio[0], result.explained_variance_ratio[1]
    );
    Ok(result)
}

/// Returns (eigenvalues, eigenvectors as columns), sorted by descending eigenvalue.
fn sorted_symmetric_eigen(symmetric: ArrayView2<f64>) -> Result<(Vec<f64>, Vec<Array1<f64>>)> {
    let n = symmetric.nrows();
    let dense = DMatrix::from_fn(n, n, |i, j| symmetric[[i, j]]);
    let eigen = SymmetricEigen::try_new(dense, EIGEN_EPSILON, EIGEN_MAX_ITERATIONS)
        .ok_or_else(|| reduction_failed("symmetric eigen-decomposition did not converge"))?;

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        eigen.eigenvalues[b]
            .partial_cmp(&eigen.eigenvalues[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let values = order.iter().map(|&i| eigen.eigenvalues[i]).collect();
    let vectors = order
        .iter()
        .map(|&i| eigen.eigenvectors.column(i).iter().copied().collect::<Array1<f64>>())
        .collect();
    Ok((values, vectors))
}

fn fit_top_components(mut data: Array2<f64>, path: DecompositionPath) -> Result<PcaResult> {
    let (n_samples, n_features) = data.dim();
    if n_samples < 2 || n_features < N_COMPONENTS {
        return Err(reduction_failed(format!(
            "matrix of {} samples x {} features is too small for {} components",
            n_samples, n_features, N_COMPONENTS
        )));
    }
    if data.iter().any(|v| !v.is_finite()) {
        return Err(reduction_failed("input contains non-finite values"));
    }

    let mean = data
        .mean_axis(Axis(0))
        .ok_or_else(|| reduction_failed("failed to compute feature means"))?;
    data -= &mean;
    let denom = (n_samples - 1) as f64;

    let (eigenvalues, eigenvectors) = match path {
        DecompositionPath::Covariance => {
            let cov = data.t().dot(&data) / denom;
            sorted_symmetric_eigen(cov.view())?
        }
        DecompositionPath::Gram => {
            let gram = data.dot(&data.t()) / denom;
            sorted_symmetric_eigen(gram.view())?
        }
    };
    debug!(
        "Leading eigenvalues: {:?}",
        eigenvalues.iter().take(N_COMPONENTS + 1).collect::<Vec<_>>()
    );

    let eigenvalues: Vec<f64> = eigenvalues.into_iter().map(|v| v.max(0.0)).collect();
    let total_variance: f64 = eigenvalues.iter().sum();
    if !(total_variance.is_finite() && total_variance > 0.0) {
        return Err(reduction_failed(format!(
            "total variance is {}; all samples are identical after filling",
            total_variance
        )));
    }

    let mut scores = Array2::<f64>::zeros((n_samples, N_COMPONENTS));
    let mut components = Array2::<f64>::zeros((N_COMPONENTS, n_features));
    let mut explained_variance = [0.0; N_COMPONENTS];

    let leading_eigenvalue = eigenvalues.first().copied().unwrap_or(0.0);
    for k in 0..N_COMPONENTS {
        let eigenvalue = eigenvalues.get(k).copied().unwrap_or(0.0);
        if !(eigenvalue > RELATIVE_EIGENVALUE_FLOOR * leading_eigenvalue) {
            warn!("Component {} has no variance; its coordinates are all zero.", k + 1);
            continue;
        }
        explained_variance[k] = eigenvalue;

        let (mut axis, mut component_scores) = match path {
            DecompositionPath::Covariance => {
                let axis = eigenvectors[k].clone();
                let component_scores = data.dot(&axis);
                (axis, component_scores)
            }
            DecompositionPath::Gram => {
                // X = U S V^T, so the scores are u_k * s_k with s_k = sqrt((n-1) * lambda_k).
                let singular_value = (denom * eigenvalue).sqrt();
                let component_scores = &eigenvectors[k] * singular_value;
                let axis = data.t().dot(&eigenvectors[k]) / singular_value;
                (axis, component_scores)
            }
        };

        // Deterministic sign: the largest-magnitude loading is positive.
        let pivot = axis
            .iter()
            .copied()
            .fold(0.0_f64, |best, v| if v.abs() > best.abs() { v } else { best });
        if pivot < 0.0 {
            axis.mapv_inplace(|v| -v);
            component_scores.mapv_inplace(|v| -v);
        }

        scores.column_mut(k).assign(&component_scores);
        components.row_mut(k).assign(&axis);
    }

    let mut explained_variance_ratio = explained_variance.map(|v| (v / total_variance).clamp(0.0, 1.0));
    if explained_variance_ratio[0] + explained_variance_ratio[1] > 1.0 {
        explained_variance_ratio[1] = (1.0 - explained_variance_ratio[0]).max(0.0);
    }

    Ok(PcaResult {
        scores,
        components,
        explained_variance,
        explained_variance_ratio,
    })
}

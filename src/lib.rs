//! Two-component PCA over the samples of a tab-delimited features x samples matrix.
//!
//! The pipeline is strictly linear: load, optionally select samples, validate the shape,
//! reduce, write. The first failure stops the run.

pub mod error;
pub mod matrix;
pub mod output_writer;
pub mod pca_runner;
pub mod sample_selection;
pub mod validation;

pub use error::{PcaToolError, Result};
pub use matrix::{load_matrix, LabeledMatrix};
pub use output_writer::{write_outputs, Projection, RunOutputs};
pub use pca_runner::{run_two_component_pca, PcaResult};
pub use sample_selection::select_samples;
pub use validation::validate_shape;

use log::info;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    /// Comma-delimited sample names, as given on the command line.
    pub samples: Option<String>,
}

pub fn run(config: &RunConfig) -> Result<RunOutputs> {
    let matrix = load_matrix(&config.input)?;
    let matrix = select_samples(matrix, config.samples.as_deref())?;
    validate_shape(matrix.shape())?;

    let result = run_two_component_pca(&matrix)?;
    let projection = Projection::from_result(matrix.sample_ids(), &result);
    let outputs = write_outputs(&config.input, &projection, result.explained_variance_ratio)?;
    info!(
        "Wrote {} ({} samples), pc1_explained_variance={:.6}, pc2_explained_variance={:.6}",
        outputs.pca_coordinates,
        projection.sample_ids.len(),
        outputs.pc1_explained_variance,
        outputs.pc2_explained_variance
    );
    Ok(outputs)
}

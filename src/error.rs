// error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Every way a run can stop. All variants are terminal.
#[derive(Error, Debug)]
pub enum PcaToolError {
    #[error("Could not find file: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Malformed input matrix {}: {details}", .path.display())]
    MalformedInput { path: PathBuf, details: String },

    #[error("Requested samples differed from those in matrix: {0}")]
    UnknownSamples(String),

    #[error(
        "The number of clustering features is {0}, which is less than 2, and a 2-D PCA would not make sense here. \
         Typically, PCA is used to visualize high-dimensional data with many more clustering features than 2."
    )]
    InsufficientFeatures(usize),

    #[error(
        "The number of samples is {0}, which is less than 2, and a 2-D PCA would not make sense here. \
         Typically, PCA is used to visualize high-dimensional data such that relationships between samples can be explored."
    )]
    InsufficientSamples(usize),

    /// The cause is kept for debug logging only; the message stays generic.
    #[error("Encountered an exception while calculating the principal components. Exiting.")]
    ReductionFailed(String),

    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PcaToolError>;

// validation.rs

use crate::error::{PcaToolError, Result};

pub const MIN_FEATURES: usize = 2;
pub const MIN_SAMPLES: usize = 2;

/// Checks a (features, samples) shape before any reduction is attempted.
pub fn validate_shape((n_features, n_samples): (usize, usize)) -> Result<()> {
    if n_features < MIN_FEATURES {
        return Err(PcaToolError::InsufficientFeatures(n_features));
    }
    if n_samples < MIN_SAMPLES {
        return Err(PcaToolError::InsufficientSamples(n_samples));
    }
    Ok(())
}

// sample_selection.rs

use crate::error::{PcaToolError, Result};
use crate::matrix::LabeledMatrix;
use log::info;
use std::collections::{HashMap, HashSet};

/// Splits a comma-delimited sample list and trims each name.
pub fn parse_sample_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|name| name.trim().to_string()).collect()
}

/// Restricts `matrix` to the requested samples, in request order.
///
/// `None` or an empty string passes the matrix through unchanged. Any requested name
/// missing from the matrix fails the whole selection.
pub fn select_samples(matrix: LabeledMatrix, requested: Option<&str>) -> Result<LabeledMatrix> {
    let Some(raw) = requested.filter(|r| !r.is_empty()) else {
        return Ok(matrix);
    };
    let requested_list = parse_sample_list(raw);

    let column_index: HashMap<&str, usize> = matrix
        .sample_ids()
        .iter()
        .enumerate()
        .map(|(idx, id)| (id.as_str(), idx))
        .collect();

    let unknown: HashSet<&str> = requested_list
        .iter()
        .map(String::as_str)
        .filter(|name| !column_index.contains_key(name))
        .collect();
    if !unknown.is_empty() {
        let csv = unknown.into_iter().collect::<Vec<_>>().join(",");
        return Err(PcaToolError::UnknownSamples(csv));
    }

    let indices: Vec<usize> = requested_list
        .iter()
        .map(|name| column_index[name.as_str()])
        .collect();
    let narrowed = matrix.take_samples(&indices);
    info!(
        "Restricted analysis to {} of {} samples.",
        narrowed.n_samples(),
        matrix.n_samples()
    );
    Ok(narrowed)
}

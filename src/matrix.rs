// matrix.rs

use crate::error::{PcaToolError, Result};
use csv::{ReaderBuilder, StringRecord};
use log::{debug, info};
use ndarray::{Array2, ArrayView2, Axis};
use std::collections::HashSet;
use std::path::Path;

/// Cell tokens read as a missing value.
const MISSING_VALUE_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "#N/A", "NULL", "null", "None", "<NA>",
];

/// A features x samples table of floats. Missing cells are stored as NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledMatrix {
    feature_ids: Vec<String>,
    sample_ids: Vec<String>,
    values: Array2<f64>,
}

impl LabeledMatrix {
    /// `values` must be shaped (features, samples) and sample labels must be unique.
    pub fn new(feature_ids: Vec<String>, sample_ids: Vec<String>, values: Array2<f64>) -> Result<Self> {
        if values.nrows() != feature_ids.len() || values.ncols() != sample_ids.len() {
            return Err(PcaToolError::MalformedInput {
                path: Default::default(),
                details: format!(
                    "value grid is {}x{} but {} feature labels and {} sample labels were given",
                    values.nrows(),
                    values.ncols(),
                    feature_ids.len(),
                    sample_ids.len()
                ),
            });
        }
        if let Some(dup) = first_duplicate(&sample_ids) {
            return Err(PcaToolError::MalformedInput {
                path: Default::default(),
                details: format!("duplicate sample label '{}'", dup),
            });
        }
        Ok(Self { feature_ids, sample_ids, values })
    }

    pub fn feature_ids(&self) -> &[String] {
        &self.feature_ids
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn n_features(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_samples(&self) -> usize {
        self.values.ncols()
    }

    /// (rows, columns), i.e. (features, samples).
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }

    /// Builds a new matrix from the given sample columns, in the given order.
    /// Indices may repeat.
    pub(crate) fn take_samples(&self, sample_indices: &[usize]) -> Self {
        Self {
            feature_ids: self.feature_ids.clone(),
            sample_ids: sample_indices.iter().map(|&i| self.sample_ids[i].clone()).collect(),
            values: self.values.select(Axis(1), sample_indices),
        }
    }
}

fn first_duplicate(labels: &[String]) -> Option<&str> {
    let mut seen = HashSet::with_capacity(labels.len());
    labels.iter().find(|l| !seen.insert(l.as_str())).map(String::as_str)
}

fn parse_cell(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if MISSING_VALUE_TOKENS.contains(&trimmed) {
        return Some(f64::NAN);
    }
    trimmed.parse::<f64>().ok()
}

/// Reads a tab-delimited matrix: header row of sample names, first column of feature names.
///
/// The header may either carry a leading index-name cell or omit it.
pub fn load_matrix(path: &Path) -> Result<LabeledMatrix> {
    if !path.exists() {
        return Err(PcaToolError::FileNotFound(path.to_path_buf()));
    }
    info!("Reading input matrix from {}", path.display());

    let malformed = |details: String| PcaToolError::MalformedInput {
        path: path.to_path_buf(),
        details,
    };

    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut records = reader.records();
    let header: StringRecord = match records.next() {
        Some(record) => record?,
        None => return Err(malformed("file is empty".to_string())),
    };

    let mut feature_ids = Vec::new();
    let mut cells: Vec<f64> = Vec::new();
    let mut row_width: Option<usize> = None;

    for record in records {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let width = *row_width.get_or_insert(record.len());
        if record.len() != width {
            return Err(malformed(format!(
                "line {} has {} fields, expected {}",
                line,
                record.len(),
                width
            )));
        }
        feature_ids.push(record[0].to_string());
        for (col_idx, raw) in record.iter().enumerate().skip(1) {
            let value = parse_cell(raw).ok_or_else(|| {
                malformed(format!(
                    "line {}, column {}: '{}' is not a number",
                    line,
                    col_idx + 1,
                    raw
                ))
            })?;
            cells.push(value);
        }
    }

    let sample_ids: Vec<String> = match row_width {
        None => header.iter().skip(1).map(str::to_string).collect(),
        Some(w) if header.len() == w => header.iter().skip(1).map(str::to_string).collect(),
        Some(w) if header.len() + 1 == w => header.iter().map(str::to_string).collect(),
        Some(w) => {
            return Err(malformed(format!(
                "header has {} fields but data rows have {}",
                header.len(),
                w
            )))
        }
    };

    let n_features = feature_ids.len();
    let n_samples = sample_ids.len();
    let values = Array2::from_shape_vec((n_features, n_samples), cells)
        .map_err(|e| malformed(format!("could not shape values into {}x{}: {}", n_features, n_samples, e)))?;

    let matrix = LabeledMatrix::new(feature_ids, sample_ids, values).map_err(|e| match e {
        PcaToolError::MalformedInput { details, .. } => malformed(details),
        other => other,
    })?;

    info!(
        "Loaded matrix with {} features x {} samples ({} missing cells).",
        matrix.n_features(),
        matrix.n_samples(),
        matrix.missing_count()
    );
    debug!(
        "Sample labels (first 5): {:?}",
        matrix.sample_ids().iter().take(5).collect::<Vec<_>>()
    );
    Ok(matrix)
}

// output_writer.rs

use crate::error::Result;
use crate::pca_runner::{PcaResult, N_COMPONENTS};
use log::info;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const PCA_OUTPUT_FILENAME: &str = "pca_output.tsv";
pub const OUTPUTS_JSON_FILENAME: &str = "outputs.json";
pub const COMPONENT_LABELS: [&str; N_COMPONENTS] = ["pc1", "pc2"];

/// Coordinates re-oriented to the features-as-rows convention: one row per component,
/// one column per sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub sample_ids: Vec<String>,
    /// Shape (2, n_samples).
    pub coordinates: Array2<f64>,
}

impl Projection {
    pub fn from_result(sample_ids: &[String], result: &PcaResult) -> Self {
        Self {
            sample_ids: sample_ids.to_vec(),
            coordinates: result.scores.t().to_owned(),
        }
    }
}

/// Contents of `outputs.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutputs {
    pub pca_coordinates: String,
    pub pc1_explained_variance: f64,
    pub pc2_explained_variance: f64,
}

/// Directory that receives both output files: the input file's parent.
pub fn working_dir(input: &Path) -> &Path {
    input.parent().unwrap_or_else(|| Path::new(""))
}

fn create_output_file(path: &Path) -> Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}

pub fn write_projection_tsv(path: &Path, projection: &Projection) -> Result<()> {
    let mut writer = create_output_file(path)?;
    for sample in &projection.sample_ids {
        write!(writer, "\t{}", sample)?;
    }
    writeln!(writer)?;
    for (label, row) in COMPONENT_LABELS.iter().zip(projection.coordinates.rows()) {
        write!(writer, "{}", label)?;
        for value in row.iter() {
            write!(writer, "\t{:?}", value)?;
        }
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_outputs_json(path: &Path, outputs: &RunOutputs) -> Result<()> {
    let mut writer = create_output_file(path)?;
    serde_json::to_writer(&mut writer, outputs)?;
    writer.flush()?;
    Ok(())
}

/// Writes `pca_output.tsv` and then `outputs.json` next to `input`.
pub fn write_outputs(input: &Path, projection: &Projection, explained_variance_ratio: [f64; N_COMPONENTS]) -> Result<RunOutputs> {
    let dir = working_dir(input);
    let tsv_path: PathBuf = dir.join(PCA_OUTPUT_FILENAME);
    info!("Writing PCA coordinates to {}", tsv_path.display());
    write_projection_tsv(&tsv_path, projection)?;

    let outputs = RunOutputs {
        pca_coordinates: tsv_path.to_string_lossy().into_owned(),
        pc1_explained_variance: explained_variance_ratio[0],
        pc2_explained_variance: explained_variance_ratio[1],
    };
    let json_path = dir.join(OUTPUTS_JSON_FILENAME);
    info!("Writing run outputs to {}", json_path.display());
    write_outputs_json(&json_path, &outputs)?;
    Ok(outputs)
}

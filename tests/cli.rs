use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;
use tsv_pca::RunOutputs;

const BIN: &str = env!("CARGO_BIN_EXE_tsv_pca");

/// Samples A..D with 10 features and no two samples alike.
fn write_abcd_matrix(dir: &Path) -> PathBuf {
    let mut text = String::from("gene\tA\tB\tC\tD\n");
    for f in 0..10 {
        let row: Vec<String> = (0..4)
            .map(|s| format!("{:.3}", ((f * 5 + s * 3) % 7) as f64 * 1.25 + (f as f64) * 0.1 * s as f64))
            .collect();
        text.push_str(&format!("gene{}\t{}\n", f, row.join("\t")));
    }
    let path = dir.join("matrix.tsv");
    fs::write(&path, text).unwrap();
    path
}

fn run_tool(args: &[&str]) -> Output {
    Command::new(BIN)
        .args(args)
        .args(["--log-level", "Off"])
        .output()
        .expect("failed to launch tsv_pca")
}

fn header_columns(tsv: &str) -> Vec<String> {
    tsv.lines()
        .next()
        .unwrap()
        .split('\t')
        .skip(1)
        .map(str::to_string)
        .collect()
}

fn read_outputs(dir: &Path) -> RunOutputs {
    serde_json::from_str(&fs::read_to_string(dir.join("outputs.json")).unwrap()).unwrap()
}

fn assert_no_outputs(dir: &Path) {
    assert!(!dir.join("pca_output.tsv").exists());
    assert!(!dir.join("outputs.json").exists());
}

#[test]
fn all_samples_in_original_order() {
    let dir = TempDir::new().unwrap();
    let input = write_abcd_matrix(dir.path());

    let out = run_tool(&["-i", input.to_str().unwrap()]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let tsv = fs::read_to_string(dir.path().join("pca_output.tsv")).unwrap();
    assert_eq!(header_columns(&tsv), vec!["A", "B", "C", "D"]);
    let labels: Vec<&str> = tsv.lines().skip(1).map(|l| l.split('\t').next().unwrap()).collect();
    assert_eq!(labels, vec!["pc1", "pc2"]);
    for line in tsv.lines().skip(1) {
        assert_eq!(line.split('\t').count(), 5);
    }

    let outputs = read_outputs(dir.path());
    assert_eq!(
        outputs.pca_coordinates,
        dir.path().join("pca_output.tsv").to_string_lossy()
    );
    assert!(outputs.pc1_explained_variance >= outputs.pc2_explained_variance);
    assert!(outputs.pc2_explained_variance >= 0.0);
}

#[test]
fn selected_samples_in_requested_order() {
    let dir = TempDir::new().unwrap();
    let input = write_abcd_matrix(dir.path());

    let out = run_tool(&["--input", input.to_str().unwrap(), "--samples", "C,A"]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let tsv = fs::read_to_string(dir.path().join("pca_output.tsv")).unwrap();
    assert_eq!(header_columns(&tsv), vec!["C", "A"]);

    let outputs = read_outputs(dir.path());
    assert!(outputs.pc1_explained_variance + outputs.pc2_explained_variance <= 1.0);
}

#[test]
fn reruns_are_byte_identical() {
    let dir = TempDir::new().unwrap();
    let input = write_abcd_matrix(dir.path());

    assert!(run_tool(&["-i", input.to_str().unwrap()]).status.success());
    let first_tsv = fs::read(dir.path().join("pca_output.tsv")).unwrap();
    let first_json = fs::read(dir.path().join("outputs.json")).unwrap();

    assert!(run_tool(&["-i", input.to_str().unwrap()]).status.success());
    assert_eq!(fs::read(dir.path().join("pca_output.tsv")).unwrap(), first_tsv);
    assert_eq!(fs::read(dir.path().join("outputs.json")).unwrap(), first_json);
}

#[test]
fn missing_input_exits_one() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("absent.tsv");

    let out = run_tool(&["-i", input.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Could not find file"));
    assert_no_outputs(dir.path());
}

#[test]
fn unknown_sample_exits_one() {
    let dir = TempDir::new().unwrap();
    let input = write_abcd_matrix(dir.path());

    let out = run_tool(&["-i", input.to_str().unwrap(), "-s", "A,Q"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Requested samples differed from those in matrix: Q"));
    assert_no_outputs(dir.path());
}

#[test]
fn single_sample_exits_one() {
    let dir = TempDir::new().unwrap();
    let input = write_abcd_matrix(dir.path());

    let out = run_tool(&["-i", input.to_str().unwrap(), "-s", "B"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("number of samples"));
    assert_no_outputs(dir.path());
}

#[test]
fn single_feature_exits_one() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("matrix.tsv");
    fs::write(&input, "gene\tA\tB\tC\ng1\t1\t2\t3\n").unwrap();

    let out = run_tool(&["-i", input.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("clustering features"));
    assert_no_outputs(dir.path());
}

#[test]
fn constant_matrix_reports_generic_reduction_failure() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("matrix.tsv");
    fs::write(&input, "gene\tA\tB\tC\ng1\t1\t1\t1\ng2\t2\t2\t2\n").unwrap();

    let out = run_tool(&["-i", input.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Encountered an exception while calculating the principal components"));
    assert!(!stderr.contains("total variance"));
    assert_no_outputs(dir.path());
}

#[test]
fn missing_cell_matches_zero_cell() {
    let zero_dir = TempDir::new().unwrap();
    let nan_dir = TempDir::new().unwrap();
    let base = "gene\tA\tB\tC\ng1\t1\t5\t2\ng2\t3\t{}\t7\ng3\t4\t4\t9\n";

    let zero_input = zero_dir.path().join("matrix.tsv");
    fs::write(&zero_input, base.replace("{}", "0")).unwrap();
    let nan_input = nan_dir.path().join("matrix.tsv");
    fs::write(&nan_input, base.replace("{}", "NA")).unwrap();

    assert!(run_tool(&["-i", zero_input.to_str().unwrap()]).status.success());
    assert!(run_tool(&["-i", nan_input.to_str().unwrap()]).status.success());

    assert_eq!(
        fs::read(zero_dir.path().join("pca_output.tsv")).unwrap(),
        fs::read(nan_dir.path().join("pca_output.tsv")).unwrap()
    );
    let zero_outputs = read_outputs(zero_dir.path());
    let nan_outputs = read_outputs(nan_dir.path());
    assert_eq!(zero_outputs.pc1_explained_variance, nan_outputs.pc1_explained_variance);
    assert_eq!(zero_outputs.pc2_explained_variance, nan_outputs.pc2_explained_variance);
}

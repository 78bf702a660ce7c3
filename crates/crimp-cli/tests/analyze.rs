use assert_cmd::cargo::cargo_bin_cmd;
use crimp_lib::detectors::force::RfdAnalysis;
use crimp_lib::signal::Peaks;
use std::{error::Error, io::Write, path::PathBuf};

const GRAVITY: f64 = 9.81;

#[test]
fn analyze_summarizes_the_session_fixture() -> Result<(), Box<dyn Error>> {
    let session = sample_path("test_data/hangboard_session.csv");

    let mut cmd = cargo_bin_cmd!("crimp");
    cmd.args(["analyze", "--input", &session]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let analysis: RfdAnalysis = serde_json::from_slice(&output)?;

    assert_eq!(analysis.sample_count, 68);
    assert_eq!(analysis.peaks.indices, vec![5, 7, 62]);
    assert_eq!(analysis.plateaus.len(), 2);
    assert_eq!(analysis.plateaus[0].peaks, vec![5, 7]);
    assert_eq!(analysis.plateaus[1].peaks, vec![62]);

    // Effort one: onset at 200 ms, strongest peak 38 kg at 500 ms.
    let first = &analysis.results[0];
    assert_close(first.start_time_ms, 200.0, 1e-9);
    assert_close(first.peak_time_ms, 500.0, 1e-9);
    assert_close(first.time_to_peak_s, 0.3, 1e-9);
    assert_close(first.peak_n, 38.0 * GRAVITY, 1e-6);
    assert_close(first.rfd_n_s.expect("rfd defined"), 38.0 * GRAVITY / 0.3, 1e-6);

    // Effort two: onset at 5900 ms, 45 kg peak at 6200 ms.
    let second = &analysis.results[1];
    assert_close(second.start_time_ms, 5900.0, 1e-9);
    assert_close(second.time_to_peak_s, 0.3, 1e-9);
    assert_close(second.peak_n, 45.0 * GRAVITY, 1e-6);
    assert_close(second.rfd_kg_s.expect("rfd defined"), 45.0 / 0.3, 1e-6);

    assert_eq!(analysis.lines.len(), 2);
    assert_close(analysis.lines[0].start_n, 0.0, 1e-12);
    assert_close(analysis.lines[0].end_n, first.peak_n, 1e-9);
    Ok(())
}

#[test]
fn analyze_reports_empty_results_for_a_short_file() -> Result<(), Box<dyn Error>> {
    let short = sample_path("test_data/hangboard_short.csv");

    let mut cmd = cargo_bin_cmd!("crimp");
    cmd.args(["analyze", "--input", &short]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let analysis: RfdAnalysis = serde_json::from_slice(&output)?;

    assert_eq!(analysis.sample_count, 2);
    assert!(analysis.peaks.indices.is_empty());
    assert!(analysis.results.is_empty());
    Ok(())
}

#[test]
fn analyze_rejects_a_malformed_row() -> Result<(), Box<dyn Error>> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "1718000000000,1,3700,0.00,0.00")?;
    writeln!(file, "1718000000100,2,3700,20.00")?;
    file.flush()?;

    let mut cmd = cargo_bin_cmd!("crimp");
    cmd.args(["analyze", "--input", file.path().to_str().expect("utf8 path")]);
    cmd.assert().failure();
    Ok(())
}

#[test]
fn find_peaks_lists_local_maxima() -> Result<(), Box<dyn Error>> {
    let session = sample_path("test_data/hangboard_session.csv");

    let mut cmd = cargo_bin_cmd!("crimp");
    cmd.args(["find-peaks", "--input", &session]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let peaks: Peaks = serde_json::from_slice(&output)?;
    assert_eq!(peaks.indices, vec![5, 7, 62]);
    Ok(())
}

#[test]
fn report_prints_the_result_columns() -> Result<(), Box<dyn Error>> {
    let session = sample_path("test_data/hangboard_session.csv");

    let mut cmd = cargo_bin_cmd!("crimp");
    cmd.args(["report", "--input", &session]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let text = String::from_utf8(output)?;

    for column in [
        "Plateau Start Time",
        "Peak Time",
        "Time to Peak (s)",
        "Peak Value (kg)",
        "Peak Value (N)",
        "RFD (kg/s)",
        "RFD (N/s)",
    ] {
        assert!(text.contains(column), "missing column {column:?}:\n{text}");
    }
    assert!(text.contains("38.00"), "peak kg value missing:\n{text}");
    Ok(())
}

#[test]
fn a_wider_gap_flag_merges_the_efforts() -> Result<(), Box<dyn Error>> {
    let session = sample_path("test_data/hangboard_session.csv");

    let mut cmd = cargo_bin_cmd!("crimp");
    cmd.args(["analyze", "--input", &session, "--group-gap-ms", "6000"]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let analysis: RfdAnalysis = serde_json::from_slice(&output)?;
    // 5500 ms between the efforts' nearest peaks is under the widened gap.
    assert_eq!(analysis.plateaus.len(), 1);
    assert_eq!(analysis.results.len(), 1);
    Ok(())
}

fn assert_close(actual: f64, expected: f64, tol: f64) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tol,
        "diff {diff} exceeded tol {tol} ({actual} vs {expected})"
    );
}

fn workspace_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .expect("crates dir")
        .parent()
        .expect("workspace root")
        .to_path_buf()
}

fn sample_path(relative: &str) -> String {
    workspace_root()
        .join(relative)
        .to_string_lossy()
        .to_string()
}

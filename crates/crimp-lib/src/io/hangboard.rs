use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::signal::Recording;

/// Hangboard exports are headerless CSV with five columns per row:
/// timestamp (ms since epoch), sample number, battery raw, mass (kg), and a
/// trailing mass column the analysis ignores.
const SESSION_COLUMNS: usize = 5;
const TIMESTAMP_COL: usize = 0;
const MASS_COL: usize = 3;

/// Parse a session export into a Recording.
///
/// Timestamps are zero-based against the first row and kept in milliseconds;
/// the mass column is scaled by `gravity` to newtons. Any malformed row
/// (wrong column count, non-numeric field, timestamp going backwards) fails
/// the whole file.
pub fn parse_session_csv<R: Read>(reader: R, gravity: f64) -> Result<Recording> {
    let mut csv = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut time_ms = Vec::new();
    let mut force_n = Vec::new();
    let mut origin = None;
    for (row, record) in csv.records().enumerate() {
        let record = record.with_context(|| format!("reading row {}", row + 1))?;
        if record.len() != SESSION_COLUMNS {
            bail!(
                "row {} has {} columns, expected {}",
                row + 1,
                record.len(),
                SESSION_COLUMNS
            );
        }
        let mut fields = [0.0f64; SESSION_COLUMNS];
        for (col, raw) in record.iter().enumerate() {
            fields[col] = raw.trim().parse().with_context(|| {
                format!("row {} column {} is not numeric: {:?}", row + 1, col + 1, raw)
            })?;
        }

        let base = *origin.get_or_insert(fields[TIMESTAMP_COL]);
        let offset = fields[TIMESTAMP_COL] - base;
        if let Some(&prev) = time_ms.last() {
            if offset < prev {
                bail!(
                    "row {} timestamp goes backwards ({} ms after {} ms)",
                    row + 1,
                    offset,
                    prev
                );
            }
        }
        time_ms.push(offset);
        force_n.push(fields[MASS_COL] * gravity);
    }
    if time_ms.is_empty() {
        bail!("no samples in session file");
    }
    Ok(Recording { time_ms, force_n })
}

/// Read a session export from disk.
pub fn read_session_csv(path: &Path, gravity: f64) -> Result<Recording> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    parse_session_csv(file, gravity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const GRAVITY: f64 = 9.81;

    #[test]
    fn zero_bases_timestamps_and_scales_mass() {
        let data = "\
1718000000000,1,3701,0.0,0.0
1718000000100,2,3701,20.0,20.0
1718000000200,3,3700,38.0,38.0
";
        let rec = parse_session_csv(data.as_bytes(), GRAVITY).unwrap();
        assert_eq!(rec.len(), 3);
        assert_eq!(rec.time_ms, vec![0.0, 100.0, 200.0]);
        assert!((rec.force_n[1] - 20.0 * GRAVITY).abs() < 1e-9);
        assert!((rec.force_n[2] - 38.0 * GRAVITY).abs() < 1e-9);
    }

    #[test]
    fn rejects_wrong_column_count() {
        let data = "\
1718000000000,1,3701,0.0,0.0
1718000000100,2,3701,20.0
";
        let err = parse_session_csv(data.as_bytes(), GRAVITY).unwrap_err();
        assert!(err.to_string().contains("columns"), "{err}");
    }

    #[test]
    fn rejects_non_numeric_field() {
        let data = "1718000000000,1,3701,heavy,0.0\n";
        let err = parse_session_csv(data.as_bytes(), GRAVITY).unwrap_err();
        assert!(err.to_string().contains("not numeric"), "{err}");
    }

    #[test]
    fn rejects_backwards_timestamps() {
        let data = "\
1718000000200,1,3701,0.0,0.0
1718000000100,2,3701,20.0,20.0
";
        let err = parse_session_csv(data.as_bytes(), GRAVITY).unwrap_err();
        assert!(err.to_string().contains("backwards"), "{err}");
    }

    #[test]
    fn rejects_empty_input() {
        let err = parse_session_csv("".as_bytes(), GRAVITY).unwrap_err();
        assert!(err.to_string().contains("no samples"), "{err}");
    }

    #[test]
    fn duplicate_timestamps_are_kept() {
        let data = "\
1718000000000,1,3701,0.0,0.0
1718000000100,2,3701,0.05,0.05
1718000000100,3,3701,5.0,5.0
";
        let rec = parse_session_csv(data.as_bytes(), GRAVITY).unwrap();
        assert_eq!(rec.time_ms, vec![0.0, 100.0, 100.0]);
    }

    #[test]
    fn reads_session_fixture() {
        let path = sample_path("test_data/hangboard_session.csv");
        let rec = read_session_csv(&path, GRAVITY).expect("read session fixture");
        assert_eq!(rec.time_ms[0], 0.0);
        assert!(rec.len() > 60);
        assert!((rec.duration_ms() - 6700.0).abs() < 1e-9);
    }

    fn sample_path(relative: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .and_then(|p| p.parent())
            .expect("workspace root")
            .join(relative)
    }
}

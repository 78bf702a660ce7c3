use crate::signal::{Plateau, Recording};
use serde::{Deserialize, Serialize};

/// Per-effort rate-of-force-development summary.
///
/// Force shows up twice: in newtons (native) and on a kg-equivalent display
/// scale (newtons divided by gravity). The kg figures are a reading
/// convenience, not a mass measurement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RfdResult {
    pub start_time_ms: f64,
    pub peak_time_ms: f64,
    pub time_to_peak_s: f64,
    pub peak_kg: f64,
    pub peak_n: f64,
    /// Absent when the peak does not strictly follow the onset in time.
    pub rfd_kg_s: Option<f64>,
    pub rfd_n_s: Option<f64>,
}

/// Onset-to-peak segment for rendering: zero force at the onset instant up
/// to the peak force at the peak instant. Same ordering as the results.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RfdLine {
    pub start_time_ms: f64,
    pub end_time_ms: f64,
    pub start_n: f64,
    pub end_n: f64,
}

/// Index of the effort's strongest peak. A strict `>` scan keeps the first
/// index when the maximum force occurs more than once.
pub fn highest_peak_index(rec: &Recording, plateau: &Plateau) -> usize {
    let mut best = plateau.first_peak();
    for &idx in &plateau.peaks[1..] {
        if rec.force_n[idx] > rec.force_n[best] {
            best = idx;
        }
    }
    best
}

/// Last at-rest sample (force <= `baseline_n`) before the effort's first
/// peak. Backward linear scan, O(n) worst case over the recording. When the
/// signal never returns to baseline, the recording's first sample stands in
/// as the onset even if it is above baseline.
pub fn onset_index(rec: &Recording, first_peak: usize, baseline_n: f64) -> usize {
    (0..first_peak)
        .rev()
        .find(|&idx| rec.force_n[idx] <= baseline_n)
        .unwrap_or(0)
}

/// Compute the RFD summary and render segment for one effort.
pub fn plateau_rfd(
    rec: &Recording,
    plateau: &Plateau,
    baseline_n: f64,
    gravity: f64,
) -> (RfdResult, RfdLine) {
    let highest = highest_peak_index(rec, plateau);
    let onset = onset_index(rec, plateau.first_peak(), baseline_n);

    let start_time_ms = rec.time_ms[onset];
    let peak_time_ms = rec.time_ms[highest];
    let time_to_peak_s = (peak_time_ms - start_time_ms) / 1000.0;
    let peak_n = rec.force_n[highest];
    let rfd_n_s = (time_to_peak_s > 0.0).then(|| peak_n / time_to_peak_s);

    let result = RfdResult {
        start_time_ms,
        peak_time_ms,
        time_to_peak_s,
        peak_kg: peak_n / gravity,
        peak_n,
        rfd_kg_s: rfd_n_s.map(|rfd| rfd / gravity),
        rfd_n_s,
    };
    let line = RfdLine {
        start_time_ms,
        end_time_ms: peak_time_ms,
        start_n: 0.0,
        end_n: peak_n,
    };
    (result, line)
}

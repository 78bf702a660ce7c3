use crate::{
    metrics::rfd::{plateau_rfd, RfdLine, RfdResult},
    signal::{Peaks, Plateau, Recording},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configurable parameters for the force-effort RFD pipeline.
#[derive(Debug, Clone, Copy)]
pub struct RfdPipelineConfig {
    /// Maximum gap between consecutive peaks of one effort (milliseconds).
    pub group_gap_ms: f64,
    /// Force at or below which a sample counts as rest (newtons).
    pub baseline_n: f64,
    /// Gravitational acceleration for the kg-equivalent scale (m/s^2).
    pub gravity: f64,
}

impl Default for RfdPipelineConfig {
    fn default() -> Self {
        Self {
            group_gap_ms: 5000.0,
            baseline_n: 0.1,
            gravity: 9.81,
        }
    }
}

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("signal too short for peak detection: {0} samples (need at least 3)")]
    SignalTooShort(usize),
    #[error("no peaks to segment")]
    NoPeaks,
}

/// Combined product of one pipeline run over a session recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RfdAnalysis {
    pub sample_count: usize,
    pub peaks: Peaks,
    pub plateaus: Vec<Plateau>,
    pub results: Vec<RfdResult>,
    pub lines: Vec<RfdLine>,
}

impl RfdAnalysis {
    fn empty(rec: &Recording) -> Self {
        Self {
            sample_count: rec.len(),
            peaks: Peaks::from_indices(Vec::new()),
            plateaus: Vec::new(),
            results: Vec::new(),
            lines: Vec::new(),
        }
    }
}

/// Strict local maxima of the force signal: samples greater than both
/// immediate neighbors. No height, distance, or prominence filtering is
/// applied, so a dense noisy signal reports every shallow maximum.
pub fn find_force_peaks(rec: &Recording) -> Result<Peaks, DetectError> {
    if rec.len() < 3 {
        return Err(DetectError::SignalTooShort(rec.len()));
    }
    let force = &rec.force_n;
    let mut indices = Vec::new();
    for i in 1..force.len() - 1 {
        if force[i] > force[i - 1] && force[i] > force[i + 1] {
            indices.push(i);
        }
    }
    Ok(Peaks::from_indices(indices))
}

/// Partition peaks into efforts. A peak joins the current plateau when its
/// timestamp is strictly closer than `group_gap_ms` to the previous peak's;
/// otherwise it seeds a new plateau. Membership chains off the immediately
/// preceding peak, so a plateau's total span can exceed the gap.
pub fn group_plateaus(
    peaks: &Peaks,
    time_ms: &[f64],
    group_gap_ms: f64,
) -> Result<Vec<Plateau>, DetectError> {
    let first = *peaks.indices.first().ok_or(DetectError::NoPeaks)?;
    let mut plateaus = Vec::new();
    let mut current = vec![first];
    for pair in peaks.indices.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        if time_ms[next] - time_ms[prev] < group_gap_ms {
            current.push(next);
        } else {
            plateaus.push(Plateau {
                peaks: std::mem::replace(&mut current, vec![next]),
            });
        }
    }
    plateaus.push(Plateau { peaks: current });
    Ok(plateaus)
}

/// Run peak detection, plateau grouping, and per-effort RFD in one shot.
///
/// A recording too short to hold a local maximum, or one with no peaks at
/// all, yields an empty analysis rather than an error; per-effort
/// degeneracies null out only their own row.
pub fn run_rfd_pipeline(rec: &Recording, cfg: &RfdPipelineConfig) -> RfdAnalysis {
    let peaks = match find_force_peaks(rec) {
        Ok(peaks) => peaks,
        Err(err) => {
            log::warn!("no peaks found: {err}");
            return RfdAnalysis::empty(rec);
        }
    };
    let plateaus = match group_plateaus(&peaks, &rec.time_ms, cfg.group_gap_ms) {
        Ok(plateaus) => plateaus,
        Err(err) => {
            log::warn!("no efforts found: {err}");
            return RfdAnalysis::empty(rec);
        }
    };

    let mut results = Vec::with_capacity(plateaus.len());
    let mut lines = Vec::with_capacity(plateaus.len());
    for plateau in &plateaus {
        let (result, line) = plateau_rfd(rec, plateau, cfg.baseline_n, cfg.gravity);
        if result.rfd_n_s.is_none() {
            log::warn!(
                "effort peaking at {} ms has non-positive time to peak; RFD left absent",
                result.peak_time_ms
            );
        }
        results.push(result);
        lines.push(line);
    }

    RfdAnalysis {
        sample_count: rec.len(),
        peaks,
        plateaus,
        results,
        lines,
    }
}

use serde::{Deserialize, Serialize};

/// One climbing session worth of force samples.
///
/// Timestamps are millisecond offsets from the first sample and must be
/// non-decreasing; index adjacency is load-bearing for onset search and
/// plateau grouping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    /// Zero-based millisecond offsets
    pub time_ms: Vec<f64>,
    /// Force in newtons
    pub force_n: Vec<f64>,
}

impl Recording {
    pub fn from_samples(samples: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let (time_ms, force_n) = samples.into_iter().unzip();
        Self { time_ms, force_n }
    }

    pub fn len(&self) -> usize {
        self.force_n.len()
    }

    pub fn is_empty(&self) -> bool {
        self.force_n.is_empty()
    }

    pub fn duration_ms(&self) -> f64 {
        match (self.time_ms.first(), self.time_ms.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }
}

/// Indices of local force maxima, ascending by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Peaks {
    pub indices: Vec<usize>,
}

impl Peaks {
    pub fn from_indices(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// One climbing effort: a non-empty run of peak indices whose consecutive
/// timestamps sit closer together than the grouping gap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plateau {
    pub peaks: Vec<usize>,
}

impl Plateau {
    /// First peak of the effort; grouping never produces an empty plateau.
    pub fn first_peak(&self) -> usize {
        self.peaks[0]
    }
}

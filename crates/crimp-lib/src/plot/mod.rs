use serde::{Deserialize, Serialize};

use crate::detectors::force::RfdAnalysis;
use crate::signal::Recording;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Axis {
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Style {
    pub width: f32,
    pub dash: Option<[f32; 2]>,
    pub color: Color,
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct Color(pub u32);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub style: Style,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointSeries {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub radius: f32,
    pub color: Color,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelSeries {
    pub labels: Vec<([f64; 2], String)>,
    pub color: Color,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Series {
    Line(LineSeries),
    Points(PointSeries),
    Labels(LabelSeries),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Figure {
    pub title: Option<String>,
    pub x: Axis,
    pub y: Axis,
    pub series: Vec<Series>,
}

impl Figure {
    pub fn new(title: impl Into<Option<String>>) -> Self {
        Self {
            title: title.into(),
            x: Axis { label: None },
            y: Axis { label: None },
            series: Vec::new(),
        }
    }

    pub fn add_series(&mut self, series: Series) {
        self.series.push(series);
    }
}

pub trait PlotBackend {
    fn draw(&mut self, fig: &Figure) -> anyhow::Result<()>;
}

pub fn decimate_points(points: &[[f64; 2]], max_points: usize) -> Vec<[f64; 2]> {
    if points.len() <= max_points {
        return points.to_vec();
    }
    let bucket_size = points.len() as f64 / max_points as f64;
    let mut result = Vec::with_capacity(max_points);
    for i in 0..max_points {
        let start = (i as f64 * bucket_size).floor() as usize;
        if start >= points.len() {
            break;
        }
        result.push(points[start]);
    }
    result
}

/// Layered session chart: the raw force trace, a dashed onset-to-peak
/// segment per effort, a marker on each effort's strongest peak, and an RFD
/// label (N/s, two decimals) beside markers whose RFD is defined.
pub fn figure_from_analysis(rec: &Recording, analysis: &RfdAnalysis, max_points: usize) -> Figure {
    let mut fig = Figure::new(Some("Session force and RFD".into()));
    fig.x.label = Some("Time (ms)".into());
    fig.y.label = Some("Force (N)".into());

    let raw: Vec<[f64; 2]> = rec
        .time_ms
        .iter()
        .zip(rec.force_n.iter())
        .map(|(&t, &f)| [t, f])
        .collect();
    fig.add_series(Series::Line(LineSeries {
        name: "force".into(),
        points: decimate_points(&raw, max_points),
        style: Style {
            width: 1.4,
            dash: None,
            color: Color(0x2060B0),
        },
    }));

    for line in &analysis.lines {
        fig.add_series(Series::Line(LineSeries {
            name: "onset to peak".into(),
            points: vec![
                [line.start_time_ms, line.start_n],
                [line.end_time_ms, line.end_n],
            ],
            style: Style {
                width: 1.0,
                dash: Some([6.0, 4.0]),
                color: Color(0x909090),
            },
        }));
    }

    fig.add_series(Series::Points(PointSeries {
        name: "highest peaks".into(),
        points: analysis
            .results
            .iter()
            .map(|result| [result.peak_time_ms, result.peak_n])
            .collect(),
        radius: 5.0,
        color: Color(0xD03030),
    }));

    fig.add_series(Series::Labels(LabelSeries {
        labels: analysis
            .results
            .iter()
            .filter_map(|result| {
                result
                    .rfd_n_s
                    .map(|rfd| ([result.peak_time_ms, result.peak_n], format!("{rfd:.2} N/s")))
            })
            .collect(),
        color: Color(0x3050C8),
    }));

    fig
}

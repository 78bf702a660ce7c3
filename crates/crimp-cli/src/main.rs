use anyhow::Result;
use clap::{Parser, Subcommand};
use crimp_lib::{
    detectors::force::{find_force_peaks, run_rfd_pipeline, RfdPipelineConfig},
    io::hangboard,
    metrics::rfd::RfdResult,
    plot::{figure_from_analysis, Figure, Series},
    signal::{Peaks, Recording},
};
use plotters::prelude::*;
use std::{
    io,
    path::{Path, PathBuf},
};

#[derive(Parser)]
#[command(
    name = "crimp",
    version,
    about = "Climbing force-session RFD analysis"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect force peaks in a session CSV read from stdin or --input
    FindPeaks {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long, default_value_t = 9.81)]
        gravity: f64,
    },
    /// Run peaks → efforts → RFD and print the analysis as JSON
    Analyze {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long, default_value_t = 5000.0)]
        group_gap_ms: f64,
        #[arg(long, default_value_t = 0.1)]
        baseline_n: f64,
        #[arg(long, default_value_t = 9.81)]
        gravity: f64,
    },
    /// Run the pipeline and print a per-effort table
    Report {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long, default_value_t = 5000.0)]
        group_gap_ms: f64,
        #[arg(long, default_value_t = 0.1)]
        baseline_n: f64,
        #[arg(long, default_value_t = 9.81)]
        gravity: f64,
    },
    /// Render the session with peak markers and RFD labels to a PNG
    Plot {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = 5000.0)]
        group_gap_ms: f64,
        #[arg(long, default_value_t = 0.1)]
        baseline_n: f64,
        #[arg(long, default_value_t = 9.81)]
        gravity: f64,
        #[arg(long, default_value_t = 4096)]
        max_points: usize,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::FindPeaks { input, gravity } => cmd_find_peaks(input.as_deref(), gravity)?,
        Commands::Analyze {
            input,
            group_gap_ms,
            baseline_n,
            gravity,
        } => cmd_analyze(
            input.as_deref(),
            RfdPipelineConfig {
                group_gap_ms,
                baseline_n,
                gravity,
            },
        )?,
        Commands::Report {
            input,
            group_gap_ms,
            baseline_n,
            gravity,
        } => cmd_report(
            input.as_deref(),
            RfdPipelineConfig {
                group_gap_ms,
                baseline_n,
                gravity,
            },
        )?,
        Commands::Plot {
            input,
            out,
            group_gap_ms,
            baseline_n,
            gravity,
            max_points,
        } => cmd_plot(
            input.as_deref(),
            &out,
            RfdPipelineConfig {
                group_gap_ms,
                baseline_n,
                gravity,
            },
            max_points,
        )?,
    }
    Ok(())
}

fn load_recording(input: Option<&Path>, gravity: f64) -> Result<Recording> {
    match input {
        Some(path) => hangboard::read_session_csv(path, gravity),
        None => hangboard::parse_session_csv(io::stdin(), gravity),
    }
}

fn cmd_find_peaks(input: Option<&Path>, gravity: f64) -> Result<()> {
    let rec = load_recording(input, gravity)?;
    let peaks = find_force_peaks(&rec).unwrap_or_else(|_| Peaks::from_indices(Vec::new()));
    println!("{}", serde_json::to_string(&peaks)?);
    Ok(())
}

fn cmd_analyze(input: Option<&Path>, cfg: RfdPipelineConfig) -> Result<()> {
    let rec = load_recording(input, cfg.gravity)?;
    let analysis = run_rfd_pipeline(&rec, &cfg);
    println!("{}", serde_json::to_string(&analysis)?);
    Ok(())
}

fn cmd_report(input: Option<&Path>, cfg: RfdPipelineConfig) -> Result<()> {
    let rec = load_recording(input, cfg.gravity)?;
    let analysis = run_rfd_pipeline(&rec, &cfg);
    print_report(&analysis.results);
    Ok(())
}

fn print_report(results: &[RfdResult]) {
    println!(
        "{:>18} | {:>10} | {:>16} | {:>15} | {:>14} | {:>10} | {:>10}",
        "Plateau Start Time",
        "Peak Time",
        "Time to Peak (s)",
        "Peak Value (kg)",
        "Peak Value (N)",
        "RFD (kg/s)",
        "RFD (N/s)"
    );
    for result in results {
        println!(
            "{:>18.1} | {:>10.1} | {:>16.3} | {:>15.2} | {:>14.2} | {:>10} | {:>10}",
            result.start_time_ms,
            result.peak_time_ms,
            result.time_to_peak_s,
            result.peak_kg,
            result.peak_n,
            format_rfd(result.rfd_kg_s),
            format_rfd(result.rfd_n_s),
        );
    }
    if results.is_empty() {
        println!("no efforts found");
    }
}

fn format_rfd(value: Option<f64>) -> String {
    match value {
        Some(rfd) => format!("{rfd:.2}"),
        None => "n/a".into(),
    }
}

fn cmd_plot(
    input: Option<&Path>,
    out: &Path,
    cfg: RfdPipelineConfig,
    max_points: usize,
) -> Result<()> {
    let rec = load_recording(input, cfg.gravity)?;
    let analysis = run_rfd_pipeline(&rec, &cfg);
    let fig = figure_from_analysis(&rec, &analysis, max_points);
    draw_plotters_figure(out, &fig)?;
    Ok(())
}

fn draw_plotters_figure(path: &Path, fig: &Figure) -> Result<()> {
    let backend = BitMapBackend::new(path, (1024, 576));
    let root = backend.into_drawing_area();
    root.fill(&WHITE)?;

    let mut x_values = Vec::new();
    let mut y_values = Vec::new();
    for series in &fig.series {
        for point in series_points(series) {
            x_values.push(point[0]);
            y_values.push(point[1]);
        }
    }
    let x_min = x_values.iter().copied().fold(f64::INFINITY, f64::min);
    let x_max = x_values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let y_min = y_values.iter().copied().fold(f64::INFINITY, f64::min);
    let y_max = y_values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (x_min, x_max) = if x_min.is_finite() && x_max.is_finite() && x_min < x_max {
        (x_min, x_max)
    } else {
        (0.0, 1.0)
    };
    let (y_min, y_max) = if y_min.is_finite() && y_max.is_finite() && y_min < y_max {
        (y_min, y_max * 1.1)
    } else {
        (0.0, 1.0)
    };

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .caption(
            fig.title.clone().unwrap_or_else(|| "Plot".into()),
            ("sans-serif", 24),
        )
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
    let mut mesh = chart.configure_mesh();
    if let Some(label) = &fig.x.label {
        mesh.x_desc(label.as_str());
    }
    if let Some(label) = &fig.y.label {
        mesh.y_desc(label.as_str());
    }
    mesh.draw()?;

    for series in &fig.series {
        match series {
            Series::Line(line) => {
                let color = rgb(line.style.color);
                if let Some([size, gap]) = line.style.dash {
                    chart.draw_series(DashedLineSeries::new(
                        line.points.iter().map(|p| (p[0], p[1])),
                        size as u32,
                        gap as u32,
                        color.stroke_width(line.style.width as u32),
                    ))?;
                } else {
                    chart.draw_series(LineSeries::new(
                        line.points.iter().map(|p| (p[0], p[1])),
                        &color,
                    ))?;
                }
            }
            Series::Points(points) => {
                let color = rgb(points.color);
                chart.draw_series(points.points.iter().map(|p| {
                    Circle::new((p[0], p[1]), points.radius as i32, color.filled())
                }))?;
            }
            Series::Labels(labels) => {
                let color = rgb(labels.color);
                chart.draw_series(labels.labels.iter().map(|(pos, text)| {
                    Text::new(
                        text.clone(),
                        (pos[0], pos[1]),
                        ("sans-serif", 14).into_font().color(&color),
                    )
                }))?;
            }
        }
    }
    root.present()?;
    Ok(())
}

fn series_points(series: &Series) -> Vec<[f64; 2]> {
    match series {
        Series::Line(line) => line.points.clone(),
        Series::Points(points) => points.points.clone(),
        Series::Labels(labels) => labels.labels.iter().map(|(pos, _)| *pos).collect(),
    }
}

fn rgb(color: crimp_lib::plot::Color) -> RGBColor {
    RGBColor(
        ((color.0 >> 16) & 0xFF) as u8,
        ((color.0 >> 8) & 0xFF) as u8,
        (color.0 & 0xFF) as u8,
    )
}

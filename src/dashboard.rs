//! Dashboard rendering for one or two event logs
//!
//! The driver only talks to the [`Renderer`] trait. [`DashboardRenderer`]
//! writes a self-contained HTML page with inline SVG charts, or a JSON
//! summary when the JSON format is selected.

use crate::cli::OutputFormat;
use crate::event_log::EventLog;
use crate::metrics::{self, DatasetStats, EventKind, FragmentationMetrics, TypeHistogram};
use crate::svg::{self, Frame};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CHART_WIDTH: f64 = 960.0;
const MAX_RATE_BINS: usize = 240;
const MAX_HEATMAP_BINS: usize = 120;

/// Per-dataset colors (A, B)
const DATASET_COLORS: [&str; 2] = ["#1f77b4", "#d62728"];

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode summary: {0}")]
    Json(#[from] serde_json::Error),
}

/// One labelled input to a dashboard
#[derive(Debug, Clone, Copy)]
pub struct Dataset<'a> {
    pub label: &'a str,
    pub source: &'a Path,
    pub log: &'a EventLog,
}

/// Presentation settings
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Explicit output path; derived from the inputs when absent
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    /// Bin width in seconds for the event-rate chart
    pub bin_seconds: f64,
    /// Window width in seconds for the statistics table
    pub stats_window_seconds: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            output: None,
            format: OutputFormat::Html,
            bin_seconds: 0.5,
            stats_window_seconds: metrics::DEFAULT_STATS_WINDOW_SECONDS,
        }
    }
}

/// Rendering collaborator used by the driver
pub trait Renderer {
    /// Render a single dataset; returns the artifact path
    fn render_single(&mut self, dataset: Dataset<'_>, options: &RenderOptions)
        -> Result<PathBuf, RenderError>;

    /// Render two datasets side by side; returns the artifact path
    fn render_comparison(
        &mut self,
        a: Dataset<'_>,
        b: Dataset<'_>,
        options: &RenderOptions,
    ) -> Result<PathBuf, RenderError>;
}

/// Writes dashboards to disk
#[derive(Debug, Default)]
pub struct DashboardRenderer;

impl DashboardRenderer {
    pub fn new() -> Self {
        Self
    }

    fn write(path: &Path, contents: &str) -> Result<(), RenderError> {
        std::fs::write(path, contents).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Renderer for DashboardRenderer {
    fn render_single(
        &mut self,
        dataset: Dataset<'_>,
        options: &RenderOptions,
    ) -> Result<PathBuf, RenderError> {
        let path = options
            .output
            .clone()
            .unwrap_or_else(|| default_single_output(dataset.source, options.format));
        let contents = match options.format {
            OutputFormat::Html => single_dashboard_html(dataset, options),
            OutputFormat::Json => summary_json(&[dataset], options)?,
        };
        Self::write(&path, &contents)?;
        tracing::debug!(path = %path.display(), "wrote single dashboard");
        Ok(path)
    }

    fn render_comparison(
        &mut self,
        a: Dataset<'_>,
        b: Dataset<'_>,
        options: &RenderOptions,
    ) -> Result<PathBuf, RenderError> {
        let path = options
            .output
            .clone()
            .unwrap_or_else(|| default_comparison_output(a.source, b.source, options.format));
        let contents = match options.format {
            OutputFormat::Html => comparison_dashboard_html(a, b, options),
            OutputFormat::Json => summary_json(&[a, b], options)?,
        };
        Self::write(&path, &contents)?;
        tracing::debug!(path = %path.display(), "wrote comparison dashboard");
        Ok(path)
    }
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "fragmentation".to_string())
}

/// `<stem>_dashboard.<ext>` in the working directory
pub fn default_single_output(source: &Path, format: OutputFormat) -> PathBuf {
    PathBuf::from(format!("{}_dashboard.{}", stem(source), format.extension()))
}

/// `<stemA>_vs_<stemB>_comparison.<ext>` in the working directory
pub fn default_comparison_output(a: &Path, b: &Path, format: OutputFormat) -> PathBuf {
    PathBuf::from(format!(
        "{}_vs_{}_comparison.{}",
        stem(a),
        stem(b),
        format.extension()
    ))
}

#[derive(Serialize)]
struct DatasetSummary<'a> {
    label: &'a str,
    source: String,
    stats: DatasetStats,
}

#[derive(Serialize)]
struct Summary<'a> {
    mode: &'static str,
    stats_window_seconds: f64,
    datasets: Vec<DatasetSummary<'a>>,
}

/// JSON summary for one or two datasets
pub fn summary_json(datasets: &[Dataset<'_>], options: &RenderOptions) -> serde_json::Result<String> {
    let summary = Summary {
        mode: if datasets.len() > 1 { "comparison" } else { "single" },
        stats_window_seconds: options.stats_window_seconds,
        datasets: datasets
            .iter()
            .map(|d| DatasetSummary {
                label: d.label,
                source: d.source.display().to_string(),
                stats: DatasetStats::from_log(d.log, options.stats_window_seconds),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&summary)
}

fn kind_color(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Extfrag => "#d62728",
        EventKind::Migration => "#1f77b4",
        EventKind::Compaction => "#2ca02c",
        EventKind::Other => "#7f7f7f",
    }
}

fn kind_row(kind: EventKind) -> f64 {
    match kind {
        EventKind::Extfrag => 3.0,
        EventKind::Migration => 2.0,
        EventKind::Compaction => 1.0,
        EventKind::Other => 0.0,
    }
}

fn hex_rgb(color: &str) -> (u8, u8, u8) {
    let channel = |i: usize| {
        color
            .get(i..i + 2)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .unwrap_or(0)
    };
    (channel(1), channel(3), channel(5))
}

fn time_bounds(datasets: &[Dataset<'_>]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for d in datasets {
        for ts in d.log.events.iter().filter_map(metrics::timestamp) {
            lo = lo.min(ts);
            hi = hi.max(ts);
        }
    }
    (lo, hi)
}

fn legend(frame: &Frame, entries: &[(&str, &str)]) -> String {
    let mut out = String::new();
    let mut x = frame.margin_left + 8.0;
    for (text, color) in entries {
        out.push_str(&svg::rect(x, 26.0, 10.0, 10.0, color, 0.9));
        out.push_str(&svg::label(x + 14.0, 35.0, "start", 11, svg::TEXT_COLOR, text));
        x += 24.0 + text.len() as f64 * 6.5;
    }
    out
}

fn dataset_legend(frame: &Frame, datasets: &[Dataset<'_>]) -> String {
    let entries: Vec<(&str, &str)> = datasets
        .iter()
        .enumerate()
        .map(|(i, d)| (d.label, DATASET_COLORS[i % 2]))
        .collect();
    legend(frame, &entries)
}

/// Event timeline: timestamp on x, event type as a row on y
fn timeline_chart(datasets: &[Dataset<'_>]) -> String {
    let frame = Frame::new(CHART_WIDTH, 260.0, time_bounds(datasets), (-0.5, 3.5))
        .with_left_margin(100.0);
    let mut body = frame.axes("Event Timeline", "Time (s)", "", false);

    for kind in EventKind::ALL {
        body.push_str(&svg::label(
            frame.margin_left - 8.0,
            frame.y(kind_row(kind)) + 4.0,
            "end",
            11,
            svg::TEXT_COLOR,
            kind.as_str(),
        ));
    }

    let offset = |i: usize| -> f64 {
        if datasets.len() > 1 {
            if i == 0 { 0.15 } else { -0.15 }
        } else {
            0.0
        }
    };

    for (i, dataset) in datasets.iter().enumerate() {
        for event in &dataset.log.events {
            let (Some(ts), Some(kind)) = (metrics::timestamp(event), metrics::kind(event)) else {
                continue;
            };
            let color = if datasets.len() > 1 {
                DATASET_COLORS[i % 2]
            } else {
                kind_color(kind)
            };
            body.push_str(&svg::circle(
                frame.x(ts),
                frame.y(kind_row(kind) + offset(i)),
                2.5,
                color,
                0.5,
            ));
        }
    }

    if datasets.len() > 1 {
        body.push_str(&dataset_legend(&frame, datasets));
    }

    frame.finish(&body)
}

/// Events per bin over time
fn rate_chart(datasets: &[Dataset<'_>], bin_seconds: f64) -> String {
    let histograms: Vec<TypeHistogram> = datasets
        .iter()
        .map(|d| TypeHistogram::build(&d.log.events, bin_seconds, MAX_RATE_BINS))
        .collect();

    let max_count = histograms
        .iter()
        .flat_map(|h| h.bins.keys().map(move |&b| h.total(b)))
        .max()
        .unwrap_or(0);

    let width = histograms
        .iter()
        .map(|h| h.bin_seconds)
        .fold(bin_seconds, f64::max);
    let title = format!("Event Rate ({} s bins)", svg::format_tick(width));
    let frame = Frame::new(CHART_WIDTH, 240.0, time_bounds(datasets), (0.0, max_count as f64));
    let mut body = frame.axes(&title, "Time (s)", "Events", true);

    for (i, hist) in histograms.iter().enumerate() {
        let color = DATASET_COLORS[i % 2];
        if datasets.len() == 1 {
            for (&bin, counts) in &hist.bins {
                let x0 = frame.x(bin as f64 * hist.bin_seconds);
                let x1 = frame.x((bin as f64 + 1.0) * hist.bin_seconds);
                let total = counts.values().fold(0u64, |acc, &c| acc.saturating_add(c));
                let y = frame.y(total as f64);
                body.push_str(&svg::rect(
                    x0,
                    y,
                    (x1 - x0).max(1.0),
                    frame.y(0.0) - y,
                    color,
                    0.8,
                ));
            }
        } else {
            let points: Vec<(f64, f64)> = hist
                .bins
                .keys()
                .map(|&bin| {
                    (
                        frame.x((bin as f64 + 0.5) * hist.bin_seconds),
                        frame.y(hist.total(bin) as f64),
                    )
                })
                .collect();
            body.push_str(&svg::polyline(&points, color));
        }
    }

    if datasets.len() > 1 {
        body.push_str(&dataset_legend(&frame, datasets));
    }

    frame.finish(&body)
}

/// Event type by time bin, shaded by count
fn heatmap_chart(dataset: Dataset<'_>, stats_window_seconds: f64, color: &str) -> String {
    let hist = TypeHistogram::build(&dataset.log.events, stats_window_seconds, MAX_HEATMAP_BINS);
    let (lo, hi) = time_bounds(&[dataset]);
    let frame = Frame::new(CHART_WIDTH, 220.0, (lo, hi), (-0.5, 3.5)).with_left_margin(100.0);
    let title = format!("{}: Event Heatmap", dataset.label);
    let mut body = frame.axes(&title, "Time (s)", "", false);
    let rgb = hex_rgb(color);
    let max_cell = hist.max_cell().max(1) as f64;
    let row_height = frame.plot_height() / 4.0;

    for kind in EventKind::ALL {
        body.push_str(&svg::label(
            frame.margin_left - 8.0,
            frame.y(kind_row(kind)) + 4.0,
            "end",
            11,
            svg::TEXT_COLOR,
            kind.as_str(),
        ));
    }

    for (&bin, counts) in &hist.bins {
        let start = (bin as f64 * hist.bin_seconds).max(lo);
        let end = ((bin as f64 + 1.0) * hist.bin_seconds).min(hi.max(start));
        let x0 = frame.x(start);
        let x1 = frame.x(end).max(x0 + 1.0);
        for (&kind, &count) in counts {
            let intensity = 0.15 + 0.85 * (count as f64 / max_cell);
            body.push_str(&svg::rect(
                x0,
                frame.y(kind_row(kind)) - row_height / 2.0,
                x1 - x0,
                row_height,
                &svg::shade(rgb, intensity),
                1.0,
            ));
        }
    }

    frame.finish(&body)
}

/// Fragmentation index samples over time
fn fragmentation_chart(datasets: &[Dataset<'_>], metrics: &[FragmentationMetrics]) -> String {
    let points: Vec<&(f64, f64)> = metrics
        .iter()
        .flat_map(|m| m.fragmentation_points.iter())
        .collect();
    let x_range = (
        points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min),
        points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max),
    );
    let y_range = (
        points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min),
        points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max),
    );
    let frame = Frame::new(CHART_WIDTH, 240.0, x_range, y_range);
    let mut body = frame.axes("Fragmentation Index", "Time (s)", "Index", true);

    if points.is_empty() {
        body.push_str(&no_data_note(&frame, "No fragmentation index samples"));
    }

    for (i, m) in metrics.iter().enumerate() {
        for &(ts, index) in &m.fragmentation_points {
            body.push_str(&svg::circle(
                frame.x(ts),
                frame.y(index),
                3.0,
                DATASET_COLORS[i % 2],
                0.7,
            ));
        }
    }

    if datasets.len() > 1 {
        body.push_str(&dataset_legend(&frame, datasets));
    }

    frame.finish(&body)
}

fn no_data_note(frame: &Frame, text: &str) -> String {
    svg::label(
        frame.width / 2.0,
        frame.height / 2.0,
        "middle",
        12,
        svg::MUTED_TEXT_COLOR,
        text,
    )
}

/// Per-window migration series drawn as marked lines, one per dataset
fn migration_lines(
    title: &str,
    y_label: &str,
    datasets: &[Dataset<'_>],
    series: &[Vec<(f64, u64)>],
) -> String {
    let all = series.iter().flatten();
    let x_range = (
        all.clone().map(|p| p.0).fold(f64::INFINITY, f64::min),
        all.clone().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max),
    );
    let max_pages = all.map(|p| p.1).max().unwrap_or(0);
    let frame = Frame::new(CHART_WIDTH, 240.0, x_range, (0.0, max_pages as f64));
    let mut body = frame.axes(title, "Time (s)", y_label, true);

    if series.iter().all(Vec::is_empty) {
        body.push_str(&no_data_note(&frame, "No migration events"));
    }

    for (i, points) in series.iter().enumerate() {
        let color = DATASET_COLORS[i % 2];
        let pixels: Vec<(f64, f64)> = points
            .iter()
            .map(|&(start, pages)| (frame.x(start), frame.y(pages as f64)))
            .collect();
        body.push_str(&svg::polyline(&pixels, color));
        let every = (pixels.len() / 20).max(1);
        for &(x, y) in pixels.iter().step_by(every) {
            body.push_str(&svg::circle(x, y, 3.0, color, 0.8));
        }
    }

    if datasets.len() > 1 {
        body.push_str(&dataset_legend(&frame, datasets));
    }

    frame.finish(&body)
}

/// Pages migrated per statistics window
fn migration_rate_chart(datasets: &[Dataset<'_>], metrics: &[FragmentationMetrics]) -> String {
    let series: Vec<Vec<(f64, u64)>> = metrics.iter().map(|m| m.migration_series()).collect();
    let window = metrics
        .first()
        .map_or(metrics::DEFAULT_STATS_WINDOW_SECONDS, |m| m.window_seconds);
    let title = format!(
        "Page Migration Activity ({} s windows)",
        svg::format_tick(window)
    );
    migration_lines(&title, "Pages migrated", datasets, &series)
}

/// Running total of migrated pages
fn cumulative_migration_chart(
    datasets: &[Dataset<'_>],
    metrics: &[FragmentationMetrics],
) -> String {
    let series: Vec<Vec<(f64, u64)>> = metrics
        .iter()
        .map(|m| m.cumulative_migrations())
        .collect();
    migration_lines(
        "Cumulative Page Migrations",
        "Cumulative pages",
        datasets,
        &series,
    )
}

fn stats_table(datasets: &[Dataset<'_>], stats: &[DatasetStats]) -> String {
    let mut html = String::new();
    html.push_str("    <table class=\"stats-table\">\n");
    html.push_str("        <tr><th>Metric</th>");
    for d in datasets {
        html.push_str(&format!("<th>{}</th>", svg::escape(d.label)));
    }
    html.push_str("</tr>\n");

    let rows: Vec<Vec<(&str, String)>> = stats.iter().map(DatasetStats::rows).collect();
    if let Some(first) = rows.first() {
        for (r, (name, _)) in first.iter().enumerate() {
            html.push_str(&format!("        <tr><td class=\"metric\">{}</td>", name));
            for row in &rows {
                html.push_str(&format!("<td>{}</td>", svg::escape(&row[r].1)));
            }
            html.push_str("</tr>\n");
        }
    }

    html.push_str("    </table>\n");
    html
}

fn generate_styles() -> &'static str {
    r#"
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            margin: 20px;
            background-color: #f5f5f5;
        }
        h1, h2 {
            color: #333;
        }
        .subtitle {
            color: #666;
            font-size: 0.9em;
        }
        .chart {
            margin-bottom: 20px;
        }
        table {
            border-collapse: collapse;
            background-color: white;
            box-shadow: 0 1px 3px rgba(0,0,0,0.1);
            margin-bottom: 20px;
        }
        th, td {
            border: 1px solid #ddd;
            padding: 8px;
            text-align: right;
        }
        th {
            background-color: #4a90d9;
            color: white;
            font-weight: bold;
        }
        td.metric {
            text-align: left;
            font-weight: bold;
        }
        tr:nth-child(even) {
            background-color: #f9f9f9;
        }
        .footer {
            margin-top: 20px;
            font-size: 0.8em;
            color: #888;
            text-align: center;
        }
        "#
}

fn describe(dataset: Dataset<'_>) -> String {
    let mut text = format!("{}, {} events", dataset.source.display(), dataset.log.len());
    if dataset.log.is_sampled() {
        if let Some(original) = dataset.log.original_count() {
            text.push_str(&format!(", sampled from {}", original));
        }
    }
    if dataset.log.is_empty() {
        text.push_str(", nothing to plot");
    }
    text
}

fn page(title: &str, subtitles: &[String], sections: &[String]) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n");
    html.push_str("<html lang=\"en\">\n");
    html.push_str("<head>\n");
    html.push_str("    <meta charset=\"UTF-8\">\n");
    html.push_str(
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    html.push_str(&format!("    <title>{}</title>\n", svg::escape(title)));
    html.push_str("    <style>");
    html.push_str(generate_styles());
    html.push_str("</style>\n");
    html.push_str("</head>\n");
    html.push_str("<body>\n");
    html.push_str(&format!("    <h1>{}</h1>\n", svg::escape(title)));
    for subtitle in subtitles {
        html.push_str(&format!(
            "    <p class=\"subtitle\">{}</p>\n",
            svg::escape(subtitle)
        ));
    }
    for section in sections {
        html.push_str(section);
    }
    html.push_str("    <div class=\"footer\">\n");
    html.push_str("        Generated by fragviz\n");
    html.push_str("    </div>\n");
    html.push_str("</body>\n");
    html.push_str("</html>\n");
    html
}

fn chart_section(svg: String) -> String {
    format!("    <div class=\"chart\">{}</div>\n", svg)
}

/// Full HTML dashboard for a single dataset
pub fn single_dashboard_html(dataset: Dataset<'_>, options: &RenderOptions) -> String {
    let metrics = FragmentationMetrics::from_events(&dataset.log.events, options.stats_window_seconds);
    let stats = DatasetStats::from_metrics(dataset.log, &metrics);
    let datasets = [dataset];

    let sections = vec![
        chart_section(timeline_chart(&datasets)),
        chart_section(rate_chart(&datasets, options.bin_seconds)),
        chart_section(heatmap_chart(
            dataset,
            options.stats_window_seconds,
            DATASET_COLORS[0],
        )),
        chart_section(fragmentation_chart(&datasets, std::slice::from_ref(&metrics))),
        chart_section(migration_rate_chart(&datasets, std::slice::from_ref(&metrics))),
        chart_section(cumulative_migration_chart(
            &datasets,
            std::slice::from_ref(&metrics),
        )),
        "    <h2>Statistics Summary</h2>\n".to_string(),
        stats_table(&datasets, std::slice::from_ref(&stats)),
    ];

    let title = format!("Memory Fragmentation Analysis: {}", dataset.label);
    page(&title, &[describe(dataset)], &sections)
}

/// Full HTML dashboard comparing two datasets
pub fn comparison_dashboard_html(a: Dataset<'_>, b: Dataset<'_>, options: &RenderOptions) -> String {
    let datasets = [a, b];
    let metrics: Vec<FragmentationMetrics> = datasets
        .iter()
        .map(|d| FragmentationMetrics::from_events(&d.log.events, options.stats_window_seconds))
        .collect();
    let stats: Vec<DatasetStats> = datasets
        .iter()
        .zip(&metrics)
        .map(|(d, m)| DatasetStats::from_metrics(d.log, m))
        .collect();

    let sections = vec![
        chart_section(timeline_chart(&datasets)),
        chart_section(rate_chart(&datasets, options.bin_seconds)),
        chart_section(heatmap_chart(a, options.stats_window_seconds, DATASET_COLORS[0])),
        chart_section(heatmap_chart(b, options.stats_window_seconds, DATASET_COLORS[1])),
        chart_section(fragmentation_chart(&datasets, &metrics)),
        chart_section(migration_rate_chart(&datasets, &metrics)),
        chart_section(cumulative_migration_chart(&datasets, &metrics)),
        "    <h2>Statistics Comparison</h2>\n".to_string(),
        stats_table(&datasets, &stats),
    ];

    let subtitles: Vec<String> = datasets
        .iter()
        .map(|d| format!("{}: {}", d.label, describe(*d)))
        .collect();
    page("Memory Fragmentation A/B Comparison", &subtitles, &sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn log() -> EventLog {
        EventLog::new(
            vec![
                json!({"timestamp": 1.0, "event_type": "extfrag", "fragmentation_index": 0.3}),
                json!({"timestamp": 2.0, "event_type": "migration", "nr_migrated": 4}),
                json!({"timestamp": 65.0, "event_type": "compaction", "status": "success"}),
            ],
            Default::default(),
        )
    }

    #[test]
    fn test_default_output_names() {
        assert_eq!(
            default_single_output(Path::new("/tmp/node-a.json"), OutputFormat::Html),
            PathBuf::from("node-a_dashboard.html")
        );
        assert_eq!(
            default_comparison_output(
                Path::new("light.json"),
                Path::new("heavy.json"),
                OutputFormat::Json
            ),
            PathBuf::from("light_vs_heavy_comparison.json")
        );
    }

    #[test]
    fn test_single_dashboard_structure() {
        let log = log();
        let dataset = Dataset {
            label: "node-a",
            source: Path::new("node-a.json"),
            log: &log,
        };
        let html = single_dashboard_html(dataset, &RenderOptions::default());
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("Memory Fragmentation Analysis: node-a"));
        assert!(html.contains("Event Timeline"));
        assert!(html.contains("Event Heatmap"));
        assert!(html.contains("Fragmentation Index"));
        assert!(html.contains("Statistics Summary"));
        assert!(html.contains("Page Migration Activity (60 s windows)"));
        assert!(html.contains("Cumulative Page Migrations"));
        assert!(html.contains("3 events"));
        assert!(html.matches("<svg").count() >= 6);
    }

    #[test]
    fn test_single_dashboard_huge_timestamp() {
        let log = EventLog::new(
            vec![json!({"timestamp": 1e300, "event_type": "extfrag"})],
            Default::default(),
        );
        let dataset = Dataset {
            label: "far",
            source: Path::new("far.json"),
            log: &log,
        };
        let html = single_dashboard_html(dataset, &RenderOptions::default());
        assert!(html.contains("Event Rate"));
        assert!(html.contains("Event Heatmap"));
        assert!(html.contains("No migration events"));
    }

    #[test]
    fn test_migration_charts_plot_both_sides() {
        let a_log = log();
        let b_log = EventLog::new(
            vec![
                json!({"timestamp": 10.0, "event_type": "migration", "nr_migrated": 7}),
                json!({"timestamp": 70.0, "event_type": "migration", "nr_migrated": 9}),
            ],
            Default::default(),
        );
        let datasets = [
            Dataset {
                label: "Light Load",
                source: Path::new("a.json"),
                log: &a_log,
            },
            Dataset {
                label: "Heavy Load",
                source: Path::new("b.json"),
                log: &b_log,
            },
        ];
        let metrics: Vec<FragmentationMetrics> = datasets
            .iter()
            .map(|d| FragmentationMetrics::from_events(&d.log.events, 60.0))
            .collect();

        let rate = migration_rate_chart(&datasets, &metrics);
        assert_eq!(rate.matches("<polyline").count(), 2);
        assert!(rate.contains(DATASET_COLORS[1]));
        assert!(rate.contains("Heavy Load"));

        let cumulative = cumulative_migration_chart(&datasets, &metrics);
        assert!(cumulative.contains("Cumulative Page Migrations"));
        assert!(!cumulative.contains("No migration events"));
    }

    #[test]
    fn test_single_dashboard_escapes_label() {
        let log = log();
        let dataset = Dataset {
            label: "<script>",
            source: Path::new("x.json"),
            log: &log,
        };
        let html = single_dashboard_html(dataset, &RenderOptions::default());
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_comparison_dashboard_with_empty_side() {
        let full = log();
        let empty = EventLog::default();
        let a = Dataset {
            label: "Light Load",
            source: Path::new("a.json"),
            log: &empty,
        };
        let b = Dataset {
            label: "Heavy Load",
            source: Path::new("b.json"),
            log: &full,
        };
        let html = comparison_dashboard_html(a, b, &RenderOptions::default());
        assert!(html.contains("A/B Comparison"));
        assert!(html.contains("Light Load"));
        assert!(html.contains("Heavy Load"));
        assert!(html.contains("nothing to plot"));
        assert!(html.contains("Statistics Comparison"));
    }

    #[test]
    fn test_sampled_note() {
        let mut log = log();
        log.metadata.insert("sampled".to_string(), json!(true));
        log.metadata.insert("original_count".to_string(), json!(900));
        let dataset = Dataset {
            label: "n",
            source: Path::new("n.json"),
            log: &log,
        };
        assert!(describe(dataset).contains("sampled from 900"));
    }

    #[test]
    fn test_summary_json() {
        let log = log();
        let dataset = Dataset {
            label: "n",
            source: Path::new("n.json"),
            log: &log,
        };
        let text = summary_json(&[dataset], &RenderOptions::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["mode"], "single");
        assert_eq!(value["datasets"][0]["stats"]["event_count"], 3);
        assert_eq!(value["datasets"][0]["stats"]["total_migrated_pages"], 4);
    }

    #[test]
    fn test_renderer_writes_output() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("report.html");
        let log = log();
        let options = RenderOptions {
            output: Some(out.clone()),
            ..Default::default()
        };
        let dataset = Dataset {
            label: "n",
            source: Path::new("n.json"),
            log: &log,
        };
        let path = DashboardRenderer::new()
            .render_single(dataset, &options)
            .unwrap();
        assert_eq!(path, out);
        assert!(std::fs::read_to_string(&out).unwrap().contains("<html"));
    }

    #[test]
    fn test_renderer_reports_unwritable_path() {
        let dir = TempDir::new().unwrap();
        let options = RenderOptions {
            output: Some(dir.path().join("missing-dir").join("out.html")),
            ..Default::default()
        };
        let log = log();
        let dataset = Dataset {
            label: "n",
            source: Path::new("n.json"),
            log: &log,
        };
        let err = DashboardRenderer::new()
            .render_single(dataset, &options)
            .unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
    }

    #[test]
    fn test_hex_rgb() {
        assert_eq!(hex_rgb("#1f77b4"), (0x1f, 0x77, 0xb4));
    }
}

//! Presentational charts for single-record predictions.
//!
//! Charts never influence the prediction; they are rendered only after a
//! successful score.

use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fmt::{self, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::CoreError;
use crate::record::ValidatedRecord;

/// Chart name to `data:` URL.
pub type Charts = BTreeMap<String, String>;

pub trait Visualizer: Send + Sync {
    fn render(&self, record: &ValidatedRecord) -> Result<Charts, CoreError>;
}

pub const BAR_CHART: &str = "bar_chart_url";
pub const SCATTER_PLOT: &str = "scatter_plot_url";
pub const LINE_GRAPH: &str = "line_graph_url";
pub const PIE_CHART: &str = "pie_chart_url";

const LABELS: [&str; 4] = ["Targeted Productivity", "SMV", "Over Time", "Idle Time"];
const COLORS: [&str; 4] = ["#1f77b4", "#2ca02c", "#d62728", "#ff7f0e"];

const WIDTH: f64 = 600.0;
const HEIGHT: f64 = 400.0;
const MARGIN: f64 = 50.0;

/// Renders bar, scatter, line and pie charts as base64 SVG.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgChartRenderer;

impl Visualizer for SvgChartRenderer {
    fn render(&self, record: &ValidatedRecord) -> Result<Charts, CoreError> {
        let values = [
            record.targeted_productivity(),
            record.smv_minutes(),
            record.over_time_hours(),
            record.idle_time_minutes(),
        ];

        let charts = [
            (BAR_CHART, bar_chart(&values)),
            (SCATTER_PLOT, point_chart(&values, false)),
            (LINE_GRAPH, point_chart(&values, true)),
            (PIE_CHART, pie_chart(&values)),
        ];

        charts
            .into_iter()
            .map(|(name, svg)| {
                let svg = svg.map_err(|e| {
                    CoreError::Internal(format!("failed to render {name}: {e}"))
                })?;
                Ok((name.to_string(), to_data_url(&svg)))
            })
            .collect()
    }
}

fn to_data_url(svg: &str) -> String {
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}

// ---------------------------------------------------------------------------
// Chart bodies
// ---------------------------------------------------------------------------

fn open_svg(out: &mut String, title: &str) -> fmt::Result {
    write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">"#
    )?;
    write!(
        out,
        r#"<text x="{}" y="25" text-anchor="middle" font-size="16">{title}</text>"#,
        WIDTH / 2.0
    )
}

fn axes(out: &mut String) -> fmt::Result {
    let bottom = HEIGHT - MARGIN;
    write!(
        out,
        r#"<line x1="{MARGIN}" y1="{MARGIN}" x2="{MARGIN}" y2="{bottom}" stroke="black"/><line x1="{MARGIN}" y1="{bottom}" x2="{}" y2="{bottom}" stroke="black"/>"#,
        WIDTH - MARGIN
    )
}

/// Horizontal slot centre and vertical pixel for each value.
fn positions(values: &[f64; 4]) -> [(f64, f64); 4] {
    let max = values.iter().copied().fold(1.0_f64, f64::max);
    let plot_w = WIDTH - 2.0 * MARGIN;
    let plot_h = HEIGHT - 2.0 * MARGIN;
    let slot = plot_w / values.len() as f64;
    std::array::from_fn(|i| {
        let x = MARGIN + slot * (i as f64 + 0.5);
        let y = HEIGHT - MARGIN - plot_h * (values[i] / max);
        (x, y)
    })
}

fn x_labels(out: &mut String, points: &[(f64, f64); 4]) -> fmt::Result {
    for (label, (x, _)) in LABELS.iter().zip(points) {
        write!(
            out,
            r#"<text x="{x:.1}" y="{}" text-anchor="middle" font-size="11">{label}</text>"#,
            HEIGHT - MARGIN + 18.0
        )?;
    }
    Ok(())
}

fn bar_chart(values: &[f64; 4]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    open_svg(&mut out, "Employee Productivity Parameters")?;
    axes(&mut out)?;
    let points = positions(values);
    let bar_w = (WIDTH - 2.0 * MARGIN) / values.len() as f64 * 0.6;
    for ((x, y), color) in points.iter().zip(COLORS) {
        write!(
            out,
            r#"<rect x="{:.1}" y="{y:.1}" width="{bar_w:.1}" height="{:.1}" fill="{color}"/>"#,
            x - bar_w / 2.0,
            HEIGHT - MARGIN - y
        )?;
    }
    x_labels(&mut out, &points)?;
    out.push_str("</svg>");
    Ok(out)
}

fn point_chart(values: &[f64; 4], connect: bool) -> Result<String, fmt::Error> {
    let title = if connect {
        "Line Plot of Employee Parameters"
    } else {
        "Scatter Plot of Employee Parameters"
    };
    let mut out = String::new();
    open_svg(&mut out, title)?;
    axes(&mut out)?;
    let points = positions(values);
    if connect {
        out.push_str(r##"<polyline fill="none" stroke="#1f77b4" stroke-width="2" points=""##);
        for (x, y) in &points {
            write!(out, "{x:.1},{y:.1} ")?;
        }
        out.push_str(r#""/>"#);
    }
    for (x, y) in &points {
        write!(
            out,
            r##"<circle cx="{x:.1}" cy="{y:.1}" r="7" fill="#1f77b4" fill-opacity="0.7"/>"##
        )?;
    }
    x_labels(&mut out, &points)?;
    out.push_str("</svg>");
    Ok(out)
}

fn pie_chart(values: &[f64; 4]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    open_svg(&mut out, "Distribution of Employee Parameters")?;
    let (cx, cy, r) = (WIDTH / 2.0, HEIGHT / 2.0 + 10.0, 140.0);
    let total: f64 = values.iter().sum();

    if total <= 0.0 {
        write!(
            out,
            r##"<circle cx="{cx}" cy="{cy}" r="{r}" fill="#dddddd"/><text x="{cx}" y="{cy}" text-anchor="middle">No data</text>"##
        )?;
        out.push_str("</svg>");
        return Ok(out);
    }

    // Start at twelve o'clock, clockwise.
    let mut angle = -PI / 2.0;
    for ((value, color), label) in values.iter().zip(COLORS).zip(LABELS) {
        if *value <= 0.0 {
            continue;
        }
        let share = value / total;
        if share >= 1.0 {
            write!(out, r#"<circle cx="{cx}" cy="{cy}" r="{r}" fill="{color}"/>"#)?;
        } else {
            let end = angle + share * 2.0 * PI;
            let large_arc = u8::from(share > 0.5);
            write!(
                out,
                r#"<path d="M {cx} {cy} L {:.2} {:.2} A {r} {r} 0 {large_arc} 1 {:.2} {:.2} Z" fill="{color}"/>"#,
                cx + r * angle.cos(),
                cy + r * angle.sin(),
                cx + r * end.cos(),
                cy + r * end.sin()
            )?;
            angle = end;
        }
        let mid = angle - share * PI;
        write!(
            out,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="11">{label} {:.1}%</text>"#,
            cx + (r + 30.0) * mid.cos(),
            cy + (r + 30.0) * mid.sin(),
            share * 100.0
        )?;
    }
    out.push_str("</svg>");
    Ok(out)
}

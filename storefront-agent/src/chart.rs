//! Chart policy and SVG rendering.
//!
//! A result is chartable when it has a label column and a numeric column
//! and at least one row. Date labels produce a line chart over time;
//! anything else produces a bar chart of the first [`MAX_BARS`] rows.

use crate::table::{Cell, ResultTable};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use plotters::prelude::*;
use std::path::Path;
use storefront_error::{Error, Result};

/// Bars drawn at most; later rows are left out of the chart
pub const MAX_BARS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
        }
    }
}

/// What to draw, decided from the result table
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPlan {
    pub kind: ChartKind,
    pub x_label: String,
    pub y_label: String,
    /// Category labels (bar) or date strings (line), aligned with `ys`
    pub labels: Vec<String>,
    /// Days since `origin` (line) or bar index (bar)
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub origin: Option<NaiveDateTime>,
}

/// Decide whether and how to chart `table`.
pub fn plan_chart(table: &ResultTable) -> Option<ChartPlan> {
    if table.columns.len() < 2 || table.is_empty() {
        return None;
    }

    let x_idx = (0..table.columns.len())
        .find(|&i| !table.is_numeric_column(i))
        .unwrap_or(0);
    let y_idx = (0..table.columns.len()).find(|&i| i != x_idx && table.is_numeric_column(i))?;

    let points: Vec<(String, f64)> = table
        .rows
        .iter()
        .filter_map(|row| {
            let y = row.get(y_idx)?.as_f64()?;
            let label = match row.get(x_idx)? {
                Cell::Null => return None,
                cell => cell.to_string(),
            };
            Some((label, y))
        })
        .collect();
    if points.is_empty() {
        return None;
    }

    let x_label = table.columns[x_idx].clone();
    let y_label = table.columns[y_idx].clone();

    let dates: Option<Vec<NaiveDateTime>> = points.iter().map(|(label, _)| parse_when(label)).collect();
    match dates {
        Some(dates) => {
            let mut series: Vec<(NaiveDateTime, String, f64)> = dates
                .into_iter()
                .zip(points)
                .map(|(when, (label, y))| (when, label, y))
                .collect();
            series.sort_by_key(|(when, _, _)| *when);
            let origin = series[0].0;

            Some(ChartPlan {
                kind: ChartKind::Line,
                x_label,
                y_label,
                xs: series
                    .iter()
                    .map(|(when, _, _)| (*when - origin).num_seconds() as f64 / 86_400.0)
                    .collect(),
                ys: series.iter().map(|(_, _, y)| *y).collect(),
                labels: series.into_iter().map(|(_, label, _)| label).collect(),
                origin: Some(origin),
            })
        }
        None => {
            let points: Vec<_> = points.into_iter().take(MAX_BARS).collect();
            Some(ChartPlan {
                kind: ChartKind::Bar,
                x_label,
                y_label,
                xs: (0..points.len()).map(|i| i as f64).collect(),
                ys: points.iter().map(|(_, y)| *y).collect(),
                labels: points.into_iter().map(|(label, _)| label).collect(),
                origin: None,
            })
        }
    }
}

fn parse_when(label: &str) -> Option<NaiveDateTime> {
    let label = label.trim();
    if let Ok(date) = NaiveDate::parse_from_str(label, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(label, fmt).ok())
}

fn chart_err<E: std::fmt::Display>(err: E) -> Error {
    Error::chart_failed(err.to_string()).with_operation("chart::render_svg")
}

/// Render `plan` to an SVG file.
pub fn render_svg(plan: &ChartPlan, title: &str, path: &Path, size: (u32, u32)) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::from(e).with_operation("chart::render_svg"))?;
    }

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let (y_min, y_max) = y_bounds(&plan.ys);
    let x_range = match plan.kind {
        ChartKind::Bar => -0.5..(plan.xs.len() as f64 - 0.5),
        ChartKind::Line => {
            let last = plan.xs.last().copied().unwrap_or(0.0);
            if last > 0.0 {
                0.0..last
            } else {
                -0.5..0.5
            }
        }
    };

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 20).into_font())
        .margin(12)
        .x_label_area_size(48)
        .y_label_area_size(72)
        .build_cartesian_2d(x_range, y_min..y_max)
        .map_err(chart_err)?;

    let labels = &plan.labels;
    let origin = plan.origin;
    let x_formatter = |x: &f64| -> String {
        match origin {
            Some(origin) => (origin + Duration::seconds((x * 86_400.0).round() as i64))
                .format("%Y-%m-%d")
                .to_string(),
            None => {
                let idx = x.round();
                if (x - idx).abs() > 0.01 || idx < 0.0 {
                    return String::new();
                }
                labels
                    .get(idx as usize)
                    .map(|l| short_label(l))
                    .unwrap_or_default()
            }
        }
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(match plan.kind {
            ChartKind::Bar => plan.labels.len(),
            ChartKind::Line => plan.labels.len().min(8),
        })
        .x_label_formatter(&x_formatter)
        .x_desc(plan.x_label.as_str())
        .y_desc(plan.y_label.as_str())
        .label_style(("sans-serif", 11).into_font())
        .draw()
        .map_err(chart_err)?;

    match plan.kind {
        ChartKind::Line => {
            let series = plan.xs.iter().copied().zip(plan.ys.iter().copied());
            chart.draw_series(LineSeries::new(series, &BLUE)).map_err(chart_err)?;
            chart
                .draw_series(
                    plan.xs
                        .iter()
                        .zip(&plan.ys)
                        .map(|(x, y)| Circle::new((*x, *y), 3, BLUE.filled())),
                )
                .map_err(chart_err)?;
        }
        ChartKind::Bar => {
            chart
                .draw_series(plan.xs.iter().zip(&plan.ys).map(|(x, y)| {
                    Rectangle::new([(x - 0.35, 0.0), (x + 0.35, *y)], BLUE.mix(0.7).filled())
                }))
                .map_err(chart_err)?;
        }
    }

    root.present().map_err(chart_err)?;
    Ok(())
}

fn y_bounds(ys: &[f64]) -> (f64, f64) {
    let max = ys.iter().copied().fold(f64::MIN, f64::max);
    let min = ys.iter().copied().fold(f64::MAX, f64::min);
    let low = min.min(0.0);
    let high = if max > low { max * 1.1 } else { low + 1.0 };
    (low, high.max(low + f64::EPSILON))
}

fn short_label(label: &str) -> String {
    if label.chars().count() > 14 {
        let cut: String = label.chars().take(13).collect();
        format!("{}.", cut)
    } else {
        label.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn table(columns: &[&str], rows: Vec<Vec<Cell>>) -> ResultTable {
        ResultTable {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
            truncated: false,
        }
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.into())
    }

    #[test]
    fn test_dates_make_sorted_line() {
        let t = table(
            &["Date", "Revenue"],
            vec![
                vec![text("2024-03-03"), Cell::Real(30.0)],
                vec![text("2024-03-01"), Cell::Real(10.0)],
                vec![text("2024-03-02"), Cell::Integer(20)],
            ],
        );
        let plan = plan_chart(&t).unwrap();
        assert_eq!(plan.kind, ChartKind::Line);
        assert_eq!(plan.labels, vec!["2024-03-01", "2024-03-02", "2024-03-03"]);
        assert_eq!(plan.xs, vec![0.0, 1.0, 2.0]);
        assert_eq!(plan.ys, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_categories_make_bar_with_label_first() {
        // Measure first, label second: the text column still becomes the axis
        let t = table(
            &["Revenue", "StoreID"],
            vec![
                vec![Cell::Real(5.0), text("STORE10")],
                vec![Cell::Real(7.5), text("STORE11")],
            ],
        );
        let plan = plan_chart(&t).unwrap();
        assert_eq!(plan.kind, ChartKind::Bar);
        assert_eq!(plan.x_label, "StoreID");
        assert_eq!(plan.y_label, "Revenue");
        assert_eq!(plan.labels, vec!["STORE10", "STORE11"]);
    }

    #[test]
    fn test_bar_is_capped() {
        let rows = (0..45).map(|i| vec![text(&format!("P{}", i)), Cell::Integer(i)]).collect();
        let plan = plan_chart(&table(&["Product", "Units"], rows)).unwrap();
        assert_eq!(plan.ys.len(), MAX_BARS);
    }

    #[test]
    fn test_not_chartable() {
        assert!(plan_chart(&table(&["Revenue"], vec![vec![Cell::Real(1.0)]])).is_none());
        assert!(plan_chart(&table(&["Store", "Region"], vec![vec![text("a"), text("b")]])).is_none());
        assert!(plan_chart(&ResultTable::new(vec!["Date".into(), "Revenue".into()])).is_none());
    }

    #[test]
    fn test_render_line_and_bar() {
        let dir = TempDir::new().unwrap();

        let line = plan_chart(&table(
            &["Date", "Revenue"],
            vec![
                vec![text("2024-03-01"), Cell::Real(10.0)],
                vec![text("2024-03-05"), Cell::Real(25.0)],
            ],
        ))
        .unwrap();
        let path = dir.path().join("line.svg");
        render_svg(&line, "Revenue trend", &path, (640, 320)).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Revenue trend"));

        let bar = plan_chart(&table(
            &["Store", "Revenue"],
            vec![vec![text("STORE10"), Cell::Real(3.0)]],
        ))
        .unwrap();
        let path = dir.path().join("charts/bar.svg");
        render_svg(&bar, "By store", &path, (640, 320)).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_y_bounds() {
        assert_eq!(y_bounds(&[0.0]), (0.0, 1.0));
        let (low, high) = y_bounds(&[-5.0, 10.0]);
        assert_eq!(low, -5.0);
        assert!(high > 10.0);
    }
}

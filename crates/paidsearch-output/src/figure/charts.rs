//! The two diagnostic time-series charts.

use super::FigureConfig;
use super::axis::Axis;
use super::canvas::{Anchor, Color, LineStyle, SvgCanvas, TextStyle};
use crate::error::{OutputError, Result};
use chrono::{Datelike, NaiveDate};
use paidsearch_data::DailyGroupMeans;
use tracing::warn;

/// Line colour of the control series.
pub const CONTROL_COLOR: Color = Color::rgb(31, 119, 180);
/// Line colour of the treated series.
pub const TREATED_COLOR: Color = Color::rgb(255, 127, 14);
/// Colour of the intervention marker.
pub const MARKER_COLOR: Color = Color::rgb(90, 90, 90);

struct Series {
    label: Option<&'static str>,
    color: Color,
    points: Vec<(NaiveDate, Option<f64>)>,
}

struct Chart<'a> {
    title: &'a str,
    y_label: &'a str,
    series: Vec<Series>,
}

const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 44.0;
const MARGIN_BOTTOM: f64 = 56.0;

fn day_value(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

impl Chart<'_> {
    fn render(&self, config: &FigureConfig) -> Result<String> {
        let dates = self
            .series
            .iter()
            .flat_map(|s| s.points.iter().map(|(d, _)| *d));
        let (first, last) = dates.fold(None, |acc: Option<(NaiveDate, NaiveDate)>, d| match acc {
            None => Some((d, d)),
            Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
        })
        .ok_or_else(|| OutputError::EmptySeries(self.title.to_string()))?;

        let values = self
            .series
            .iter()
            .flat_map(|s| s.points.iter().filter_map(|(_, v)| *v));
        let (y_min, y_max) = match values.fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        }) {
            Some(range) => range,
            None => {
                warn!(title = self.title, "no values to plot, drawing empty axes");
                (0.0, 1.0)
            }
        };

        let x_axis = Axis::dates(first, last, 6);
        let y_axis = Axis::linear(y_min, y_max, 6);

        let mut canvas = SvgCanvas::new(config.width, config.height);
        let left = MARGIN_LEFT;
        let right = canvas.width() - MARGIN_RIGHT;
        let top = MARGIN_TOP;
        let bottom = canvas.height() - MARGIN_BOTTOM;

        // Grid and ticks
        let tick_style = TextStyle::new(11.0, Anchor::Middle);
        for (v, label) in x_axis.ticks.iter().zip(&x_axis.labels) {
            let px = x_axis.to_pixel(*v, left, right);
            canvas.line(px, top, px, bottom, LineStyle::solid(Color::GRID, 0.8));
            canvas.line(px, bottom, px, bottom + 5.0, LineStyle::solid(Color::BLACK, 1.0));
            canvas.text(px, bottom + 18.0, label.as_str(), tick_style);
        }
        let y_tick_style = TextStyle::new(11.0, Anchor::End);
        for (v, label) in y_axis.ticks.iter().zip(&y_axis.labels) {
            let py = y_axis.to_pixel(*v, bottom, top);
            canvas.line(left, py, right, py, LineStyle::solid(Color::GRID, 0.8));
            canvas.line(left - 5.0, py, left, py, LineStyle::solid(Color::BLACK, 1.0));
            canvas.text(left - 8.0, py + 4.0, label.as_str(), y_tick_style);
        }
        canvas.rect(left, top, right - left, bottom - top, Color::BLACK);

        // Labels
        canvas.text(
            (left + right) / 2.0,
            top - 16.0,
            self.title,
            TextStyle::new(15.0, Anchor::Middle),
        );
        canvas.text(
            (left + right) / 2.0,
            canvas.height() - 14.0,
            "Date",
            TextStyle::new(12.0, Anchor::Middle),
        );
        canvas.text(
            18.0,
            (top + bottom) / 2.0,
            self.y_label,
            TextStyle::new(12.0, Anchor::Middle).rotated(-90.0),
        );

        // Series, broken where a value is missing
        for series in &self.series {
            let mut segment = Vec::new();
            for (date, value) in &series.points {
                match value {
                    Some(v) => segment.push((
                        x_axis.to_pixel(day_value(*date), left, right),
                        y_axis.to_pixel(*v, bottom, top),
                    )),
                    None => canvas.polyline(
                        std::mem::take(&mut segment),
                        LineStyle::solid(series.color, 1.5),
                    ),
                }
            }
            canvas.polyline(segment, LineStyle::solid(series.color, 1.5));
        }

        // Intervention marker
        let marker = day_value(config.intervention_date);
        if x_axis.contains(marker) {
            let px = x_axis.to_pixel(marker, left, right);
            canvas.line(px, top, px, bottom, LineStyle::dashed(MARKER_COLOR, 1.2));
        }

        // Legend
        let labelled: Vec<&Series> = self.series.iter().filter(|s| s.label.is_some()).collect();
        for (i, series) in labelled.iter().enumerate() {
            let y = top + 18.0 + 18.0 * i as f64;
            let x = left + 14.0;
            canvas.line(x, y - 4.0, x + 24.0, y - 4.0, LineStyle::solid(series.color, 2.0));
            canvas.text(
                x + 30.0,
                y,
                series.label.unwrap_or_default(),
                TextStyle::new(11.0, Anchor::Start),
            );
        }

        Ok(canvas.finish_svg())
    }
}

/// Average revenue of each group over time.
pub fn revenue_by_group_svg(daily: &[DailyGroupMeans], config: &FigureConfig) -> Result<String> {
    Chart {
        title: "Average Revenue by Group Over Time",
        y_label: "Revenue",
        series: vec![
            Series {
                label: Some("Control (search stays on)"),
                color: CONTROL_COLOR,
                points: daily.iter().map(|d| (d.date, d.control_revenue)).collect(),
            },
            Series {
                label: Some("Treatment (search goes off)"),
                color: TREATED_COLOR,
                points: daily.iter().map(|d| (d.date, d.treated_revenue)).collect(),
            },
        ],
    }
    .render(config)
}

/// Control minus treated mean log revenue over time.
pub fn log_revenue_gap_svg(daily: &[DailyGroupMeans], config: &FigureConfig) -> Result<String> {
    Chart {
        title: "Log Revenue Difference Over Time",
        y_label: "log(rev_control) - log(rev_treat)",
        series: vec![Series {
            label: None,
            color: CONTROL_COLOR,
            points: daily.iter().map(|d| (d.date, d.log_gap())).collect(),
        }],
    }
    .render(config)
}

//! Plotters-powered line chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - less manual work for ticks/labels
//!
//! Plotters output is rendered into the Ratatui buffer using
//! `plotters-ratatui-backend`. Time series are plotted against the day number
//! (days from the common era), so date tick labels need no extra state.

use chrono::{Datelike, NaiveDate};
use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::domain::Observation;

pub const PRIMARY: RGBColor = RGBColor(0, 255, 255);
pub const SECONDARY: RGBColor = RGBColor(255, 215, 0);
pub const HIGHLIGHT: RGBColor = RGBColor(255, 80, 80);

/// One line of a chart, in plot coordinates.
#[derive(Debug, Clone)]
pub struct ChartLine {
    pub points: Vec<(f64, f64)>,
    pub color: RGBColor,
}

impl ChartLine {
    pub fn new(points: Vec<(f64, f64)>, color: RGBColor) -> Self {
        Self { points, color }
    }

    /// A dated series; missing values and unparseable dates are skipped.
    pub fn from_observations(series: &[Observation], color: RGBColor) -> Self {
        Self::new(date_points(series), color)
    }
}

/// A render-only chart description. Bounds are computed before rendering.
pub struct SeriesChart<'a> {
    pub lines: &'a [ChartLine],
    /// Points drawn as coloured dots on top of the lines.
    pub markers: &'a [(f64, f64)],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl Widget for SeriesChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        // Plotters may fail to build a chart in a tiny area; show a hint instead.
        if area.width < 20 || area.height < 8 {
            buf.set_stringn(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                area.width as usize,
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Mesh lines are noise at terminal resolution.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for line in self.lines {
                chart.draw_series(LineSeries::new(line.points.iter().copied(), &line.color))?;
            }

            // `Circle` radii are mis-scaled by the ratatui backend; a Pixel reads
            // fine as a dot.
            chart.draw_series(self.markers.iter().map(|&(x, y)| Pixel::new((x, y), HIGHLIGHT)))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Formatting and labels for one chart panel.
#[derive(Debug, Clone, Copy)]
pub struct Axes<'a> {
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Axes<'a> {
    pub fn dated(y_label: &'a str) -> Self {
        Self {
            x_label: "date",
            y_label,
            fmt_x: fmt_day_axis,
            fmt_y: fmt_value_axis,
        }
    }
}

/// Draw a titled chart panel: border, Plotters chart and outer tick labels.
/// Shows `empty_message` when there is nothing to plot.
pub fn draw_chart(
    frame: &mut Frame<'_>,
    area: Rect,
    title: &str,
    lines: &[ChartLine],
    markers: &[(f64, f64)],
    axes: Axes<'_>,
    empty_message: &str,
) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    let mut all: Vec<&[(f64, f64)]> = lines.iter().map(|l| l.points.as_slice()).collect();
    all.push(markers);
    let Some((x_bounds, y_bounds)) = bounds(&all) else {
        let msg = Paragraph::new(empty_message.to_string()).style(Style::default().fg(Color::Yellow));
        frame.render_widget(msg, inner);
        return;
    };

    let (chart_rect, insets) = chart_layout(inner);
    let widget = SeriesChart {
        lines,
        markers,
        x_bounds,
        y_bounds,
        x_label: axes.x_label,
        y_label: axes.y_label,
        fmt_x: axes.fmt_x,
        fmt_y: axes.fmt_y,
    };
    frame.render_widget(widget, chart_rect);
    if let Some(insets) = insets {
        draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds, axes);
    }
}

/// `(day number, value)` pairs for the plottable observations.
pub fn date_points(series: &[Observation]) -> Vec<(f64, f64)> {
    series
        .iter()
        .filter_map(|obs| {
            let value = obs.value.filter(|v| v.is_finite())?;
            let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d").ok()?;
            Some((date.num_days_from_ce() as f64, value))
        })
        .collect()
}

/// Chart bounds covering every point, with 5% vertical padding. A single x
/// (or y) value is widened so the chart can still be built.
pub fn bounds(series: &[&[(f64, f64)]]) -> Option<([f64; 2], [f64; 2])> {
    let mut points = series.iter().flat_map(|s| s.iter()).filter(|(x, y)| x.is_finite() && y.is_finite());
    let &(x, y) = points.next()?;
    let (mut x_min, mut x_max, mut y_min, mut y_max) = (x, x, y, y);
    for &(x, y) in points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if x_max <= x_min {
        x_min -= 1.0;
        x_max += 1.0;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-6);
    let (y_min, y_max) = if y_max > y_min {
        (y_min - pad, y_max + pad)
    } else {
        (y_min - 1.0, y_max + 1.0)
    };
    Some(([x_min, x_max], [y_min, y_max]))
}

pub fn fmt_day_axis(v: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
        .map(|d| d.format("%b %y").to_string())
        .unwrap_or_default()
}

pub fn fmt_value_axis(v: f64) -> String {
    if v.abs() >= 10_000.0 {
        format!("{:.0}k", v / 1_000.0)
    } else if v.abs() >= 100.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    axes: Axes<'_>,
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = (axes.fmt_x)(x_val);
        let label_len = label.chars().count() as u16;
        let start = x.saturating_sub(label_len / 2).max(inner.x);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 || start + label_len > inner.x + inner.width {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = (axes.fmt_y)(y_val);
        let label_len = label.chars().count() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new(axes.x_label.to_string())
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new(axes.y_label.to_string())
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_chart() -> SeriesChart<'static> {
        SeriesChart {
            lines: &[],
            markers: &[],
            x_bounds: [0.0, 1.0],
            y_bounds: [0.0, 1.0],
            x_label: "",
            y_label: "",
            fmt_x: fmt_value_axis,
            fmt_y: fmt_value_axis,
        }
    }

    #[test]
    fn degenerate_areas_render_without_panicking() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 30, 4));

        // Zero height on the buffer's bottom edge.
        empty_chart().render(Rect::new(0, 4, 30, 0), &mut buf);

        empty_chart().render(Rect::new(0, 0, 6, 4), &mut buf);
        assert_eq!(buf[(0, 0)].symbol(), "C");
        assert_eq!(buf[(6, 0)].symbol(), " ");
    }

    #[test]
    fn date_points_skip_gaps_and_bad_dates() {
        let series = vec![
            Observation::new("2024-01-01", 1.0),
            Observation { date: "2024-02-01".into(), value: None },
            Observation::new("not a date", 2.0),
            Observation::new("2024-01-02", 3.0),
        ];
        let points = date_points(&series);
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].0 - points[0].0, 1.0);
        assert_eq!(fmt_day_axis(points[0].0), "Jan 24");
    }

    #[test]
    fn bounds_pad_values_and_widen_flat_axes() {
        let a = [(10.0, 2.0), (20.0, 4.0)];
        let (x, y) = bounds(&[&a[..]]).unwrap();
        assert_eq!(x, [10.0, 20.0]);
        assert!((y[0] - 1.9).abs() < 1e-9 && (y[1] - 4.1).abs() < 1e-9);

        let single = [(5.0, 3.0)];
        let (x, y) = bounds(&[&single[..], &[]]).unwrap();
        assert_eq!(x, [4.0, 6.0]);
        assert_eq!(y, [2.0, 4.0]);

        assert!(bounds(&[]).is_none());
    }

    #[test]
    fn value_axis_labels_shrink_large_numbers() {
        assert_eq!(fmt_value_axis(5.24), "5.2");
        assert_eq!(fmt_value_axis(310.4), "310");
        assert_eq!(fmt_value_axis(22_400.0), "22k");
    }
}

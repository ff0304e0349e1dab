//! ASCII plotting for terminal output.
//!
//! A fixed-size character grid: the series is drawn as a `-` line joined with
//! integer line drawing, and each observation is marked with `o` when the
//! series is sparse enough for markers to be readable.
//!
//! Output is deterministic, which keeps it testable.

use chrono::NaiveDate;

use crate::domain::Observation;

/// Render `series` (ascending by date) into a `width` x `height` grid.
pub fn render_series_plot(title: &str, series: &[Observation], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let points = plot_points(series);
    let mut out = String::new();
    if points.is_empty() {
        out.push_str(&format!("{title}: no data\n"));
        return out;
    }

    let (x_min, x_max) = span(points.iter().map(|p| p.0)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = span(points.iter().map(|p| p.1)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    let cells: Vec<(usize, usize)> = points
        .iter()
        .map(|&(x, y)| (map_x(x, x_min, x_max, width), map_y(y, y_min, y_max, height)))
        .collect();

    for pair in cells.windows(2) {
        draw_line(&mut grid, pair[0], pair[1], '-');
    }
    if cells.len() == 1 || cells.len() <= width / 2 {
        for &(x, y) in &cells {
            grid[y][x] = 'o';
        }
    }

    let first = series.iter().find(|o| o.value.is_some()).map(|o| o.date.as_str()).unwrap_or("");
    let last = series.iter().rev().find(|o| o.value.is_some()).map(|o| o.date.as_str()).unwrap_or("");
    out.push_str(&format!("{title}: {first} .. {last} | y=[{y_min:.2}, {y_max:.2}]\n"));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

/// `(x, y)` pairs: x is days since the first date, or the index when a date
/// does not parse.
fn plot_points(series: &[Observation]) -> Vec<(f64, f64)> {
    let parsed: Vec<Option<NaiveDate>> = series
        .iter()
        .map(|o| NaiveDate::parse_from_str(&o.date, "%Y-%m-%d").ok())
        .collect();
    let all_dates = parsed.iter().all(Option::is_some);
    let origin = parsed.iter().flatten().next().copied();

    series
        .iter()
        .zip(parsed)
        .enumerate()
        .filter_map(|(i, (obs, date))| {
            let y = obs.value.filter(|v| v.is_finite())?;
            let x = match (all_dates, date, origin) {
                (true, Some(d), Some(o)) => (d - o).num_days() as f64,
                _ => i as f64,
            };
            Some((x, y))
        })
        .collect()
}

fn span(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    (min.is_finite() && max.is_finite()).then_some((min, max))
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = if span > 0.0 { span * frac } else { min.abs().max(1.0) * frac };
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    if x_max <= x_min {
        return 0;
    }
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // Row 0 is the top of the plot.
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham).
fn draw_line(grid: &mut [Vec<char>], from: (usize, usize), to: (usize, usize), ch: char) {
    let (mut x0, mut y0) = (from.0 as isize, from.1 as isize);
    let (x1, y1) = (to.0 as isize, to.1 as isize);

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if let Some(cell) = grid
            .get_mut(y0 as usize)
            .and_then(|row| row.get_mut(x0 as usize))
        {
            *cell = ch;
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

//! Period-over-period transforms on an ordered series.
//!
//! The input is assumed sorted by date ascending (the collaborator returns it
//! that way). Output points carry the date of the later observation.

use crate::domain::Observation;

/// Lag for quarter-over-quarter change on quarterly data.
pub const QOQ_LAG: usize = 1;
/// Lag for year-over-year change on monthly data.
pub const YOY_LAG: usize = 12;

/// Percent change between `series[i]` and `series[i - lag]`.
///
/// Pairs with a missing/non-finite value or a zero denominator are skipped.
pub fn period_change(series: &[Observation], lag: usize) -> Vec<Observation> {
    if lag == 0 || series.len() <= lag {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(series.len() - lag);
    for i in lag..series.len() {
        let (Some(current), Some(previous)) = (finite(&series[i]), finite(&series[i - lag])) else {
            continue;
        };
        if previous == 0.0 {
            continue;
        }
        out.push(Observation::new(
            series[i].date.clone(),
            (current - previous) / previous * 100.0,
        ));
    }
    out
}

/// Quarter-over-quarter percent change.
pub fn quarter_over_quarter(series: &[Observation]) -> Vec<Observation> {
    period_change(series, QOQ_LAG)
}

/// Year-over-year percent change on monthly data.
pub fn year_over_year(series: &[Observation]) -> Vec<Observation> {
    period_change(series, YOY_LAG)
}

/// Absolute change from the previous observation (e.g. payroll gains).
pub fn absolute_change(series: &[Observation]) -> Vec<Observation> {
    series
        .windows(2)
        .filter_map(|pair| {
            let previous = finite(&pair[0])?;
            let current = finite(&pair[1])?;
            Some(Observation::new(pair[1].date.clone(), current - previous))
        })
        .collect()
}

fn finite(obs: &Observation) -> Option<f64> {
    obs.value.filter(|v| v.is_finite())
}

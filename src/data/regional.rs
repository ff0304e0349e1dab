//! State-level data for the regional map.
//!
//! Lookups go through a `latest` closure (series id -> newest observation) so
//! the fan-out and fallback rules can be exercised without a network.

use chrono::NaiveDate;
use rand::Rng;
use rayon::prelude::*;

use crate::data::catalog::{STATES, alternative_series_id, state_name, state_series_id};
use crate::data::fred::Lookup;
use crate::domain::{Observation, RegionalIndicator, RegionalSnapshot, StateDetail, StateMetric, StateRecord};
use crate::error::AppError;
use crate::report::format::format_currency;

/// National median sales price used when FRED has no MSPUS observation.
pub const FALLBACK_NATIONAL_HOUSE_PRICE: f64 = 350_000.0;

const SIMULATED_NOTE: &str = "Simulated data for demonstration purposes";

pub type LatestResult = Result<Lookup<Option<Observation>>, AppError>;

/// Latest value of `indicator` for every state, in `STATES` order.
///
/// A state whose series is missing (after trying the alternative id) or whose
/// request fails gets a record with no value, date or overview. House prices
/// are not published per state in a comparable form, so MSPUS is the national
/// median scaled by a random factor per state.
pub fn regional_snapshot<F>(
    indicator: RegionalIndicator,
    today: NaiveDate,
    rng: &mut impl Rng,
    latest: F,
) -> RegionalSnapshot
where
    F: Fn(&str) -> LatestResult + Sync,
{
    let states = match indicator {
        RegionalIndicator::Mspus => simulated_house_prices(today, rng, &latest),
        _ => STATES
            .par_iter()
            .map(|(code, name)| fetch_state_record(indicator, code, name, &latest))
            .collect(),
    };

    RegionalSnapshot {
        indicator: indicator.id().to_string(),
        name: indicator.display_name().to_string(),
        units: indicator.units().to_string(),
        states,
    }
}

fn simulated_house_prices<F>(today: NaiveDate, rng: &mut impl Rng, latest: &F) -> Vec<StateRecord>
where
    F: Fn(&str) -> LatestResult,
{
    let (national, date) = match latest("MSPUS") {
        Ok(Lookup::Found(Some(Observation { date, value: Some(v) }))) => (v, date),
        Ok(_) => (FALLBACK_NATIONAL_HOUSE_PRICE, today.to_string()),
        Err(e) => {
            tracing::warn!("Error fetching national house price data: {}", e);
            (FALLBACK_NATIONAL_HOUSE_PRICE, today.to_string())
        }
    };

    STATES
        .iter()
        .map(|(code, name)| {
            let value = (national * rng.gen_range(0.7..1.5)).round();
            StateRecord {
                code: code.to_string(),
                name: name.to_string(),
                value: Some(value),
                date: Some(date.clone()),
                overview: Some(state_overview(name, Some(value), RegionalIndicator::Mspus)),
            }
        })
        .collect()
}

fn fetch_state_record<F>(indicator: RegionalIndicator, code: &str, name: &str, latest: &F) -> StateRecord
where
    F: Fn(&str) -> LatestResult,
{
    let empty = StateRecord {
        code: code.to_string(),
        name: name.to_string(),
        value: None,
        date: None,
        overview: None,
    };

    match latest_with_alternative(indicator, code, latest) {
        Ok(Lookup::Found(Some(obs))) => StateRecord {
            overview: Some(state_overview(name, obs.value, indicator)),
            value: obs.value,
            date: Some(obs.date),
            ..empty
        },
        Ok(_) => empty,
        Err(e) => {
            tracing::warn!("Error fetching data for {}: {}", code, e);
            empty
        }
    }
}

fn latest_with_alternative<F>(indicator: RegionalIndicator, code: &str, latest: &F) -> LatestResult
where
    F: Fn(&str) -> LatestResult,
{
    let pattern = indicator.series_pattern();
    match latest(&state_series_id(pattern, code))? {
        Lookup::NotFound => latest(&alternative_series_id(pattern, code)),
        found => Ok(found),
    }
}

/// Detail panel for one state: latest value, extra metrics and an overview.
pub fn state_detail<F>(
    indicator: RegionalIndicator,
    state_code: &str,
    today: NaiveDate,
    rng: &mut impl Rng,
    latest: F,
) -> Result<StateDetail, AppError>
where
    F: Fn(&str) -> LatestResult,
{
    let code = state_code.to_ascii_uppercase();
    let name = state_name(&code)
        .ok_or_else(|| AppError::usage(format!("Invalid state code: {state_code}")))?;

    let lookup = latest_with_alternative(indicator, &code, &latest)
        .map_err(|e| AppError::data(format!("Error fetching data for {code}: {e}")))?;

    let (value, date, note) = match lookup {
        Lookup::Found(Some(obs)) => (obs.value, Some(obs.date), None),
        Lookup::Found(None) => {
            return Err(AppError::data(format!("No data available for {code}")));
        }
        Lookup::NotFound if indicator == RegionalIndicator::Mspus => {
            let value = (FALLBACK_NATIONAL_HOUSE_PRICE * rng.gen_range(0.7..1.5)).round();
            (Some(value), Some(today.to_string()), Some(SIMULATED_NOTE.to_string()))
        }
        Lookup::NotFound => {
            return Err(AppError::data(format!("FRED series for {code} not found.")));
        }
    };

    Ok(StateDetail {
        additional_metrics: additional_metrics(&code, today, rng, &latest),
        overview: Some(state_overview(name, value, indicator)),
        code,
        name: name.to_string(),
        indicator: indicator.id().to_string(),
        indicator_name: indicator.display_name().to_string(),
        value,
        date,
        note,
    })
}

#[derive(Clone, Copy)]
enum MetricFormat {
    Currency,
    Percent,
}

const ADDITIONAL_METRICS: [(&str, &str, &str, MetricFormat); 2] = [
    ("GDP", "Gross State Product", "RGSP{state_code}", MetricFormat::Currency),
    ("POPGROWTH", "Population Growth", "SPPOP{state_code}", MetricFormat::Percent),
];

fn additional_metrics<F>(code: &str, today: NaiveDate, rng: &mut impl Rng, latest: &F) -> Vec<StateMetric>
where
    F: Fn(&str) -> LatestResult,
{
    let mut metrics = Vec::new();
    for (id, name, pattern, format) in ADDITIONAL_METRICS {
        let metric = |value: Option<f64>, formatted: Option<String>, date: String, note: Option<&str>| StateMetric {
            id: id.to_string(),
            name: name.to_string(),
            value,
            formatted_value: formatted,
            date: Some(date),
            note: note.map(str::to_string),
        };

        match latest(&state_series_id(pattern, code)) {
            Ok(Lookup::NotFound) => {
                let (value, formatted) = match format {
                    MetricFormat::Currency => {
                        let v = rng.gen_range(200_000.0..2_000_000.0);
                        (v, format!("{} million", format_currency(Some(v), 0)))
                    }
                    MetricFormat::Percent => {
                        let v = rng.gen_range(-0.5..2.0);
                        (v, format!("{v:.1}%"))
                    }
                };
                metrics.push(metric(Some(value), Some(formatted), today.to_string(), Some("Simulated data")));
            }
            Ok(Lookup::Found(Some(obs))) => {
                let formatted = obs.value.map(|v| match format {
                    MetricFormat::Currency => format_currency(Some(v), 0),
                    MetricFormat::Percent => format!("{v:.1}%"),
                });
                metrics.push(metric(obs.value, formatted, obs.date, None));
            }
            Ok(Lookup::Found(None)) => {}
            Err(e) => tracing::warn!("Error fetching additional metric for {}: {}", code, e),
        }
    }
    metrics
}

/// One-paragraph reading of a state's value.
pub fn state_overview(state_name: &str, value: Option<f64>, indicator: RegionalIndicator) -> String {
    let money = |v: f64| format_currency(Some(v), 0);
    match (indicator, value) {
        (RegionalIndicator::Unrate, None) => {
            format!("Economic data for {state_name} is currently unavailable.")
        }
        (RegionalIndicator::Unrate, Some(v)) if v < 4.0 => format!(
            "{state_name} is currently experiencing a strong labor market with unemployment below 4%, which is lower than the national average. The state's economy appears to be performing well in terms of job creation and employment opportunities."
        ),
        (RegionalIndicator::Unrate, Some(v)) if v < 6.0 => format!(
            "{state_name} has a moderate unemployment rate around {v:.1}%, which is in line with typical economic conditions. The labor market is relatively stable but may have some sectors that are underperforming."
        ),
        (RegionalIndicator::Unrate, Some(v)) => format!(
            "{state_name} is facing some challenges in its labor market with an unemployment rate of {v:.1}%. This is higher than the national average, suggesting potential economic difficulties or industry-specific downturns affecting the state."
        ),
        (RegionalIndicator::Mspus, None) => {
            format!("Housing market data for {state_name} is currently unavailable.")
        }
        (RegionalIndicator::Mspus, Some(v)) if v > 500_000.0 => format!(
            "{state_name} has a high-cost housing market with median home prices above $500,000. This suggests strong demand and potentially challenging affordability conditions for many residents."
        ),
        (RegionalIndicator::Mspus, Some(v)) if v > 300_000.0 => format!(
            "{state_name}'s housing market shows moderate prices with median home values around {}. This suggests a balanced market with reasonable affordability for many residents.",
            money(v)
        ),
        (RegionalIndicator::Mspus, Some(v)) => format!(
            "{state_name} has relatively affordable housing with median home prices around {}. This could be attractive for new residents and first-time homebuyers, but may also reflect lower economic growth or population decline in some areas.",
            money(v)
        ),
        (RegionalIndicator::Pcpi, None) => {
            format!("Income data for {state_name} is currently unavailable.")
        }
        (RegionalIndicator::Pcpi, Some(v)) if v > 70_000.0 => format!(
            "{state_name} has a high per capita personal income of {}, which is above the national average. This suggests a strong economy with high-wage jobs and opportunities for skilled workers.",
            money(v)
        ),
        (RegionalIndicator::Pcpi, Some(v)) if v > 50_000.0 => format!(
            "{state_name} has a moderate per capita personal income of {}, which is in line with the national average. The state's economy provides reasonable income levels for residents.",
            money(v)
        ),
        (RegionalIndicator::Pcpi, Some(v)) => format!(
            "{state_name}'s per capita personal income of {} is below the national average. This may reflect challenges in the local economy, including lower-wage industries or economic transitions.",
            money(v)
        ),
    }
}

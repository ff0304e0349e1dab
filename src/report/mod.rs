//! Terminal reports for the one-shot CLI commands.
//!
//! Formatting lives here so the loaders in `app::views` stay free of
//! presentation and output changes stay local.

pub mod format;

use crate::app::views::{CalendarView, DashboardView, ForecastView, IndicatorView, RegionalView, YieldCurveView};
use crate::data::catalog::{KEY_INDICATORS, card_meta};
use crate::data::simulated::group_by_month_day;
use crate::domain::{
    CalendarEvent, IndicatorInfo, Institution, LatestValue, Observation, SeriesData, StateDetail,
};
use crate::math::impact::{EconomicConditions, HouseholdInputs, ImpactSummary};

use format::{
    format_currency, format_date, format_for_series, format_number, format_optional_date, format_percentage,
    truncate,
};

/// Most recent rows shown under a series.
pub const TABLE_ROWS: usize = 12;

pub fn format_dashboard(view: &DashboardView) -> String {
    let mut out = String::new();
    out.push_str("=== Economic Dashboard ===\n");
    out.push_str(&format!("Range: {}\n\n", view.range.label()));

    for card in KEY_INDICATORS {
        let latest = view.snapshot.get(card.series_id);
        let value = latest.and_then(|l| l.value);
        let date = latest.and_then(|l| l.date.as_deref());
        out.push_str(&format!(
            "{} {:<22} {:>14}  as of {}\n",
            card.trend.arrow(),
            card.title,
            format_for_series(card.series_id, value),
            format_optional_date(date),
        ));
        out.push_str(&format!("    {}\n", card.description));
    }
    out
}

pub fn format_catalog(indicators: &[IndicatorInfo]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<12} {:<20} {}\n", "id", "category", "name"));
    out.push_str(&format!("{:-<12} {:-<20} {:-<40}\n", "", "", ""));
    for i in indicators {
        out.push_str(&format!("{:<12} {:<20} {}\n", i.id, truncate(&i.category, 20), i.name));
    }
    out
}

pub fn format_latest(latest: &LatestValue) -> String {
    let title = if latest.title.is_empty() { latest.series_id.as_str() } else { latest.title.as_str() };
    let mut out = format!(
        "{} ({}): {} as of {}\n",
        title,
        latest.series_id,
        format_for_series(&latest.series_id, latest.value),
        format_optional_date(latest.date.as_deref()),
    );
    if !latest.units.is_empty() {
        out.push_str(&format!("Units: {}\n", latest.units));
    }
    out
}

/// Series header plus its newest `TABLE_ROWS` observations, newest first.
pub fn format_series(series: &SeriesData, value_format: impl Fn(Option<f64>) -> String) -> String {
    let mut out = String::new();
    let title = if series.title.is_empty() { series.series_id.as_str() } else { series.title.as_str() };
    out.push_str(&format!("{} ({})\n", title, series.series_id));
    if !series.units.is_empty() {
        out.push_str(&format!("Units: {} | Frequency: {}\n", series.units, series.frequency));
    }
    out.push_str(&format!("Observations: {}\n", series.data.len()));
    out.push_str(&format_rows(&series.data, value_format));
    out
}

fn format_rows(rows: &[Observation], value_format: impl Fn(Option<f64>) -> String) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<14} {:>14}\n", "date", "value"));
    out.push_str(&format!("{:-<14} {:-<14}\n", "", ""));
    for obs in rows.iter().rev().take(TABLE_ROWS) {
        out.push_str(&format!("{:<14} {:>14}\n", format_date(&obs.date), value_format(obs.value)));
    }
    out
}

pub fn format_indicator(view: &IndicatorView) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {} ===\n", view.page.display_name()));
    out.push_str(&format!("Range: {}\n", view.range.label()));

    let id = view.series.series_id.clone();
    let latest = view.latest();
    let fmt = |v: Option<f64>| {
        if view.yoy {
            format_percentage(v, 1)
        } else {
            format_for_series(&id, v)
        }
    };
    out.push_str(&format!(
        "Latest: {} ({})\n\n",
        fmt(latest.and_then(|o| o.value)),
        format_optional_date(latest.map(|o| o.date.as_str())),
    ));
    out.push_str(&format_series(&view.series, fmt));

    if let Some(derived) = &view.derived {
        out.push('\n');
        out.push_str(&format!("{}\n", derived.title));
        if view.series.series_id == "PAYEMS" {
            // PAYEMS is reported in thousands of persons.
            out.push_str(&format_rows(&derived.data, |v| format_number(v.map(|x| x * 1000.0), 0)));
        } else {
            out.push_str(&format_rows(&derived.data, |v| format_percentage(v, 2)));
        }
    }
    out
}

pub fn format_yield_curve(view: &YieldCurveView) -> String {
    let mut out = String::new();
    out.push_str("=== Treasury Yield Curve ===\n");
    out.push_str(&format!("{:<8} {:<8} {:>8}  {}\n", "tenor", "series", "yield", "as of"));
    out.push_str(&format!("{:-<8} {:-<8} {:->8}  {:-<12}\n", "", "", "", ""));
    for p in &view.points {
        out.push_str(&format!(
            "{:<8} {:<8} {:>8}  {}\n",
            p.label,
            p.series_id,
            format_percentage(p.value, 2),
            format_optional_date(p.date.as_deref()),
        ));
    }
    if let Some(spread) = view.ten_two_spread() {
        out.push_str(&format!("\n10Y-2Y spread: {spread:+.2} pts"));
        if view.is_inverted() {
            out.push_str(" (inverted)");
        }
        out.push('\n');
    }
    out
}

pub fn format_forecasts(view: &ForecastView, institution: Institution) -> String {
    let mut out = String::new();
    let data = &view.data;
    out.push_str(&format!("=== {} Forecasts ({}) ===\n", data.title, institution.display_name()));
    if view.simulated {
        out.push_str("Note: simulated forecasts (the data service did not provide any)\n");
    }

    let years: Vec<&str> = data
        .consensus()
        .map(|c| c.iter().map(|p| p.year.as_str()).collect())
        .unwrap_or_default();

    out.push_str(&format!("{:<30}", "institution"));
    for y in &years {
        out.push_str(&format!(" {y:>8}"));
    }
    out.push('\n');

    let mut rows: Vec<Institution> = Institution::FORECASTERS.to_vec();
    rows.push(Institution::All);
    for inst in rows {
        let Some(points) = data.forecasts.get(inst.key()) else {
            continue;
        };
        let marker = if inst == institution { "*" } else { " " };
        let name = if inst == Institution::All { "Consensus" } else { inst.display_name() };
        out.push_str(&format!("{marker}{:<29}", truncate(name, 29)));
        for y in &years {
            let v = points.iter().find(|p| p.year == *y).map(|p| p.value);
            out.push_str(&format!(" {:>8}", format_percentage(v, 1)));
        }
        out.push('\n');
    }
    out
}

pub fn format_calendar(view: &CalendarView, events: &[CalendarEvent]) -> String {
    let mut out = String::new();
    out.push_str("=== Economic Calendar ===\n");
    if view.simulated {
        out.push_str("Note: simulated schedule (the data service did not provide one)\n");
    }
    if events.is_empty() {
        out.push_str("No upcoming events.\n");
        return out;
    }

    for (month, days) in group_by_month_day(events) {
        out.push_str(&format!("\n{month}\n"));
        for (day, list) in days {
            for ev in list {
                out.push_str(&format!(
                    "  {:>2}  {}  {:<26} [{}]",
                    day,
                    ev.time,
                    truncate(&ev.title, 26),
                    ev.importance.label()
                ));
                if let Some(prev) = &ev.previous_value {
                    out.push_str(&format!("  prev: {prev}"));
                }
                out.push('\n');
            }
        }
    }
    out
}

pub fn format_impact(conditions: &EconomicConditions, inputs: &HouseholdInputs, impact: &ImpactSummary) -> String {
    let money = |v: f64| format_currency(Some(v), 0);
    let signed = |v: f64| if v >= 0.0 { format!("+{}", money(v)) } else { money(v) };

    let mut out = String::new();
    out.push_str("=== Personal Economic Impact ===\n");
    out.push_str(&format!(
        "Conditions: inflation {} | fed funds {} | mortgage {} | unemployment {}\n",
        format_percentage(Some(conditions.inflation), 1),
        format_percentage(Some(conditions.fed_rate), 2),
        format_percentage(Some(conditions.mortgage_rate), 2),
        format_percentage(Some(conditions.unemployment_rate), 1),
    ));
    out.push_str(&format!(
        "Household: income {} | expenses {} | savings {} | mortgage {} over {}y at {}{}\n\n",
        money(inputs.income),
        money(inputs.expenses),
        money(inputs.savings),
        money(inputs.mortgage_balance),
        inputs.mortgage_term_years,
        format_percentage(Some(inputs.mortgage_rate), 2),
        if inputs.adjustable_rate { " (adjustable)" } else { "" },
    ));

    out.push_str(&format!("{:<28} {:>14}\n", "Inflation cost", signed(impact.inflation_impact)));
    out.push_str(&format!("{:<28} {:>14}\n", "Savings interest", signed(impact.savings_impact)));
    out.push_str(&format!("{:<28} {:>14}\n", "Rate change on mortgage", signed(impact.mortgage_impact)));
    out.push_str(&format!("{:-<28} {:->14}\n", "", ""));
    out.push_str(&format!("{:<28} {:>14}\n", "Net annual impact", signed(impact.total_impact)));
    out.push_str(&format!(
        "\nMonthly mortgage payment: {}",
        format_currency(Some(impact.current_mortgage_payment), 2)
    ));
    if inputs.adjustable_rate {
        out.push_str(&format!(
            " -> {} after a rate reset",
            format_currency(Some(impact.new_mortgage_payment), 2)
        ));
    }
    out.push('\n');
    out
}

pub fn format_regional(view: &RegionalView) -> String {
    let snapshot = &view.snapshot;
    let mut out = String::new();
    out.push_str(&format!("=== {} by State ===\n", snapshot.name));
    out.push_str(&format!("{:<4} {:<22} {:>14} {:<14} {}\n", "code", "state", "value", "as of", "colour"));
    out.push_str(&format!("{:-<4} {:-<22} {:->14} {:-<14} {:-<18}\n", "", "", "", "", ""));
    for s in &snapshot.states {
        let value = if snapshot.units == "percent" {
            format_percentage(s.value, 1)
        } else {
            format_currency(s.value, 0)
        };
        let colour = view.color_of(&s.code).map(|c| c.to_css()).unwrap_or_default();
        out.push_str(&format!(
            "{:<4} {:<22} {:>14} {:<14} {}\n",
            s.code,
            truncate(&s.name, 22),
            value,
            format_optional_date(s.date.as_deref()),
            colour,
        ));
    }
    out
}

pub fn format_state_detail(detail: &StateDetail) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {} ({}) ===\n", detail.name, detail.code));
    let value = if detail.indicator == "UNRATE" {
        format_percentage(detail.value, 1)
    } else {
        format_currency(detail.value, 0)
    };
    out.push_str(&format!(
        "{}: {} as of {}\n",
        detail.indicator_name,
        value,
        format_optional_date(detail.date.as_deref()),
    ));
    if let Some(note) = &detail.note {
        out.push_str(&format!("Note: {note}\n"));
    }
    for m in &detail.additional_metrics {
        let shown = m.formatted_value.clone().unwrap_or_else(|| format_number(m.value, 1));
        out.push_str(&format!("- {}: {}", m.name, shown));
        if let Some(note) = &m.note {
            out.push_str(&format!(" ({note})"));
        }
        out.push('\n');
    }
    if let Some(overview) = &detail.overview {
        out.push_str(&format!("\n{overview}\n"));
    }
    out
}

/// Card line for the dashboard in the TUI: `(title, value, date)`.
pub fn card_line(latest: Option<&LatestValue>, series_id: &str) -> (String, String, String) {
    let title = card_meta(series_id)
        .map(|c| c.title.to_string())
        .or_else(|| latest.map(|l| l.title.clone()))
        .unwrap_or_else(|| series_id.to_string());
    (
        title,
        format_for_series(series_id, latest.and_then(|l| l.value)),
        format_optional_date(latest.and_then(|l| l.date.as_deref())),
    )
}

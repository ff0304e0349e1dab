//! Simulated fallback data for the forecast and calendar views.
//!
//! Everything here is a pure function of a date and an RNG, so a fixed seed
//! (`simulation.seed`) reproduces the same calendar and forecasts.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::{
    CONSENSUS_KEY, CalendarEvent, CalendarFilter, EventCategory, ForecastData, ForecastIndicator,
    ForecastPoint, Importance, Institution, Observation,
};

/// Seeded RNG when `seed` is set, otherwise seeded from the OS.
pub fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

const FOMC_INTERVAL_DAYS: u64 = 42;
const FOMC_MINUTES_LAG_DAYS: u64 = 21;
const FOMC_MEETINGS: usize = 3;
const CALENDAR_MONTHS: u32 = 3;
const RELEASE_STRIDE_DAYS: usize = 28;

/// Upcoming releases for this month and the next two.
///
/// Events dated before `today` are dropped. The result is sorted by date then
/// time.
pub fn generate_calendar(today: NaiveDate, rng: &mut impl Rng) -> Vec<CalendarEvent> {
    let first_of_month = today.with_day(1).unwrap_or(today);
    let days: Vec<NaiveDate> = (0..CALENDAR_MONTHS)
        .filter_map(|i| first_of_month.checked_add_months(Months::new(i)))
        .flat_map(|month_start| {
            month_start
                .iter_days()
                .take_while(move |d| d.month() == month_start.month())
        })
        .collect();

    let mut events = Vec::new();

    let mut meeting = today.with_day(15).unwrap_or(today);
    for i in 0..FOMC_MEETINGS {
        meeting = meeting + Days::new(FOMC_INTERVAL_DAYS);
        if meeting < today {
            continue;
        }
        events.push(event(
            format!("fomc-{i}"),
            "FOMC Meeting",
            meeting,
            "14:00",
            "fomc",
            EventCategory::Fomc,
            Importance::High,
            "Federal Open Market Committee meeting to set monetary policy.",
            Some("Federal Funds Rate: 5.25%-5.50%"),
        ));
        events.push(event(
            format!("fomc-minutes-{i}"),
            "FOMC Minutes",
            meeting + Days::new(FOMC_MINUTES_LAG_DAYS),
            "14:00",
            "fomc_minutes",
            EventCategory::Fomc,
            Importance::Medium,
            "Minutes from the previous Federal Open Market Committee meeting.",
            None,
        ));
    }

    for i in (0..days.len()).step_by(RELEASE_STRIDE_DAYS) {
        let base = days[i];

        if base.day() <= 10 {
            let cpi = base.with_day(rng.gen_range(10..=12)).unwrap_or(base);
            if cpi >= today {
                events.push(event(
                    format!("cpi-{i}"),
                    "Consumer Price Index",
                    cpi,
                    "08:30",
                    "cpi",
                    EventCategory::Inflation,
                    Importance::High,
                    "Measures changes in the prices paid by consumers for goods and services.",
                    Some("+0.2% m/m, +3.1% y/y"),
                ));
            }
        }

        let first_friday = first_weekday_of_month(base, Weekday::Fri);
        if first_friday >= today {
            events.push(event(
                format!("employment-{i}"),
                "Employment Situation",
                first_friday,
                "08:30",
                "employment",
                EventCategory::Employment,
                Importance::High,
                "Monthly report on employment, unemployment rate, and wages.",
                Some("Unemployment Rate: 3.8%, Nonfarm Payrolls: +216K"),
            ));
        }

        let gdp = base.with_day(rng.gen_range(25..=27)).unwrap_or(base);
        if gdp >= today && matches!(gdp.month(), 1 | 4 | 7 | 10) {
            events.push(event(
                format!("gdp-{i}"),
                "Gross Domestic Product",
                gdp,
                "08:30",
                "gdp",
                EventCategory::Gdp,
                Importance::High,
                "Quarterly report on the total value of goods and services produced.",
                Some("+3.2% q/q SAAR"),
            ));
        }

        for j in (0..30).step_by(7) {
            let Some(claims) = days.get(i + j).copied() else {
                continue;
            };
            if claims.weekday() == Weekday::Thu && claims >= today {
                events.push(event(
                    format!("jobless-claims-{i}-{j}"),
                    "Initial Jobless Claims",
                    claims,
                    "08:30",
                    "jobless_claims",
                    EventCategory::Employment,
                    Importance::Medium,
                    "Weekly report on the number of new jobless claims filed.",
                    Some("218K"),
                ));
            }
        }
    }

    events.sort_by(|a, b| (&a.date, &a.time).cmp(&(&b.date, &b.time)));
    events
}

#[allow(clippy::too_many_arguments)]
fn event(
    id: String,
    title: &str,
    date: NaiveDate,
    time: &str,
    kind: &str,
    category: EventCategory,
    importance: Importance,
    description: &str,
    previous_value: Option<&str>,
) -> CalendarEvent {
    CalendarEvent {
        id,
        title: title.to_string(),
        date: date.format("%Y-%m-%d").to_string(),
        time: time.to_string(),
        kind: kind.to_string(),
        category,
        importance,
        description: description.to_string(),
        previous_value: previous_value.map(str::to_string),
    }
}

fn first_weekday_of_month(date: NaiveDate, weekday: Weekday) -> NaiveDate {
    let first = date.with_day(1).unwrap_or(date);
    let offset = (weekday.num_days_from_sunday() + 7 - first.weekday().num_days_from_sunday()) % 7;
    first + Days::new(u64::from(offset))
}

pub fn filter_events(events: &[CalendarEvent], filter: CalendarFilter) -> Vec<CalendarEvent> {
    events
        .iter()
        .filter(|e| filter.matches(e.category))
        .cloned()
        .collect()
}

/// Events grouped under `"Month YYYY"` headings, then by day of month.
///
/// Input order is preserved inside each group, and groups appear in the order
/// they are first seen.
pub type MonthGroups = Vec<(String, Vec<(u32, Vec<CalendarEvent>)>)>;

pub fn group_by_month_day(events: &[CalendarEvent]) -> MonthGroups {
    let mut groups: MonthGroups = Vec::new();
    for ev in events {
        let (heading, day) = match NaiveDate::parse_from_str(&ev.date, "%Y-%m-%d") {
            Ok(d) => (d.format("%B %Y").to_string(), d.day()),
            Err(_) => (ev.date.clone(), 0),
        };

        let month_idx = match groups.iter().position(|(h, _)| *h == heading) {
            Some(idx) => idx,
            None => {
                groups.push((heading, Vec::new()));
                groups.len() - 1
            }
        };
        let days = &mut groups[month_idx].1;
        match days.iter_mut().find(|(d, _)| *d == day) {
            Some((_, list)) => list.push(ev.clone()),
            None => days.push((day, vec![ev.clone()])),
        }
    }
    groups
}

/// `(base, variance)` of the simulated forecast values.
fn forecast_profile(indicator: ForecastIndicator) -> (f64, f64) {
    match indicator {
        ForecastIndicator::Gdp => (2.0, 1.0),
        ForecastIndicator::Inflation => (3.0, 1.2),
        ForecastIndicator::Unemployment => (4.5, 0.7),
        ForecastIndicator::Interest => (5.25, 0.5),
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Three-year projections from each institution plus their consensus.
pub fn generate_forecasts(
    indicator: ForecastIndicator,
    current_year: i32,
    rng: &mut impl Rng,
) -> ForecastData {
    let (base, variance) = forecast_profile(indicator);
    let years: Vec<i32> = (0..3).map(|i| current_year + i).collect();

    let mut forecasts = BTreeMap::new();
    for institution in Institution::FORECASTERS {
        let drift = rng.gen_range(0.0..0.5);
        let points = years
            .iter()
            .map(|&year| {
                let year_index = f64::from(year - current_year);
                let noise = (rng.r#gen::<f64>() - 0.5) * variance;
                let mut value = base + noise + year_index * drift;
                match indicator {
                    ForecastIndicator::Unemployment => value = value.max(2.0),
                    ForecastIndicator::Interest => value = value.max(0.0),
                    _ => {}
                }
                ForecastPoint {
                    year: year.to_string(),
                    value: round1(value),
                }
            })
            .collect::<Vec<_>>();
        forecasts.insert(institution.key().to_string(), points);
    }

    let consensus = years
        .iter()
        .enumerate()
        .map(|(idx, year)| {
            let sum: f64 = Institution::FORECASTERS
                .iter()
                .filter_map(|inst| forecasts.get(inst.key()))
                .map(|points: &Vec<ForecastPoint>| points[idx].value)
                .sum();
            ForecastPoint {
                year: year.to_string(),
                value: round1(sum / Institution::FORECASTERS.len() as f64),
            }
        })
        .collect();
    forecasts.insert(CONSENSUS_KEY.to_string(), consensus);

    ForecastData {
        indicator: indicator.id().to_string(),
        title: indicator.display_name().to_string(),
        units: "%".to_string(),
        forecasts,
    }
}

/// Plausible past value of an indicator for the forecast chart's lead-in.
pub fn historical_value(indicator: ForecastIndicator, year: i32, rng: &mut impl Rng) -> f64 {
    let jitter = rng.gen_range(0.0..0.5);
    let base = match indicator {
        ForecastIndicator::Gdp if year == 2020 => -3.4,
        ForecastIndicator::Gdp => 2.0,
        ForecastIndicator::Inflation if year >= 2021 => 4.5,
        ForecastIndicator::Inflation => 1.8,
        ForecastIndicator::Unemployment if year == 2020 => 8.1,
        ForecastIndicator::Unemployment => 4.0,
        ForecastIndicator::Interest if year <= 2021 => 0.25,
        ForecastIndicator::Interest => 4.0,
    };
    base + jitter
}

/// Chart series: simulated history for the last three year-ends and mid-year,
/// then the consensus (for `Institution::All`) or the institution's forecast
/// at each year-end. An institution missing from `data` contributes nothing.
pub fn forecast_chart_data(
    data: &ForecastData,
    institution: Institution,
    current_year: i32,
    rng: &mut impl Rng,
) -> Vec<Observation> {
    let indicator = ForecastIndicator::ALL
        .into_iter()
        .find(|i| i.id() == data.indicator)
        .unwrap_or(ForecastIndicator::Gdp);

    let mut points = vec![
        Observation::new(
            format!("{}-12-31", current_year - 3),
            historical_value(indicator, current_year - 3, rng),
        ),
        Observation::new(
            format!("{}-12-31", current_year - 2),
            historical_value(indicator, current_year - 2, rng),
        ),
        Observation::new(
            format!("{}-12-31", current_year - 1),
            historical_value(indicator, current_year - 1, rng),
        ),
        Observation::new(
            format!("{current_year}-06-30"),
            historical_value(indicator, current_year, rng),
        ),
    ];

    if let Some(forecast) = data.forecasts.get(institution.key()) {
        points.extend(
            forecast
                .iter()
                .map(|p| Observation::new(format!("{}-12-31", p.year), p.value)),
        );
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn calendar_is_sorted_and_not_in_the_past() {
        let today = d(2024, 3, 14);
        let events = generate_calendar(today, &mut rng(Some(1)));
        assert!(!events.is_empty());

        let today_str = today.format("%Y-%m-%d").to_string();
        for e in &events {
            assert!(e.date >= today_str, "{} is before today", e.date);
        }
        for pair in events.windows(2) {
            assert!((&pair[0].date, &pair[0].time) <= (&pair[1].date, &pair[1].time));
        }
    }

    #[test]
    fn fomc_meetings_are_six_weeks_apart_with_minutes() {
        let today = d(2024, 1, 2);
        let events = generate_calendar(today, &mut rng(Some(3)));
        let meetings: Vec<&str> = events
            .iter()
            .filter(|e| e.kind == "fomc")
            .map(|e| e.date.as_str())
            .collect();
        assert_eq!(meetings, vec!["2024-02-26", "2024-04-08", "2024-05-20"]);

        let minutes: Vec<&str> = events
            .iter()
            .filter(|e| e.kind == "fomc_minutes")
            .map(|e| e.date.as_str())
            .collect();
        assert_eq!(minutes, vec!["2024-03-18", "2024-04-29", "2024-06-10"]);
    }

    #[test]
    fn releases_land_on_expected_days() {
        let today = d(2024, 1, 1);
        let events = generate_calendar(today, &mut rng(Some(9)));

        for e in &events {
            let date = NaiveDate::parse_from_str(&e.date, "%Y-%m-%d").unwrap();
            match e.kind.as_str() {
                "cpi" => assert!((10..=12).contains(&date.day())),
                "employment" => {
                    assert_eq!(date.weekday(), Weekday::Fri);
                    assert!(date.day() <= 7);
                }
                "gdp" => {
                    assert!((25..=27).contains(&date.day()));
                    assert!(matches!(date.month(), 1 | 4 | 7 | 10));
                }
                "jobless_claims" => assert_eq!(date.weekday(), Weekday::Thu),
                _ => {}
            }
        }
        assert!(events.iter().any(|e| e.kind == "gdp"));
        assert!(events.iter().any(|e| e.kind == "cpi"));
    }

    #[test]
    fn events_on_today_are_kept() {
        // 2024-03-01 is the first Friday of March.
        let today = d(2024, 3, 1);
        let events = generate_calendar(today, &mut rng(Some(5)));
        assert!(events.iter().any(|e| e.kind == "employment" && e.date == "2024-03-01"));
    }

    #[test]
    fn first_friday() {
        assert_eq!(first_weekday_of_month(d(2024, 3, 20), Weekday::Fri), d(2024, 3, 1));
        assert_eq!(first_weekday_of_month(d(2024, 5, 30), Weekday::Fri), d(2024, 5, 3));
    }

    #[test]
    fn filter_and_group() {
        let events = generate_calendar(d(2024, 1, 1), &mut rng(Some(2)));
        let fomc = filter_events(&events, CalendarFilter::Fomc);
        assert!(!fomc.is_empty());
        assert!(fomc.iter().all(|e| e.category == EventCategory::Fomc));
        assert_eq!(filter_events(&events, CalendarFilter::All).len(), events.len());

        let groups = group_by_month_day(&events);
        assert_eq!(groups[0].0, "January 2024");
        let total: usize = groups
            .iter()
            .flat_map(|(_, days)| days.iter().map(|(_, evs)| evs.len()))
            .sum();
        assert_eq!(total, events.len());
    }

    #[test]
    fn forecasts_cover_three_years_with_consensus() {
        let data = generate_forecasts(ForecastIndicator::Inflation, 2024, &mut rng(Some(11)));
        assert_eq!(data.indicator, "inflation");
        assert_eq!(data.title, "Inflation Rate");
        assert_eq!(data.forecasts.len(), 5);

        let consensus = data.consensus().unwrap();
        let years: Vec<&str> = consensus.iter().map(|p| p.year.as_str()).collect();
        assert_eq!(years, vec!["2024", "2025", "2026"]);

        for (idx, point) in consensus.iter().enumerate() {
            let mean = Institution::FORECASTERS
                .iter()
                .map(|i| data.forecasts[i.key()][idx].value)
                .sum::<f64>()
                / 4.0;
            assert!((point.value - round1(mean)).abs() < 1e-9);
        }
    }

    #[test]
    fn forecast_values_respect_floors_and_rounding() {
        let mut r = rng(Some(4));
        for _ in 0..50 {
            let data = generate_forecasts(ForecastIndicator::Unemployment, 2024, &mut r);
            for points in data.forecasts.values() {
                for p in points {
                    assert!(p.value >= 2.0);
                    assert!((p.value * 10.0 - (p.value * 10.0).round()).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn same_seed_same_forecast() {
        let a = generate_forecasts(ForecastIndicator::Gdp, 2024, &mut rng(Some(42)));
        let b = generate_forecasts(ForecastIndicator::Gdp, 2024, &mut rng(Some(42)));
        assert_eq!(a, b);
    }

    #[test]
    fn historical_heuristics() {
        let mut r = rng(Some(8));
        let v = historical_value(ForecastIndicator::Gdp, 2020, &mut r);
        assert!((-3.4..-2.9).contains(&v));
        let v = historical_value(ForecastIndicator::Interest, 2021, &mut r);
        assert!((0.25..0.75).contains(&v));
        let v = historical_value(ForecastIndicator::Interest, 2023, &mut r);
        assert!((4.0..4.5).contains(&v));
    }

    #[test]
    fn chart_data_appends_selected_forecast() {
        let mut r = rng(Some(6));
        let data = generate_forecasts(ForecastIndicator::Gdp, 2024, &mut r);

        let all = forecast_chart_data(&data, Institution::All, 2024, &mut r);
        let dates: Vec<&str> = all.iter().map(|o| o.date.as_str()).collect();
        assert_eq!(
            dates,
            vec![
                "2021-12-31", "2022-12-31", "2023-12-31", "2024-06-30", "2024-12-31",
                "2025-12-31", "2026-12-31",
            ]
        );
        assert_eq!(all[4].value, Some(data.consensus().unwrap()[0].value));

        let mut partial = data.clone();
        partial.forecasts.remove("imf");
        let imf = forecast_chart_data(&partial, Institution::Imf, 2024, &mut r);
        assert_eq!(imf.len(), 4);
    }
}

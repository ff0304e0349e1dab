//! View loaders shared by the CLI and the TUI.
//!
//! Each loader fetches what one screen needs from an [`EconomicApi`] and
//! returns a ready-to-render model. Failures are logged and turned into the
//! short message the screen shows; forecasts and the calendar never fail and
//! fall back to simulated data instead.
//!
//! The CLI prints these models; the TUI keeps the last one per tab.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rand::Rng;
use rayon::prelude::*;

use crate::data::EconomicApi;
use crate::data::catalog::{DASHBOARD_SERIES, INTEREST_RATES_CATEGORY, YIELD_CURVE_TENORS, page_series};
use crate::data::simulated;
use crate::domain::{
    CalendarEvent, CalendarFilter, DashboardSnapshot, ForecastData, ForecastIndicator, IndicatorPage,
    Institution, Observation, RegionalIndicator, RegionalSnapshot, SeriesData, StateDetail, TimeRange,
};
use crate::error::AppError;
use crate::math::change::{absolute_change, quarter_over_quarter, year_over_year};
use crate::math::color::{ColorScale, Rgb, choropleth};
use crate::math::impact::EconomicConditions;

pub const DASHBOARD_ERROR: &str = "Failed to load dashboard data. Please try again later.";
pub const INDICATOR_OPTIONS_ERROR: &str = "Failed to load indicator options.";
pub const REGIONAL_ERROR: &str = "Failed to load regional data";
pub const STATE_DETAIL_ERROR: &str = "Failed to load state details";
pub const YIELD_CURVE_ERROR: &str = "Failed to load yield curve data. Please try again later.";

pub fn series_error(series_id: &str) -> String {
    format!("Failed to load {series_id} data. Please try again later.")
}

fn view_error(context: &str, err: &AppError, message: impl Into<String>) -> AppError {
    tracing::warn!("{context}: {err}");
    AppError::data(message)
}

/// Dashboard: latest snapshot plus the four headline series.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub range: TimeRange,
    pub snapshot: DashboardSnapshot,
    /// Keyed by series id.
    pub charts: BTreeMap<String, SeriesData>,
}

pub fn load_dashboard(api: &dyn EconomicApi, range: TimeRange, today: NaiveDate) -> Result<DashboardView, AppError> {
    let (start, end) = range.date_range(today);

    let snapshot = api
        .dashboard()
        .map_err(|e| view_error("Error fetching dashboard data", &e, DASHBOARD_ERROR))?;

    let charts = DASHBOARD_SERIES
        .par_iter()
        .map(|id| api.series(id, start, end, None).map(|s| (id.to_string(), s)))
        .collect::<Result<BTreeMap<_, _>, _>>()
        .map_err(|e| view_error("Error fetching dashboard data", &e, DASHBOARD_ERROR))?;

    Ok(DashboardView { range, snapshot, charts })
}

/// A series derived from the page's main series.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedSeries {
    pub title: String,
    pub data: Vec<Observation>,
}

/// One of the four indicator pages.
#[derive(Debug, Clone)]
pub struct IndicatorView {
    pub page: IndicatorPage,
    pub range: TimeRange,
    /// The series as displayed (already YoY-transformed on the inflation page
    /// when `yoy` is on).
    pub series: SeriesData,
    pub yoy: bool,
    pub derived: Option<DerivedSeries>,
}

impl IndicatorView {
    pub fn latest(&self) -> Option<&Observation> {
        self.series.latest()
    }
}

/// Series menu of a page. The interest-rate page asks the collaborator for
/// its catalog.
pub fn load_series_options(api: &dyn EconomicApi, page: IndicatorPage) -> Result<Vec<(String, String)>, AppError> {
    if page != IndicatorPage::InterestRates {
        return Ok(page_series(page));
    }
    let catalog = api
        .indicators()
        .map_err(|e| view_error("Error fetching indicators", &e, INDICATOR_OPTIONS_ERROR))?;
    Ok(catalog
        .into_iter()
        .filter(|i| i.category == INTEREST_RATES_CATEGORY)
        .map(|i| (i.id, i.name))
        .collect())
}

pub fn load_indicator(
    api: &dyn EconomicApi,
    page: IndicatorPage,
    series_id: &str,
    range: TimeRange,
    yoy: bool,
    today: NaiveDate,
) -> Result<IndicatorView, AppError> {
    let (start, end) = range.date_range(today);
    let raw = api
        .series(series_id, start, end, None)
        .map_err(|e| view_error(&format!("Error fetching {series_id} data"), &e, series_error(series_id)))?;

    Ok(build_indicator_view(page, raw, range, yoy))
}

fn build_indicator_view(page: IndicatorPage, raw: SeriesData, range: TimeRange, yoy: bool) -> IndicatorView {
    let mut series = raw;
    let mut derived = None;

    match page {
        IndicatorPage::Inflation if yoy && !series.data.is_empty() => {
            series.data = year_over_year(&series.data);
            series.title = format!("{} (Year-over-Year % Change)", series.title);
            series.units = "%".to_string();
        }
        IndicatorPage::Unemployment if series.series_id == "PAYEMS" && !series.data.is_empty() => {
            derived = Some(DerivedSeries {
                title: "Monthly Change in Nonfarm Payrolls".to_string(),
                data: absolute_change(&series.data),
            });
        }
        IndicatorPage::Gdp if series.series_id == "GDPC1" && !series.data.is_empty() => {
            derived = Some(DerivedSeries {
                title: "Real GDP Quarterly Growth Rate".to_string(),
                data: quarter_over_quarter(&series.data),
            });
        }
        _ => {}
    }

    IndicatorView {
        page,
        range,
        series,
        yoy: yoy && page == IndicatorPage::Inflation,
        derived,
    }
}

/// Treasury constant-maturity curve.
#[derive(Debug, Clone, PartialEq)]
pub struct YieldPoint {
    pub label: String,
    pub series_id: String,
    pub value: Option<f64>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YieldCurveView {
    pub points: Vec<YieldPoint>,
}

impl YieldCurveView {
    /// 10-year minus 2-year spread, in percentage points.
    pub fn ten_two_spread(&self) -> Option<f64> {
        let value = |id: &str| self.points.iter().find(|p| p.series_id == id).and_then(|p| p.value);
        Some(value("DGS10")? - value("DGS2")?)
    }

    pub fn is_inverted(&self) -> bool {
        self.ten_two_spread().is_some_and(|s| s < 0.0)
    }
}

/// Latest yield for each tenor, fetched in parallel. A missing tenor is kept
/// as a gap; the view only fails when no tenor has a value.
pub fn load_yield_curve(api: &dyn EconomicApi) -> Result<YieldCurveView, AppError> {
    let points: Vec<YieldPoint> = YIELD_CURVE_TENORS
        .par_iter()
        .map(|(label, id)| {
            let (value, date) = match api.latest(id) {
                Ok(latest) => (latest.value, latest.date),
                Err(e) => {
                    tracing::warn!("Error fetching {id}: {e}");
                    (None, None)
                }
            };
            YieldPoint {
                label: label.to_string(),
                series_id: id.to_string(),
                value,
                date,
            }
        })
        .collect();

    if points.iter().all(|p| p.value.is_none()) {
        tracing::warn!("No yield curve tenor returned a value");
        return Err(AppError::data(YIELD_CURVE_ERROR));
    }
    Ok(YieldCurveView { points })
}

#[derive(Debug, Clone)]
pub struct ForecastView {
    pub data: ForecastData,
    pub simulated: bool,
}

impl ForecastView {
    /// Chart series for `institution` with a simulated lead-in.
    pub fn chart(&self, institution: Institution, current_year: i32, rng: &mut impl Rng) -> Vec<Observation> {
        simulated::forecast_chart_data(&self.data, institution, current_year, rng)
    }
}

pub fn load_forecasts(
    api: &dyn EconomicApi,
    indicator: ForecastIndicator,
    today: NaiveDate,
    rng: &mut impl Rng,
) -> ForecastView {
    match api.forecasts(indicator) {
        Ok(data) => ForecastView { data, simulated: false },
        Err(e) => {
            tracing::warn!("Error fetching forecast data: {e}; using simulated forecasts");
            ForecastView {
                data: simulated::generate_forecasts(indicator, today.year(), rng),
                simulated: true,
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct CalendarView {
    pub events: Vec<CalendarEvent>,
    pub simulated: bool,
}

impl CalendarView {
    pub fn filtered(&self, filter: CalendarFilter) -> Vec<CalendarEvent> {
        simulated::filter_events(&self.events, filter)
    }
}

pub fn load_calendar(api: &dyn EconomicApi, today: NaiveDate, rng: &mut impl Rng) -> CalendarView {
    match api.calendar() {
        Ok(events) => CalendarView { events, simulated: false },
        Err(e) => {
            tracing::warn!("Error fetching calendar events: {e}; using simulated events");
            CalendarView {
                events: simulated::generate_calendar(today, rng),
                simulated: true,
            }
        }
    }
}

/// Conditions for the calculator. The dashboard snapshot is best-effort.
pub fn load_conditions(api: &dyn EconomicApi) -> EconomicConditions {
    match api.dashboard() {
        Ok(snapshot) => EconomicConditions::from_snapshot(&snapshot),
        Err(e) => {
            tracing::warn!("Error fetching economic data: {e}; using default conditions");
            EconomicConditions::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegionalView {
    pub snapshot: RegionalSnapshot,
    /// State code -> map colour, in snapshot order.
    pub colors: Vec<(String, Rgb)>,
}

impl RegionalView {
    pub fn color_of(&self, code: &str) -> Option<Rgb> {
        self.colors.iter().find(|(c, _)| c == code).map(|(_, rgb)| *rgb)
    }
}

pub fn load_regional(api: &dyn EconomicApi, indicator: RegionalIndicator) -> Result<RegionalView, AppError> {
    let snapshot = api
        .regional(indicator)
        .map_err(|e| view_error("Error fetching regional data", &e, REGIONAL_ERROR))?;
    let colors = choropleth(&snapshot.states, ColorScale::for_high_is_bad(indicator.high_is_bad()));
    Ok(RegionalView { snapshot, colors })
}

pub fn load_state_detail(
    api: &dyn EconomicApi,
    indicator: RegionalIndicator,
    state_code: &str,
) -> Result<StateDetail, AppError> {
    api.state_detail(indicator, state_code)
        .map_err(|e| view_error(&format!("Error fetching {state_code} details"), &e, STATE_DETAIL_ERROR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::simulated::rng;
    use crate::domain::{IndicatorInfo, LatestValue, StateRecord};

    /// In-memory collaborator. `None` fields fail.
    #[derive(Default)]
    struct StubApi {
        indicators: Option<Vec<IndicatorInfo>>,
        series: Option<Vec<Observation>>,
        latest: Option<f64>,
        dashboard: Option<DashboardSnapshot>,
        regional: Option<RegionalSnapshot>,
        forecasts: Option<ForecastData>,
        calendar: Option<Vec<CalendarEvent>>,
    }

    fn down() -> AppError {
        AppError::data("connection refused")
    }

    impl EconomicApi for StubApi {
        fn indicators(&self) -> Result<Vec<IndicatorInfo>, AppError> {
            self.indicators.clone().ok_or_else(down)
        }

        fn series(&self, series_id: &str, _: NaiveDate, _: NaiveDate, _: Option<&str>) -> Result<SeriesData, AppError> {
            let data = self.series.clone().ok_or_else(down)?;
            Ok(SeriesData {
                series_id: series_id.to_string(),
                title: format!("{series_id} title"),
                units: "Index".to_string(),
                frequency: "M".to_string(),
                data,
            })
        }

        fn latest(&self, series_id: &str) -> Result<LatestValue, AppError> {
            let value = self.latest.ok_or_else(down)?;
            let bump = if series_id == "DGS2" { 0.5 } else { 0.0 };
            Ok(LatestValue {
                series_id: series_id.to_string(),
                value: Some(value + bump),
                date: Some("2024-06-03".to_string()),
                ..Default::default()
            })
        }

        fn dashboard(&self) -> Result<DashboardSnapshot, AppError> {
            self.dashboard.clone().ok_or_else(down)
        }

        fn regional(&self, _: RegionalIndicator) -> Result<RegionalSnapshot, AppError> {
            self.regional.clone().ok_or_else(down)
        }

        fn state_detail(&self, _: RegionalIndicator, _: &str) -> Result<StateDetail, AppError> {
            Err(down())
        }

        fn forecasts(&self, _: ForecastIndicator) -> Result<ForecastData, AppError> {
            self.forecasts.clone().ok_or_else(down)
        }

        fn calendar(&self) -> Result<Vec<CalendarEvent>, AppError> {
            self.calendar.clone().ok_or_else(down)
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn monthly(values: &[f64]) -> Vec<Observation> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Observation::new(format!("{}-{:02}-01", 2022 + i / 12, i % 12 + 1), *v))
            .collect()
    }

    #[test]
    fn dashboard_failure_shows_static_message() {
        let api = StubApi {
            series: Some(monthly(&[1.0])),
            ..Default::default()
        };
        let err = load_dashboard(&api, TimeRange::OneYear, today()).unwrap_err();
        assert_eq!(err.message(), DASHBOARD_ERROR);
    }

    #[test]
    fn dashboard_loads_all_four_charts() {
        let api = StubApi {
            series: Some(monthly(&[1.0, 2.0])),
            dashboard: Some(DashboardSnapshot::new()),
            ..Default::default()
        };
        let view = load_dashboard(&api, TimeRange::OneYear, today()).unwrap();
        let ids: Vec<&str> = view.charts.keys().map(|k| k.as_str()).collect();
        assert_eq!(ids, vec!["CPIAUCSL", "FEDFUNDS", "GDPC1", "UNRATE"]);
    }

    #[test]
    fn series_failure_names_the_series() {
        let api = StubApi::default();
        let err = load_indicator(&api, IndicatorPage::Gdp, "GDPC1", TimeRange::TenYears, false, today()).unwrap_err();
        assert_eq!(err.message(), "Failed to load GDPC1 data. Please try again later.");
    }

    #[test]
    fn inflation_yoy_replaces_the_series() {
        let values: Vec<f64> = (0..14).map(|i| 100.0 + i as f64).collect();
        let api = StubApi {
            series: Some(monthly(&values)),
            ..Default::default()
        };
        let view = load_indicator(&api, IndicatorPage::Inflation, "CPIAUCSL", TimeRange::FiveYears, true, today()).unwrap();
        assert_eq!(view.series.data.len(), 2);
        assert!((view.series.data[0].value.unwrap() - 12.0).abs() < 1e-9);
        assert_eq!(view.series.title, "CPIAUCSL title (Year-over-Year % Change)");
        assert_eq!(view.series.units, "%");

        let raw = load_indicator(&api, IndicatorPage::Inflation, "CPIAUCSL", TimeRange::FiveYears, false, today()).unwrap();
        assert_eq!(raw.series.data.len(), 14);
    }

    #[test]
    fn derived_series_only_for_their_series() {
        let api = StubApi {
            series: Some(monthly(&[100.0, 110.0, 99.0])),
            ..Default::default()
        };
        let gdp = load_indicator(&api, IndicatorPage::Gdp, "GDPC1", TimeRange::TenYears, false, today()).unwrap();
        let growth = gdp.derived.unwrap();
        assert_eq!(growth.title, "Real GDP Quarterly Growth Rate");
        assert!((growth.data[0].value.unwrap() - 10.0).abs() < 1e-9);

        let jobs = load_indicator(&api, IndicatorPage::Unemployment, "PAYEMS", TimeRange::FiveYears, false, today()).unwrap();
        let change: Vec<f64> = jobs.derived.unwrap().data.iter().filter_map(|o| o.value).collect();
        assert_eq!(change, vec![10.0, -11.0]);

        let rate = load_indicator(&api, IndicatorPage::Unemployment, "UNRATE", TimeRange::FiveYears, false, today()).unwrap();
        assert!(rate.derived.is_none());
    }

    #[test]
    fn interest_rate_options_come_from_the_catalog() {
        let api = StubApi {
            indicators: Some(crate::data::catalog::indicator_catalog()),
            ..Default::default()
        };
        let options = load_series_options(&api, IndicatorPage::InterestRates).unwrap();
        assert_eq!(options.len(), 3);

        let err = load_series_options(&StubApi::default(), IndicatorPage::InterestRates).unwrap_err();
        assert_eq!(err.message(), INDICATOR_OPTIONS_ERROR);

        let inflation = load_series_options(&StubApi::default(), IndicatorPage::Inflation).unwrap();
        assert_eq!(inflation[0].0, "CPIAUCSL");
    }

    #[test]
    fn forecasts_and_calendar_fall_back_to_simulated() {
        let api = StubApi::default();
        let mut r = rng(Some(1));

        let forecasts = load_forecasts(&api, ForecastIndicator::Interest, today(), &mut r);
        assert!(forecasts.simulated);
        assert_eq!(forecasts.data.indicator, "interest");
        assert_eq!(forecasts.chart(Institution::Fed, 2024, &mut r).len(), 7);

        let calendar = load_calendar(&api, today(), &mut r);
        assert!(calendar.simulated);
        assert!(!calendar.events.is_empty());
    }

    #[test]
    fn served_calendar_is_used_as_is() {
        let api = StubApi {
            calendar: Some(Vec::new()),
            ..Default::default()
        };
        let calendar = load_calendar(&api, today(), &mut rng(Some(1)));
        assert!(!calendar.simulated);
        assert!(calendar.events.is_empty());
    }

    #[test]
    fn calculator_keeps_defaults_when_offline() {
        assert_eq!(load_conditions(&StubApi::default()), EconomicConditions::default());
    }

    #[test]
    fn regional_colours_follow_indicator_direction() {
        let state = |code: &str, value: Option<f64>| StateRecord {
            code: code.to_string(),
            name: code.to_string(),
            value,
            date: None,
            overview: None,
        };
        let api = StubApi {
            regional: Some(RegionalSnapshot {
                indicator: "UNRATE".into(),
                name: "Unemployment Rate".into(),
                units: "percent".into(),
                states: vec![state("AL", Some(2.0)), state("AK", Some(6.0)), state("AZ", None)],
            }),
            ..Default::default()
        };
        let view = load_regional(&api, RegionalIndicator::Unrate).unwrap();
        assert_eq!(view.color_of("AL"), Some(Rgb(0, 255, 0)));
        assert_eq!(view.color_of("AK"), Some(Rgb(255, 0, 0)));
        assert_eq!(view.color_of("AZ"), Some(crate::math::color::NO_DATA_COLOR));

        let err = load_regional(&StubApi::default(), RegionalIndicator::Pcpi).unwrap_err();
        assert_eq!(err.message(), REGIONAL_ERROR);
        let err = load_state_detail(&StubApi::default(), RegionalIndicator::Pcpi, "CA").unwrap_err();
        assert_eq!(err.message(), STATE_DETAIL_ERROR);
    }

    #[test]
    fn yield_curve_reports_inversion() {
        let api = StubApi {
            latest: Some(4.0),
            ..Default::default()
        };
        let curve = load_yield_curve(&api).unwrap();
        assert_eq!(curve.points.len(), 11);
        assert_eq!(curve.points[0].label, "1 Mo");
        assert!((curve.ten_two_spread().unwrap() + 0.5).abs() < 1e-9);
        assert!(curve.is_inverted());

        assert!(load_yield_curve(&StubApi::default()).is_err());
    }
}

//! Shared domain types.
//!
//! These types mirror the JSON shapes exchanged with the data collaborator so
//! they can be:
//!
//! - decoded straight from REST responses
//! - produced locally (FRED source, simulated fallbacks)
//! - exported to JSON/CSV

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Preset windows offered by every chart view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum TimeRange {
    #[serde(rename = "6m")]
    #[value(name = "6m")]
    SixMonths,
    #[serde(rename = "1y")]
    #[value(name = "1y")]
    OneYear,
    #[serde(rename = "5y")]
    #[value(name = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    #[value(name = "10y")]
    TenYears,
    #[serde(rename = "ytd")]
    #[value(name = "ytd")]
    Ytd,
    /// Twenty years of history.
    #[serde(rename = "all")]
    #[value(name = "all")]
    All,
}

impl TimeRange {
    pub const ALL: [TimeRange; 6] = [
        TimeRange::SixMonths,
        TimeRange::OneYear,
        TimeRange::FiveYears,
        TimeRange::TenYears,
        TimeRange::Ytd,
        TimeRange::All,
    ];

    /// Inclusive `(start, end)` window ending on `today`.
    pub fn date_range(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let months_back = |m: u32| today.checked_sub_months(Months::new(m)).unwrap_or(NaiveDate::MIN);
        let start = match self {
            TimeRange::SixMonths => months_back(6),
            TimeRange::OneYear => months_back(12),
            TimeRange::FiveYears => months_back(60),
            TimeRange::TenYears => months_back(120),
            TimeRange::Ytd => NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today),
            TimeRange::All => months_back(240),
        };
        (start, today)
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeRange::SixMonths => "6 Months",
            TimeRange::OneYear => "1 Year",
            TimeRange::FiveYears => "5 Years",
            TimeRange::TenYears => "10 Years",
            TimeRange::Ytd => "Year to Date",
            TimeRange::All => "All",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|r| *r == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// One `{date, value}` point of a time series.
///
/// `value` is `None` when the collaborator reported a missing observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: String,
    #[serde(default)]
    pub value: Option<f64>,
}

impl Observation {
    pub fn new(date: impl Into<String>, value: f64) -> Self {
        Self {
            date: date.into(),
            value: Some(value),
        }
    }
}

/// A fetched series plus its metadata (`GET /api/indicator/:id`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesData {
    pub series_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub units: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub data: Vec<Observation>,
}

impl SeriesData {
    /// Last observation carrying a value.
    pub fn latest(&self) -> Option<&Observation> {
        self.data.iter().rev().find(|o| o.value.is_some())
    }
}

/// Most recent point of a series (`GET /api/latest/:id`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatestValue {
    pub series_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub units: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
}

/// Flat key-value snapshot keyed by series id (`GET /api/dashboard`).
pub type DashboardSnapshot = BTreeMap<String, LatestValue>;

/// An entry of `GET /api/indicators`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorInfo {
    pub id: String,
    pub name: String,
    pub category: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorCatalog {
    pub indicators: Vec<IndicatorInfo>,
}

/// Category used by the calendar filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Fomc,
    Inflation,
    Employment,
    Gdp,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    High,
    Medium,
    #[serde(other)]
    Low,
}

impl Importance {
    pub fn label(self) -> &'static str {
        match self {
            Importance::High => "high",
            Importance::Medium => "medium",
            Importance::Low => "low",
        }
    }
}

/// A scheduled release or meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM` (Eastern).
    pub time: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: EventCategory,
    pub importance: Importance,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "previousValue", default)]
    pub previous_value: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarResponse {
    pub events: Vec<CalendarEvent>,
}

/// Calendar filter options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CalendarFilter {
    All,
    Fomc,
    Inflation,
    Employment,
    Gdp,
}

impl CalendarFilter {
    pub const ALL: [CalendarFilter; 5] = [
        CalendarFilter::All,
        CalendarFilter::Fomc,
        CalendarFilter::Inflation,
        CalendarFilter::Employment,
        CalendarFilter::Gdp,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            CalendarFilter::All => "All Events",
            CalendarFilter::Fomc => "FOMC Meetings",
            CalendarFilter::Inflation => "Inflation Reports",
            CalendarFilter::Employment => "Employment Reports",
            CalendarFilter::Gdp => "GDP Reports",
        }
    }

    pub fn matches(self, category: EventCategory) -> bool {
        match self {
            CalendarFilter::All => true,
            CalendarFilter::Fomc => category == EventCategory::Fomc,
            CalendarFilter::Inflation => category == EventCategory::Inflation,
            CalendarFilter::Employment => category == EventCategory::Employment,
            CalendarFilter::Gdp => category == EventCategory::Gdp,
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Indicators available on the regional map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum RegionalIndicator {
    #[serde(rename = "UNRATE")]
    #[value(name = "UNRATE", alias = "unrate")]
    Unrate,
    #[serde(rename = "MSPUS")]
    #[value(name = "MSPUS", alias = "mspus")]
    Mspus,
    #[serde(rename = "PCPI")]
    #[value(name = "PCPI", alias = "pcpi")]
    Pcpi,
}

impl RegionalIndicator {
    pub const ALL: [RegionalIndicator; 3] = [
        RegionalIndicator::Unrate,
        RegionalIndicator::Mspus,
        RegionalIndicator::Pcpi,
    ];

    pub fn id(self) -> &'static str {
        match self {
            RegionalIndicator::Unrate => "UNRATE",
            RegionalIndicator::Mspus => "MSPUS",
            RegionalIndicator::Pcpi => "PCPI",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            RegionalIndicator::Unrate => "Unemployment Rate",
            RegionalIndicator::Mspus => "Median House Price",
            RegionalIndicator::Pcpi => "Per Capita Personal Income",
        }
    }

    pub fn units(self) -> &'static str {
        match self {
            RegionalIndicator::Unrate => "percent",
            RegionalIndicator::Mspus | RegionalIndicator::Pcpi => "dollars",
        }
    }

    /// State-level FRED series pattern; `{state_code}` is substituted.
    pub fn series_pattern(self) -> &'static str {
        match self {
            RegionalIndicator::Unrate => "{state_code}UR",
            RegionalIndicator::Mspus => "MEDLISPRI{state_code}",
            RegionalIndicator::Pcpi => "{state_code}PCPI",
        }
    }

    /// Whether a high value is bad news (drives the map colour direction).
    pub fn high_is_bad(self) -> bool {
        matches!(self, RegionalIndicator::Unrate)
    }

    pub fn next(self) -> Self {
        match self {
            RegionalIndicator::Unrate => RegionalIndicator::Mspus,
            RegionalIndicator::Mspus => RegionalIndicator::Pcpi,
            RegionalIndicator::Pcpi => RegionalIndicator::Unrate,
        }
    }
}

/// One state on the regional map. Missing data keeps every optional field `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

/// `GET /api/regional/:indicator`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalSnapshot {
    pub indicator: String,
    pub name: String,
    pub units: String,
    pub states: Vec<StateRecord>,
}

/// Extra metric shown in the state detail panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMetric {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(rename = "formattedValue", default)]
    pub formatted_value: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// `GET /api/regional/:indicator/:state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDetail {
    pub code: String,
    pub name: String,
    pub indicator: String,
    pub indicator_name: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(rename = "additionalMetrics", default)]
    pub additional_metrics: Vec<StateMetric>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Indicators with published forecasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ForecastIndicator {
    Gdp,
    Inflation,
    Unemployment,
    Interest,
}

impl ForecastIndicator {
    pub const ALL: [ForecastIndicator; 4] = [
        ForecastIndicator::Gdp,
        ForecastIndicator::Inflation,
        ForecastIndicator::Unemployment,
        ForecastIndicator::Interest,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ForecastIndicator::Gdp => "gdp",
            ForecastIndicator::Inflation => "inflation",
            ForecastIndicator::Unemployment => "unemployment",
            ForecastIndicator::Interest => "interest",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ForecastIndicator::Gdp => "GDP Growth",
            ForecastIndicator::Inflation => "Inflation Rate",
            ForecastIndicator::Unemployment => "Unemployment Rate",
            ForecastIndicator::Interest => "Federal Funds Rate",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|i| *i == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Forecasting institution selector. `All` shows the consensus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Institution {
    All,
    Fed,
    Imf,
    Cbo,
    Oecd,
}

impl Institution {
    pub const ALL: [Institution; 5] = [
        Institution::All,
        Institution::Fed,
        Institution::Imf,
        Institution::Cbo,
        Institution::Oecd,
    ];

    /// Institutions that publish their own projections.
    pub const FORECASTERS: [Institution; 4] = [
        Institution::Fed,
        Institution::Imf,
        Institution::Cbo,
        Institution::Oecd,
    ];

    /// Key used in the `forecasts` map.
    pub fn key(self) -> &'static str {
        match self {
            Institution::All => CONSENSUS_KEY,
            Institution::Fed => "fed",
            Institution::Imf => "imf",
            Institution::Cbo => "cbo",
            Institution::Oecd => "oecd",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Institution::All => "All Institutions",
            Institution::Fed => "Federal Reserve",
            Institution::Imf => "IMF",
            Institution::Cbo => "Congressional Budget Office",
            Institution::Oecd => "OECD",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::FORECASTERS.into_iter().find(|i| i.key() == key)
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|i| *i == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

pub const CONSENSUS_KEY: &str = "consensus";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub year: String,
    pub value: f64,
}

/// `GET /api/forecasts/:indicator`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastData {
    pub indicator: String,
    pub title: String,
    pub units: String,
    pub forecasts: BTreeMap<String, Vec<ForecastPoint>>,
}

impl ForecastData {
    pub fn consensus(&self) -> Option<&[ForecastPoint]> {
        self.forecasts.get(CONSENSUS_KEY).map(|v| v.as_slice())
    }
}

/// The four per-indicator pages of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum IndicatorPage {
    InterestRates,
    Inflation,
    Unemployment,
    Gdp,
}

impl IndicatorPage {
    pub fn display_name(self) -> &'static str {
        match self {
            IndicatorPage::InterestRates => "Interest Rates",
            IndicatorPage::Inflation => "Inflation",
            IndicatorPage::Unemployment => "Unemployment",
            IndicatorPage::Gdp => "Gross Domestic Product",
        }
    }

    pub fn default_series(self) -> &'static str {
        match self {
            IndicatorPage::InterestRates => "FEDFUNDS",
            IndicatorPage::Inflation => "CPIAUCSL",
            IndicatorPage::Unemployment => "UNRATE",
            IndicatorPage::Gdp => "GDPC1",
        }
    }

    pub fn default_range(self) -> TimeRange {
        match self {
            IndicatorPage::Gdp => TimeRange::TenYears,
            _ => TimeRange::FiveYears,
        }
    }
}

/// Which data source backs the views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// The dashboard REST backend (`/api/...`).
    Api,
    /// FRED directly (requires `FRED_API_KEY`).
    Fred,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn time_ranges_end_today_and_step_back() {
        let today = d(2024, 8, 15);
        assert_eq!(TimeRange::SixMonths.date_range(today), (d(2024, 2, 15), today));
        assert_eq!(TimeRange::OneYear.date_range(today).0, d(2023, 8, 15));
        assert_eq!(TimeRange::FiveYears.date_range(today).0, d(2019, 8, 15));
        assert_eq!(TimeRange::TenYears.date_range(today).0, d(2014, 8, 15));
        assert_eq!(TimeRange::Ytd.date_range(today).0, d(2024, 1, 1));
        assert_eq!(TimeRange::All.date_range(today).0, d(2004, 8, 15));
    }

    #[test]
    fn leap_day_clamps_to_month_end() {
        let (start, _) = TimeRange::OneYear.date_range(d(2024, 2, 29));
        assert_eq!(start, d(2023, 2, 28));
    }

    #[test]
    fn calendar_event_uses_wire_names() {
        let json = r#"{
            "id": "cpi-0", "title": "Consumer Price Index", "date": "2024-09-11",
            "time": "08:30", "type": "cpi", "category": "inflation",
            "importance": "high", "description": "d", "previousValue": "+0.2% m/m"
        }"#;
        let ev: CalendarEvent = serde_json::from_str(json).unwrap();
        assert_eq!(ev.kind, "cpi");
        assert_eq!(ev.category, EventCategory::Inflation);
        assert_eq!(ev.previous_value.as_deref(), Some("+0.2% m/m"));

        let unknown = json.replace("\"inflation\"", "\"housing\"");
        let ev: CalendarEvent = serde_json::from_str(&unknown).unwrap();
        assert_eq!(ev.category, EventCategory::Other);
    }

    #[test]
    fn latest_value_tolerates_nulls() {
        let json = r#"{"series_id": "GDPC1", "value": null, "date": null}"#;
        let v: LatestValue = serde_json::from_str(json).unwrap();
        assert_eq!(v.value, None);
        assert_eq!(v.title, "");
    }

    #[test]
    fn series_latest_skips_missing_tail() {
        let s = SeriesData {
            series_id: "UNRATE".into(),
            data: vec![
                Observation::new("2024-01-01", 3.7),
                Observation { date: "2024-02-01".into(), value: None },
            ],
            ..Default::default()
        };
        assert_eq!(s.latest().map(|o| o.date.as_str()), Some("2024-01-01"));
    }

    #[test]
    fn cycling_wraps_around() {
        assert_eq!(TimeRange::All.next(), TimeRange::SixMonths);
        assert_eq!(Institution::Oecd.next(), Institution::All);
        assert_eq!(CalendarFilter::Gdp.next(), CalendarFilter::All);
        assert_eq!(ForecastIndicator::Interest.next(), ForecastIndicator::Gdp);
    }
}

//! Command-line parsing for the economic indicator tracker.
//!
//! Parsing and dispatch live apart from data access and formatting; `app`
//! turns these structs into calls on the view loaders.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::domain::{
    CalendarFilter, ForecastIndicator, IndicatorPage, Institution, RegionalIndicator, SourceKind, TimeRange,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "fed", version, about = "Federal Reserve & Economic Indicator Tracker")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command. They override the config file and
/// environment.
#[derive(Debug, Args, Clone, Default)]
pub struct GlobalArgs {
    /// Config file (TOML). Defaults to ./fed-tracker.toml or the user config dir.
    #[arg(long, global = true, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Data source: the dashboard REST API or FRED directly.
    #[arg(long, global = true, value_enum)]
    pub source: Option<SourceKind>,

    /// Base URL of the REST API (including `/api`).
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Seed for simulated calendar/forecast data.
    #[arg(long, global = true)]
    pub seed: Option<u64>,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive terminal dashboard.
    Tui,
    /// Key indicator cards with small plots.
    Dashboard(DashboardArgs),
    /// List the available indicators.
    Indicators,
    /// Fetch one series, optionally transformed, plotted or exported.
    Series(SeriesArgs),
    /// Latest value of a series.
    Latest {
        /// FRED series id (e.g. UNRATE).
        series_id: String,
    },
    /// One of the indicator pages (interest rates, inflation, unemployment, GDP).
    Page(PageArgs),
    /// Treasury yield curve from constant-maturity yields.
    YieldCurve,
    /// Institutional forecasts for an indicator.
    Forecast(ForecastArgs),
    /// Upcoming economic releases and FOMC meetings.
    Calendar(CalendarArgs),
    /// Personal impact of current conditions on a household budget.
    Impact(ImpactArgs),
    /// State-level values of a regional indicator.
    Regional(RegionalArgs),
    /// Print a default config file.
    Config,
}

#[derive(Debug, Args, Clone)]
pub struct DashboardArgs {
    #[arg(long, value_enum, default_value_t = TimeRange::OneYear)]
    pub range: TimeRange,

    /// Skip the plots.
    #[arg(long)]
    pub no_plot: bool,
}

/// Derived view of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Transform {
    None,
    /// Quarter-over-quarter % change.
    Qoq,
    /// Year-over-year % change (monthly data).
    Yoy,
    /// Change from the previous observation.
    Diff,
}

impl Transform {
    pub fn name(self) -> &'static str {
        match self {
            Transform::None => "none",
            Transform::Qoq => "qoq",
            Transform::Yoy => "yoy",
            Transform::Diff => "diff",
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct SeriesArgs {
    /// FRED series id (e.g. CPIAUCSL).
    pub series_id: String,

    /// Preset window ending today. Ignored when --start is given.
    #[arg(long, value_enum, default_value_t = TimeRange::FiveYears)]
    pub range: TimeRange,

    /// Explicit start date (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// Explicit end date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    /// FRED aggregation frequency (d, w, m, q, a).
    #[arg(long)]
    pub frequency: Option<String>,

    #[arg(long, value_enum, default_value_t = Transform::None)]
    pub transform: Transform,

    /// Render an ASCII plot.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the (transformed) series; `.json` writes JSON, anything else CSV.
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct PageArgs {
    /// Page to show; inferred from `--series` when omitted.
    #[arg(value_enum, required_unless_present = "series")]
    pub page: Option<IndicatorPage>,

    /// Series to show (defaults to the page's headline series).
    #[arg(long)]
    pub series: Option<String>,

    /// Window ending today (defaults to the page's default).
    #[arg(long, value_enum)]
    pub range: Option<TimeRange>,

    /// Show raw inflation levels instead of year-over-year change.
    #[arg(long)]
    pub no_yoy: bool,

    /// Render an ASCII plot.
    #[arg(long)]
    pub plot: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    #[arg(value_enum, default_value_t = ForecastIndicator::Gdp)]
    pub indicator: ForecastIndicator,

    #[arg(long, value_enum, default_value_t = Institution::All)]
    pub institution: Institution,

    /// Render the history + forecast chart.
    #[arg(long)]
    pub plot: bool,
}

#[derive(Debug, Args, Clone)]
pub struct CalendarArgs {
    #[arg(long, value_enum, default_value_t = CalendarFilter::All)]
    pub filter: CalendarFilter,
}

#[derive(Debug, Args, Clone)]
pub struct ImpactArgs {
    /// Annual household income.
    #[arg(long, default_value_t = 60_000.0)]
    pub income: f64,

    /// Annual household expenses.
    #[arg(long, default_value_t = 48_000.0)]
    pub expenses: f64,

    /// Savings balance.
    #[arg(long, default_value_t = 25_000.0)]
    pub savings: f64,

    /// Outstanding mortgage balance.
    #[arg(long, default_value_t = 300_000.0)]
    pub mortgage: f64,

    /// Mortgage term in years.
    #[arg(long, default_value_t = 30)]
    pub term: u32,

    /// Mortgage rate in percent (defaults to the current average).
    #[arg(long)]
    pub rate: Option<f64>,

    /// The mortgage has an adjustable rate.
    #[arg(long)]
    pub adjustable: bool,
}

#[derive(Debug, Args, Clone)]
pub struct RegionalArgs {
    #[arg(value_enum, default_value_t = RegionalIndicator::Mspus)]
    pub indicator: RegionalIndicator,

    /// Show the detail panel for one state (postal code).
    #[arg(long, value_name = "XX")]
    pub state: Option<String>,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_flags_parse() {
        let cli = Cli::parse_from([
            "fed", "series", "CPIAUCSL", "--range", "10y", "--transform", "yoy", "--start", "2020-01-01",
            "--export", "out.json", "--source", "fred",
        ]);
        assert_eq!(cli.global.source, Some(SourceKind::Fred));
        let Command::Series(args) = cli.command else {
            panic!("expected series");
        };
        assert_eq!(args.range, TimeRange::TenYears);
        assert_eq!(args.transform, Transform::Yoy);
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(args.export, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn page_and_regional_values() {
        let cli = Cli::parse_from(["fed", "page", "interest-rates", "--range", "ytd"]);
        let Command::Page(args) = cli.command else {
            panic!("expected page");
        };
        assert_eq!(args.page, Some(IndicatorPage::InterestRates));
        assert_eq!(args.range, Some(TimeRange::Ytd));

        let cli = Cli::parse_from(["fed", "regional", "UNRATE", "--state", "ca"]);
        let Command::Regional(args) = cli.command else {
            panic!("expected regional");
        };
        assert_eq!(args.indicator, RegionalIndicator::Unrate);
        assert_eq!(args.state.as_deref(), Some("ca"));
    }

    #[test]
    fn page_may_be_left_to_the_series() {
        let cli = Cli::parse_from(["fed", "page", "--series", "pcepi"]);
        let Command::Page(args) = cli.command else {
            panic!("expected page");
        };
        assert_eq!(args.page, None);
        assert_eq!(args.series.as_deref(), Some("pcepi"));

        assert!(Cli::try_parse_from(["fed", "page"]).is_err());
    }

    #[test]
    fn bad_date_is_rejected() {
        assert!(Cli::try_parse_from(["fed", "series", "X", "--start", "01/02/2020"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

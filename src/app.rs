//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - layers settings (file, environment, flags)
//! - installs logging
//! - builds the data source
//! - loads the requested view and prints it, or hands over to the TUI

use chrono::{Datelike, Local, NaiveDate};
use clap::Parser;

use crate::cli::{
    CalendarArgs, Command, DashboardArgs, ForecastArgs, GlobalArgs, ImpactArgs, PageArgs, RegionalArgs, SeriesArgs,
    Transform,
};
use crate::config::{LoadedSettings, Settings};
use crate::data::{EconomicApi, simulated};
use crate::domain::{IndicatorPage, SeriesData};
use crate::error::AppError;
use crate::math::change::{absolute_change, quarter_over_quarter, year_over_year};
use crate::math::impact::{HouseholdInputs, compute_impact};
use crate::report::format::{ValueFormat, formatter_for};

pub mod views;

/// Height of the small plots under the dashboard cards.
const DASHBOARD_PLOT_HEIGHT: usize = 8;
const DASHBOARD_PLOT_WIDTH: usize = 60;

/// Entry point for the `fed` binary.
pub fn run() -> Result<(), AppError> {
    // `fed` and `fed --source fred` behave like `fed tui ...`; clap needs the
    // subcommand name, so argv is rewritten before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    if let Command::Config = cli.command {
        print!("{}", crate::config::generate_default_config());
        return Ok(());
    }

    let loaded = load_settings(&cli.global)?;
    let settings = &loaded.settings;
    if let Command::Tui = cli.command {
        crate::logging::init_file(&settings.logging, &settings.logging.file)?;
    } else {
        crate::logging::init_stderr(&settings.logging);
    }
    loaded.log();

    let api = crate::data::build_source(settings)?;
    let api = api.as_ref();
    let seed = settings.simulation.seed;

    match cli.command {
        Command::Tui => crate::tui::run(settings, api),
        Command::Dashboard(args) => handle_dashboard(api, args),
        Command::Indicators => handle_indicators(api),
        Command::Series(args) => handle_series(api, args),
        Command::Latest { series_id } => handle_latest(api, &series_id),
        Command::Page(args) => handle_page(api, args),
        Command::YieldCurve => handle_yield_curve(api),
        Command::Forecast(args) => handle_forecast(api, args, seed),
        Command::Calendar(args) => handle_calendar(api, args, seed),
        Command::Impact(args) => handle_impact(api, args),
        Command::Regional(args) => handle_regional(api, args),
        Command::Config => Ok(()),
    }
}

/// Settings from file and environment, with CLI flags on top.
pub fn load_settings(global: &GlobalArgs) -> Result<LoadedSettings, AppError> {
    let mut loaded = Settings::load(global.config.as_deref())?;
    apply_cli_overrides(&mut loaded.settings, global);
    Ok(loaded)
}

fn apply_cli_overrides(settings: &mut Settings, global: &GlobalArgs) {
    if let Some(kind) = global.source {
        settings.source.kind = kind;
    }
    if let Some(url) = &global.api_url {
        settings.source.api_url = url.clone();
    }
    if let Some(seed) = global.seed {
        settings.simulation.seed = Some(seed);
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn handle_dashboard(api: &dyn EconomicApi, args: DashboardArgs) -> Result<(), AppError> {
    let view = views::load_dashboard(api, args.range, today())?;
    println!("{}", crate::report::format_dashboard(&view));

    if !args.no_plot {
        for series in view.charts.values() {
            let plot = crate::plot::render_series_plot(
                &series.title,
                &series.data,
                DASHBOARD_PLOT_WIDTH,
                DASHBOARD_PLOT_HEIGHT,
            );
            println!("{plot}");
        }
    }
    Ok(())
}

fn handle_indicators(api: &dyn EconomicApi) -> Result<(), AppError> {
    let indicators = api.indicators().map_err(|e| {
        tracing::warn!("Error fetching indicators: {e}");
        AppError::data(views::INDICATOR_OPTIONS_ERROR)
    })?;
    println!("{}", crate::report::format_catalog(&indicators));
    Ok(())
}

fn handle_latest(api: &dyn EconomicApi, series_id: &str) -> Result<(), AppError> {
    let latest = api.latest(series_id).map_err(|e| {
        tracing::warn!("Error fetching latest {series_id}: {e}");
        AppError::data(views::series_error(series_id))
    })?;
    println!("{}", crate::report::format_latest(&latest));
    Ok(())
}

fn handle_series(api: &dyn EconomicApi, args: SeriesArgs) -> Result<(), AppError> {
    let today = today();
    let (preset_start, preset_end) = args.range.date_range(today);
    let start = args.start.unwrap_or(preset_start);
    let end = args.end.unwrap_or(preset_end);
    if start > end {
        return Err(AppError::usage(format!("--start {start} is after --end {end}")));
    }

    let raw = api
        .series(&args.series_id, start, end, args.frequency.as_deref())
        .map_err(|e| {
            tracing::warn!("Error fetching {} data: {e}", args.series_id);
            AppError::data(views::series_error(&args.series_id))
        })?;
    let series = apply_transform(raw, args.transform);

    let value_format = match args.transform {
        Transform::None => formatter_for(&series.series_id),
        Transform::Qoq | Transform::Yoy => ValueFormat::Percent,
        Transform::Diff => ValueFormat::Number,
    };
    println!("{}", crate::report::format_series(&series, |v| value_format.format(v)));

    if args.plot {
        let plot = crate::plot::render_series_plot(&series.title, &series.data, args.width, args.height);
        println!("{plot}");
    }

    if let Some(path) = &args.export {
        crate::io::write_series(path, &series, args.transform.name())?;
        println!("Exported {} observations to {}", series.data.len(), path.display());
    }
    Ok(())
}

/// Replace the observations with the requested change transform.
pub fn apply_transform(mut series: SeriesData, transform: Transform) -> SeriesData {
    let (data, suffix, units) = match transform {
        Transform::None => return series,
        Transform::Qoq => (quarter_over_quarter(&series.data), "Quarter-over-Quarter % Change", "%"),
        Transform::Yoy => (year_over_year(&series.data), "Year-over-Year % Change", "%"),
        Transform::Diff => (absolute_change(&series.data), "Change", series.units.as_str()),
    };
    let units = units.to_string();
    series.data = data;
    series.title = format!("{} ({suffix})", series.title);
    series.units = units;
    series
}

/// Explicit page, or the page whose menu lists `series`.
fn resolve_page(page: Option<IndicatorPage>, series: Option<&str>) -> Result<IndicatorPage, AppError> {
    if let Some(page) = page {
        return Ok(page);
    }
    let Some(series) = series else {
        return Err(AppError::usage("Pass a page or --series."));
    };
    crate::data::catalog::page_for_series(series).ok_or_else(|| {
        AppError::usage(format!(
            "{series} is not on any page; pass the page explicitly or use `fed series {series}`."
        ))
    })
}

fn handle_page(api: &dyn EconomicApi, args: PageArgs) -> Result<(), AppError> {
    let requested = args.series.map(|s| s.to_ascii_uppercase());
    let page = resolve_page(args.page, requested.as_deref())?;
    let options = views::load_series_options(api, page)?;
    let series_id = requested.unwrap_or_else(|| page.default_series().to_string());
    if !options.iter().any(|(id, _)| *id == series_id) {
        tracing::debug!("{series_id} is not in the {} menu", page.display_name());
    }

    let range = args.range.unwrap_or(page.default_range());
    let view = views::load_indicator(api, page, &series_id, range, !args.no_yoy, today())?;

    println!("{}", crate::report::format_indicator(&view));
    if options.len() > 1 {
        let names: Vec<&str> = options.iter().map(|(id, _)| id.as_str()).collect();
        println!("Available series: {}", names.join(", "));
    }

    if args.plot {
        let plot = crate::plot::render_series_plot(&view.series.title, &view.series.data, 100, 20);
        println!("{plot}");
        if let Some(derived) = &view.derived {
            println!("{}", crate::plot::render_series_plot(&derived.title, &derived.data, 100, 12));
        }
    }
    Ok(())
}

fn handle_yield_curve(api: &dyn EconomicApi) -> Result<(), AppError> {
    let view = views::load_yield_curve(api)?;
    println!("{}", crate::report::format_yield_curve(&view));
    Ok(())
}

fn handle_forecast(api: &dyn EconomicApi, args: ForecastArgs, seed: Option<u64>) -> Result<(), AppError> {
    let today = today();
    let mut rng = simulated::rng(seed);
    let view = views::load_forecasts(api, args.indicator, today, &mut rng);
    println!("{}", crate::report::format_forecasts(&view, args.institution));

    if args.plot {
        let chart = view.chart(args.institution, today.year(), &mut rng);
        let title = format!("{} ({})", view.data.title, args.institution.display_name());
        println!("{}", crate::plot::render_series_plot(&title, &chart, 60, 12));
    }
    Ok(())
}

fn handle_calendar(api: &dyn EconomicApi, args: CalendarArgs, seed: Option<u64>) -> Result<(), AppError> {
    let mut rng = simulated::rng(seed);
    let view = views::load_calendar(api, today(), &mut rng);
    let events = view.filtered(args.filter);
    println!("{}", crate::report::format_calendar(&view, &events));
    Ok(())
}

fn handle_impact(api: &dyn EconomicApi, args: ImpactArgs) -> Result<(), AppError> {
    let conditions = views::load_conditions(api);
    let inputs = household_inputs(&args, conditions.mortgage_rate)?;
    let impact = compute_impact(&conditions, &inputs);
    println!("{}", crate::report::format_impact(&conditions, &inputs, &impact));
    Ok(())
}

fn household_inputs(args: &ImpactArgs, default_rate: f64) -> Result<HouseholdInputs, AppError> {
    let amounts = [
        ("--income", args.income),
        ("--expenses", args.expenses),
        ("--savings", args.savings),
        ("--mortgage", args.mortgage),
    ];
    if let Some((flag, _)) = amounts.iter().find(|(_, v)| !v.is_finite() || *v < 0.0) {
        return Err(AppError::usage(format!("{flag} must be a non-negative amount")));
    }
    let rate = args.rate.unwrap_or(default_rate);
    if !rate.is_finite() || rate < 0.0 {
        return Err(AppError::usage("--rate must be a non-negative percentage"));
    }

    Ok(HouseholdInputs {
        income: args.income,
        expenses: args.expenses,
        savings: args.savings,
        mortgage_balance: args.mortgage,
        mortgage_term_years: args.term,
        mortgage_rate: rate,
        adjustable_rate: args.adjustable,
    })
}

fn handle_regional(api: &dyn EconomicApi, args: RegionalArgs) -> Result<(), AppError> {
    match args.state {
        Some(code) => {
            let code = code.to_ascii_uppercase();
            if crate::data::catalog::state_name(&code).is_none() {
                return Err(AppError::usage(format!("Unknown state code '{code}'")));
            }
            let detail = views::load_state_detail(api, args.indicator, &code)?;
            println!("{}", crate::report::format_state_detail(&detail));
        }
        None => {
            let view = views::load_regional(api, args.indicator)?;
            println!("{}", crate::report::format_regional(&view));
        }
    }
    Ok(())
}

/// Rewrite argv so `fed` defaults to `fed tui`.
///
/// Rules:
/// - `fed`                      -> `fed tui`
/// - `fed --source fred ...`    -> `fed tui --source fred ...`
/// - `fed --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    if SUBCOMMANDS.contains(&arg1.as_str()) {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}

const SUBCOMMANDS: [&str; 12] = [
    "tui",
    "dashboard",
    "indicators",
    "series",
    "latest",
    "page",
    "yield-curve",
    "forecast",
    "calendar",
    "impact",
    "regional",
    "config",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Observation, SourceKind};

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rewrite_args_defaults_to_tui() {
        assert_eq!(rewrite_args(argv(&["fed"])), argv(&["fed", "tui"]));
    }

    #[test]
    fn rewrite_args_treats_leading_flags_as_tui_flags() {
        assert_eq!(
            rewrite_args(argv(&["fed", "--source", "fred"])),
            argv(&["fed", "tui", "--source", "fred"])
        );
    }

    #[test]
    fn rewrite_args_keeps_subcommands_and_help() {
        assert_eq!(rewrite_args(argv(&["fed", "yield-curve"])), argv(&["fed", "yield-curve"]));
        assert_eq!(rewrite_args(argv(&["fed", "--help"])), argv(&["fed", "--help"]));
    }

    #[test]
    fn every_subcommand_is_known_to_the_rewrite() {
        use clap::CommandFactory;
        let cmd = crate::cli::Cli::command();
        let mut names: Vec<&str> = cmd.get_subcommands().map(|c| c.get_name()).collect();
        names.sort_unstable();
        let mut known = SUBCOMMANDS.to_vec();
        known.sort_unstable();
        assert_eq!(names, known);
    }

    #[test]
    fn page_is_inferred_from_series() {
        assert_eq!(resolve_page(None, Some("PCEPI")).unwrap(), IndicatorPage::Inflation);
        assert_eq!(resolve_page(None, Some("PAYEMS")).unwrap(), IndicatorPage::Unemployment);
        assert_eq!(
            resolve_page(Some(IndicatorPage::Gdp), Some("PCEPI")).unwrap(),
            IndicatorPage::Gdp
        );

        let err = resolve_page(None, Some("SP500")).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_USAGE);
        assert!(resolve_page(None, None).is_err());
    }

    #[test]
    fn cli_flags_override_settings() {
        let mut settings = Settings::default();
        let global = GlobalArgs {
            source: Some(SourceKind::Fred),
            api_url: Some("http://example.test/api".into()),
            seed: Some(7),
            ..GlobalArgs::default()
        };
        apply_cli_overrides(&mut settings, &global);
        assert_eq!(settings.source.kind, SourceKind::Fred);
        assert_eq!(settings.source.api_url, "http://example.test/api");
        assert_eq!(settings.simulation.seed, Some(7));
    }

    #[test]
    fn yoy_transform_relabels_series() {
        let data = (0..13).map(|i| Observation::new(format!("2023-{:02}-01", i % 12 + 1), 100.0 + i as f64)).collect();
        let series = SeriesData {
            series_id: "CPIAUCSL".into(),
            title: "CPI".into(),
            units: "Index".into(),
            frequency: "M".into(),
            data,
        };
        let out = apply_transform(series, Transform::Yoy);
        assert_eq!(out.title, "CPI (Year-over-Year % Change)");
        assert_eq!(out.units, "%");
        assert_eq!(out.data.len(), 1);
        assert!((out.data[0].value.unwrap() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn negative_amounts_are_usage_errors() {
        let args = ImpactArgs {
            income: 60_000.0,
            expenses: -1.0,
            savings: 0.0,
            mortgage: 0.0,
            term: 30,
            rate: None,
            adjustable: false,
        };
        let err = household_inputs(&args, 7.1).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_USAGE);

        let ok = household_inputs(&ImpactArgs { expenses: 1.0, ..args }, 7.1).unwrap();
        assert_eq!(ok.mortgage_rate, 7.1);
    }
}

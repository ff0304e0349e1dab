//! Ratatui-based terminal dashboard.
//!
//! One tab per view. A tab loads the first time it is shown, again on `r`,
//! and whenever one of its parameters changes. Loads are synchronous and the
//! last one wins.

use std::io;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use rand::rngs::StdRng;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};

use crate::app::views::{self, CalendarView, DashboardView, ForecastView, IndicatorView, RegionalView, YieldCurveView};
use crate::config::Settings;
use crate::data::catalog::{DASHBOARD_SERIES, STATES, YIELD_CURVE_TENORS, card_meta};
use crate::data::{EconomicApi, simulated};
use crate::domain::{
    CalendarFilter, ForecastIndicator, IndicatorPage, Institution, Observation, RegionalIndicator, StateDetail,
    TimeRange,
};
use crate::error::{AppError, EXIT_DATA};
use crate::math::impact::{EconomicConditions, HouseholdInputs, compute_impact};
use crate::report::format::{format_currency, format_for_series, format_optional_date, format_percentage};

mod map;
mod plotters_chart;

use map::StateTileMap;
use plotters_chart::{Axes, ChartLine, PRIMARY, SECONDARY, draw_chart, fmt_value_axis};

/// Start the TUI.
pub fn run(settings: &Settings, api: &dyn EconomicApi) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::new(EXIT_DATA, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(api, settings.simulation.seed, crate::app::today());
    app.ensure_loaded();
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(EXIT_DATA, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(EXIT_DATA, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Dashboard,
    Rates,
    Inflation,
    Unemployment,
    Gdp,
    YieldCurve,
    Forecasts,
    Calendar,
    Calculator,
    Regional,
}

impl Tab {
    const ALL: [Tab; 10] = [
        Tab::Dashboard,
        Tab::Rates,
        Tab::Inflation,
        Tab::Unemployment,
        Tab::Gdp,
        Tab::YieldCurve,
        Tab::Forecasts,
        Tab::Calendar,
        Tab::Calculator,
        Tab::Regional,
    ];

    fn title(self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Rates => "Rates",
            Tab::Inflation => "Inflation",
            Tab::Unemployment => "Unemployment",
            Tab::Gdp => "GDP",
            Tab::YieldCurve => "Yield curve",
            Tab::Forecasts => "Forecasts",
            Tab::Calendar => "Calendar",
            Tab::Calculator => "Calculator",
            Tab::Regional => "Regional",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// `1`..`9` select the first nine tabs, `0` the tenth.
    fn from_digit(c: char) -> Option<Self> {
        let d = c.to_digit(10)? as usize;
        let idx = if d == 0 { 9 } else { d - 1 };
        Self::ALL.get(idx).copied()
    }

    fn page(self) -> Option<IndicatorPage> {
        match self {
            Tab::Rates => Some(IndicatorPage::InterestRates),
            Tab::Inflation => Some(IndicatorPage::Inflation),
            Tab::Unemployment => Some(IndicatorPage::Unemployment),
            Tab::Gdp => Some(IndicatorPage::Gdp),
            _ => None,
        }
    }

    fn help(self) -> &'static str {
        match self {
            Tab::Dashboard => "t range",
            Tab::Rates | Tab::Unemployment | Tab::Gdp => "↑/↓ series  t range",
            Tab::Inflation => "↑/↓ series  t range  y YoY",
            Tab::YieldCurve => "",
            Tab::Forecasts => "i institution  I indicator",
            Tab::Calendar => "↑/↓ scroll  f filter",
            Tab::Calculator => "↑/↓ field  +/- adjust  a adjustable",
            Tab::Regional => "↑/↓ state  Enter details  i indicator",
        }
    }
}

/// `None` until the first load; `Err` holds the message the view shows.
type Loaded<T> = Option<Result<T, String>>;

struct PageState {
    page: IndicatorPage,
    options: Vec<(String, String)>,
    selected: usize,
    range: TimeRange,
    yoy: bool,
    view: Loaded<IndicatorView>,
}

impl PageState {
    fn new(page: IndicatorPage) -> Self {
        Self {
            page,
            options: Vec::new(),
            selected: 0,
            range: page.default_range(),
            yoy: true,
            view: None,
        }
    }

    fn series_id(&self) -> String {
        self.options
            .get(self.selected)
            .map(|(id, _)| id.clone())
            .unwrap_or_else(|| self.page.default_series().to_string())
    }
}

struct ForecastState {
    indicator: ForecastIndicator,
    institution: Institution,
    view: Option<ForecastView>,
    chart: Vec<Observation>,
}

struct CalendarState {
    filter: CalendarFilter,
    view: Option<CalendarView>,
    scroll: u16,
}

const CALCULATOR_FIELDS: [&str; 7] = [
    "Annual income",
    "Annual expenses",
    "Savings",
    "Mortgage balance",
    "Mortgage term",
    "Mortgage rate",
    "Adjustable rate",
];

struct CalculatorState {
    inputs: HouseholdInputs,
    conditions: Option<EconomicConditions>,
    field: usize,
}

struct RegionalState {
    indicator: RegionalIndicator,
    view: Loaded<RegionalView>,
    /// Index into the fixed state table.
    selected: usize,
    detail: Loaded<StateDetail>,
}

struct App<'a> {
    api: &'a dyn EconomicApi,
    rng: StdRng,
    today: NaiveDate,
    tab: Tab,
    status: String,
    dashboard_range: TimeRange,
    dashboard: Loaded<DashboardView>,
    /// Rates, inflation, unemployment, GDP.
    pages: Vec<PageState>,
    yield_curve: Loaded<YieldCurveView>,
    forecast: ForecastState,
    calendar: CalendarState,
    calculator: CalculatorState,
    regional: RegionalState,
}

impl<'a> App<'a> {
    fn new(api: &'a dyn EconomicApi, seed: Option<u64>, today: NaiveDate) -> Self {
        Self {
            api,
            rng: simulated::rng(seed),
            today,
            tab: Tab::Dashboard,
            status: String::new(),
            dashboard_range: TimeRange::OneYear,
            dashboard: None,
            pages: [
                IndicatorPage::InterestRates,
                IndicatorPage::Inflation,
                IndicatorPage::Unemployment,
                IndicatorPage::Gdp,
            ]
            .into_iter()
            .map(PageState::new)
            .collect(),
            yield_curve: None,
            forecast: ForecastState {
                indicator: ForecastIndicator::Gdp,
                institution: Institution::All,
                view: None,
                chart: Vec::new(),
            },
            calendar: CalendarState {
                filter: CalendarFilter::All,
                view: None,
                scroll: 0,
            },
            calculator: CalculatorState {
                inputs: HouseholdInputs::default(),
                conditions: None,
                field: 0,
            },
            regional: RegionalState {
                indicator: RegionalIndicator::Mspus,
                view: None,
                selected: 0,
                detail: None,
            },
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(EXIT_DATA, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(EXIT_DATA, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(EXIT_DATA, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Right | KeyCode::Tab => self.switch_tab(self.tab.next()),
            KeyCode::Left | KeyCode::BackTab => self.switch_tab(self.tab.prev()),
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if let Some(tab) = Tab::from_digit(c) {
                    self.switch_tab(tab);
                }
            }
            KeyCode::Char('r') => self.reload(),
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Char('t') => self.cycle_range(),
            KeyCode::Char('y') => self.toggle_yoy(),
            KeyCode::Char('i') => self.cycle_selector(),
            KeyCode::Char('I') => self.cycle_forecast_indicator(),
            KeyCode::Char('f') => self.cycle_filter(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_calculator(1.0),
            KeyCode::Char('-') => self.adjust_calculator(-1.0),
            KeyCode::Char('a') => {
                if self.tab == Tab::Calculator {
                    self.calculator.inputs.adjustable_rate = !self.calculator.inputs.adjustable_rate;
                }
            }
            KeyCode::Enter => {
                if self.tab == Tab::Regional {
                    self.load_state_detail();
                }
            }
            _ => {}
        }
        false
    }

    fn switch_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.status.clear();
        self.ensure_loaded();
    }

    fn page_index(page: IndicatorPage) -> usize {
        match page {
            IndicatorPage::InterestRates => 0,
            IndicatorPage::Inflation => 1,
            IndicatorPage::Unemployment => 2,
            IndicatorPage::Gdp => 3,
        }
    }

    fn ensure_loaded(&mut self) {
        let loaded = match self.tab {
            Tab::Dashboard => self.dashboard.is_some(),
            Tab::YieldCurve => self.yield_curve.is_some(),
            Tab::Forecasts => self.forecast.view.is_some(),
            Tab::Calendar => self.calendar.view.is_some(),
            Tab::Calculator => self.calculator.conditions.is_some(),
            Tab::Regional => self.regional.view.is_some(),
            tab => tab
                .page()
                .is_some_and(|p| self.pages[Self::page_index(p)].view.is_some()),
        };
        if !loaded {
            self.reload();
        }
    }

    /// Load the current tab from the data source.
    fn reload(&mut self) {
        let api = self.api;
        let today = self.today;
        match self.tab {
            Tab::Dashboard => {
                let result = views::load_dashboard(api, self.dashboard_range, today);
                self.status = status_of(&result, "dashboard");
                self.dashboard = Some(result.map_err(|e| e.to_string()));
            }
            Tab::YieldCurve => {
                let result = views::load_yield_curve(api);
                self.status = status_of(&result, "yield curve");
                self.yield_curve = Some(result.map_err(|e| e.to_string()));
            }
            Tab::Forecasts => {
                let view = views::load_forecasts(api, self.forecast.indicator, today, &mut self.rng);
                self.status = if view.simulated {
                    "Using simulated forecasts".to_string()
                } else {
                    "Loaded forecasts".to_string()
                };
                self.forecast.view = Some(view);
                self.rebuild_forecast_chart();
            }
            Tab::Calendar => {
                let view = views::load_calendar(api, today, &mut self.rng);
                self.status = if view.simulated {
                    "Using simulated calendar".to_string()
                } else {
                    "Loaded calendar".to_string()
                };
                self.calendar.view = Some(view);
                self.calendar.scroll = 0;
            }
            Tab::Calculator => {
                let conditions = views::load_conditions(api);
                if self.calculator.conditions.is_none() {
                    self.calculator.inputs.mortgage_rate = conditions.mortgage_rate;
                }
                self.calculator.conditions = Some(conditions);
                self.status = "Loaded economic conditions".to_string();
            }
            Tab::Regional => {
                let result = views::load_regional(api, self.regional.indicator);
                self.status = status_of(&result, "regional data");
                self.regional.view = Some(result.map_err(|e| e.to_string()));
                self.regional.detail = None;
            }
            tab => {
                if let Some(page) = tab.page() {
                    self.load_page(page);
                }
            }
        }
    }

    fn load_page(&mut self, page: IndicatorPage) {
        let api = self.api;
        let today = self.today;
        let state = &mut self.pages[Self::page_index(page)];

        if state.options.is_empty() {
            match views::load_series_options(api, page) {
                Ok(options) => {
                    state.selected = options
                        .iter()
                        .position(|(id, _)| id == page.default_series())
                        .unwrap_or(0);
                    state.options = options;
                }
                Err(e) => {
                    self.status = e.to_string();
                    state.view = Some(Err(e.to_string()));
                    return;
                }
            }
        }

        let series_id = state.series_id();
        let result = views::load_indicator(api, page, &series_id, state.range, state.yoy, today);
        self.status = status_of(&result, &series_id);
        state.view = Some(result.map_err(|e| e.to_string()));
    }

    fn rebuild_forecast_chart(&mut self) {
        let year = self.today.year();
        if let Some(view) = &self.forecast.view {
            self.forecast.chart = view.chart(self.forecast.institution, year, &mut self.rng);
        }
    }

    fn load_state_detail(&mut self) {
        let Some(&(code, _)) = STATES.get(self.regional.selected) else {
            return;
        };
        let result = views::load_state_detail(self.api, self.regional.indicator, code);
        self.status = status_of(&result, code);
        self.regional.detail = Some(result.map_err(|e| e.to_string()));
    }

    fn move_selection(&mut self, delta: i32) {
        match self.tab {
            Tab::Calendar => {
                self.calendar.scroll = step_index(self.calendar.scroll as usize, delta, u16::MAX as usize) as u16;
            }
            Tab::Calculator => {
                self.calculator.field = step_index(self.calculator.field, delta, CALCULATOR_FIELDS.len());
            }
            Tab::Regional => {
                self.regional.selected = step_index(self.regional.selected, delta, STATES.len());
                self.regional.detail = None;
            }
            tab => {
                let Some(page) = tab.page() else {
                    return;
                };
                let state = &mut self.pages[Self::page_index(page)];
                if state.options.is_empty() {
                    return;
                }
                let next = step_index(state.selected, delta, state.options.len());
                if next != state.selected {
                    state.selected = next;
                    self.load_page(page);
                }
            }
        }
    }

    fn cycle_range(&mut self) {
        match self.tab {
            Tab::Dashboard => {
                self.dashboard_range = self.dashboard_range.next();
                self.reload();
            }
            tab => {
                if let Some(page) = tab.page() {
                    let state = &mut self.pages[Self::page_index(page)];
                    state.range = state.range.next();
                    self.load_page(page);
                }
            }
        }
    }

    fn toggle_yoy(&mut self) {
        if self.tab == Tab::Inflation {
            let state = &mut self.pages[Self::page_index(IndicatorPage::Inflation)];
            state.yoy = !state.yoy;
            self.load_page(IndicatorPage::Inflation);
        }
    }

    fn cycle_selector(&mut self) {
        match self.tab {
            Tab::Forecasts => {
                self.forecast.institution = self.forecast.institution.next();
                self.rebuild_forecast_chart();
            }
            Tab::Regional => {
                self.regional.indicator = self.regional.indicator.next();
                self.reload();
            }
            _ => {}
        }
    }

    fn cycle_forecast_indicator(&mut self) {
        if self.tab == Tab::Forecasts {
            self.forecast.indicator = self.forecast.indicator.next();
            self.reload();
        }
    }

    fn cycle_filter(&mut self) {
        if self.tab == Tab::Calendar {
            self.calendar.filter = self.calendar.filter.next();
            self.calendar.scroll = 0;
        }
    }

    fn adjust_calculator(&mut self, direction: f64) {
        if self.tab == Tab::Calculator {
            adjust_input(&mut self.calculator.inputs, self.calculator.field, direction);
        }
    }

    fn draw(&self, frame: &mut Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        self.draw_tabs(frame, chunks[0]);
        match self.tab {
            Tab::Dashboard => self.draw_dashboard(frame, chunks[1]),
            Tab::YieldCurve => self.draw_yield_curve(frame, chunks[1]),
            Tab::Forecasts => self.draw_forecasts(frame, chunks[1]),
            Tab::Calendar => self.draw_calendar(frame, chunks[1]),
            Tab::Calculator => self.draw_calculator(frame, chunks[1]),
            Tab::Regional => self.draw_regional(frame, chunks[1]),
            tab => {
                if let Some(page) = tab.page() {
                    self.draw_page(frame, chunks[1], &self.pages[Self::page_index(page)]);
                }
            }
        }
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_tabs(&self, frame: &mut Frame<'_>, area: Rect) {
        let titles = Tab::ALL
            .iter()
            .enumerate()
            .map(|(i, t)| format!("{} {}", (i + 1) % 10, t.title()));
        let tabs = Tabs::new(titles)
            .select(self.tab.index())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Federal Reserve & Economic Indicator Tracker"),
            )
            .style(Style::default().fg(Color::Gray))
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, area);
    }

    fn draw_dashboard(&self, frame: &mut Frame<'_>, area: Rect) {
        let Some(view) = loaded_or_message(frame, area, "Dashboard", &self.dashboard) else {
            return;
        };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0)])
            .split(area);
        let cards = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(rows[0]);

        for (rect, id) in cards.iter().zip(DASHBOARD_SERIES) {
            let (title, value, date) = crate::report::card_line(view.snapshot.get(id), id);
            let (accent, arrow, description) = card_meta(id)
                .map(|m| (Color::Rgb(m.color.0, m.color.1, m.color.2), m.trend.arrow(), m.description))
                .unwrap_or((Color::White, "", ""));
            let text = Text::from(vec![
                Line::from(vec![
                    Span::styled(value, Style::default().fg(accent).add_modifier(Modifier::BOLD)),
                    Span::raw(format!(" {arrow}")),
                ]),
                Line::from(Span::styled(format!("as of {date}"), Style::default().fg(Color::Gray))),
                Line::from(Span::styled(description, Style::default().fg(Color::DarkGray))),
            ]);
            let card = Paragraph::new(text).block(Block::default().title(title).borders(Borders::ALL));
            frame.render_widget(card, *rect);
        }

        let halves = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);
        let mut cells = Vec::with_capacity(4);
        for half in halves.iter() {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(*half);
            cells.extend(cols.iter().copied());
        }

        for (rect, id) in cells.into_iter().zip(DASHBOARD_SERIES) {
            match view.charts.get(id) {
                Some(series) => {
                    let line = ChartLine::from_observations(&series.data, PRIMARY);
                    let title = format!("{} ({})", series.title, self.dashboard_range.label());
                    draw_chart(frame, rect, &title, &[line], &[], Axes::dated(&series.units), "No data");
                }
                None => draw_message(frame, rect, id, "No data", Color::Yellow),
            }
        }
    }

    fn draw_page(&self, frame: &mut Frame<'_>, area: Rect, state: &PageState) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(34), Constraint::Min(0)])
            .split(area);

        let items: Vec<ListItem> = state
            .options
            .iter()
            .map(|(id, name)| ListItem::new(format!("{id}  {name}")))
            .collect();
        let list = List::new(items)
            .block(Block::default().title("Series").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");
        let mut list_state = ListState::default();
        if !state.options.is_empty() {
            list_state.select(Some(state.selected));
        }
        frame.render_stateful_widget(list, cols[0], &mut list_state);

        let Some(view) = loaded_or_message(frame, cols[1], state.page.display_name(), &state.view) else {
            return;
        };

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(cols[1]);

        let latest = view.latest();
        let value = latest.and_then(|o| o.value);
        let shown = if view.yoy {
            format_percentage(value, 2)
        } else {
            format_for_series(&view.series.series_id, value)
        };
        let mut settings = format!("Range: {}", view.range.label());
        if state.page == IndicatorPage::Inflation {
            settings.push_str(if view.yoy { " | YoY: on" } else { " | YoY: off" });
        }
        let header = Paragraph::new(Text::from(vec![
            Line::from(vec![
                Span::styled(shown, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                Span::raw(format!(
                    "  as of {}",
                    format_optional_date(latest.map(|o| o.date.as_str()))
                )),
            ]),
            Line::from(Span::styled(settings, Style::default().fg(Color::Gray))),
        ]))
        .block(Block::default().title(view.series.title.clone()).borders(Borders::ALL));
        frame.render_widget(header, right[0]);

        let main = ChartLine::from_observations(&view.series.data, PRIMARY);
        match &view.derived {
            Some(derived) => {
                let charts = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                    .split(right[1]);
                draw_chart(
                    frame,
                    charts[0],
                    &view.series.title,
                    &[main],
                    &[],
                    Axes::dated(&view.series.units),
                    "No data",
                );
                let line = ChartLine::from_observations(&derived.data, SECONDARY);
                let units = if view.series.series_id == "PAYEMS" { "thousands" } else { "%" };
                draw_chart(frame, charts[1], &derived.title, &[line], &[], Axes::dated(units), "No data");
            }
            None => draw_chart(
                frame,
                right[1],
                &view.series.title,
                &[main],
                &[],
                Axes::dated(&view.series.units),
                "No data",
            ),
        }
    }

    fn draw_yield_curve(&self, frame: &mut Frame<'_>, area: Rect) {
        let Some(view) = loaded_or_message(frame, area, "Treasury Yield Curve", &self.yield_curve) else {
            return;
        };
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(46), Constraint::Min(0)])
            .split(area);

        let table = Paragraph::new(crate::report::format_yield_curve(view))
            .block(Block::default().title("Constant maturity").borders(Borders::ALL));
        frame.render_widget(table, cols[0]);

        let points: Vec<(f64, f64)> = view
            .points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.value.map(|v| (i as f64, v)))
            .collect();
        let axes = Axes {
            x_label: "maturity",
            y_label: "%",
            fmt_x: fmt_tenor_axis,
            fmt_y: fmt_value_axis,
        };
        let title = if view.is_inverted() { "Yield curve (inverted)" } else { "Yield curve" };
        let line = ChartLine::new(points.clone(), PRIMARY);
        draw_chart(frame, cols[1], title, &[line], &points, axes, "No data");
    }

    fn draw_forecasts(&self, frame: &mut Frame<'_>, area: Rect) {
        let Some(view) = &self.forecast.view else {
            draw_message(frame, area, "Forecasts", "Loading...", Color::Yellow);
            return;
        };
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let table = Paragraph::new(crate::report::format_forecasts(view, self.forecast.institution))
            .wrap(Wrap { trim: false })
            .block(Block::default().title("Forecasts").borders(Borders::ALL));
        frame.render_widget(table, cols[0]);

        let line = ChartLine::from_observations(&self.forecast.chart, PRIMARY);
        let title = format!("{} ({})", view.data.title, self.forecast.institution.display_name());
        draw_chart(frame, cols[1], &title, &[line], &[], Axes::dated(&view.data.units), "No data");
    }

    fn draw_calendar(&self, frame: &mut Frame<'_>, area: Rect) {
        let Some(view) = &self.calendar.view else {
            draw_message(frame, area, "Economic Calendar", "Loading...", Color::Yellow);
            return;
        };
        let events = view.filtered(self.calendar.filter);
        let body = Paragraph::new(crate::report::format_calendar(view, &events))
            .scroll((self.calendar.scroll, 0))
            .block(
                Block::default()
                    .title(format!("Economic Calendar: {}", self.calendar.filter.display_name()))
                    .borders(Borders::ALL),
            );
        frame.render_widget(body, area);
    }

    fn draw_calculator(&self, frame: &mut Frame<'_>, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(42), Constraint::Min(0)])
            .split(area);

        let inputs = &self.calculator.inputs;
        let items: Vec<ListItem> = CALCULATOR_FIELDS
            .iter()
            .enumerate()
            .map(|(i, name)| ListItem::new(format!("{name:<18} {}", input_value(inputs, i))))
            .collect();
        let list = List::new(items)
            .block(Block::default().title("Household").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");
        let mut state = ListState::default();
        state.select(Some(self.calculator.field));
        frame.render_stateful_widget(list, cols[0], &mut state);

        let conditions = self.calculator.conditions.unwrap_or_default();
        let impact = compute_impact(&conditions, inputs);
        let report = Paragraph::new(crate::report::format_impact(&conditions, inputs, &impact))
            .wrap(Wrap { trim: false })
            .block(Block::default().title("Annual impact").borders(Borders::ALL));
        frame.render_widget(report, cols[1]);
    }

    fn draw_regional(&self, frame: &mut Frame<'_>, area: Rect) {
        let Some(view) = loaded_or_message(frame, area, "Regional", &self.regional.view) else {
            return;
        };
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(46)])
            .split(area);

        let selected = STATES.get(self.regional.selected).map(|(code, _)| *code);
        let block = Block::default()
            .title(format!("{} by State", view.snapshot.name))
            .borders(Borders::ALL);
        let inner = block.inner(cols[0]);
        frame.render_widget(block, cols[0]);
        frame.render_widget(StateTileMap { view, selected }, inner);

        let text = match (&self.regional.detail, selected) {
            (Some(Ok(detail)), _) => crate::report::format_state_detail(detail),
            (Some(Err(msg)), _) => msg.clone(),
            (None, Some(code)) => state_summary(view, code),
            (None, None) => String::new(),
        };
        let detail = Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(Block::default().title("State").borders(Borders::ALL));
        frame.render_widget(detail, cols[1]);
    }

    fn draw_footer(&self, frame: &mut Frame<'_>, area: Rect) {
        let help = format!("←/→ 1-0 tab  {}  r reload  q quit", self.tab.help());
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(self.status.as_str(), Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn status_of<T>(result: &Result<T, AppError>, what: &str) -> String {
    match result {
        Ok(_) => format!("Loaded {what}"),
        Err(e) => e.to_string(),
    }
}

/// Draws the loading or error state and returns `None`, or hands back the view.
fn loaded_or_message<'v, T>(frame: &mut Frame<'_>, area: Rect, title: &str, slot: &'v Loaded<T>) -> Option<&'v T> {
    match slot {
        Some(Ok(view)) => Some(view),
        Some(Err(msg)) => {
            draw_message(frame, area, title, msg, Color::Red);
            None
        }
        None => {
            draw_message(frame, area, title, "Loading...", Color::Yellow);
            None
        }
    }
}

fn draw_message(frame: &mut Frame<'_>, area: Rect, title: &str, msg: &str, color: Color) {
    let p = Paragraph::new(msg.to_string())
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: true })
        .block(Block::default().title(title.to_string()).borders(Borders::ALL));
    frame.render_widget(p, area);
}

fn fmt_tenor_axis(v: f64) -> String {
    if v < -0.5 {
        return String::new();
    }
    YIELD_CURVE_TENORS
        .get(v.round() as usize)
        .map(|(label, _)| label.to_string())
        .unwrap_or_default()
}

/// Move `current` by `delta`, clamped to `0..len`.
fn step_index(current: usize, delta: i32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let next = current as i64 + delta as i64;
    next.clamp(0, len as i64 - 1) as usize
}

fn input_value(inputs: &HouseholdInputs, field: usize) -> String {
    match field {
        0 => format_currency(Some(inputs.income), 0),
        1 => format_currency(Some(inputs.expenses), 0),
        2 => format_currency(Some(inputs.savings), 0),
        3 => format_currency(Some(inputs.mortgage_balance), 0),
        4 => format!("{} years", inputs.mortgage_term_years),
        5 => format_percentage(Some(inputs.mortgage_rate), 2),
        _ => if inputs.adjustable_rate { "yes" } else { "no" }.to_string(),
    }
}

/// Step one calculator field up (`direction > 0`) or down. Amounts never go
/// negative and the term stays within 5..=40 years.
fn adjust_input(inputs: &mut HouseholdInputs, field: usize, direction: f64) {
    let step = |value: f64, size: f64| (value + size * direction).max(0.0);
    match field {
        0 => inputs.income = step(inputs.income, 1_000.0),
        1 => inputs.expenses = step(inputs.expenses, 1_000.0),
        2 => inputs.savings = step(inputs.savings, 1_000.0),
        3 => inputs.mortgage_balance = step(inputs.mortgage_balance, 10_000.0),
        4 => {
            inputs.mortgage_term_years = if direction > 0.0 {
                (inputs.mortgage_term_years + 5).min(40)
            } else {
                inputs.mortgage_term_years.saturating_sub(5).max(5)
            };
        }
        5 => inputs.mortgage_rate = (step(inputs.mortgage_rate, 0.125) * 1000.0).round() / 1000.0,
        _ => inputs.adjustable_rate = !inputs.adjustable_rate,
    }
}

/// Detail panel text before the full state detail is requested.
fn state_summary(view: &RegionalView, code: &str) -> String {
    let snapshot = &view.snapshot;
    let Some(record) = snapshot.states.iter().find(|s| s.code == code) else {
        return format!("{code}: no data\n\nEnter: load details");
    };
    let value = if snapshot.units == "percent" {
        format_percentage(record.value, 1)
    } else {
        format_currency(record.value, 0)
    };
    let mut out = format!(
        "{} ({})\n{}: {} as of {}\n",
        record.name,
        record.code,
        snapshot.name,
        value,
        format_optional_date(record.date.as_deref()),
    );
    if let Some(overview) = &record.overview {
        out.push_str(&format!("\n{overview}\n"));
    }
    out.push_str("\nEnter: load details");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_select_tabs() {
        assert_eq!(Tab::from_digit('1'), Some(Tab::Dashboard));
        assert_eq!(Tab::from_digit('6'), Some(Tab::YieldCurve));
        assert_eq!(Tab::from_digit('0'), Some(Tab::Regional));
        assert_eq!(Tab::Regional.next(), Tab::Dashboard);
        assert_eq!(Tab::Dashboard.prev(), Tab::Regional);
    }

    #[test]
    fn selection_is_clamped() {
        assert_eq!(step_index(0, -1, 5), 0);
        assert_eq!(step_index(4, 1, 5), 4);
        assert_eq!(step_index(2, 1, 5), 3);
        assert_eq!(step_index(3, 1, 0), 0);
    }

    #[test]
    fn calculator_fields_step_within_limits() {
        let mut inputs = HouseholdInputs {
            savings: 500.0,
            mortgage_term_years: 5,
            ..HouseholdInputs::default()
        };
        adjust_input(&mut inputs, 2, -1.0);
        assert_eq!(inputs.savings, 0.0);
        adjust_input(&mut inputs, 4, -1.0);
        assert_eq!(inputs.mortgage_term_years, 5);
        for _ in 0..10 {
            adjust_input(&mut inputs, 4, 1.0);
        }
        assert_eq!(inputs.mortgage_term_years, 40);
        adjust_input(&mut inputs, 5, 1.0);
        assert!((inputs.mortgage_rate - 7.225).abs() < 1e-9);
        adjust_input(&mut inputs, 6, 1.0);
        assert!(inputs.adjustable_rate);
        assert_eq!(input_value(&inputs, 6), "yes");
    }

    #[test]
    fn tenor_axis_uses_curve_labels() {
        assert_eq!(fmt_tenor_axis(0.0), "1 Mo");
        assert_eq!(fmt_tenor_axis(10.2), "30 Yr");
        assert_eq!(fmt_tenor_axis(-1.0), "");
    }
}

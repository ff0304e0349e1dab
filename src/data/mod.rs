//! Data sources.
//!
//! Views never talk HTTP themselves: they call an [`EconomicApi`], which is
//! either the dashboard REST backend ([`backend::BackendClient`]) or FRED
//! directly ([`fred_source::FredSource`]).

pub mod backend;
pub mod catalog;
pub mod fred;
pub mod fred_source;
pub mod regional;
pub mod simulated;

use std::time::Duration;

use chrono::NaiveDate;

use crate::config::Settings;
use crate::domain::{
    CalendarEvent, DashboardSnapshot, ForecastData, ForecastIndicator, IndicatorInfo, LatestValue,
    RegionalIndicator, RegionalSnapshot, SeriesData, SourceKind, StateDetail,
};
use crate::error::AppError;

/// The economic data collaborator.
pub trait EconomicApi: Send + Sync {
    fn indicators(&self) -> Result<Vec<IndicatorInfo>, AppError>;

    /// Observations of `series_id` between `start` and `end` (inclusive).
    /// `frequency` is a FRED aggregation code such as `m` or `q`.
    fn series(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        frequency: Option<&str>,
    ) -> Result<SeriesData, AppError>;

    fn latest(&self, series_id: &str) -> Result<LatestValue, AppError>;

    fn dashboard(&self) -> Result<DashboardSnapshot, AppError>;

    fn regional(&self, indicator: RegionalIndicator) -> Result<RegionalSnapshot, AppError>;

    fn state_detail(&self, indicator: RegionalIndicator, state_code: &str) -> Result<StateDetail, AppError>;

    fn forecasts(&self, indicator: ForecastIndicator) -> Result<ForecastData, AppError>;

    fn calendar(&self) -> Result<Vec<CalendarEvent>, AppError>;
}

/// Build the source selected by `settings.source.kind`.
pub fn build_source(settings: &Settings) -> Result<Box<dyn EconomicApi>, AppError> {
    let timeout = Duration::from_secs(settings.source.timeout_secs);
    match settings.source.kind {
        SourceKind::Api => {
            tracing::info!(url = %settings.source.api_url, "using REST backend");
            Ok(Box::new(backend::BackendClient::new(&settings.source.api_url, timeout)?))
        }
        SourceKind::Fred => {
            let key = settings.source.fred_api_key.clone().unwrap_or_default();
            let client = fred::FredClient::new(key, timeout)?;
            tracing::info!("using FRED directly");
            Ok(Box::new(fred_source::FredSource::new(client, settings.simulation.seed)))
        }
    }
}

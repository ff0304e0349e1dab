//! [`EconomicApi`] served straight from FRED.
//!
//! Mirrors the dashboard backend's routes so the views behave the same with
//! either source. FRED publishes neither forecasts nor a release calendar;
//! those calls fail and the views fall back to simulated data.

use chrono::{Local, NaiveDate};
use rayon::prelude::*;

use crate::data::EconomicApi;
use crate::data::catalog::{DASHBOARD_SERIES, indicator_catalog};
use crate::data::fred::FredClient;
use crate::data::{regional, simulated};
use crate::domain::{
    CalendarEvent, DashboardSnapshot, ForecastData, ForecastIndicator, IndicatorInfo, LatestValue,
    RegionalIndicator, RegionalSnapshot, SeriesData, StateDetail,
};
use crate::error::AppError;

pub struct FredSource {
    client: FredClient,
    seed: Option<u64>,
}

impl FredSource {
    pub fn new(client: FredClient, seed: Option<u64>) -> Self {
        Self { client, seed }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

impl EconomicApi for FredSource {
    fn indicators(&self) -> Result<Vec<IndicatorInfo>, AppError> {
        Ok(indicator_catalog())
    }

    fn series(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        frequency: Option<&str>,
    ) -> Result<SeriesData, AppError> {
        self.client.series_data(series_id, start, end, frequency)
    }

    fn latest(&self, series_id: &str) -> Result<LatestValue, AppError> {
        self.client.latest_value(series_id)
    }

    fn dashboard(&self) -> Result<DashboardSnapshot, AppError> {
        DASHBOARD_SERIES
            .par_iter()
            .map(|id| self.client.latest_value(id).map(|v| (id.to_string(), v)))
            .collect()
    }

    fn regional(&self, indicator: RegionalIndicator) -> Result<RegionalSnapshot, AppError> {
        let mut rng = simulated::rng(self.seed);
        Ok(regional::regional_snapshot(indicator, today(), &mut rng, |id| {
            self.client.latest_observation(id)
        }))
    }

    fn state_detail(&self, indicator: RegionalIndicator, state_code: &str) -> Result<StateDetail, AppError> {
        let mut rng = simulated::rng(self.seed);
        regional::state_detail(indicator, state_code, today(), &mut rng, |id| {
            self.client.latest_observation(id)
        })
    }

    fn forecasts(&self, indicator: ForecastIndicator) -> Result<ForecastData, AppError> {
        Err(AppError::data(format!(
            "FRED does not publish {} forecasts.",
            indicator.display_name()
        )))
    }

    fn calendar(&self) -> Result<Vec<CalendarEvent>, AppError> {
        Err(AppError::data("FRED does not publish an economic calendar."))
    }
}

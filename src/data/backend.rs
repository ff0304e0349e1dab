//! Client for the dashboard REST backend (`/api/...`).

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Url;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

use crate::data::EconomicApi;
use crate::domain::{
    CalendarEvent, CalendarResponse, DashboardSnapshot, ForecastData, ForecastIndicator,
    IndicatorCatalog, IndicatorInfo, LatestValue, RegionalIndicator, RegionalSnapshot, SeriesData,
    StateDetail,
};
use crate::error::AppError;

pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(AppError::usage("API base URL must not be empty."));
        }
        match Url::parse(&base_url) {
            Ok(url) if !url.cannot_be_a_base() => {}
            _ => return Err(AppError::usage(format!("Invalid API base URL '{base_url}'."))),
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::data(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL with `segments` appended, each one percent-encoded so an id
    /// can't change the route.
    fn url(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| AppError::usage(format!("Invalid API base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| AppError::usage(format!("Invalid API base URL '{}'.", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(&self, segments: &[&str], query: &[(&str, String)]) -> Result<T, AppError> {
        let url = self.url(segments)?;
        tracing::debug!(%url, "GET");

        let resp = self
            .client
            .get(url.clone())
            .query(query)
            .send()
            .map_err(|e| AppError::data(format!("Request to {url} failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().unwrap_or_default();
            return Err(AppError::data(format!(
                "Request to {url} failed with status {status}{}",
                error_detail(&detail)
            )));
        }

        resp.json()
            .map_err(|e| AppError::data(format!("Failed to parse response from {url}: {e}")))
    }
}

/// `": <detail>"` from a FastAPI-style `{"detail": "..."}` error body.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}

impl EconomicApi for BackendClient {
    fn indicators(&self) -> Result<Vec<IndicatorInfo>, AppError> {
        let catalog: IndicatorCatalog = self.get_json(&["indicators"], &[])?;
        Ok(catalog.indicators)
    }

    fn series(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        frequency: Option<&str>,
    ) -> Result<SeriesData, AppError> {
        let mut query = vec![
            ("start_date", start.format("%Y-%m-%d").to_string()),
            ("end_date", end.format("%Y-%m-%d").to_string()),
        ];
        if let Some(freq) = frequency {
            query.push(("frequency", freq.to_string()));
        }
        self.get_json(&["indicator", series_id], &query)
    }

    fn latest(&self, series_id: &str) -> Result<LatestValue, AppError> {
        self.get_json(&["latest", series_id], &[])
    }

    fn dashboard(&self) -> Result<DashboardSnapshot, AppError> {
        self.get_json(&["dashboard"], &[])
    }

    fn regional(&self, indicator: RegionalIndicator) -> Result<RegionalSnapshot, AppError> {
        self.get_json(&["regional", indicator.id()], &[])
    }

    fn state_detail(&self, indicator: RegionalIndicator, state_code: &str) -> Result<StateDetail, AppError> {
        let state_code = state_code.to_ascii_uppercase();
        self.get_json(&["regional", indicator.id(), state_code.as_str()], &[])
    }

    fn forecasts(&self, indicator: ForecastIndicator) -> Result<ForecastData, AppError> {
        self.get_json(&["forecasts", indicator.id()], &[])
    }

    fn calendar(&self) -> Result<Vec<CalendarEvent>, AppError> {
        let body: CalendarResponse = self.get_json(&["economic-calendar"], &[])?;
        Ok(body.events)
    }
}

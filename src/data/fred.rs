//! FRED API integration.
//!
//! Two endpoints are used: `series/observations` for data points and `series`
//! for the title/units/frequency metadata shown next to each chart.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::domain::{LatestValue, Observation, SeriesData};
use crate::error::AppError;

const BASE_URL: &str = "https://api.stlouisfed.org/fred";

/// Rows fetched when looking for the latest value. Daily series carry `"."`
/// rows on market holidays, so the newest row alone is often empty.
const LATEST_WINDOW: usize = 10;

/// Outcome of a lookup that tolerates missing series.
///
/// FRED answers an unknown `series_id` with 400 (and some proxies with 404);
/// callers that probe state-level series want to tell that apart from a
/// transport failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

/// Series metadata from `fred/series`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesInfo {
    pub title: String,
    pub units: String,
    pub frequency: String,
}

/// Optional filters for `series/observations`.
#[derive(Debug, Clone, Default)]
pub struct ObservationQuery<'a> {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// FRED frequency code (`m`, `q`, `a`, ...).
    pub frequency: Option<&'a str>,
    /// Newest first, capped at `limit`.
    pub newest_first: bool,
    pub limit: Option<usize>,
}

pub struct FredClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FredClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AppError::usage("Missing FRED_API_KEY in environment (.env)."));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::data(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            base_url: BASE_URL.to_string(),
        })
    }

    /// Full series with metadata, ascending by date, missing values dropped.
    pub fn series_data(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        frequency: Option<&str>,
    ) -> Result<SeriesData, AppError> {
        let query = ObservationQuery {
            start: Some(start),
            end: Some(end),
            frequency,
            ..Default::default()
        };
        let mut data = match self.observations(series_id, &query)? {
            Lookup::Found(obs) => obs,
            Lookup::NotFound => {
                return Err(AppError::data(format!("FRED series {series_id} not found.")));
            }
        };
        data.retain(|o| o.value.is_some());
        data.sort_by(|a, b| a.date.cmp(&b.date));

        let info = self.series_info(series_id)?;
        Ok(SeriesData {
            series_id: series_id.to_string(),
            title: info.title,
            units: info.units,
            frequency: info.frequency,
            data,
        })
    }

    /// Latest observation plus metadata. An empty series yields `value: None`.
    pub fn latest_value(&self, series_id: &str) -> Result<LatestValue, AppError> {
        let latest = match self.latest_observation(series_id)? {
            Lookup::Found(latest) => latest,
            Lookup::NotFound => {
                return Err(AppError::data(format!("FRED series {series_id} not found.")));
            }
        };
        let Some(latest) = latest else {
            return Ok(LatestValue {
                series_id: series_id.to_string(),
                ..Default::default()
            });
        };

        let info = self.series_info(series_id)?;
        Ok(LatestValue {
            series_id: series_id.to_string(),
            title: info.title,
            units: info.units,
            frequency: info.frequency,
            date: Some(latest.date),
            value: latest.value,
        })
    }

    /// Newest observation that has a value, looking back over the last
    /// `LATEST_WINDOW` rows.
    pub fn latest_observation(&self, series_id: &str) -> Result<Lookup<Option<Observation>>, AppError> {
        let query = ObservationQuery {
            newest_first: true,
            limit: Some(LATEST_WINDOW),
            ..Default::default()
        };
        Ok(match self.observations(series_id, &query)? {
            Lookup::Found(obs) => Lookup::Found(newest_with_value(obs)),
            Lookup::NotFound => Lookup::NotFound,
        })
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Raw observations; unparseable values (FRED uses `"."`) become `None`.
    pub fn observations(
        &self,
        series_id: &str,
        query: &ObservationQuery<'_>,
    ) -> Result<Lookup<Vec<Observation>>, AppError> {
        let mut req = self
            .client
            .get(format!("{}/series/observations", self.base_url))
            .query(&[
                ("series_id", series_id),
                ("api_key", &self.api_key),
                ("file_type", "json"),
            ]);

        if let Some(start) = query.start {
            req = req.query(&[("observation_start", start.to_string())]);
        }
        if let Some(end) = query.end {
            req = req.query(&[("observation_end", end.to_string())]);
        }
        if let Some(freq) = query.frequency {
            req = req.query(&[("frequency", freq)]);
        }
        if query.newest_first {
            req = req.query(&[("sort_order", "desc")]);
        }
        if let Some(limit) = query.limit {
            req = req.query(&[("limit", limit.to_string())]);
        }

        tracing::debug!(series_id, "fetching FRED observations");
        let resp = req
            .send()
            .map_err(|e| AppError::data(format!("FRED request failed: {e}")))?;

        if is_missing_series(resp.status()) {
            return Ok(Lookup::NotFound);
        }
        if !resp.status().is_success() {
            return Err(AppError::data(format!(
                "FRED request for {series_id} failed with status {}.",
                resp.status()
            )));
        }

        let body: ObservationsResponse = resp
            .json()
            .map_err(|e| AppError::data(format!("Failed to parse FRED response: {e}")))?;

        Ok(Lookup::Found(
            body.observations
                .into_iter()
                .map(|obs| Observation {
                    value: parse_value(&obs.value),
                    date: obs.date,
                })
                .collect(),
        ))
    }

    pub fn series_info(&self, series_id: &str) -> Result<SeriesInfo, AppError> {
        let resp = self
            .client
            .get(format!("{}/series", self.base_url))
            .query(&[
                ("series_id", series_id),
                ("api_key", &self.api_key),
                ("file_type", "json"),
            ])
            .send()
            .map_err(|e| AppError::data(format!("FRED request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::data(format!(
                "FRED series info for {series_id} failed with status {}.",
                resp.status()
            )));
        }

        let body: SeriesResponse = resp
            .json()
            .map_err(|e| AppError::data(format!("Failed to parse FRED series info: {e}")))?;
        Ok(body.into_info())
    }
}

/// First row with a value from newest-first `rows`. When none has one, the
/// newest row is kept so the date still shows.
fn newest_with_value(rows: Vec<Observation>) -> Option<Observation> {
    let newest = rows.first().cloned();
    rows.into_iter().find(|o| o.value.is_some()).or(newest)
}

fn is_missing_series(status: StatusCode) -> bool {
    status == StatusCode::NOT_FOUND || status == StatusCode::BAD_REQUEST
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<RawObservation>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    date: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct SeriesResponse {
    #[serde(default)]
    seriess: Vec<RawSeriesInfo>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSeriesInfo {
    #[serde(default)]
    title: String,
    #[serde(default)]
    units: String,
    #[serde(default)]
    frequency_short: String,
}

impl SeriesResponse {
    fn into_info(self) -> SeriesInfo {
        let raw = self.seriess.into_iter().next().unwrap_or_default();
        SeriesInfo {
            title: raw.title,
            units: raw.units,
            frequency: raw.frequency_short,
        }
    }
}

pub(crate) fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fred_value_strings() {
        assert_eq!(parse_value("5.33"), Some(5.33));
        assert_eq!(parse_value(" 22000.5 "), Some(22000.5));
        assert_eq!(parse_value("."), None);
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("NaN"), None);
    }

    #[test]
    fn decodes_series_metadata() {
        let json = r#"{"seriess": [{"id": "UNRATE", "title": "Unemployment Rate",
            "units": "Percent", "frequency_short": "M"}]}"#;
        let body: SeriesResponse = serde_json::from_str(json).unwrap();
        let info = body.into_info();
        assert_eq!(info.title, "Unemployment Rate");
        assert_eq!(info.units, "Percent");
        assert_eq!(info.frequency, "M");

        let empty: SeriesResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.into_info(), SeriesInfo::default());
    }

    #[test]
    fn decodes_observations() {
        let json = r#"{"observations": [
            {"date": "2024-01-01", "value": "3.7", "realtime_start": "x"},
            {"date": "2024-02-01", "value": "."}
        ]}"#;
        let body: ObservationsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.observations.len(), 2);
        assert_eq!(parse_value(&body.observations[1].value), None);
    }

    #[test]
    fn holiday_rows_are_skipped_for_latest() {
        let rows = vec![
            Observation { date: "2024-07-04".into(), value: None },
            Observation { date: "2024-07-03".into(), value: Some(4.36) },
            Observation { date: "2024-07-02".into(), value: Some(4.43) },
        ];
        let latest = newest_with_value(rows).unwrap();
        assert_eq!(latest.date, "2024-07-03");
        assert_eq!(latest.value, Some(4.36));

        let empty = newest_with_value(vec![Observation { date: "2024-07-04".into(), value: None }]).unwrap();
        assert_eq!(empty.date, "2024-07-04");
        assert_eq!(empty.value, None);
        assert_eq!(newest_with_value(Vec::new()), None);
    }

    /// Serves one canned HTTP response and returns the request line.
    fn serve_once(body: &'static str) -> (String, std::thread::JoinHandle<String>) {
        use std::io::{BufRead, BufReader, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 2 {
                line.clear();
            }
            write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            )
            .unwrap();
            request_line
        });
        (format!("http://{addr}"), handle)
    }

    #[test]
    fn latest_looks_past_a_holiday_row() {
        let (base, server) = serve_once(
            r#"{"observations": [
                {"date": "2024-07-04", "value": "."},
                {"date": "2024-07-03", "value": "4.36"}
            ]}"#,
        );
        let client = FredClient::new("key", Duration::from_secs(5)).unwrap().with_base_url(base);

        let latest = client.latest_observation("DGS10").unwrap();
        assert_eq!(latest, Lookup::Found(Some(Observation { date: "2024-07-03".into(), value: Some(4.36) })));

        let request_line = server.join().unwrap();
        assert!(request_line.contains("sort_order=desc"));
        assert!(request_line.contains(&format!("limit={LATEST_WINDOW}")));
    }

    #[test]
    fn missing_series_statuses() {
        assert!(is_missing_series(StatusCode::BAD_REQUEST));
        assert!(is_missing_series(StatusCode::NOT_FOUND));
        assert!(!is_missing_series(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn empty_key_is_rejected() {
        assert!(FredClient::new("  ", Duration::from_secs(1)).is_err());
    }
}

//! Domain types used throughout the dashboard.
//!
//! This module defines:
//!
//! - series shapes (`Observation`, `SeriesData`, `LatestValue`)
//! - view selectors (`TimeRange`, `IndicatorPage`, `CalendarFilter`, ...)
//! - display records (`CalendarEvent`, `StateRecord`, `ForecastData`)

pub mod types;

pub use types::*;

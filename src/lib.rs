//! `fed-tracker` library crate.
//!
//! The binary (`fed`) is a thin wrapper around this library so that:
//!
//! - view logic is testable without spawning processes or a terminal
//! - the CLI and the TUI share the same loaders (`app::views`)
//! - data sources stay swappable behind `data::EconomicApi`

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod math;
pub mod plot;
pub mod report;
pub mod tui;

//! Terminal plotting for the one-shot CLI commands.

pub mod ascii;

pub use ascii::render_series_plot;

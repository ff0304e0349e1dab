//! Value formatting shared by the CLI reports and the TUI.
//!
//! Every formatter takes an `Option` and renders a missing value as `N/A`.

use chrono::NaiveDate;

pub const NOT_AVAILABLE: &str = "N/A";

pub fn format_percentage(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}%"),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// US dollars with thousands separators: `$1,234.56`, `-$1,234`.
pub fn format_currency(value: Option<f64>, decimals: usize) -> String {
    let Some(v) = value else {
        return NOT_AVAILABLE.to_string();
    };
    let formatted = format!("{:.decimals$}", v.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut out = String::new();
    if v < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    out.push('$');
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Large numbers abbreviated with `B`, `M` or `K`.
pub fn format_number(value: Option<f64>, decimals: usize) -> String {
    let Some(v) = value else {
        return NOT_AVAILABLE.to_string();
    };
    let abs = v.abs();
    if abs >= 1e9 {
        format!("{:.decimals$}B", v / 1e9)
    } else if abs >= 1e6 {
        format!("{:.decimals$}M", v / 1e6)
    } else if abs >= 1e3 {
        format!("{:.decimals$}K", v / 1e3)
    } else {
        format!("{v:.decimals$}")
    }
}

/// How a series' values are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    Percent,
    Currency,
    Number,
}

const PERCENT_SERIES: [&str; 6] = ["UNRATE", "FEDFUNDS", "T10Y2Y", "CPIAUCSL", "PCEPI", "A191RI1Q225SBEA"];
const CURRENCY_SERIES: [&str; 2] = ["GDP", "GDPC1"];

pub fn formatter_for(series_id: &str) -> ValueFormat {
    if PERCENT_SERIES.contains(&series_id) {
        ValueFormat::Percent
    } else if CURRENCY_SERIES.contains(&series_id) {
        ValueFormat::Currency
    } else {
        ValueFormat::Number
    }
}

impl ValueFormat {
    pub fn format(self, value: Option<f64>) -> String {
        match self {
            ValueFormat::Percent => format_percentage(value, 1),
            ValueFormat::Currency => format_currency(value, 2),
            ValueFormat::Number => format_number(value, 1),
        }
    }
}

/// Format a value the way its series is usually shown.
pub fn format_for_series(series_id: &str, value: Option<f64>) -> String {
    formatter_for(series_id).format(value)
}

/// `2024-03-01` -> `Mar 1, 2024`. Unparseable input is returned unchanged.
pub fn format_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => d.format("%b %-d, %Y").to_string(),
        Err(_) => date.to_string(),
    }
}

pub fn format_optional_date(date: Option<&str>) -> String {
    date.map(format_date).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Cut `s` to `max` characters, marking the cut with `.`.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

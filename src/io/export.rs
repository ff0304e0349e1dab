//! Export a series view to CSV or JSON.
//!
//! The format follows the file extension (`.json` for JSON, anything else is
//! CSV), which keeps `--export` a single flag.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::domain::{Observation, SeriesData};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ExportFormat::Json,
            _ => ExportFormat::Csv,
        }
    }
}

/// Written JSON document: the series plus the transform that produced it.
#[derive(Debug, Serialize)]
struct SeriesExport<'a> {
    series_id: &'a str,
    title: &'a str,
    units: &'a str,
    frequency: &'a str,
    transform: &'a str,
    data: &'a [Observation],
}

/// Write `series` to `path`. `transform` names the applied change transform
/// (`none`, `yoy`, ...).
pub fn write_series(path: &Path, series: &SeriesData, transform: &str) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::usage(format!("Failed to create export file '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);

    match ExportFormat::from_path(path) {
        ExportFormat::Json => {
            let doc = SeriesExport {
                series_id: &series.series_id,
                title: &series.title,
                units: &series.units,
                frequency: &series.frequency,
                transform,
                data: &series.data,
            };
            serde_json::to_writer_pretty(&mut out, &doc)
                .map_err(|e| AppError::usage(format!("Failed to write export JSON: {e}")))?;
            writeln!(out).map_err(|e| AppError::usage(format!("Failed to write export JSON: {e}")))?;
        }
        ExportFormat::Csv => write_csv(&mut out, series, transform)
            .map_err(|e| AppError::usage(format!("Failed to write export CSV: {e}")))?,
    }

    out.flush()
        .map_err(|e| AppError::usage(format!("Failed to write export file '{}': {e}", path.display())))?;
    tracing::info!(path = %path.display(), rows = series.data.len(), "exported series");
    Ok(())
}

fn write_csv(out: &mut impl Write, series: &SeriesData, transform: &str) -> std::io::Result<()> {
    writeln!(out, "series_id,date,value,transform")?;
    for obs in &series.data {
        writeln!(
            out,
            "{},{},{},{}",
            series.series_id,
            obs.date,
            obs.value.map(|v| format!("{v:.6}")).unwrap_or_default(),
            transform,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SeriesData {
        SeriesData {
            series_id: "UNRATE".into(),
            title: "Unemployment Rate".into(),
            units: "Percent".into(),
            frequency: "M".into(),
            data: vec![
                Observation::new("2024-01-01", 3.7),
                Observation { date: "2024-02-01".into(), value: None },
            ],
        }
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("out.JSON")), ExportFormat::Json);
        assert_eq!(ExportFormat::from_path(Path::new("out.csv")), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_path(Path::new("out")), ExportFormat::Csv);
    }

    #[test]
    fn csv_rows_leave_missing_values_blank() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &sample(), "none").unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "series_id,date,value,transform\nUNRATE,2024-01-01,3.700000,none\nUNRATE,2024-02-01,,none\n"
        );
    }

    #[test]
    fn json_export_round_trips() {
        let path = std::env::temp_dir().join(format!("fed-tracker-export-{}.json", std::process::id()));
        write_series(&path, &sample(), "yoy").unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["transform"], "yoy");
        assert_eq!(value["data"][0]["value"], 3.7);
        assert!(value["data"][1]["value"].is_null());
    }
}

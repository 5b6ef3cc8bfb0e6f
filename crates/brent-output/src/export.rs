//! Export functionality for the final shock panel.

use brent_model::Panel;
use serde_json::{Map, Number, Value, json};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Non-UTF8 writer output.
    #[error("Invalid output encoding: {0}")]
    Encoding(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

/// A panel flattened into exportable rows: an ISO date string plus one
/// value per column, in the panel's column order.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelExport {
    headers: Vec<String>,
    rows: Vec<(String, Vec<f64>)>,
}

impl PanelExport {
    /// Snapshot a panel into exportable form.
    pub fn from_panel(panel: &Panel) -> Self {
        let names: Vec<String> = panel
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let columns: Vec<&[f64]> = names
            .iter()
            .map(|n| panel.column(n).unwrap_or(&[]))
            .collect();

        let rows = panel
            .dates()
            .iter()
            .enumerate()
            .map(|(i, date)| {
                let values = columns.iter().map(|c| c[i]).collect();
                (date.to_string(), values)
            })
            .collect();

        Self {
            headers: names,
            rows,
        }
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the export holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn to_json_value(&self) -> Value {
        let rows: Vec<Value> = self
            .rows
            .iter()
            .map(|(date, values)| {
                let mut obj = Map::new();
                obj.insert("date".to_string(), json!(date));
                for (name, value) in self.headers.iter().zip(values) {
                    let number = Number::from_f64(*value)
                        .map_or(Value::Null, Value::Number);
                    obj.insert(name.clone(), number);
                }
                Value::Object(obj)
            })
            .collect();
        Value::Array(rows)
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

impl Exporter for PanelExport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                let mut header = vec!["date".to_string()];
                header.extend(self.headers.iter().cloned());
                wtr.write_record(&header)?;
                for (date, values) in &self.rows {
                    let mut record = vec![date.clone()];
                    record.extend(values.iter().map(|v| v.to_string()));
                    wtr.write_record(&record)?;
                }
                let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
                String::from_utf8(bytes).map_err(|e| ExportError::Encoding(e.to_string()))
            }
            ExportFormat::Json => Ok(serde_json::to_string(&self.to_json_value())?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(&self.to_json_value())?),
        }
    }
}

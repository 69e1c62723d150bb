pub mod xlsx;

use crate::error::FertilError;
use crate::model::SoilSample;
use crate::parsing::{self, ParsedReports};
use std::path::Path;

/// Kind of document handed to the library, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// One sample object or an array of samples.
    Json,
    Xlsx,
    /// Lab report text (exported or copied from a PDF).
    Text,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("json") => InputFormat::Json,
            Some("xlsx") | Some("xlsm") => InputFormat::Xlsx,
            _ => InputFormat::Text,
        }
    }

    /// Reader for report formats. JSON carries samples directly and has none.
    pub fn reader(&self) -> Option<Box<dyn ReportReader>> {
        match self {
            InputFormat::Json => None,
            InputFormat::Xlsx => Some(Box::new(XlsxReader)),
            InputFormat::Text => Some(Box::new(TextReader)),
        }
    }
}

/// Backend turning raw document bytes into lab reports.
pub trait ReportReader: Send + Sync {
    fn read_reports(&self, bytes: &[u8]) -> Result<ParsedReports, FertilError>;

    /// Name of this reader (for diagnostics).
    fn format_name(&self) -> &str;
}

pub struct TextReader;

impl ReportReader for TextReader {
    fn read_reports(&self, bytes: &[u8]) -> Result<ParsedReports, FertilError> {
        parsing::parse_reports(&decode_text(bytes))
    }

    fn format_name(&self) -> &str {
        "text"
    }
}

pub struct XlsxReader;

impl ReportReader for XlsxReader {
    fn read_reports(&self, bytes: &[u8]) -> Result<ParsedReports, FertilError> {
        xlsx::parse_xlsx(bytes)
    }

    fn format_name(&self) -> &str {
        "xlsx"
    }
}

/// Decode report text as UTF-8, falling back to Latin-1 for exports from
/// older lab systems.
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.trim_start_matches('\u{feff}').to_string(),
        Err(_) => {
            tracing::debug!("input is not UTF-8, decoding as Latin-1");
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    }
}

/// Parse samples supplied as JSON: a single object or an array.
pub fn parse_samples_json(json: &str) -> Result<Vec<SoilSample>, FertilError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let samples = match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value::<SoilSample>)
            .collect::<Result<Vec<_>, _>>()?,
        other => vec![serde_json::from_value(other)?],
    };
    if samples.is_empty() {
        return Err(FertilError::ParseError("no samples in JSON input".into()));
    }
    Ok(samples)
}

use std::io::Cursor;

use calamine::{Data, Range, Reader, Xlsx};

use crate::error::FertilError;
use crate::model::{LabReport, ReportRow, ReportValue};
use crate::parsing::header::parse_header;
use crate::parsing::normalize::{is_engine_parameter, normalize_parameter};
use crate::parsing::values::{is_not_determined, parse_value};
use crate::parsing::{is_header_word, ParsedReports, SkippedLine};

/// Parse a lab spreadsheet: first sheet, parameter label in column A, value
/// in column B and an optional unit in column C.
///
/// Rows labelled as header fields (sample id, farm, date, lab), and rows
/// whose value is text that is not a number, are read as header fields.
pub fn parse_xlsx(bytes: &[u8]) -> Result<ParsedReports, FertilError> {
    let cursor = Cursor::new(bytes);
    let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(cursor)
        .map_err(|e| FertilError::ParseError(format!("failed to open xlsx: {e}")))?;

    let sheet = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| FertilError::ParseError("xlsx has no worksheets".into()))?
        .map_err(|e| FertilError::ParseError(format!("failed to read first sheet: {e}")))?;

    read_sheet(&sheet)
}

/// Read one report from a sheet's cells.
fn read_sheet(sheet: &Range<Data>) -> Result<ParsedReports, FertilError> {
    let mut rows = Vec::new();
    let mut header_lines = Vec::new();
    let mut warnings = Vec::new();
    let mut skipped_lines = Vec::new();

    for cells in sheet.rows() {
        let Some(raw_name) = cells.first().and_then(cell_as_string) else {
            continue;
        };
        let value_cell = cells.get(1);
        if is_header_word(&raw_name) {
            // Numeric ids ("Amostra | 001") must not become value rows.
            if let Some(text) = value_cell.and_then(cell_as_string) {
                header_lines.push(format!("{raw_name}: {text}"));
            }
            continue;
        }
        let unit = cells.get(2).and_then(cell_as_string);
        let key = normalize_parameter(&raw_name);

        match cell_as_value(value_cell) {
            Ok(Some(value)) => rows.push(ReportRow {
                raw_name,
                normalized_name: key,
                value,
                unit,
            }),
            Ok(None) if is_engine_parameter(&key) => {
                warnings.push(format!("{raw_name} not determined by the lab"));
            }
            Ok(None) => {}
            Err(_) if is_engine_parameter(&key) => {
                let cell_text = value_cell.map(|c| format!("{c}")).unwrap_or_default();
                tracing::warn!(parameter = %raw_name, value = %cell_text, "skipped xlsx row");
                skipped_lines.push(SkippedLine {
                    line_text: format!("{raw_name}: {cell_text}"),
                    reason: "non-numeric value in xlsx".into(),
                });
            }
            Err(_) => {
                if let Some(text) = value_cell.and_then(cell_as_string) {
                    header_lines.push(format!("{raw_name}: {text}"));
                }
            }
        }
    }

    if rows.is_empty() {
        return Err(FertilError::ParseError(
            "no analysis values found in xlsx".into(),
        ));
    }

    let header_refs: Vec<&str> = header_lines.iter().map(String::as_str).collect();
    let metadata = parse_header(&header_refs);
    tracing::debug!(rows = rows.len(), "parsed xlsx report");

    Ok(ParsedReports {
        reports: vec![LabReport { metadata, rows }],
        warnings,
        skipped_lines,
    })
}

/// Numeric cells are measured values; text cells go through the report
/// value parser ("< 0,1", "nd", "5,2").
fn cell_as_value(cell: Option<&Data>) -> Result<Option<ReportValue>, FertilError> {
    match cell {
        None | Some(Data::Empty) => Ok(None),
        Some(Data::Float(f)) => Ok(Some(ReportValue::Measured(*f))),
        Some(Data::Int(i)) => Ok(Some(ReportValue::Measured(*i as f64))),
        Some(Data::String(s)) => parse_value(s),
        Some(other) => {
            let text = format!("{other}");
            if is_not_determined(&text) {
                Ok(None)
            } else {
                Err(FertilError::ParseError(format!("not a value: '{text}'")))
            }
        }
    }
}

fn cell_as_string(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::DateTime(dt) => Some(dt.to_string()),
        Data::Empty => None,
        _ => Some(format!("{cell}")),
    }
}

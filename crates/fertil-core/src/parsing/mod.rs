pub mod header;
pub mod normalize;
pub mod values;

use crate::error::FertilError;
use crate::model::{LabReport, PotassiumUnit, ReportRow, SoilSample};
use crate::units;
use header::parse_header;
use normalize::{fold, is_engine_parameter, normalize_parameter, CLAY, CTC, ORGANIC_MATTER};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use values::{is_not_determined, parse_value};

/// Header fields are looked for in the first lines of each section.
const HEADER_LINES: usize = 30;

/// A report line that named an engine parameter but could not be read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedLine {
    pub line_text: String,
    pub reason: String,
}

/// Everything read from one input document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedReports {
    pub reports: Vec<LabReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_lines: Vec<SkippedLine>,
}

/// Parse the text of a lab report into one [`LabReport`] per sample.
///
/// Documents holding several samples are split on "Laudo" or
/// "Relatório de ensaio" headings and each section is read independently.
/// Sections without any values (cover pages, notes) are dropped.
pub fn parse_reports(text: &str) -> Result<ParsedReports, FertilError> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.iter().all(|l| l.trim().is_empty()) {
        return Err(FertilError::ParseError("no text content found".into()));
    }

    let mut parsed = ParsedReports::default();
    for section in split_into_sections(&lines) {
        let header_lines: Vec<&str> = section.iter().take(HEADER_LINES).copied().collect();
        let metadata = parse_header(&header_lines);
        let label = metadata.id.clone().unwrap_or_else(|| "unknown".into());

        let mut rows = Vec::new();
        for line in &section {
            match try_parse_row(line) {
                RowParse::Row(row) => rows.push(row),
                RowParse::NotDetermined(name) => {
                    parsed
                        .warnings
                        .push(format!("{label}: {name} not determined by the lab"));
                }
                RowParse::Unreadable(reason) => {
                    tracing::warn!(line = line.trim(), %reason, "skipped report line");
                    parsed.skipped_lines.push(SkippedLine {
                        line_text: line.trim().to_string(),
                        reason,
                    });
                }
                RowParse::NotARow => {}
            }
        }

        if rows.is_empty() {
            tracing::debug!(sample = %label, "section without values dropped");
            continue;
        }
        tracing::debug!(sample = %label, rows = rows.len(), "parsed report section");
        parsed.reports.push(LabReport { metadata, rows });
    }

    if parsed.reports.is_empty() {
        return Err(FertilError::ParseError(
            "no analysis values found in report".into(),
        ));
    }

    Ok(parsed)
}

/// Split lines into sections, each starting at a report heading. Lines
/// before the first heading belong to the first section.
fn split_into_sections<'a>(lines: &[&'a str]) -> Vec<Vec<&'a str>> {
    let mut sections = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut found_heading = false;

    for &line in lines {
        if is_section_heading(line) {
            if found_heading && !current.is_empty() {
                sections.push(std::mem::take(&mut current));
            }
            found_heading = true;
        }
        current.push(line);
    }

    if !current.is_empty() {
        sections.push(current);
    }

    sections
}

fn is_section_heading(line: &str) -> bool {
    let folded = fold(line.trim());
    folded.starts_with("laudo") || folded.starts_with("relatorio de ensaio")
}

enum RowParse {
    Row(ReportRow),
    NotDetermined(String),
    Unreadable(String),
    NotARow,
}

/// Try to read a line as "name  value  unit".
fn try_parse_row(line: &str) -> RowParse {
    let line = line.trim();
    if line.len() < 3 {
        return RowParse::NotARow;
    }

    let mut segments = split_by_whitespace_gaps(line);
    if segments.len() < 2 {
        match line.split_once(':') {
            Some((name, rest)) => segments = vec![name, rest],
            None => return RowParse::NotARow,
        }
    }

    let name = segments[0].trim().trim_end_matches(':').trim();
    if !name.chars().next().is_some_and(char::is_alphabetic) || is_header_word(name) {
        return RowParse::NotARow;
    }
    let key = normalize_parameter(name);

    for (i, segment) in segments.iter().enumerate().skip(1) {
        let (value_text, trailing) = split_value_unit(segment);
        if is_not_determined(value_text) {
            if is_engine_parameter(&key) && !value_text.trim().is_empty() {
                return RowParse::NotDetermined(name.to_string());
            }
            continue;
        }
        if let Ok(Some(value)) = parse_value(value_text) {
            let unit = trailing
                .filter(|u| !u.is_empty())
                .or_else(|| segments.get(i + 1).map(|s| s.trim()).filter(|s| looks_like_unit(s)))
                .map(str::to_string);
            return RowParse::Row(ReportRow {
                raw_name: name.to_string(),
                normalized_name: key,
                value,
                unit,
            });
        }
    }

    if is_engine_parameter(&key) {
        RowParse::Unreadable(format!("no numeric value for '{name}'"))
    } else {
        RowParse::NotARow
    }
}

/// Split a line on runs of 2+ whitespace characters. A tab counts as a gap
/// on its own.
fn split_by_whitespace_gaps(line: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut seg_start: Option<usize> = None;
    let mut gap_start = 0;
    let mut gap_width = 0;

    for (i, c) in line.char_indices() {
        if c.is_whitespace() {
            if gap_width == 0 {
                gap_start = i;
            }
            gap_width += if c == '\t' { 2 } else { 1 };
        } else {
            if gap_width >= 2 {
                if let Some(s) = seg_start.take() {
                    segments.push(&line[s..gap_start]);
                }
            }
            if seg_start.is_none() {
                seg_start = Some(i);
            }
            gap_width = 0;
        }
    }

    if let Some(s) = seg_start {
        segments.push(line[s..].trim_end());
    }

    segments
}

/// Separate "5,0 cmolc/dm³" into value and unit. A leading "<" stays with
/// the number.
fn split_value_unit(segment: &str) -> (&str, Option<&str>) {
    let body = segment.trim();
    let skip = if body.starts_with('<') { 1 } else { 0 };
    let number = body[skip..].trim_start();
    let start = body.len() - number.len();
    match number.find(char::is_whitespace) {
        Some(end) => (&body[..start + end], Some(body[start + end..].trim())),
        None => (body, None),
    }
}

fn looks_like_unit(s: &str) -> bool {
    s.contains('/') || s.contains('%')
}

/// Table headings and header labels that are never parameter rows.
pub(crate) fn is_header_word(name: &str) -> bool {
    let folded = fold(name);
    let first = folded
        .split(|c: char| !c.is_alphanumeric())
        .next()
        .unwrap_or_default();
    matches!(
        first,
        "amostra"
            | "identificacao"
            | "local"
            | "propriedade"
            | "talhao"
            | "data"
            | "laboratorio"
            | "laudo"
            | "relatorio"
            | "determinacao"
            | "determinacoes"
            | "parametro"
            | "parametros"
            | "resultado"
            | "resultados"
            | "unidade"
            | "metodo"
            | "pagina"
            | "cliente"
            | "solicitante"
            | "responsavel"
            | "observacao"
            | "observacoes"
            | "municipio"
    )
}

/// Map one report onto the engine's input, converting report units.
///
/// Returns the sample together with notes about defaulted, duplicate or
/// below-detection values. Missing required parameters are reported all at
/// once as [`FertilError::MissingParameter`].
pub fn report_to_sample(
    report: &LabReport,
    k_unit: PotassiumUnit,
) -> Result<(SoilSample, Vec<String>), FertilError> {
    let label = report.metadata.id.as_deref().unwrap_or("unknown");
    let mut warnings = Vec::new();
    let mut found: BTreeMap<&str, &ReportRow> = BTreeMap::new();

    for row in &report.rows {
        let key = row.normalized_name.as_str();
        if !is_engine_parameter(key) {
            continue;
        }
        if found.contains_key(key) {
            warnings.push(format!(
                "{label}: duplicate {} value {} ignored",
                row.raw_name, row.value
            ));
            continue;
        }
        if row.value.is_below_detection() {
            warnings.push(format!(
                "{label}: {} below detection ({}), counted as 0",
                row.raw_name, row.value
            ));
        }
        found.insert(key, row);
    }

    let mut missing = Vec::new();
    let mut value = |key: &str, display: &str| -> f64 {
        match found.get(key) {
            Some(row) => to_engine_unit(key, row.value.numeric(), row.unit.as_deref()),
            None => {
                missing.push(display.to_string());
                0.0
            }
        }
    };

    let cec = value(CTC, "T");
    let ca = value("ca", "Ca");
    let mg = value("mg", "Mg");
    let p = value("p", "P");
    let s = value("s", "S");
    let b = value("b", "B");
    let cu = value("cu", "Cu");
    let fe = value("fe", "Fe");
    let mn = value("mn", "Mn");
    let zn = value("zn", "Zn");
    let mo = value("mo", "Mo");
    let clay_percent = value(CLAY, "clayPercent");

    let (k, k_unit) = match found.get("k") {
        Some(row) => potassium(row, k_unit),
        None => {
            missing.push("K".to_string());
            (0.0, k_unit)
        }
    };

    if !missing.is_empty() {
        return Err(FertilError::MissingParameter(missing));
    }

    let organic_matter = match found.get(ORGANIC_MATTER) {
        Some(row) => to_engine_unit(ORGANIC_MATTER, row.value.numeric(), row.unit.as_deref()),
        None => {
            tracing::warn!(sample = label, "organic matter missing, using 0");
            warnings.push(format!("{label}: organic matter not reported, using 0"));
            0.0
        }
    };

    let sample = SoilSample {
        metadata: report.metadata.clone(),
        cec,
        ca,
        mg,
        k,
        k_unit,
        p,
        s,
        b,
        cu,
        fe,
        mn,
        zn,
        mo,
        organic_matter,
        clay_percent,
    };
    Ok((sample, warnings))
}

impl LabReport {
    /// Map this report onto a [`SoilSample`]. See [`report_to_sample`].
    pub fn to_sample(&self, k_unit: PotassiumUnit) -> Result<SoilSample, FertilError> {
        report_to_sample(self, k_unit).map(|(sample, _)| sample)
    }
}

/// K in whatever unit the report states, falling back to the caller's unit.
fn potassium(row: &ReportRow, fallback: PotassiumUnit) -> (f64, PotassiumUnit) {
    let value = row.value.numeric();
    let unit = row.unit.as_deref().map(fold).unwrap_or_default();
    if unit.starts_with("mmol") {
        (value / 10.0, PotassiumUnit::CmolcPerDm3)
    } else {
        match PotassiumUnit::from_str_loose(&unit) {
            Some(u) => (value, u),
            None => (value, fallback),
        }
    }
}

/// Convert a reported value to the unit the engine expects.
///
/// mmolc/dm³ becomes cmolc/dm³, Ca and Mg quoted in mg/dm³ are converted to
/// cmolc/dm³, organic matter and clay quoted in g/dm³ or g/kg become percent.
fn to_engine_unit(key: &str, value: f64, unit: Option<&str>) -> f64 {
    let unit = unit.map(fold).unwrap_or_default();
    match key {
        CTC | "ca" | "mg" if unit.starts_with("mmol") => value / 10.0,
        "ca" if unit.starts_with("mg/") => units::ca_mg_to_cmolc(value),
        "mg" if unit.starts_with("mg/") => units::mg_mg_to_cmolc(value),
        ORGANIC_MATTER | CLAY if unit.starts_with("g/") => value / 10.0,
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReportValue;

    const REPORT: &str = "\
Laudo de Análise de Solo
Laboratório: Solotest
Amostra: 001
Propriedade: Fazenda Boa Vista      Data: 12/03/2024

Determinação          Resultado     Unidade
CTC (T)               10,0          cmolc/dm³
Cálcio (Ca)           5,0           cmolc/dm³
Magnésio (Mg)         2,0           cmolc/dm³
Potássio (K)          195           mg/dm³
Fósforo Mehlich-1     30            mg/dm³
Enxofre (S)           12            mg/dm³
Boro (B)              0,8           mg/dm³
Cobre (Cu)            1,0           mg/dm³
Ferro (Fe)            30            mg/dm³
Manganês (Mn)         10            mg/dm³
Zinco (Zn)            2,0           mg/dm³
Mo                    < 0,1         mg/dm³
M.O.                  31            g/dm³
Argila                300           g/kg
";

    #[test]
    fn test_split_by_whitespace_gaps() {
        let segments = split_by_whitespace_gaps("Cálcio (Ca)     5,0     cmolc/dm³");
        assert_eq!(segments, vec!["Cálcio (Ca)", "5,0", "cmolc/dm³"]);
    }

    #[test]
    fn test_tab_is_a_gap() {
        let segments = split_by_whitespace_gaps("Zinco\t1,2\tmg/dm³");
        assert_eq!(segments, vec!["Zinco", "1,2", "mg/dm³"]);
    }

    #[test]
    fn test_split_value_unit() {
        assert_eq!(split_value_unit("5,0 cmolc/dm³"), ("5,0", Some("cmolc/dm³")));
        assert_eq!(split_value_unit("< 0,1"), ("< 0,1", None));
        assert_eq!(split_value_unit("<0,1 mg/dm³"), ("<0,1", Some("mg/dm³")));
    }

    #[test]
    fn test_try_parse_measured_row() {
        let RowParse::Row(row) = try_parse_row("Cálcio (Ca)     5,0     cmolc/dm³") else {
            panic!("expected a row");
        };
        assert_eq!(row.normalized_name, "ca");
        assert_eq!(row.value, ReportValue::Measured(5.0));
        assert_eq!(row.unit.as_deref(), Some("cmolc/dm³"));
    }

    #[test]
    fn test_colon_separated_row() {
        let RowParse::Row(row) = try_parse_row("Zinco: 1,2 mg/dm³") else {
            panic!("expected a row");
        };
        assert_eq!(row.normalized_name, "zn");
        assert_eq!(row.value, ReportValue::Measured(1.2));
        assert_eq!(row.unit.as_deref(), Some("mg/dm³"));
    }

    #[test]
    fn test_header_line_skipped() {
        assert!(matches!(
            try_parse_row("Determinação     Resultado     Unidade"),
            RowParse::NotARow
        ));
        assert!(matches!(try_parse_row("Data: 12/03/2024"), RowParse::NotARow));
    }

    #[test]
    fn test_not_determined_row() {
        assert!(matches!(
            try_parse_row("Molibdênio     nd     mg/dm³"),
            RowParse::NotDetermined(_)
        ));
    }

    #[test]
    fn test_unreadable_engine_row() {
        assert!(matches!(
            try_parse_row("Boro     traços     mg/dm³"),
            RowParse::Unreadable(_)
        ));
        assert!(matches!(
            try_parse_row("Profundidade     0-20 cm"),
            RowParse::NotARow
        ));
    }

    #[test]
    fn test_split_into_sections_multi() {
        let lines = vec![
            "Cabeçalho",
            "Laudo 001",
            "Amostra: A",
            "Relatório de ensaio 002",
            "Amostra: B",
        ];
        let sections = split_into_sections(&lines);
        assert_eq!(sections.len(), 2);
        assert!(sections[0].contains(&"Cabeçalho"));
        assert!(sections[1].contains(&"Amostra: B"));
    }

    #[test]
    fn test_split_into_sections_no_heading() {
        let lines = vec!["Cálcio  5", "Magnésio  2"];
        assert_eq!(split_into_sections(&lines).len(), 1);
    }

    #[test]
    fn test_parse_full_report() {
        let parsed = parse_reports(REPORT).unwrap();
        assert_eq!(parsed.reports.len(), 1);
        let report = &parsed.reports[0];
        assert_eq!(report.metadata.id.as_deref(), Some("001"));
        assert_eq!(report.metadata.location.as_deref(), Some("Fazenda Boa Vista"));
        assert_eq!(report.metadata.date.as_deref(), Some("12/03/2024"));
        assert_eq!(report.metadata.lab.as_deref(), Some("Solotest"));
        assert_eq!(report.rows.len(), 14);
        assert!(parsed.skipped_lines.is_empty());
    }

    #[test]
    fn test_report_to_sample_converts_units() {
        let parsed = parse_reports(REPORT).unwrap();
        let (sample, warnings) =
            report_to_sample(&parsed.reports[0], PotassiumUnit::CmolcPerDm3).unwrap();
        assert_eq!(sample.cec, 10.0);
        assert_eq!(sample.k, 195.0);
        // The report's own unit wins over the caller's.
        assert_eq!(sample.k_unit, PotassiumUnit::MgPerDm3);
        assert_eq!(sample.mo, 0.0);
        assert_eq!(sample.organic_matter, 3.1);
        assert_eq!(sample.clay_percent, 30.0);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("below detection"));
    }

    #[test]
    fn test_mmolc_converted_to_cmolc() {
        let text = "\
CTC      85     mmolc/dm³
Ca       40     mmolc/dm³
Mg       12     mmolc/dm³
K        3,2    mmolc/dm³
P        14
S        9
B        0,4
Cu       0,9
Fe       40
Mn       6
Zn       1,1
Mo       0,1
Argila   35     %
";
        let parsed = parse_reports(text).unwrap();
        let (sample, warnings) =
            report_to_sample(&parsed.reports[0], PotassiumUnit::MgPerDm3).unwrap();
        assert_eq!(sample.cec, 8.5);
        assert_eq!(sample.ca, 4.0);
        assert_eq!(sample.mg, 1.2);
        assert_eq!(sample.k, 0.32);
        assert_eq!(sample.k_unit, PotassiumUnit::CmolcPerDm3);
        assert_eq!(sample.clay_percent, 35.0);
        assert_eq!(sample.organic_matter, 0.0);
        assert!(warnings.iter().any(|w| w.contains("organic matter")));
    }

    #[test]
    fn test_ca_mg_in_mg_per_dm3_converted() {
        let text = REPORT
            .replace("5,0           cmolc/dm³", "400           mg/dm³")
            .replace("2,0           cmolc/dm³", "120           mg/dm³");
        let parsed = parse_reports(&text).unwrap();
        let sample = parsed.reports[0].to_sample(PotassiumUnit::MgPerDm3).unwrap();
        assert_eq!(sample.ca, 2.0);
        assert_eq!(sample.mg, 1.0);
        assert_eq!(sample.k, 195.0);
    }

    #[test]
    fn test_missing_parameters_listed() {
        let text = "Cálcio  5,0\nMagnésio  2,0\n";
        let parsed = parse_reports(text).unwrap();
        let err = parsed.reports[0]
            .to_sample(PotassiumUnit::MgPerDm3)
            .unwrap_err();
        match err {
            FertilError::MissingParameter(list) => {
                assert!(list.contains(&"T".to_string()));
                assert!(list.contains(&"K".to_string()));
                assert!(list.contains(&"clayPercent".to_string()));
                assert!(!list.contains(&"Ca".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_text_is_error() {
        assert!(parse_reports("  \n \n").is_err());
    }

    #[test]
    fn test_text_without_values_is_error() {
        assert!(matches!(
            parse_reports("Laudo\nAmostra: 1\n"),
            Err(FertilError::ParseError(_))
        ));
    }
}

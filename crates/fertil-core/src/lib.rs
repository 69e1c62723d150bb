pub mod crops;
pub mod error;
pub mod extraction;
pub mod fertility;
pub mod model;
pub mod parsing;
pub mod reference;
pub mod units;

pub use error::FertilError;
pub use fertility::outcome::{AnalysisResult, BatchResult};
pub use fertility::{analyze, AnalysisOptions};
pub use model::{Nutrient, PotassiumUnit, SoilSample};
pub use reference::schema::ReferenceTables;

use extraction::InputFormat;
use parsing::ParsedReports;

/// Analyze every sample in a lab report's text.
///
/// Multi-sample reports are split and each sample is analyzed on its own.
/// The first sample that fails to map or validate fails the whole call.
pub fn analyze_text(
    text: &str,
    k_unit: PotassiumUnit,
    tables: &ReferenceTables,
    options: &AnalysisOptions,
) -> Result<BatchResult, FertilError> {
    let parsed = parsing::parse_reports(text)?;
    analyze_reports(&parsed, k_unit, tables, options)
}

/// Analyze reports that were already parsed (from text or xlsx).
pub fn analyze_reports(
    parsed: &ParsedReports,
    k_unit: PotassiumUnit,
    tables: &ReferenceTables,
    options: &AnalysisOptions,
) -> Result<BatchResult, FertilError> {
    let mut warnings = parsed.warnings.clone();
    warnings.extend(
        parsed
            .skipped_lines
            .iter()
            .map(|s| format!("skipped '{}': {}", s.line_text, s.reason)),
    );

    let mut samples = Vec::with_capacity(parsed.reports.len());
    for report in &parsed.reports {
        let (sample, notes) = parsing::report_to_sample(report, k_unit)?;
        warnings.extend(notes);
        samples.push(analyze(&sample, tables, options)?);
    }

    Ok(BatchResult { samples, warnings })
}

/// Analyze samples supplied directly.
pub fn analyze_samples(
    samples: &[SoilSample],
    tables: &ReferenceTables,
    options: &AnalysisOptions,
) -> Result<BatchResult, FertilError> {
    let samples = samples
        .iter()
        .map(|s| analyze(s, tables, options))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(BatchResult {
        samples,
        warnings: Vec::new(),
    })
}

/// Analyze a document of any supported format.
///
/// `k_unit` applies to report formats only; JSON samples state their own.
pub fn analyze_document(
    bytes: &[u8],
    format: InputFormat,
    k_unit: PotassiumUnit,
    tables: &ReferenceTables,
    options: &AnalysisOptions,
) -> Result<BatchResult, FertilError> {
    match format.reader() {
        Some(reader) => {
            tracing::debug!(format = reader.format_name(), "reading report");
            let parsed = reader.read_reports(bytes)?;
            analyze_reports(&parsed, k_unit, tables, options)
        }
        None => {
            let samples = extraction::parse_samples_json(&extraction::decode_text(bytes))?;
            analyze_samples(&samples, tables, options)
        }
    }
}

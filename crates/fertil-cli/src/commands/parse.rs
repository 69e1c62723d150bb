use fertil_core::error::FertilError;
use fertil_core::extraction::InputFormat;
use std::path::PathBuf;

use crate::commands::parse_k_unit;
use crate::output;

pub fn run(
    input_file: PathBuf,
    output_format: &str,
    k_unit: Option<&str>,
) -> Result<(), FertilError> {
    let format = InputFormat::from_path(&input_file);
    let reader = format.reader().ok_or_else(|| {
        FertilError::ParseError(
            "JSON input already holds samples; use `fertil analyze` instead".into(),
        )
    })?;

    let bytes = std::fs::read(&input_file)?;
    let parsed = reader.read_reports(&bytes)?;

    // With --k-unit, also show what the engine would receive.
    let samples = match k_unit {
        Some(unit) => {
            let unit = parse_k_unit(unit)?;
            parsed
                .reports
                .iter()
                .map(|r| r.to_sample(unit))
                .collect::<Result<Vec<_>, _>>()?
        }
        None => Vec::new(),
    };

    match output_format {
        "json" if samples.is_empty() => output::json::print(&parsed)?,
        "json" => output::json::print(&samples)?,
        _ => {
            println!("{}", output::table::format_parsed(&parsed));
            for sample in &samples {
                println!("{}", output::table::format_sample(sample));
            }
        }
    }

    Ok(())
}

use fertil_core::crops::{self, builtin};
use fertil_core::error::FertilError;
use fertil_core::extraction::InputFormat;
use fertil_core::reference;
use fertil_core::{AnalysisOptions, ReferenceTables};
use std::path::PathBuf;

use crate::commands::parse_k_unit;
use crate::output;

pub struct AnalyzeArgs {
    pub input_file: PathBuf,
    pub k_unit: String,
    pub crop: Option<String>,
    pub crop_file: Option<PathBuf>,
    pub tables: Option<PathBuf>,
    pub base_strategy: String,
    pub p_factor: String,
    pub k_dose: String,
    pub fertilizers: bool,
    pub output: String,
    pub verbose: bool,
}

pub fn run(args: AnalyzeArgs) -> Result<(), FertilError> {
    let tables = match &args.tables {
        Some(path) => reference::load_tables(path)?,
        None => ReferenceTables::builtin(),
    };

    let crop = match (&args.crop, &args.crop_file) {
        (Some(name), _) => Some(builtin::load_preset(name)?),
        (None, Some(path)) => Some(crops::load_crop_profile(path)?),
        (None, None) => None,
    };

    let options = AnalysisOptions {
        base_strategy: args.base_strategy.parse()?,
        phosphorus_factor: args.p_factor.parse()?,
        potassium_dose: args.k_dose.parse()?,
        crop,
        include_fertilizers: args.fertilizers,
    };
    let k_unit = parse_k_unit(&args.k_unit)?;

    let bytes = std::fs::read(&args.input_file)?;
    let format = InputFormat::from_path(&args.input_file);
    tracing::debug!(file = %args.input_file.display(), ?format, "analyzing input");

    let result = fertil_core::analyze_document(&bytes, format, k_unit, &tables, &options)?;

    match args.output.as_str() {
        "json" => output::json::print(&result)?,
        _ => output::table::print(&result, args.verbose),
    }

    Ok(())
}

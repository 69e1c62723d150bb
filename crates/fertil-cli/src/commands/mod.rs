pub mod analyze;
pub mod crops;
pub mod parse;
pub mod tables;

use fertil_core::error::FertilError;
use fertil_core::PotassiumUnit;

/// Parse the `--k-unit` flag ("mg", "mg/dm3", "cmolc", "cmolc/dm3").
pub fn parse_k_unit(s: &str) -> Result<PotassiumUnit, FertilError> {
    PotassiumUnit::from_str_loose(s).ok_or_else(|| {
        FertilError::ParseError(format!("unknown K unit '{s}'. Use mg or cmolc"))
    })
}

pub mod builtin;
pub mod phosphorus;
pub mod schema;
pub mod texture;

use crate::error::FertilError;
use crate::model::Nutrient;
use schema::{Band, NutrientBasis, ReferenceTables};
use std::path::Path;

impl ReferenceTables {
    /// The tables shipped with the library.
    pub fn builtin() -> Self {
        builtin::default_tables()
    }
}

impl Default for ReferenceTables {
    fn default() -> Self {
        builtin::default_tables()
    }
}

/// Load reference tables from a JSON file.
pub fn load_tables(path: &Path) -> Result<ReferenceTables, FertilError> {
    let content = std::fs::read_to_string(path).map_err(|e| FertilError::ReferenceLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_tables(&content, path)
}

/// Parse reference tables from a JSON string.
pub fn parse_tables(json: &str, source: &Path) -> Result<ReferenceTables, FertilError> {
    let tables: ReferenceTables =
        serde_json::from_str(json).map_err(|e| FertilError::ReferenceLoad {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_tables(&tables)?;
    Ok(tables)
}

/// Parse reference tables from a JSON string (no file path context).
pub fn parse_tables_str(json: &str) -> Result<ReferenceTables, FertilError> {
    let tables: ReferenceTables = serde_json::from_str(json).map_err(FertilError::Json)?;
    validate_tables(&tables)?;
    Ok(tables)
}

/// Validate that reference tables are internally consistent.
pub fn validate_tables(tables: &ReferenceTables) -> Result<(), FertilError> {
    let invalid = |msg: String| Err(FertilError::ReferenceInvalid(msg));

    let clay = tables.texture.class_upper_clay;
    if !strictly_increasing(&clay) || clay[0] <= 0.0 || clay[2] >= 100.0 {
        return invalid(format!(
            "texture breakpoints must strictly increase within (0, 100), got {clay:?}"
        ));
    }

    for (i, row) in tables.phosphorus_interpretation.iter().enumerate() {
        if !strictly_increasing(&row.as_array()) || row.muito_baixo <= 0.0 {
            return invalid(format!(
                "phosphorus thresholds for texture class {} must be positive and strictly increasing",
                i + 1
            ));
        }
    }
    for pair in tables.phosphorus_interpretation.windows(2) {
        let (coarse, fine) = (pair[0].as_array(), pair[1].as_array());
        if coarse.iter().zip(fine.iter()).any(|(a, b)| a >= b) {
            return invalid(
                "phosphorus thresholds must strictly increase from coarse to fine texture classes"
                    .into(),
            );
        }
    }

    let bands = &tables.saturation_bands;
    for (name, band) in [
        ("Ca", bands.ca),
        ("Mg", bands.mg),
        ("K", bands.k),
        ("Ca:Mg ratio", bands.ca_mg_ratio),
    ] {
        check_band(name, band)?;
    }

    let fractions = tables.base_targets.cec_fraction;
    for n in Nutrient::BASES {
        let fraction = fractions.get(n).unwrap_or_default();
        if !(fraction > 0.0 && fraction <= 1.0) {
            return invalid(format!("CEC fraction target for {n} must lie in (0, 1]"));
        }
        let threshold = tables.base_targets.fixed_threshold.get(n).unwrap_or_default();
        if threshold <= 0.0 {
            return invalid(format!("fixed threshold for {n} must be positive"));
        }
    }
    if fractions.ca + fractions.mg + fractions.k > 1.0 {
        return invalid("CEC fraction targets must not sum above 1".into());
    }

    for n in Nutrient::SECONDARY {
        let target = tables.secondary_target(n)?;
        if target.floor < 0.0 || target.scale <= 0.0 {
            return invalid(format!("{n} target needs a non-negative floor and positive scale"));
        }
        match (n, target.ceiling) {
            (Nutrient::Fe | Nutrient::Mn, Some(ceiling)) if ceiling > target.floor => {}
            (Nutrient::Fe | Nutrient::Mn, _) => {
                return invalid(format!("{n} needs a toxicity ceiling above its floor"));
            }
            (_, Some(_)) => {
                return invalid(format!("{n} must not carry a ceiling"));
            }
            (_, None) => {}
        }
    }
    if let Some(extra) = tables
        .secondary_targets
        .keys()
        .find(|n| !n.is_secondary())
    {
        return invalid(format!("{extra} is not a secondary nutrient"));
    }

    let factors = &tables.phosphorus_factors;
    let band_limits: Vec<f64> = factors.current_p_bands.iter().map(|b| b.max_p).collect();
    let mut band_factors: Vec<f64> = factors.current_p_bands.iter().map(|b| b.factor).collect();
    band_factors.push(factors.above_bands);
    if !strictly_increasing(&band_limits) {
        return invalid("phosphorus factor bands must have strictly increasing limits".into());
    }
    if !strictly_decreasing(&band_factors) || !strictly_decreasing(&factors.by_texture_class) {
        return invalid("phosphorus need factors must strictly decrease".into());
    }
    if band_factors
        .iter()
        .chain(factors.by_texture_class.iter())
        .any(|f| *f <= 0.0)
    {
        return invalid("phosphorus need factors must be positive".into());
    }

    let dose = &tables.dose;
    if [dose.ca, dose.mg, dose.k_shortcut, dose.k_oxide]
        .iter()
        .any(|m| *m <= 0.0)
        || dose.epsilon < 0.0
    {
        return invalid("dose multipliers must be positive and epsilon non-negative".into());
    }

    for n in Nutrient::ALL {
        let sources = match tables.sources(n) {
            Some(s) if !s.is_empty() => s,
            _ => return invalid(format!("catalog has no sources for {n}")),
        };
        for source in sources {
            if source.name.trim().is_empty() {
                return invalid(format!("catalog source for {n} has an empty name"));
            }
            if !(source.concentration > 0.0 && source.concentration <= 100.0) {
                return invalid(format!(
                    "'{}' concentration must lie in (0, 100], got {}",
                    source.name, source.concentration
                ));
            }
            if n.is_secondary() && source.basis == NutrientBasis::Oxide {
                return invalid(format!(
                    "'{}' must be quoted on an elemental basis for {n}",
                    source.name
                ));
            }
        }
    }

    Ok(())
}

fn check_band(name: &str, band: Band) -> Result<(), FertilError> {
    if band.min < 0.0 || band.min > band.max {
        return Err(FertilError::ReferenceInvalid(format!(
            "{name} band [{}, {}] is not a valid range",
            band.min, band.max
        )));
    }
    Ok(())
}

fn strictly_increasing(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] < w[1])
}

fn strictly_decreasing(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] > w[1])
}

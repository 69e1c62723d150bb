use crate::error::FertilError;
use crate::fertility::need::NutrientNeeds;
use crate::model::Nutrient;
use crate::reference::schema::{FertilizerSource, NutrientBasis, ReferenceTables};
use crate::units;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Multiplier applied to a K need before dividing by source concentration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PotassiumDoseBasis {
    /// Empirical multiplier (2 by default).
    #[default]
    ResolverShortcut,
    /// Full K → K₂O conversion (950 by default).
    OxideConversion,
}

impl fmt::Display for PotassiumDoseBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PotassiumDoseBasis::ResolverShortcut => write!(f, "shortcut"),
            PotassiumDoseBasis::OxideConversion => write!(f, "oxide"),
        }
    }
}

impl FromStr for PotassiumDoseBasis {
    type Err = FertilError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "shortcut" | "resolver-shortcut" => Ok(PotassiumDoseBasis::ResolverShortcut),
            "oxide" | "oxide-conversion" => Ok(PotassiumDoseBasis::OxideConversion),
            other => Err(FertilError::ParseError(format!(
                "unknown potassium dose basis '{other}' (expected shortcut or oxide)"
            ))),
        }
    }
}

/// A catalog source with the rate needed to cover the deficit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertilizerRecommendation {
    #[serde(flatten)]
    pub source: FertilizerSource,
    /// kg/ha, rounded to two decimals.
    pub application_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "sources", rename_all = "snake_case")]
pub enum DoseResolution {
    /// Adequate, no correction.
    NoCorrection,
    Recommendations(Vec<FertilizerRecommendation>),
}

impl DoseResolution {
    pub fn recommendations(&self) -> &[FertilizerRecommendation] {
        match self {
            DoseResolution::NoCorrection => &[],
            DoseResolution::Recommendations(list) => list,
        }
    }
}

/// Resolve a need into application rates for every catalog source of the
/// nutrient named by `symbol`.
pub fn resolve_doses(
    symbol: &str,
    need: f64,
    tables: &ReferenceTables,
    basis: PotassiumDoseBasis,
) -> Result<DoseResolution, FertilError> {
    let nutrient: Nutrient = symbol.parse()?;
    resolve_nutrient(nutrient, need, tables, basis)
}

pub fn resolve_nutrient(
    nutrient: Nutrient,
    need: f64,
    tables: &ReferenceTables,
    basis: PotassiumDoseBasis,
) -> Result<DoseResolution, FertilError> {
    let sources = tables
        .sources(nutrient)
        .ok_or_else(|| FertilError::UnknownNutrient(nutrient.symbol().to_string()))?;

    if !need.is_finite() || need < -tables.dose.epsilon {
        return Err(FertilError::invalid_sample(
            "need",
            format!("must be a finite, non-negative amount, got {need}"),
        ));
    }
    if need <= tables.dose.epsilon {
        return Ok(DoseResolution::NoCorrection);
    }

    let multiplier = dose_multiplier(nutrient, tables, basis);
    let recommendations = sources
        .iter()
        .map(|source| {
            let fraction = effective_concentration(nutrient, source) / 100.0;
            FertilizerRecommendation {
                source: source.clone(),
                application_rate: round2(need * multiplier / fraction),
            }
        })
        .collect();
    Ok(DoseResolution::Recommendations(recommendations))
}

/// Resolve every nutrient's need against the catalog.
pub fn resolve_all(
    needs: &NutrientNeeds,
    tables: &ReferenceTables,
    basis: PotassiumDoseBasis,
) -> Result<BTreeMap<Nutrient, DoseResolution>, FertilError> {
    let mut out = BTreeMap::new();
    for n in Nutrient::ALL {
        let resolution = resolve_nutrient(n, needs.get(n), tables, basis)?;
        tracing::debug!(
            nutrient = %n,
            need = needs.get(n),
            sources = resolution.recommendations().len(),
            "resolved dose"
        );
        out.insert(n, resolution);
    }
    Ok(out)
}

fn dose_multiplier(nutrient: Nutrient, tables: &ReferenceTables, basis: PotassiumDoseBasis) -> f64 {
    match nutrient {
        Nutrient::Ca => tables.dose.ca,
        Nutrient::Mg => tables.dose.mg,
        Nutrient::K => match basis {
            PotassiumDoseBasis::ResolverShortcut => tables.dose.k_shortcut,
            PotassiumDoseBasis::OxideConversion => tables.dose.k_oxide,
        },
        _ => 1.0,
    }
}

/// Concentration on the basis the dose formula expects: oxide for Ca, Mg, K
/// and P; elemental for the rest.
fn effective_concentration(nutrient: Nutrient, source: &FertilizerSource) -> f64 {
    match (source.basis, units::elemental_to_oxide_ratio(nutrient)) {
        (NutrientBasis::Elemental, Some(ratio)) => source.concentration * ratio,
        _ => source.concentration,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

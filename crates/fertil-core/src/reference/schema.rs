use crate::error::FertilError;
use crate::model::Nutrient;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All agronomic constants consulted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTables {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    pub texture: TextureBreakpoints,
    /// One row per texture class, coarsest (class 1) first.
    pub phosphorus_interpretation: [PhosphorusBreakpoints; 4],
    pub saturation_bands: SaturationBands,
    pub base_targets: BaseTargets,
    /// Floor/ceiling/scale for S, B, Cu, Fe, Mn, Zn and Mo.
    pub secondary_targets: BTreeMap<Nutrient, SecondaryTarget>,
    pub phosphorus_factors: PhosphorusFactors,
    pub dose: DoseConstants,
    /// Ordered fertilizer sources per nutrient.
    pub catalog: BTreeMap<Nutrient, Vec<FertilizerSource>>,
}

impl ReferenceTables {
    pub fn secondary_target(&self, nutrient: Nutrient) -> Result<&SecondaryTarget, FertilError> {
        self.secondary_targets.get(&nutrient).ok_or_else(|| {
            FertilError::ReferenceInvalid(format!("no secondary target for {nutrient}"))
        })
    }

    pub fn sources(&self, nutrient: Nutrient) -> Option<&[FertilizerSource]> {
        self.catalog.get(&nutrient).map(|v| v.as_slice())
    }
}

/// Upper clay bounds (%, inclusive) of texture classes 1, 2 and 3. Anything
/// above the last bound is class 4.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureBreakpoints {
    pub class_upper_clay: [f64; 3],
}

/// Upper P bounds (mg/dm³, inclusive) of each interpretation level for one
/// texture class. Above `alto` is "Muito Alto".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhosphorusBreakpoints {
    pub muito_baixo: f64,
    pub baixo: f64,
    pub medio: f64,
    pub alto: f64,
}

impl PhosphorusBreakpoints {
    pub fn as_array(&self) -> [f64; 4] {
        [self.muito_baixo, self.baixo, self.medio, self.alto]
    }

    /// P level above which the soil is interpreted as "Alto".
    pub fn critical_level(&self) -> f64 {
        self.medio
    }
}

/// Inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Ideal saturation (% of CEC) per base, plus the ideal Ca:Mg ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaturationBands {
    pub ca: Band,
    pub mg: Band,
    pub k: Band,
    pub ca_mg_ratio: Band,
}

impl SaturationBands {
    pub fn for_base(&self, nutrient: Nutrient) -> Option<Band> {
        match nutrient {
            Nutrient::Ca => Some(self.ca),
            Nutrient::Mg => Some(self.mg),
            Nutrient::K => Some(self.k),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseValues {
    pub ca: f64,
    pub mg: f64,
    pub k: f64,
}

impl BaseValues {
    pub fn get(&self, nutrient: Nutrient) -> Option<f64> {
        match nutrient {
            Nutrient::Ca => Some(self.ca),
            Nutrient::Mg => Some(self.mg),
            Nutrient::K => Some(self.k),
            _ => None,
        }
    }
}

/// Targets for Ca, Mg and K under the two need strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseTargets {
    /// Target content as a fraction of T.
    pub cec_fraction: BaseValues,
    /// Target content in cmolc/dm³.
    pub fixed_threshold: BaseValues,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SecondaryTarget {
    /// mg/dm³. Values at or above the floor need no correction.
    pub floor: f64,
    /// mg/dm³. Values above the ceiling are flagged as a toxicity risk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ceiling: Option<f64>,
    /// Converts a mg/dm³ deficit into a kg/ha-equivalent correction.
    pub scale: f64,
    /// The floor is advisory only.
    #[serde(default)]
    pub advisory: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorBand {
    /// Inclusive upper bound of current P (mg/dm³).
    pub max_p: f64,
    pub factor: f64,
}

/// Multipliers turning a P deficit (mg/dm³) into a kg/ha dose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhosphorusFactors {
    /// Keyed by the current P value, ascending.
    pub current_p_bands: Vec<FactorBand>,
    /// Factor when current P is above every band.
    pub above_bands: f64,
    /// Keyed by texture class 1..=4.
    pub by_texture_class: [f64; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseConstants {
    /// kg/ha of source oxide per cmolc/dm³ of Ca deficit.
    pub ca: f64,
    /// kg/ha of source oxide per cmolc/dm³ of Mg deficit.
    pub mg: f64,
    /// Empirical K multiplier of the resolver path.
    pub k_shortcut: f64,
    /// K → K₂O oxide conversion multiplier.
    pub k_oxide: f64,
    /// Needs at or below this value resolve to "no correction".
    pub epsilon: f64,
}

/// Whether a source's concentration is quoted as oxide (CaO, MgO, K₂O, P₂O₅)
/// or as the element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NutrientBasis {
    Oxide,
    Elemental,
}

/// A commercial fertilizer source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertilizerSource {
    pub name: String,
    /// Nutrient concentration in percent, on `basis`.
    pub concentration: f64,
    pub basis: NutrientBasis,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default)]
    pub benefits: String,
}

fn default_unit() -> String {
    "kg/ha".to_string()
}

use crate::model::Nutrient;
use crate::reference::schema::BaseValues;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Crop-specific overrides of the default reference targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropProfile {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    /// Ca, Mg and K targets as fractions of T (CEC-fraction strategy).
    #[serde(default)]
    pub saturation_targets: Option<BaseValues>,
    /// Ca, Mg and K targets in cmolc/dm³ (fixed-threshold strategy).
    #[serde(default)]
    pub fixed_thresholds: Option<BaseValues>,
    /// Floors (mg/dm³) replacing the defaults for S, B, Cu, Fe, Mn, Zn or Mo.
    #[serde(default)]
    pub secondary_floors: BTreeMap<Nutrient, f64>,
    #[serde(default)]
    pub note: Option<String>,
}

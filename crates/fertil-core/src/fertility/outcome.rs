use crate::fertility::adequacy::{AdequacyVerdict, NutrientAssessment};
use crate::fertility::dose::{DoseResolution, PotassiumDoseBasis};
use crate::fertility::need::{BaseNeedStrategy, NutrientNeeds, OxideDoses, PhosphorusFactorStrategy};
use crate::fertility::saturation::{CaMgRatio, SaturationResult};
use crate::model::{Nutrient, SampleMetadata};
use crate::reference::phosphorus::PhosphorusInterpretation;
use crate::reference::texture::TextureClass;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The formulas an analysis was run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedStrategies {
    pub base_need: BaseNeedStrategy,
    pub phosphorus_factor: PhosphorusFactorStrategy,
    pub potassium_dose: PotassiumDoseBasis,
}

/// Full fertility analysis of one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub metadata: SampleMetadata,
    pub texture_class: TextureClass,
    pub phosphorus: PhosphorusInterpretation,
    pub saturation: SaturationResult,
    pub ca_mg_ratio: CaMgRatio,
    pub adequacy: AdequacyVerdict,
    /// Per-nutrient status with reasons, in canonical nutrient order.
    pub assessments: Vec<NutrientAssessment>,
    pub needs: NutrientNeeds,
    pub oxide_doses: OxideDoses,
    pub strategies: AppliedStrategies,
    /// Reference table set the analysis ran against.
    pub reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<String>,
    /// Present only when fertilizer recommendations were requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fertilizers: Option<BTreeMap<Nutrient, DoseResolution>>,
    /// Data-quality signals (bases above T, undefined ratio, ...).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl AnalysisResult {
    /// Sample id, falling back to "unknown".
    pub fn sample_id(&self) -> &str {
        self.metadata.id.as_deref().unwrap_or("unknown")
    }
}

/// Results for every sample in a multi-sample input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub samples: Vec<AnalysisResult>,
    /// Lines skipped or defaulted while reading the input.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

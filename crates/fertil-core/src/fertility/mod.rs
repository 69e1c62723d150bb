pub mod adequacy;
pub mod dose;
pub mod need;
pub mod outcome;
pub mod saturation;
pub mod targets;

use crate::crops::schema::CropProfile;
use crate::error::FertilError;
use crate::model::SoilSample;
use crate::reference::phosphorus::interpret_phosphorus;
use crate::reference::schema::ReferenceTables;
use crate::reference::texture::TextureClass;
use dose::PotassiumDoseBasis;
use need::{BaseNeedStrategy, OxideDoses, PhosphorusFactorStrategy};
use outcome::{AnalysisResult, AppliedStrategies};
use targets::EffectiveTargets;

/// Everything about an analysis run that is not the sample or the tables.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    pub base_strategy: BaseNeedStrategy,
    pub phosphorus_factor: PhosphorusFactorStrategy,
    pub potassium_dose: PotassiumDoseBasis,
    /// Crop overrides for base targets and secondary floors.
    pub crop: Option<CropProfile>,
    /// Resolve needs into fertilizer application rates.
    pub include_fertilizers: bool,
}

/// Run the full pipeline on one sample: saturation, texture and P
/// interpretation, adequacy, needs and (optionally) fertilizer doses.
///
/// Pure: the same inputs always give the same result.
pub fn analyze(
    sample: &SoilSample,
    tables: &ReferenceTables,
    options: &AnalysisOptions,
) -> Result<AnalysisResult, FertilError> {
    let saturation = saturation::compute_saturation(sample)?;
    let ratio = saturation::ca_mg_ratio(sample);
    let texture_class = TextureClass::from_clay(sample.clay_percent, &tables.texture)?;
    let phosphorus = interpret_phosphorus(tables, texture_class, sample.p);
    let targets = EffectiveTargets::new(tables, options.crop.as_ref());

    let sample_id = sample.metadata.id.as_deref().unwrap_or("unknown");
    let mut warnings = Vec::new();

    if saturation.total() > 100.0 {
        tracing::warn!(
            sample = sample_id,
            total = saturation.total(),
            "base saturation exceeds 100% of T"
        );
        warnings.push(format!(
            "Ca + Mg + K saturation is {:.1}% of T; check T and the base values",
            saturation.total()
        ));
    }
    if !ratio.is_defined() {
        tracing::warn!(sample = sample_id, "Mg is zero, Ca:Mg ratio undefined");
        warnings.push("Mg is zero; Ca:Mg ratio is undefined".to_string());
    }

    let (assessments, adequacy) =
        adequacy::assess(sample, &saturation, ratio, &phosphorus, &targets)?;
    let needs = need::compute_needs(
        sample,
        &phosphorus,
        &targets,
        options.base_strategy,
        options.phosphorus_factor,
    )?;
    let oxide_doses = OxideDoses::from_needs(&needs);

    tracing::debug!(
        sample = sample_id,
        texture = %texture_class,
        p_level = %phosphorus.level,
        inadequate = ?adequacy.inadequate(),
        "analysis complete"
    );

    let fertilizers = if options.include_fertilizers {
        Some(dose::resolve_all(&needs, tables, options.potassium_dose)?)
    } else {
        None
    };

    Ok(AnalysisResult {
        metadata: sample.metadata.clone(),
        texture_class,
        phosphorus,
        saturation,
        ca_mg_ratio: ratio,
        adequacy,
        assessments,
        needs,
        oxide_doses,
        strategies: AppliedStrategies {
            base_need: options.base_strategy,
            phosphorus_factor: options.phosphorus_factor,
            potassium_dose: options.potassium_dose,
        },
        reference: tables.name.clone(),
        crop: targets.crop_name().map(str::to_string),
        fertilizers,
        warnings,
    })
}

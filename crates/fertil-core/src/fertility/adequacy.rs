use crate::error::FertilError;
use crate::fertility::saturation::{CaMgRatio, SaturationResult};
use crate::fertility::targets::EffectiveTargets;
use crate::model::{Nutrient, SoilSample};
use crate::reference::phosphorus::PhosphorusInterpretation;
use crate::reference::schema::{Band, SecondaryTarget};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NutrientStatus {
    Deficient,
    Adequate,
    /// Above the ideal band, or above a toxicity ceiling for Fe and Mn.
    Excessive,
}

impl fmt::Display for NutrientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NutrientStatus::Deficient => "deficient",
            NutrientStatus::Adequate => "adequate",
            NutrientStatus::Excessive => "excessive",
        };
        write!(f, "{s}")
    }
}

/// How one nutrient was judged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientAssessment {
    pub nutrient: Nutrient,
    /// The value that was compared: saturation (%) for bases, content otherwise.
    pub value: f64,
    pub unit: String,
    pub status: NutrientStatus,
    /// Human-readable explanation of the status.
    pub reason: String,
}

impl NutrientAssessment {
    pub fn is_adequate(&self) -> bool {
        self.status == NutrientStatus::Adequate
    }
}

/// One flag per tracked nutrient plus the Ca:Mg ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdequacyVerdict {
    pub ca: bool,
    pub mg: bool,
    pub k: bool,
    pub p: bool,
    pub s: bool,
    pub b: bool,
    pub cu: bool,
    pub fe: bool,
    pub mn: bool,
    pub zn: bool,
    pub mo: bool,
    pub ca_mg_ratio: bool,
}

impl AdequacyVerdict {
    pub fn from_assessments(assessments: &[NutrientAssessment], ratio_adequate: bool) -> Self {
        let mut verdict = AdequacyVerdict {
            ca_mg_ratio: ratio_adequate,
            ..Default::default()
        };
        for a in assessments {
            *verdict.flag_mut(a.nutrient) = a.is_adequate();
        }
        verdict
    }

    pub fn is_adequate(&self, nutrient: Nutrient) -> bool {
        match nutrient {
            Nutrient::Ca => self.ca,
            Nutrient::Mg => self.mg,
            Nutrient::K => self.k,
            Nutrient::P => self.p,
            Nutrient::S => self.s,
            Nutrient::B => self.b,
            Nutrient::Cu => self.cu,
            Nutrient::Fe => self.fe,
            Nutrient::Mn => self.mn,
            Nutrient::Zn => self.zn,
            Nutrient::Mo => self.mo,
        }
    }

    /// Nutrients flagged as not adequate, in canonical order.
    pub fn inadequate(&self) -> Vec<Nutrient> {
        Nutrient::ALL
            .into_iter()
            .filter(|n| !self.is_adequate(*n))
            .collect()
    }

    fn flag_mut(&mut self, nutrient: Nutrient) -> &mut bool {
        match nutrient {
            Nutrient::Ca => &mut self.ca,
            Nutrient::Mg => &mut self.mg,
            Nutrient::K => &mut self.k,
            Nutrient::P => &mut self.p,
            Nutrient::S => &mut self.s,
            Nutrient::B => &mut self.b,
            Nutrient::Cu => &mut self.cu,
            Nutrient::Fe => &mut self.fe,
            Nutrient::Mn => &mut self.mn,
            Nutrient::Zn => &mut self.zn,
            Nutrient::Mo => &mut self.mo,
        }
    }
}

/// Assess every tracked nutrient and the Ca:Mg ratio.
pub fn assess(
    sample: &SoilSample,
    saturation: &SaturationResult,
    ratio: CaMgRatio,
    phosphorus: &PhosphorusInterpretation,
    targets: &EffectiveTargets<'_>,
) -> Result<(Vec<NutrientAssessment>, AdequacyVerdict), FertilError> {
    let bands = &targets.tables().saturation_bands;
    let mut assessments = Vec::with_capacity(Nutrient::ALL.len());

    for n in Nutrient::BASES {
        if let (Some(pct), Some(band)) = (saturation.get(n), bands.for_base(n)) {
            assessments.push(assess_base(n, pct, band));
        }
    }
    assessments.push(assess_phosphorus(sample.p, phosphorus));
    for n in Nutrient::SECONDARY {
        assessments.push(assess_secondary(n, sample.value(n), &targets.secondary(n)?));
    }

    let verdict =
        AdequacyVerdict::from_assessments(&assessments, ratio_is_adequate(ratio, bands.ca_mg_ratio));
    Ok((assessments, verdict))
}

/// Ca, Mg or K saturation against its ideal band.
pub fn assess_base(nutrient: Nutrient, saturation_pct: f64, band: Band) -> NutrientAssessment {
    let (status, comparison) = if saturation_pct < band.min {
        (NutrientStatus::Deficient, format!("< {}", band.min))
    } else if saturation_pct > band.max {
        (NutrientStatus::Excessive, format!("> {}", band.max))
    } else {
        (
            NutrientStatus::Adequate,
            format!("within [{}, {}]", band.min, band.max),
        )
    };

    NutrientAssessment {
        nutrient,
        value: saturation_pct,
        unit: "% of T".to_string(),
        status,
        reason: format!("{nutrient}: {saturation_pct:.1}% of T {comparison} -> {status}"),
    }
}

pub fn assess_phosphorus(p: f64, interpretation: &PhosphorusInterpretation) -> NutrientAssessment {
    let status = if interpretation.level.is_adequate() {
        NutrientStatus::Adequate
    } else {
        NutrientStatus::Deficient
    };
    let mut reason = format!(
        "P: {p} mg/dm³ is {} for texture class {}",
        interpretation.level, interpretation.texture_class
    );
    if status == NutrientStatus::Deficient {
        reason.push_str(&format!(
            ", critical level {}",
            interpretation.critical_level
        ));
    }
    reason.push_str(&format!(" -> {status}"));

    NutrientAssessment {
        nutrient: Nutrient::P,
        value: p,
        unit: "mg/dm³".to_string(),
        status,
        reason,
    }
}

/// S, B, Cu, Fe, Mn, Zn or Mo against its floor and, for Fe and Mn, its ceiling.
pub fn assess_secondary(
    nutrient: Nutrient,
    value: f64,
    target: &SecondaryTarget,
) -> NutrientAssessment {
    let (status, mut reason) = if value < target.floor {
        (
            NutrientStatus::Deficient,
            format!("{nutrient}: {value} mg/dm³ < floor {}", target.floor),
        )
    } else {
        match target.ceiling {
            Some(ceiling) if value > ceiling => (
                NutrientStatus::Excessive,
                format!("{nutrient}: {value} mg/dm³ > ceiling {ceiling}"),
            ),
            Some(ceiling) => (
                NutrientStatus::Adequate,
                format!(
                    "{nutrient}: {value} mg/dm³ within [{}, {ceiling}]",
                    target.floor
                ),
            ),
            None => (
                NutrientStatus::Adequate,
                format!("{nutrient}: {value} mg/dm³ >= floor {}", target.floor),
            ),
        }
    };

    reason.push_str(&format!(" -> {status}"));
    if status == NutrientStatus::Excessive {
        reason.push_str(" (toxicity risk)");
    }
    if target.advisory {
        reason.push_str(" (advisory floor)");
    }

    NutrientAssessment {
        nutrient,
        value,
        unit: "mg/dm³".to_string(),
        status,
        reason,
    }
}

/// An undefined ratio is never adequate.
pub fn ratio_is_adequate(ratio: CaMgRatio, band: Band) -> bool {
    match ratio {
        CaMgRatio::Defined(r) => band.contains(r),
        CaMgRatio::Undefined => false,
    }
}

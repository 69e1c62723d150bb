use crate::error::FertilError;
use crate::fertility::targets::EffectiveTargets;
use crate::model::{Nutrient, SoilSample};
use crate::reference::phosphorus::PhosphorusInterpretation;
use crate::reference::schema::{PhosphorusFactors, SecondaryTarget};
use crate::reference::texture::TextureClass;
use crate::units;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the Ca, Mg and K targets are set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BaseNeedStrategy {
    /// Target is a fraction of T (0.55 / 0.175 / 0.04 by default).
    #[default]
    CecFraction,
    /// Target is a fixed content in cmolc/dm³.
    FixedThreshold,
}

impl fmt::Display for BaseNeedStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseNeedStrategy::CecFraction => write!(f, "cec-fraction"),
            BaseNeedStrategy::FixedThreshold => write!(f, "fixed-threshold"),
        }
    }
}

impl FromStr for BaseNeedStrategy {
    type Err = FertilError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cec-fraction" | "cec" => Ok(BaseNeedStrategy::CecFraction),
            "fixed-threshold" | "fixed" => Ok(BaseNeedStrategy::FixedThreshold),
            other => Err(FertilError::ParseError(format!(
                "unknown base need strategy '{other}' (expected cec-fraction or fixed-threshold)"
            ))),
        }
    }
}

/// Which table turns a P deficit into kg/ha.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhosphorusFactorStrategy {
    /// Factor keyed by the current P value.
    #[default]
    CurrentPBands,
    /// Factor keyed by texture class.
    TextureClass,
}

impl fmt::Display for PhosphorusFactorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhosphorusFactorStrategy::CurrentPBands => write!(f, "current-p"),
            PhosphorusFactorStrategy::TextureClass => write!(f, "texture"),
        }
    }
}

impl FromStr for PhosphorusFactorStrategy {
    type Err = FertilError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "current-p" | "current-p-bands" => Ok(PhosphorusFactorStrategy::CurrentPBands),
            "texture" | "texture-class" => Ok(PhosphorusFactorStrategy::TextureClass),
            other => Err(FertilError::ParseError(format!(
                "unknown phosphorus factor strategy '{other}' (expected current-p or texture)"
            ))),
        }
    }
}

/// Deficit per nutrient. Ca, Mg and K in cmolc/dm³; the rest in kg/ha-equivalent.
/// Never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientNeeds {
    pub ca: f64,
    pub mg: f64,
    pub k: f64,
    pub p: f64,
    pub s: f64,
    pub b: f64,
    pub cu: f64,
    pub fe: f64,
    pub mn: f64,
    pub zn: f64,
    pub mo: f64,
}

impl NutrientNeeds {
    pub fn get(&self, nutrient: Nutrient) -> f64 {
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

    fn set(&mut self, nutrient: Nutrient, need: f64) {
        let slot = match nutrient {
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
        };
        *slot = need;
    }
}

/// Ca, Mg and K needs expressed as kg/ha of oxide.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OxideDoses {
    pub cao: f64,
    pub mgo: f64,
    pub k2o: f64,
}

impl OxideDoses {
    pub fn from_needs(needs: &NutrientNeeds) -> Self {
        OxideDoses {
            cao: needs.ca * units::CA_CMOLC_TO_CAO_KG_HA,
            mgo: needs.mg * units::MG_CMOLC_TO_MGO_KG_HA,
            k2o: needs.k * units::K_CMOLC_TO_K2O_KG_HA,
        }
    }
}

fn deficit(target: f64, current: f64) -> f64 {
    (target - current).max(0.0)
}

/// Need of one base in cmolc/dm³. `None` for non-base nutrients.
pub fn base_need(
    nutrient: Nutrient,
    sample: &SoilSample,
    strategy: BaseNeedStrategy,
    targets: &EffectiveTargets<'_>,
) -> Option<f64> {
    let current = sample.base_cmolc(nutrient)?;
    let target = match strategy {
        BaseNeedStrategy::CecFraction => targets.cec_fraction(nutrient)? * sample.cec,
        BaseNeedStrategy::FixedThreshold => targets.fixed_threshold(nutrient)?,
    };
    Some(deficit(target, current))
}

pub fn phosphorus_factor(
    strategy: PhosphorusFactorStrategy,
    current_p: f64,
    texture_class: TextureClass,
    factors: &PhosphorusFactors,
) -> f64 {
    match strategy {
        PhosphorusFactorStrategy::CurrentPBands => factors
            .current_p_bands
            .iter()
            .find(|band| current_p <= band.max_p)
            .map(|band| band.factor)
            .unwrap_or(factors.above_bands),
        PhosphorusFactorStrategy::TextureClass => factors.by_texture_class[texture_class.index()],
    }
}

/// P deficit below the class's critical level, scaled to kg/ha.
pub fn phosphorus_need(
    current_p: f64,
    interpretation: &PhosphorusInterpretation,
    strategy: PhosphorusFactorStrategy,
    factors: &PhosphorusFactors,
) -> f64 {
    let factor = phosphorus_factor(strategy, current_p, interpretation.texture_class, factors);
    deficit(interpretation.critical_level, current_p) * factor
}

pub fn secondary_need(current: f64, target: &SecondaryTarget) -> f64 {
    deficit(target.floor, current) * target.scale
}

/// Needs for all eleven nutrients.
pub fn compute_needs(
    sample: &SoilSample,
    phosphorus: &PhosphorusInterpretation,
    targets: &EffectiveTargets<'_>,
    base_strategy: BaseNeedStrategy,
    phosphorus_strategy: PhosphorusFactorStrategy,
) -> Result<NutrientNeeds, FertilError> {
    let mut needs = NutrientNeeds::default();

    for n in Nutrient::BASES {
        let need = base_need(n, sample, base_strategy, targets).ok_or_else(|| {
            FertilError::ReferenceInvalid(format!("no {base_strategy} target for {n}"))
        })?;
        needs.set(n, need);
    }

    needs.p = phosphorus_need(
        sample.p,
        phosphorus,
        phosphorus_strategy,
        &targets.tables().phosphorus_factors,
    );

    for n in Nutrient::SECONDARY {
        needs.set(n, secondary_need(sample.value(n), &targets.secondary(n)?));
    }

    Ok(needs)
}

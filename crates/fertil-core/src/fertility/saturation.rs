use crate::error::FertilError;
use crate::model::{Nutrient, SoilSample};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Share of CEC held by each base, in percent.
///
/// Values are not clamped. A total above 100 means the sample's bases exceed
/// its reported T, which callers should treat as a data-quality signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaturationResult {
    pub ca: f64,
    pub mg: f64,
    pub k: f64,
}

impl SaturationResult {
    pub fn get(&self, nutrient: Nutrient) -> Option<f64> {
        match nutrient {
            Nutrient::Ca => Some(self.ca),
            Nutrient::Mg => Some(self.mg),
            Nutrient::K => Some(self.k),
            _ => None,
        }
    }

    /// Sum of Ca, Mg and K saturation.
    pub fn total(&self) -> f64 {
        self.ca + self.mg + self.k
    }
}

/// Ca:Mg ratio, or `Undefined` when the sample has no Mg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CaMgRatio {
    Defined(f64),
    Undefined,
}

impl CaMgRatio {
    pub fn value(&self) -> Result<f64, FertilError> {
        match self {
            CaMgRatio::Defined(v) => Ok(*v),
            CaMgRatio::Undefined => Err(FertilError::UndefinedRatio),
        }
    }

    /// Numeric form for display and export: 0.0 when undefined.
    pub fn sentinel(&self) -> f64 {
        match self {
            CaMgRatio::Defined(v) => *v,
            CaMgRatio::Undefined => 0.0,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, CaMgRatio::Defined(_))
    }
}

impl fmt::Display for CaMgRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaMgRatio::Defined(v) => write!(f, "{v:.2}"),
            CaMgRatio::Undefined => write!(f, "undefined"),
        }
    }
}

/// Base saturation of Ca, Mg and K relative to T.
pub fn compute_saturation(sample: &SoilSample) -> Result<SaturationResult, FertilError> {
    sample.validate()?;

    let pct = |cmolc: f64| cmolc * 100.0 / sample.cec;
    Ok(SaturationResult {
        ca: pct(sample.ca),
        mg: pct(sample.mg),
        k: pct(sample.k_cmolc()),
    })
}

pub fn ca_mg_ratio(sample: &SoilSample) -> CaMgRatio {
    if sample.mg > 0.0 {
        CaMgRatio::Defined(sample.ca / sample.mg)
    } else {
        CaMgRatio::Undefined
    }
}

use crate::error::FertilError;
use crate::units;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The eleven nutrients tracked by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Nutrient {
    Ca,
    Mg,
    K,
    P,
    S,
    B,
    Cu,
    Fe,
    Mn,
    Zn,
    Mo,
}

impl Nutrient {
    pub const ALL: [Nutrient; 11] = [
        Nutrient::Ca,
        Nutrient::Mg,
        Nutrient::K,
        Nutrient::P,
        Nutrient::S,
        Nutrient::B,
        Nutrient::Cu,
        Nutrient::Fe,
        Nutrient::Mn,
        Nutrient::Zn,
        Nutrient::Mo,
    ];

    /// Exchangeable bases, assessed by CEC saturation.
    pub const BASES: [Nutrient; 3] = [Nutrient::Ca, Nutrient::Mg, Nutrient::K];

    /// Nutrients assessed against a floor (and possibly a ceiling) on the raw value.
    pub const SECONDARY: [Nutrient; 7] = [
        Nutrient::S,
        Nutrient::B,
        Nutrient::Cu,
        Nutrient::Fe,
        Nutrient::Mn,
        Nutrient::Zn,
        Nutrient::Mo,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Nutrient::Ca => "Ca",
            Nutrient::Mg => "Mg",
            Nutrient::K => "K",
            Nutrient::P => "P",
            Nutrient::S => "S",
            Nutrient::B => "B",
            Nutrient::Cu => "Cu",
            Nutrient::Fe => "Fe",
            Nutrient::Mn => "Mn",
            Nutrient::Zn => "Zn",
            Nutrient::Mo => "Mo",
        }
    }

    /// Portuguese name as printed on lab reports.
    pub fn label(&self) -> &'static str {
        match self {
            Nutrient::Ca => "Cálcio",
            Nutrient::Mg => "Magnésio",
            Nutrient::K => "Potássio",
            Nutrient::P => "Fósforo",
            Nutrient::S => "Enxofre",
            Nutrient::B => "Boro",
            Nutrient::Cu => "Cobre",
            Nutrient::Fe => "Ferro",
            Nutrient::Mn => "Manganês",
            Nutrient::Zn => "Zinco",
            Nutrient::Mo => "Molibdênio",
        }
    }

    /// Parse a chemical symbol, ignoring case ("ca", "CA", "Ca").
    pub fn from_symbol(s: &str) -> Option<Nutrient> {
        let s = s.trim();
        Nutrient::ALL
            .into_iter()
            .find(|n| n.symbol().eq_ignore_ascii_case(s))
    }

    pub fn is_base(&self) -> bool {
        Nutrient::BASES.contains(self)
    }

    pub fn is_secondary(&self) -> bool {
        Nutrient::SECONDARY.contains(self)
    }

    /// Unit in which the need calculator reports this nutrient's deficit.
    pub fn need_unit(&self) -> &'static str {
        if self.is_base() {
            "cmolc/dm³"
        } else {
            "kg/ha"
        }
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Nutrient {
    type Err = FertilError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Nutrient::from_symbol(s).ok_or_else(|| FertilError::UnknownNutrient(s.to_string()))
    }
}

/// Unit in which the caller supplies exchangeable potassium.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PotassiumUnit {
    #[serde(rename = "mg/dm3")]
    #[default]
    MgPerDm3,
    #[serde(rename = "cmolc/dm3")]
    CmolcPerDm3,
}

impl fmt::Display for PotassiumUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PotassiumUnit::MgPerDm3 => write!(f, "mg/dm³"),
            PotassiumUnit::CmolcPerDm3 => write!(f, "cmolc/dm³"),
        }
    }
}

impl PotassiumUnit {
    pub fn from_str_loose(s: &str) -> Option<PotassiumUnit> {
        let lower = s.trim().to_lowercase();
        if lower.starts_with("cmol") {
            Some(PotassiumUnit::CmolcPerDm3)
        } else if lower.starts_with("mg") {
            Some(PotassiumUnit::MgPerDm3)
        } else {
            None
        }
    }
}

/// Identity of a sample. Owned by the caller; the engine only echoes it back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleMetadata {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    /// Laboratory that issued the report, when known.
    #[serde(default)]
    pub lab: Option<String>,
}

/// Chemical analysis of one soil sample.
///
/// Ca, Mg and CEC are in cmolc/dm³; K is in the unit given by `k_unit`;
/// P, S and micronutrients are in mg/dm³.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilSample {
    #[serde(default)]
    pub metadata: SampleMetadata,
    #[serde(alias = "T")]
    pub cec: f64,
    #[serde(alias = "Ca")]
    pub ca: f64,
    #[serde(alias = "Mg")]
    pub mg: f64,
    #[serde(alias = "K")]
    pub k: f64,
    #[serde(default, alias = "kUnit")]
    pub k_unit: PotassiumUnit,
    #[serde(alias = "P")]
    pub p: f64,
    #[serde(alias = "S")]
    pub s: f64,
    #[serde(alias = "B")]
    pub b: f64,
    #[serde(alias = "Cu")]
    pub cu: f64,
    #[serde(alias = "Fe")]
    pub fe: f64,
    #[serde(alias = "Mn")]
    pub mn: f64,
    #[serde(alias = "Zn")]
    pub zn: f64,
    #[serde(alias = "Mo")]
    pub mo: f64,
    #[serde(default, alias = "organicMatter")]
    pub organic_matter: f64,
    #[serde(alias = "clayPercent")]
    pub clay_percent: f64,
}

impl SoilSample {
    /// The value as reported, in the nutrient's report unit.
    pub fn value(&self, nutrient: Nutrient) -> f64 {
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

    /// Exchangeable potassium in cmolc/dm³, whatever unit it was supplied in.
    pub fn k_cmolc(&self) -> f64 {
        match self.k_unit {
            PotassiumUnit::MgPerDm3 => units::k_mg_to_cmolc(self.k),
            PotassiumUnit::CmolcPerDm3 => self.k,
        }
    }

    /// Base content in cmolc/dm³. `None` for non-base nutrients.
    pub fn base_cmolc(&self, nutrient: Nutrient) -> Option<f64> {
        match nutrient {
            Nutrient::Ca => Some(self.ca),
            Nutrient::Mg => Some(self.mg),
            Nutrient::K => Some(self.k_cmolc()),
            _ => None,
        }
    }

    /// Unit label for the value returned by [`SoilSample::value`].
    pub fn report_unit(&self, nutrient: Nutrient) -> String {
        match nutrient {
            Nutrient::Ca | Nutrient::Mg => "cmolc/dm³".to_string(),
            Nutrient::K => self.k_unit.to_string(),
            _ => "mg/dm³".to_string(),
        }
    }

    /// Check the sample invariants. A sample either fully validates or is rejected.
    pub fn validate(&self) -> Result<(), FertilError> {
        if !self.cec.is_finite() || self.cec <= 0.0 {
            return Err(FertilError::invalid_sample(
                "T",
                format!("must be a positive CEC, got {}", self.cec),
            ));
        }

        let mut fields: Vec<(&str, f64)> = Nutrient::ALL
            .iter()
            .map(|n| (n.symbol(), self.value(*n)))
            .collect();
        fields.push(("organicMatter", self.organic_matter));

        for (field, value) in fields {
            if !value.is_finite() {
                return Err(FertilError::invalid_sample(field, "is not a finite number"));
            }
            if value < 0.0 {
                return Err(FertilError::invalid_sample(
                    field,
                    format!("must not be negative, got {value}"),
                ));
            }
        }

        if !self.clay_percent.is_finite() || !(0.0..=100.0).contains(&self.clay_percent) {
            return Err(FertilError::invalid_sample(
                "clayPercent",
                format!("must lie in [0, 100], got {}", self.clay_percent),
            ));
        }

        Ok(())
    }
}

/// A value as printed on a lab report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ReportValue {
    Measured(f64),
    BelowDetection(f64),
}

impl ReportValue {
    /// Value fed to the engine. Below-detection results count as zero.
    pub fn numeric(&self) -> f64 {
        match self {
            ReportValue::Measured(v) => *v,
            ReportValue::BelowDetection(_) => 0.0,
        }
    }

    pub fn is_below_detection(&self) -> bool {
        matches!(self, ReportValue::BelowDetection(_))
    }
}

impl fmt::Display for ReportValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportValue::Measured(v) => write!(f, "{v}"),
            ReportValue::BelowDetection(v) => write!(f, "< {v}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub raw_name: String,
    pub normalized_name: String,
    pub value: ReportValue,
    #[serde(default)]
    pub unit: Option<String>,
}

/// One sample's section of a lab report, before mapping to a [`SoilSample`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabReport {
    pub metadata: SampleMetadata,
    pub rows: Vec<ReportRow>,
}

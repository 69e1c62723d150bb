use crate::error::FertilError;
use crate::reference::schema::TextureBreakpoints;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Clay-content bucket used to pick phosphorus thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureClass {
    /// Class 1, sandy.
    Sandy,
    /// Class 2, medium texture.
    Medium,
    /// Class 3, clayey.
    Clayey,
    /// Class 4, very clayey.
    VeryClayey,
}

impl TextureClass {
    pub const ALL: [TextureClass; 4] = [
        TextureClass::Sandy,
        TextureClass::Medium,
        TextureClass::Clayey,
        TextureClass::VeryClayey,
    ];

    /// Class number, 1 (sandy) to 4 (very clayey).
    pub fn number(&self) -> u8 {
        self.index() as u8 + 1
    }

    /// Zero-based row index into per-class tables.
    pub fn index(&self) -> usize {
        match self {
            TextureClass::Sandy => 0,
            TextureClass::Medium => 1,
            TextureClass::Clayey => 2,
            TextureClass::VeryClayey => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TextureClass::Sandy => "Arenosa",
            TextureClass::Medium => "Média",
            TextureClass::Clayey => "Argilosa",
            TextureClass::VeryClayey => "Muito argilosa",
        }
    }

    /// Classify a clay percentage. Clay outside [0, 100] is rejected.
    pub fn from_clay(clay_percent: f64, breakpoints: &TextureBreakpoints) -> Result<Self, FertilError> {
        if !clay_percent.is_finite() || !(0.0..=100.0).contains(&clay_percent) {
            return Err(FertilError::invalid_sample(
                "clayPercent",
                format!("must lie in [0, 100], got {clay_percent}"),
            ));
        }

        let class = breakpoints
            .class_upper_clay
            .iter()
            .position(|&upper| clay_percent <= upper)
            .map(|i| TextureClass::ALL[i])
            .unwrap_or(TextureClass::VeryClayey);
        Ok(class)
    }
}

impl fmt::Display for TextureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number(), self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breakpoints() -> TextureBreakpoints {
        TextureBreakpoints {
            class_upper_clay: [15.0, 35.0, 60.0],
        }
    }

    fn class_of(clay: f64) -> u8 {
        TextureClass::from_clay(clay, &breakpoints()).unwrap().number()
    }

    #[test]
    fn test_class_boundaries() {
        assert_eq!(class_of(0.0), 1);
        assert_eq!(class_of(10.0), 1);
        assert_eq!(class_of(15.0), 1);
        assert_eq!(class_of(16.0), 2);
        assert_eq!(class_of(35.0), 2);
        assert_eq!(class_of(36.0), 3);
        assert_eq!(class_of(60.0), 3);
        assert_eq!(class_of(61.0), 4);
        assert_eq!(class_of(100.0), 4);
    }

    #[test]
    fn test_fractional_clay_between_integer_bounds() {
        assert_eq!(class_of(15.5), 2);
        assert_eq!(class_of(60.2), 4);
    }

    #[test]
    fn test_out_of_range_clay_rejected() {
        assert!(TextureClass::from_clay(-1.0, &breakpoints()).is_err());
        assert!(TextureClass::from_clay(101.0, &breakpoints()).is_err());
        assert!(TextureClass::from_clay(f64::NAN, &breakpoints()).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(TextureClass::Clayey.to_string(), "3 (Argilosa)");
    }
}

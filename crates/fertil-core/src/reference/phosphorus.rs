use crate::reference::schema::{PhosphorusBreakpoints, ReferenceTables};
use crate::reference::texture::TextureClass;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Interpretation level for available P, from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhosphorusLevel {
    MuitoBaixo,
    Baixo,
    Medio,
    Alto,
    MuitoAlto,
}

impl PhosphorusLevel {
    /// "Alto" and "Muito Alto" need no correction.
    pub fn is_adequate(&self) -> bool {
        matches!(self, PhosphorusLevel::Alto | PhosphorusLevel::MuitoAlto)
    }

    /// Place a P value against one class's breakpoints (upper bounds inclusive).
    pub fn from_breakpoints(p: f64, breakpoints: &PhosphorusBreakpoints) -> Self {
        const LEVELS: [PhosphorusLevel; 4] = [
            PhosphorusLevel::MuitoBaixo,
            PhosphorusLevel::Baixo,
            PhosphorusLevel::Medio,
            PhosphorusLevel::Alto,
        ];
        breakpoints
            .as_array()
            .iter()
            .position(|&upper| p <= upper)
            .map(|i| LEVELS[i])
            .unwrap_or(PhosphorusLevel::MuitoAlto)
    }
}

impl fmt::Display for PhosphorusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PhosphorusLevel::MuitoBaixo => "Muito Baixo",
            PhosphorusLevel::Baixo => "Baixo",
            PhosphorusLevel::Medio => "Médio",
            PhosphorusLevel::Alto => "Alto",
            PhosphorusLevel::MuitoAlto => "Muito Alto",
        };
        write!(f, "{s}")
    }
}

/// Texture-aware reading of a P value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhosphorusInterpretation {
    pub texture_class: TextureClass,
    pub level: PhosphorusLevel,
    /// P (mg/dm³) above which this texture class reads "Alto".
    pub critical_level: f64,
}

pub fn interpret_phosphorus(
    tables: &ReferenceTables,
    texture_class: TextureClass,
    p: f64,
) -> PhosphorusInterpretation {
    let row = &tables.phosphorus_interpretation[texture_class.index()];
    PhosphorusInterpretation {
        texture_class,
        level: PhosphorusLevel::from_breakpoints(p, row),
        critical_level: row.critical_level(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::builtin::default_tables;

    #[test]
    fn test_class_1_low_p_is_muito_baixo() {
        let t = default_tables();
        let i = interpret_phosphorus(&t, TextureClass::Sandy, 4.0);
        assert_eq!(i.level, PhosphorusLevel::MuitoBaixo);
        assert_eq!(i.level.to_string(), "Muito Baixo");
    }

    #[test]
    fn test_breakpoints_are_inclusive_upper_bounds() {
        let t = default_tables();
        let level = |p| interpret_phosphorus(&t, TextureClass::Sandy, p).level;
        assert_eq!(level(6.0), PhosphorusLevel::MuitoBaixo);
        assert_eq!(level(6.1), PhosphorusLevel::Baixo);
        assert_eq!(level(20.0), PhosphorusLevel::Medio);
        assert_eq!(level(20.5), PhosphorusLevel::Alto);
        assert_eq!(level(30.0), PhosphorusLevel::Alto);
        assert_eq!(level(30.1), PhosphorusLevel::MuitoAlto);
    }

    #[test]
    fn test_adequacy_starts_at_alto() {
        assert!(!PhosphorusLevel::Medio.is_adequate());
        assert!(PhosphorusLevel::Alto.is_adequate());
        assert!(PhosphorusLevel::MuitoAlto.is_adequate());
    }

    #[test]
    fn test_finer_texture_never_reads_more_favourable() {
        let t = default_tables();
        for p in [0.0, 5.0, 7.0, 11.0, 19.0, 26.0, 33.0, 42.0, 48.0, 60.0] {
            let levels: Vec<PhosphorusLevel> = TextureClass::ALL
                .iter()
                .map(|c| interpret_phosphorus(&t, *c, p).level)
                .collect();
            assert!(
                levels.windows(2).all(|w| w[1] <= w[0]),
                "P={p}: {levels:?}"
            );
        }
    }

    #[test]
    fn test_critical_level_per_class() {
        let t = default_tables();
        let critical: Vec<f64> = TextureClass::ALL
            .iter()
            .map(|c| interpret_phosphorus(&t, *c, 0.0).critical_level)
            .collect();
        assert_eq!(critical, vec![20.0, 25.0, 30.0, 36.0]);
    }
}

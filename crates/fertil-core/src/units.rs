//! Constant-factor unit conversions.
//!
//! The oxide factors assume the 0–20 cm layer at a bulk density of
//! 1.2 g/cm³ (2 400 t of soil per hectare). They are fixed constants and are
//! never recomputed at runtime.

use crate::model::Nutrient;

/// mg/dm³ of Ca → cmolc/dm³ (valence 2, 40.08 g/mol).
pub const CA_MG_TO_CMOLC: f64 = 0.005;
/// mg/dm³ of Mg → cmolc/dm³ (valence 2, 24.31 g/mol).
pub const MG_MG_TO_CMOLC: f64 = 1.0 / 120.0;
/// mg/dm³ of K → cmolc/dm³ (valence 1, 39.10 g/mol).
pub const K_MG_TO_CMOLC: f64 = 1.0 / 390.0;

/// cmolc/dm³ of Ca → kg/ha of CaO.
pub const CA_CMOLC_TO_CAO_KG_HA: f64 = 560.0;
/// cmolc/dm³ of Mg → kg/ha of MgO.
pub const MG_CMOLC_TO_MGO_KG_HA: f64 = 400.0;
/// cmolc/dm³ of K → kg/ha of K₂O.
pub const K_CMOLC_TO_K2O_KG_HA: f64 = 950.0;

/// P → P₂O₅ mass ratio (142/62).
pub const P_TO_P2O5: f64 = 2.29;
/// Ca → CaO mass ratio (56.08/40.08).
pub const CA_TO_CAO: f64 = 1.399;
/// Mg → MgO mass ratio (40.30/24.31).
pub const MG_TO_MGO: f64 = 1.658;
/// K → K₂O mass ratio (94.20/78.20).
pub const K_TO_K2O: f64 = 1.205;

/// Generic mg/dm³ → cmolc/dm³ for a cation of the given atomic weight and valence.
pub fn mg_to_cmolc(value: f64, atomic_weight: f64, valence: f64) -> f64 {
    value * (valence / atomic_weight) * 0.1
}

pub fn ca_mg_to_cmolc(value: f64) -> f64 {
    value * CA_MG_TO_CMOLC
}

pub fn mg_mg_to_cmolc(value: f64) -> f64 {
    value * MG_MG_TO_CMOLC
}

pub fn k_mg_to_cmolc(value: f64) -> f64 {
    value * K_MG_TO_CMOLC
}

pub fn k_cmolc_to_mg(value: f64) -> f64 {
    value / K_MG_TO_CMOLC
}

/// cmolc/dm³ of a base → kg/ha of its oxide. `None` for non-base nutrients.
pub fn cmolc_to_oxide_kg_ha(nutrient: Nutrient, cmolc: f64) -> Option<f64> {
    let factor = match nutrient {
        Nutrient::Ca => CA_CMOLC_TO_CAO_KG_HA,
        Nutrient::Mg => MG_CMOLC_TO_MGO_KG_HA,
        Nutrient::K => K_CMOLC_TO_K2O_KG_HA,
        _ => return None,
    };
    Some(cmolc * factor)
}

/// Elemental → oxide mass ratio for nutrients dosed in oxide form.
/// `None` for nutrients that are dosed as the element.
pub fn elemental_to_oxide_ratio(nutrient: Nutrient) -> Option<f64> {
    match nutrient {
        Nutrient::Ca => Some(CA_TO_CAO),
        Nutrient::Mg => Some(MG_TO_MGO),
        Nutrient::K => Some(K_TO_K2O),
        Nutrient::P => Some(P_TO_P2O5),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_per_ion_factors_match_generic_formula() {
        // Named factors are rounded; the generic formula is the derivation.
        assert_abs_diff_eq!(mg_to_cmolc(1.0, 40.08, 2.0), CA_MG_TO_CMOLC, epsilon = 1e-4);
        assert_abs_diff_eq!(mg_to_cmolc(1.0, 24.31, 2.0), MG_MG_TO_CMOLC, epsilon = 2e-4);
        assert_abs_diff_eq!(mg_to_cmolc(1.0, 39.10, 1.0), K_MG_TO_CMOLC, epsilon = 1e-5);
    }

    #[test]
    fn test_k_195_mg_is_half_cmolc() {
        assert_relative_eq!(k_mg_to_cmolc(195.0), 0.5, max_relative = 1e-12);
    }

    #[test]
    fn test_k_round_trip() {
        for v in [0.0, 1.0, 39.0, 195.0, 312.7, 1000.0] {
            assert_relative_eq!(k_cmolc_to_mg(k_mg_to_cmolc(v)), v, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_ca_and_mg_factors() {
        assert_relative_eq!(ca_mg_to_cmolc(200.0), 1.0, max_relative = 1e-12);
        assert_relative_eq!(mg_mg_to_cmolc(120.0), 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_oxide_factors() {
        assert_eq!(cmolc_to_oxide_kg_ha(Nutrient::Ca, 4.0), Some(2240.0));
        assert_eq!(cmolc_to_oxide_kg_ha(Nutrient::Mg, 1.0), Some(400.0));
        assert_eq!(cmolc_to_oxide_kg_ha(Nutrient::K, 1.0), Some(950.0));
        assert_eq!(cmolc_to_oxide_kg_ha(Nutrient::Zn, 1.0), None);
    }

    #[test]
    fn test_negative_values_pass_through() {
        assert_relative_eq!(k_mg_to_cmolc(-39.0), -0.1, max_relative = 1e-12);
    }

    #[test]
    fn test_micronutrients_have_no_oxide_ratio() {
        assert!(elemental_to_oxide_ratio(Nutrient::Zn).is_none());
        assert_eq!(elemental_to_oxide_ratio(Nutrient::P), Some(P_TO_P2O5));
    }
}

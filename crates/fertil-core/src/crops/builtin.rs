use crate::crops::schema::CropProfile;
use crate::crops::validate_crop_profile;
use crate::error::FertilError;

const SOJA_JSON: &str = include_str!("../../../../crops/soja.json");
const MILHO_JSON: &str = include_str!("../../../../crops/milho.json");
const CAFE_JSON: &str = include_str!("../../../../crops/cafe.json");
const PASTAGEM_JSON: &str = include_str!("../../../../crops/pastagem.json");

/// Available predefined crop profiles.
pub const PRESETS: &[&str] = &["soja", "milho", "cafe", "pastagem"];

/// Load a predefined crop profile by name.
pub fn load_preset(name: &str) -> Result<CropProfile, FertilError> {
    let json = match name.trim().to_lowercase().as_str() {
        "soja" => SOJA_JSON,
        "milho" => MILHO_JSON,
        "cafe" | "café" => CAFE_JSON,
        "pastagem" => PASTAGEM_JSON,
        _ => {
            return Err(FertilError::UnknownCrop {
                name: name.to_string(),
                available: PRESETS.join(", "),
            })
        }
    };
    let profile: CropProfile = serde_json::from_str(json)?;
    validate_crop_profile(&profile)?;
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Nutrient;

    #[test]
    fn test_all_presets_load() {
        for name in PRESETS {
            let profile = load_preset(name).unwrap();
            assert!(!profile.name.is_empty());
        }
    }

    #[test]
    fn test_soja_overrides() {
        let soja = load_preset("soja").unwrap();
        let targets = soja.saturation_targets.unwrap();
        assert_eq!(targets.ca, 0.50);
        assert_eq!(soja.secondary_floors.get(&Nutrient::Mo), Some(&0.12));
    }

    #[test]
    fn test_preset_name_is_case_insensitive() {
        assert_eq!(load_preset("Milho").unwrap().name, "Milho");
        assert_eq!(load_preset("café").unwrap().name, "Café");
    }

    #[test]
    fn test_unknown_preset() {
        assert!(matches!(
            load_preset("trigo"),
            Err(FertilError::UnknownCrop { .. })
        ));
    }
}

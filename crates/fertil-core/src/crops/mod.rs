pub mod builtin;
pub mod schema;

use crate::error::FertilError;
use crate::model::Nutrient;
use schema::CropProfile;
use std::path::Path;

/// Load a crop profile from a JSON file.
pub fn load_crop_profile(path: &Path) -> Result<CropProfile, FertilError> {
    let content = std::fs::read_to_string(path).map_err(|e| FertilError::CropLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_crop_profile(&content, path)
}

/// Parse a crop profile from a JSON string.
pub fn parse_crop_profile(json: &str, source: &Path) -> Result<CropProfile, FertilError> {
    let profile: CropProfile = serde_json::from_str(json).map_err(|e| FertilError::CropLoad {
        path: source.to_path_buf(),
        reason: e.to_string(),
    })?;
    validate_crop_profile(&profile)?;
    Ok(profile)
}

/// Parse a crop profile from a JSON string (no file path context).
pub fn parse_crop_profile_str(json: &str) -> Result<CropProfile, FertilError> {
    let profile: CropProfile = serde_json::from_str(json).map_err(FertilError::Json)?;
    validate_crop_profile(&profile)?;
    Ok(profile)
}

/// Validate that a crop profile is well-formed.
pub fn validate_crop_profile(profile: &CropProfile) -> Result<(), FertilError> {
    if profile.name.trim().is_empty() {
        return Err(FertilError::CropInvalid("name must not be empty".into()));
    }

    if let Some(targets) = profile.saturation_targets {
        for n in Nutrient::BASES {
            let fraction = targets.get(n).unwrap_or_default();
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(FertilError::CropInvalid(format!(
                    "'{}': saturation target for {n} must lie in (0, 1], got {fraction}",
                    profile.name
                )));
            }
        }
        if targets.ca + targets.mg + targets.k > 1.0 {
            return Err(FertilError::CropInvalid(format!(
                "'{}': saturation targets must not sum above 1",
                profile.name
            )));
        }
    }

    if let Some(thresholds) = profile.fixed_thresholds {
        for n in Nutrient::BASES {
            let threshold = thresholds.get(n).unwrap_or_default();
            if threshold <= 0.0 {
                return Err(FertilError::CropInvalid(format!(
                    "'{}': fixed threshold for {n} must be positive",
                    profile.name
                )));
            }
        }
    }

    for (nutrient, floor) in &profile.secondary_floors {
        if !nutrient.is_secondary() {
            return Err(FertilError::CropInvalid(format!(
                "'{}': {nutrient} is not a secondary nutrient (expected S, B, Cu, Fe, Mn, Zn or Mo)",
                profile.name
            )));
        }
        if !floor.is_finite() || *floor < 0.0 {
            return Err(FertilError::CropInvalid(format!(
                "'{}': floor for {nutrient} must be non-negative",
                profile.name
            )));
        }
    }

    Ok(())
}

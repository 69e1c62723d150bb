use crate::crops::schema::CropProfile;
use crate::error::FertilError;
use crate::model::Nutrient;
use crate::reference::schema::{ReferenceTables, SecondaryTarget};

/// Reference targets with a crop profile's overrides laid on top.
///
/// Both the adequacy classifier and the need calculator read floors through
/// this view, so a crop floor moves the two together.
#[derive(Debug, Clone, Copy)]
pub struct EffectiveTargets<'a> {
    tables: &'a ReferenceTables,
    crop: Option<&'a CropProfile>,
}

impl<'a> EffectiveTargets<'a> {
    pub fn new(tables: &'a ReferenceTables, crop: Option<&'a CropProfile>) -> Self {
        Self { tables, crop }
    }

    pub fn tables(&self) -> &'a ReferenceTables {
        self.tables
    }

    pub fn crop_name(&self) -> Option<&'a str> {
        self.crop.map(|c| c.name.as_str())
    }

    /// Target share of T for a base. `None` for non-base nutrients.
    pub fn cec_fraction(&self, nutrient: Nutrient) -> Option<f64> {
        self.crop
            .and_then(|c| c.saturation_targets)
            .unwrap_or(self.tables.base_targets.cec_fraction)
            .get(nutrient)
    }

    /// Fixed target content for a base, cmolc/dm³.
    pub fn fixed_threshold(&self, nutrient: Nutrient) -> Option<f64> {
        self.crop
            .and_then(|c| c.fixed_thresholds)
            .unwrap_or(self.tables.base_targets.fixed_threshold)
            .get(nutrient)
    }

    /// Secondary target with the crop floor applied. A crop floor must stay
    /// below the table ceiling, or no value could ever be adequate.
    pub fn secondary(&self, nutrient: Nutrient) -> Result<SecondaryTarget, FertilError> {
        let mut target = *self.tables.secondary_target(nutrient)?;
        if let Some(crop) = self.crop {
            if let Some(&floor) = crop.secondary_floors.get(&nutrient) {
                if let Some(ceiling) = target.ceiling.filter(|c| floor >= *c) {
                    return Err(FertilError::CropInvalid(format!(
                        "'{}': {nutrient} floor {floor} is not below the ceiling {ceiling} of '{}'",
                        crop.name, self.tables.name
                    )));
                }
                target.floor = floor;
            }
        }
        Ok(target)
    }
}

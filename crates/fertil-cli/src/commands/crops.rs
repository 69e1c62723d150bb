use fertil_core::crops::builtin;
use fertil_core::crops::schema::CropProfile;
use fertil_core::error::FertilError;
use fertil_core::model::Nutrient;
use fertil_core::ReferenceTables;
use std::path::Path;

pub fn list() -> Result<(), FertilError> {
    println!("Available crop profiles:\n");
    for name in builtin::PRESETS {
        let profile = builtin::load_preset(name)?;
        println!("  {:<10} {} (v{})", name, profile.name, profile.version);
        if let Some(ref desc) = profile.description {
            println!("             {}", desc);
        }
        println!();
    }
    Ok(())
}

pub fn explain(preset: &str) -> Result<(), FertilError> {
    let profile = builtin::load_preset(preset)?;
    let tables = ReferenceTables::builtin();

    println!("{} (version {})\n", profile.name, profile.version);
    if let Some(ref desc) = profile.description {
        println!("{}\n", desc);
    }

    println!("Targets for Ca, Mg and K (crop value, built-in default in brackets):\n");
    println!("  {:<4}  {:<20}  {:<20}", "", "Fraction of T", "Fixed threshold");
    println!("  {}", "-".repeat(48));
    for n in Nutrient::BASES {
        let fraction = describe(
            profile.saturation_targets.as_ref().and_then(|v| v.get(n)),
            tables.base_targets.cec_fraction.get(n),
        );
        let fixed = describe(
            profile.fixed_thresholds.as_ref().and_then(|v| v.get(n)),
            tables.base_targets.fixed_threshold.get(n),
        );
        println!("  {:<4}  {:<20}  {:<20}", n.symbol(), fraction, fixed);
    }
    println!();

    println!("Floors for S and micronutrients (mg/dm³):\n");
    for n in Nutrient::SECONDARY {
        let default = tables.secondary_targets.get(&n).map(|t| t.floor);
        let floor = describe(profile.secondary_floors.get(&n).copied(), default);
        println!("  {:<4}  {}", n.symbol(), floor);
    }
    println!();

    if let Some(ref note) = profile.note {
        println!("Note: {}\n", note);
    }

    Ok(())
}

fn describe(crop: Option<f64>, default: Option<f64>) -> String {
    match (crop, default) {
        (Some(c), Some(d)) if c != d => format!("{c} [{d}]"),
        (Some(c), _) => c.to_string(),
        (None, Some(d)) => format!("[{d}]"),
        (None, None) => "-".to_string(),
    }
}

pub fn validate(file: &Path) -> Result<(), FertilError> {
    let profile = fertil_core::crops::load_crop_profile(file)?;

    println!("Crop profile '{}' (v{}) is valid.", profile.name, profile.version);
    println!(
        "  Overrides: {} base target set(s), {} floor(s)",
        profile.saturation_targets.is_some() as usize + profile.fixed_thresholds.is_some() as usize,
        profile.secondary_floors.len()
    );

    let warnings = check_against_tables(&profile, &ReferenceTables::builtin());
    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {}", w);
        }
    }

    Ok(())
}

/// Overrides that are valid on their own but disagree with the built-in
/// bands, so the classifier and the need calculator will pull apart.
fn check_against_tables(profile: &CropProfile, tables: &ReferenceTables) -> Vec<String> {
    let mut warnings = Vec::new();

    if let Some(ref targets) = profile.saturation_targets {
        for n in Nutrient::BASES {
            let (Some(fraction), Some(band)) = (targets.get(n), tables.saturation_bands.for_base(n))
            else {
                continue;
            };
            let pct = fraction * 100.0;
            if !band.contains(pct) {
                warnings.push(format!(
                    "{n} target {pct:.1}% of T is outside the adequacy band [{}, {}]",
                    band.min, band.max
                ));
            }
        }
    }

    for (n, floor) in &profile.secondary_floors {
        if let Some(ceiling) = tables.secondary_targets.get(n).and_then(|t| t.ceiling) {
            if *floor >= ceiling {
                warnings.push(format!(
                    "{n} floor {floor} is not below the ceiling {ceiling}; analyses with this crop will fail"
                ));
            }
        }
    }

    warnings
}

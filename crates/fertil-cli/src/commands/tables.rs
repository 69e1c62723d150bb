use fertil_core::error::FertilError;
use fertil_core::model::Nutrient;
use fertil_core::reference::texture::TextureClass;
use fertil_core::ReferenceTables;
use std::path::Path;

use crate::output;

pub fn show(output_format: &str) -> Result<(), FertilError> {
    let tables = ReferenceTables::builtin();
    match output_format {
        "json" => output::json::print(&tables)?,
        _ => print_tables(&tables),
    }
    Ok(())
}

fn print_tables(t: &ReferenceTables) {
    println!("{} (version {})\n", t.name, t.version);
    if let Some(ref desc) = t.description {
        println!("{}\n", desc);
    }

    println!("Texture classes (clay %, upper bound inclusive):");
    let clay = t.texture.class_upper_clay;
    println!("  1 Arenosa          <= {}", clay[0]);
    println!("  2 Média            <= {}", clay[1]);
    println!("  3 Argilosa         <= {}", clay[2]);
    println!("  4 Muito argilosa   >  {}\n", clay[2]);

    println!("Phosphorus interpretation (mg/dm³, upper bound of each level):\n");
    println!(
        "  {:<18}  {:>11}  {:>6}  {:>6}  {:>6}",
        "Texture", "Muito Baixo", "Baixo", "Médio", "Alto"
    );
    for class in TextureClass::ALL {
        let row = &t.phosphorus_interpretation[class.index()];
        println!(
            "  {:<18}  {:>11}  {:>6}  {:>6}  {:>6}",
            class.to_string(),
            row.muito_baixo,
            row.baixo,
            row.medio,
            row.alto
        );
    }
    println!();

    let bands = &t.saturation_bands;
    println!("Adequate saturation (% of T):");
    println!("  Ca     {} - {}", bands.ca.min, bands.ca.max);
    println!("  Mg     {} - {}", bands.mg.min, bands.mg.max);
    println!("  K      {} - {}", bands.k.min, bands.k.max);
    println!("  Ca:Mg  {} - {}\n", bands.ca_mg_ratio.min, bands.ca_mg_ratio.max);

    println!("Base targets:");
    for n in Nutrient::BASES {
        println!(
            "  {:<4} {} x T  or  {} cmolc/dm³",
            n.symbol(),
            t.base_targets.cec_fraction.get(n).unwrap_or_default(),
            t.base_targets.fixed_threshold.get(n).unwrap_or_default()
        );
    }
    println!();

    println!("Secondary targets (mg/dm³):");
    for (n, target) in &t.secondary_targets {
        let ceiling = target
            .ceiling
            .map(|c| format!(", ceiling {c}"))
            .unwrap_or_default();
        let advisory = if target.advisory { " (advisory)" } else { "" };
        println!(
            "  {:<4} floor {}{}, x{} kg/ha{}",
            n.symbol(),
            target.floor,
            ceiling,
            target.scale,
            advisory
        );
    }
    println!();

    let factors = &t.phosphorus_factors;
    println!("P correction factors:");
    for band in &factors.current_p_bands {
        println!("  P <= {:<6} {}", band.max_p, band.factor);
    }
    println!("  above      {}", factors.above_bands);
    println!("  by texture {:?}\n", factors.by_texture_class);

    println!(
        "Dose constants: CaO {} / MgO {} kg/ha per cmolc, K x{} (or {} K₂O), epsilon {}\n",
        t.dose.ca, t.dose.mg, t.dose.k_shortcut, t.dose.k_oxide, t.dose.epsilon
    );

    println!("Fertilizer catalog:");
    for (n, sources) in &t.catalog {
        for s in sources {
            println!(
                "  {:<4} {:<28} {:>5}% ({:?})",
                n.symbol(),
                s.name,
                s.concentration,
                s.basis
            );
        }
    }
}

pub fn validate(file: &Path) -> Result<(), FertilError> {
    let tables = fertil_core::reference::load_tables(file)?;

    println!("Reference tables '{}' (v{}) are valid.", tables.name, tables.version);
    println!(
        "  Secondary targets: {}, catalog entries: {}",
        tables.secondary_targets.len(),
        tables.catalog.values().map(Vec::len).sum::<usize>()
    );

    let missing: Vec<&str> = Nutrient::ALL
        .iter()
        .filter(|n| tables.sources(**n).is_none())
        .map(|n| n.symbol())
        .collect();
    if !missing.is_empty() {
        println!("\nWarnings:");
        println!(
            "  - no fertilizer sources for {}; --fertilizers will fail",
            missing.join(", ")
        );
    }

    Ok(())
}

use fertil_core::fertility::adequacy::NutrientStatus;
use fertil_core::fertility::dose::DoseResolution;
use fertil_core::parsing::ParsedReports;
use fertil_core::{AnalysisResult, BatchResult, SoilSample};
use std::fmt::Write;

pub fn print(result: &BatchResult, verbose: bool) {
    let multi_sample = result.samples.len() > 1;

    for (i, sample) in result.samples.iter().enumerate() {
        if multi_sample {
            if i > 0 {
                println!();
            }
            println!("--- Sample: {} ---\n", sample.sample_id());
        }
        print_sample(sample, verbose);
    }

    if !result.warnings.is_empty() {
        println!("Input warnings:");
        for w in &result.warnings {
            println!("  - {w}");
        }
    }
}

fn print_sample(r: &AnalysisResult, verbose: bool) {
    let meta = &r.metadata;
    for (label, value) in [
        ("Location", &meta.location),
        ("Date", &meta.date),
        ("Lab", &meta.lab),
    ] {
        if let Some(v) = value {
            println!("  {label}: {v}");
        }
    }
    match &r.crop {
        Some(crop) => println!("  Tables: {} / crop {}\n", r.reference, crop),
        None => println!("  Tables: {}\n", r.reference),
    }

    println!("  Texture: {}", r.texture_class);
    println!(
        "  P: {} (critical level {} mg/dm³)",
        r.phosphorus.level, r.phosphorus.critical_level
    );
    println!(
        "  Saturation: Ca {:.1}%  Mg {:.1}%  K {:.1}%  (sum {:.1}%)",
        r.saturation.ca,
        r.saturation.mg,
        r.saturation.k,
        r.saturation.total()
    );
    let ratio_status = if r.adequacy.ca_mg_ratio {
        "adequate"
    } else {
        "inadequate"
    };
    println!("  Ca:Mg ratio: {} -> {}\n", r.ca_mg_ratio, ratio_status);

    println!(
        "  {:<4}  {:>10}  {:<10}  {:<11}  {:>10}  Need unit",
        "", "Value", "Unit", "Status", "Need"
    );
    println!("  {}", "-".repeat(64));
    for a in &r.assessments {
        let marker = match a.status {
            NutrientStatus::Adequate => "",
            NutrientStatus::Deficient => " *",
            NutrientStatus::Excessive => " !",
        };
        println!(
            "  {:<4}  {:>10.2}  {:<10}  {:<11}  {:>10.2}  {}{}",
            a.nutrient.symbol(),
            a.value,
            a.unit,
            a.status.to_string(),
            r.needs.get(a.nutrient),
            a.nutrient.need_unit(),
            marker
        );
        if verbose {
            println!("        {}", a.reason);
        }
    }
    println!();

    let oxides = &r.oxide_doses;
    if oxides.cao > 0.0 || oxides.mgo > 0.0 || oxides.k2o > 0.0 {
        println!(
            "  Oxide doses: CaO {:.0} kg/ha  MgO {:.0} kg/ha  K₂O {:.0} kg/ha\n",
            oxides.cao, oxides.mgo, oxides.k2o
        );
    }

    if let Some(ref fertilizers) = r.fertilizers {
        let to_correct: Vec<_> = fertilizers
            .iter()
            .filter(|(_, res)| !matches!(res, DoseResolution::NoCorrection))
            .collect();
        if to_correct.is_empty() {
            println!("  No fertilizer correction needed.\n");
        } else {
            println!("  Fertilizer options (any one source per nutrient):");
            for (n, res) in to_correct {
                for rec in res.recommendations() {
                    println!(
                        "    {:<4} {:<28} {:>10.2} {}",
                        n.symbol(),
                        rec.source.name,
                        rec.application_rate,
                        rec.source.unit
                    );
                }
            }
            println!();
        }
    }

    if verbose {
        println!(
            "  Strategies: base need {}, P factor {}, K dose {}",
            r.strategies.base_need, r.strategies.phosphorus_factor, r.strategies.potassium_dose
        );
    }
    for w in &r.warnings {
        println!("  warning: {w}");
    }
}

pub fn format_parsed(parsed: &ParsedReports) -> String {
    let mut out = String::new();
    let multi_sample = parsed.reports.len() > 1;

    for (i, report) in parsed.reports.iter().enumerate() {
        let id = report.metadata.id.as_deref().unwrap_or("unknown");
        if multi_sample && i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "--- Sample: {id} ---");
        if let Some(ref loc) = report.metadata.location {
            let _ = writeln!(out, "  Location: {loc}");
        }
        if let Some(ref date) = report.metadata.date {
            let _ = writeln!(out, "  Date: {date}");
        }
        if let Some(ref lab) = report.metadata.lab {
            let _ = writeln!(out, "  Lab: {lab}");
        }
        out.push('\n');

        let max_name = report
            .rows
            .iter()
            .map(|r| r.raw_name.chars().count())
            .max()
            .unwrap_or(10);
        for row in &report.rows {
            let pad = max_name - row.raw_name.chars().count();
            let _ = writeln!(
                out,
                "  {}{}  {:<18}  {:>10}  {}",
                row.raw_name,
                " ".repeat(pad),
                row.normalized_name,
                row.value.to_string(),
                row.unit.as_deref().unwrap_or("")
            );
        }
    }

    if !parsed.warnings.is_empty() {
        out.push_str("\nWarnings:\n");
        for w in &parsed.warnings {
            let _ = writeln!(out, "  - {w}");
        }
    }
    if !parsed.skipped_lines.is_empty() {
        let _ = writeln!(out, "\n{} line(s) skipped:", parsed.skipped_lines.len());
        for s in &parsed.skipped_lines {
            let _ = writeln!(out, "  '{}': {}", s.line_text, s.reason);
        }
    }

    out
}

pub fn format_sample(sample: &SoilSample) -> String {
    let id = sample.metadata.id.as_deref().unwrap_or("unknown");
    format!(
        "Engine input for {id}:\n  T {}  Ca {}  Mg {}  K {} {}\n  P {}  S {}  B {}  Cu {}  Fe {}  Mn {}  Zn {}  Mo {}\n  organic matter {}%  clay {}%\n",
        sample.cec,
        sample.ca,
        sample.mg,
        sample.k,
        sample.k_unit,
        sample.p,
        sample.s,
        sample.b,
        sample.cu,
        sample.fe,
        sample.mn,
        sample.zn,
        sample.mo,
        sample.organic_matter,
        sample.clay_percent
    )
}

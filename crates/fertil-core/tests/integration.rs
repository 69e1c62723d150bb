//! Integration tests for the analysis pipeline, from report text or samples
//! through to needs and fertilizer doses.
//!
//! Uses a MockReader that returns pre-built text so report-format tests do
//! not depend on fixture files.

use approx::assert_relative_eq;
use fertil_core::crops::builtin::load_preset;
use fertil_core::error::FertilError;
use fertil_core::extraction::ReportReader;
use fertil_core::fertility::dose::{resolve_doses, DoseResolution, PotassiumDoseBasis};
use fertil_core::fertility::need::{BaseNeedStrategy, PhosphorusFactorStrategy};
use fertil_core::model::SampleMetadata;
use fertil_core::parsing::{self, ParsedReports};
use fertil_core::reference::phosphorus::PhosphorusLevel;
use fertil_core::reference::texture::TextureClass;
use fertil_core::{
    analyze, analyze_reports, analyze_samples, analyze_text, AnalysisOptions, Nutrient,
    PotassiumUnit, ReferenceTables, SoilSample,
};

struct MockReader {
    text: &'static str,
}

impl ReportReader for MockReader {
    fn read_reports(&self, _bytes: &[u8]) -> Result<ParsedReports, FertilError> {
        parsing::parse_reports(self.text)
    }

    fn format_name(&self) -> &str {
        "mock"
    }
}

fn reference_sample() -> SoilSample {
    SoilSample {
        metadata: SampleMetadata {
            id: Some("ref".into()),
            ..Default::default()
        },
        cec: 10.0,
        ca: 5.0,
        mg: 2.0,
        k: 195.0,
        k_unit: PotassiumUnit::MgPerDm3,
        p: 30.0,
        s: 12.0,
        b: 0.8,
        cu: 1.0,
        fe: 30.0,
        mn: 10.0,
        zn: 2.0,
        mo: 0.2,
        organic_matter: 3.1,
        clay_percent: 30.0,
    }
}

const TWO_SAMPLES: &str = "\
Laboratório: Solotest Análises Agrícolas

Laudo de Análise de Solo nº 1
Amostra: T1-A      Data: 12/03/2024
Propriedade: Fazenda Boa Vista
Determinação          Resultado     Unidade
CTC pH 7,0            10,0          cmolc/dm³
Cálcio (Ca)           1,5           cmolc/dm³
Magnésio (Mg)         2,0           cmolc/dm³
Potássio (K)          195           mg/dm³
P (Mehlich-1)         4             mg/dm³
Enxofre (S)           12            mg/dm³
Boro (B)              0,8           mg/dm³
Cobre (Cu)            1,0           mg/dm³
Ferro (Fe)            30            mg/dm³
Manganês (Mn)         10            mg/dm³
Zinco (Zn)            2,0           mg/dm³
Mo                    0,2           mg/dm³
M.O.                  2,8           %
Argila                10            %

Laudo de Análise de Solo nº 2
Amostra: T1-B
Propriedade: Fazenda Boa Vista
CTC pH 7,0            8,0           cmolc/dm³
Cálcio (Ca)           4,4           cmolc/dm³
Magnésio (Mg)         1,4           cmolc/dm³
Potássio (K)          0,3           cmolc/dm³
P (Mehlich-1)         40            mg/dm³
Enxofre (S)           < 2           mg/dm³
Boro (B)              0,5           mg/dm³
Cobre (Cu)            0,9           mg/dm³
Ferro (Fe)            130           mg/dm³
Manganês (Mn)         6             mg/dm³
Zinco (Zn)            1,6           mg/dm³
Mo                    nd            mg/dm³
Molibdênio (Mo)       0,15          mg/dm³
M.O.                  35            g/dm³
Argila                420           g/kg
";

// ---------------------------------------------------------------------------
// Test 1: Reference sample, bases in band but Ca:Mg ratio too low
// ---------------------------------------------------------------------------
#[test]
fn reference_sample_saturation_and_ratio() {
    let tables = ReferenceTables::builtin();
    let r = analyze(&reference_sample(), &tables, &AnalysisOptions::default()).unwrap();

    assert_relative_eq!(r.saturation.ca, 50.0);
    assert_relative_eq!(r.saturation.mg, 20.0);
    assert_relative_eq!(r.saturation.k, 5.0);
    assert_relative_eq!(r.ca_mg_ratio.value().unwrap(), 2.5);
    assert!(r.adequacy.ca && r.adequacy.mg && r.adequacy.k);
    assert!(!r.adequacy.ca_mg_ratio);
    assert_eq!(r.sample_id(), "ref");
}

// ---------------------------------------------------------------------------
// Test 2: Low calcium resolves to a CaO dose and catalog rates
// ---------------------------------------------------------------------------
#[test]
fn low_calcium_need_and_dose() {
    let tables = ReferenceTables::builtin();
    let sample = SoilSample {
        ca: 1.5,
        ..reference_sample()
    };
    let options = AnalysisOptions {
        include_fertilizers: true,
        ..Default::default()
    };
    let r = analyze(&sample, &tables, &options).unwrap();

    assert_relative_eq!(r.needs.ca, 4.0, max_relative = 1e-12);
    assert_relative_eq!(r.oxide_doses.cao, 2240.0, max_relative = 1e-12);

    let ca = &r.fertilizers.as_ref().unwrap()[&Nutrient::Ca];
    let calcitic = &ca.recommendations()[0];
    assert_eq!(calcitic.source.name, "Calcário calcítico");
    // 4.0 * 560 / 0.48
    assert_relative_eq!(calcitic.application_rate, 4666.67);
}

// ---------------------------------------------------------------------------
// Test 3: Sandy soil with very low P
// ---------------------------------------------------------------------------
#[test]
fn sandy_soil_low_phosphorus() {
    let tables = ReferenceTables::builtin();
    let sample = SoilSample {
        clay_percent: 10.0,
        p: 4.0,
        ..reference_sample()
    };
    let r = analyze(&sample, &tables, &AnalysisOptions::default()).unwrap();

    assert_eq!(r.texture_class, TextureClass::Sandy);
    assert_eq!(r.texture_class.number(), 1);
    assert_eq!(r.phosphorus.level, PhosphorusLevel::MuitoBaixo);
    assert!(!r.adequacy.p);
    assert!(r.needs.p > 0.0);
}

// ---------------------------------------------------------------------------
// Test 4: Dose epsilon boundary
// ---------------------------------------------------------------------------
#[test]
fn dose_epsilon_boundary() {
    let tables = ReferenceTables::builtin();
    assert_eq!(
        resolve_doses("Zn", 0.01, &tables, PotassiumDoseBasis::default()).unwrap(),
        DoseResolution::NoCorrection
    );
    match resolve_doses("Zn", 0.011, &tables, PotassiumDoseBasis::default()).unwrap() {
        DoseResolution::Recommendations(list) => assert!(!list.is_empty()),
        DoseResolution::NoCorrection => panic!("expected recommendations"),
    }
}

// ---------------------------------------------------------------------------
// Test 5: Two-sample report text, end to end
// ---------------------------------------------------------------------------
#[test]
fn two_sample_report_text() {
    let tables = ReferenceTables::builtin();
    let batch = analyze_text(
        TWO_SAMPLES,
        PotassiumUnit::MgPerDm3,
        &tables,
        &AnalysisOptions::default(),
    )
    .unwrap();

    assert_eq!(batch.samples.len(), 2);

    let a = &batch.samples[0];
    assert_eq!(a.metadata.id.as_deref(), Some("T1-A"));
    assert_eq!(a.metadata.date.as_deref(), Some("12/03/2024"));
    assert_eq!(a.texture_class, TextureClass::Sandy);
    assert_eq!(a.phosphorus.level, PhosphorusLevel::MuitoBaixo);
    assert_relative_eq!(a.needs.ca, 4.0, max_relative = 1e-12);

    let b = &batch.samples[1];
    assert_eq!(b.metadata.id.as_deref(), Some("T1-B"));
    assert_eq!(b.texture_class, TextureClass::Clayey);
    // K given in cmolc by the report: 0.3 / 8 = 3.75 %.
    assert_relative_eq!(b.saturation.k, 3.75, max_relative = 1e-12);
    // S below detection counts as zero.
    assert_relative_eq!(b.needs.s, 100.0, max_relative = 1e-12);
    // Fe above its ceiling is a toxicity flag, not a need.
    assert!(!b.adequacy.fe);
    assert_eq!(b.needs.fe, 0.0);
    assert!(b.adequacy.mo);

    assert!(batch.warnings.iter().any(|w| w.contains("not determined")));
    assert!(batch.warnings.iter().any(|w| w.contains("below detection")));
}

// ---------------------------------------------------------------------------
// Test 6: Reports through a custom reader backend
// ---------------------------------------------------------------------------
#[test]
fn custom_reader_backend() {
    let tables = ReferenceTables::builtin();
    let reader = MockReader { text: TWO_SAMPLES };
    let parsed = reader.read_reports(&[]).unwrap();
    let batch = analyze_reports(
        &parsed,
        PotassiumUnit::MgPerDm3,
        &tables,
        &AnalysisOptions::default(),
    )
    .unwrap();
    assert_eq!(batch.samples.len(), 2);
    assert_eq!(reader.format_name(), "mock");
}

// ---------------------------------------------------------------------------
// Test 7: Report missing required parameters fails the batch
// ---------------------------------------------------------------------------
#[test]
fn missing_parameters_fail() {
    let tables = ReferenceTables::builtin();
    let text = "Amostra: X\nCálcio   5,0\nMagnésio   2,0\nArgila   30\n";
    let err = analyze_text(
        text,
        PotassiumUnit::MgPerDm3,
        &tables,
        &AnalysisOptions::default(),
    )
    .unwrap_err();
    match err {
        FertilError::MissingParameter(list) => {
            assert!(list.contains(&"T".to_string()));
            assert!(!list.contains(&"clayPercent".to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Test 8: Strategies change needs, never adequacy
// ---------------------------------------------------------------------------
#[test]
fn strategies_change_needs_only() {
    let tables = ReferenceTables::builtin();
    let sample = SoilSample {
        ca: 1.5,
        p: 12.0,
        clay_percent: 50.0,
        ..reference_sample()
    };
    let default = analyze(&sample, &tables, &AnalysisOptions::default()).unwrap();
    let alternative = analyze(
        &sample,
        &tables,
        &AnalysisOptions {
            base_strategy: BaseNeedStrategy::FixedThreshold,
            phosphorus_factor: PhosphorusFactorStrategy::TextureClass,
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(default.adequacy, alternative.adequacy);
    assert_relative_eq!(default.needs.ca, 4.0, max_relative = 1e-12);
    assert_relative_eq!(alternative.needs.ca, 0.5, max_relative = 1e-12);
    // Class 3, critical level 30: deficit 18 at 320.6 (current P band 10-20)
    // and 320.6 (texture class 3) alike.
    assert_relative_eq!(default.needs.p, alternative.needs.p, max_relative = 1e-12);
    assert_eq!(
        alternative.strategies.base_need,
        BaseNeedStrategy::FixedThreshold
    );
}

// ---------------------------------------------------------------------------
// Test 9: Crop profile moves floors for classifier and need together
// ---------------------------------------------------------------------------
#[test]
fn crop_profile_overrides() {
    let tables = ReferenceTables::builtin();
    let options = AnalysisOptions {
        crop: Some(load_preset("cafe").unwrap()),
        ..Default::default()
    };
    let r = analyze(&reference_sample(), &tables, &options).unwrap();

    assert_eq!(r.crop.as_deref(), Some("Café"));
    // B 0.8 against the coffee floor of 1.0.
    assert!(!r.adequacy.b);
    assert_relative_eq!(r.needs.b, 0.4, max_relative = 1e-9);
}

// ---------------------------------------------------------------------------
// Test 10: Texture monotonicity of P interpretation
// ---------------------------------------------------------------------------
#[test]
fn finer_texture_never_more_favourable() {
    let tables = ReferenceTables::builtin();
    for p in [3.0, 9.0, 14.0, 22.0, 28.0, 38.0, 47.0, 55.0] {
        let mut previous: Option<PhosphorusLevel> = None;
        for clay in [5.0, 15.0, 15.1, 35.0, 35.1, 60.0, 60.1, 90.0] {
            let sample = SoilSample {
                p,
                clay_percent: clay,
                ..reference_sample()
            };
            let level = analyze(&sample, &tables, &AnalysisOptions::default())
                .unwrap()
                .phosphorus
                .level;
            if let Some(prev) = previous {
                assert!(level <= prev, "P={p} clay={clay}: {level} after {prev}");
            }
            previous = Some(level);
        }
    }
}

// ---------------------------------------------------------------------------
// Test 11: Batch of samples, first invalid sample fails the batch
// ---------------------------------------------------------------------------
#[test]
fn batch_fails_on_invalid_sample() {
    let tables = ReferenceTables::builtin();
    let ok = analyze_samples(
        &[reference_sample(), reference_sample()],
        &tables,
        &AnalysisOptions::default(),
    )
    .unwrap();
    assert_eq!(ok.samples.len(), 2);

    let bad = SoilSample {
        clay_percent: 120.0,
        ..reference_sample()
    };
    assert!(matches!(
        analyze_samples(
            &[reference_sample(), bad],
            &tables,
            &AnalysisOptions::default()
        ),
        Err(FertilError::InvalidSample { .. })
    ));
}

// ---------------------------------------------------------------------------
// Test 12: JSON output shape
// ---------------------------------------------------------------------------
#[test]
fn result_serializes_with_fertilizer_map() {
    let tables = ReferenceTables::builtin();
    let sample = SoilSample {
        zn: 0.5,
        ..reference_sample()
    };
    let options = AnalysisOptions {
        include_fertilizers: true,
        ..Default::default()
    };
    let r = analyze(&sample, &tables, &options).unwrap();
    let json = serde_json::to_value(&r).unwrap();

    assert_eq!(json["texture_class"], "medium");
    assert_eq!(json["ca_mg_ratio"]["kind"], "defined");
    assert_eq!(json["fertilizers"]["Zn"]["kind"], "recommendations");
    assert_eq!(json["fertilizers"]["S"]["kind"], "no_correction");
    assert_eq!(
        json["fertilizers"]["Zn"]["sources"][0]["name"],
        "Sulfato de zinco"
    );
    assert_eq!(json["strategies"]["potassium_dose"], "resolver-shortcut");
}

// ---------------------------------------------------------------------------
// Test 13: Spreadsheet report through calamine and the full analysis
// ---------------------------------------------------------------------------
const LAUDO_XLSX: &[u8] = include_bytes!("fixtures/laudo.xlsx");

#[test]
fn xlsx_report_end_to_end() {
    let parsed = fertil_core::extraction::xlsx::parse_xlsx(LAUDO_XLSX).unwrap();
    assert_eq!(parsed.reports.len(), 1);
    let report = &parsed.reports[0];
    assert_eq!(report.metadata.id.as_deref(), Some("001"));
    assert_eq!(report.metadata.location.as_deref(), Some("Fazenda Boa Vista"));
    assert_eq!(report.metadata.date.as_deref(), Some("12/03/2024"));
    // Header rows never become values.
    assert!(report.rows.iter().all(|r| r.normalized_name != "amostra"));
    let mo = report.rows.iter().find(|r| r.normalized_name == "mo").unwrap();
    assert!(mo.value.is_below_detection());

    let tables = ReferenceTables::builtin();
    let batch = fertil_core::analyze_document(
        LAUDO_XLSX,
        fertil_core::extraction::InputFormat::Xlsx,
        PotassiumUnit::MgPerDm3,
        &tables,
        &AnalysisOptions::default(),
    )
    .unwrap();
    let r = &batch.samples[0];
    assert_eq!(r.sample_id(), "001");
    assert_eq!(r.texture_class, TextureClass::Medium);
    assert_relative_eq!(r.saturation.ca, 50.0, epsilon = 1e-9);
    assert!(r.needs.get(Nutrient::Zn) > 0.0);
}

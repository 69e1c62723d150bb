use crate::model::Nutrient;
use crate::reference::schema::{
    Band, BaseTargets, BaseValues, DoseConstants, FactorBand, FertilizerSource, NutrientBasis,
    PhosphorusBreakpoints, PhosphorusFactors, ReferenceTables, SaturationBands, SecondaryTarget,
    TextureBreakpoints,
};
use crate::units;
use std::collections::BTreeMap;

pub const BUILTIN_NAME: &str = "Tabelas de referência padrão";
pub const BUILTIN_VERSION: &str = "2024.1";

/// The built-in reference tables.
pub fn default_tables() -> ReferenceTables {
    ReferenceTables {
        name: BUILTIN_NAME.to_string(),
        description: Some(
            "Default interpretation and correction tables for Mehlich-1 extracted tropical soils"
                .to_string(),
        ),
        version: BUILTIN_VERSION.to_string(),
        texture: TextureBreakpoints {
            class_upper_clay: [15.0, 35.0, 60.0],
        },
        phosphorus_interpretation: [
            p_row(6.0, 12.0, 20.0, 30.0),
            p_row(8.0, 15.0, 25.0, 40.0),
            p_row(10.0, 20.0, 30.0, 45.0),
            p_row(12.0, 24.0, 36.0, 50.0),
        ],
        saturation_bands: SaturationBands {
            ca: Band { min: 50.0, max: 60.0 },
            mg: Band { min: 15.0, max: 20.0 },
            k: Band { min: 3.0, max: 5.0 },
            ca_mg_ratio: Band { min: 3.0, max: 5.0 },
        },
        base_targets: BaseTargets {
            cec_fraction: BaseValues {
                ca: 0.55,
                mg: 0.175,
                k: 0.04,
            },
            fixed_threshold: BaseValues {
                ca: 2.0,
                mg: 0.8,
                k: 0.15,
            },
        },
        secondary_targets: secondary_targets(),
        phosphorus_factors: PhosphorusFactors {
            current_p_bands: vec![
                FactorBand {
                    max_p: 5.0,
                    factor: 503.80,
                },
                FactorBand {
                    max_p: 10.0,
                    factor: 412.20,
                },
                FactorBand {
                    max_p: 20.0,
                    factor: 320.60,
                },
            ],
            above_bands: 229.00,
            by_texture_class: [503.80, 412.20, 320.60, 229.00],
        },
        dose: DoseConstants {
            ca: units::CA_CMOLC_TO_CAO_KG_HA,
            mg: units::MG_CMOLC_TO_MGO_KG_HA,
            k_shortcut: 2.0,
            k_oxide: units::K_CMOLC_TO_K2O_KG_HA,
            epsilon: 0.01,
        },
        catalog: catalog(),
    }
}

fn p_row(muito_baixo: f64, baixo: f64, medio: f64, alto: f64) -> PhosphorusBreakpoints {
    PhosphorusBreakpoints {
        muito_baixo,
        baixo,
        medio,
        alto,
    }
}

fn secondary_targets() -> BTreeMap<Nutrient, SecondaryTarget> {
    let floor = |floor: f64, scale: f64| SecondaryTarget {
        floor,
        ceiling: None,
        scale,
        advisory: false,
    };
    let banded = |floor: f64, ceiling: f64, scale: f64| SecondaryTarget {
        floor,
        ceiling: Some(ceiling),
        scale,
        advisory: false,
    };

    BTreeMap::from([
        (Nutrient::S, floor(10.0, 10.0)),
        (Nutrient::B, floor(0.6, 2.0)),
        (Nutrient::Cu, floor(0.8, 3.0)),
        (Nutrient::Fe, banded(12.0, 100.0, 5.0)),
        (Nutrient::Mn, banded(5.0, 50.0, 4.0)),
        (Nutrient::Zn, floor(1.5, 8.0)),
        (
            Nutrient::Mo,
            SecondaryTarget {
                advisory: true,
                ..floor(0.1, 15.0)
            },
        ),
    ])
}

fn source(name: &str, concentration: f64, basis: NutrientBasis, benefits: &str) -> FertilizerSource {
    FertilizerSource {
        name: name.to_string(),
        concentration,
        basis,
        unit: "kg/ha".to_string(),
        benefits: benefits.to_string(),
    }
}

fn catalog() -> BTreeMap<Nutrient, Vec<FertilizerSource>> {
    use NutrientBasis::{Elemental, Oxide};

    BTreeMap::from([
        (
            Nutrient::Ca,
            vec![
                source("Calcário calcítico", 48.0, Oxide, "Corrige acidez e fornece cálcio"),
                source("Gesso agrícola", 26.0, Oxide, "Leva cálcio ao subsolo e fornece enxofre"),
                source("Calcário dolomítico", 30.0, Oxide, "Corrige acidez e fornece cálcio e magnésio"),
            ],
        ),
        (
            Nutrient::Mg,
            vec![
                source("Calcário dolomítico", 15.0, Oxide, "Fornece magnésio e corrige acidez"),
                source("Sulfato de magnésio", 16.0, Oxide, "Alta solubilidade, fornece enxofre"),
                source("Óxido de magnésio", 85.0, Oxide, "Alta concentração de magnésio"),
            ],
        ),
        (
            Nutrient::K,
            vec![
                source("Cloreto de potássio", 60.0, Oxide, "Fonte mais concentrada e econômica"),
                source("Sulfato de potássio", 50.0, Oxide, "Baixo índice salino, fornece enxofre"),
                source("Nitrato de potássio", 44.0, Oxide, "Fornece nitrogênio nítrico"),
            ],
        ),
        (
            Nutrient::P,
            vec![
                source("Superfosfato simples", 18.0, Oxide, "Fornece cálcio e enxofre"),
                source("Superfosfato triplo", 46.0, Oxide, "Alta concentração de fósforo"),
                source("MAP", 52.0, Oxide, "Fornece nitrogênio amoniacal"),
            ],
        ),
        (
            Nutrient::S,
            vec![
                source("Gesso agrícola", 15.0, Elemental, "Fornece cálcio e melhora o subsolo"),
                source("Enxofre elementar", 90.0, Elemental, "Liberação gradual, acidifica o solo"),
                source("Sulfato de amônio", 24.0, Elemental, "Fornece nitrogênio amoniacal"),
            ],
        ),
        (
            Nutrient::B,
            vec![
                source("Ácido bórico", 17.0, Elemental, "Alta solubilidade, uso via foliar ou solo"),
                source("Bórax", 11.0, Elemental, "Fonte tradicional de boro"),
                source("Ulexita", 10.0, Elemental, "Liberação gradual, menor lixiviação"),
            ],
        ),
        (
            Nutrient::Cu,
            vec![
                source("Sulfato de cobre", 25.0, Elemental, "Alta solubilidade"),
                source("Óxido cúprico", 75.0, Elemental, "Alta concentração, efeito residual"),
            ],
        ),
        (
            Nutrient::Fe,
            vec![
                source("Sulfato ferroso", 19.0, Elemental, "Fonte solúvel de ferro"),
                source("Quelato de ferro (EDDHA)", 6.0, Elemental, "Estável em solos de pH elevado"),
            ],
        ),
        (
            Nutrient::Mn,
            vec![
                source("Sulfato de manganês", 26.0, Elemental, "Alta solubilidade"),
                source("Óxido de manganês", 50.0, Elemental, "Efeito residual prolongado"),
            ],
        ),
        (
            Nutrient::Zn,
            vec![
                source("Sulfato de zinco", 20.0, Elemental, "Alta solubilidade"),
                source("Óxido de zinco", 78.0, Elemental, "Alta concentração, efeito residual"),
                source("Quelato de zinco", 14.0, Elemental, "Boa absorção via foliar"),
            ],
        ),
        (
            Nutrient::Mo,
            vec![
                source("Molibdato de sódio", 39.0, Elemental, "Usado em tratamento de sementes"),
                source("Molibdato de amônio", 54.0, Elemental, "Alta concentração de molibdênio"),
            ],
        ),
    ])
}

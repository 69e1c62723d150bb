use crate::model::Nutrient;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Canonical key for cation exchange capacity (T).
pub const CTC: &str = "ctc";
/// Canonical key for organic matter.
pub const ORGANIC_MATTER: &str = "materia_organica";
/// Canonical key for clay content.
pub const CLAY: &str = "argila";

/// Normalize a parameter name from a lab report to a canonical key.
///
/// Nutrients map to their lowercase symbol ("ca", "zn", ...), the remaining
/// engine inputs to [`CTC`], [`ORGANIC_MATTER`] and [`CLAY`]. Anything else
/// passes through folded and underscore-separated.
///
/// Symbols are matched case-sensitively before folding, so "Mo" is
/// molybdenum while "MO" and "M.O." are organic matter.
pub fn normalize_parameter(raw: &str) -> String {
    let name = raw.trim().trim_end_matches(':').trim();

    if let Some(key) = exact_symbol(name) {
        return key.to_string();
    }

    // "Cálcio (Ca)" -> use the symbol when the parenthesis holds one.
    if let Some(open) = name.rfind('(') {
        let inner = name[open + 1..].trim_end_matches(')').trim();
        if name.ends_with(')') {
            if let Some(key) = exact_symbol(inner) {
                return key.to_string();
            }
        }
    }

    let key = to_key(name);
    if let Some(canonical) = ALIASES.get(key.as_str()) {
        return canonical.to_string();
    }

    // "Fósforo Mehlich-1", "Argila total (g/kg)" -> look up the leading name.
    if let Some(first) = key.split('_').next() {
        if LEADING_NAMES.contains(&first) {
            if let Some(canonical) = ALIASES.get(first) {
                return canonical.to_string();
            }
        }
    }

    key
}

/// The nutrient behind a canonical key, if any.
pub fn nutrient_for_key(key: &str) -> Option<Nutrient> {
    if key.len() > 2 {
        return None;
    }
    Nutrient::from_symbol(key)
}

/// Whether a canonical key is one the engine consumes.
pub fn is_engine_parameter(key: &str) -> bool {
    nutrient_for_key(key).is_some() || matches!(key, CTC | ORGANIC_MATTER | CLAY)
}

/// Lowercase and strip Portuguese diacritics.
pub fn fold(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

fn exact_symbol(s: &str) -> Option<&'static str> {
    let key = match s {
        "T" => CTC,
        "Ca" => "ca",
        "Mg" => "mg",
        "K" => "k",
        "P" => "p",
        "S" => "s",
        "B" => "b",
        "Cu" => "cu",
        "Fe" => "fe",
        "Mn" => "mn",
        "Zn" => "zn",
        "Mo" => "mo",
        _ => return None,
    };
    Some(key)
}

/// Fold, then collapse every run of non-alphanumerics into one underscore.
fn to_key(s: &str) -> String {
    let folded = fold(s);
    let mut key = String::with_capacity(folded.len());
    let mut prev_underscore = true;
    for c in folded.chars() {
        if c.is_ascii_alphanumeric() {
            key.push(c);
            prev_underscore = false;
        } else if !prev_underscore {
            key.push('_');
            prev_underscore = true;
        }
    }
    if key.ends_with('_') {
        key.pop();
    }
    key
}

/// Full names that may be followed by a method or unit ("fosforo_mehlich_1").
const LEADING_NAMES: &[&str] = &[
    "calcio",
    "magnesio",
    "potassio",
    "fosforo",
    "enxofre",
    "boro",
    "cobre",
    "ferro",
    "manganes",
    "zinco",
    "molibdenio",
    "argila",
    "ctc",
];

static ALIASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut m = HashMap::new();

    // Exchangeable bases
    m.insert("calcio", "ca");
    m.insert("calcio_trocavel", "ca");
    m.insert("ca", "ca");
    m.insert("magnesio", "mg");
    m.insert("magnesio_trocavel", "mg");
    m.insert("mg", "mg");
    m.insert("potassio", "k");
    m.insert("potassio_trocavel", "k");
    m.insert("k", "k");

    // Phosphorus and sulfur
    m.insert("fosforo", "p");
    m.insert("fosforo_disponivel", "p");
    m.insert("p_mehlich", "p");
    m.insert("p_mehlich_1", "p");
    m.insert("p_resina", "p");
    m.insert("p", "p");
    m.insert("enxofre", "s");
    m.insert("s_so4", "s");
    m.insert("enxofre_so4", "s");
    m.insert("sulfato", "s");
    m.insert("s", "s");

    // Micronutrients
    m.insert("boro", "b");
    m.insert("b", "b");
    m.insert("cobre", "cu");
    m.insert("cu", "cu");
    m.insert("ferro", "fe");
    m.insert("fe", "fe");
    m.insert("manganes", "mn");
    m.insert("mn", "mn");
    m.insert("zinco", "zn");
    m.insert("zn", "zn");
    m.insert("molibdenio", "mo");

    // CEC
    m.insert("ctc", CTC);
    m.insert("ctc_ph_7", CTC);
    m.insert("ctc_ph_7_0", CTC);
    m.insert("ctc_a_ph_7", CTC);
    m.insert("ctc_a_ph_7_0", CTC);
    m.insert("ctc_total", CTC);
    m.insert("ctc_potencial", CTC);
    m.insert("capacidade_de_troca_cationica", CTC);
    m.insert("capacidade_de_troca_de_cations", CTC);
    m.insert("t", CTC);

    // Organic matter. Lowercase "mo" is organic matter; "Mo" is caught earlier.
    m.insert("materia_organica", ORGANIC_MATTER);
    m.insert("mo", ORGANIC_MATTER);
    m.insert("m_o", ORGANIC_MATTER);

    // Clay
    m.insert("argila", CLAY);
    m.insert("argila_total", CLAY);
    m.insert("teor_de_argila", CLAY);

    m
});

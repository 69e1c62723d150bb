use crate::model::SampleMetadata;
use crate::parsing::normalize::fold;

// Folded labels, most specific first.
const ID_LABELS: &[&str] = &[
    "identificacao da amostra",
    "identificacao",
    "amostra nº",
    "amostra n°",
    "amostra",
];
const LOCATION_LABELS: &[&str] = &["propriedade", "local", "talhao"];
const DATE_LABELS: &[&str] = &["data da coleta", "data de coleta", "data de entrada", "data"];
const LAB_LABELS: &[&str] = &["laboratorio"];

/// Extract sample metadata from the header lines of one report section.
///
/// The first value found for each field wins.
pub fn parse_header(lines: &[&str]) -> SampleMetadata {
    let mut meta = SampleMetadata::default();

    for line in lines {
        for field in split_fields(line) {
            fill(&mut meta.id, field, ID_LABELS);
            fill(&mut meta.location, field, LOCATION_LABELS);
            fill(&mut meta.date, field, DATE_LABELS);
            fill(&mut meta.lab, field, LAB_LABELS);
        }
    }

    meta
}

fn fill(slot: &mut Option<String>, field: &str, labels: &[&str]) {
    if slot.is_none() {
        *slot = labels
            .iter()
            .find_map(|label| extract_after_label(field, label));
    }
}

/// Fields on one header line are separated by tabs or runs of 3+ spaces.
fn split_fields(line: &str) -> Vec<&str> {
    line.split('\t')
        .flat_map(|part| part.split("   "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Value after a label at the start of a field ("Amostra: 001" -> "001").
///
/// The label is matched case- and accent-insensitively and must end on a word
/// boundary, so "Localização" does not match "local".
fn extract_after_label(field: &str, label: &str) -> Option<String> {
    if !fold(field).starts_with(label) {
        return None;
    }
    let rest = &field[raw_prefix_len(field, label.chars().count())?..];
    if rest.chars().next().is_some_and(char::is_alphanumeric) {
        return None;
    }
    let value = rest
        .trim_start_matches(|c: char| c == ':' || c == '-' || c.is_whitespace())
        .trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Byte length of the shortest prefix of `field` whose folded form has
/// `folded_chars` chars. Lowercasing may expand a char ('İ' -> "i̇"), so this
/// is not the same as skipping `folded_chars` raw chars. `None` when the
/// boundary falls inside an expanded char.
fn raw_prefix_len(field: &str, folded_chars: usize) -> Option<usize> {
    let mut count = 0;
    for (i, c) in field.char_indices() {
        if count == folded_chars {
            return Some(i);
        }
        if count > folded_chars {
            return None;
        }
        let mut buf = [0u8; 4];
        count += fold(c.encode_utf8(&mut buf)).chars().count();
    }
    (count == folded_chars).then_some(field.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header_basic() {
        let lines = [
            "Laboratório: Solotest Análises Agrícolas",
            "Amostra: 2024/0173",
            "Propriedade: Fazenda Boa Vista",
            "Data da coleta: 12/03/2024",
        ];
        let h = parse_header(&lines);
        assert_eq!(h.id.as_deref(), Some("2024/0173"));
        assert_eq!(h.location.as_deref(), Some("Fazenda Boa Vista"));
        assert_eq!(h.date.as_deref(), Some("12/03/2024"));
        assert_eq!(h.lab.as_deref(), Some("Solotest Análises Agrícolas"));
    }

    #[test]
    fn test_several_fields_on_one_line() {
        let lines = ["Identificação: Talhão 7      Data: 02/05/2024"];
        let h = parse_header(&lines);
        assert_eq!(h.id.as_deref(), Some("Talhão 7"));
        assert_eq!(h.date.as_deref(), Some("02/05/2024"));
    }

    #[test]
    fn test_label_needs_word_boundary() {
        let lines = ["Localização da área: norte"];
        let h = parse_header(&lines);
        assert_eq!(h.location, None);
    }

    #[test]
    fn test_first_value_wins() {
        let lines = ["Amostra: A1", "Amostra: A2"];
        assert_eq!(parse_header(&lines).id.as_deref(), Some("A1"));
    }

    #[test]
    fn test_unaccented_labels() {
        let lines = ["TALHAO - 12", "LABORATORIO  Agrolab"];
        let h = parse_header(&lines);
        assert_eq!(h.location.as_deref(), Some("12"));
        assert_eq!(h.lab.as_deref(), Some("Agrolab"));
    }

    #[test]
    fn test_label_boundary_after_expanding_lowercase() {
        // 'İ' lowercases to two chars, so the raw field is shorter than the label.
        let label = fold("İtem");
        assert_eq!(label.chars().count(), 5);
        assert_eq!(extract_after_label("İtem 5", &label).as_deref(), Some("5"));
        assert_eq!(extract_after_label("İtemx", &label), None);
    }

    #[test]
    fn test_raw_prefix_len() {
        assert_eq!(raw_prefix_len("Amostra: 1", 7), Some(7));
        assert_eq!(raw_prefix_len("Talhão 3", 6), Some(7));
        assert_eq!(raw_prefix_len("Lab", 3), Some(3));
        assert_eq!(raw_prefix_len("İx", 1), None);
    }
}

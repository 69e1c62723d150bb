use crate::error::FertilError;
use crate::model::ReportValue;

/// Parse a value as printed on a lab report.
///
/// - "5,2" or "5.2" -> Measured(5.2)
/// - "1.234,5" -> Measured(1234.5)
/// - "< 0,1" or "<0.1" -> BelowDetection(0.1)
/// - "-", "*", "nd", "n.d." -> Ok(None): not determined
pub fn parse_value(s: &str) -> Result<Option<ReportValue>, FertilError> {
    let s = s.trim();

    if is_not_determined(s) {
        return Ok(None);
    }

    if let Some(rest) = s.strip_prefix('<') {
        return Ok(Some(ReportValue::BelowDetection(parse_number(rest)?)));
    }

    Ok(Some(ReportValue::Measured(parse_number(s)?)))
}

/// Markers labs print when a parameter was not determined.
pub fn is_not_determined(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "" | "-" | "--" | "—" | "*" | "nd" | "n.d." | "n/d" | "n/a" | "na"
    )
}

/// Parse a number written with a decimal comma or point.
///
/// When both separators appear, the last one is the decimal separator and
/// the other groups thousands. A lone point is always a decimal point, so
/// "1.234" reads 1.234; such values are logged as possibly grouped.
pub fn parse_number(s: &str) -> Result<f64, FertilError> {
    let s = s.trim();
    if has_ambiguous_point(s) {
        tracing::warn!(value = s, "lone point read as decimal, could be a thousands separator");
    }
    let normalized = match (s.rfind(','), s.rfind('.')) {
        (Some(comma), Some(point)) if comma > point => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        (Some(_), None) => s.replace(',', "."),
        _ => s.to_string(),
    };
    normalized
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FertilError::ParseError(format!("invalid number '{s}'")))
}

/// A single point followed by exactly three digits and no comma ("1.234").
pub fn has_ambiguous_point(s: &str) -> bool {
    let s = s.trim();
    if s.contains(',') || s.matches('.').count() != 1 {
        return false;
    }
    match s.split_once('.') {
        Some((int, frac)) => {
            !int.is_empty()
                && int.chars().all(|c| c.is_ascii_digit())
                && frac.len() == 3
                && frac.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measured_integer() {
        assert_eq!(parse_value("32").unwrap(), Some(ReportValue::Measured(32.0)));
    }

    #[test]
    fn test_decimal_comma() {
        assert_eq!(parse_value("5,2").unwrap(), Some(ReportValue::Measured(5.2)));
    }

    #[test]
    fn test_decimal_point() {
        assert_eq!(parse_value("0.35").unwrap(), Some(ReportValue::Measured(0.35)));
    }

    #[test]
    fn test_lone_point_is_decimal() {
        assert_eq!(parse_number("1.234").unwrap(), 1.234);
        assert!(has_ambiguous_point("1.234"));
        assert!(!has_ambiguous_point("0.35"));
        assert!(!has_ambiguous_point("1.2345"));
        assert!(!has_ambiguous_point("1.234,5"));
        assert!(!has_ambiguous_point("1234"));
    }

    #[test]
    fn test_thousands_separator() {
        assert_eq!(
            parse_value("1.234,5").unwrap(),
            Some(ReportValue::Measured(1234.5))
        );
        assert_eq!(
            parse_value("1,234.5").unwrap(),
            Some(ReportValue::Measured(1234.5))
        );
    }

    #[test]
    fn test_below_detection_with_space() {
        assert_eq!(
            parse_value("< 0,1").unwrap(),
            Some(ReportValue::BelowDetection(0.1))
        );
    }

    #[test]
    fn test_below_detection_no_space() {
        assert_eq!(
            parse_value("<0.05").unwrap(),
            Some(ReportValue::BelowDetection(0.05))
        );
    }

    #[test]
    fn test_not_determined_markers() {
        for marker in ["-", "*", "nd", "N.D.", "  "] {
            assert_eq!(parse_value(marker).unwrap(), None, "{marker:?}");
        }
    }

    #[test]
    fn test_invalid_returns_error() {
        assert!(parse_value("abc").is_err());
        assert!(parse_value("12/03/2024").is_err());
    }
}

use crate::utils::constants::NULL_TOKENS;

/// Returns true when a raw cell should be read as null
pub fn is_null_token(raw: &str) -> bool {
    let trimmed = raw.trim();
    NULL_TOKENS.contains(&trimmed)
}

/// Parse a finite float using `.` as the decimal separator
pub fn parse_float(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a number that may use `,` as the decimal separator
///
/// # Examples
/// ```
/// use acidentes_processor::utils::parse_decimal;
///
/// assert_eq!(parse_decimal("123,4"), Some(123.4));
/// assert_eq!(parse_decimal("1.234,5"), Some(1234.5));
/// assert_eq!(parse_decimal("-7.25"), Some(-7.25));
/// assert_eq!(parse_decimal("n/d"), None);
/// ```
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if !trimmed.contains(',') {
        return parse_float(trimmed);
    }

    // "1.234,5": dots are thousands separators
    let normalized = trimmed.replace('.', "").replace(',', ".");
    parse_float(&normalized)
}

/// Extract the hour component from a time of day such as `19:30:00`
pub fn parse_hour(raw: &str) -> Option<i64> {
    raw.trim().split(':').next()?.trim().parse::<i64>().ok()
}

/// Render a float in its shortest round-trip form
pub fn format_float(value: f64) -> String {
    format!("{}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_tokens() {
        assert!(is_null_token(""));
        assert!(is_null_token("   "));
        assert!(is_null_token("NaN"));
        assert!(is_null_token("NULL"));
        assert!(!is_null_token("0"));
        assert!(!is_null_token("Chuva"));
    }

    #[test]
    fn test_parse_float_rejects_non_finite() {
        assert_eq!(parse_float("2.5"), Some(2.5));
        assert_eq!(parse_float(" 7 "), Some(7.0));
        assert_eq!(parse_float("inf"), None);
        assert_eq!(parse_float("nan"), None);
        assert_eq!(parse_float("12,5"), None);
    }

    #[test]
    fn test_parse_decimal_comma() {
        assert_eq!(parse_decimal("0,5"), Some(0.5));
        assert_eq!(parse_decimal("-23,5505"), Some(-23.5505));
        assert_eq!(parse_decimal("12"), Some(12.0));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("abc"), None);
    }

    #[test]
    fn test_parse_hour() {
        assert_eq!(parse_hour("05:59:00"), Some(5));
        assert_eq!(parse_hour("18:00"), Some(18));
        assert_eq!(parse_hour("24:00:00"), Some(24));
        assert_eq!(parse_hour("-1:00:00"), Some(-1));
        assert_eq!(parse_hour("7"), Some(7));
        assert_eq!(parse_hour("manhã"), None);
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(3.0), "3");
        assert_eq!(format_float(2.5), "2.5");
        assert_eq!(format_float(-0.125), "-0.125");
    }
}

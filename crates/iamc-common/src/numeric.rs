//! Numeric parsing and formatting.

/// Formats a floating-point number as a string without trailing zeros.
///
/// Integral values print without a decimal point, which lets a year stored
/// as `2020.0` in a spreadsheet match the key text `"2020"`.
///
/// # Examples
///
/// ```
/// use iamc_common::format_numeric;
///
/// assert_eq!(format_numeric(1.0), "1");
/// assert_eq!(format_numeric(1.50), "1.5");
/// assert_eq!(format_numeric(100.0), "100");
/// assert_eq!(format_numeric(0.0), "0");
/// ```
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parses a string as `f64`, returning `None` for invalid or empty strings.
///
/// A decimal comma is accepted when the string has no decimal point, so
/// `"1,5"` from a semicolon-separated export parses as `1.5`.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(v) = trimmed.parse::<f64>() {
        return Some(v);
    }
    if !trimmed.contains('.') && trimmed.matches(',').count() == 1 {
        return trimmed.replace(',', ".").parse::<f64>().ok();
    }
    None
}

/// Parses a string as `i64`, returning `None` for invalid or empty strings.
pub fn parse_i64(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<i64>().ok()
}

/// Parses a year label. Accepts `2020` and `2020.0`, rejects `2020.5`.
pub fn parse_year(value: &str) -> Option<i64> {
    if let Some(year) = parse_i64(value) {
        return Some(year);
    }
    let v = value.trim().parse::<f64>().ok()?;
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        Some(v as i64)
    } else {
        None
    }
}

//! Text normalisation for key matching.

/// Trims and collapses every run of whitespace to a single space.
///
/// # Examples
///
/// ```
/// use iamc_common::collapse_whitespace;
///
/// assert_eq!(collapse_whitespace("  Final   Energy\t| Gas "), "Final Energy | Gas");
/// assert_eq!(collapse_whitespace("   "), "");
/// ```
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cleans a column header: strips a UTF-8 byte order mark and surrounding
/// whitespace. Inner whitespace is kept so that configured column names
/// continue to match verbatim.
pub fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

/// Splits a pipe-delimited column list into trimmed component names.
///
/// ```
/// use iamc_common::split_components;
///
/// assert_eq!(split_components("sector | fuel"), vec!["sector", "fuel"]);
/// assert_eq!(split_components("sector"), vec!["sector"]);
/// ```
pub fn split_components(selector: &str) -> Vec<String> {
    selector.split('|').map(|part| part.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_strips_bom() {
        assert_eq!(normalize_header("\u{feff} region "), "region");
        assert_eq!(normalize_header("Source  Region"), "Source  Region");
    }

    #[test]
    fn components_keep_empty_parts() {
        assert_eq!(split_components("a||b"), vec!["a", "", "b"]);
    }
}

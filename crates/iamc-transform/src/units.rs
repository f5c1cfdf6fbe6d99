//! Unit string normalisation and validation.
//!
//! [`normalize_unit`] is total: it never fails and only fixes spelling.
//! [`validate_unit`] is a separate, optional check that reports which token
//! of a unit it does not understand.

use std::sync::LazyLock;

use iamc_model::CellValue;
use regex::Regex;

use crate::error::UnitValidationError;

/// Lookup key (spaces removed, lower-cased) to canonical spelling.
const SYNONYMS: &[(&str, &str)] = &[
    ("tco2", "t CO2"),
    ("tco2e", "t CO2e"),
    ("ktco2", "kt CO2"),
    ("mtco2", "Mt CO2"),
    ("gwh", "GWh"),
    ("mwh", "MWh"),
    ("kwh", "kWh"),
    ("eur", "EUR"),
    ("usd", "USD"),
    ("percent", "%"),
    ("%", "%"),
];

/// Canonicalises a unit string. Blank input gives `None`.
///
/// # Examples
///
/// ```
/// use iamc_transform::normalize_unit;
///
/// assert_eq!(normalize_unit("tCO2").as_deref(), Some("t CO2"));
/// assert_eq!(normalize_unit("GtCO2").as_deref(), Some("Gt CO2"));
/// assert_eq!(normalize_unit(" MWh ").as_deref(), Some("MWh"));
/// assert_eq!(normalize_unit("  "), None);
/// ```
pub fn normalize_unit(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let key: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    if let Some((_, canonical)) = SYNONYMS.iter().find(|(k, _)| *k == key) {
        return Some((*canonical).to_string());
    }

    let mut unit = trimmed.to_string();
    if key.ends_with("co2") && !unit.contains("CO2") {
        let lower = unit.to_lowercase();
        // Lower-casing can change byte lengths outside ASCII; only patch
        // when offsets line up.
        if lower.len() == unit.len()
            && let Some(pos) = lower.rfind("co2")
        {
            unit.replace_range(pos..pos + 3, "CO2");
            if pos > 0 && !unit.contains(' ') {
                unit.insert(pos, ' ');
            }
        }
    }
    Some(unit)
}

/// Normalises a unit cell. Only text cells carry units.
pub fn normalize_cell(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Text(s) => normalize_unit(s),
        _ => None,
    }
}

static UNIT_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<atom>[A-Za-zµ°%]+)(?:\^?(?P<exp>-?\d+))?$").expect("Invalid unit token regex")
});

/// Units accepted without a prefix only.
const PLAIN_UNITS: &[&str] = &[
    "%", "EUR", "USD", "°C", "yr", "year", "a", "d", "day", "h", "min", "ha", "toe", "tce",
    "Btu", "ton", "tonne", "bar", "cal",
];

/// Units that accept an SI prefix.
const PREFIXED_UNITS: &[&str] = &[
    "g", "t", "Wh", "W", "J", "eV", "m", "s", "l", "L", "K", "Pa", "N", "V", "A", "Hz", "mol",
    "VA", "var",
];

const SI_PREFIXES: &[&str] = &[
    "da", "y", "z", "a", "f", "p", "n", "µ", "u", "m", "c", "d", "h", "k", "M", "G", "T", "P", "E",
    "Z", "Y",
];

fn is_known_atom(atom: &str) -> bool {
    if PLAIN_UNITS.contains(&atom) || PREFIXED_UNITS.contains(&atom) {
        return true;
    }
    SI_PREFIXES.iter().any(|prefix| {
        atom.strip_prefix(prefix)
            .is_some_and(|rest| PREFIXED_UNITS.contains(&rest))
    })
}

/// Checks a unit against a small dimensional grammar: known units with
/// optional SI prefixes and integer exponents, combined with spaces, `*`,
/// `·` and `/`. Bare numbers are accepted as scale factors.
///
/// ```
/// use iamc_transform::validate_unit;
///
/// assert!(validate_unit("GWh/yr").is_ok());
/// assert!(validate_unit("kg*m^2/s2").is_ok());
/// assert!(validate_unit("t CO2").is_err());
/// ```
pub fn validate_unit(unit: &str) -> Result<(), UnitValidationError> {
    let trimmed = unit.trim();
    if trimmed.is_empty() {
        return Err(UnitValidationError::Empty);
    }
    let tokens = trimmed
        .split(|c: char| c.is_whitespace() || matches!(c, '/' | '*' | '·' | '(' | ')'))
        .filter(|t| !t.is_empty());
    for token in tokens {
        if token.parse::<f64>().is_ok() {
            continue;
        }
        let known = UNIT_TOKEN
            .captures(token)
            .and_then(|caps| caps.name("atom"))
            .is_some_and(|atom| is_known_atom(atom.as_str()));
        if !known {
            return Err(UnitValidationError::UnknownToken {
                unit: trimmed.to_string(),
                token: token.to_string(),
            });
        }
    }
    Ok(())
}

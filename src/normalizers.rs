//! Facility and region identifier handling.
//!
//! Market operators publish short uppercase unit codes ("PPP1", "BARRON-1").
//! Everything caller-supplied that ends up inside generated query text goes
//! through [`normalize_code`] and [`quote_literal`] first; this module is the
//! sole injection-safety boundary of the generator.

/// Canonical form of a facility or region code: uppercase, no whitespace.
///
/// Punctuation is left alone ("BARRON-1" stays "BARRON-1"); safety is the
/// quoting step's job, not this one's.
pub fn normalize_code(raw: &str) -> String {
    raw.chars()
        .filter(|ch| !ch.is_whitespace())
        .flat_map(|ch| ch.to_uppercase())
        .collect()
}

/// Normalizes a caller-supplied code set: canonical form, empties dropped,
/// sorted, deduplicated. Sorting here is what gives facility-scoped output
/// its stable facility ordering.
pub fn normalize_code_set(raw: &[String]) -> Vec<String> {
    let mut codes: Vec<String> = raw
        .iter()
        .map(|code| normalize_code(code))
        .filter(|code| !code.is_empty())
        .collect();
    codes.sort();
    codes.dedup();
    codes
}

/// Wraps a value as a single-quoted literal, doubling embedded quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Renders a code set as a comma-separated list of quoted literals, ready
/// for an `IN (...)` clause.
pub fn quoted_code_list(codes: &[String]) -> String {
    codes
        .iter()
        .map(|code| quote_literal(code))
        .collect::<Vec<_>>()
        .join(", ")
}

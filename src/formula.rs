//! Chemical-formula parsing and duplicate screening.
//!
//! Two structures with formulas that are integer multiples of one another
//! (`"C4H8O2"` vs `"C8H16O4"`) are duplicate candidates: the larger cell is
//! usually a supercell of the smaller. Parsing accepts both packed
//! (`"C4H8"`) and spaced (`"C4 H8"`) formula sums.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([A-Z][a-z]*)(\d*)").unwrap())
}

/// Parse a formula into (element, count) pairs in appearance order.
/// A missing count means 1.
pub fn parse_formula(formula: &str) -> Vec<(String, u32)> {
    token_re()
        .captures_iter(formula)
        .map(|cap| {
            let count = cap[2].parse::<u32>().unwrap_or(1);
            (cap[1].to_string(), count)
        })
        .collect()
}

/// Is `other` an integer multiple of `base`?
///
/// Both must contain exactly the same element set, and every element's count
/// ratio must equal the same whole number (1 counts: reordered but equal
/// formulas are multiples too).
pub fn is_multiple(base: &str, other: &str) -> bool {
    let base = parse_formula(base);
    let other = parse_formula(other);
    if base.is_empty() || other.is_empty() {
        return false;
    }

    let base_map: HashMap<&str, u32> = base.iter().map(|(el, n)| (el.as_str(), *n)).collect();
    let other_map: HashMap<&str, u32> = other.iter().map(|(el, n)| (el.as_str(), *n)).collect();
    if base_map.len() != base.len() || other_map.len() != other.len() {
        return false; // repeated element token, not a plain formula sum
    }

    let base_keys: std::collections::HashSet<&str> = base_map.keys().copied().collect();
    let other_keys: std::collections::HashSet<&str> = other_map.keys().copied().collect();
    if base_keys != other_keys {
        return false;
    }

    let (first_el, first_count) = &other[0];
    let base_first = base_map[first_el.as_str()];
    if base_first == 0 || first_count % base_first != 0 {
        return false;
    }
    let ratio = first_count / base_first;

    other_map.iter().all(|(el, count)| {
        let b = base_map[el];
        b != 0 && count % b == 0 && count / b == ratio
    })
}

/// All formulas in `formulas` that are multiples of `formula`, skipping the
/// identical string itself.
pub fn find_multiples<'a>(formula: &str, formulas: &'a [String]) -> Vec<&'a str> {
    formulas
        .iter()
        .filter(|other| other.as_str() != formula)
        .filter(|other| is_multiple(formula, other))
        .map(|s| s.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_packed_and_spaced_formulas() {
        assert_eq!(
            parse_formula("C4H8O2"),
            vec![
                ("C".to_string(), 4),
                ("H".to_string(), 8),
                ("O".to_string(), 2)
            ]
        );
        assert_eq!(
            parse_formula("C4 H8 Zn2"),
            vec![
                ("C".to_string(), 4),
                ("H".to_string(), 8),
                ("Zn".to_string(), 2)
            ]
        );
        assert_eq!(parse_formula("CH"), vec![("C".to_string(), 1), ("H".to_string(), 1)]);
    }

    #[test]
    fn detects_integer_multiples() {
        assert!(is_multiple("C4H8O2", "C8H16O4"));
        assert!(is_multiple("C4H8O2", "C12H24O6"));
        assert!(!is_multiple("C4H8O2", "C8H16O5"));
        assert!(!is_multiple("C4H8O2", "C8H16"));
    }

    #[test]
    fn inconsistent_ratios_are_rejected() {
        // Doubled C but tripled H.
        assert!(!is_multiple("C2H2", "C4H6"));
    }

    #[test]
    fn reordered_equal_formulas_count_as_multiples() {
        assert!(is_multiple("C4 H8", "H8 C4"));
    }

    #[test]
    fn find_multiples_skips_identical_string() {
        let formulas = vec![
            "C4H8O2".to_string(),
            "C8H16O4".to_string(),
            "C2H6".to_string(),
        ];
        let hits = find_multiples("C4H8O2", &formulas);
        assert_eq!(hits, vec!["C8H16O4"]);
    }
}

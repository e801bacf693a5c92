//! Address normalization.
//!
//! Rewrites free-text addresses into the canonical form sent to the geocoder.
//! Every rule runs over the output of the previous one, so the order of the
//! correction table is observable.

mod rules;

pub use rules::{default_corrections, CorrectionRule};

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use rules::TITLE_ABBREVIATIONS;

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([^)]*\)\s*").expect("valid parenthetical regex"));
static LEADING_AVENUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^AV(?:\.|\s)\s*").expect("valid avenue regex"));
static INTERSECTION_Y: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\sY\s").expect("valid intersection regex"));

/// Rewrites raw addresses using an ordered correction table.
#[derive(Debug, Clone)]
pub struct AddressNormalizer {
    corrections: Vec<CorrectionRule>,
}

impl AddressNormalizer {
    pub fn new(corrections: Vec<CorrectionRule>) -> Self {
        Self { corrections }
    }

    pub fn corrections(&self) -> &[CorrectionRule] {
        &self.corrections
    }

    /// Normalize a raw address. Never fails; blank input yields an empty string.
    pub fn normalize(&self, raw: &str) -> String {
        let upper = raw.to_uppercase();

        let corrected = self
            .corrections
            .iter()
            .fold(upper, |acc, rule| rule.apply(acc));

        let without_notes = PARENTHETICAL.replace_all(&corrected, " ");
        let with_avenue = LEADING_AVENUE.replace(&without_notes, "Avenida ");

        let expanded = TITLE_ABBREVIATIONS
            .iter()
            .fold(with_avenue.into_owned(), |acc, (from, to)| {
                acc.replacen(from, to, 1)
            });

        // Cross streets are joined with "E" by the geocoder convention
        let joined = INTERSECTION_Y.replace_all(&expanded, " E ");

        let cleaned = keep_letters_and_digits(&joined);

        let normalized = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
        debug!("Normalized '{}' -> '{}'", raw, normalized);
        normalized
    }
}

/// Keep ASCII letters, digits and whitespace. Accented letters fold to their
/// base letter; every other symbol is dropped, never transliterated.
fn keep_letters_and_digits(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii_alphanumeric() || c.is_whitespace() {
            out.push(c);
        } else if c.is_alphabetic() {
            if let Some(folded) = deunicode::deunicode_char(c) {
                out.extend(folded.chars().filter(char::is_ascii_alphabetic));
            }
        }
    }
    out
}

impl Default for AddressNormalizer {
    fn default() -> Self {
        Self::new(default_corrections())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(raw: &str) -> String {
        AddressNormalizer::default().normalize(raw)
    }

    #[test]
    fn test_avenue_with_parenthetical() {
        assert_eq!(
            normalize("av. San Martin 1500 (e/ Cabildo)"),
            "Avenida San Martin 1500"
        );
    }

    #[test]
    fn test_avenue_without_dot() {
        assert_eq!(normalize("Av Corrientes 348"), "Avenida Corrientes 348");
    }

    #[test]
    fn test_avenue_prefix_needs_separator() {
        assert_eq!(normalize("Avellaneda 100"), "AVELLANEDA 100");
    }

    #[test]
    fn test_title_abbreviations() {
        assert_eq!(normalize("gral. paz 1200"), "General PAZ 1200");
        assert_eq!(normalize("Pte. Peron 50"), "Presidente PERON 50");
        assert_eq!(normalize("cnel. diaz 10"), "Coronel DIAZ 10");
    }

    #[test]
    fn test_intersection_joined_with_e() {
        assert_eq!(normalize("Rivadavia y Callao"), "Rivadavia E CALLAO");
    }

    #[test]
    fn test_accents_folded_not_dropped() {
        assert_eq!(normalize("pueyrredon 900"), "Pueyrredon 900");
        assert_eq!(normalize("Nuñez 2000"), "NUNEZ 2000");
    }

    #[test]
    fn test_symbols_dropped_not_transliterated() {
        assert_eq!(normalize("Rivadavia N° 1234"), "Rivadavia N 1234");
        assert_eq!(normalize("Boedo 12½"), "BOEDO 12");
        assert_eq!(normalize("Boedo € 12"), "BOEDO 12");
    }

    #[test]
    fn test_punctuation_removed_and_whitespace_collapsed() {
        assert_eq!(normalize("  Juan B. Justo,   4000!! "), "Juan B Justo 4000");
    }

    #[test]
    fn test_blank_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t "), "");
    }

    #[test]
    fn test_correction_order_is_observable() {
        let forward = AddressNormalizer::new(vec![
            CorrectionRule::new("SANTA FE", "Santa Fe"),
            CorrectionRule::new("FE", "Fecha"),
        ]);
        let reversed = AddressNormalizer::new(vec![
            CorrectionRule::new("FE", "Fecha"),
            CorrectionRule::new("SANTA FE", "Santa Fe"),
        ]);
        assert_eq!(forward.normalize("santa fe 100"), "Santa Fe 100");
        assert_eq!(reversed.normalize("santa fe 100"), "SANTA Fecha 100");
    }

    #[test]
    fn test_second_pass_equal_ignoring_case() {
        for raw in ["San Martin 1500", "CORRIENTES 348", "Cabildo y Juramento", "Boedo 12"] {
            let once = normalize(raw);
            let twice = normalize(&once);
            assert_eq!(once.to_uppercase(), twice.to_uppercase(), "input: {}", raw);
        }
    }
}

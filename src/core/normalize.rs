//! Word normalization
//!
//! Lookups are keyed on a lower-cased form with combining diacritical marks
//! removed, so "vovó" and "vovo" resolve identically.

use once_cell::sync::Lazy;
use std::collections::HashSet;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Grammatical tokens skipped when a multi-word phrase is split
const STOP_TOKENS: &[&str] = &["de", "da", "do", "a", "o", "à"];

static STOP_SET: Lazy<HashSet<String>> =
    Lazy::new(|| STOP_TOKENS.iter().map(|t| normalize(t)).collect());

/// Lower-case a token and strip combining marks after canonical decomposition.
///
/// Lower-casing happens first: some characters (e.g. `İ`) lower-case into a
/// base letter plus a combining mark, which the decomposition pass then drops.
pub fn normalize(word: &str) -> String {
    let stripped: String = word
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    stripped.trim().to_string()
}

/// Whether a token belongs to the fixed stop-token set (compared normalized)
pub fn is_stop_token(token: &str) -> bool {
    STOP_SET.contains(&normalize(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_diacritics() {
        assert_eq!(normalize("água"), "agua");
        assert_eq!(normalize("vovó"), "vovo");
        assert_eq!(normalize("Coração"), "coracao");
        assert_eq!(normalize("PÃO"), "pao");
    }

    #[test]
    fn test_normalize_equivalent_forms() {
        assert_eq!(normalize("vovó"), normalize("vovo"));
        // precomposed vs decomposed input
        assert_eq!(normalize("\u{00e9}"), normalize("e\u{0301}"));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for w in ["água", "  Maçã ", "İstanbul", "ÉCOLE", "xklqz", "", "à", "pão de queijo"] {
            let once = normalize(w);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", w);
        }
    }

    #[test]
    fn test_normalize_trims() {
        assert_eq!(normalize("  bola \n"), "bola");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_stop_tokens() {
        assert!(is_stop_token("de"));
        assert!(is_stop_token("à"));
        assert!(is_stop_token("A"));
        assert!(!is_stop_token("pao"));
        assert!(!is_stop_token("dor"));
    }
}

//! Canonical form of free-text place descriptions.
//!
//! The canonical form is used as a storage key, so the rules here must stay
//! bit-exact across every implementation that shares a database:
//!
//! 1. every `;` becomes `,`
//! 2. exactly one space follows every comma
//! 3. runs of spaces collapse to a single space
//! 4. leading and trailing spaces and commas are trimmed
//!
//! Only the ASCII space (U+0020) counts as whitespace.

/// Returns the canonical form of a place description.
///
/// An empty result means the input is not a usable key.
///
/// # Examples
///
/// ```
/// use refdata_core::places::canonicalize;
///
/// assert_eq!(canonicalize("London; England"), "London, England");
/// assert_eq!(canonicalize("London,  England"), "London, England");
/// assert_eq!(canonicalize("  , "), "");
/// ```
pub fn canonicalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);

    for ch in text.chars() {
        match ch {
            ',' | ';' => out.push_str(", "),
            ' ' => {
                if !out.ends_with(' ') {
                    out.push(' ');
                }
            }
            _ => out.push(ch),
        }
    }

    out.trim_matches(|c| c == ' ' || c == ',').to_string()
}

/// Returns the case-folded storage key for an already canonical description.
///
/// Two descriptions that differ only in letter case share a key.
pub fn description_key(canonical: &str) -> String {
    canonical.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_semicolon_becomes_comma() {
        assert_eq!(canonicalize("Amsterdam;Holland"), "Amsterdam, Holland");
    }

    #[test]
    fn test_single_space_after_comma() {
        assert_eq!(canonicalize("Delft,Holland"), "Delft, Holland");
        assert_eq!(canonicalize("Delft,    Holland"), "Delft, Holland");
    }

    #[test]
    fn test_space_before_comma_is_kept() {
        assert_eq!(canonicalize("Delft , Holland"), "Delft , Holland");
    }

    #[test]
    fn test_repeated_commas_each_get_a_space() {
        assert_eq!(canonicalize("Delft,,Holland"), "Delft, , Holland");
    }

    #[test]
    fn test_collapses_space_runs() {
        assert_eq!(canonicalize("Den   Haag"), "Den Haag");
    }

    #[test]
    fn test_trims_spaces_and_commas() {
        assert_eq!(canonicalize(" ,Haarlem, "), "Haarlem");
        assert_eq!(canonicalize("Haarlem;;"), "Haarlem");
    }

    #[test]
    fn test_blank_input_is_empty() {
        assert_eq!(canonicalize(""), "");
        assert_eq!(canonicalize("    "), "");
        assert_eq!(canonicalize(" ; , "), "");
    }

    #[test]
    fn test_other_whitespace_is_preserved() {
        assert_eq!(canonicalize("Den\tHaag"), "Den\tHaag");
    }

    #[test]
    fn test_london_variants_share_a_key() {
        let a = canonicalize("London; England");
        let b = canonicalize("London,  England");
        assert_eq!(a, b);
        assert_eq!(description_key(&a), description_key(&canonicalize("LONDON,england")));
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "",
            " ",
            ",",
            ";;",
            "London; England",
            "  Paris ,  ,France ;",
            "a,b;c , d  ;  e",
            "Zürich ; Schweiz",
            "x , , , y",
            "Sint-Oedenrode,,Noord-Brabant",
            "\t tab, spaced ",
        ];
        for input in inputs {
            let once = canonicalize(input);
            assert_eq!(canonicalize(&once), once, "not idempotent for {input:?}");
        }
    }

    fn is_trimmed(text: &str) -> bool {
        let edge = |c: char| c == ' ' || c == ',';
        !text.starts_with(edge) && !text.ends_with(edge)
    }

    proptest! {
        #[test]
        fn canonicalize_is_idempotent(text in any::<String>()) {
            let once = canonicalize(&text);
            prop_assert_eq!(canonicalize(&once), once.clone());
            prop_assert!(is_trimmed(&once));
        }

        #[test]
        fn canonicalize_is_idempotent_on_separators(text in "[a-z ,;\t]{0,40}") {
            let once = canonicalize(&text);
            prop_assert_eq!(canonicalize(&once), once.clone());
            prop_assert!(is_trimmed(&once));
            prop_assert!(!once.contains("  "));
            prop_assert!(!once.contains(';'));
        }
    }

    #[test]
    fn test_description_key_folds_case() {
        assert_eq!(description_key("Zürich, Schweiz"), "ZÜRICH, SCHWEIZ");
    }
}

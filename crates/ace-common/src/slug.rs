//! Canonical KPI identifier derivation.
//!
//! When a KPI is created without an explicit identifier, one is derived
//! from its display name. The rule is deliberately the single source of
//! truth: lowercase, internal whitespace collapsed to a single `-`, and
//! every character outside `[a-z0-9_-]` stripped.

/// Derives a KPI identifier from a display name.
///
/// # Examples
///
/// ```
/// use ace_common::slug::derive_identifier;
///
/// assert_eq!(derive_identifier("Branch Wait Time"), "branch-wait-time");
/// assert_eq!(derive_identifier("ATM/Downtime!"), "atmdowntime");
/// assert_eq!(derive_identifier("  FX   Exposure  "), "fx-exposure");
/// ```
pub fn derive_identifier(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_sep = false;
    for ch in lowered.chars() {
        if ch.is_whitespace() {
            pending_sep = !out.is_empty();
            continue;
        }
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' || ch == '-' {
            if pending_sep {
                out.push('-');
                pending_sep = false;
            }
            out.push(ch);
        }
        // Anything else (punctuation, symbols, non-ASCII) is dropped.
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_collapses_to_single_dash() {
        assert_eq!(derive_identifier("Branch Wait Time"), "branch-wait-time");
        assert_eq!(derive_identifier("Branch   Wait\tTime"), "branch-wait-time");
    }

    #[test]
    fn punctuation_is_stripped() {
        assert_eq!(derive_identifier("ATM/Downtime!"), "atmdowntime");
        assert_eq!(derive_identifier("Liquidity (Ratio)"), "liquidity-ratio");
    }

    #[test]
    fn existing_separators_survive() {
        assert_eq!(derive_identifier("fx_exposure-v2"), "fx_exposure-v2");
    }

    #[test]
    fn leading_and_trailing_whitespace_ignored() {
        assert_eq!(derive_identifier("  FX Exposure  "), "fx-exposure");
    }

    #[test]
    fn empty_name_yields_empty_identifier() {
        assert_eq!(derive_identifier(""), "");
        assert_eq!(derive_identifier("!!!"), "");
    }
}

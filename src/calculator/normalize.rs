//! Formula normalization applied before parsing.
//!
//! Selected text tends to carry things a parser chokes on: line breaks from
//! multi-line selections, typographic operators, zero-padded numbers copied
//! out of tables. This module rewrites exactly those and leaves everything
//! else alone.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    /// Runs of line-break characters.
    static ref LINE_BREAKS: Regex = Regex::new(r"[\r\n]+").unwrap();

    /// Hex literals (kept verbatim) or zero-padded integer literals.
    /// The hex branch comes first so `0x0F` is consumed whole.
    static ref PADDED_NUMBER: Regex = Regex::new(
        r"\b0[xX][0-9a-fA-F]+\b|\b0+(\d+)\b"
    ).unwrap();
}

/// Normalize a raw formula into a form suitable for evaluation.
///
/// - each run of `\n`/`\r` becomes a single space
/// - `×` becomes `*` and `÷` becomes `/`
/// - leading zeros are stripped from integer literals (`007` → `7`), unless
///   the literal follows a digit or a decimal point
/// - hexadecimal literals are never touched
pub fn normalize(formula: &str) -> String {
    let formula = LINE_BREAKS.replace_all(formula, " ");
    let formula = formula.replace('×', "*").replace('÷', "/");

    PADDED_NUMBER
        .replace_all(&formula, |caps: &Captures| {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            let Some(digits) = caps.get(1) else {
                return whole.to_string();
            };
            let start = caps.get(0).map_or(0, |m| m.start());
            let preceded_by_number = formula[..start]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_digit() || c == '.');
            if preceded_by_number {
                whole.to_string()
            } else {
                digits.as_str().to_string()
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_is_preserved() {
        assert_eq!(normalize("0x1F + 007"), "0x1F + 7");
        assert_eq!(normalize("0X00ff"), "0X00ff");
    }

    #[test]
    fn test_line_breaks_collapse() {
        assert_eq!(normalize("3\n+\r4"), "3 + 4");
        assert_eq!(normalize("1\r\n\r\n+ 2"), "1 + 2");
    }

    #[test]
    fn test_locale_operators() {
        assert_eq!(normalize("5×6÷2"), "5*6/2");
    }

    #[test]
    fn test_leading_zeros() {
        assert_eq!(normalize("000"), "0");
        assert_eq!(normalize("0012 * 02"), "12 * 2");
        assert_eq!(normalize("00.5"), "0.5");
    }

    #[test]
    fn test_fractions_untouched() {
        assert_eq!(normalize("3.007"), "3.007");
        assert_eq!(normalize("0.5 + 1.05"), "0.5 + 1.05");
    }

    #[test]
    fn test_identifiers_untouched() {
        assert_eq!(normalize("log10(100)"), "log10(100)");
        assert_eq!(normalize("x007"), "x007");
        assert_eq!(normalize("'a b'"), "'a b'");
    }
}

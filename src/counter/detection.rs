//! Seed sniffing for sequence generation.
//!
//! Determines which counter format the first selection's text uses.
//! Patterns are tried in order and must match the whole seed.

use lazy_static::lazy_static;
use num_bigint::BigInt;
use regex::Regex;
use tracing::debug;

use super::{Counter, LetterCase, Sign};

lazy_static! {
    static ref HEX: Regex = Regex::new(r"^0[xX][0-9a-fA-F]+$").unwrap();

    /// `017` and `0o17` both count in octal; a lone `0` is decimal.
    static ref OCTAL: Regex = Regex::new(r"^0[oO]?[0-7]+$").unwrap();

    static ref INTEGER: Regex = Regex::new(r"^[+-]?[0-9]+$").unwrap();

    static ref LOWER: Regex = Regex::new(r"^[a-z]+$").unwrap();

    static ref UPPER: Regex = Regex::new(r"^[A-Z]+$").unwrap();

    static ref SIGNS: Regex = Regex::new(r"^[+-]+$").unwrap();
}

/// Pick the counter for `seed`.
///
/// Text matching no format (mixed-case letters, decimals, anything else)
/// counts up in decimal from `start_index`.
pub fn detect(seed: &str, start_index: i64) -> Counter {
    let counter = sniff(seed).unwrap_or_else(|| Counter::Integer(BigInt::from(start_index)));
    debug!(seed, kind = counter.kind(), "detected sequence format");
    counter
}

fn sniff(seed: &str) -> Option<Counter> {
    if HEX.is_match(seed) {
        return BigInt::parse_bytes(seed[2..].as_bytes(), 16).map(Counter::Hex);
    }
    if OCTAL.is_match(seed) {
        let digits = seed[1..].trim_start_matches(['o', 'O']);
        return BigInt::parse_bytes(digits.as_bytes(), 8).map(Counter::Octal);
    }
    if INTEGER.is_match(seed) {
        return seed.parse().ok().map(Counter::Integer);
    }
    if LOWER.is_match(seed) || UPPER.is_match(seed) {
        let case = if LOWER.is_match(seed) {
            LetterCase::Lower
        } else {
            LetterCase::Upper
        };
        return Some(Counter::Alpha {
            letters: seed.as_bytes().to_vec(),
            case,
        });
    }
    if SIGNS.is_match(seed) {
        let sign = if seed.starts_with('-') {
            Sign::Minus
        } else {
            Sign::Plus
        };
        return Some(Counter::Toggle(sign));
    }
    None
}

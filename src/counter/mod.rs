//! Sequence generators used to fill multiple selections.
//!
//! A [`Counter`] is sniffed once from the text of the first selection and
//! then yields one value per selection. Each variant keeps the *next* value
//! to emit, so the first call returns the seed itself.

mod detection;

pub use detection::detect;

use num_bigint::BigInt;

/// Letter case an alphabetic counter is locked to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LetterCase {
    Lower,
    Upper,
}

impl LetterCase {
    fn first(self) -> u8 {
        match self {
            Self::Lower => b'a',
            Self::Upper => b'A',
        }
    }

    fn last(self) -> u8 {
        match self {
            Self::Lower => b'z',
            Self::Upper => b'Z',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sign {
    Plus,
    Minus,
}

impl Sign {
    pub fn as_char(self) -> char {
        match self {
            Self::Plus => '+',
            Self::Minus => '-',
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::Plus => Self::Minus,
            Self::Minus => Self::Plus,
        }
    }
}

/// An infinite, forward-only sequence of formatted values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Counter {
    /// Plain decimal, `-1`, `0`, `1`... of any width.
    Integer(BigInt),
    /// `0x` followed by lowercase hex digits, no padding.
    Hex(BigInt),
    /// A single leading `0` followed by octal digits.
    Octal(BigInt),
    /// Odometer over ASCII letters of one case.
    Alpha { letters: Vec<u8>, case: LetterCase },
    /// Strictly alternating `+` and `-`.
    Toggle(Sign),
}

impl Counter {
    /// Short name of the sequence format, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Hex(_) => "hex",
            Self::Octal(_) => "octal",
            Self::Alpha { .. } => "alpha",
            Self::Toggle(_) => "toggle",
        }
    }

    /// Render the current value.
    fn current(&self) -> String {
        match self {
            Self::Integer(n) => n.to_string(),
            Self::Hex(n) => format!("0x{n:x}"),
            Self::Octal(n) => format!("0{n:o}"),
            Self::Alpha { letters, .. } => letters.iter().copied().map(char::from).collect(),
            Self::Toggle(sign) => sign.as_char().to_string(),
        }
    }

    fn step(&mut self) {
        match self {
            Self::Integer(n) | Self::Hex(n) | Self::Octal(n) => *n += 1u32,
            Self::Alpha { letters, case } => increment_letters(letters, *case),
            Self::Toggle(sign) => *sign = sign.flipped(),
        }
    }

    /// Emit the current value and move to the next one.
    pub fn advance(&mut self) -> String {
        let value = self.current();
        self.step();
        value
    }
}

impl Iterator for Counter {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        Some(self.advance())
    }
}

/// Increment the last letter, carrying leftwards; a carry out of the
/// leftmost letter prepends a new one (`zz` -> `aaa`).
fn increment_letters(letters: &mut Vec<u8>, case: LetterCase) {
    for letter in letters.iter_mut().rev() {
        if *letter < case.last() {
            *letter += 1;
            return;
        }
        *letter = case.first();
    }
    letters.insert(0, case.first());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn take(seed: &str, count: usize) -> Vec<String> {
        detect(seed, 1).take(count).collect()
    }

    #[test]
    fn test_first_value_is_the_seed() {
        assert_eq!(take("7", 3), ["7", "8", "9"]);
        assert_eq!(take("-2", 4), ["-2", "-1", "0", "1"]);
    }

    #[test]
    fn test_hex_counter() {
        assert_eq!(take("0xFF", 3), ["0xff", "0x100", "0x101"]);
        assert_eq!(take("0x9", 2), ["0x9", "0xa"]);
    }

    #[test]
    fn test_octal_counter() {
        assert_eq!(take("017", 3), ["017", "020", "021"]);
        assert_eq!(take("0o7", 2), ["07", "010"]);
    }

    #[test]
    fn test_alpha_counter() {
        assert_eq!(take("az", 2), ["az", "ba"]);
        assert_eq!(take("zz", 2), ["zz", "aaa"]);
        assert_eq!(take("AZ", 2), ["AZ", "BA"]);
        assert_eq!(take("ZZ", 2), ["ZZ", "AAA"]);
        assert_eq!(take("x", 4), ["x", "y", "z", "aa"]);
    }

    #[test]
    fn test_toggle_counter() {
        assert_eq!(take("-", 4), ["-", "+", "-", "+"]);
        assert_eq!(take("+-+", 3), ["+", "-", "+"]);
    }

    #[test]
    fn test_counters_run_past_64_bits() {
        assert_eq!(
            take("9223372036854775807", 2),
            ["9223372036854775807", "9223372036854775808"]
        );
        assert_eq!(
            take("0xffffffffffffffff", 2),
            ["0xffffffffffffffff", "0x10000000000000000"]
        );
        assert_eq!(
            take("0x1ffffffffffffffff", 2),
            ["0x1ffffffffffffffff", "0x20000000000000000"]
        );
        assert_eq!(
            take("01777777777777777777777", 2),
            ["01777777777777777777777", "02000000000000000000000"]
        );
    }

    #[test]
    fn test_advance_matches_iterator() {
        let mut counter = Counter::Hex(BigInt::from(0xff));
        assert_eq!(counter.advance(), "0xff");
        assert_eq!(counter.next().as_deref(), Some("0x100"));
        assert_eq!(counter.kind(), "hex");
    }
}

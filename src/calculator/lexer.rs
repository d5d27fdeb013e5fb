//! Tokenizer for the formula language.

use num_bigint::BigInt;

use super::error::CalcError;

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Int(i64),
    /// Integer literal outside the 64-bit range.
    BigInt(BigInt),
    Float(f64),
    Str(String),
    Name(String),
    // keywords
    And,
    Or,
    Not,
    In,
    If,
    Else,
    True,
    False,
    None,
    // punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Colon,
    // operators
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Tilde,
    Shl,
    Shr,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    NotEq,
    Assign,
    Eof,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// 1-based character column of the token start.
    pub column: usize,
}

/// Split a formula into tokens, ending with [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> Result<Vec<Token>, CalcError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let c = chars[pos];
        let column = pos + 1;

        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        if c.is_ascii_digit() || (c == '.' && chars.get(pos + 1).is_some_and(|d| d.is_ascii_digit())) {
            let (kind, next) = lex_number(&chars, pos)?;
            tokens.push(Token { kind, column });
            pos = next;
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let start = pos;
            while pos < chars.len() && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                pos += 1;
            }
            let word: String = chars[start..pos].iter().collect();
            tokens.push(Token {
                kind: keyword(&word).unwrap_or(TokenKind::Name(word)),
                column,
            });
            continue;
        }

        if c == '\'' || c == '"' {
            let (text, next) = lex_string(&chars, pos)?;
            tokens.push(Token {
                kind: TokenKind::Str(text),
                column,
            });
            pos = next;
            continue;
        }

        let two: String = chars[pos..chars.len().min(pos + 2)].iter().collect();
        let double = match two.as_str() {
            "**" => Some(TokenKind::DoubleStar),
            "//" => Some(TokenKind::DoubleSlash),
            "<<" => Some(TokenKind::Shl),
            ">>" => Some(TokenKind::Shr),
            "<=" => Some(TokenKind::Le),
            ">=" => Some(TokenKind::Ge),
            "==" => Some(TokenKind::EqEq),
            "!=" => Some(TokenKind::NotEq),
            _ => None,
        };
        if let Some(kind) = double {
            tokens.push(Token { kind, column });
            pos += 2;
            continue;
        }

        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '&' => TokenKind::Amp,
            '|' => TokenKind::Pipe,
            '^' => TokenKind::Caret,
            '~' => TokenKind::Tilde,
            '<' => TokenKind::Lt,
            '>' => TokenKind::Gt,
            '=' => TokenKind::Assign,
            other => {
                return Err(CalcError::syntax(
                    format!("invalid character '{other}'"),
                    column,
                ));
            }
        };
        tokens.push(Token { kind, column });
        pos += 1;
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        column: chars.len() + 1,
    });
    Ok(tokens)
}

fn keyword(word: &str) -> Option<TokenKind> {
    Some(match word {
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        "in" => TokenKind::In,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "True" => TokenKind::True,
        "False" => TokenKind::False,
        "None" => TokenKind::None,
        _ => return None,
    })
}

fn lex_number(chars: &[char], start: usize) -> Result<(TokenKind, usize), CalcError> {
    let column = start + 1;
    let mut pos = start;

    // Prefixed integer literals: 0x.., 0o.., 0b..
    if chars[pos] == '0' {
        let radix = match chars.get(pos + 1) {
            Some('x' | 'X') => Some(16),
            Some('o' | 'O') => Some(8),
            Some('b' | 'B') => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            pos += 2;
            let digits_start = pos;
            while pos < chars.len() && (chars[pos].is_ascii_alphanumeric() || chars[pos] == '_') {
                pos += 1;
            }
            let digits: String = chars[digits_start..pos]
                .iter()
                .filter(|c| **c != '_')
                .collect();
            let kind = integer_token(&digits, radix).ok_or_else(|| {
                CalcError::syntax(format!("invalid base-{radix} literal"), column)
            })?;
            return Ok((kind, pos));
        }
    }

    let mut is_float = false;
    while pos < chars.len() && (chars[pos].is_ascii_digit() || chars[pos] == '_') {
        pos += 1;
    }
    if pos < chars.len() && chars[pos] == '.' {
        is_float = true;
        pos += 1;
        while pos < chars.len() && (chars[pos].is_ascii_digit() || chars[pos] == '_') {
            pos += 1;
        }
    }
    if pos < chars.len() && matches!(chars[pos], 'e' | 'E') {
        let mut lookahead = pos + 1;
        if lookahead < chars.len() && matches!(chars[lookahead], '+' | '-') {
            lookahead += 1;
        }
        if lookahead < chars.len() && chars[lookahead].is_ascii_digit() {
            is_float = true;
            pos = lookahead;
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
        }
    }
    if pos < chars.len() && (chars[pos].is_alphabetic() || chars[pos] == '_') {
        return Err(CalcError::syntax("invalid decimal literal", column));
    }

    let text: String = chars[start..pos].iter().filter(|c| **c != '_').collect();
    let kind = if is_float {
        TokenKind::Float(
            text.parse()
                .map_err(|_| CalcError::syntax("invalid float literal", column))?,
        )
    } else {
        integer_token(&text, 10)
            .ok_or_else(|| CalcError::syntax("invalid integer literal", column))?
    };
    Ok((kind, pos))
}

fn integer_token(digits: &str, radix: u32) -> Option<TokenKind> {
    if let Ok(value) = i64::from_str_radix(digits, radix) {
        return Some(TokenKind::Int(value));
    }
    BigInt::parse_bytes(digits.as_bytes(), radix).map(TokenKind::BigInt)
}

fn lex_string(chars: &[char], start: usize) -> Result<(String, usize), CalcError> {
    let quote = chars[start];
    let mut pos = start + 1;
    let mut text = String::new();

    while pos < chars.len() {
        match chars[pos] {
            c if c == quote => return Ok((text, pos + 1)),
            '\\' => {
                let escaped = chars.get(pos + 1).copied().ok_or_else(|| {
                    CalcError::syntax("unterminated string literal", start + 1)
                })?;
                match escaped {
                    'n' => text.push('\n'),
                    't' => text.push('\t'),
                    'r' => text.push('\r'),
                    '0' => text.push('\0'),
                    '\\' | '\'' | '"' => text.push(escaped),
                    other => {
                        text.push('\\');
                        text.push(other);
                    }
                }
                pos += 2;
            }
            c => {
                text.push(c);
                pos += 1;
            }
        }
    }

    Err(CalcError::syntax("unterminated string literal", start + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("12 0x1f 0o17 0b101 1.5 .5 2e3 1_000"),
            vec![
                TokenKind::Int(12),
                TokenKind::Int(31),
                TokenKind::Int(15),
                TokenKind::Int(5),
                TokenKind::Float(1.5),
                TokenKind::Float(0.5),
                TokenKind::Float(2000.0),
                TokenKind::Int(1000),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_wide_integer_literals() {
        let wide: BigInt = "18446744073709551616".parse().unwrap();
        assert_eq!(
            kinds("18446744073709551616 0x10000000000000000 9223372036854775807"),
            vec![
                TokenKind::BigInt(wide.clone()),
                TokenKind::BigInt(wide),
                TokenKind::Int(i64::MAX),
                TokenKind::Eof,
            ]
        );
        assert!(tokenize("0x").unwrap_err().is_syntax());
        assert!(tokenize("0b102").unwrap_err().is_syntax());
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("a**b // c != d"),
            vec![
                TokenKind::Name("a".to_string()),
                TokenKind::DoubleStar,
                TokenKind::Name("b".to_string()),
                TokenKind::DoubleSlash,
                TokenKind::Name("c".to_string()),
                TokenKind::NotEq,
                TokenKind::Name("d".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_strings_and_keywords() {
        assert_eq!(
            kinds(r#"'it\'s' "x" not None"#),
            vec![
                TokenKind::Str("it's".to_string()),
                TokenKind::Str("x".to_string()),
                TokenKind::Not,
                TokenKind::None,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_errors_carry_column() {
        let err = tokenize("1 + $").unwrap_err();
        assert_eq!(
            err,
            CalcError::Syntax {
                message: "invalid character '$'".to_string(),
                column: 5
            }
        );
        assert!(tokenize("'open").is_err());
        assert!(tokenize("12abc").is_err());
    }
}

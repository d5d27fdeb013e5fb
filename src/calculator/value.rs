//! Runtime values produced by the interpreter.

use std::cmp::Ordering;
use std::fmt;

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use super::error::EvalError;
use super::namespace::Builtin;

/// A dynamically typed formula value.
#[derive(Clone, Debug)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    /// Integer outside the `i64` range; [`Value::from_bigint`] keeps it that way.
    BigInt(BigInt),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Builtin(Builtin),
}

impl Value {
    /// Integer value in its narrowest representation.
    pub fn from_bigint(n: BigInt) -> Self {
        match n.to_i64() {
            Some(i) => Self::Int(i),
            None => Self::BigInt(n),
        }
    }

    /// Name of the value's type as shown in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "NoneType",
            Self::Bool(_) => "bool",
            Self::Int(_) | Self::BigInt(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::List(_) => "list",
            Self::Tuple(_) => "tuple",
            Self::Builtin(_) => "builtin_function",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Self::None => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::BigInt(_) => true,
            Self::Float(f) => *f != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::List(items) | Self::Tuple(items) => !items.is_empty(),
            Self::Builtin(_) => true,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(
            self,
            Self::Bool(_) | Self::Int(_) | Self::BigInt(_) | Self::Float(_)
        )
    }

    /// Bools and ints of any width.
    pub fn is_integral(&self) -> bool {
        matches!(self, Self::Bool(_) | Self::Int(_) | Self::BigInt(_))
    }

    /// Integer view of bools and ints that fit in 64 bits.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Bool(b) => Some(i64::from(*b)),
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Arbitrary-precision view of any integral value.
    pub fn as_bigint(&self) -> Option<BigInt> {
        match self {
            Self::BigInt(n) => Some(n.clone()),
            other => other.as_int().map(BigInt::from),
        }
    }

    /// Float view of any numeric value. Ints too wide for a float come out
    /// infinite; [`Value::to_float`] rejects those.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::BigInt(n) => Some(n.to_f64().unwrap_or(f64::INFINITY)),
            other => other.as_int().map(|i| i as f64),
        }
    }

    /// Numeric coercion with a descriptive error.
    pub fn to_float(&self, context: &str) -> Result<f64, EvalError> {
        let value = self.as_float().ok_or_else(|| {
            EvalError::type_mismatch(format!(
                "{context}: must be a real number, not {}",
                self.type_name()
            ))
        })?;
        if value.is_infinite() && matches!(self, Self::BigInt(_)) {
            return Err(EvalError::Overflow);
        }
        Ok(value)
    }

    /// Integer coercion; floats are rejected like Python does for indices.
    pub fn to_int(&self, context: &str) -> Result<i64, EvalError> {
        if let Self::BigInt(_) = self {
            return Err(EvalError::Overflow);
        }
        self.as_int().ok_or_else(|| {
            EvalError::type_mismatch(format!(
                "{context}: '{}' object cannot be interpreted as an integer",
                self.type_name()
            ))
        })
    }

    /// Integer coercion without the 64-bit limit.
    pub fn to_bigint(&self, context: &str) -> Result<BigInt, EvalError> {
        self.as_bigint().ok_or_else(|| {
            EvalError::type_mismatch(format!(
                "{context}: '{}' object cannot be interpreted as an integer",
                self.type_name()
            ))
        })
    }

    /// Borrow the elements of any iterable value.
    ///
    /// Strings iterate over their characters, so they are materialized.
    pub fn iter_values(&self, context: &str) -> Result<Vec<Value>, EvalError> {
        match self {
            Self::List(items) | Self::Tuple(items) => Ok(items.clone()),
            Self::Str(s) => Ok(s.chars().map(|c| Self::Str(c.to_string())).collect()),
            other => Err(EvalError::type_mismatch(format!(
                "{context}: '{}' object is not iterable",
                other.type_name()
            ))),
        }
    }

    /// Python-style `repr()`.
    pub fn repr(&self) -> String {
        match self {
            Self::Str(s) => quote(s),
            other => other.to_string(),
        }
    }

    /// Structural equality with numeric cross-type comparison (`1 == 1.0`).
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) | (Self::Tuple(a), Self::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            (Self::Builtin(a), Self::Builtin(b)) => a.name == b.name,
            (a, b) => match (a.as_int(), b.as_int()) {
                (Some(x), Some(y)) => x == y,
                _ if a.is_integral() && b.is_integral() => a.as_bigint() == b.as_bigint(),
                _ => match (a.as_float(), b.as_float()) {
                    (Some(x), Some(y)) => x == y,
                    _ => false,
                },
            },
        }
    }

    /// Ordering used by comparisons, `sorted`, `min` and `max`.
    pub fn compare(&self, other: &Value) -> Result<Ordering, EvalError> {
        match (self, other) {
            (Self::Str(a), Self::Str(b)) => Ok(a.cmp(b)),
            (Self::List(a), Self::List(b)) | (Self::Tuple(a), Self::Tuple(b)) => {
                for (x, y) in a.iter().zip(b) {
                    match x.compare(y)? {
                        Ordering::Equal => continue,
                        unequal => return Ok(unequal),
                    }
                }
                Ok(a.len().cmp(&b.len()))
            }
            (a, b) if a.is_number() && b.is_number() => match (a.as_int(), b.as_int()) {
                (Some(x), Some(y)) => Ok(x.cmp(&y)),
                _ if a.is_integral() && b.is_integral() => Ok(a.as_bigint().cmp(&b.as_bigint())),
                _ => {
                    let (x, y) = (a.as_float().unwrap_or(f64::NAN), b.as_float().unwrap_or(f64::NAN));
                    x.partial_cmp(&y).ok_or_else(|| {
                        EvalError::value("cannot order NaN")
                    })
                }
            },
            (a, b) => Err(EvalError::type_mismatch(format!(
                "'<' not supported between instances of '{}' and '{}'",
                a.type_name(),
                b.type_name()
            ))),
        }
    }
}

impl fmt::Display for Value {
    /// Python-style `str()`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(i) => write!(f, "{i}"),
            Self::BigInt(n) => write!(f, "{n}"),
            Self::Float(x) => f.write_str(&format_float(*x)),
            Self::Str(s) => f.write_str(s),
            Self::List(items) => {
                f.write_str("[")?;
                write_items(f, items)?;
                f.write_str("]")
            }
            Self::Tuple(items) => {
                f.write_str("(")?;
                write_items(f, items)?;
                if items.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
            Self::Builtin(builtin) => write!(f, "<built-in function {}>", builtin.name),
        }
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        f.write_str(&item.repr())?;
    }
    Ok(())
}

fn quote(s: &str) -> String {
    let delimiter = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(delimiter);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == delimiter => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(delimiter);
    out
}

/// Format a float the way Python's `repr` does.
///
/// Shortest round-trip digits; positional notation for decimal exponents in
/// `-4..16`, scientific (`1e+16`) outside it; integral values keep `.0`.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    // `{:e}` yields the shortest round-trip mantissa, e.g. "-1.2345e3".
    let scientific = format!("{value:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return format!("{value}");
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return format!("{value}");
    };
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    if (-4..16).contains(&exponent) {
        if exponent >= 0 {
            let int_len = exponent as usize + 1;
            if digits.len() <= int_len {
                let padding = "0".repeat(int_len - digits.len());
                format!("{sign}{digits}{padding}.0")
            } else {
                format!("{sign}{}.{}", &digits[..int_len], &digits[int_len..])
            }
        } else {
            let zeros = "0".repeat((-exponent - 1) as usize);
            format!("{sign}0.{zeros}{digits}")
        }
    } else {
        let mantissa = if digits.len() > 1 {
            format!("{}.{}", &digits[..1], &digits[1..])
        } else {
            digits
        };
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        format!("{sign}{mantissa}e{exp_sign}{:02}", exponent.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_float_matches_python_repr() {
        assert_eq!(format_float(4.0), "4.0");
        assert_eq!(format_float(4.5), "4.5");
        assert_eq!(format_float(1.0 / 3.0), "0.3333333333333333");
        assert_eq!(format_float(-2.5), "-2.5");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(0.00001), "1e-05");
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(1.5e20), "1.5e+20");
        assert_eq!(format_float(123456789.0), "123456789.0");
        assert_eq!(format_float(f64::INFINITY), "inf");
    }

    #[test]
    fn test_display_collections() {
        let list = Value::List(vec![
            Value::Int(1),
            Value::Float(2.5),
            Value::Str("a".to_string()),
        ]);
        assert_eq!(list.to_string(), "[1, 2.5, 'a']");
        assert_eq!(Value::Tuple(vec![Value::Int(1)]).to_string(), "(1,)");
        assert_eq!(Value::Bool(true).to_string(), "True");
    }

    #[test]
    fn test_repr_quotes_strings() {
        assert_eq!(Value::Str("it's".to_string()).repr(), "\"it's\"");
        assert_eq!(Value::Str("a\nb".to_string()).repr(), "'a\\nb'");
    }

    #[test]
    fn test_loose_eq_crosses_numeric_types() {
        assert!(Value::Int(1).loose_eq(&Value::Float(1.0)));
        assert!(Value::Bool(true).loose_eq(&Value::Int(1)));
        assert!(!Value::Str("1".to_string()).loose_eq(&Value::Int(1)));
    }

    #[test]
    fn test_wide_integers() {
        let wide: BigInt = "18446744073709551616".parse().unwrap();
        let value = Value::from_bigint(wide.clone());
        assert_eq!(value.to_string(), "18446744073709551616");
        assert_eq!(value.type_name(), "int");
        assert!(matches!(Value::from_bigint(BigInt::from(-5)), Value::Int(-5)));

        assert!(value.loose_eq(&Value::BigInt(wide)));
        assert!(!value.loose_eq(&Value::Int(i64::MAX)));
        assert_eq!(value.compare(&Value::Int(i64::MAX)), Ok(Ordering::Greater));
        assert_eq!(value.compare(&Value::Float(1e30)), Ok(Ordering::Less));
        assert_eq!(value.to_int("index"), Err(EvalError::Overflow));
        assert_eq!(value.to_float("sqrt"), Ok(18446744073709551616.0));
    }

    #[test]
    fn test_compare_rejects_mixed_types() {
        assert!(Value::Int(1).compare(&Value::Str("a".to_string())).is_err());
        assert_eq!(
            Value::Int(1).compare(&Value::Float(1.5)),
            Ok(Ordering::Less)
        );
    }
}

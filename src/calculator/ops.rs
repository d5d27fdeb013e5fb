//! Operator semantics over [`Value`]s.
//!
//! Numbers follow Python's rules: bools are ints, `/` always yields a float,
//! `//` and `%` floor toward negative infinity, and mixing an int with a
//! float promotes to float. Integers never wrap: arithmetic that leaves the
//! `i64` range continues on [`BigInt`], up to [`MAX_BITS`].

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::error::EvalError;
use super::parser::{BinaryOp, CompareOp, UnaryOp};
use super::value::Value;

pub fn unary(op: UnaryOp, operand: &Value) -> Result<Value, EvalError> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
        UnaryOp::Pos => match operand {
            Value::Float(f) => Ok(Value::Float(*f)),
            Value::BigInt(n) => Ok(Value::BigInt(n.clone())),
            other => other
                .as_int()
                .map(Value::Int)
                .ok_or_else(|| bad_unary("+", other)),
        },
        UnaryOp::Neg => match operand {
            Value::Float(f) => Ok(Value::Float(-f)),
            other => match (other.as_int(), other.as_bigint()) {
                (Some(i), _) if i != i64::MIN => Ok(Value::Int(-i)),
                (_, Some(n)) => Ok(Value::from_bigint(-n)),
                _ => Err(bad_unary("-", other)),
            },
        },
        UnaryOp::Invert => match (operand.as_int(), operand.as_bigint()) {
            (Some(i), _) => Ok(Value::Int(!i)),
            (_, Some(n)) => Ok(Value::from_bigint(-(n + 1i32))),
            _ => Err(bad_unary("~", operand)),
        },
    }
}

fn bad_unary(symbol: &str, operand: &Value) -> EvalError {
    EvalError::type_mismatch(format!(
        "bad operand type for unary {symbol}: '{}'",
        operand.type_name()
    ))
}

fn bad_binary(symbol: &str, left: &Value, right: &Value) -> EvalError {
    EvalError::type_mismatch(format!(
        "unsupported operand type(s) for {symbol}: '{}' and '{}'",
        left.type_name(),
        right.type_name()
    ))
}

fn symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::FloorDiv => "//",
        BinaryOp::Mod => "%",
        BinaryOp::Pow => "**",
        BinaryOp::BitAnd => "&",
        BinaryOp::BitOr => "|",
        BinaryOp::BitXor => "^",
        BinaryOp::Shl => "<<",
        BinaryOp::Shr => ">>",
    }
}

pub fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    if let Some(result) = sequence_binary(op, left, right)? {
        return Ok(result);
    }

    if let (Some(a), Some(b)) = (left.as_int(), right.as_int()) {
        return int_binary(op, a, b);
    }
    if let (Some(a), Some(b)) = (left.as_bigint(), right.as_bigint()) {
        return big_binary(op, &a, &b);
    }
    match (left.as_float(), right.as_float()) {
        (Some(_), Some(_)) => {
            let (a, b) = (left.to_float(symbol(op))?, right.to_float(symbol(op))?);
            float_binary(op, a, b).ok_or_else(|| bad_binary(symbol(op), left, right))?
        }
        _ => Err(bad_binary(symbol(op), left, right)),
    }
}

/// String and list concatenation/repetition; `None` when not applicable.
fn sequence_binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Option<Value>, EvalError> {
    let result = match (op, left, right) {
        (BinaryOp::Add, Value::Str(a), Value::Str(b)) => Value::Str(format!("{a}{b}")),
        (BinaryOp::Add, Value::List(a), Value::List(b)) => {
            Value::List(a.iter().chain(b).cloned().collect())
        }
        (BinaryOp::Add, Value::Tuple(a), Value::Tuple(b)) => {
            Value::Tuple(a.iter().chain(b).cloned().collect())
        }
        (BinaryOp::Mul, Value::Str(s), n) | (BinaryOp::Mul, n, Value::Str(s)) if n.is_integral() => {
            let times = repeat_count(n)?;
            Value::Str(s.repeat(times))
        }
        (BinaryOp::Mul, Value::List(items), n) | (BinaryOp::Mul, n, Value::List(items))
            if n.is_integral() =>
        {
            let times = repeat_count(n)?;
            Value::List(repeat_items(items, times))
        }
        (BinaryOp::Mul, Value::Tuple(items), n) | (BinaryOp::Mul, n, Value::Tuple(items))
            if n.is_integral() =>
        {
            let times = repeat_count(n)?;
            Value::Tuple(repeat_items(items, times))
        }
        (BinaryOp::Mod, Value::Str(_), _) => {
            return Err(EvalError::type_mismatch(
                "printf-style string formatting is not supported",
            ));
        }
        _ => return Ok(None),
    };
    Ok(Some(result))
}

const MAX_REPEAT: i64 = 1 << 20;

fn repeat_count(n: &Value) -> Result<usize, EvalError> {
    let times = match n {
        Value::BigInt(big) if big.is_negative() => 0,
        Value::BigInt(_) => i64::MAX,
        other => other.as_int().unwrap_or(0).max(0),
    };
    if times > MAX_REPEAT {
        return Err(EvalError::value("repetition count too large"));
    }
    Ok(times as usize)
}

fn repeat_items(items: &[Value], times: usize) -> Vec<Value> {
    let mut out = Vec::with_capacity(items.len() * times);
    for _ in 0..times {
        out.extend(items.iter().cloned());
    }
    out
}

/// Exact `i64` arithmetic, continuing on [`BigInt`] when a result does not fit.
fn int_binary(op: BinaryOp, a: i64, b: i64) -> Result<Value, EvalError> {
    let exact = match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Sub => a.checked_sub(b),
        BinaryOp::Mul => a.checked_mul(b),
        BinaryOp::Div => {
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            return Ok(Value::Float(a as f64 / b as f64));
        }
        BinaryOp::FloorDiv => {
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            a.checked_div(b)
                .map(|q| if (a % b != 0) && ((a < 0) != (b < 0)) { q - 1 } else { q })
        }
        BinaryOp::Mod => {
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            a.checked_rem(b)
                .map(|r| if r != 0 && ((r < 0) != (b < 0)) { r + b } else { r })
        }
        BinaryOp::Pow => {
            if b < 0 {
                if a == 0 {
                    return Err(EvalError::DivisionByZero);
                }
                return Ok(Value::Float((a as f64).powf(b as f64)));
            }
            u32::try_from(b).ok().and_then(|e| a.checked_pow(e))
        }
        BinaryOp::BitAnd => Some(a & b),
        BinaryOp::BitOr => Some(a | b),
        BinaryOp::BitXor => Some(a ^ b),
        BinaryOp::Shl => {
            if b < 0 {
                return Err(EvalError::value("negative shift count"));
            }
            u32::try_from(b)
                .ok()
                .and_then(|shift| a.checked_shl(shift).filter(|v| v >> shift == a))
        }
        BinaryOp::Shr => {
            if b < 0 {
                return Err(EvalError::value("negative shift count"));
            }
            Some(a >> b.min(63))
        }
    };
    match exact {
        Some(value) => Ok(Value::Int(value)),
        None => big_binary(op, &BigInt::from(a), &BigInt::from(b)),
    }
}

/// Widest integer a formula may build, in bits (about 315,000 digits).
pub const MAX_BITS: u64 = 1 << 20;

/// Reject results that would exceed [`MAX_BITS`].
pub(crate) fn check_bits(bits: u64) -> Result<(), EvalError> {
    if bits > MAX_BITS {
        Err(EvalError::Overflow)
    } else {
        Ok(())
    }
}

fn big_binary(op: BinaryOp, a: &BigInt, b: &BigInt) -> Result<Value, EvalError> {
    let value = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => {
            check_bits(a.bits() + b.bits())?;
            a * b
        }
        BinaryOp::Div => {
            if b.is_zero() {
                return Err(EvalError::DivisionByZero);
            }
            return Ok(Value::Float(big_true_div(a, b)?));
        }
        BinaryOp::FloorDiv => {
            if b.is_zero() {
                return Err(EvalError::DivisionByZero);
            }
            a.div_floor(b)
        }
        BinaryOp::Mod => {
            if b.is_zero() {
                return Err(EvalError::DivisionByZero);
            }
            a.mod_floor(b)
        }
        BinaryOp::Pow => {
            if b.is_negative() {
                if a.is_zero() {
                    return Err(EvalError::DivisionByZero);
                }
                let base = Value::from_bigint(a.clone()).to_float("**")?;
                let exponent = b.to_f64().unwrap_or(f64::NEG_INFINITY);
                return Ok(Value::Float(base.powf(exponent)));
            }
            big_pow(a, b)?
        }
        BinaryOp::BitAnd => a & b,
        BinaryOp::BitOr => a | b,
        BinaryOp::BitXor => a ^ b,
        BinaryOp::Shl => {
            if b.is_negative() {
                return Err(EvalError::value("negative shift count"));
            }
            if a.is_zero() {
                return Ok(Value::Int(0));
            }
            let shift = b.to_u64().ok_or(EvalError::Overflow)?;
            check_bits(a.bits().saturating_add(shift))?;
            a << shift
        }
        BinaryOp::Shr => {
            if b.is_negative() {
                return Err(EvalError::value("negative shift count"));
            }
            // arithmetic shift: rounds toward negative infinity
            match b.to_u64() {
                Some(shift) if shift < a.bits() => a >> shift,
                _ if a.is_negative() => -BigInt::one(),
                _ => BigInt::zero(),
            }
        }
    };
    Ok(Value::from_bigint(value))
}

fn big_pow(base: &BigInt, exponent: &BigInt) -> Result<BigInt, EvalError> {
    if base.is_zero() {
        return Ok(if exponent.is_zero() { BigInt::one() } else { BigInt::zero() });
    }
    if base.is_one() {
        return Ok(BigInt::one());
    }
    if (-base).is_one() {
        return Ok(if exponent.is_even() { BigInt::one() } else { -BigInt::one() });
    }
    let exponent = exponent.to_u32().ok_or(EvalError::Overflow)?;
    check_bits(base.bits().saturating_mul(u64::from(exponent)))?;
    Ok(base.pow(exponent))
}

/// `a / b` as a float, even when both operands are too wide to convert on
/// their own.
fn big_true_div(a: &BigInt, b: &BigInt) -> Result<f64, EvalError> {
    // drop low bits both sides share so the narrower one keeps 64 significant bits
    let excess = a.bits().min(b.bits()).saturating_sub(64);
    let x = (a >> excess).to_f64().unwrap_or(f64::INFINITY);
    let y = (b >> excess).to_f64().unwrap_or(f64::INFINITY);
    let quotient = x / y;
    if quotient.is_finite() {
        Ok(quotient)
    } else {
        Err(EvalError::Overflow)
    }
}

/// Float arithmetic; `None` for operators that need integers.
fn float_binary(op: BinaryOp, a: f64, b: f64) -> Option<Result<Value, EvalError>> {
    let value = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return Some(Err(EvalError::DivisionByZero));
            }
            a / b
        }
        BinaryOp::FloorDiv => {
            if b == 0.0 {
                return Some(Err(EvalError::DivisionByZero));
            }
            (a / b).floor()
        }
        BinaryOp::Mod => {
            if b == 0.0 {
                return Some(Err(EvalError::DivisionByZero));
            }
            let r = a % b;
            if r != 0.0 && ((r < 0.0) != (b < 0.0)) { r + b } else { r }
        }
        BinaryOp::Pow => {
            if a == 0.0 && b < 0.0 {
                return Some(Err(EvalError::DivisionByZero));
            }
            let result = a.powf(b);
            if result.is_nan() && !a.is_nan() && !b.is_nan() {
                return Some(Err(EvalError::value(
                    "negative number cannot be raised to a fractional power",
                )));
            }
            result
        }
        BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor | BinaryOp::Shl | BinaryOp::Shr => {
            return None;
        }
    };
    Some(Ok(Value::Float(value)))
}

pub fn compare(op: CompareOp, left: &Value, right: &Value) -> Result<bool, EvalError> {
    use std::cmp::Ordering;

    Ok(match op {
        CompareOp::Eq => left.loose_eq(right),
        CompareOp::NotEq => !left.loose_eq(right),
        CompareOp::Lt => left.compare(right)? == Ordering::Less,
        CompareOp::Le => left.compare(right)? != Ordering::Greater,
        CompareOp::Gt => left.compare(right)? == Ordering::Greater,
        CompareOp::Ge => left.compare(right)? != Ordering::Less,
        CompareOp::In => contains(right, left)?,
        CompareOp::NotIn => !contains(right, left)?,
    })
}

fn contains(container: &Value, item: &Value) -> Result<bool, EvalError> {
    match (container, item) {
        (Value::Str(haystack), Value::Str(needle)) => Ok(haystack.contains(needle.as_str())),
        (Value::Str(_), other) => Err(EvalError::type_mismatch(format!(
            "'in <string>' requires string as left operand, not {}",
            other.type_name()
        ))),
        (Value::List(items) | Value::Tuple(items), item) => {
            Ok(items.iter().any(|candidate| candidate.loose_eq(item)))
        }
        (other, _) => Err(EvalError::type_mismatch(format!(
            "argument of type '{}' is not iterable",
            other.type_name()
        ))),
    }
}

/// Resolve a possibly negative index against a length.
fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let resolved = if index < 0 { index + len } else { index };
    (0..len).contains(&resolved).then_some(resolved as usize)
}

pub fn index(target: &Value, index: &Value) -> Result<Value, EvalError> {
    let out_of_range = || EvalError::value(format!("{} index out of range", target.type_name()));
    if let Value::BigInt(_) = index {
        return Err(out_of_range());
    }
    let position = index.as_int().ok_or_else(|| {
        EvalError::type_mismatch(format!(
            "indices must be integers, not {}",
            index.type_name()
        ))
    })?;

    match target {
        Value::List(items) | Value::Tuple(items) => resolve_index(position, items.len())
            .map(|i| items[i].clone())
            .ok_or_else(out_of_range),
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            resolve_index(position, chars.len())
                .map(|i| Value::Str(chars[i].to_string()))
                .ok_or_else(out_of_range)
        }
        other => Err(EvalError::type_mismatch(format!(
            "'{}' object is not subscriptable",
            other.type_name()
        ))),
    }
}

pub fn slice(
    target: &Value,
    start: Option<i64>,
    stop: Option<i64>,
    step: Option<i64>,
) -> Result<Value, EvalError> {
    let step = step.unwrap_or(1);
    if step == 0 {
        return Err(EvalError::value("slice step cannot be zero"));
    }

    let pick = |len: usize| -> Vec<usize> {
        let len = len as i64;
        let clamp = |bound: i64, low: i64, high: i64| {
            let bound = if bound < 0 { bound + len } else { bound };
            bound.clamp(low, high)
        };
        let mut picked = Vec::new();
        if step > 0 {
            let mut i = start.map_or(0, |s| clamp(s, 0, len));
            let end = stop.map_or(len, |s| clamp(s, 0, len));
            while i < end {
                picked.push(i as usize);
                i = i.saturating_add(step);
            }
        } else {
            let mut i = start.map_or(len - 1, |s| clamp(s, -1, len - 1));
            let end = stop.map_or(-1, |s| clamp(s, -1, len - 1));
            while i > end {
                picked.push(i as usize);
                i = i.saturating_add(step);
            }
        }
        picked
    };

    match target {
        Value::List(items) => Ok(Value::List(
            pick(items.len()).into_iter().map(|i| items[i].clone()).collect(),
        )),
        Value::Tuple(items) => Ok(Value::Tuple(
            pick(items.len()).into_iter().map(|i| items[i].clone()).collect(),
        )),
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            Ok(Value::Str(pick(chars.len()).into_iter().map(|i| chars[i]).collect()))
        }
        other => Err(EvalError::type_mismatch(format!(
            "'{}' object is not subscriptable",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(i: i64) -> Value {
        Value::Int(i)
    }

    #[test]
    fn test_true_division_yields_float() {
        let result = binary(BinaryOp::Div, &int(7), &int(2)).unwrap();
        assert!(matches!(result, Value::Float(f) if f == 3.5));
    }

    #[test]
    fn test_floor_division_and_modulo_follow_divisor_sign() {
        assert!(binary(BinaryOp::FloorDiv, &int(-7), &int(2)).unwrap().loose_eq(&int(-4)));
        assert!(binary(BinaryOp::Mod, &int(-7), &int(2)).unwrap().loose_eq(&int(1)));
        assert!(binary(BinaryOp::Mod, &int(7), &int(-2)).unwrap().loose_eq(&int(-1)));
        assert!(binary(BinaryOp::Mod, &Value::Float(-7.5), &int(2)).unwrap().loose_eq(&Value::Float(0.5)));
    }

    #[test]
    fn test_division_by_zero() {
        for op in [BinaryOp::Div, BinaryOp::FloorDiv, BinaryOp::Mod] {
            assert_eq!(binary(op, &int(1), &int(0)).unwrap_err(), EvalError::DivisionByZero);
            assert_eq!(
                binary(op, &Value::Float(1.0), &Value::Float(0.0)).unwrap_err(),
                EvalError::DivisionByZero
            );
        }
    }

    fn big(digits: &str) -> Value {
        Value::from_bigint(digits.parse().unwrap())
    }

    #[test]
    fn test_int_results_widen_instead_of_overflowing() {
        assert_eq!(binary(BinaryOp::Pow, &int(2), &int(64)).unwrap().to_string(), "18446744073709551616");
        assert_eq!(binary(BinaryOp::Pow, &int(10), &int(20)).unwrap().to_string(), "100000000000000000000");
        assert_eq!(
            binary(BinaryOp::Mul, &int(i64::MAX), &int(2)).unwrap().to_string(),
            "18446744073709551614"
        );
        assert_eq!(unary(UnaryOp::Neg, &int(i64::MIN)).unwrap().to_string(), "9223372036854775808");
        assert_eq!(binary(BinaryOp::FloorDiv, &int(i64::MIN), &int(-1)).unwrap().to_string(), "9223372036854775808");
        assert_eq!(binary(BinaryOp::Shl, &int(1), &int(70)).unwrap().to_string(), "1180591620717411303424");
    }

    #[test]
    fn test_wide_results_narrow_again() {
        let wide = binary(BinaryOp::Pow, &int(2), &int(64)).unwrap();
        let back = binary(BinaryOp::FloorDiv, &wide, &int(1 << 32)).unwrap();
        assert!(matches!(back, Value::Int(4294967296)));
        let zero = binary(BinaryOp::Sub, &wide, &wide).unwrap();
        assert!(matches!(zero, Value::Int(0)));
    }

    #[test]
    fn test_wide_arithmetic_follows_python() {
        let n = big("-100000000000000000000");
        assert_eq!(binary(BinaryOp::FloorDiv, &n, &int(7)).unwrap().to_string(), "-14285714285714285715");
        assert_eq!(binary(BinaryOp::Mod, &n, &int(7)).unwrap().to_string(), "5");
        assert_eq!(binary(BinaryOp::Shr, &n, &int(200)).unwrap().to_string(), "-1");
        assert_eq!(binary(BinaryOp::BitAnd, &n, &int(0xff)).unwrap().to_string(), "0");
        assert_eq!(unary(UnaryOp::Invert, &n).unwrap().to_string(), "99999999999999999999");
        assert!(binary(BinaryOp::Div, &n, &int(4)).unwrap().loose_eq(&Value::Float(-2.5e19)));
        assert!(binary(BinaryOp::Add, &n, &Value::Float(0.5)).unwrap().loose_eq(&Value::Float(-1e20)));
        assert!(compare(CompareOp::Lt, &n, &int(i64::MIN)).unwrap());
    }

    #[test]
    fn test_runaway_integers_are_rejected() {
        assert_eq!(binary(BinaryOp::Pow, &int(10), &int(10_000_000)).unwrap_err(), EvalError::Overflow);
        assert_eq!(binary(BinaryOp::Shl, &int(1), &int(1 << 40)).unwrap_err(), EvalError::Overflow);
        assert_eq!(binary(BinaryOp::Pow, &int(-1), &big("100000000000000000001")).unwrap().to_string(), "-1");
        let huge = binary(BinaryOp::Pow, &int(10), &int(400)).unwrap();
        assert_eq!(binary(BinaryOp::Add, &huge, &Value::Float(1.0)).unwrap_err(), EvalError::Overflow);
        let tenth = binary(BinaryOp::Pow, &int(10), &int(399)).unwrap();
        let ratio = binary(BinaryOp::Div, &huge, &tenth).unwrap().as_float().unwrap();
        assert!((ratio - 10.0).abs() < 1e-9);
        let tiny = binary(BinaryOp::Div, &int(1), &huge).unwrap().as_float().unwrap();
        assert_eq!(tiny, 0.0);
        assert!(index(&Value::List(vec![int(1)]), &huge).is_err());
        let s = Value::Str("ab".to_string());
        assert!(binary(BinaryOp::Mul, &s, &huge).is_err());
    }

    #[test]
    fn test_sequences() {
        let s = Value::Str("ab".to_string());
        assert_eq!(binary(BinaryOp::Mul, &s, &int(3)).unwrap().to_string(), "ababab");
        let list = Value::List(vec![int(1)]);
        assert_eq!(binary(BinaryOp::Add, &list, &list).unwrap().to_string(), "[1, 1]");
        assert!(binary(BinaryOp::Add, &s, &int(1)).is_err());
    }

    #[test]
    fn test_index_and_slice() {
        let list = Value::List((0..5).map(int).collect());
        assert!(index(&list, &int(-1)).unwrap().loose_eq(&int(4)));
        assert!(index(&list, &int(5)).is_err());
        assert_eq!(slice(&list, Some(1), Some(3), None).unwrap().to_string(), "[1, 2]");
        assert_eq!(slice(&list, None, None, Some(-2)).unwrap().to_string(), "[4, 2, 0]");
        let s = Value::Str("hello".to_string());
        assert_eq!(slice(&s, Some(-3), None, None).unwrap().to_string(), "llo");
    }

    #[test]
    fn test_membership() {
        let list = Value::List(vec![int(1), int(2)]);
        assert!(compare(CompareOp::In, &Value::Float(2.0), &list).unwrap());
        assert!(compare(CompareOp::NotIn, &int(3), &list).unwrap());
        let s = Value::Str("hello".to_string());
        assert!(compare(CompareOp::In, &Value::Str("ell".to_string()), &s).unwrap());
    }
}

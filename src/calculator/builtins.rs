//! General-purpose built-ins available to formulas.
//!
//! Only pure conversions and sequence helpers live here. Anything touching
//! files, processes, modules or object internals is deliberately absent.

use std::cmp::Ordering;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, Zero};

use super::error::EvalError;
use super::math::float_to_int;
use super::namespace::{Args, Builtin, CallContext};
use super::ops;
use super::parser::BinaryOp;
use super::value::Value;

pub const FUNCTIONS: &[Builtin] = &[
    Builtin::new("abs", abs),
    Builtin::new("all", all),
    Builtin::new("any", any),
    Builtin::new("bin", bin),
    Builtin::new("bool", bool_),
    Builtin::new("chr", chr),
    Builtin::new("divmod", divmod),
    Builtin::new("enumerate", enumerate),
    Builtin::new("filter", filter),
    Builtin::new("float", float),
    Builtin::new("hex", hex),
    Builtin::new("int", int),
    Builtin::new("len", len),
    Builtin::new("list", list),
    Builtin::new("map", map),
    Builtin::new("max", max),
    Builtin::new("min", min),
    Builtin::new("oct", oct),
    Builtin::new("ord", ord),
    Builtin::new("range", range),
    Builtin::new("repr", repr),
    Builtin::new("reversed", reversed),
    Builtin::new("round", round),
    Builtin::new("sorted", sorted),
    Builtin::new("str", str_),
    Builtin::new("sum", sum),
    Builtin::new("tuple", tuple),
    Builtin::new("zip", zip),
];

/// Upper bound on materialized ranges.
const MAX_RANGE: i64 = 1 << 20;

fn context(args: &Args) -> String {
    format!("{}()", args.function())
}

fn iterable(args: &Args, position: usize, keyword: &str) -> Result<Vec<Value>, EvalError> {
    args.require(position, keyword)?.iter_values(&context(args))
}

fn abs(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(1, 1, &["x"])?;
    match args.require(0, "x")? {
        Value::Float(f) => Ok(Value::Float(f.abs())),
        other => {
            if let Some(i) = other.as_int().and_then(i64::checked_abs) {
                return Ok(Value::Int(i));
            }
            let n = other.as_bigint().ok_or_else(|| {
                EvalError::type_mismatch(format!(
                    "bad operand type for abs(): '{}'",
                    other.type_name()
                ))
            })?;
            Ok(Value::from_bigint(n.abs()))
        }
    }
}

fn all(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(1, 1, &["iterable"])?;
    let items = iterable(&args, 0, "iterable")?;
    Ok(Value::Bool(items.iter().all(Value::is_truthy)))
}

fn any(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(1, 1, &["iterable"])?;
    let items = iterable(&args, 0, "iterable")?;
    Ok(Value::Bool(items.iter().any(Value::is_truthy)))
}

fn radix_string(args: &Args, prefix: &str, radix: u32) -> Result<Value, EvalError> {
    args.check(1, 1, &["x"])?;
    let n = args.require(0, "x")?.to_bigint(&context(args))?;
    let sign = if n.is_negative() { "-" } else { "" };
    Ok(Value::Str(format!(
        "{sign}{prefix}{}",
        n.magnitude().to_str_radix(radix)
    )))
}

fn bin(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    radix_string(&args, "0b", 2)
}

fn hex(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    radix_string(&args, "0x", 16)
}

fn oct(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    radix_string(&args, "0o", 8)
}

fn bool_(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(0, 1, &["x"])?;
    Ok(Value::Bool(args.get(0, "x").is_some_and(Value::is_truthy)))
}

fn chr(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(1, 1, &["i"])?;
    let code = args.int(0, "i")?;
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .map(|c| Value::Str(c.to_string()))
        .ok_or_else(|| EvalError::value("chr() arg not in range(0x110000)"))
}

fn ord(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(1, 1, &["c"])?;
    match args.require(0, "c")? {
        Value::Str(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Int(i64::from(u32::from(c)))),
                _ => Err(EvalError::type_mismatch(format!(
                    "ord() expected a character, but string of length {} found",
                    s.chars().count()
                ))),
            }
        }
        other => Err(EvalError::type_mismatch(format!(
            "ord() expected string of length 1, but {} found",
            other.type_name()
        ))),
    }
}

fn divmod(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(2, 2, &["a", "b"])?;
    let a = args.require(0, "a")?;
    let b = args.require(1, "b")?;
    Ok(Value::Tuple(vec![
        ops::binary(BinaryOp::FloorDiv, a, b)?,
        ops::binary(BinaryOp::Mod, a, b)?,
    ]))
}

fn enumerate(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(1, 2, &["iterable", "start"])?;
    let items = iterable(&args, 0, "iterable")?;
    let start = match args.get(1, "start") {
        Some(start) => start.to_int("enumerate()")?,
        None => 0,
    };
    Ok(Value::List(
        items
            .into_iter()
            .zip(start..)
            .map(|(item, i)| Value::Tuple(vec![Value::Int(i), item]))
            .collect(),
    ))
}

fn filter(ctx: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(2, 2, &[])?;
    let function = args.require(0, "function")?;
    let items = iterable(&args, 1, "iterable")?;
    let mut kept = Vec::new();
    for item in items {
        let keep = match function {
            Value::None => item.is_truthy(),
            f => ctx.call(f, vec![item.clone()])?.is_truthy(),
        };
        if keep {
            kept.push(item);
        }
    }
    Ok(Value::List(kept))
}

fn map(ctx: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(2, usize::MAX, &[])?;
    let function = args.require(0, "function")?.clone();
    let sequences = args.positional()[1..]
        .iter()
        .map(|seq| seq.iter_values("map()"))
        .collect::<Result<Vec<_>, _>>()?;
    let shortest = sequences.iter().map(Vec::len).min().unwrap_or(0);
    let mut mapped = Vec::with_capacity(shortest);
    for i in 0..shortest {
        let call_args = sequences.iter().map(|seq| seq[i].clone()).collect();
        mapped.push(ctx.call(&function, call_args)?);
    }
    Ok(Value::List(mapped))
}

fn parse_float_literal(text: &str) -> Option<f64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != '_').collect();
    match cleaned.to_ascii_lowercase().as_str() {
        "inf" | "+inf" | "infinity" | "+infinity" => Some(f64::INFINITY),
        "-inf" | "-infinity" => Some(f64::NEG_INFINITY),
        "nan" | "+nan" | "-nan" => Some(f64::NAN),
        _ => cleaned.parse().ok(),
    }
}

fn float(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(0, 1, &["x"])?;
    match args.get(0, "x") {
        None => Ok(Value::Float(0.0)),
        Some(Value::Str(s)) => parse_float_literal(s).map(Value::Float).ok_or_else(|| {
            EvalError::value(format!("could not convert string to float: {}", Value::Str(s.clone()).repr()))
        }),
        Some(other) => other.to_float("float()").map(Value::Float),
    }
}

fn parse_int_literal(text: &str, base: u32) -> Option<BigInt> {
    let cleaned: String = text.trim().chars().filter(|c| *c != '_').collect();
    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.strip_prefix('+').unwrap_or(&cleaned)),
    };
    let lower = digits.to_ascii_lowercase();
    let detected = [("0x", 16), ("0o", 8), ("0b", 2)]
        .into_iter()
        .find(|(prefix, _)| lower.starts_with(prefix));
    let (base, digits) = match (base, detected) {
        (0, Some((_, radix))) => (radix, &digits[2..]),
        (0, None) => (10, digits),
        (b, Some((_, radix))) if b == radix => (b, &digits[2..]),
        (b, _) => (b, digits),
    };
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    let magnitude = BigInt::parse_bytes(digits.as_bytes(), base)?;
    Some(if negative { -magnitude } else { magnitude })
}

fn int(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(0, 2, &["x", "base"])?;
    let base = match args.get(1, "base") {
        Some(base) => {
            let base = base.to_int("int()")?;
            if base != 0 && !(2..=36).contains(&base) {
                return Err(EvalError::value("int() base must be >= 2 and <= 36, or 0"));
            }
            Some(base as u32)
        }
        None => None,
    };
    match (args.get(0, "x"), base) {
        (None, _) => Ok(Value::Int(0)),
        (Some(Value::Str(s)), base) => {
            let base = base.unwrap_or(10);
            parse_int_literal(s, base).map(Value::from_bigint).ok_or_else(|| {
                EvalError::value(format!(
                    "invalid literal for int() with base {base}: {}",
                    Value::Str(s.clone()).repr()
                ))
            })
        }
        (Some(_), Some(_)) => Err(EvalError::type_mismatch(
            "int() can't convert non-string with explicit base",
        )),
        (Some(Value::Float(f)), None) => float_to_int(f.trunc()),
        (Some(other), None) => other.to_bigint("int()").map(Value::from_bigint),
    }
}

fn len(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(1, 1, &["obj"])?;
    let length = match args.require(0, "obj")? {
        Value::Str(s) => s.chars().count(),
        Value::List(items) | Value::Tuple(items) => items.len(),
        other => {
            return Err(EvalError::type_mismatch(format!(
                "object of type '{}' has no len()",
                other.type_name()
            )));
        }
    };
    Ok(Value::Int(length as i64))
}

fn list(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(0, 1, &["iterable"])?;
    match args.get(0, "iterable") {
        None => Ok(Value::List(Vec::new())),
        Some(_) => Ok(Value::List(iterable(&args, 0, "iterable")?)),
    }
}

fn tuple(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(0, 1, &["iterable"])?;
    match args.get(0, "iterable") {
        None => Ok(Value::Tuple(Vec::new())),
        Some(_) => Ok(Value::Tuple(iterable(&args, 0, "iterable")?)),
    }
}

/// Sort values, optionally by a key function, surfacing the first comparison error.
fn sort_values(
    ctx: &mut CallContext<'_>,
    items: Vec<Value>,
    key: Option<&Value>,
) -> Result<Vec<Value>, EvalError> {
    let mut keyed = Vec::with_capacity(items.len());
    for item in items {
        let sort_key = match key {
            Some(Value::None) | None => item.clone(),
            Some(f) => ctx.call(f, vec![item.clone()])?,
        };
        keyed.push((sort_key, item));
    }

    let mut failure = None;
    keyed.sort_by(|(a, _), (b, _)| {
        a.compare(b).unwrap_or_else(|err| {
            failure.get_or_insert(err);
            Ordering::Equal
        })
    });
    match failure {
        Some(err) => Err(err),
        None => Ok(keyed.into_iter().map(|(_, item)| item).collect()),
    }
}

fn extreme(ctx: &mut CallContext<'_>, args: Args, wanted: Ordering) -> Result<Value, EvalError> {
    args.check(1, usize::MAX, &["key", "default"])?;
    let items = if args.positional().len() == 1 {
        iterable(&args, 0, "iterable")?
    } else {
        args.positional().to_vec()
    };
    let key = args.get(usize::MAX, "key");

    let mut best: Option<(Value, Value)> = None;
    for item in items {
        let item_key = match key {
            Some(Value::None) | None => item.clone(),
            Some(f) => ctx.call(f, vec![item.clone()])?,
        };
        let replace = match &best {
            None => true,
            Some((best_key, _)) => item_key.compare(best_key)? == wanted,
        };
        if replace {
            best = Some((item_key, item));
        }
    }

    match (best, args.get(usize::MAX, "default")) {
        (Some((_, item)), _) => Ok(item),
        (None, Some(default)) => Ok(default.clone()),
        (None, None) => Err(EvalError::value(format!(
            "{}() arg is an empty sequence",
            args.function()
        ))),
    }
}

fn max(ctx: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    extreme(ctx, args, Ordering::Greater)
}

fn min(ctx: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    extreme(ctx, args, Ordering::Less)
}

fn range(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(1, 3, &[])?;
    let first = args.int(0, "start")?;
    let (start, stop) = match args.get(1, "stop") {
        Some(stop) => (first, stop.to_int("range()")?),
        None => (0, first),
    };
    let step = match args.get(2, "step") {
        Some(step) => step.to_int("range()")?,
        None => 1,
    };
    if step == 0 {
        return Err(EvalError::value("range() arg 3 must not be zero"));
    }
    let span = i128::from(stop) - i128::from(start);
    let count = ((span + i128::from(step) - i128::from(step.signum())) / i128::from(step)).max(0);
    if count > i128::from(MAX_RANGE) {
        return Err(EvalError::value("range() too large to materialize"));
    }
    Ok(Value::List(
        (0..count as i64)
            .map(|k| Value::Int(start + k * step))
            .collect(),
    ))
}

fn repr(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(1, 1, &["obj"])?;
    Ok(Value::Str(args.require(0, "obj")?.repr()))
}

fn reversed(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(1, 1, &["seq"])?;
    let mut items = iterable(&args, 0, "seq")?;
    items.reverse();
    Ok(Value::List(items))
}

fn round(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(1, 2, &["number", "ndigits"])?;
    let number = args.require(0, "number")?;
    let ndigits = match args.get(1, "ndigits") {
        Some(Value::None) | None => None,
        Some(n) => Some(n.to_int("round()")?),
    };

    match (number, ndigits) {
        (Value::Float(f), None) => float_to_int(f.round_ties_even()),
        (Value::Float(f), Some(n)) => {
            let scale = 10f64.powi(n.clamp(-308, 308) as i32);
            Ok(Value::Float((f * scale).round_ties_even() / scale))
        }
        (other, ndigits) => {
            let n = other.to_bigint("round()")?;
            match ndigits {
                Some(digits) if digits < 0 => Ok(Value::from_bigint(round_to_power_of_ten(
                    &n,
                    digits.unsigned_abs(),
                ))),
                _ => Ok(Value::from_bigint(n)),
            }
        }
    }
}

/// Round `n` to a multiple of `10**exponent`, ties to even, exactly.
fn round_to_power_of_ten(n: &BigInt, exponent: u64) -> BigInt {
    // 10**exponent > 2 * |n| once exponent exceeds the bit length
    if exponent > n.bits() {
        return BigInt::zero();
    }
    let Ok(exponent) = u32::try_from(exponent) else {
        return BigInt::zero();
    };
    let scale = BigInt::from(10).pow(exponent);
    let (quotient, remainder) = n.div_mod_floor(&scale);
    let twice = &remainder * 2;
    let quotient = if twice > scale || (twice == scale && quotient.is_odd()) {
        quotient + 1
    } else {
        quotient
    };
    quotient * scale
}

fn sorted(ctx: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(1, 1, &["iterable", "key", "reverse"])?;
    let items = iterable(&args, 0, "iterable")?;
    let mut items = sort_values(ctx, items, args.get(usize::MAX, "key"))?;
    if args.get(usize::MAX, "reverse").is_some_and(Value::is_truthy) {
        items.reverse();
    }
    Ok(Value::List(items))
}

fn str_(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(0, 1, &["object"])?;
    Ok(Value::Str(
        args.get(0, "object").map(Value::to_string).unwrap_or_default(),
    ))
}

fn sum(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(1, 2, &["iterable", "start"])?;
    let start = args.get(1, "start").cloned().unwrap_or(Value::Int(0));
    if matches!(start, Value::Str(_)) {
        return Err(EvalError::type_mismatch(
            "sum() can't sum strings [use ''.join(seq) instead]",
        ));
    }
    iterable(&args, 0, "iterable")?
        .iter()
        .try_fold(start, |acc, item| ops::binary(BinaryOp::Add, &acc, item))
}

fn zip(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(0, usize::MAX, &[])?;
    let sequences = args
        .positional()
        .iter()
        .map(|seq| seq.iter_values("zip()"))
        .collect::<Result<Vec<_>, _>>()?;
    let shortest = sequences.iter().map(Vec::len).min().unwrap_or(0);
    Ok(Value::List(
        (0..shortest)
            .map(|i| Value::Tuple(sequences.iter().map(|seq| seq[i].clone()).collect()))
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn call_with(
        builtin: fn(&mut CallContext<'_>, Args) -> Result<Value, EvalError>,
        args: Vec<Value>,
        keywords: Vec<(&str, Value)>,
    ) -> Result<Value, EvalError> {
        let mut rng = StdRng::seed_from_u64(0);
        let mut ctx = CallContext { rng: &mut rng };
        let keywords = keywords
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        builtin(&mut ctx, Args::new("test", args, keywords))
    }

    fn call(
        builtin: fn(&mut CallContext<'_>, Args) -> Result<Value, EvalError>,
        args: Vec<Value>,
    ) -> String {
        call_with(builtin, args, vec![]).unwrap().to_string()
    }

    fn ints(values: &[i64]) -> Value {
        Value::List(values.iter().copied().map(Value::Int).collect())
    }

    #[test]
    fn test_radix_strings() {
        assert_eq!(call(hex, vec![Value::Int(255)]), "0xff");
        assert_eq!(call(oct, vec![Value::Int(8)]), "0o10");
        assert_eq!(call(bin, vec![Value::Int(-5)]), "-0b101");
        assert_eq!(call(hex, vec![Value::Int(i64::MIN)]), "-0x8000000000000000");
        let wide = Value::from_bigint("18446744073709551616".parse().unwrap());
        assert_eq!(call(hex, vec![wide]), "0x10000000000000000");
    }

    #[test]
    fn test_wide_integers() {
        let wide = "123456789012345678901234567890";
        assert_eq!(call(int, vec![Value::Str(wide.to_string())]), wide);
        assert_eq!(
            call(int, vec![Value::Str("-0x1_0000_0000_0000_0000".to_string()), Value::Int(0)]),
            "-18446744073709551616"
        );
        assert_eq!(call(abs, vec![Value::Int(i64::MIN)]), "9223372036854775808");
        let big = Value::from_bigint(format!("-{wide}").parse().unwrap());
        assert_eq!(call(abs, vec![big.clone()]), wide);
        assert_eq!(
            call(round, vec![big, Value::Int(-25)]),
            "-123460000000000000000000000000"
        );
        assert_eq!(call(round, vec![Value::Int(250), Value::Int(-2)]), "200");
        assert_eq!(call(round, vec![Value::Int(350), Value::Int(-2)]), "400");
        assert_eq!(call(round, vec![Value::Int(-251), Value::Int(-2)]), "-300");
        assert_eq!(call(round, vec![Value::Int(7), Value::Int(-400)]), "0");
        assert_eq!(call(sum, vec![ints(&[i64::MAX, 1])]), "9223372036854775808");
    }

    #[test]
    fn test_int_parsing() {
        assert_eq!(call(int, vec![Value::Str(" 42 ".to_string())]), "42");
        assert_eq!(call(int, vec![Value::Str("ff".to_string()), Value::Int(16)]), "255");
        assert_eq!(call(int, vec![Value::Str("0x1f".to_string()), Value::Int(0)]), "31");
        assert_eq!(call(int, vec![Value::Float(-3.9)]), "-3");
        assert!(call_with(int, vec![Value::Str("abc".to_string())], vec![]).is_err());
    }

    #[test]
    fn test_round_half_even() {
        assert_eq!(call(round, vec![Value::Float(2.5)]), "2");
        assert_eq!(call(round, vec![Value::Float(3.5)]), "4");
        assert_eq!(call(round, vec![Value::Float(3.14159), Value::Int(2)]), "3.14");
        assert_eq!(call(round, vec![Value::Int(1234), Value::Int(-2)]), "1200");
    }

    #[test]
    fn test_sorted_and_extremes() {
        assert_eq!(call(sorted, vec![ints(&[3, 1, 2])]), "[1, 2, 3]");
        let reversed = call_with(
            sorted,
            vec![ints(&[3, 1, 2])],
            vec![("reverse", Value::Bool(true))],
        )
        .unwrap();
        assert_eq!(reversed.to_string(), "[3, 2, 1]");
        assert_eq!(call(max, vec![ints(&[3, 9, 2])]), "9");
        assert_eq!(call(min, vec![Value::Int(4), Value::Float(1.5)]), "1.5");
        assert!(call_with(max, vec![ints(&[])], vec![]).is_err());
        assert_eq!(
            call_with(max, vec![ints(&[])], vec![("default", Value::Int(0))])
                .unwrap()
                .to_string(),
            "0"
        );
    }

    #[test]
    fn test_sorted_with_key_function() {
        let key = Value::Builtin(Builtin::new("abs", abs));
        let result = call_with(sorted, vec![ints(&[-3, 1, -2])], vec![("key", key)]).unwrap();
        assert_eq!(result.to_string(), "[1, -2, -3]");
    }

    #[test]
    fn test_sequence_helpers() {
        assert_eq!(call(range, vec![Value::Int(3)]), "[0, 1, 2]");
        assert_eq!(call(range, vec![Value::Int(5), Value::Int(0), Value::Int(-2)]), "[5, 3, 1]");
        assert_eq!(
            call(zip, vec![ints(&[1, 2, 3]), Value::Str("ab".to_string())]),
            "[(1, 'a'), (2, 'b')]"
        );
        assert_eq!(call(enumerate, vec![Value::Str("ab".to_string())]), "[(0, 'a'), (1, 'b')]");
        assert_eq!(call(sum, vec![ints(&[1, 2, 3])]), "6");
        assert_eq!(call(len, vec![Value::Str("héllo".to_string())]), "5");
        assert_eq!(call(divmod, vec![Value::Int(7), Value::Int(2)]), "(3, 1)");
    }

    #[test]
    fn test_map_and_filter() {
        let abs_fn = Value::Builtin(Builtin::new("abs", abs));
        assert_eq!(call(map, vec![abs_fn, ints(&[-1, 2, -3])]), "[1, 2, 3]");
        assert_eq!(call(filter, vec![Value::None, ints(&[0, 1, 0, 2])]), "[1, 2]");
    }

    #[test]
    fn test_chr_and_ord() {
        assert_eq!(call(chr, vec![Value::Int(65)]), "A");
        assert_eq!(call(ord, vec![Value::Str("a".to_string())]), "97");
        assert!(call_with(ord, vec![Value::Str("ab".to_string())], vec![]).is_err());
    }
}

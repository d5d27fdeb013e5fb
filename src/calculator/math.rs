//! Math library functions and constants.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{FromPrimitive, One, Signed};

use super::error::EvalError;
use super::namespace::{Args, Builtin, CallContext};
use super::ops::{self, check_bits};
use super::parser::BinaryOp;
use super::value::Value;

pub const CONSTANTS: &[(&str, f64)] = &[
    ("pi", std::f64::consts::PI),
    ("e", std::f64::consts::E),
    ("tau", std::f64::consts::TAU),
    ("inf", f64::INFINITY),
    ("nan", f64::NAN),
];

pub const FUNCTIONS: &[Builtin] = &[
    Builtin::new("acos", acos),
    Builtin::new("acosh", acosh),
    Builtin::new("asin", asin),
    Builtin::new("asinh", asinh),
    Builtin::new("atan", atan),
    Builtin::new("atan2", atan2),
    Builtin::new("atanh", atanh),
    Builtin::new("ceil", ceil),
    Builtin::new("comb", comb),
    Builtin::new("copysign", copysign),
    Builtin::new("cos", cos),
    Builtin::new("cosh", cosh),
    Builtin::new("degrees", degrees),
    Builtin::new("dist", dist),
    Builtin::new("exp", exp),
    Builtin::new("expm1", expm1),
    Builtin::new("fabs", fabs),
    Builtin::new("factorial", factorial),
    Builtin::new("floor", floor),
    Builtin::new("fmod", fmod),
    Builtin::new("fsum", fsum),
    Builtin::new("gcd", gcd),
    Builtin::new("hypot", hypot),
    Builtin::new("isclose", isclose),
    Builtin::new("isfinite", isfinite),
    Builtin::new("isinf", isinf),
    Builtin::new("isnan", isnan),
    Builtin::new("isqrt", isqrt),
    Builtin::new("lcm", lcm),
    Builtin::new("ldexp", ldexp),
    Builtin::new("log", log),
    Builtin::new("log10", log10),
    Builtin::new("log1p", log1p),
    Builtin::new("log2", log2),
    Builtin::new("modf", modf),
    Builtin::new("perm", perm),
    Builtin::new("pow", pow),
    Builtin::new("prod", prod),
    Builtin::new("radians", radians),
    Builtin::new("remainder", remainder),
    Builtin::new("sin", sin),
    Builtin::new("sinh", sinh),
    Builtin::new("sqrt", sqrt),
    Builtin::new("tan", tan),
    Builtin::new("tanh", tanh),
    Builtin::new("trunc", trunc),
];

fn domain_error() -> EvalError {
    EvalError::value("math domain error")
}

/// Map NaN/infinite results of finite inputs to Python's math errors.
fn checked(inputs: &[f64], result: f64) -> Result<Value, EvalError> {
    if result.is_nan() && !inputs.iter().any(|x| x.is_nan()) {
        Err(domain_error())
    } else if result.is_infinite() && inputs.iter().all(|x| x.is_finite()) {
        Err(EvalError::value("math range error"))
    } else {
        Ok(Value::Float(result))
    }
}

/// Positive-only wrapper for the logarithm family.
fn positive(x: f64, f: fn(f64) -> f64) -> f64 {
    if x > 0.0 { f(x) } else { f64::NAN }
}

macro_rules! unary_float {
    ($($name:ident => $op:expr),* $(,)?) => {
        $(
            fn $name(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
                args.check(1, 1, &["x"])?;
                let x = args.float(0, "x")?;
                checked(&[x], ($op)(x))
            }
        )*
    };
}

unary_float! {
    acos => f64::acos,
    acosh => f64::acosh,
    asin => f64::asin,
    asinh => f64::asinh,
    atan => f64::atan,
    atanh => f64::atanh,
    cos => f64::cos,
    cosh => f64::cosh,
    degrees => f64::to_degrees,
    exp => f64::exp,
    expm1 => f64::exp_m1,
    fabs => f64::abs,
    log10 => |x| positive(x, f64::log10),
    log1p => |x: f64| if x > -1.0 { x.ln_1p() } else { f64::NAN },
    log2 => |x| positive(x, f64::log2),
    radians => f64::to_radians,
    sin => f64::sin,
    sinh => f64::sinh,
    sqrt => f64::sqrt,
    tan => f64::tan,
    tanh => f64::tanh,
}

macro_rules! binary_float {
    ($($name:ident($a:literal, $b:literal) => $op:expr),* $(,)?) => {
        $(
            fn $name(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
                args.check(2, 2, &[$a, $b])?;
                let x = args.float(0, $a)?;
                let y = args.float(1, $b)?;
                checked(&[x, y], ($op)(x, y))
            }
        )*
    };
}

binary_float! {
    atan2("y", "x") => f64::atan2,
    copysign("x", "y") => f64::copysign,
    fmod("x", "y") => |x: f64, y: f64| if y == 0.0 { f64::NAN } else { x % y },
    pow("x", "y") => f64::powf,
    remainder("x", "y") => |x: f64, y: f64| {
        if y == 0.0 {
            return f64::NAN;
        }
        // IEEE remainder: quotient rounded half to even
        let quotient = x / y;
        let mut n = quotient.round();
        if (quotient - quotient.trunc()).abs() == 0.5 && n % 2.0 != 0.0 {
            n -= quotient.signum();
        }
        x - n * y
    },
}

/// Shared body of `ceil`, `floor` and `trunc`: ints pass through unchanged.
fn to_integral(args: &Args, round: fn(f64) -> f64) -> Result<Value, EvalError> {
    args.check(1, 1, &["x"])?;
    if let Some(n) = args.require(0, "x")?.as_bigint() {
        return Ok(Value::from_bigint(n));
    }
    let x = args.float(0, "x")?;
    float_to_int(round(x))
}

pub(crate) fn float_to_int(x: f64) -> Result<Value, EvalError> {
    if x.is_nan() {
        return Err(EvalError::value("cannot convert float NaN to integer"));
    }
    if x >= i64::MIN as f64 && x < i64::MAX as f64 {
        return Ok(Value::Int(x as i64));
    }
    BigInt::from_f64(x)
        .map(Value::from_bigint)
        .ok_or(EvalError::Overflow)
}

fn ceil(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    to_integral(&args, f64::ceil)
}

fn floor(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    to_integral(&args, f64::floor)
}

fn trunc(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    to_integral(&args, f64::trunc)
}

fn log(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(1, 2, &["x", "base"])?;
    let x = args.float(0, "x")?;
    let result = match args.get(1, "base") {
        Some(base) => {
            let base = base.to_float("log()")?;
            if base <= 0.0 || base == 1.0 {
                f64::NAN
            } else {
                positive(x, f64::ln) / base.ln()
            }
        }
        None => positive(x, f64::ln),
    };
    checked(&[x], result)
}

fn ldexp(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(2, 2, &["x", "i"])?;
    let x = args.float(0, "x")?;
    let i = args.int(1, "i")?;
    let exponent = i32::try_from(i.clamp(-2000, 2000)).unwrap_or_default();
    checked(&[x], x * 2f64.powi(exponent))
}

fn modf(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(1, 1, &["x"])?;
    let x = args.float(0, "x")?;
    Ok(Value::Tuple(vec![
        Value::Float(x.fract()),
        Value::Float(x.trunc()),
    ]))
}

fn isclose(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(2, 2, &["a", "b", "rel_tol", "abs_tol"])?;
    let a = args.float(0, "a")?;
    let b = args.float(1, "b")?;
    let rel_tol = match args.get(usize::MAX, "rel_tol") {
        Some(v) => v.to_float("isclose()")?,
        None => 1e-9,
    };
    let abs_tol = match args.get(usize::MAX, "abs_tol") {
        Some(v) => v.to_float("isclose()")?,
        None => 0.0,
    };
    if rel_tol < 0.0 || abs_tol < 0.0 {
        return Err(EvalError::value("tolerances must be non-negative"));
    }
    let close = a == b || (a - b).abs() <= (rel_tol * a.abs().max(b.abs())).max(abs_tol);
    Ok(Value::Bool(close))
}

fn float_predicate(args: &Args, predicate: fn(f64) -> bool) -> Result<Value, EvalError> {
    args.check(1, 1, &["x"])?;
    Ok(Value::Bool(predicate(args.float(0, "x")?)))
}

fn isfinite(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    float_predicate(&args, f64::is_finite)
}

fn isinf(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    float_predicate(&args, f64::is_infinite)
}

fn isnan(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    float_predicate(&args, f64::is_nan)
}

fn non_negative(args: &Args, position: usize, keyword: &str) -> Result<i64, EvalError> {
    let n = args.int(position, keyword)?;
    if n < 0 {
        return Err(EvalError::value(format!(
            "{}() {keyword} must be a non-negative integer",
            args.function()
        )));
    }
    Ok(n)
}

/// Product of `lo..=hi`, split in halves so the big multiplications stay balanced.
fn range_product(lo: u64, hi: u64) -> BigInt {
    if lo > hi {
        return BigInt::one();
    }
    if hi - lo < 16 {
        return (lo..=hi).map(BigInt::from).product();
    }
    let mid = lo + (hi - lo) / 2;
    range_product(lo, mid) * range_product(mid + 1, hi)
}

/// Bound on the width of a product of `count` factors no larger than `top`.
fn check_product(count: u64, top: u64) -> Result<(), EvalError> {
    let width = u64::from(u64::BITS - top.leading_zeros());
    check_bits(count.saturating_mul(width))
}

fn factorial(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(1, 1, &["n"])?;
    let n = non_negative(&args, 0, "n")?.unsigned_abs();
    check_product(n, n)?;
    Ok(Value::from_bigint(range_product(2, n)))
}

/// n! / (n-k)!, optionally divided by k! for combinations.
fn falling_product(n: i64, k: i64, divide: bool) -> Result<Value, EvalError> {
    if k > n {
        return Ok(Value::Int(0));
    }
    let k = if divide { k.min(n - k) } else { k };
    let (n, k) = (n.unsigned_abs(), k.unsigned_abs());
    check_product(k, n)?;
    let falling = range_product(n - k + 1, n);
    let result = if divide {
        falling / range_product(2, k)
    } else {
        falling
    };
    Ok(Value::from_bigint(result))
}

fn comb(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(2, 2, &["n", "k"])?;
    falling_product(non_negative(&args, 0, "n")?, non_negative(&args, 1, "k")?, true)
}

fn perm(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(1, 2, &["n", "k"])?;
    let n = non_negative(&args, 0, "n")?;
    let k = match args.get(1, "k") {
        Some(Value::None) | None => n,
        Some(_) => non_negative(&args, 1, "k")?,
    };
    falling_product(n, k, false)
}

fn integers(args: &Args) -> Result<Vec<BigInt>, EvalError> {
    args.check(0, usize::MAX, &[])?;
    let context = format!("{}()", args.function());
    args.positional().iter().map(|v| v.to_bigint(&context)).collect()
}

fn gcd(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    let values = integers(&args)?;
    let result = values
        .iter()
        .fold(BigInt::from(0), |acc, v| acc.gcd(v));
    Ok(Value::from_bigint(result))
}

fn lcm(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    let values = integers(&args)?;
    let mut result = BigInt::one();
    for v in &values {
        check_bits(result.bits() + v.bits())?;
        result = result.lcm(v);
    }
    Ok(Value::from_bigint(result))
}

fn isqrt(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(1, 1, &["n"])?;
    let n = args.require(0, "n")?.to_bigint("isqrt()")?;
    if n.is_negative() {
        return Err(EvalError::value("isqrt() argument must be nonnegative"));
    }
    Ok(Value::from_bigint(n.sqrt()))
}

fn floats(value: &Value, context: &str) -> Result<Vec<f64>, EvalError> {
    value
        .iter_values(context)?
        .iter()
        .map(|v| v.to_float(context))
        .collect()
}

fn hypot(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(0, usize::MAX, &[])?;
    let coords: Vec<f64> = args
        .positional()
        .iter()
        .map(|v| v.to_float("hypot()"))
        .collect::<Result<_, _>>()?;
    let result = coords.iter().map(|x| x * x).sum::<f64>().sqrt();
    checked(&coords, result)
}

fn dist(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(2, 2, &["p", "q"])?;
    let p = floats(args.require(0, "p")?, "dist()")?;
    let q = floats(args.require(1, "q")?, "dist()")?;
    if p.len() != q.len() {
        return Err(EvalError::value(
            "both points must have the same number of dimensions",
        ));
    }
    let result = p
        .iter()
        .zip(&q)
        .map(|(a, b)| (a - b) * (a - b))
        .sum::<f64>()
        .sqrt();
    Ok(Value::Float(result))
}

fn fsum(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(1, 1, &["seq"])?;
    let values = floats(args.require(0, "seq")?, "fsum()")?;
    // Neumaier compensated summation
    let mut sum = 0.0;
    let mut compensation = 0.0;
    for x in values {
        let t = sum + x;
        if f64::abs(sum) >= f64::abs(x) {
            compensation += (sum - t) + x;
        } else {
            compensation += (x - t) + sum;
        }
        sum = t;
    }
    Ok(Value::Float(sum + compensation))
}

fn prod(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(1, 1, &["iterable", "start"])?;
    let start = args.get(1, "start").cloned().unwrap_or(Value::Int(1));
    args.require(0, "iterable")?
        .iter_values("prod()")?
        .iter()
        .try_fold(start, |acc, v| ops::binary(BinaryOp::Mul, &acc, v))
}

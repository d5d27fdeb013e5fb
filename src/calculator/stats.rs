//! Aggregate operations: sum, mean and standard deviation.
//!
//! `average` and `std` fail on empty input while `mean` yields nothing.
//! Both behaviours are part of the formula language and are kept distinct.

use super::error::EvalError;
use super::namespace::{Args, Builtin, CallContext};
use super::value::Value;

pub const FUNCTIONS: &[Builtin] = &[
    Builtin::new("average", average_builtin),
    Builtin::new("avg", average_builtin),
    Builtin::new("mean", mean_builtin),
    Builtin::new("std", std_builtin),
];

pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// Arithmetic mean; dividing by an empty count is an error.
pub fn average(values: &[f64]) -> Result<f64, EvalError> {
    if values.is_empty() {
        return Err(EvalError::EmptySequence("average"));
    }
    Ok(sum(values) / values.len() as f64)
}

/// Arithmetic mean, or `None` for zero values.
pub fn mean(values: &[f64]) -> Option<f64> {
    average(values).ok()
}

/// Standard deviation with `n - ddof` as the divisor.
pub fn std(values: &[f64], ddof: i64) -> Result<f64, EvalError> {
    let divisor = values.len() as i64 - ddof;
    if values.is_empty() || divisor <= 0 {
        return Err(EvalError::EmptySequence("std"));
    }
    let mu = sum(values) / values.len() as f64;
    let squares: f64 = values.iter().map(|x| (x - mu) * (x - mu)).sum();
    Ok((squares / divisor as f64).sqrt())
}

fn numbers(value: &Value, function: &str) -> Result<Vec<f64>, EvalError> {
    let context = format!("{function}()");
    value
        .iter_values(&context)?
        .iter()
        .map(|v| v.to_float(&context))
        .collect()
}

fn average_builtin(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(1, 1, &["nums"])?;
    let values = numbers(args.require(0, "nums")?, "average")?;
    average(&values).map(Value::Float)
}

/// `mean([1, 2])`, `mean(1, 2)` and `mean([1], 2)` are all accepted.
fn mean_builtin(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(0, usize::MAX, &[])?;
    let mut values = Vec::new();
    for arg in args.positional() {
        if arg.is_number() {
            values.push(arg.to_float("mean()")?);
        } else {
            values.extend(numbers(arg, "mean")?);
        }
    }
    Ok(mean(&values).map_or(Value::None, Value::Float))
}

fn std_builtin(_: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(1, 2, &["numbers", "ddof"])?;
    let values = numbers(args.require(0, "numbers")?, "std")?;
    let ddof = match args.get(1, "ddof") {
        Some(ddof) => ddof.to_int("std()")?,
        None => 0,
    };
    std(&values, ddof).map(Value::Float)
}

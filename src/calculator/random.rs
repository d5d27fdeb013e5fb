//! Random-number utilities and the password generator.

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use super::error::EvalError;
use super::namespace::{Args, Builtin, CallContext};
use super::value::Value;

pub const FUNCTIONS: &[Builtin] = &[
    Builtin::new("random", random),
    Builtin::new("uniform", uniform),
    Builtin::new("randint", randint),
    Builtin::new("randrange", randrange),
    Builtin::new("getrandbits", getrandbits),
    Builtin::new("choice", choice),
    Builtin::new("choices", choices),
    Builtin::new("shuffle", shuffle),
    Builtin::new("sample", sample),
    Builtin::new("password", password),
    Builtin::new("pwd", password),
];

/// Characters a generated password is drawn from.
pub const PASSWORD_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

pub const DEFAULT_PASSWORD_LENGTH: i64 = 20;

/// Upper bound on generated collection sizes.
const MAX_GENERATED: i64 = 1 << 20;

fn random(ctx: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(0, 0, &[])?;
    Ok(Value::Float(ctx.rng.random::<f64>()))
}

fn uniform(ctx: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(2, 2, &["a", "b"])?;
    let a = args.float(0, "a")?;
    let b = args.float(1, "b")?;
    Ok(Value::Float(a + (b - a) * ctx.rng.random::<f64>()))
}

fn randint(ctx: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(2, 2, &["a", "b"])?;
    let a = args.int(0, "a")?;
    let b = args.int(1, "b")?;
    if a > b {
        return Err(EvalError::value(format!(
            "empty range for randint({a}, {b})"
        )));
    }
    Ok(Value::Int(ctx.rng.random_range(a..=b)))
}

fn randrange(ctx: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(1, 3, &["start", "stop", "step"])?;
    let first = args.int(0, "start")?;
    let (start, stop) = match args.get(1, "stop") {
        Some(stop) => (first, stop.to_int("randrange()")?),
        None => (0, first),
    };
    let step = match args.get(2, "step") {
        Some(step) => step.to_int("randrange()")?,
        None => 1,
    };
    if step == 0 {
        return Err(EvalError::value("zero step for randrange()"));
    }
    let span = i128::from(stop) - i128::from(start);
    let count = (span + i128::from(step) - i128::from(step.signum())) / i128::from(step);
    if count <= 0 {
        return Err(EvalError::value(format!(
            "empty range for randrange({start}, {stop}, {step})"
        )));
    }
    let count = i64::try_from(count).map_err(|_| EvalError::Overflow)?;
    let k = ctx.rng.random_range(0..count);
    k.checked_mul(step)
        .and_then(|offset| start.checked_add(offset))
        .map(Value::Int)
        .ok_or(EvalError::Overflow)
}

fn getrandbits(ctx: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(1, 1, &["k"])?;
    let k = args.int(0, "k")?;
    if !(0..=63).contains(&k) {
        return Err(EvalError::value("number of bits must be between 0 and 63"));
    }
    if k == 0 {
        return Ok(Value::Int(0));
    }
    Ok(Value::Int((ctx.rng.random::<u64>() >> (64 - k)) as i64))
}

fn population(args: &Args) -> Result<Vec<Value>, EvalError> {
    args.require(0, "seq")?
        .iter_values(&format!("{}()", args.function()))
}

fn count_arg(args: &Args, position: usize, keyword: &str) -> Result<usize, EvalError> {
    let k = args.int(position, keyword)?;
    if !(0..=MAX_GENERATED).contains(&k) {
        return Err(EvalError::value(format!(
            "{}() {keyword} out of range",
            args.function()
        )));
    }
    Ok(k as usize)
}

fn choice(ctx: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(1, 1, &["seq"])?;
    let items = population(&args)?;
    items
        .choose(ctx.rng)
        .cloned()
        .ok_or_else(|| EvalError::value("cannot choose from an empty sequence"))
}

fn choices(ctx: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(1, 1, &["seq", "k"])?;
    let items = population(&args)?;
    let k = match args.get(1, "k") {
        Some(_) => count_arg(&args, 1, "k")?,
        None => 1,
    };
    if items.is_empty() && k > 0 {
        return Err(EvalError::value("cannot choose from an empty sequence"));
    }
    let picked = (0..k)
        .filter_map(|_| items.choose(ctx.rng).cloned())
        .collect();
    Ok(Value::List(picked))
}

/// Returns a shuffled copy; formulas cannot mutate their arguments.
fn shuffle(ctx: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(1, 1, &["seq"])?;
    let mut items = population(&args)?;
    items.shuffle(ctx.rng);
    Ok(Value::List(items))
}

fn sample(ctx: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(2, 2, &["seq", "k"])?;
    let items = population(&args)?;
    let k = count_arg(&args, 1, "k")?;
    if k > items.len() {
        return Err(EvalError::value("sample larger than population or is negative"));
    }
    let picked = items.choose_multiple(ctx.rng, k).cloned().collect();
    Ok(Value::List(picked))
}

/// Random alphanumeric string, `length` characters long (default 20).
fn password(ctx: &mut CallContext<'_>, args: Args) -> Result<Value, EvalError> {
    args.check(0, 1, &["length"])?;
    let length = match args.get(0, "length") {
        Some(_) => count_arg(&args, 0, "length")?,
        None => DEFAULT_PASSWORD_LENGTH as usize,
    };
    Ok(Value::Str(generate_password(ctx.rng, length)))
}

pub fn generate_password<R: Rng>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| char::from(PASSWORD_ALPHABET[rng.random_range(0..PASSWORD_ALPHABET.len())]))
        .collect()
}

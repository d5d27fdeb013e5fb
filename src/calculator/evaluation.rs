//! Formula evaluation.
//!
//! Wraps normalization, parsing and interpretation behind one
//! [`Evaluator`] that owns the namespace and the random source.

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::error::CalcError;
use super::interpreter::Interpreter;
use super::namespace::{CallContext, Namespace, SymbolNames};
use super::normalize::normalize;
use super::parser::parse;
use super::value::Value;

/// Evaluates formulas against a fixed namespace.
pub struct Evaluator {
    namespace: Namespace,
    rng: StdRng,
}

impl Evaluator {
    pub fn new(names: SymbolNames) -> Self {
        Self {
            namespace: Namespace::new(names),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic random source, for reproducible output.
    pub fn with_seed(names: SymbolNames, seed: u64) -> Self {
        Self {
            namespace: Namespace::new(names),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Evaluate a formula into its canonical result string.
    ///
    /// # Example
    ///
    /// ```
    /// use calculate::calculator::Evaluator;
    ///
    /// let mut evaluator = Evaluator::default();
    /// assert_eq!(evaluator.evaluate("2 + 2").unwrap(), "4");
    /// assert_eq!(evaluator.evaluate("10 / 4").unwrap(), "2.5");
    /// ```
    pub fn evaluate(&mut self, formula: &str) -> Result<String, CalcError> {
        self.evaluate_value(formula).map(|value| canonicalize(&value))
    }

    /// Check that a formula parses, without evaluating it.
    pub fn check(&self, formula: &str) -> Result<(), CalcError> {
        parse(&normalize(formula)).map(|_| ())
    }

    /// Evaluate a formula, keeping the raw value.
    pub fn evaluate_value(&mut self, formula: &str) -> Result<Value, CalcError> {
        let expr = parse(&normalize(formula))?;
        let mut context = CallContext { rng: &mut self.rng };
        let value = Interpreter::new(&self.namespace, &mut context).eval(&expr)?;
        Ok(value)
    }

    /// Refresh the loop slots for one region of a batch.
    pub fn set_loop_context(&mut self, index: usize, count: usize, value: Value) {
        self.namespace.set_loop_context(index, count, value);
    }

    pub fn reset_loop_context(&mut self) {
        self.namespace.reset_loop_context();
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(SymbolNames::default())
    }
}

/// Render a value as result text.
///
/// Strings pass through untouched and `None` renders as nothing. Anything
/// else uses its `str()` form with a trailing `.0` removed, so `4.0`
/// becomes `4` while `4.5` stays.
pub fn canonicalize(value: &Value) -> String {
    match value {
        Value::Str(s) => s.clone(),
        Value::None => String::new(),
        other => {
            let rendered = other.to_string();
            match rendered.strip_suffix(".0") {
                Some(integral) => integral.to_string(),
                None => rendered,
            }
        }
    }
}

//! The closed symbol table a formula is evaluated against.
//!
//! Every callable a formula can reach is registered here from a fixed list.
//! There is no import, attribute or reflection machinery, so the table is
//! the whole security boundary of the evaluator.

use std::collections::HashMap;
use std::fmt;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::error::EvalError;
use super::value::Value;
use super::{builtins, math, random, stats};

/// Signature shared by every builtin function.
pub type BuiltinFn = fn(&mut CallContext<'_>, Args) -> Result<Value, EvalError>;

/// A named native function exposed to formulas.
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl Builtin {
    pub const fn new(name: &'static str, func: BuiltinFn) -> Self {
        Self { name, func }
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

/// State a builtin may touch while running.
pub struct CallContext<'a> {
    pub rng: &'a mut StdRng,
}

impl CallContext<'_> {
    /// Invoke a callable value with positional arguments (`map`, `sorted(key=)`...).
    pub fn call(&mut self, callee: &Value, args: Vec<Value>) -> Result<Value, EvalError> {
        match callee {
            Value::Builtin(builtin) => {
                (builtin.func)(self, Args::new(builtin.name, args, Vec::new()))
            }
            other => Err(EvalError::type_mismatch(format!(
                "'{}' object is not callable",
                other.type_name()
            ))),
        }
    }
}

/// Arguments of one builtin call.
#[derive(Debug)]
pub struct Args {
    function: &'static str,
    positional: Vec<Value>,
    keywords: Vec<(String, Value)>,
}

impl Args {
    pub fn new(
        function: &'static str,
        positional: Vec<Value>,
        keywords: Vec<(String, Value)>,
    ) -> Self {
        Self {
            function,
            positional,
            keywords,
        }
    }

    pub fn function(&self) -> &'static str {
        self.function
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn into_positional(self) -> Vec<Value> {
        self.positional
    }

    /// Validate arity and keyword names.
    pub fn check(&self, min: usize, max: usize, keywords: &[&str]) -> Result<(), EvalError> {
        if let Some((name, _)) = self
            .keywords
            .iter()
            .find(|(name, _)| !keywords.contains(&name.as_str()))
        {
            return Err(EvalError::type_mismatch(format!(
                "{}() got an unexpected keyword argument '{name}'",
                self.function
            )));
        }
        let given = self.positional.len() + self.keywords.len();
        if self.positional.len() > max {
            return Err(EvalError::type_mismatch(format!(
                "{}() takes at most {max} arguments ({given} given)",
                self.function
            )));
        }
        if given < min {
            return Err(EvalError::type_mismatch(format!(
                "{}() takes at least {min} arguments ({given} given)",
                self.function
            )));
        }
        Ok(())
    }

    /// Argument by position, falling back to its keyword name.
    pub fn get(&self, position: usize, keyword: &str) -> Option<&Value> {
        self.positional.get(position).or_else(|| {
            self.keywords
                .iter()
                .find(|(name, _)| name == keyword)
                .map(|(_, value)| value)
        })
    }

    pub fn require(&self, position: usize, keyword: &str) -> Result<&Value, EvalError> {
        self.get(position, keyword).ok_or_else(|| {
            EvalError::type_mismatch(format!(
                "{}() missing required argument '{keyword}'",
                self.function
            ))
        })
    }

    pub fn float(&self, position: usize, keyword: &str) -> Result<f64, EvalError> {
        self.require(position, keyword)?
            .to_float(&format!("{}()", self.function))
    }

    pub fn int(&self, position: usize, keyword: &str) -> Result<i64, EvalError> {
        self.require(position, keyword)?
            .to_int(&format!("{}()", self.function))
    }
}

/// Configurable names of the three loop-context slots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolNames {
    /// Zero-based index of the region being processed.
    pub index: String,
    /// Total number of selections in the batch.
    pub count: String,
    /// Value associated with the current region.
    pub value: String,
}

impl Default for SymbolNames {
    fn default() -> Self {
        Self {
            index: "i".to_string(),
            count: "n".to_string(),
            value: "x".to_string(),
        }
    }
}

/// Base symbols plus the loop-context slots.
#[derive(Clone, Debug)]
pub struct Namespace {
    base: HashMap<&'static str, Value>,
    names: SymbolNames,
    index: Value,
    count: Value,
    value: Value,
}

impl Namespace {
    pub fn new(names: SymbolNames) -> Self {
        let mut base = HashMap::new();

        let tables: [&[Builtin]; 4] = [
            math::FUNCTIONS,
            random::FUNCTIONS,
            stats::FUNCTIONS,
            builtins::FUNCTIONS,
        ];
        for builtin in tables.into_iter().flatten() {
            base.insert(builtin.name, Value::Builtin(*builtin));
        }
        for (name, value) in math::CONSTANTS {
            base.insert(*name, Value::Float(*value));
        }

        Self {
            base,
            names,
            index: Value::Int(0),
            count: Value::Int(0),
            value: Value::None,
        }
    }

    /// Resolve a symbol; loop slots shadow base symbols of the same name.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if name == self.names.index {
            Some(self.index.clone())
        } else if name == self.names.count {
            Some(self.count.clone())
        } else if name == self.names.value {
            Some(self.value.clone())
        } else {
            self.base.get(name).cloned()
        }
    }

    pub fn names(&self) -> &SymbolNames {
        &self.names
    }

    /// Refresh the loop slots before evaluating one region of a batch.
    pub fn set_loop_context(&mut self, index: usize, count: usize, value: Value) {
        self.index = Value::Int(index as i64);
        self.count = Value::Int(count as i64);
        self.value = value;
    }

    /// Clear the loop slots at the start of a batch.
    pub fn reset_loop_context(&mut self) {
        self.set_loop_context(0, 0, Value::None);
    }

    /// Sorted names of every base symbol.
    pub fn symbols(&self) -> Vec<&'static str> {
        let mut symbols: Vec<_> = self.base.keys().copied().collect();
        symbols.sort_unstable();
        symbols
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new(SymbolNames::default())
    }
}

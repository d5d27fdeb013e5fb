//! Calculator module for evaluating formulas.
//!
//! This module provides functionality to:
//! - Normalize raw selection text into a formula
//! - Parse and evaluate formulas against a closed namespace
//! - Compute aggregates (sum, mean, standard deviation)

mod builtins;
mod error;
mod evaluation;
mod interpreter;
mod lexer;
mod math;
mod namespace;
mod normalize;
mod ops;
mod parser;
mod random;
pub mod stats;
mod value;

pub use error::{CalcError, EvalError};
pub use evaluation::{Evaluator, canonicalize};
pub use namespace::{Namespace, SymbolNames};
pub use normalize::normalize;
pub use random::{DEFAULT_PASSWORD_LENGTH, PASSWORD_ALPHABET, generate_password};
pub use value::{Value, format_float};

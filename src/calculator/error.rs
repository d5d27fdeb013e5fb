//! Error types produced while parsing and evaluating formulas.

use thiserror::Error;

/// Failure raised while evaluating an already parsed formula.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum EvalError {
    /// Division or modulo by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// An aggregate function received zero values to divide by.
    #[error("division by zero: {0}() of an empty sequence")]
    EmptySequence(&'static str),

    /// A name that is not part of the namespace.
    #[error("name '{0}' is not defined")]
    UnknownSymbol(String),

    /// An operation applied to values of the wrong type.
    #[error("type error: {0}")]
    TypeMismatch(String),

    /// Right type, inappropriate value (math domain errors, bad indices...).
    #[error("value error: {0}")]
    Value(String),

    /// A result too large to represent: an integer past the width limit,
    /// or an int too wide to convert to a float.
    #[error("numerical result out of range")]
    Overflow,
}

impl EvalError {
    pub(crate) fn type_mismatch(message: impl Into<String>) -> Self {
        Self::TypeMismatch(message.into())
    }

    pub(crate) fn value(message: impl Into<String>) -> Self {
        Self::Value(message.into())
    }

    /// Whether this error stems from dividing by zero, including empty aggregates.
    pub fn is_division_by_zero(&self) -> bool {
        matches!(self, Self::DivisionByZero | Self::EmptySequence(_))
    }
}

/// Any failure turning a formula into a result string.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum CalcError {
    /// The formula could not be parsed.
    #[error("syntax error at column {column}: {message}")]
    Syntax { message: String, column: usize },

    /// The formula parsed but evaluation failed.
    #[error(transparent)]
    Eval(#[from] EvalError),

    /// Region text was required to be a number but is not.
    #[error("could not parse {0:?} as a number")]
    ParseNumber(String),
}

impl CalcError {
    pub(crate) fn syntax(message: impl Into<String>, column: usize) -> Self {
        Self::Syntax {
            message: message.into(),
            column,
        }
    }

    /// Check if this is a syntax error.
    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sequence_reads_as_division_by_zero() {
        let err = EvalError::EmptySequence("average");
        assert!(err.is_division_by_zero());
        assert_eq!(
            err.to_string(),
            "division by zero: average() of an empty sequence"
        );
    }

    #[test]
    fn test_eval_error_is_transparent() {
        let err: CalcError = EvalError::UnknownSymbol("foo".to_string()).into();
        assert_eq!(err.to_string(), "name 'foo' is not defined");
        assert!(!err.is_syntax());
    }
}

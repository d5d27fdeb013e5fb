//! Tree-walking interpreter over parsed formulas.

use num_traits::Signed;

use super::error::EvalError;
use super::namespace::{Args, CallContext, Namespace};
use super::ops;
use super::parser::Expr;
use super::value::Value;

/// Nesting limit for formulas; deeper trees are rejected instead of
/// exhausting the stack. Sized to fit a 2 MiB thread in debug builds.
const MAX_DEPTH: usize = 200;

pub struct Interpreter<'a, 'ctx> {
    namespace: &'a Namespace,
    context: &'a mut CallContext<'ctx>,
    depth: usize,
}

impl<'a, 'ctx> Interpreter<'a, 'ctx> {
    pub fn new(namespace: &'a Namespace, context: &'a mut CallContext<'ctx>) -> Self {
        Self {
            namespace,
            context,
            depth: 0,
        }
    }

    pub fn eval(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        if self.depth >= MAX_DEPTH {
            return Err(EvalError::value("formula nested too deeply"));
        }
        self.depth += 1;
        let result = self.eval_inner(expr);
        self.depth -= 1;
        result
    }

    fn eval_inner(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Name(name) => self
                .namespace
                .lookup(name)
                .ok_or_else(|| EvalError::UnknownSymbol(name.clone())),
            Expr::List(items) => Ok(Value::List(self.eval_all(items)?)),
            Expr::Tuple(items) => Ok(Value::Tuple(self.eval_all(items)?)),
            Expr::Unary(op, operand) => {
                let operand = self.eval(operand)?;
                ops::unary(*op, &operand)
            }
            Expr::Binary(first, rest) => {
                let mut acc = self.eval(first)?;
                for (op, operand) in rest {
                    let right = self.eval(operand)?;
                    acc = ops::binary(*op, &acc, &right)?;
                }
                Ok(acc)
            }
            Expr::Compare(first, rest) => {
                let mut left = self.eval(first)?;
                for (op, operand) in rest {
                    let right = self.eval(operand)?;
                    if !ops::compare(*op, &left, &right)? {
                        return Ok(Value::Bool(false));
                    }
                    left = right;
                }
                Ok(Value::Bool(true))
            }
            // `and`/`or` yield an operand, not a bool, like Python
            Expr::And(operands) => self.short_circuit(operands, false),
            Expr::Or(operands) => self.short_circuit(operands, true),
            Expr::Conditional {
                condition,
                then,
                otherwise,
            } => {
                if self.eval(condition)?.is_truthy() {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
            Expr::Call {
                callee,
                args,
                keywords,
            } => {
                let callee = self.eval(callee)?;
                let positional = self.eval_all(args)?;
                let mut evaluated = Vec::with_capacity(keywords.len());
                for (name, value) in keywords {
                    evaluated.push((name.clone(), self.eval(value)?));
                }
                self.call(&callee, positional, evaluated)
            }
            Expr::Index(target, index) => {
                let target = self.eval(target)?;
                let index = self.eval(index)?;
                ops::index(&target, &index)
            }
            Expr::Slice {
                target,
                start,
                stop,
                step,
            } => {
                let target = self.eval(target)?;
                let start = self.slice_bound(start.as_deref())?;
                let stop = self.slice_bound(stop.as_deref())?;
                let step = self.slice_bound(step.as_deref())?;
                ops::slice(&target, start, stop, step)
            }
        }
    }

    /// Yield the first operand whose truth is `stop_on`, else the last one.
    fn short_circuit(&mut self, operands: &[Expr], stop_on: bool) -> Result<Value, EvalError> {
        let mut last = Value::None;
        for operand in operands {
            last = self.eval(operand)?;
            if last.is_truthy() == stop_on {
                break;
            }
        }
        Ok(last)
    }

    fn eval_all(&mut self, exprs: &[Expr]) -> Result<Vec<Value>, EvalError> {
        exprs.iter().map(|expr| self.eval(expr)).collect()
    }

    fn slice_bound(&mut self, bound: Option<&Expr>) -> Result<Option<i64>, EvalError> {
        match bound {
            None => Ok(None),
            Some(expr) => match self.eval(expr)? {
                Value::None => Ok(None),
                // out of reach either way; the slice clamps it
                Value::BigInt(n) if n.is_negative() => Ok(Some(i64::MIN)),
                Value::BigInt(_) => Ok(Some(i64::MAX)),
                value => value.to_int("slice indices").map(Some),
            },
        }
    }

    fn call(
        &mut self,
        callee: &Value,
        positional: Vec<Value>,
        keywords: Vec<(String, Value)>,
    ) -> Result<Value, EvalError> {
        match callee {
            Value::Builtin(builtin) => (builtin.func)(
                &mut *self.context,
                Args::new(builtin.name, positional, keywords),
            ),
            other => Err(EvalError::type_mismatch(format!(
                "'{}' object is not callable",
                other.type_name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::parser::{UnaryOp, parse};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn run(source: &str) -> Result<Value, EvalError> {
        let namespace = Namespace::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut context = CallContext { rng: &mut rng };
        let expr = parse(source).unwrap();
        Interpreter::new(&namespace, &mut context).eval(&expr)
    }

    fn show(source: &str) -> String {
        run(source).unwrap().to_string()
    }

    #[test]
    fn test_arithmetic_follows_python() {
        assert_eq!(show("2 + 3 * 4"), "14");
        assert_eq!(show("7 / 2"), "3.5");
        assert_eq!(show("-7 // 2"), "-4");
        assert_eq!(show("-7 % 3"), "2");
        assert_eq!(show("2 ** 10"), "1024");
        assert_eq!(show("-2 ** 2"), "-4");
        assert_eq!(show("6 ^ 3"), "5");
    }

    #[test]
    fn test_boolean_operators_return_operands() {
        assert_eq!(show("0 or 5"), "5");
        assert_eq!(show("3 and 4"), "4");
        assert_eq!(show("[] and 1"), "[]");
        // the right side is never evaluated
        assert_eq!(show("1 or undefined_name"), "1");
    }

    #[test]
    fn test_chained_comparison() {
        assert_eq!(show("1 < 2 < 3"), "True");
        assert_eq!(show("1 < 3 < 2"), "False");
        assert_eq!(show("2 in [1, 2]"), "True");
    }

    #[test]
    fn test_conditional_and_calls() {
        assert_eq!(show("'big' if 10 > 5 else 'small'"), "big");
        assert_eq!(show("sqrt(16)"), "4.0");
        assert_eq!(show("sorted([3, 1, 2], reverse=True)"), "[3, 2, 1]");
        assert_eq!(show("max(map(abs, [-5, 2]))"), "5");
    }

    #[test]
    fn test_indexing_and_slicing() {
        assert_eq!(show("[1, 2, 3][-1]"), "3");
        assert_eq!(show("'hello'[1:4]"), "ell");
        assert_eq!(show("[1, 2, 3, 4][::2]"), "[1, 3]");
        assert_eq!(show("[1, 2, 3][-10**30:10**30]"), "[1, 2, 3]");
        assert_eq!(show("[1, 2, 3][::2**63 - 1]"), "[1]");
    }

    #[test]
    fn test_unknown_symbol() {
        assert_eq!(
            run("open('x')").unwrap_err(),
            EvalError::UnknownSymbol("open".to_string())
        );
    }

    #[test]
    fn test_calling_non_callable() {
        assert!(matches!(run("pi(2)"), Err(EvalError::TypeMismatch(_))));
    }

    #[test]
    fn test_long_operator_chains() {
        let terms = vec!["1"; 5000].join(" + ");
        assert_eq!(show(&terms), "5000");
        assert_eq!(show("10 - 3 - 2 - 1"), "4");
        assert_eq!(show("2 ** 3 ** 2"), "512");
        assert_eq!(show("0 or '' or [] or 7 or x"), "7");
        assert_eq!(show("1 and 2 and 0 and x"), "0");
    }

    #[test]
    fn test_depth_limit() {
        let namespace = Namespace::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut context = CallContext { rng: &mut rng };
        let mut interpreter = Interpreter::new(&namespace, &mut context);

        let mut expr = Expr::Literal(Value::Int(1));
        for _ in 0..MAX_DEPTH {
            expr = Expr::Unary(UnaryOp::Neg, Box::new(expr));
        }
        assert!(matches!(interpreter.eval(&expr), Err(EvalError::Value(_))));
    }
}

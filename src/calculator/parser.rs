//! Recursive-descent parser producing an expression tree.
//!
//! The grammar is a Python-flavoured expression subset. Statements,
//! assignment, attribute access and lambdas do not exist: a formula is one
//! expression and can only reach what the namespace hands it.

use super::error::CalcError;
use super::lexer::{Token, TokenKind, tokenize};
use super::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Invert,
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    NotEq,
    In,
    NotIn,
}

#[derive(Clone, Debug)]
pub enum Expr {
    Literal(Value),
    Name(String),
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
    Unary(UnaryOp, Box<Expr>),
    /// `a + b - c` keeps its operand chain, applied left to right, so a
    /// long run of operators adds width to the tree, not depth.
    Binary(Box<Expr>, Vec<(BinaryOp, Expr)>),
    /// `a < b <= c` keeps its operand chain.
    Compare(Box<Expr>, Vec<(CompareOp, Expr)>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Conditional {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        keywords: Vec<(String, Expr)>,
    },
    Index(Box<Expr>, Box<Expr>),
    Slice {
        target: Box<Expr>,
        start: Option<Box<Expr>>,
        stop: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
    },
}

/// Parse a complete formula.
pub fn parse(source: &str) -> Result<Expr, CalcError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    if parser.check(&TokenKind::Eof) {
        return Err(CalcError::syntax("empty formula", 1));
    }
    let expr = parser.expression_list()?;
    if !parser.check(&TokenKind::Eof) {
        return Err(parser.unexpected());
    }
    Ok(expr)
}

/// Bound on recursive descent. Every construct that deepens the tree
/// (brackets, prefix operators, `**`, call and subscript links) is charged
/// against it, which also bounds the depth of the tree the interpreter walks.
const MAX_NESTING: usize = 64;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // tokenize always terminates with Eof, and advance never passes it
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<(), CalcError> {
        if self.eat(kind) {
            Ok(())
        } else {
            let column = self.peek().column;
            Err(CalcError::syntax(format!("expected {what}"), column))
        }
    }

    fn unexpected(&self) -> CalcError {
        let token = self.peek();
        let message = match &token.kind {
            TokenKind::Eof => "unexpected end of formula".to_string(),
            kind => format!("unexpected token {kind:?}"),
        };
        CalcError::syntax(message, token.column)
    }

    /// Top level: `a, b` builds a tuple like Python's eval does.
    fn expression_list(&mut self) -> Result<Expr, CalcError> {
        let first = self.expression()?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            if self.check(&TokenKind::Eof) {
                break;
            }
            items.push(self.expression()?);
        }
        Ok(Expr::Tuple(items))
    }

    fn deepen(&mut self) -> Result<(), CalcError> {
        if self.depth >= MAX_NESTING {
            return Err(CalcError::syntax(
                "formula nested too deeply",
                self.peek().column,
            ));
        }
        self.depth += 1;
        Ok(())
    }

    /// Run `rule` one nesting level deeper.
    fn nested(
        &mut self,
        rule: fn(&mut Self) -> Result<Expr, CalcError>,
    ) -> Result<Expr, CalcError> {
        let outer = self.depth;
        self.deepen()?;
        let result = rule(self);
        self.depth = outer;
        result
    }

    fn expression(&mut self) -> Result<Expr, CalcError> {
        self.nested(Self::conditional)
    }

    fn conditional(&mut self) -> Result<Expr, CalcError> {
        let then = self.or_test()?;
        if !self.eat(&TokenKind::If) {
            return Ok(then);
        }
        let condition = self.or_test()?;
        self.expect(&TokenKind::Else, "'else'")?;
        let otherwise = self.expression()?;
        Ok(Expr::Conditional {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn or_test(&mut self) -> Result<Expr, CalcError> {
        let first = self.and_test()?;
        if !self.check(&TokenKind::Or) {
            return Ok(first);
        }
        let mut operands = vec![first];
        while self.eat(&TokenKind::Or) {
            operands.push(self.and_test()?);
        }
        Ok(Expr::Or(operands))
    }

    fn and_test(&mut self) -> Result<Expr, CalcError> {
        let first = self.not_test()?;
        if !self.check(&TokenKind::And) {
            return Ok(first);
        }
        let mut operands = vec![first];
        while self.eat(&TokenKind::And) {
            operands.push(self.not_test()?);
        }
        Ok(Expr::And(operands))
    }

    fn not_test(&mut self) -> Result<Expr, CalcError> {
        if self.eat(&TokenKind::Not) {
            let operand = self.nested(Self::not_test)?;
            return Ok(Expr::Unary(UnaryOp::Not, Box::new(operand)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, CalcError> {
        let first = self.bit_or()?;
        let mut chain = Vec::new();
        loop {
            let op = match self.peek().kind.clone() {
                TokenKind::Lt => CompareOp::Lt,
                TokenKind::Le => CompareOp::Le,
                TokenKind::Gt => CompareOp::Gt,
                TokenKind::Ge => CompareOp::Ge,
                TokenKind::EqEq => CompareOp::Eq,
                TokenKind::NotEq => CompareOp::NotEq,
                TokenKind::In => CompareOp::In,
                TokenKind::Not => {
                    // only `not in` may continue a comparison
                    let next = self.tokens.get(self.pos + 1).map(|t| &t.kind);
                    if next != Some(&TokenKind::In) {
                        break;
                    }
                    self.advance();
                    CompareOp::NotIn
                }
                _ => break,
            };
            self.advance();
            chain.push((op, self.bit_or()?));
        }
        if chain.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare(Box::new(first), chain))
        }
    }

    fn binary_level(
        &mut self,
        ops: &[(TokenKind, BinaryOp)],
        next: fn(&mut Self) -> Result<Expr, CalcError>,
    ) -> Result<Expr, CalcError> {
        let first = next(self)?;
        let mut chain = Vec::new();
        'outer: loop {
            for (kind, op) in ops {
                if self.eat(kind) {
                    chain.push((*op, next(self)?));
                    continue 'outer;
                }
            }
            break;
        }
        if chain.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Binary(Box::new(first), chain))
        }
    }

    fn bit_or(&mut self) -> Result<Expr, CalcError> {
        self.binary_level(&[(TokenKind::Pipe, BinaryOp::BitOr)], Self::bit_xor)
    }

    fn bit_xor(&mut self) -> Result<Expr, CalcError> {
        self.binary_level(&[(TokenKind::Caret, BinaryOp::BitXor)], Self::bit_and)
    }

    fn bit_and(&mut self) -> Result<Expr, CalcError> {
        self.binary_level(&[(TokenKind::Amp, BinaryOp::BitAnd)], Self::shift)
    }

    fn shift(&mut self) -> Result<Expr, CalcError> {
        self.binary_level(
            &[(TokenKind::Shl, BinaryOp::Shl), (TokenKind::Shr, BinaryOp::Shr)],
            Self::arith,
        )
    }

    fn arith(&mut self) -> Result<Expr, CalcError> {
        self.binary_level(
            &[(TokenKind::Plus, BinaryOp::Add), (TokenKind::Minus, BinaryOp::Sub)],
            Self::term,
        )
    }

    fn term(&mut self) -> Result<Expr, CalcError> {
        self.binary_level(
            &[
                (TokenKind::Star, BinaryOp::Mul),
                (TokenKind::Slash, BinaryOp::Div),
                (TokenKind::DoubleSlash, BinaryOp::FloorDiv),
                (TokenKind::Percent, BinaryOp::Mod),
            ],
            Self::factor,
        )
    }

    fn factor(&mut self) -> Result<Expr, CalcError> {
        let op = match self.peek().kind.clone() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Pos,
            TokenKind::Tilde => UnaryOp::Invert,
            _ => return self.power(),
        };
        self.advance();
        let operand = self.nested(Self::factor)?;
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    fn power(&mut self) -> Result<Expr, CalcError> {
        let base = self.postfix()?;
        if self.eat(&TokenKind::DoubleStar) {
            // right-associative, and `2 ** -1` is legal
            let exponent = self.nested(Self::factor)?;
            return Ok(Expr::Binary(
                Box::new(base),
                vec![(BinaryOp::Pow, exponent)],
            ));
        }
        Ok(base)
    }

    fn postfix(&mut self) -> Result<Expr, CalcError> {
        let outer = self.depth;
        let result = self.postfix_links();
        self.depth = outer;
        result
    }

    /// `f(a)[0](b)` wraps the tree once per link, so each link costs a level.
    fn postfix_links(&mut self) -> Result<Expr, CalcError> {
        let mut expr = self.atom()?;
        loop {
            if self.eat(&TokenKind::LParen) {
                self.deepen()?;
                expr = self.call(expr)?;
            } else if self.eat(&TokenKind::LBracket) {
                self.deepen()?;
                expr = self.subscript(expr)?;
            } else {
                return Ok(expr);
            }
        }
    }

    fn call(&mut self, callee: Expr) -> Result<Expr, CalcError> {
        let mut args = Vec::new();
        let mut keywords: Vec<(String, Expr)> = Vec::new();

        while !self.check(&TokenKind::RParen) {
            let is_keyword = matches!(self.peek().kind, TokenKind::Name(_))
                && self.tokens.get(self.pos + 1).map(|t| &t.kind) == Some(&TokenKind::Assign);
            if is_keyword {
                let column = self.peek().column;
                let TokenKind::Name(name) = self.advance().kind else {
                    return Err(self.unexpected());
                };
                self.advance();
                if keywords.iter().any(|(k, _)| *k == name) {
                    return Err(CalcError::syntax(
                        format!("keyword argument repeated: {name}"),
                        column,
                    ));
                }
                keywords.push((name, self.expression()?));
            } else {
                if !keywords.is_empty() {
                    let column = self.peek().column;
                    return Err(CalcError::syntax(
                        "positional argument follows keyword argument",
                        column,
                    ));
                }
                args.push(self.expression()?);
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen, "')'")?;

        Ok(Expr::Call {
            callee: Box::new(callee),
            args,
            keywords,
        })
    }

    fn subscript(&mut self, target: Expr) -> Result<Expr, CalcError> {
        let start = if self.check(&TokenKind::Colon) {
            None
        } else {
            Some(Box::new(self.expression()?))
        };

        if !self.eat(&TokenKind::Colon) {
            self.expect(&TokenKind::RBracket, "']'")?;
            let Some(index) = start else {
                return Err(self.unexpected());
            };
            return Ok(Expr::Index(Box::new(target), index));
        }

        let bound = |parser: &mut Self| -> Result<Option<Box<Expr>>, CalcError> {
            if parser.check(&TokenKind::Colon) || parser.check(&TokenKind::RBracket) {
                Ok(None)
            } else {
                Ok(Some(Box::new(parser.expression()?)))
            }
        };
        let stop = bound(self)?;
        let step = if self.eat(&TokenKind::Colon) {
            bound(self)?
        } else {
            None
        };
        self.expect(&TokenKind::RBracket, "']'")?;

        Ok(Expr::Slice {
            target: Box::new(target),
            start,
            stop,
            step,
        })
    }

    fn atom(&mut self) -> Result<Expr, CalcError> {
        let token = self.advance();
        let at_eof = token.kind == TokenKind::Eof;
        let expr = match token.kind {
            TokenKind::Int(i) => Expr::Literal(Value::Int(i)),
            TokenKind::BigInt(n) => Expr::Literal(Value::BigInt(n)),
            TokenKind::Float(f) => Expr::Literal(Value::Float(f)),
            TokenKind::Str(mut s) => {
                // adjacent string literals concatenate
                while let TokenKind::Str(next) = &self.peek().kind {
                    s.push_str(next);
                    self.advance();
                }
                Expr::Literal(Value::Str(s))
            }
            TokenKind::True => Expr::Literal(Value::Bool(true)),
            TokenKind::False => Expr::Literal(Value::Bool(false)),
            TokenKind::None => Expr::Literal(Value::None),
            TokenKind::Name(name) => Expr::Name(name),
            TokenKind::LParen => {
                if self.eat(&TokenKind::RParen) {
                    return Ok(Expr::Tuple(Vec::new()));
                }
                let first = self.expression()?;
                if self.eat(&TokenKind::RParen) {
                    return Ok(first);
                }
                let mut items = vec![first];
                while self.eat(&TokenKind::Comma) {
                    if self.check(&TokenKind::RParen) {
                        break;
                    }
                    items.push(self.expression()?);
                }
                self.expect(&TokenKind::RParen, "')'")?;
                Expr::Tuple(items)
            }
            TokenKind::LBracket => {
                let mut items = Vec::new();
                while !self.check(&TokenKind::RBracket) {
                    items.push(self.expression()?);
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RBracket, "']'")?;
                Expr::List(items)
            }
            _ => {
                if !at_eof {
                    self.pos -= 1;
                }
                return Err(self.unexpected());
            }
        };
        Ok(expr)
    }
}

//! Expression AST - the core of SQL expression building.
//!
//! This module provides a strongly-typed AST for the SQL expressions the
//! composer emits, with exhaustive pattern matching enforced by the compiler.
//! There is deliberately no raw-SQL variant: user-supplied values only enter
//! an expression as a [`Literal`] (escaped on output) or a bound [`Expr::Param`].

use super::dialect::Dialect;
use super::token::{Token, TokenStream};

// =============================================================================
// Expression AST
// =============================================================================

/// A SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference: optional_table.column
    Column {
        table: Option<String>,
        column: String,
    },

    /// Literal values
    Literal(Literal),

    /// Bound parameter (1-based position in the parameter list)
    Param(usize),

    /// Binary operation: left op right
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },

    /// Function call: name(args...)
    Function { name: String, args: Vec<Expr> },

    /// Wildcard: *
    Star,

    /// EXTRACT(part FROM expr)
    Extract { part: DatePart, expr: Box<Expr> },

    /// CAST(expr AS DATE)
    CastDate(Box<Expr>),

    /// CURRENT_DATE
    CurrentDate,

    /// INTERVAL '<text>'
    Interval(String),

    /// BETWEEN: expr BETWEEN low AND high
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
    },
}

/// Literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Gte,
    // Logical
    And,
    // Arithmetic
    Minus,
}

/// Date parts usable in EXTRACT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    Week,
    Month,
    Year,
}

impl DatePart {
    fn keyword(self) -> &'static str {
        match self {
            DatePart::Week => "WEEK",
            DatePart::Month => "MONTH",
            DatePart::Year => "YEAR",
        }
    }
}

fn binary_op_to_token(op: BinaryOperator) -> Token {
    match op {
        BinaryOperator::Eq => Token::Eq,
        BinaryOperator::Ne => Token::Ne,
        BinaryOperator::Lt => Token::Lt,
        BinaryOperator::Gt => Token::Gt,
        BinaryOperator::Gte => Token::Gte,
        BinaryOperator::And => Token::And,
        BinaryOperator::Minus => Token::Minus,
    }
}

impl Expr {
    /// Convert this expression to a token stream.
    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();

        match self {
            Expr::Column { table, column } => {
                if let Some(t) = table {
                    ts.push(Token::Ident(t.clone()));
                    ts.push(Token::Dot);
                }
                ts.push(Token::Ident(column.clone()));
            }

            Expr::Literal(lit) => {
                ts.push(match lit {
                    Literal::Int(n) => Token::LitInt(*n),
                    Literal::Float(f) => Token::LitFloat(*f),
                    Literal::String(s) => Token::LitString(s.clone()),
                    Literal::Bool(b) => Token::LitBool(*b),
                });
            }

            Expr::Param(index) => {
                ts.push(Token::Placeholder(*index));
            }

            Expr::BinaryOp { left, op, right } => {
                ts.append(&left.to_tokens());
                ts.space();
                ts.push(binary_op_to_token(*op));
                ts.space();
                ts.append(&right.to_tokens());
            }

            Expr::Function { name, args } => {
                ts.push(Token::FunctionName(name.clone()));
                ts.lparen();
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        ts.comma().space();
                    }
                    ts.append(&arg.to_tokens());
                }
                ts.rparen();
            }

            Expr::Star => {
                ts.push(Token::Star);
            }

            Expr::Extract { part, expr } => {
                ts.push(Token::Extract)
                    .lparen()
                    .push(Token::DatePart(part.keyword()))
                    .space()
                    .push(Token::From)
                    .space();
                ts.append(&expr.to_tokens());
                ts.rparen();
            }

            Expr::CastDate(expr) => {
                ts.push(Token::Cast).lparen();
                ts.append(&expr.to_tokens());
                ts.space()
                    .push(Token::As)
                    .space()
                    .push(Token::TypeName("DATE"))
                    .rparen();
            }

            Expr::CurrentDate => {
                ts.push(Token::CurrentDate);
            }

            Expr::Interval(text) => {
                ts.push(Token::Interval)
                    .space()
                    .push(Token::LitString(text.clone()));
            }

            Expr::Between { expr, low, high } => {
                ts.append(&expr.to_tokens());
                ts.space().push(Token::Between).space();
                ts.append(&low.to_tokens());
                ts.space().push(Token::And).space();
                ts.append(&high.to_tokens());
            }
        }

        ts
    }

    /// Render this expression as SQL text.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens().serialize(dialect)
    }
}

// =============================================================================
// Constructors
// =============================================================================

/// Unqualified column reference.
pub fn col(name: &str) -> Expr {
    Expr::Column {
        table: None,
        column: name.into(),
    }
}

/// Column reference qualified by a table alias.
pub fn table_col(table: &str, column: &str) -> Expr {
    Expr::Column {
        table: Some(table.into()),
        column: column.into(),
    }
}

pub fn lit_int(n: i64) -> Expr {
    Expr::Literal(Literal::Int(n))
}

pub fn lit_str(s: &str) -> Expr {
    Expr::Literal(Literal::String(s.into()))
}

pub fn param(index: usize) -> Expr {
    Expr::Param(index)
}

pub fn star() -> Expr {
    Expr::Star
}

/// Generic function call.
pub fn func(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Function {
        name: name.into(),
        args,
    }
}

pub fn count(expr: Expr) -> Expr {
    func("COUNT", vec![expr])
}

/// COUNT(*)
pub fn count_star() -> Expr {
    count(star())
}

pub fn sum(expr: Expr) -> Expr {
    func("SUM", vec![expr])
}

pub fn avg(expr: Expr) -> Expr {
    func("AVG", vec![expr])
}

pub fn min(expr: Expr) -> Expr {
    func("MIN", vec![expr])
}

pub fn max(expr: Expr) -> Expr {
    func("MAX", vec![expr])
}

pub fn extract(part: DatePart, expr: Expr) -> Expr {
    Expr::Extract {
        part,
        expr: Box::new(expr),
    }
}

pub fn cast_date(expr: Expr) -> Expr {
    Expr::CastDate(Box::new(expr))
}

pub fn current_date() -> Expr {
    Expr::CurrentDate
}

pub fn interval(text: &str) -> Expr {
    Expr::Interval(text.into())
}

// =============================================================================
// Expression Builder Trait
// =============================================================================

/// Extension trait for building expressions fluently.
pub trait ExprExt: Sized {
    fn into_expr(self) -> Expr;

    fn binary(self, op: BinaryOperator, other: impl Into<Expr>) -> Expr {
        Expr::BinaryOp {
            left: Box::new(self.into_expr()),
            op,
            right: Box::new(other.into()),
        }
    }

    fn eq(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Eq, other)
    }

    fn ne(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Ne, other)
    }

    fn gt(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Gt, other)
    }

    fn gte(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Gte, other)
    }

    fn lt(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Lt, other)
    }

    fn and(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::And, other)
    }

    fn sub(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Minus, other)
    }

    fn between(self, low: impl Into<Expr>, high: impl Into<Expr>) -> Expr {
        Expr::Between {
            expr: Box::new(self.into_expr()),
            low: Box::new(low.into()),
            high: Box::new(high.into()),
        }
    }
}

impl ExprExt for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        lit_int(n)
    }
}

impl From<i32> for Expr {
    fn from(n: i32) -> Self {
        lit_int(n as i64)
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        lit_str(s)
    }
}

/// Join expressions with AND, left to right. `None` for an empty list.
pub fn conjunction(exprs: impl IntoIterator<Item = Expr>) -> Option<Expr> {
    exprs.into_iter().reduce(|acc, e| acc.and(e))
}

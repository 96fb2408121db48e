//! SQL generation module.
//!
//! A type-safe SQL builder covering the SELECT shapes the composer emits:
//!
//! - [`query`] - SELECT query builder
//! - [`expr`] - Expression AST and builder DSL
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - SQL dialect implementations

pub mod dialect;
pub mod expr;
pub mod query;
pub mod token;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types at the sql module level
pub use dialect::{Dialect, SqlDialect};
pub use expr::{
    avg, cast_date, col, conjunction, count, count_star, current_date, extract, func, interval,
    lit_int, lit_str, max, min, param, star, sum, table_col, BinaryOperator, DatePart, Expr,
    ExprExt, Literal,
};
pub use query::{Join, OrderByExpr, Query, SelectExpr, SortDir, TableRef};
pub use token::{Token, TokenStream};

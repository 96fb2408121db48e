//! SQL Dialect definitions and formatting rules.
//!
//! This module provides a trait-based abstraction for the dialect differences
//! that matter to generated statements:
//!
//! - Identifier quoting: bare when safe, `"` otherwise
//! - Bind placeholders: `$1, $2` (PostgreSQL) vs `?` (DuckDB)
//! - String literal escaping and boolean literals
//!
//! The time predicates use `EXTRACT`, `DATE_TRUNC` and `INTERVAL`, which both
//! supported dialects understand.
//!
//! # Usage
//!
//! ```
//! use intentql::sql::dialect::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::Postgres;
//! assert_eq!(dialect.placeholder(1), "$1");
//! assert_eq!(dialect.format_identifier("order"), "\"order\"");
//! ```

mod duckdb;
pub mod helpers;
mod postgres;

pub use duckdb::DuckDb;
pub use postgres::Postgres;

use serde::{Deserialize, Serialize};

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// The default implementations follow ANSI SQL where possible.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    /// Quote an identifier unconditionally.
    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    /// Render an identifier, quoting only when a bare identifier would be
    /// misread (reserved word, upper-case letters, unusual characters).
    fn format_identifier(&self, ident: &str) -> String {
        if helpers::is_bare_identifier(ident) {
            ident.to_string()
        } else {
            self.quote_identifier(ident)
        }
    }

    /// Quote a string literal with `''` escaping.
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    /// Format a boolean literal.
    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    /// Bind placeholder for the 1-based parameter `index`.
    fn placeholder(&self, index: usize) -> String;
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    #[default]
    Postgres,
    #[serde(rename = "duckdb")]
    DuckDb,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Postgres => &Postgres,
            Dialect::DuckDb => &DuckDb,
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn format_identifier(&self, ident: &str) -> String {
        self.dialect().format_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        self.dialect().format_bool(b)
    }

    fn placeholder(&self, index: usize) -> String {
        self.dialect().placeholder(index)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "duckdb" => Ok(Dialect::DuckDb),
            other => Err(format!("unsupported dialect: {}", other)),
        }
    }
}

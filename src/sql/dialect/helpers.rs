//! Shared helper functions for SQL dialect implementations.
//!
//! This module provides reusable building blocks that dialects can compose
//! to implement the `SqlDialect` trait with minimal duplication.

use once_cell::sync::Lazy;
use regex::Regex;

static PLAIN_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

static BARE_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("valid identifier regex"));

/// Keywords that cannot appear unquoted as a column or table name.
///
/// Kept to the words likely to show up as column names in business schemas.
const RESERVED: &[&str] = &[
    "all", "and", "as", "asc", "between", "by", "case", "cast", "check", "column", "current_date",
    "default", "desc", "distinct", "else", "end", "from", "group", "having", "in", "is", "join",
    "limit", "not", "null", "offset", "on", "or", "order", "select", "table", "then", "to", "union",
    "user", "when", "where", "with",
];

// =============================================================================
// Identifiers
// =============================================================================

/// Whether `ident` is a plain SQL identifier: a letter or underscore followed
/// by letters, digits or underscores.
///
/// Every table and column name that reaches generated SQL must pass this check.
pub fn is_plain_identifier(ident: &str) -> bool {
    PLAIN_IDENTIFIER.is_match(ident)
}

/// Whether `ident` can be emitted without quotes and still mean itself.
pub fn is_bare_identifier(ident: &str) -> bool {
    BARE_IDENTIFIER.is_match(ident) && !RESERVED.contains(&ident)
}

/// Quote identifier with double quotes (ANSI style).
/// Used by: Postgres, DuckDB
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

// =============================================================================
// Literals
// =============================================================================

/// Quote string with single quotes (standard SQL).
pub fn quote_string_single(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Format boolean as literal true/false.
pub fn format_bool_literal(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

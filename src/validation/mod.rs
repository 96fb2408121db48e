//! Shallow syntax check for generated SQL.
//!
//! This is not a parser. It catches the failure modes of templated statement
//! assembly: missing clauses, unbalanced parentheses, a literal left open, and
//! a second statement smuggled in after a `;`.

use once_cell::sync::Lazy;
use regex::Regex;

static SELECT_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bSELECT\b").expect("valid keyword regex"));

static FROM_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bFROM\b").expect("valid keyword regex"));

/// Why a statement was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// Nothing but whitespace.
    Empty,
    /// No SELECT keyword.
    MissingSelect,
    /// No FROM keyword after SELECT.
    MissingFrom,
    /// Parentheses do not pair up.
    UnbalancedParentheses { depth: i64 },
    /// A quoted literal or identifier is never closed.
    UnterminatedLiteral,
    /// A `;` outside any literal.
    MultipleStatements,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationIssue::Empty => write!(f, "SQL is empty"),
            ValidationIssue::MissingSelect => write!(f, "SELECT keyword missing"),
            ValidationIssue::MissingFrom => write!(f, "FROM keyword missing after SELECT"),
            ValidationIssue::UnbalancedParentheses { depth } => {
                write!(f, "unbalanced parentheses (depth {})", depth)
            }
            ValidationIssue::UnterminatedLiteral => write!(f, "unterminated quoted literal"),
            ValidationIssue::MultipleStatements => {
                write!(f, "statement separator ';' is not allowed")
            }
        }
    }
}

impl std::error::Error for ValidationIssue {}

/// The SQL with quoted content blanked out, plus facts gathered on the way.
struct Scan {
    code: String,
    depth: i64,
    went_negative: bool,
    unterminated: bool,
    semicolon: bool,
}

fn scan(sql: &str) -> Scan {
    let mut code = String::with_capacity(sql.len());
    let mut quote: Option<char> = None;
    let mut depth = 0i64;
    let mut went_negative = false;
    let mut semicolon = false;

    for ch in sql.chars() {
        match quote {
            // Doubled quotes close and reopen, which nets out.
            Some(q) if ch == q => {
                quote = None;
                code.push(' ');
            }
            Some(_) => code.push(' '),
            None => {
                match ch {
                    '\'' | '"' => quote = Some(ch),
                    '(' => depth += 1,
                    ')' => {
                        depth -= 1;
                        went_negative |= depth < 0;
                    }
                    ';' => semicolon = true,
                    _ => {}
                }
                code.push(if quote.is_some() { ' ' } else { ch });
            }
        }
    }

    Scan {
        code,
        depth,
        went_negative,
        unterminated: quote.is_some(),
        semicolon,
    }
}

/// Check a generated statement.
pub fn validate_sql(sql: &str) -> Result<(), ValidationIssue> {
    if sql.trim().is_empty() {
        return Err(ValidationIssue::Empty);
    }

    let scan = scan(sql);

    let select = SELECT_KEYWORD
        .find(&scan.code)
        .ok_or(ValidationIssue::MissingSelect)?;
    if !FROM_KEYWORD.is_match(&scan.code[select.end()..]) {
        return Err(ValidationIssue::MissingFrom);
    }

    if scan.went_negative || scan.depth != 0 {
        return Err(ValidationIssue::UnbalancedParentheses { depth: scan.depth });
    }
    if scan.unterminated {
        return Err(ValidationIssue::UnterminatedLiteral);
    }
    if scan.semicolon {
        return Err(ValidationIssue::MultipleStatements);
    }

    Ok(())
}

//! Error types for statement generation.
//!
//! Every failure that can occur between receiving an [`IntentAnalysis`] and
//! returning SQL is a [`GenerationError`]. The orchestrator converts it into a
//! failed result; [`ErrorKind`] is the stable tag reported to callers.
//!
//! [`IntentAnalysis`]: crate::analysis::IntentAnalysis

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::planner::SqlValue;

/// Result type for generation steps.
pub type CompileResult<T> = Result<T, GenerationError>;

/// Any failure while turning an analysis into SQL.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenerationError {
    /// Malformed analysis shape or unusable filter values.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The analysis is not marked ready for SQL generation.
    #[error("analysis is not ready for SQL generation")]
    NotReady,

    /// A referenced table is not in the catalog.
    #[error("unknown table '{0}'")]
    UnknownTable(String),

    /// No chain of relations connects the two tables.
    #[error("no join path between '{from}' and '{to}'")]
    NoJoinPath { from: String, to: String },

    /// The intent type is not one the composer handles.
    #[error("unsupported intent '{0}'")]
    UnsupportedIntent(String),

    /// An aggregate was requested but no eligible column exists.
    #[error("no aggregation column for {intent}: {reason}")]
    MissingAggregationColumn { intent: String, reason: String },

    /// The time filter period is not one the filter compiler knows.
    #[error("unrecognized time period '{0}'")]
    UnrecognizedPeriod(String),

    /// A time filter was given but the main table has no date column.
    #[error("table '{0}' has no date column for time filtering")]
    MissingDateColumn(String),

    /// The composed SQL failed the syntax check. The statement and its bound
    /// values travel with the error.
    #[error("generated SQL failed validation: {reason}")]
    ValidationFailed {
        reason: String,
        sql: String,
        params: Vec<SqlValue>,
    },

    /// Unexpected failure during composition.
    #[error("internal error ({tag}): {message}")]
    Internal { tag: String, message: String },
}

impl GenerationError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn no_join_path(from: &str, to: &str) -> Self {
        Self::NoJoinPath {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn missing_column(intent: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self::MissingAggregationColumn {
            intent: intent.to_string(),
            reason: reason.into(),
        }
    }

    /// The stable category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::NotReady => ErrorKind::NotReady,
            Self::UnknownTable(_) => ErrorKind::UnknownTable,
            Self::NoJoinPath { .. } => ErrorKind::NoJoinPath,
            Self::UnsupportedIntent(_) => ErrorKind::UnsupportedIntent,
            Self::MissingAggregationColumn { .. } => ErrorKind::MissingAggregationColumn,
            Self::UnrecognizedPeriod(_) => ErrorKind::UnrecognizedPeriod,
            Self::MissingDateColumn(_) => ErrorKind::MissingDateColumn,
            Self::ValidationFailed { .. } => ErrorKind::ValidationFailed,
            Self::Internal { .. } => ErrorKind::InternalError,
        }
    }
}

/// Error category reported in a failed result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    NotReady,
    UnknownTable,
    NoJoinPath,
    UnsupportedIntent,
    MissingAggregationColumn,
    UnrecognizedPeriod,
    MissingDateColumn,
    ValidationFailed,
    InternalError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::NotReady => "not_ready",
            ErrorKind::UnknownTable => "unknown_table",
            ErrorKind::NoJoinPath => "no_join_path",
            ErrorKind::UnsupportedIntent => "unsupported_intent",
            ErrorKind::MissingAggregationColumn => "missing_aggregation_column",
            ErrorKind::UnrecognizedPeriod => "unrecognized_period",
            ErrorKind::MissingDateColumn => "missing_date_column",
            ErrorKind::ValidationFailed => "validation_failed",
            ErrorKind::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

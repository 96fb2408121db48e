//! # intentql
//!
//! Compiles the structured analysis of a natural-language request into a
//! single read-only SQL statement.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │             IntentAnalysis (intent + entities)           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [catalog + relation graph]
//! ┌─────────────────────────────────────────────────────────┐
//! │            Aliases + JOIN clauses (join paths)           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [filter compiler]
//! ┌─────────────────────────────────────────────────────────┐
//! │          WHERE clause (time predicate + filters)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [statement composer]
//! ┌─────────────────────────────────────────────────────────┐
//! │              Query → SQL text + bound values             │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [validator]
//! ┌─────────────────────────────────────────────────────────┐
//! │                    GenerationResult                      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! [`compile::SqlGenerator`] drives the whole pipeline.

pub mod analysis;
pub mod catalog;
pub mod compile;
pub mod config;
pub mod planner;
pub mod semantic;
pub mod sql;
pub mod stats;
pub mod validation;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::analysis::{
        AnalysisMetadata, Entities, Filter, Intent, IntentAnalysis, RawEntity, TableReference,
        TimeFilter,
    };
    pub use crate::catalog::{SchemaCatalog, SchemaDescriptor, TableInfo};
    pub use crate::compile::{CompileOptions, GenerationResult, SqlGenerator};
    pub use crate::config::Settings;
    pub use crate::planner::{
        IntentKind, ModifierPhrases, SqlValue, UnknownPeriodPolicy, ValueBinding,
    };
    pub use crate::semantic::{
        ErrorKind, GenerationError, JoinPathStrategy, Relation, RelationGraph,
    };
    pub use crate::sql::Dialect;
    pub use crate::stats::{GenerationStats, StatsSnapshot};
}

pub use compile::{CompileOptions, GenerationResult, SqlGenerator};
pub use sql::Dialect;

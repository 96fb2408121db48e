//! End-to-end generation from an intent analysis to SQL.
//!
//! This module provides the high-level API:
//!
//! ```text
//! IntentAnalysis → Check → Aliases + Joins → WHERE → Compose → Validate → GenerationResult
//! ```
//!
//! # Example
//!
//! ```
//! use intentql::compile::{CompileOptions, SqlGenerator};
//!
//! let generator = SqlGenerator::with_default_catalog(CompileOptions::default()).unwrap();
//! let result = generator.generate_json(r#"{
//!     "intent": {"type": "SELECT", "confidence": 0.95},
//!     "entities": {
//!         "tables": [{"table": "orders"}, {"table": "customers"}],
//!         "filters": [{"column": "city", "value": "Izmir", "table": "customers"}]
//!     },
//!     "analysis_metadata": {"sql_ready": true}
//! }"#);
//!
//! assert!(result.success);
//! assert!(result.sql.unwrap().contains("JOIN customers t1 ON t0.customer_id = t1.id"));
//! assert_eq!(result.params.len(), 1);
//! ```

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::analysis::IntentAnalysis;
use crate::catalog::{northwind_catalog, northwind_relations, SchemaCatalog, TableInfo};
use crate::planner::{
    build_where_clause, detect_modifier, Bindings, ComposeOptions, IntentKind, JoinBuilder,
    ModifierPhrases, SqlValue, StatementComposer, TimePeriod, UnknownPeriodPolicy, ValueBinding,
    WhereOptions,
};
use crate::semantic::error::{CompileResult, ErrorKind, GenerationError};
use crate::semantic::relation_graph::{GraphError, JoinPathStrategy, RelationGraph};
use crate::sql::Dialect;
use crate::stats::{GenerationStats, StatsSnapshot};
use crate::validation::validate_sql;

// ============================================================================
// Options
// ============================================================================

/// Options for generation.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// SQL dialect to generate.
    pub dialect: Dialect,
    /// How join paths are chosen.
    pub join_path: JoinPathStrategy,
    /// What to do with an unrecognized time period.
    pub unknown_period: UnknownPeriodPolicy,
    /// Placeholders or inline literals for user values.
    pub value_binding: ValueBinding,
    /// LIMIT for plain SELECT statements.
    pub select_limit: Option<u64>,
    /// Phrases signalling a MAX/MIN modifier.
    pub modifiers: ModifierPhrases,
}

impl CompileOptions {
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_join_path(mut self, strategy: JoinPathStrategy) -> Self {
        self.join_path = strategy;
        self
    }

    pub fn with_unknown_period(mut self, policy: UnknownPeriodPolicy) -> Self {
        self.unknown_period = policy;
        self
    }

    pub fn with_value_binding(mut self, binding: ValueBinding) -> Self {
        self.value_binding = binding;
        self
    }

    pub fn with_select_limit(mut self, limit: Option<u64>) -> Self {
        self.select_limit = limit;
        self
    }

    pub fn with_modifiers(mut self, phrases: ModifierPhrases) -> Self {
        self.modifiers = phrases;
        self
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Rough size of a statement, by number of requested tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

impl Complexity {
    pub fn from_table_count(count: usize) -> Self {
        match count {
            0 | 1 => Complexity::Simple,
            2 => Complexity::Medium,
            _ => Complexity::Complex,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationMetadata {
    /// Lower-case intent, e.g. `count`.
    pub query_type: String,
    pub complexity: Complexity,
    pub join_count: usize,
    pub table_info: Vec<TableInfo>,
}

/// Context attached to input rejections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugInfo {
    pub available_tables: Vec<String>,
    pub sql_ready: Option<bool>,
}

/// Outcome of one generation. Always returned, success or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    pub success: bool,
    /// The statement. Also set when validation failed, for inspection.
    pub sql: Option<String>,
    /// Bound values in placeholder order. Kept alongside `sql` on a failed
    /// validation.
    pub params: Vec<SqlValue>,
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
    pub intent: Option<String>,
    pub tables: Vec<String>,
    pub confidence: Option<f64>,
    pub has_time_filter: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<GenerationMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<DebugInfo>,
}

impl GenerationResult {
    fn failure(analysis: Option<&IntentAnalysis>, error: &GenerationError) -> Self {
        let (sql, params) = match error {
            GenerationError::ValidationFailed { sql, params, .. } => {
                (Some(sql.clone()), params.clone())
            }
            _ => (None, Vec::new()),
        };
        Self {
            success: false,
            sql,
            params,
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
            intent: analysis.map(|a| a.intent.kind.clone()),
            tables: analysis
                .map(|a| a.table_names().into_iter().map(String::from).collect())
                .unwrap_or_default(),
            confidence: analysis.map(|a| a.intent.confidence),
            has_time_filter: analysis.is_some_and(|a| !a.entities.time_filters.is_empty()),
            metadata: None,
            debug_info: None,
        }
    }

    /// The error category, if generation failed.
    pub fn kind(&self) -> Option<ErrorKind> {
        self.error_kind
    }
}

/// What the generator supports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupportedFeatures {
    pub supported_intents: Vec<&'static str>,
    pub supported_tables: Vec<String>,
    pub time_filters: Vec<&'static str>,
    pub total_table_count: usize,
}

/// A statement that passed validation.
struct CompiledStatement {
    kind: IntentKind,
    sql: String,
    params: Vec<SqlValue>,
    tables: Vec<String>,
    join_count: usize,
}

// ============================================================================
// Generator
// ============================================================================

/// Turns [`IntentAnalysis`] values into SQL.
///
/// The catalog and relation graph are read-only after construction, so one
/// generator can serve many threads at once.
#[derive(Debug)]
pub struct SqlGenerator {
    catalog: SchemaCatalog,
    graph: RelationGraph,
    options: CompileOptions,
    stats: Arc<GenerationStats>,
}

impl SqlGenerator {
    pub fn new(catalog: SchemaCatalog, graph: RelationGraph, options: CompileOptions) -> Self {
        Self {
            catalog,
            graph,
            options,
            stats: Arc::new(GenerationStats::new()),
        }
    }

    /// Generator over the built-in trading catalog.
    pub fn with_default_catalog(options: CompileOptions) -> Result<Self, GraphError> {
        let graph = RelationGraph::new(northwind_relations())?;
        Ok(Self::new(northwind_catalog(), graph, options))
    }

    /// Record statistics into a shared collector.
    pub fn with_stats(mut self, stats: Arc<GenerationStats>) -> Self {
        self.stats = stats;
        self
    }

    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    pub fn graph(&self) -> &RelationGraph {
        &self.graph
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Current statistics.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Generate SQL for a JSON document.
    pub fn generate_json(&self, json: &str) -> GenerationResult {
        match serde_json::from_str::<serde_json::Value>(json) {
            Ok(value) => self.generate_value(value),
            Err(e) => self.reject_document(format!("malformed JSON: {e}"), None),
        }
    }

    /// Generate SQL for an untyped analysis value.
    pub fn generate_value(&self, value: serde_json::Value) -> GenerationResult {
        let sql_ready = value
            .pointer("/analysis_metadata/sql_ready")
            .and_then(serde_json::Value::as_bool);
        match serde_json::from_value::<IntentAnalysis>(value) {
            Ok(analysis) => self.generate(&analysis),
            Err(e) => self.reject_document(format!("malformed analysis: {e}"), sql_ready),
        }
    }

    /// Generate SQL for one analysis.
    ///
    /// Never panics and never returns early without a result: every failure
    /// becomes a `GenerationResult` with `success == false`.
    #[instrument(
        skip_all,
        fields(
            intent = %analysis.intent.kind,
            main_table = analysis.main_table().unwrap_or_default(),
        )
    )]
    pub fn generate(&self, analysis: &IntentAnalysis) -> GenerationResult {
        self.stats.record_attempt();

        match guarded(|| self.compile(analysis)) {
            Ok(statement) => {
                self.stats.record_success();
                info!(
                    query_type = %statement.kind,
                    joins = statement.join_count,
                    params = statement.params.len(),
                    "generated SQL"
                );
                self.success(analysis, statement)
            }
            Err(error) => {
                warn!(kind = %error.kind(), %error, "generation failed");
                let mut result = GenerationResult::failure(Some(analysis), &error);
                if matches!(error.kind(), ErrorKind::InvalidInput | ErrorKind::NotReady) {
                    result.debug_info = Some(self.debug_info(Some(analysis.analysis_metadata.sql_ready)));
                }
                result
            }
        }
    }

    /// What this generator supports.
    pub fn supported_features(&self) -> SupportedFeatures {
        let tables: Vec<String> = self
            .catalog
            .get_all_tables()
            .into_iter()
            .map(String::from)
            .collect();
        SupportedFeatures {
            supported_intents: IntentKind::ALL.iter().map(IntentKind::as_str).collect(),
            total_table_count: tables.len(),
            supported_tables: tables,
            time_filters: TimePeriod::ALL.iter().map(TimePeriod::as_str).collect(),
        }
    }

    // ------------------------------------------------------------------------
    // Pipeline
    // ------------------------------------------------------------------------

    fn compile(&self, analysis: &IntentAnalysis) -> CompileResult<CompiledStatement> {
        check_shape(analysis)?;
        if !analysis.analysis_metadata.sql_ready {
            return Err(GenerationError::NotReady);
        }

        let kind: IntentKind = analysis.intent.kind.parse()?;
        let tables = self.requested_tables(analysis)?;

        let plan = JoinBuilder::new(&self.graph, self.options.join_path).build(&tables)?;
        debug!(aliases = plan.aliases.len(), joins = plan.joins.len(), "planned joins");

        let mut bindings = Bindings::new(self.options.value_binding);
        let where_clause = build_where_clause(
            &analysis.entities.time_filters,
            &analysis.entities.filters,
            &plan.aliases,
            &self.catalog,
            WhereOptions {
                unknown_period: self.options.unknown_period,
            },
            &mut bindings,
        )?;

        let modifier = if kind.accepts_modifier() {
            detect_modifier(
                &analysis.entities,
                analysis.intent.label.as_deref(),
                &self.options.modifiers,
            )
        } else {
            None
        };

        let composer = StatementComposer::new(
            &self.catalog,
            &tables,
            &plan,
            where_clause,
            ComposeOptions {
                select_limit: self.options.select_limit,
            },
        );
        let query = composer.compose(kind, &analysis.intent, modifier)?;
        let sql = query.to_sql(self.options.dialect);
        let params = checked(&sql, bindings.into_params())?;

        Ok(CompiledStatement {
            kind,
            sql,
            params,
            join_count: plan.joins.len(),
            tables,
        })
    }

    /// Requested tables without duplicates, first occurrence kept. Every
    /// table must be in the catalog.
    fn requested_tables(&self, analysis: &IntentAnalysis) -> CompileResult<Vec<String>> {
        let mut tables: Vec<String> = Vec::with_capacity(analysis.entities.tables.len());
        for name in analysis.table_names() {
            if tables.iter().any(|t| t == name) {
                debug!(table = name, "duplicate table reference ignored");
                continue;
            }
            if !self.catalog.contains(name) {
                return Err(GenerationError::UnknownTable(name.to_string()));
            }
            tables.push(name.to_string());
        }
        Ok(tables)
    }

    fn success(&self, analysis: &IntentAnalysis, statement: CompiledStatement) -> GenerationResult {
        let table_info = statement
            .tables
            .iter()
            .filter_map(|t| self.catalog.get_table_info(t))
            .collect();

        GenerationResult {
            success: true,
            sql: Some(statement.sql),
            params: statement.params,
            error: None,
            error_kind: None,
            intent: Some(analysis.intent.kind.clone()),
            confidence: Some(analysis.intent.confidence),
            has_time_filter: !analysis.entities.time_filters.is_empty(),
            metadata: Some(GenerationMetadata {
                query_type: statement.kind.as_str().to_ascii_lowercase(),
                complexity: Complexity::from_table_count(statement.tables.len()),
                join_count: statement.join_count,
                table_info,
            }),
            tables: statement.tables,
            debug_info: None,
        }
    }

    /// Count and report a document that did not deserialize.
    fn reject_document(&self, message: String, sql_ready: Option<bool>) -> GenerationResult {
        self.stats.record_attempt();
        let error = GenerationError::InvalidInput(message);
        warn!(%error, "rejected analysis document");
        let mut result = GenerationResult::failure(None, &error);
        result.debug_info = Some(self.debug_info(sql_ready));
        result
    }

    fn debug_info(&self, sql_ready: Option<bool>) -> DebugInfo {
        DebugInfo {
            available_tables: self
                .catalog
                .get_all_tables()
                .into_iter()
                .map(String::from)
                .collect(),
            sql_ready,
        }
    }
}

/// Run one compilation, turning a panic into an internal error.
fn guarded<T>(f: impl FnOnce() -> CompileResult<T>) -> CompileResult<T> {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        Err(GenerationError::Internal {
            tag: "panic".into(),
            message: panic_message(payload.as_ref()),
        })
    })
}

/// Pass the bound values through if `sql` validates.
fn checked(sql: &str, params: Vec<SqlValue>) -> CompileResult<Vec<SqlValue>> {
    match validate_sql(sql) {
        Ok(()) => Ok(params),
        Err(issue) => Err(GenerationError::ValidationFailed {
            reason: issue.to_string(),
            sql: sql.to_string(),
            params,
        }),
    }
}

/// Shape checks the type system does not already guarantee.
fn check_shape(analysis: &IntentAnalysis) -> CompileResult<()> {
    if analysis.intent.kind.trim().is_empty() {
        return Err(GenerationError::invalid_input("intent type is empty"));
    }
    if !analysis.intent.confidence.is_finite() {
        return Err(GenerationError::invalid_input("intent confidence is not a number"));
    }
    if analysis.entities.tables.is_empty() {
        return Err(GenerationError::invalid_input("no tables referenced"));
    }
    if analysis
        .entities
        .tables
        .iter()
        .any(|t| t.table.trim().is_empty())
    {
        return Err(GenerationError::invalid_input("table reference without a name"));
    }
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

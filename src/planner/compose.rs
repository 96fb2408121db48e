//! Statement composition: one builder per intent shape.
//!
//! [`IntentKind`] selects the shape; every shape starts from the same base
//! (FROM the main table, all joins, the WHERE condition) and adds its own
//! SELECT list, grouping, and ordering.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use super::join_builder::JoinPlan;
use super::modifier::AggregationModifier;
use crate::analysis::Intent;
use crate::catalog::{SchemaCatalog, SchemaDescriptor};
use crate::semantic::error::{CompileResult, GenerationError};
use crate::sql::dialect::helpers::is_plain_identifier;
use crate::sql::expr::{avg, col, count, count_star, max, min, sum, table_col, Expr};
use crate::sql::query::{OrderByExpr, Query, SelectExpr, TableRef};

const GROUP_FIELD: &str = "group_field";
const TOTAL_COUNT: &str = "total_count";

/// Supported intent types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentKind {
    Select,
    Count,
    Sum,
    Avg,
    Max,
    Min,
    Aggregate,
}

impl IntentKind {
    pub const ALL: [IntentKind; 7] = [
        IntentKind::Select,
        IntentKind::Count,
        IntentKind::Sum,
        IntentKind::Avg,
        IntentKind::Max,
        IntentKind::Min,
        IntentKind::Aggregate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntentKind::Select => "SELECT",
            IntentKind::Count => "COUNT",
            IntentKind::Sum => "SUM",
            IntentKind::Avg => "AVG",
            IntentKind::Max => "MAX",
            IntentKind::Min => "MIN",
            IntentKind::Aggregate => "AGGREGATE",
        }
    }

    /// Whether a MAX/MIN modifier changes this shape.
    pub fn accepts_modifier(&self) -> bool {
        matches!(self, IntentKind::Count | IntentKind::Sum)
    }
}

impl FromStr for IntentKind {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == upper)
            .ok_or_else(|| GenerationError::UnsupportedIntent(s.to_string()))
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composer settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComposeOptions {
    /// LIMIT applied to plain SELECT statements.
    pub select_limit: Option<u64>,
}

/// Extreme-value aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extreme {
    Max,
    Min,
}

impl Extreme {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MAX" => Some(Extreme::Max),
            "MIN" => Some(Extreme::Min),
            _ => None,
        }
    }

    fn apply(self, expr: Expr) -> Expr {
        match self {
            Extreme::Max => max(expr),
            Extreme::Min => min(expr),
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Extreme::Max => "max",
            Extreme::Min => "min",
        }
    }
}

/// Builds statements for one request.
pub struct StatementComposer<'a> {
    catalog: &'a SchemaCatalog,
    tables: &'a [String],
    plan: &'a JoinPlan,
    where_clause: Option<Expr>,
    options: ComposeOptions,
}

impl<'a> StatementComposer<'a> {
    /// `tables` are the requested tables, main table first, without duplicates.
    pub fn new(
        catalog: &'a SchemaCatalog,
        tables: &'a [String],
        plan: &'a JoinPlan,
        where_clause: Option<Expr>,
        options: ComposeOptions,
    ) -> Self {
        Self {
            catalog,
            tables,
            plan,
            where_clause,
            options,
        }
    }

    /// Compose the statement for `kind`.
    pub fn compose(
        &self,
        kind: IntentKind,
        intent: &Intent,
        modifier: Option<AggregationModifier>,
    ) -> CompileResult<Query> {
        if modifier.is_some() && !kind.accepts_modifier() {
            debug!(intent = %kind, "aggregation modifier ignored for this intent");
        }

        match kind {
            IntentKind::Select => self.select(),
            IntentKind::Count => self.count(modifier),
            IntentKind::Sum => self.sum(modifier),
            IntentKind::Avg => self.avg(),
            IntentKind::Max => self.extreme(kind, Extreme::Max, intent.target_column.as_deref()),
            IntentKind::Min => self.extreme(kind, Extreme::Min, intent.target_column.as_deref()),
            IntentKind::Aggregate => self.aggregate(intent),
        }
    }

    // =========================================================================
    // Shapes
    // =========================================================================

    /// Display columns of every requested table.
    fn select(&self) -> CompileResult<Query> {
        let mut columns = Vec::new();
        for table in self.tables {
            let alias = self.alias(table)?;
            let schema = self.schema(table)?;
            columns.extend(
                schema
                    .display_columns
                    .iter()
                    .map(|c| SelectExpr::new(table_col(alias, c))),
            );
        }

        let mut query = self.base()?.select(columns);
        if let Some(limit) = self.options.select_limit {
            query = query.limit(limit);
        }
        Ok(query)
    }

    /// Row count, grouped by the main table's first display column.
    fn count(&self, modifier: Option<AggregationModifier>) -> CompileResult<Query> {
        let (main_table, main_alias) = self.main()?;
        let schema = self.schema(main_table)?;
        let counted = if schema.counts_rows() {
            count_star()
        } else {
            count(table_col(main_alias, &schema.countable_column))
        };

        self.grouped(counted, TOTAL_COUNT, modifier)
    }

    /// SUM of the last requested table declaring sum columns.
    fn sum(&self, modifier: Option<AggregationModifier>) -> CompileResult<Query> {
        let (table, schema) = self
            .last_table_with(|s| !s.sum_columns.is_empty())?
            .ok_or_else(|| {
                GenerationError::missing_column(
                    IntentKind::Sum,
                    "no referenced table declares sum columns",
                )
            })?;

        let column = &schema.sum_columns[0];
        let target = table_col(self.alias(table)?, column);
        self.grouped(sum(target), &format!("sum_{column}"), modifier)
    }

    /// AVG of the first requested table declaring avg columns.
    fn avg(&self) -> CompileResult<Query> {
        let (table, schema) = self
            .first_table_with(|s| !s.avg_columns.is_empty())?
            .ok_or_else(|| {
                GenerationError::missing_column(
                    IntentKind::Avg,
                    "no referenced table declares avg columns",
                )
            })?;

        let column = &schema.avg_columns[0];
        let target = table_col(self.alias(table)?, column);
        Ok(self
            .base()?
            .select(vec![SelectExpr::new(avg(target)).with_alias(&format!("avg_{column}"))]))
    }

    /// MAX/MIN of an explicit column, or the first aggregatable column.
    fn extreme(
        &self,
        kind: IntentKind,
        func: Extreme,
        target_column: Option<&str>,
    ) -> CompileResult<Query> {
        let (alias, column) = match target_column {
            Some(column) => self.resolve_column(column)?,
            None => {
                let (table, schema) = self
                    .first_table_with(|s| !s.avg_columns.is_empty() || !s.sum_columns.is_empty())?
                    .ok_or_else(|| {
                        GenerationError::missing_column(
                            kind,
                            "no target column and no referenced table declares aggregatable columns",
                        )
                    })?;
                let column = schema
                    .avg_columns
                    .first()
                    .or(schema.sum_columns.first())
                    .ok_or_else(|| {
                        GenerationError::missing_column(kind, "no aggregatable column")
                    })?;
                (self.alias(table)?, column.as_str())
            }
        };

        self.extreme_query(func, alias, column)
    }

    /// Explicit MIN/MAX function over an explicit column.
    fn aggregate(&self, intent: &Intent) -> CompileResult<Query> {
        let kind = IntentKind::Aggregate;
        let func = intent
            .function
            .as_deref()
            .and_then(Extreme::parse)
            .ok_or_else(|| GenerationError::missing_column(kind, "function must be MIN or MAX"))?;
        let column = intent
            .target_column
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| GenerationError::missing_column(kind, "target column missing"))?;

        let (alias, column) = self.resolve_column(column)?;
        self.extreme_query(func, alias, column)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// FROM the main table, plus joins and WHERE.
    fn base(&self) -> CompileResult<Query> {
        let (main_table, main_alias) = self.main()?;
        Ok(Query::new()
            .from(TableRef::new(main_table).with_alias(main_alias))
            .joins(self.plan.joins.iter().cloned())
            .filter_opt(self.where_clause.clone()))
    }

    /// `SELECT <g> AS group_field, <agg> AS <name> ... GROUP BY <g>`, with the
    /// modifier adding `ORDER BY <name> DESC|ASC LIMIT 1`. Without display
    /// columns on the main table the aggregate is ungrouped.
    fn grouped(
        &self,
        aggregate: Expr,
        name: &str,
        modifier: Option<AggregationModifier>,
    ) -> CompileResult<Query> {
        let (main_table, main_alias) = self.main()?;
        let schema = self.schema(main_table)?;
        let base = self.base()?;

        let Some(group_column) = schema.display_columns.first() else {
            if modifier.is_some() {
                debug!(table = main_table, "no group column, aggregation modifier ignored");
            }
            return Ok(base.select(vec![SelectExpr::new(aggregate).with_alias(name)]));
        };

        let group = table_col(main_alias, group_column);
        let mut query = base
            .select(vec![
                SelectExpr::new(group.clone()).with_alias(GROUP_FIELD),
                SelectExpr::new(aggregate).with_alias(name),
            ])
            .group_by(vec![group]);

        if let Some(modifier) = modifier {
            query = query
                .order_by(vec![OrderByExpr::new(col(name), modifier.direction())])
                .limit(1);
        }
        Ok(query)
    }

    fn extreme_query(&self, func: Extreme, alias: &str, column: &str) -> CompileResult<Query> {
        let name = format!("{}_{}", func.prefix(), column);
        Ok(self.base()?.select(vec![
            SelectExpr::new(func.apply(table_col(alias, column))).with_alias(&name),
        ]))
    }

    /// Attribute an explicit column to the first requested table declaring it,
    /// otherwise the main table.
    fn resolve_column<'c>(&self, column: &'c str) -> CompileResult<(&'a str, &'c str)> {
        if !is_plain_identifier(column) {
            return Err(GenerationError::invalid_input(format!(
                "invalid target column '{column}'"
            )));
        }

        let owner = self
            .first_table_with(|s| s.has_column(column))?
            .map(|(t, _)| t.as_str());
        let table = match owner {
            Some(table) => table,
            None => self.main()?.0,
        };
        Ok((self.alias(table)?, column))
    }

    fn first_table_with(
        &self,
        predicate: impl Fn(&SchemaDescriptor) -> bool,
    ) -> CompileResult<Option<(&'a String, &'a SchemaDescriptor)>> {
        for table in self.tables {
            let schema = self.schema(table)?;
            if predicate(schema) {
                return Ok(Some((table, schema)));
            }
        }
        Ok(None)
    }

    fn last_table_with(
        &self,
        predicate: impl Fn(&SchemaDescriptor) -> bool,
    ) -> CompileResult<Option<(&'a String, &'a SchemaDescriptor)>> {
        for table in self.tables.iter().rev() {
            let schema = self.schema(table)?;
            if predicate(schema) {
                return Ok(Some((table, schema)));
            }
        }
        Ok(None)
    }

    fn main(&self) -> CompileResult<(&'a str, &'a str)> {
        self.plan
            .aliases
            .main()
            .ok_or_else(|| GenerationError::invalid_input("no tables referenced"))
    }

    fn alias(&self, table: &str) -> CompileResult<&'a str> {
        self.plan.aliases.get(table).ok_or_else(|| GenerationError::Internal {
            tag: "alias".into(),
            message: format!("table '{table}' has no alias"),
        })
    }

    fn schema(&self, table: &str) -> CompileResult<&'a SchemaDescriptor> {
        self.catalog
            .get_table_schema(table)
            .ok_or_else(|| GenerationError::UnknownTable(table.to_string()))
    }
}

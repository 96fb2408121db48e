//! Filter compilation: column comparisons, value binding, and the WHERE clause.
//!
//! User-supplied values never reach SQL text unescaped. In the default
//! [`ValueBinding::Parameterized`] mode each value becomes a placeholder and
//! is collected, in placeholder order, into the statement's parameter list.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::time::{time_predicate, UnknownPeriodPolicy};
use crate::analysis::{Filter, TimeFilter};
use crate::catalog::SchemaCatalog;
use crate::semantic::alias::AliasMap;
use crate::semantic::error::{CompileResult, GenerationError};
use crate::sql::dialect::helpers::is_plain_identifier;
use crate::sql::expr::{conjunction, param, table_col, BinaryOperator, Expr, ExprExt, Literal};

/// How user values enter the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueBinding {
    /// Placeholders plus a parameter list.
    #[default]
    Parameterized,
    /// Escaped literals in the SQL text.
    Inline,
}

/// A scalar value bound to a statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl SqlValue {
    /// Convert a JSON filter value. Only scalars are accepted.
    pub fn from_json(value: &serde_json::Value) -> CompileResult<Self> {
        use serde_json::Value;

        match value {
            Value::String(s) => Ok(SqlValue::Text(s.clone())),
            Value::Bool(b) => Ok(SqlValue::Bool(*b)),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Ok(SqlValue::Int(i)),
                (None, Some(f)) => Ok(SqlValue::Float(f)),
                _ => Err(GenerationError::invalid_input(format!(
                    "unsupported number {n}"
                ))),
            },
            Value::Null | Value::Array(_) | Value::Object(_) => Err(
                GenerationError::invalid_input(format!("filter value must be a scalar, got {value}")),
            ),
        }
    }

    fn into_literal(self) -> Expr {
        Expr::Literal(match self {
            SqlValue::Int(i) => Literal::Int(i),
            SqlValue::Float(f) => Literal::Float(f),
            SqlValue::Text(s) => Literal::String(s),
            SqlValue::Bool(b) => Literal::Bool(b),
        })
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Int(i) => write!(f, "{i}"),
            SqlValue::Float(x) => write!(f, "{x}"),
            SqlValue::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            SqlValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Collects bound values for one statement.
#[derive(Debug, Clone)]
pub struct Bindings {
    mode: ValueBinding,
    params: Vec<SqlValue>,
}

impl Bindings {
    pub fn new(mode: ValueBinding) -> Self {
        Self {
            mode,
            params: Vec::new(),
        }
    }

    /// Expression standing for `value`: a placeholder or an escaped literal.
    pub fn bind(&mut self, value: SqlValue) -> Expr {
        match self.mode {
            ValueBinding::Parameterized => {
                self.params.push(value);
                param(self.params.len())
            }
            ValueBinding::Inline => value.into_literal(),
        }
    }

    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    pub fn into_params(self) -> Vec<SqlValue> {
        self.params
    }
}

/// Comparison operators accepted in filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Lt,
}

impl FromStr for FilterOperator {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "=" => Ok(FilterOperator::Eq),
            "!=" | "<>" => Ok(FilterOperator::Ne),
            ">" => Ok(FilterOperator::Gt),
            "<" => Ok(FilterOperator::Lt),
            other => Err(GenerationError::invalid_input(format!(
                "unsupported filter operator '{other}'"
            ))),
        }
    }
}

impl From<FilterOperator> for BinaryOperator {
    fn from(op: FilterOperator) -> Self {
        match op {
            FilterOperator::Eq => BinaryOperator::Eq,
            FilterOperator::Ne => BinaryOperator::Ne,
            FilterOperator::Gt => BinaryOperator::Gt,
            FilterOperator::Lt => BinaryOperator::Lt,
        }
    }
}

/// Compile one column filter against the aliased tables.
pub fn column_predicate(
    filter: &Filter,
    aliases: &AliasMap,
    bindings: &mut Bindings,
) -> CompileResult<Expr> {
    let alias = match &filter.table {
        Some(table) => aliases.get(table).ok_or_else(|| {
            GenerationError::invalid_input(format!(
                "filter on '{}' names table '{table}', which is not part of the query",
                filter.column
            ))
        })?,
        None => aliases
            .main()
            .map(|(_, alias)| alias)
            .ok_or_else(|| GenerationError::invalid_input("no tables to filter"))?,
    };

    if !is_plain_identifier(&filter.column) {
        return Err(GenerationError::invalid_input(format!(
            "invalid filter column '{}'",
            filter.column
        )));
    }

    let op: FilterOperator = filter.operator.parse()?;
    let value = bindings.bind(SqlValue::from_json(&filter.value)?);
    Ok(table_col(alias, &filter.column).binary(op.into(), value))
}

/// Options for building a WHERE clause.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhereOptions {
    pub unknown_period: UnknownPeriodPolicy,
}

/// Build the WHERE condition: the time predicate first, then column filters,
/// joined with AND. `None` when nothing applies.
pub fn build_where_clause(
    time_filters: &[TimeFilter],
    filters: &[Filter],
    aliases: &AliasMap,
    catalog: &SchemaCatalog,
    options: WhereOptions,
    bindings: &mut Bindings,
) -> CompileResult<Option<Expr>> {
    let mut predicates = Vec::with_capacity(filters.len() + 1);

    if let Some(time_filter) = time_filters.first() {
        if time_filters.len() > 1 {
            debug!(
                ignored = time_filters.len() - 1,
                "only the first time filter is applied"
            );
        }

        let (main_table, main_alias) = aliases
            .main()
            .ok_or_else(|| GenerationError::invalid_input("no tables to filter"))?;
        let date_column = catalog
            .get_table_schema(main_table)
            .and_then(|schema| schema.date_column.as_deref())
            .ok_or_else(|| GenerationError::MissingDateColumn(main_table.to_string()))?;

        let column = table_col(main_alias, date_column);
        predicates.push(time_predicate(
            &column,
            time_filter,
            options.unknown_period,
            bindings,
        )?);
    }

    for filter in filters {
        predicates.push(column_predicate(filter, aliases, bindings)?);
    }

    Ok(conjunction(predicates))
}

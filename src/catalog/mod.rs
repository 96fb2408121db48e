//! Schema catalog - static description of the tables a query may reference.
//!
//! The catalog is built once at startup, validated, and then shared read-only
//! by every compilation. Each table carries a [`SchemaDescriptor`] naming the
//! columns shown by default, the date column used by time filters, and the
//! columns eligible for SUM and AVG.

mod northwind;

pub use northwind::{northwind_catalog, northwind_relations};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sql::dialect::helpers::is_plain_identifier;

/// Column used by COUNT when a schema does not name one.
pub const COUNT_ALL: &str = "*";

fn default_countable() -> String {
    COUNT_ALL.to_string()
}

/// Errors raised while building a catalog.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("invalid table name '{0}'")]
    InvalidTableName(String),

    #[error("table '{table}': invalid column name '{column}'")]
    InvalidColumnName { table: String, column: String },

    #[error("catalog declares no tables")]
    Empty,
}

/// Description of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    /// Columns shown by default, in output order.
    #[serde(default)]
    pub display_columns: Vec<String>,
    /// Column used for time filters.
    #[serde(default)]
    pub date_column: Option<String>,
    /// Columns eligible for SUM; the first one is the default target.
    #[serde(default)]
    pub sum_columns: Vec<String>,
    /// Columns eligible for AVG; the first one is the default target.
    #[serde(default)]
    pub avg_columns: Vec<String>,
    /// Column counted by COUNT (`*` for row count).
    #[serde(default = "default_countable")]
    pub countable_column: String,
}

impl Default for SchemaDescriptor {
    fn default() -> Self {
        Self {
            display_columns: Vec::new(),
            date_column: None,
            sum_columns: Vec::new(),
            avg_columns: Vec::new(),
            countable_column: default_countable(),
        }
    }
}

impl SchemaDescriptor {
    /// Descriptor with the given display columns and nothing else.
    pub fn new<I, S>(display_columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            display_columns: display_columns.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_date_column(mut self, column: &str) -> Self {
        self.date_column = Some(column.to_string());
        self
    }

    pub fn with_sum_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sum_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_avg_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.avg_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_countable_column(mut self, column: &str) -> Self {
        self.countable_column = column.to_string();
        self
    }

    /// Whether `column` is declared anywhere in this descriptor.
    pub fn has_column(&self, column: &str) -> bool {
        self.display_columns.iter().any(|c| c == column)
            || self.date_column.as_deref() == Some(column)
            || self.sum_columns.iter().any(|c| c == column)
            || self.avg_columns.iter().any(|c| c == column)
            || (self.countable_column != COUNT_ALL && self.countable_column == column)
    }

    /// Whether COUNT should count rows rather than a column.
    pub fn counts_rows(&self) -> bool {
        self.countable_column == COUNT_ALL
    }

    fn columns(&self) -> impl Iterator<Item = &String> {
        self.display_columns
            .iter()
            .chain(self.date_column.iter())
            .chain(self.sum_columns.iter())
            .chain(self.avg_columns.iter())
            .chain(std::iter::once(&self.countable_column).filter(|c| c.as_str() != COUNT_ALL))
    }
}

/// Summary of a table's capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableInfo {
    pub display_column_count: usize,
    pub supports_sum: bool,
    pub supports_avg: bool,
    pub date_column: Option<String>,
}

/// Per-table diagnostics produced by [`SchemaCatalog::compatibility_report`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCompatibility {
    pub schema_valid: bool,
    pub has_display_columns: bool,
    pub supports_aggregation: bool,
    pub has_date_column: bool,
}

/// Immutable table-name to descriptor lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaCatalog {
    tables: BTreeMap<String, SchemaDescriptor>,
}

impl SchemaCatalog {
    /// Build a catalog, rejecting names that are not plain SQL identifiers.
    pub fn new<I>(tables: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (String, SchemaDescriptor)>,
    {
        let tables: BTreeMap<_, _> = tables.into_iter().collect();
        if tables.is_empty() {
            return Err(CatalogError::Empty);
        }

        for (name, schema) in &tables {
            if !is_plain_identifier(name) {
                return Err(CatalogError::InvalidTableName(name.clone()));
            }
            if let Some(bad) = schema.columns().find(|c| !is_plain_identifier(c)) {
                return Err(CatalogError::InvalidColumnName {
                    table: name.clone(),
                    column: bad.clone(),
                });
            }
        }

        Ok(Self { tables })
    }

    pub fn get_table_schema(&self, table: &str) -> Option<&SchemaDescriptor> {
        self.tables.get(table)
    }

    /// All table names, sorted.
    pub fn get_all_tables(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    pub fn get_table_info(&self, table: &str) -> Option<TableInfo> {
        self.tables.get(table).map(|schema| TableInfo {
            display_column_count: schema.display_columns.len(),
            supports_sum: !schema.sum_columns.is_empty(),
            supports_avg: !schema.avg_columns.is_empty(),
            date_column: schema.date_column.clone(),
        })
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Per-table diagnostics, keyed by table name.
    pub fn compatibility_report(&self) -> BTreeMap<String, TableCompatibility> {
        self.tables
            .iter()
            .map(|(name, schema)| {
                let report = TableCompatibility {
                    schema_valid: true,
                    has_display_columns: !schema.display_columns.is_empty(),
                    supports_aggregation: !schema.sum_columns.is_empty()
                        || !schema.avg_columns.is_empty(),
                    has_date_column: schema.date_column.is_some(),
                };
                (name.clone(), report)
            })
            .collect()
    }
}

impl Default for SchemaCatalog {
    fn default() -> Self {
        northwind_catalog()
    }
}

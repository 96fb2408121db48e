//! DuckDB SQL dialect.
//!
//! DuckDB is PostgreSQL-compatible for everything the composer emits;
//! bind parameters use positional `?` markers.

use super::SqlDialect;

/// DuckDB SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct DuckDb;

impl SqlDialect for DuckDb {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".into()
    }
}

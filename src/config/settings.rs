//! TOML-based configuration for intentql.
//!
//! Example configuration:
//! ```toml
//! [compiler]
//! dialect = "postgres"          # or "duckdb"
//! join_path = "first_found"     # or "shortest"
//! unknown_period = "reject"     # or "fallback"
//! value_binding = "parameterized"
//! select_limit = 100
//!
//! [modifiers]
//! max_phrases = ["the most", "highest"]
//! min_phrases = ["the least", "lowest"]
//!
//! [catalog.tables.orders]
//! display_columns = ["id", "customer_id", "order_date"]
//! date_column = "order_date"
//! sum_columns = ["total_amount"]
//!
//! [catalog.tables.customers]
//! display_columns = ["id", "customer_name"]
//!
//! [[catalog.relations]]
//! from = "orders.customer_id"
//! to = "customers.id"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::{northwind_catalog, northwind_relations, CatalogError, SchemaCatalog, SchemaDescriptor};
use crate::compile::{CompileOptions, SqlGenerator};
use crate::planner::{ModifierPhrases, UnknownPeriodPolicy, ValueBinding};
use crate::semantic::relation_graph::{GraphError, JoinPathStrategy, Relation, RelationGraph};
use crate::sql::Dialect;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "INTENTQL_CONFIG";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Invalid relations: {0}")]
    Graph(#[from] GraphError),

    #[error("Relation {relation} references unknown table '{table}'")]
    UnknownRelationTable { relation: String, table: String },
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Statement generation options.
    pub compiler: CompilerSettings,

    /// MAX / MIN phrases.
    pub modifiers: ModifierPhrases,

    /// Custom catalog. The built-in one is used when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<CatalogSettings>,
}

/// `[compiler]` section.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CompilerSettings {
    pub dialect: Dialect,
    pub join_path: JoinPathStrategy,
    pub unknown_period: UnknownPeriodPolicy,
    pub value_binding: ValueBinding,
    pub select_limit: Option<u64>,
}

/// `[catalog]` section.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub tables: BTreeMap<String, SchemaDescriptor>,
    pub relations: Vec<RelationSettings>,
}

/// One `[[catalog.relations]]` entry, both ends as `table.column`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RelationSettings {
    pub from: String,
    pub to: String,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `INTENTQL_CONFIG`
    /// 2. `./intentql.toml`
    /// 3. `<config dir>/intentql/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("intentql.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("intentql").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Generation options described by these settings.
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions::default()
            .with_dialect(self.compiler.dialect)
            .with_join_path(self.compiler.join_path)
            .with_unknown_period(self.compiler.unknown_period)
            .with_value_binding(self.compiler.value_binding)
            .with_select_limit(self.compiler.select_limit)
            .with_modifiers(self.modifiers.clone())
    }

    /// Build a generator from the configured catalog, or the built-in one.
    pub fn build_generator(&self) -> Result<SqlGenerator, SettingsError> {
        let (catalog, graph) = match &self.catalog {
            Some(custom) => custom.build()?,
            None => (northwind_catalog(), RelationGraph::new(northwind_relations())?),
        };
        Ok(SqlGenerator::new(catalog, graph, self.compile_options()))
    }
}

impl CatalogSettings {
    /// Validate and build the catalog and its relation graph. Every relation
    /// must connect two declared tables.
    pub fn build(&self) -> Result<(SchemaCatalog, RelationGraph), SettingsError> {
        let catalog = SchemaCatalog::new(self.tables.clone())?;

        let mut relations = Vec::with_capacity(self.relations.len());
        for entry in &self.relations {
            let relation = Relation::parse(&entry.from, &entry.to)?;
            for table in [&relation.from_table, &relation.to_table] {
                if !catalog.contains(table) {
                    return Err(SettingsError::UnknownRelationTable {
                        relation: relation.to_string(),
                        table: table.clone(),
                    });
                }
            }
            relations.push(relation);
        }

        let graph = RelationGraph::new(relations)?;
        Ok((catalog, graph))
    }
}

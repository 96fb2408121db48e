//! Configuration module for intentql.
//!
//! Handles the TOML settings file and its lookup.

mod settings;

pub use settings::{
    CatalogSettings, CompilerSettings, RelationSettings, Settings, SettingsError, CONFIG_ENV,
};

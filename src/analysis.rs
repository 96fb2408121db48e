//! Input contract: the structured analysis of a natural-language request.
//!
//! An upstream entity extractor produces one [`IntentAnalysis`] per request.
//! Field names follow its JSON output, so documents deserialize directly:
//!
//! ```
//! use intentql::analysis::IntentAnalysis;
//!
//! let analysis: IntentAnalysis = serde_json::from_str(r#"{
//!     "intent": {"type": "COUNT", "confidence": 0.93},
//!     "entities": {"tables": [{"table": "customers"}]},
//!     "analysis_metadata": {"sql_ready": true}
//! }"#).unwrap();
//!
//! assert_eq!(analysis.main_table(), Some("customers"));
//! ```

use serde::{Deserialize, Serialize};

/// Structured analysis of one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentAnalysis {
    pub intent: Intent,
    pub entities: Entities,
    pub analysis_metadata: AnalysisMetadata,
}

impl IntentAnalysis {
    /// The first referenced table, which drives FROM and GROUP BY.
    pub fn main_table(&self) -> Option<&str> {
        self.entities.tables.first().map(|t| t.table.as_str())
    }

    /// Referenced table names in request order.
    pub fn table_names(&self) -> Vec<&str> {
        self.entities
            .tables
            .iter()
            .map(|t| t.table.as_str())
            .collect()
    }
}

/// The classified operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    /// Intent type: `SELECT`, `COUNT`, `SUM`, `AVG`, `MAX`, `MIN` or `AGGREGATE`.
    #[serde(rename = "type")]
    pub kind: String,
    pub confidence: f64,
    /// Free-text description of the intent, scanned for MAX/MIN phrases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Aggregate function for `AGGREGATE` intents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    /// Explicit target column for aggregate intents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_column: Option<String>,
}

impl Intent {
    pub fn new(kind: &str, confidence: f64) -> Self {
        Self {
            kind: kind.into(),
            confidence,
            label: None,
            function: None,
            target_column: None,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_function(mut self, function: &str) -> Self {
        self.function = Some(function.into());
        self
    }

    pub fn with_target_column(mut self, column: &str) -> Self {
        self.target_column = Some(column.into());
        self
    }
}

/// Entities extracted from the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entities {
    pub tables: Vec<TableReference>,
    #[serde(default)]
    pub time_filters: Vec<TimeFilter>,
    #[serde(default)]
    pub filters: Vec<Filter>,
    /// Raw labelled spans from the extractor.
    #[serde(default)]
    pub entities: Vec<RawEntity>,
    /// Explicit `MAX` / `MIN` modifier, when the extractor already decided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation_modifier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableReference {
    pub table: String,
}

impl TableReference {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.into(),
        }
    }
}

fn default_operator() -> String {
    "=".into()
}

/// A column comparison: `column operator value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub column: String,
    #[serde(default = "default_operator")]
    pub operator: String,
    pub value: serde_json::Value,
    /// Table the column belongs to; the main table when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}

impl Filter {
    pub fn new(column: &str, operator: &str, value: impl Into<serde_json::Value>) -> Self {
        Self {
            column: column.into(),
            operator: operator.into(),
            value: value.into(),
            table: None,
        }
    }

    pub fn on_table(mut self, table: &str) -> Self {
        self.table = Some(table.into());
        self
    }
}

/// A time-range descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeFilter {
    pub period: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl TimeFilter {
    pub fn new(period: &str) -> Self {
        Self {
            period: period.into(),
            ..Default::default()
        }
    }

    pub fn on_date(date: &str) -> Self {
        Self {
            period: "specific_date".into(),
            date: Some(date.into()),
            ..Default::default()
        }
    }

    pub fn between(start: &str, end: &str) -> Self {
        Self {
            period: "date_range".into(),
            start_date: Some(start.into()),
            end_date: Some(end.into()),
            ..Default::default()
        }
    }
}

/// A labelled span of the source text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntity {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub text: String,
}

impl RawEntity {
    pub fn new(label: &str, text: &str) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    #[serde(default)]
    pub sql_ready: bool,
}

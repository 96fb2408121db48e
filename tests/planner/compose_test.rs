//! Statement shapes over a custom catalog, driven through the generator.

use intentql::analysis::{AnalysisMetadata, Entities, Intent, IntentAnalysis, RawEntity, TableReference};
use intentql::catalog::{SchemaCatalog, SchemaDescriptor};
use intentql::compile::{CompileOptions, SqlGenerator};
use intentql::semantic::relation_graph::{Relation, RelationGraph};
use intentql::semantic::ErrorKind;

/// `events` has no display columns; `users` counts a specific column.
fn generator(options: CompileOptions) -> SqlGenerator {
    let catalog = SchemaCatalog::new(vec![
        (
            "users".to_string(),
            SchemaDescriptor::new(["id", "email"])
                .with_countable_column("id")
                .with_avg_columns(["age"]),
        ),
        (
            "events".to_string(),
            SchemaDescriptor::default()
                .with_date_column("created_at")
                .with_sum_columns(["duration"]),
        ),
        ("tags".to_string(), SchemaDescriptor::new(["label"])),
    ])
    .unwrap();
    let graph = RelationGraph::new(vec![Relation::parse("events.user_id", "users.id").unwrap()])
        .unwrap();
    SqlGenerator::new(catalog, graph, options)
}

fn request(kind: &str, tables: &[&str]) -> IntentAnalysis {
    IntentAnalysis {
        intent: Intent::new(kind, 0.8),
        entities: Entities {
            tables: tables.iter().map(|t| TableReference::new(t)).collect(),
            ..Default::default()
        },
        analysis_metadata: AnalysisMetadata { sql_ready: true },
    }
}

fn sql_for(analysis: &IntentAnalysis) -> String {
    let result = generator(CompileOptions::default()).generate(analysis);
    assert!(result.success, "{:?}", result.error);
    result.sql.unwrap()
}

#[test]
fn test_count_uses_countable_column() {
    assert_eq!(
        sql_for(&request("COUNT", &["users"])),
        "SELECT t0.id AS group_field, COUNT(t0.id) AS total_count FROM users t0 GROUP BY t0.id"
    );
}

#[test]
fn test_count_without_display_columns_is_ungrouped() {
    let mut analysis = request("count", &["events"]);
    analysis.entities.aggregation_modifier = Some("MAX".into());
    assert_eq!(
        sql_for(&analysis),
        "SELECT COUNT(*) AS total_count FROM events t0"
    );
}

#[test]
fn test_sum_without_display_columns_ignores_modifier() {
    let mut analysis = request("SUM", &["events", "users"]);
    analysis.entities.entities = vec![RawEntity::new("INTENT_MIN", "least")];
    assert_eq!(
        sql_for(&analysis),
        "SELECT SUM(t0.duration) AS sum_duration FROM events t0 JOIN users t1 ON t0.user_id = t1.id"
    );
}

#[test]
fn test_sum_groups_by_main_table() {
    let mut analysis = request("SUM", &["users", "events"]);
    analysis.intent = analysis.intent.with_label("users with the most time");
    assert_eq!(
        sql_for(&analysis),
        "SELECT t0.id AS group_field, SUM(t1.duration) AS sum_duration FROM users t0 \
         JOIN events t1 ON t0.id = t1.user_id GROUP BY t0.id \
         ORDER BY sum_duration DESC LIMIT 1"
    );
}

#[test]
fn test_select_without_display_columns_uses_star() {
    assert_eq!(sql_for(&request("SELECT", &["events"])), "SELECT * FROM events t0");
}

#[test]
fn test_select_limit_option() {
    let result = generator(CompileOptions::default().with_select_limit(Some(10)))
        .generate(&request("SELECT", &["users"]));
    assert_eq!(
        result.sql.as_deref(),
        Some("SELECT t0.id, t0.email FROM users t0 LIMIT 10")
    );
}

#[test]
fn test_avg_selects_from_main_table() {
    assert_eq!(
        sql_for(&request("AVG", &["events", "users"])),
        "SELECT AVG(t1.age) AS avg_age FROM events t0 JOIN users t1 ON t0.user_id = t1.id"
    );
}

#[test]
fn test_max_attributes_explicit_column_to_declaring_table() {
    let mut analysis = request("MAX", &["users", "events"]);
    analysis.intent = analysis.intent.with_target_column("duration");
    assert_eq!(
        sql_for(&analysis),
        "SELECT MAX(t1.duration) AS max_duration FROM users t0 JOIN events t1 ON t0.id = t1.user_id"
    );
}

#[test]
fn test_undeclared_target_column_falls_back_to_main_table() {
    let mut analysis = request("AGGREGATE", &["users"]);
    analysis.intent = analysis
        .intent
        .with_function("MIN")
        .with_target_column("signup_year");
    assert_eq!(
        sql_for(&analysis),
        "SELECT MIN(t0.signup_year) AS min_signup_year FROM users t0"
    );
}

#[test]
fn test_no_join_path() {
    let result = generator(CompileOptions::default()).generate(&request("SELECT", &["users", "tags"]));
    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::NoJoinPath));
    assert!(result.error.unwrap().contains("tags"));
}

#[test]
fn test_missing_aggregation_column() {
    let result = generator(CompileOptions::default()).generate(&request("SUM", &["tags"]));
    assert_eq!(result.error_kind, Some(ErrorKind::MissingAggregationColumn));
}

//! End-to-end generation from analysis documents to SQL.

use insta::assert_snapshot;
use intentql::compile::{Complexity, CompileOptions, GenerationResult, SqlGenerator};
use intentql::planner::{SqlValue, ValueBinding};
use intentql::semantic::relation_graph::JoinPathStrategy;
use intentql::semantic::ErrorKind;
use intentql::sql::Dialect;
use serde_json::{json, Value};
use sqlparser::dialect::{DuckDbDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;

fn generator(options: CompileOptions) -> SqlGenerator {
    SqlGenerator::with_default_catalog(options).unwrap()
}

fn document(intent: Value, entities: Value) -> Value {
    json!({
        "intent": intent,
        "entities": entities,
        "analysis_metadata": {"sql_ready": true}
    })
}

/// Generate, require success, and round-trip the SQL through sqlparser.
fn generate_ok(options: CompileOptions, doc: Value) -> GenerationResult {
    let dialect = options.dialect;
    let result = generator(options).generate_value(doc);
    assert!(result.success, "generation failed: {:?}", result.error);

    let sql = result.sql.as_deref().unwrap();
    let parsed = match dialect {
        Dialect::Postgres => Parser::parse_sql(&PostgreSqlDialect {}, sql),
        Dialect::DuckDb => Parser::parse_sql(&DuckDbDialect {}, sql),
    };
    assert!(parsed.is_ok(), "sqlparser rejected {sql}: {:?}", parsed.err());
    result
}

// ============================================================================
// Statement Shapes
// ============================================================================

#[test]
fn test_count_with_time_filter() {
    let result = generate_ok(
        CompileOptions::default(),
        document(
            json!({"type": "COUNT", "confidence": 0.93}),
            json!({
                "tables": [{"table": "customers"}],
                "time_filters": [{"period": "current_month"}]
            }),
        ),
    );

    assert_snapshot!(result.sql.unwrap(), @"SELECT t0.id AS group_field, COUNT(*) AS total_count FROM customers t0 WHERE EXTRACT(MONTH FROM t0.registration_date) = EXTRACT(MONTH FROM CURRENT_DATE) AND EXTRACT(YEAR FROM t0.registration_date) = EXTRACT(YEAR FROM CURRENT_DATE) GROUP BY t0.id");
    assert!(result.has_time_filter);
    assert!(result.params.is_empty());
}

#[test]
fn test_select_join_with_filter() {
    let result = generate_ok(
        CompileOptions::default(),
        document(
            json!({"type": "SELECT", "confidence": 0.95}),
            json!({
                "tables": [{"table": "orders"}, {"table": "customers"}],
                "filters": [{"column": "city", "operator": "=", "value": "Izmir", "table": "customers"}]
            }),
        ),
    );

    assert_snapshot!(result.sql.clone().unwrap(), @"SELECT t0.id, t0.customer_id, t0.order_date, t0.total_amount, t1.id, t1.customer_name, t1.city, t1.registration_date FROM orders t0 JOIN customers t1 ON t0.customer_id = t1.id WHERE t1.city = $1");
    assert_eq!(result.params, vec![SqlValue::Text("Izmir".into())]);
    assert_eq!(result.tables, vec!["orders", "customers"]);
    assert_eq!(result.intent.as_deref(), Some("SELECT"));
    assert_eq!(result.confidence, Some(0.95));

    let metadata = result.metadata.unwrap();
    assert_eq!(metadata.query_type, "select");
    assert_eq!(metadata.complexity, Complexity::Medium);
    assert_eq!(metadata.join_count, 1);
    assert_eq!(metadata.table_info.len(), 2);
    assert_eq!(metadata.table_info[0].date_column.as_deref(), Some("order_date"));
}

#[test]
fn test_sum_with_modifier_from_label() {
    let result = generate_ok(
        CompileOptions::default(),
        document(
            json!({"type": "SUM", "confidence": 0.81, "label": "En çok satış yapılan sipariş"}),
            json!({"tables": [{"table": "orders"}]}),
        ),
    );

    assert_snapshot!(result.sql.unwrap(), @"SELECT t0.id AS group_field, SUM(t0.total_amount) AS sum_total_amount FROM orders t0 GROUP BY t0.id ORDER BY sum_total_amount DESC LIMIT 1");
}

#[test]
fn test_count_with_modifier_from_entities() {
    let result = generate_ok(
        CompileOptions::default(),
        document(
            json!({"type": "COUNT", "confidence": 0.7}),
            json!({
                "tables": [{"table": "customers"}, {"table": "orders"}],
                "entities": [{"label": "INTENT_MIN", "text": "en az"}]
            }),
        ),
    );

    assert_snapshot!(result.sql.unwrap(), @"SELECT t0.id AS group_field, COUNT(*) AS total_count FROM customers t0 JOIN orders t1 ON t0.id = t1.customer_id GROUP BY t0.id ORDER BY total_count ASC LIMIT 1");
}

#[test]
fn test_threshold_wording_is_not_a_modifier() {
    let result = generate_ok(
        CompileOptions::default(),
        document(
            json!({"type": "COUNT", "confidence": 0.8, "label": "count customers with at least one order"}),
            json!({
                "tables": [{"table": "customers"}],
                "entities": [{"label": "O", "text": "almost"}]
            }),
        ),
    );

    assert_snapshot!(result.sql.unwrap(), @"SELECT t0.id AS group_field, COUNT(*) AS total_count FROM customers t0 GROUP BY t0.id");
}

#[test]
fn test_modifier_ignored_for_avg() {
    let result = generate_ok(
        CompileOptions::default(),
        document(
            json!({"type": "AVG", "confidence": 0.7, "label": "highest average"}),
            json!({"tables": [{"table": "products"}]}),
        ),
    );

    assert_snapshot!(result.sql.unwrap(), @"SELECT AVG(t0.price) AS avg_price FROM products t0");
}

#[test]
fn test_duckdb_specific_date() {
    let result = generate_ok(
        CompileOptions::default().with_dialect(Dialect::DuckDb),
        document(
            json!({"type": "SELECT", "confidence": 0.9}),
            json!({
                "tables": [{"table": "orders"}],
                "time_filters": [{"period": "specific_date", "date": "2024-01-15"}]
            }),
        ),
    );

    assert_snapshot!(result.sql.unwrap(), @"SELECT t0.id, t0.customer_id, t0.order_date, t0.total_amount FROM orders t0 WHERE CAST(t0.order_date AS DATE) = ?");
    assert_eq!(result.params, vec![SqlValue::Text("2024-01-15".into())]);
}

#[test]
fn test_inline_binding_escapes_quotes() {
    let result = generate_ok(
        CompileOptions::default().with_value_binding(ValueBinding::Inline),
        document(
            json!({"type": "SELECT", "confidence": 0.9}),
            json!({
                "tables": [{"table": "categories"}],
                "filters": [{"column": "category_name", "value": "Children's Books"}]
            }),
        ),
    );

    assert_snapshot!(result.sql.unwrap(), @"SELECT t0.id, t0.category_name FROM categories t0 WHERE t0.category_name = 'Children''s Books'");
    assert!(result.params.is_empty());
}

#[test]
fn test_generation_is_repeatable() {
    let generator = generator(CompileOptions::default());
    let doc = document(
        json!({"type": "SUM", "confidence": 0.9, "label": "the most"}),
        json!({
            "tables": [{"table": "customers"}, {"table": "orders"}],
            "time_filters": [{"period": "last_week"}],
            "filters": [{"column": "city", "value": "Bursa"}]
        }),
    );

    let first = generator.generate_value(doc.clone());
    let second = generator.generate_value(doc);
    assert!(first.success, "{:?}", first.error);
    assert_eq!(first.sql, second.sql);
    assert_eq!(first.params, second.params);
}

// ============================================================================
// Join Strategies
// ============================================================================

fn orders_and_products(strategy: JoinPathStrategy) -> GenerationResult {
    generate_ok(
        CompileOptions::default().with_join_path(strategy),
        document(
            json!({"type": "COUNT", "confidence": 0.9}),
            json!({"tables": [{"table": "orders"}, {"table": "products"}]}),
        ),
    )
}

#[test]
fn test_shortest_join_path() {
    let result = orders_and_products(JoinPathStrategy::Shortest);
    assert_snapshot!(result.sql.unwrap(), @"SELECT t0.id AS group_field, COUNT(*) AS total_count FROM orders t0 JOIN order_details t2 ON t0.id = t2.order_id JOIN products t1 ON t2.product_id = t1.id GROUP BY t0.id");
}

#[test]
fn test_first_found_join_path() {
    let result = orders_and_products(JoinPathStrategy::FirstFound);
    assert_snapshot!(result.sql.clone().unwrap(), @"SELECT t0.id AS group_field, COUNT(*) AS total_count FROM orders t0 JOIN employees t2 ON t0.employee_id = t2.id JOIN purchase_orders t3 ON t2.id = t3.employee_id JOIN suppliers t4 ON t3.supplier_id = t4.id JOIN products t1 ON t4.id = t1.supplier_id GROUP BY t0.id");
    assert_eq!(result.metadata.unwrap().join_count, 4);
}

#[test]
fn test_three_tables_is_complex() {
    let result = generate_ok(
        CompileOptions::default(),
        document(
            json!({"type": "SELECT", "confidence": 0.9}),
            json!({"tables": [{"table": "order_details"}, {"table": "orders"}, {"table": "customers"}]}),
        ),
    );
    let metadata = result.metadata.unwrap();
    assert_eq!(metadata.complexity, Complexity::Complex);
    assert_eq!(metadata.join_count, 2);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_not_ready() {
    let result = generator(CompileOptions::default()).generate_value(json!({
        "intent": {"type": "SELECT", "confidence": 0.4},
        "entities": {"tables": [{"table": "orders"}]},
        "analysis_metadata": {"sql_ready": false}
    }));

    assert!(!result.success);
    assert!(result.sql.is_none());
    assert_eq!(result.error_kind, Some(ErrorKind::NotReady));
    assert_eq!(result.debug_info.unwrap().sql_ready, Some(false));
}

#[test]
fn test_unsupported_intent() {
    let result = generator(CompileOptions::default()).generate_value(document(
        json!({"type": "DELETE", "confidence": 0.9}),
        json!({"tables": [{"table": "orders"}]}),
    ));

    assert_eq!(result.error_kind, Some(ErrorKind::UnsupportedIntent));
    assert!(result.error.unwrap().contains("DELETE"));
    assert!(result.debug_info.is_none());
}

#[test]
fn test_malformed_json() {
    let result = generator(CompileOptions::default()).generate_json("{not json");

    assert_eq!(result.error_kind, Some(ErrorKind::InvalidInput));
    assert!(result.intent.is_none());
    assert!(result.tables.is_empty());
    let debug = result.debug_info.unwrap();
    assert_eq!(debug.sql_ready, None);
    assert_eq!(debug.available_tables.len(), 8);
}

#[test]
fn test_missing_intent_keeps_sql_ready_hint() {
    let result = generator(CompileOptions::default()).generate_json(
        r#"{"entities": {"tables": [{"table": "orders"}]}, "analysis_metadata": {"sql_ready": true}}"#,
    );

    assert_eq!(result.error_kind, Some(ErrorKind::InvalidInput));
    assert_eq!(result.debug_info.unwrap().sql_ready, Some(true));
}

#[test]
fn test_unknown_period_rejected_by_default() {
    let doc = document(
        json!({"type": "COUNT", "confidence": 0.9}),
        json!({
            "tables": [{"table": "orders"}],
            "time_filters": [{"period": "last_decade"}]
        }),
    );

    let result = generator(CompileOptions::default()).generate_value(doc.clone());
    assert_eq!(result.error_kind, Some(ErrorKind::UnrecognizedPeriod));

    let result = generate_ok(
        CompileOptions::default()
            .with_unknown_period(intentql::planner::UnknownPeriodPolicy::Fallback),
        doc,
    );
    assert!(result
        .sql
        .unwrap()
        .contains("WHERE t0.order_date >= CURRENT_DATE - INTERVAL '1 month'"));
}

#[test]
fn test_missing_date_column() {
    let result = generator(CompileOptions::default()).generate_value(document(
        json!({"type": "SELECT", "confidence": 0.9}),
        json!({
            "tables": [{"table": "suppliers"}],
            "time_filters": [{"period": "today"}]
        }),
    ));
    assert_eq!(result.error_kind, Some(ErrorKind::MissingDateColumn));
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn test_result_serialization() {
    let success = generate_ok(
        CompileOptions::default(),
        document(
            json!({"type": "count", "confidence": 0.9}),
            json!({
                "tables": [{"table": "orders"}],
                "filters": [{"column": "total_amount", "operator": ">", "value": 100}]
            }),
        ),
    );
    let value = serde_json::to_value(&success).unwrap();
    assert_eq!(value["success"], json!(true));
    assert_eq!(value["params"], json!([100]));
    assert_eq!(value["error_kind"], Value::Null);
    assert_eq!(value["metadata"]["query_type"], json!("count"));
    assert_eq!(value["metadata"]["complexity"], json!("simple"));
    assert!(value.get("debug_info").is_none());

    let failure = generator(CompileOptions::default()).generate_value(document(
        json!({"type": "SELECT", "confidence": 0.9}),
        json!({"tables": [{"table": "invoices"}]}),
    ));
    let value = serde_json::to_value(&failure).unwrap();
    assert_eq!(value["success"], json!(false));
    assert_eq!(value["sql"], Value::Null);
    assert_eq!(value["error_kind"], json!("unknown_table"));
    assert_eq!(value["tables"], json!(["invoices"]));
}

#[test]
fn test_supported_features() {
    let features = generator(CompileOptions::default()).supported_features();
    assert_eq!(features.total_table_count, 8);
    assert_eq!(features.supported_tables.len(), 8);
    assert!(features.supported_intents.contains(&"AGGREGATE"));
    assert!(features.time_filters.contains(&"last_week"));
}

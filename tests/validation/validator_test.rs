use intentql::compile::{CompileOptions, SqlGenerator};
use intentql::planner::ValueBinding;
use intentql::validation::{validate_sql, ValidationIssue};
use serde_json::json;

#[test]
fn test_every_generated_shape_passes() {
    let generator = SqlGenerator::with_default_catalog(
        CompileOptions::default().with_value_binding(ValueBinding::Inline),
    )
    .unwrap();

    let intents = [
        json!({"type": "SELECT", "confidence": 0.9}),
        json!({"type": "COUNT", "confidence": 0.9}),
        json!({"type": "SUM", "confidence": 0.9, "label": "highest"}),
        json!({"type": "AVG", "confidence": 0.9}),
        json!({"type": "MAX", "confidence": 0.9}),
        json!({"type": "MIN", "confidence": 0.9, "target_column": "total_amount"}),
        json!({"type": "AGGREGATE", "confidence": 0.9, "function": "MAX", "target_column": "total_amount"}),
    ];

    for intent in intents {
        let result = generator.generate_value(json!({
            "intent": intent.clone(),
            "entities": {
                "tables": [{"table": "orders"}, {"table": "customers"}],
                "time_filters": [{"period": "last_month"}],
                "filters": [{"column": "city", "value": "it's (odd); really", "table": "customers"}]
            },
            "analysis_metadata": {"sql_ready": true}
        }));
        assert!(result.success, "{intent}: {:?}", result.error);
        let sql = result.sql.unwrap();
        assert_eq!(validate_sql(&sql), Ok(()), "{sql}");
        assert!(sql.contains("'it''s (odd); really'"), "{sql}");
    }
}

#[test]
fn test_injection_shapes_rejected() {
    let cases = [
        ("SELECT a FROM t; DELETE FROM t", ValidationIssue::MultipleStatements),
        ("SELECT a FROM t WHERE b = 'x", ValidationIssue::UnterminatedLiteral),
        ("SELECT a FROM t WHERE (b = 1", ValidationIssue::UnbalancedParentheses { depth: 1 }),
        ("DELETE FROM t", ValidationIssue::MissingSelect),
        ("", ValidationIssue::Empty),
    ];
    for (sql, expected) in cases {
        assert_eq!(validate_sql(sql), Err(expected), "{sql}");
    }
}

#[test]
fn test_quoted_identifiers_are_blanked() {
    assert_eq!(validate_sql(r#"SELECT "a;b" FROM t"#), Ok(()));
    assert_eq!(
        validate_sql(r#"SELECT "unclosed FROM t"#),
        Err(ValidationIssue::MissingFrom)
    );
}

#[test]
fn test_issue_is_an_error() {
    let err: Box<dyn std::error::Error> = Box::new(ValidationIssue::UnterminatedLiteral);
    assert_eq!(err.to_string(), "unterminated quoted literal");
}

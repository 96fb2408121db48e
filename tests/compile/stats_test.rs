//! Statistics shared between generators and threads.

use std::sync::Arc;
use std::thread;

use intentql::compile::{CompileOptions, SqlGenerator};
use intentql::stats::GenerationStats;
use serde_json::json;

fn request(table: &str) -> serde_json::Value {
    json!({
        "intent": {"type": "COUNT", "confidence": 0.9},
        "entities": {"tables": [{"table": table}]},
        "analysis_metadata": {"sql_ready": true}
    })
}

#[test]
fn test_fresh_generator_has_empty_stats() {
    let generator = SqlGenerator::with_default_catalog(CompileOptions::default()).unwrap();
    let stats = generator.stats();
    assert_eq!(stats.total_queries, 0);
    assert_eq!(stats.success_rate, 0.0);
}

#[test]
fn test_failures_and_malformed_documents_count() {
    let generator = SqlGenerator::with_default_catalog(CompileOptions::default()).unwrap();

    assert!(generator.generate_value(request("orders")).success);
    assert!(!generator.generate_value(request("invoices")).success);
    assert!(!generator.generate_json("[]").success);

    let stats = generator.stats();
    assert_eq!(stats.total_queries, 3);
    assert_eq!(stats.successful_queries, 1);
    assert_eq!(stats.failed_queries, 2);
    assert_eq!(stats.success_rate, 33.33);
}

#[test]
fn test_shared_stats_across_threads() {
    let stats = Arc::new(GenerationStats::new());
    let first = SqlGenerator::with_default_catalog(CompileOptions::default())
        .unwrap()
        .with_stats(Arc::clone(&stats));
    let second = SqlGenerator::with_default_catalog(CompileOptions::default())
        .unwrap()
        .with_stats(Arc::clone(&stats));

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..25 {
                    assert!(first.generate_value(request("customers")).success);
                }
            });
            s.spawn(|| {
                for _ in 0..25 {
                    assert!(!second.generate_value(request("regions")).success);
                }
            });
        }
    });

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.total_queries, 200);
    assert_eq!(snapshot.successful_queries, 100);
    assert_eq!(snapshot.failed_queries, 100);
    assert_eq!(snapshot.success_rate, 50.0);
    assert_eq!(first.stats(), second.stats());
}

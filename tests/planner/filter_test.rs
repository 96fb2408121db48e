//! WHERE clause compilation through the public planner API.

use intentql::analysis::{Filter, TimeFilter};
use intentql::catalog::northwind_catalog;
use intentql::planner::filter::{build_where_clause, Bindings, SqlValue, ValueBinding, WhereOptions};
use intentql::planner::time::UnknownPeriodPolicy;
use intentql::semantic::{AliasAllocator, AliasMap, ErrorKind, GenerationError};
use intentql::sql::Dialect;

fn aliases(tables: &[&str]) -> AliasMap {
    let mut allocator = AliasAllocator::new();
    for table in tables {
        allocator.assign(table);
    }
    allocator.into_map()
}

fn where_sql(
    tables: &[&str],
    time_filters: &[TimeFilter],
    filters: &[Filter],
    binding: ValueBinding,
    policy: UnknownPeriodPolicy,
    dialect: Dialect,
) -> Result<(Option<String>, Vec<SqlValue>), GenerationError> {
    let mut bindings = Bindings::new(binding);
    let expr = build_where_clause(
        time_filters,
        filters,
        &aliases(tables),
        &northwind_catalog(),
        WhereOptions {
            unknown_period: policy,
        },
        &mut bindings,
    )?;
    Ok((expr.map(|e| e.to_sql(dialect)), bindings.into_params()))
}

#[test]
fn test_date_range_then_filters_in_placeholder_order() {
    let (sql, params) = where_sql(
        &["orders", "customers"],
        &[TimeFilter::between("2024-01-01", "2024-03-31")],
        &[
            Filter::new("city", "=", "Izmir").on_table("customers"),
            Filter::new("total_amount", ">", 250),
        ],
        ValueBinding::Parameterized,
        UnknownPeriodPolicy::Reject,
        Dialect::Postgres,
    )
    .unwrap();

    assert_eq!(
        sql.unwrap(),
        "t0.order_date BETWEEN $1 AND $2 AND t1.city = $3 AND t0.total_amount > $4"
    );
    assert_eq!(
        params,
        vec![
            SqlValue::Text("2024-01-01".into()),
            SqlValue::Text("2024-03-31".into()),
            SqlValue::Text("Izmir".into()),
            SqlValue::Int(250),
        ]
    );
}

#[test]
fn test_duckdb_placeholders() {
    let (sql, params) = where_sql(
        &["customers"],
        &[],
        &[Filter::new("city", "<>", "Bursa")],
        ValueBinding::Parameterized,
        UnknownPeriodPolicy::Reject,
        Dialect::DuckDb,
    )
    .unwrap();

    assert_eq!(sql.unwrap(), "t0.city <> ?");
    assert_eq!(params, vec![SqlValue::Text("Bursa".into())]);
}

#[test]
fn test_inline_mode_has_no_params() {
    let (sql, params) = where_sql(
        &["orders"],
        &[TimeFilter::on_date("2024-02-29")],
        &[Filter::new("total_amount", "<", 99.5)],
        ValueBinding::Inline,
        UnknownPeriodPolicy::Reject,
        Dialect::Postgres,
    )
    .unwrap();

    assert_eq!(
        sql.unwrap(),
        "CAST(t0.order_date AS DATE) = '2024-02-29' AND t0.total_amount < 99.5"
    );
    assert!(params.is_empty());
}

#[test]
fn test_unknown_period_policies() {
    let filters = [TimeFilter::new("last_quarter")];

    let err = where_sql(
        &["orders"],
        &filters,
        &[],
        ValueBinding::Parameterized,
        UnknownPeriodPolicy::Reject,
        Dialect::Postgres,
    )
    .unwrap_err();
    assert_eq!(err, GenerationError::UnrecognizedPeriod("last_quarter".into()));
    assert_eq!(err.kind(), ErrorKind::UnrecognizedPeriod);

    let (sql, _) = where_sql(
        &["orders"],
        &filters,
        &[],
        ValueBinding::Parameterized,
        UnknownPeriodPolicy::Fallback,
        Dialect::Postgres,
    )
    .unwrap();
    assert_eq!(sql.unwrap(), "t0.order_date >= CURRENT_DATE - INTERVAL '1 month'");
}

#[test]
fn test_specific_date_without_date_is_unrecognized() {
    let err = where_sql(
        &["orders"],
        &[TimeFilter::new("specific_date")],
        &[],
        ValueBinding::Parameterized,
        UnknownPeriodPolicy::Reject,
        Dialect::Postgres,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnrecognizedPeriod);
}

#[test]
fn test_bad_dates_are_invalid_input() {
    for filter in [
        TimeFilter::on_date("15.01.2024"),
        TimeFilter::on_date("2024-02-30"),
        TimeFilter::between("2024-05-01", "2024-01-01"),
    ] {
        let err = where_sql(
            &["orders"],
            &[filter.clone()],
            &[],
            ValueBinding::Parameterized,
            UnknownPeriodPolicy::Fallback,
            Dialect::Postgres,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput, "{filter:?}");
    }
}

#[test]
fn test_time_filter_uses_main_table_date_column() {
    let (sql, _) = where_sql(
        &["employees", "orders"],
        &[TimeFilter::new("current_year")],
        &[],
        ValueBinding::Parameterized,
        UnknownPeriodPolicy::Reject,
        Dialect::Postgres,
    )
    .unwrap();
    assert_eq!(
        sql.unwrap(),
        "EXTRACT(YEAR FROM t0.hire_date) = EXTRACT(YEAR FROM CURRENT_DATE)"
    );

    let err = where_sql(
        &["categories", "orders"],
        &[TimeFilter::new("today")],
        &[],
        ValueBinding::Parameterized,
        UnknownPeriodPolicy::Reject,
        Dialect::Postgres,
    )
    .unwrap_err();
    assert_eq!(err, GenerationError::MissingDateColumn("categories".into()));
}

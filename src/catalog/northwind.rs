//! Built-in trading schema: customers, orders, products and the tables
//! around them.

use std::collections::BTreeMap;

use super::{SchemaCatalog, SchemaDescriptor};
use crate::semantic::relation_graph::Relation;

/// The eight-table default catalog.
pub fn northwind_catalog() -> SchemaCatalog {
    let mut tables = BTreeMap::new();

    tables.insert(
        "customers".to_string(),
        SchemaDescriptor::new(["id", "customer_name", "city", "registration_date"])
            .with_date_column("registration_date")
            .with_sum_columns(["total_purchases"])
            .with_avg_columns(["total_purchases"]),
    );
    tables.insert(
        "orders".to_string(),
        SchemaDescriptor::new(["id", "customer_id", "order_date", "total_amount"])
            .with_date_column("order_date")
            .with_sum_columns(["total_amount"])
            .with_avg_columns(["total_amount"]),
    );
    tables.insert(
        "products".to_string(),
        SchemaDescriptor::new(["id", "product_name", "category_id", "price"])
            .with_sum_columns(["price"])
            .with_avg_columns(["price"]),
    );
    tables.insert(
        "categories".to_string(),
        SchemaDescriptor::new(["id", "category_name"]),
    );
    tables.insert(
        "suppliers".to_string(),
        SchemaDescriptor::new(["id", "supplier_name", "city", "contact_name"]),
    );
    tables.insert(
        "employees".to_string(),
        SchemaDescriptor::new(["id", "first_name", "last_name", "hire_date"])
            .with_date_column("hire_date")
            .with_sum_columns(["salary"])
            .with_avg_columns(["salary"]),
    );
    tables.insert(
        "order_details".to_string(),
        SchemaDescriptor::new(["id", "order_id", "product_id", "quantity", "unit_price"])
            .with_sum_columns(["quantity"])
            .with_avg_columns(["unit_price"]),
    );
    tables.insert(
        "purchase_orders".to_string(),
        SchemaDescriptor::new(["id", "supplier_id", "employee_id", "order_date", "total_cost"])
            .with_date_column("order_date")
            .with_sum_columns(["total_cost"])
            .with_avg_columns(["total_cost"]),
    );

    // Every name above is a literal plain identifier.
    SchemaCatalog { tables }
}

/// Foreign keys of the default catalog, in declaration order.
pub fn northwind_relations() -> Vec<Relation> {
    vec![
        Relation::new("products", "category_id", "categories", "id"),
        Relation::new("products", "supplier_id", "suppliers", "id"),
        Relation::new("orders", "customer_id", "customers", "id"),
        Relation::new("orders", "employee_id", "employees", "id"),
        Relation::new("order_details", "order_id", "orders", "id"),
        Relation::new("order_details", "product_id", "products", "id"),
        Relation::new("purchase_orders", "supplier_id", "suppliers", "id"),
        Relation::new("purchase_orders", "employee_id", "employees", "id"),
    ]
}

use skiffsql_catalog::{Index, IndexCatalog};
use skiffsql_common::types::{DataType, Value};
use skiffsql_ir::{BinaryOp, Expr, JoinType, Plan, PlanField, PlanSchema};

pub(crate) fn make_schema(table: &str, columns: &[&str]) -> PlanSchema {
    PlanSchema::from_fields(
        columns
            .iter()
            .map(|c| PlanField::new(*c, DataType::Int64).with_table(table))
            .collect(),
    )
}

pub(crate) fn make_scan(table: &str, columns: &[&str]) -> Plan {
    Plan::TableScan {
        table_name: table.to_string(),
        schema: make_schema(table, columns),
        indexable: true,
    }
}

pub(crate) fn make_join(left: Plan, right: Plan, join_type: JoinType, condition: Expr) -> Plan {
    Plan::Join {
        left: Box::new(left),
        right: Box::new(right),
        join_type,
        condition,
    }
}

pub(crate) fn col(table: &str, name: &str, index: usize) -> Expr {
    Expr::Column {
        table: Some(table.to_string()),
        name: name.to_string(),
        index: Some(index),
    }
}

/// Unqualified column reference, e.g. an alias name.
pub(crate) fn ucol(name: &str) -> Expr {
    Expr::Column {
        table: None,
        name: name.to_string(),
        index: Some(0),
    }
}

pub(crate) fn lit(value: i64) -> Expr {
    Expr::Literal(Value::Int64(value))
}

pub(crate) fn eq(left: Expr, right: Expr) -> Expr {
    Expr::BinaryOp {
        left: Box::new(left),
        op: BinaryOp::Eq,
        right: Box::new(right),
    }
}

pub(crate) fn gt(left: Expr, right: Expr) -> Expr {
    Expr::BinaryOp {
        left: Box::new(left),
        op: BinaryOp::Gt,
        right: Box::new(right),
    }
}

pub(crate) fn and(left: Expr, right: Expr) -> Expr {
    Expr::BinaryOp {
        left: Box::new(left),
        op: BinaryOp::And,
        right: Box::new(right),
    }
}

pub(crate) fn single_index(name: &str, table: &str, expression: &str) -> Index {
    Index::new(name, "db", table, vec![expression.to_string()])
}

pub(crate) fn make_catalog(indexes: Vec<Index>) -> IndexCatalog {
    let catalog = IndexCatalog::new("db");
    for index in indexes {
        catalog.register_index(index);
    }
    catalog
}

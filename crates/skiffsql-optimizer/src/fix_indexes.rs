use skiffsql_common::error::{Error, Result};
use skiffsql_ir::{Expr, Plan, PlanSchema};

/// Rebuilds an expression with every column ordinal recomputed against the
/// given schema. A column absent from the schema is a hard error: it means
/// a rewrite produced an inconsistent tree.
pub fn fix_field_indexes(schema: &PlanSchema, expr: &Expr) -> Result<Expr> {
    match expr {
        Expr::Column { table, name, .. } => match schema.field_index(table.as_deref(), name) {
            Some(index) => Ok(Expr::Column {
                table: table.clone(),
                name: name.clone(),
                index: Some(index),
            }),
            None => Err(Error::column_not_found(match table {
                Some(t) => format!("{}.{}", t, name),
                None => name.clone(),
            })),
        },
        Expr::Literal(_) => Ok(expr.clone()),
        Expr::Alias { name, expr: inner } => Ok(Expr::Alias {
            name: name.clone(),
            expr: Box::new(fix_field_indexes(schema, inner)?),
        }),
        Expr::BinaryOp { left, op, right } => Ok(Expr::BinaryOp {
            left: Box::new(fix_field_indexes(schema, left)?),
            op: *op,
            right: Box::new(fix_field_indexes(schema, right)?),
        }),
    }
}

pub fn fix_field_indexes_on_expressions(schema: &PlanSchema, exprs: &[Expr]) -> Result<Vec<Expr>> {
    exprs
        .iter()
        .map(|e| fix_field_indexes(schema, e))
        .collect()
}

/// Recomputes the ordinals of a node's own expressions against its current
/// child schemas. Key expressions of an indexed join stay resolved against
/// the primary subtree alone, since they are evaluated per primary row.
pub(crate) fn fix_expressions_for_node(plan: Plan) -> Result<Plan> {
    match plan {
        Plan::Join {
            left,
            right,
            join_type,
            condition,
        } => {
            let schema = left.schema().concat(&right.schema());
            let condition = fix_field_indexes(&schema, &condition)?;
            Ok(Plan::Join {
                left,
                right,
                join_type,
                condition,
            })
        }
        Plan::IndexedJoin {
            primary,
            secondary,
            join_type,
            condition,
            primary_key_exprs,
            index,
        } => {
            let join_schema = primary.schema().concat(&secondary.schema());
            let condition = fix_field_indexes(&join_schema, &condition)?;
            let primary_key_exprs =
                fix_field_indexes_on_expressions(&primary.schema(), &primary_key_exprs)?;
            Ok(Plan::IndexedJoin {
                primary,
                secondary,
                join_type,
                condition,
                primary_key_exprs,
                index,
            })
        }
        Plan::Filter { input, predicate } => {
            let predicate = fix_field_indexes(&input.schema(), &predicate)?;
            Ok(Plan::Filter { input, predicate })
        }
        Plan::Project {
            input,
            expressions,
            schema,
        } => {
            let expressions = fix_field_indexes_on_expressions(&input.schema(), &expressions)?;
            Ok(Plan::Project {
                input,
                expressions,
                schema,
            })
        }
        other @ (Plan::TableScan { .. }
        | Plan::IndexedTableScan { .. }
        | Plan::Insert { .. }
        | Plan::CreateIndex { .. }) => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{col, eq, make_scan, ucol};
    use skiffsql_common::error::Error;
    use skiffsql_ir::{Expr, JoinType};

    #[test]
    fn recomputes_ordinals_by_table_and_name() {
        let scan_a = make_scan("a", &["id", "x"]);
        let scan_b = make_scan("b", &["a_id"]);
        let schema = scan_a.schema().concat(&scan_b.schema());

        // ordinals resolved against a stale layout
        let stale = eq(col("a", "id", 5), col("b", "a_id", 0));
        let fixed = fix_field_indexes(&schema, &stale).unwrap();
        assert_eq!(fixed, eq(col("a", "id", 0), col("b", "a_id", 2)));
    }

    #[test]
    fn missing_column_is_a_hard_error() {
        let schema = make_scan("a", &["id"]).schema();
        let result = fix_field_indexes(&schema, &col("b", "a_id", 0));
        match result {
            Err(Error::ColumnNotFound(name)) => assert_eq!(name, "b.a_id"),
            other => panic!("Expected ColumnNotFound, got {:?}", other),
        }
    }

    #[test]
    fn unqualified_columns_match_by_name() {
        let schema = make_scan("a", &["id", "x"]).schema();
        let fixed = fix_field_indexes(&schema, &ucol("x")).unwrap();
        assert_eq!(
            fixed,
            Expr::Column {
                table: None,
                name: "x".to_string(),
                index: Some(1),
            }
        );
    }

    #[test]
    fn node_repair_uses_child_schemas() {
        let join = Plan::Join {
            left: Box::new(make_scan("a", &["id", "x"])),
            right: Box::new(make_scan("b", &["a_id"])),
            join_type: JoinType::Inner,
            // ordinals computed when the sides were swapped
            condition: eq(col("a", "id", 1), col("b", "a_id", 0)),
        };

        let repaired = fix_expressions_for_node(join).unwrap();
        match repaired {
            Plan::Join { condition, .. } => {
                assert_eq!(condition, eq(col("a", "id", 0), col("b", "a_id", 2)));
            }
            other => panic!("Expected Join, got {:?}", other),
        }
    }

    #[test]
    fn node_repair_is_idempotent() {
        let filter = Plan::Filter {
            input: Box::new(make_scan("a", &["id", "x"])),
            predicate: eq(col("a", "x", 0), col("a", "id", 1)),
        };

        let once = fix_expressions_for_node(filter).unwrap();
        let twice = fix_expressions_for_node(once.clone()).unwrap();
        assert_eq!(once, twice);
    }
}

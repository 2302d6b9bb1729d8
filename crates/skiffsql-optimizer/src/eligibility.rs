use skiffsql_ir::{Plan, inspect};

/// Verdict of the cheap applicability check, computed once per plan and
/// passed as data into discovery and rewriting so the single-join
/// precondition is carried explicitly rather than re-derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible { table_count: usize },
    /// Unresolved identifiers are still present; rewriting would resolve
    /// ordinals against meaningless schemas.
    Unresolved,
    /// Statement kinds where join rewriting is unsafe or meaningless.
    ExcludedStatement,
    /// This pass only handles a single two-table join.
    TooManyTables { table_count: usize },
}

impl Eligibility {
    pub fn assess(plan: &Plan) -> Eligibility {
        if !plan.is_resolved() {
            return Eligibility::Unresolved;
        }

        match plan {
            Plan::Insert { .. } | Plan::CreateIndex { .. } => {
                return Eligibility::ExcludedStatement;
            }
            _ => {}
        }

        let mut table_count = 0;
        inspect(plan, &mut |node| {
            if matches!(node, Plan::TableScan { .. }) {
                table_count += 1;
            }
            true
        });

        if table_count > 2 {
            Eligibility::TooManyTables { table_count }
        } else {
            Eligibility::Eligible { table_count }
        }
    }

    pub fn qualifies(&self) -> bool {
        matches!(self, Eligibility::Eligible { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{col, eq, make_join, make_scan};
    use skiffsql_ir::{Expr, JoinType};

    #[test]
    fn two_table_join_is_eligible() {
        let plan = make_join(
            make_scan("a", &["id"]),
            make_scan("b", &["a_id"]),
            JoinType::Inner,
            eq(col("a", "id", 0), col("b", "a_id", 1)),
        );
        assert_eq!(Eligibility::assess(&plan), Eligibility::Eligible { table_count: 2 });
        assert!(Eligibility::assess(&plan).qualifies());
    }

    #[test]
    fn three_tables_disqualify() {
        let inner = make_join(
            make_scan("a", &["id"]),
            make_scan("b", &["a_id"]),
            JoinType::Inner,
            eq(col("a", "id", 0), col("b", "a_id", 1)),
        );
        let plan = make_join(
            inner,
            make_scan("c", &["b_id"]),
            JoinType::Inner,
            eq(col("b", "a_id", 1), col("c", "b_id", 2)),
        );
        assert_eq!(
            Eligibility::assess(&plan),
            Eligibility::TooManyTables { table_count: 3 }
        );
        assert!(!Eligibility::assess(&plan).qualifies());
    }

    #[test]
    fn unresolved_plan_is_skipped() {
        let plan = make_join(
            make_scan("a", &["id"]),
            make_scan("b", &["a_id"]),
            JoinType::Inner,
            eq(
                Expr::Column {
                    table: Some("a".to_string()),
                    name: "id".to_string(),
                    index: None,
                },
                col("b", "a_id", 1),
            ),
        );
        assert_eq!(Eligibility::assess(&plan), Eligibility::Unresolved);
    }

    #[test]
    fn statement_kinds_are_excluded() {
        let insert = Plan::Insert {
            table_name: "a".to_string(),
            source: Box::new(make_scan("b", &["id"])),
        };
        assert_eq!(Eligibility::assess(&insert), Eligibility::ExcludedStatement);

        let create = Plan::CreateIndex {
            name: "idx_a_id".to_string(),
            table_name: "a".to_string(),
            columns: vec!["id".to_string()],
        };
        assert_eq!(Eligibility::assess(&create), Eligibility::ExcludedStatement);
    }
}

use std::sync::Arc;

use rustc_hash::FxHashMap;
use skiffsql_catalog::{Index, IndexCatalog};
use skiffsql_common::error::{Error, Result};
use skiffsql_ir::{BinaryOp, Expr, Plan, inspect, split_conjunction};
use tracing::{debug, debug_span};

use crate::column_expr::{AliasTable, join_exprs_by_table, unwrap_alias};
use crate::eligibility::Eligibility;

/// Indexes acquired from the catalog during discovery, keyed by owning
/// table.
///
/// Discovery transfers ownership of the acquired handles to the caller: the
/// rewrite consumes the ones it builds into the plan via [`take`], and the
/// caller must hand everything left over to [`release_unused`] on every exit
/// path.
///
/// [`take`]: DiscoveredIndexes::take
/// [`release_unused`]: DiscoveredIndexes::release_unused
#[derive(Debug, Default)]
pub(crate) struct DiscoveredIndexes {
    by_table: FxHashMap<String, Arc<Index>>,
}

impl DiscoveredIndexes {
    pub(crate) fn get(&self, table: &str) -> Option<&Arc<Index>> {
        self.by_table.get(table)
    }

    /// Consumes the index for a table, transferring ownership to the caller.
    pub(crate) fn take(&mut self, table: &str) -> Option<Arc<Index>> {
        self.by_table.remove(table)
    }

    /// Releases every handle that was not consumed. Each handle is released
    /// exactly once.
    pub(crate) fn release_unused(self, catalog: &IndexCatalog) {
        for index in self.by_table.values() {
            catalog.release_index(index);
        }
    }
}

/// Walks the plan top-down, collecting alias bindings as it goes, and
/// resolves candidate indexes for the first join's condition.
///
/// The eligibility gate guarantees at most one join exists; a second join is
/// an internal error rather than a silent wrong answer. Returning no indexes
/// is not an error: it just means the condition shape is unsupported or no
/// index matches.
pub(crate) fn find_join_indexes(
    plan: &Plan,
    eligibility: Eligibility,
    catalog: &IndexCatalog,
) -> Result<(DiscoveredIndexes, AliasTable)> {
    let span = debug_span!("find_join_indexes");
    let _enter = span.enter();

    if !eligibility.qualifies() {
        return Err(Error::internal(
            "join index discovery invoked on an ineligible plan",
        ));
    }

    let mut aliases = AliasTable::default();
    let mut discovered = DiscoveredIndexes::default();
    let mut joins_seen = 0usize;
    let mut walk_error: Option<Error> = None;

    inspect(plan, &mut |node| {
        debug!(node = node.kind(), "discovering indexes");
        collect_aliases(&mut aliases, node);

        if let Plan::Join { condition, .. } = node {
            joins_seen += 1;
            if joins_seen > 1 {
                walk_error = Some(Error::internal(
                    "join index discovery expects at most one join per plan",
                ));
                return false;
            }
            match get_join_indexes(condition, &aliases, catalog) {
                Ok(found) => discovered = found,
                Err(e) => {
                    walk_error = Some(e);
                    return false;
                }
            }
        }
        true
    });

    if let Some(e) = walk_error {
        discovered.release_unused(catalog);
        return Err(e);
    }
    Ok((discovered, aliases))
}

/// Records alias bindings exposed by a node's expressions. The first binding
/// for a name wins.
fn collect_aliases(aliases: &mut AliasTable, node: &Plan) {
    for expr in node.expressions() {
        expr.visit(&mut |e| {
            if let Expr::Alias { name, expr: bound } = e {
                aliases
                    .entry(name.clone())
                    .or_insert_with(|| bound.as_ref().clone());
            }
        });
    }
}

/// Resolves candidate indexes for a join condition, one per table at most.
pub(crate) fn get_join_indexes(
    condition: &Expr,
    aliases: &AliasTable,
    catalog: &IndexCatalog,
) -> Result<DiscoveredIndexes> {
    match condition {
        Expr::BinaryOp {
            left,
            op: BinaryOp::Eq,
            right,
        } => {
            let mut by_table = FxHashMap::default();
            let (left_idx, right_idx) = get_join_equality_indexes(left, right, aliases, catalog);
            for index in [left_idx, right_idx].into_iter().flatten() {
                by_table.insert(index.table.clone(), index);
            }
            Ok(DiscoveredIndexes { by_table })
        }
        Expr::BinaryOp {
            op: BinaryOp::And, ..
        } => {
            let conjuncts = split_conjunction(condition);
            // equalities mixed with other predicate kinds are not composite
            // index candidates
            let all_equalities = conjuncts.iter().all(|e| {
                matches!(
                    e,
                    Expr::BinaryOp {
                        op: BinaryOp::Eq,
                        ..
                    }
                )
            });
            if !all_equalities {
                return Ok(DiscoveredIndexes::default());
            }
            Ok(get_multi_column_join_index(&conjuncts, aliases, catalog))
        }
        _ => Ok(DiscoveredIndexes::default()),
    }
}

/// Looks up a single-column index for each side of an equality
/// independently. Either, both, or neither may resolve.
fn get_join_equality_indexes(
    left: &Expr,
    right: &Expr,
    aliases: &AliasTable,
    catalog: &IndexCatalog,
) -> (Option<Arc<Index>>, Option<Arc<Index>>) {
    // only column-to-column equalities qualify; `col = <evaluable>` is
    // handled by predicate pushdown instead
    if left.is_constant() || right.is_constant() {
        return (None, None);
    }

    let database = catalog.current_database();
    let left_idx =
        catalog.index_by_expressions(database, &[unwrap_alias(aliases, left).to_string()]);
    let right_idx =
        catalog.index_by_expressions(database, &[unwrap_alias(aliases, right).to_string()]);
    (left_idx, right_idx)
}

/// One composite-index lookup per table, keyed by that table's full ordered
/// equality column list.
fn get_multi_column_join_index(
    conjuncts: &[&Expr],
    aliases: &AliasTable,
    catalog: &IndexCatalog,
) -> DiscoveredIndexes {
    let mut by_table = FxHashMap::default();

    for (table, cols) in join_exprs_by_table(aliases, conjuncts) {
        let expressions: Vec<String> = cols.iter().map(|c| c.col.to_string()).collect();
        if let Some(index) = catalog.index_by_expressions(catalog.current_database(), &expressions)
        {
            by_table.insert(table, index);
        }
    }

    DiscoveredIndexes { by_table }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        and, col, eq, gt, lit, make_catalog, make_join, make_scan, single_index, ucol,
    };
    use skiffsql_ir::JoinType;

    fn two_table_plan(condition: Expr) -> Plan {
        make_join(
            make_scan("a", &["id", "x", "y"]),
            make_scan("b", &["a_id", "x", "y"]),
            JoinType::Inner,
            condition,
        )
    }

    #[test]
    fn equality_resolves_an_index_per_side() {
        let catalog = make_catalog(vec![
            single_index("idx_a_id", "a", "a.id"),
            single_index("idx_b_a_id", "b", "b.a_id"),
        ]);
        let plan = two_table_plan(eq(col("a", "id", 0), col("b", "a_id", 3)));
        let eligibility = Eligibility::assess(&plan);

        let (discovered, _) = find_join_indexes(&plan, eligibility, &catalog).unwrap();
        assert_eq!(discovered.get("a").unwrap().name, "idx_a_id");
        assert_eq!(discovered.get("b").unwrap().name, "idx_b_a_id");
    }

    #[test]
    fn equality_with_constant_side_resolves_nothing() {
        let catalog = make_catalog(vec![single_index("idx_a_id", "a", "a.id")]);
        let plan = two_table_plan(eq(col("a", "id", 0), lit(1)));
        let eligibility = Eligibility::assess(&plan);

        let (discovered, _) = find_join_indexes(&plan, eligibility, &catalog).unwrap();
        assert!(discovered.get("a").is_none());
        assert_eq!(catalog.reference_count("idx_a_id"), 0);
    }

    #[test]
    fn conjunction_of_equalities_uses_composite_lookup() {
        let catalog = make_catalog(vec![Index::new(
            "idx_b_xy",
            "db",
            "b",
            vec!["b.x".to_string(), "b.y".to_string()],
        )]);
        let cond = and(
            eq(col("a", "x", 1), col("b", "x", 4)),
            eq(col("a", "y", 2), col("b", "y", 5)),
        );
        let plan = two_table_plan(cond);
        let eligibility = Eligibility::assess(&plan);

        let (discovered, _) = find_join_indexes(&plan, eligibility, &catalog).unwrap();
        assert_eq!(discovered.get("b").unwrap().name, "idx_b_xy");
        assert!(discovered.get("a").is_none());
    }

    #[test]
    fn composite_lookup_fails_against_shorter_index() {
        let catalog = make_catalog(vec![single_index("idx_b_x", "b", "b.x")]);
        let cond = and(
            eq(col("a", "x", 1), col("b", "x", 4)),
            eq(col("a", "y", 2), col("b", "y", 5)),
        );
        let plan = two_table_plan(cond);
        let eligibility = Eligibility::assess(&plan);

        let (discovered, _) = find_join_indexes(&plan, eligibility, &catalog).unwrap();
        assert!(discovered.get("b").is_none());
    }

    #[test]
    fn mixed_conjunction_aborts_index_discovery() {
        let catalog = make_catalog(vec![Index::new(
            "idx_b_xy",
            "db",
            "b",
            vec!["b.x".to_string(), "b.y".to_string()],
        )]);
        let cond = and(
            eq(col("a", "x", 1), col("b", "x", 4)),
            gt(col("a", "y", 2), col("b", "y", 5)),
        );
        let plan = two_table_plan(cond);
        let eligibility = Eligibility::assess(&plan);

        let (discovered, _) = find_join_indexes(&plan, eligibility, &catalog).unwrap();
        assert!(discovered.get("b").is_none());
    }

    #[test]
    fn alias_bound_column_resolves_like_the_unaliased_form() {
        let catalog = make_catalog(vec![single_index("idx_b_a_id", "b", "b.a_id")]);
        // the condition references the alias; the binding lives in a
        // projection above the join
        let join = two_table_plan(eq(col("a", "id", 0), ucol("b_key")));
        let plan = Plan::Project {
            input: Box::new(join),
            expressions: vec![Expr::Alias {
                name: "b_key".to_string(),
                expr: Box::new(col("b", "a_id", 3)),
            }],
            schema: make_scan("a", &["id"]).schema(),
        };
        let eligibility = Eligibility::assess(&plan);

        let (discovered, aliases) = find_join_indexes(&plan, eligibility, &catalog).unwrap();
        assert_eq!(discovered.get("b").unwrap().name, "idx_b_a_id");
        assert_eq!(aliases["b_key"], col("b", "a_id", 3));
    }

    #[test]
    fn first_alias_binding_wins() {
        let catalog = make_catalog(vec![]);
        let join = two_table_plan(eq(col("a", "id", 0), col("b", "a_id", 3)));
        let plan = Plan::Project {
            input: Box::new(join),
            expressions: vec![
                Expr::Alias {
                    name: "k".to_string(),
                    expr: Box::new(col("b", "a_id", 3)),
                },
                Expr::Alias {
                    name: "k".to_string(),
                    expr: Box::new(col("b", "x", 4)),
                },
            ],
            schema: make_scan("a", &["id"]).schema(),
        };
        let eligibility = Eligibility::assess(&plan);

        let (_, aliases) = find_join_indexes(&plan, eligibility, &catalog).unwrap();
        assert_eq!(aliases["k"], col("b", "a_id", 3));
    }

    #[test]
    fn ineligible_plan_is_an_internal_error() {
        let catalog = make_catalog(vec![]);
        let plan = Plan::Insert {
            table_name: "a".to_string(),
            source: Box::new(make_scan("a", &["id"])),
        };
        let eligibility = Eligibility::assess(&plan);

        match find_join_indexes(&plan, eligibility, &catalog) {
            Err(Error::Internal(_)) => {}
            other => panic!("Expected Internal error, got {:?}", other),
        }
    }

    #[test]
    fn acquired_indexes_carry_live_references() {
        let catalog = make_catalog(vec![single_index("idx_b_a_id", "b", "b.a_id")]);
        let plan = two_table_plan(eq(col("a", "id", 0), col("b", "a_id", 3)));
        let eligibility = Eligibility::assess(&plan);

        let (discovered, _) = find_join_indexes(&plan, eligibility, &catalog).unwrap();
        assert_eq!(catalog.reference_count("idx_b_a_id"), 1);

        discovered.release_unused(&catalog);
        assert_eq!(catalog.reference_count("idx_b_a_id"), 0);
    }
}

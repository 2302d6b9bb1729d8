use std::sync::Arc;

use skiffsql_catalog::Index;
use skiffsql_common::error::{Error, Result};
use skiffsql_ir::{Expr, JoinType, Plan, inspect, split_conjunction};

use crate::column_expr::{AliasTable, ColumnExpr, join_exprs_by_table};
use crate::discovery::DiscoveredIndexes;
use crate::fix_indexes::fix_field_indexes_on_expressions;

/// Which original join side becomes the primary (iterated) side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PrimarySide {
    Left,
    Right,
}

/// Outcome of primary/secondary selection for one join node.
#[derive(Debug)]
pub(crate) struct JoinSelection {
    pub side: PrimarySide,
    /// Primary-table equality columns, ordinals resolved against the
    /// primary subtree's own schema; evaluated once per primary row to form
    /// the probe key.
    pub primary_key_exprs: Vec<Expr>,
    pub index: Arc<Index>,
}

/// Analyzes a join's two sides and condition to pick the primary and
/// secondary sides and the index to probe the secondary with.
///
/// An outer join may never demote its preserved side to the probed role: a
/// probed side yields at most one matching set per probe, and a failed probe
/// must still null-extend the primary row. Hence a left join keeps its left
/// side primary and a right join its right side.
pub(crate) fn select_join_sides(
    left: &Plan,
    right: &Plan,
    condition: &Expr,
    indexes: &DiscoveredIndexes,
    aliases: &AliasTable,
    join_type: JoinType,
) -> Result<JoinSelection> {
    let left_table = find_indexable_table_name(left);
    let right_table = find_indexable_table_name(right);

    let exprs_by_table = join_exprs_by_table(aliases, &split_conjunction(condition));
    if exprs_by_table.len() < 2 {
        return Err(Error::no_suitable_index(
            "join condition does not relate columns of two tables",
        ));
    }

    if let Some(rt) = right_table.as_deref() {
        if let Some(index) = indexes.get(rt) {
            if join_type != JoinType::Right {
                let key_exprs = primary_key_exprs(left, left_table.as_deref(), &exprs_by_table)?;
                return Ok(JoinSelection {
                    side: PrimarySide::Left,
                    primary_key_exprs: key_exprs,
                    index: Arc::clone(index),
                });
            }
        }
    }

    if let Some(lt) = left_table.as_deref() {
        if let Some(index) = indexes.get(lt) {
            if join_type != JoinType::Left {
                let key_exprs = primary_key_exprs(right, right_table.as_deref(), &exprs_by_table)?;
                return Ok(JoinSelection {
                    side: PrimarySide::Right,
                    primary_key_exprs: key_exprs,
                    index: Arc::clone(index),
                });
            }
        }
    }

    Err(Error::no_suitable_index(
        "no usable index on either join side",
    ))
}

fn primary_key_exprs(
    primary: &Plan,
    primary_table: Option<&str>,
    exprs_by_table: &rustc_hash::FxHashMap<String, Vec<ColumnExpr>>,
) -> Result<Vec<Expr>> {
    let table = primary_table
        .ok_or_else(|| Error::no_suitable_index("primary side has no indexable table"))?;
    let cols = exprs_by_table
        .get(table)
        .ok_or_else(|| Error::no_suitable_index("primary side contributes no equality columns"))?;
    let key_cols: Vec<Expr> = cols.iter().map(|c| c.col.clone()).collect();
    fix_field_indexes_on_expressions(&primary.schema(), &key_cols)
}

/// Underlying table name of a subtree: the first table scan whose table
/// exposes index-lookup capability.
fn find_indexable_table_name(plan: &Plan) -> Option<String> {
    let mut found = None;
    inspect(plan, &mut |node| {
        if let Plan::TableScan {
            table_name,
            indexable: true,
            ..
        } = node
        {
            found = Some(table_name.clone());
            return false;
        }
        true
    });
    found
}

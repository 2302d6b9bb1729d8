use skiffsql_common::error::{Error, Result};
use skiffsql_ir::{Plan, transform_up};
use tracing::debug;

use crate::column_expr::{AliasTable, substitute_aliases};
use crate::discovery::DiscoveredIndexes;
use crate::eligibility::Eligibility;
use crate::fix_indexes::{fix_expressions_for_node, fix_field_indexes};
use crate::select::{PrimarySide, select_join_sides};

/// Replaces each qualifying join with an indexed join, bottom-up.
///
/// A join with no usable index is left unchanged and falls back to its
/// nested-loop execution strategy; that is never an error. If any join was
/// rewritten, a second bottom-up pass repairs every node's column ordinals,
/// since swapping primary/secondary roles shifts absolute column positions
/// for everything above or beside the join.
pub(crate) fn transform_joins(
    plan: Plan,
    eligibility: Eligibility,
    indexes: &mut DiscoveredIndexes,
    aliases: &AliasTable,
) -> Result<Plan> {
    if !eligibility.qualifies() {
        return Err(Error::internal(
            "join rewriting invoked on an ineligible plan",
        ));
    }

    let mut any_rewritten = false;

    let node = transform_up(plan, &mut |node| {
        debug!(node = node.kind(), "transforming node");
        match node {
            Plan::Join {
                left,
                right,
                join_type,
                condition,
            } => {
                let selection =
                    match select_join_sides(&left, &right, &condition, indexes, aliases, join_type)
                    {
                        Ok(selection) => selection,
                        Err(Error::NoSuitableIndex(reason)) => {
                            debug!(%reason, "cannot apply index to join");
                            return Ok(Plan::Join {
                                left,
                                right,
                                join_type,
                                condition,
                            });
                        }
                        Err(e) => return Err(e),
                    };

                let (primary, secondary) = match selection.side {
                    PrimarySide::Left => (left, right),
                    PrimarySide::Right => (right, left),
                };

                // primary columns precede secondary columns in the new
                // node's schema, whatever the original orientation was
                let join_schema = primary.schema().concat(&secondary.schema());
                let condition =
                    fix_field_indexes(&join_schema, &substitute_aliases(aliases, &condition))?;

                let secondary = transform_up(*secondary, &mut |n| {
                    Ok(match n {
                        scan @ Plan::TableScan { .. } => Plan::IndexedTableScan {
                            scan: Box::new(scan),
                        },
                        other => other,
                    })
                })?;

                let index = indexes.take(&selection.index.table).ok_or_else(|| {
                    Error::internal("discovered index disappeared before the rewrite consumed it")
                })?;

                any_rewritten = true;
                Ok(Plan::IndexedJoin {
                    primary,
                    secondary: Box::new(secondary),
                    join_type,
                    condition,
                    primary_key_exprs: selection.primary_key_exprs,
                    index,
                })
            }
            other => Ok(other),
        }
    })?;

    if any_rewritten {
        transform_up(node, &mut fix_expressions_for_node)
    } else {
        Ok(node)
    }
}

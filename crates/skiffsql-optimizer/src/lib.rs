//! SkiffSQL query optimizer.
//!
//! The only pass implemented so far is the index-aware join rewrite: a
//! two-table join whose condition is an equality over indexed columns is
//! replaced with an [`Plan::IndexedJoin`] that iterates one side (the
//! primary) and probes the other (the secondary) through the index, instead
//! of a full nested-loop scan.
//!
//! The rewrite is strictly best-effort: any plan it does not understand is
//! returned unchanged with no error.
//!
//! [`Plan::IndexedJoin`]: skiffsql_ir::Plan::IndexedJoin

mod column_expr;
mod discovery;
mod eligibility;
mod fix_indexes;
mod rewrite;
mod select;
#[cfg(test)]
pub(crate) mod test_utils;

use skiffsql_catalog::IndexCatalog;
use skiffsql_common::error::Result;
use skiffsql_ir::Plan;
use tracing::{debug, debug_span};

pub use eligibility::Eligibility;
pub use fix_indexes::{fix_field_indexes, fix_field_indexes_on_expressions};

#[derive(Clone, Debug)]
pub struct OptimizerSettings {
    pub join_index_rewrite: bool,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            join_index_rewrite: true,
        }
    }
}

pub fn optimize(plan: Plan, catalog: &IndexCatalog, settings: &OptimizerSettings) -> Result<Plan> {
    if settings.join_index_rewrite {
        optimize_joins(plan, catalog)
    } else {
        Ok(plan)
    }
}

/// Rewrites a qualifying two-table equality join into an indexed join.
///
/// No-ops (returning the plan unchanged) when the plan is not fully
/// resolved, is a statement kind where join rewriting makes no sense, or
/// scans more than two tables. Index acquisition is scoped: every index
/// discovered but not consumed into the rewritten plan is released back to
/// the catalog before this function returns, on the error path included.
pub fn optimize_joins(plan: Plan, catalog: &IndexCatalog) -> Result<Plan> {
    let span = debug_span!("optimize_joins");
    let _enter = span.enter();

    let eligibility = Eligibility::assess(&plan);
    if !eligibility.qualifies() {
        debug!(?eligibility, "skipping join optimization");
        return Ok(plan);
    }

    let (mut indexes, aliases) = discovery::find_join_indexes(&plan, eligibility, catalog)?;

    let rewritten = rewrite::transform_joins(plan, eligibility, &mut indexes, &aliases);
    indexes.release_unused(catalog);
    rewritten
}

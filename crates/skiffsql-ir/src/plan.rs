use std::sync::Arc;

use serde::{Deserialize, Serialize};
use skiffsql_catalog::Index;
use skiffsql_common::error::Result;

use crate::expr::Expr;
use crate::schema::PlanSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinType {
    Inner,
    Left,
    Right,
}

/// Logical query plan node.
///
/// The variant set is closed: passes match exhaustively and extend behavior
/// by adding variants, never by open-ended downcasting.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Full scan of a base table. `indexable` records whether the underlying
    /// table exposes index-lookup capability.
    TableScan {
        table_name: String,
        schema: PlanSchema,
        indexable: bool,
    },
    /// Capability-preserving decorator over a table scan; the execution
    /// engine probes the wrapped table through an index instead of scanning
    /// it in full.
    IndexedTableScan { scan: Box<Plan> },
    Join {
        left: Box<Plan>,
        right: Box<Plan>,
        join_type: JoinType,
        condition: Expr,
    },
    /// Join executed by iterating the primary side and probing the secondary
    /// side through `index` with keys built from `primary_key_exprs`. The
    /// output schema is primary columns then secondary columns, regardless
    /// of the original left/right orientation.
    IndexedJoin {
        primary: Box<Plan>,
        secondary: Box<Plan>,
        join_type: JoinType,
        condition: Expr,
        primary_key_exprs: Vec<Expr>,
        index: Arc<Index>,
    },
    Filter {
        input: Box<Plan>,
        predicate: Expr,
    },
    Project {
        input: Box<Plan>,
        expressions: Vec<Expr>,
        schema: PlanSchema,
    },
    Insert {
        table_name: String,
        source: Box<Plan>,
    },
    CreateIndex {
        name: String,
        table_name: String,
        columns: Vec<String>,
    },
}

impl Plan {
    /// The node's output schema: the concatenation of its children's schemas
    /// in child order for join-like nodes, the stored schema for leaves.
    pub fn schema(&self) -> PlanSchema {
        match self {
            Plan::TableScan { schema, .. } => schema.clone(),
            Plan::IndexedTableScan { scan } => scan.schema(),
            Plan::Join { left, right, .. } => left.schema().concat(&right.schema()),
            Plan::IndexedJoin {
                primary, secondary, ..
            } => primary.schema().concat(&secondary.schema()),
            Plan::Filter { input, .. } => input.schema(),
            Plan::Project { schema, .. } => schema.clone(),
            Plan::Insert { .. } | Plan::CreateIndex { .. } => PlanSchema::new(),
        }
    }

    pub fn children(&self) -> Vec<&Plan> {
        match self {
            Plan::TableScan { .. } | Plan::CreateIndex { .. } => vec![],
            Plan::IndexedTableScan { scan } => vec![scan.as_ref()],
            Plan::Join { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Plan::IndexedJoin {
                primary, secondary, ..
            } => vec![primary.as_ref(), secondary.as_ref()],
            Plan::Filter { input, .. } => vec![input.as_ref()],
            Plan::Project { input, .. } => vec![input.as_ref()],
            Plan::Insert { source, .. } => vec![source.as_ref()],
        }
    }

    /// The expressions this node itself exposes, excluding children's.
    pub fn expressions(&self) -> Vec<&Expr> {
        match self {
            Plan::TableScan { .. }
            | Plan::IndexedTableScan { .. }
            | Plan::Insert { .. }
            | Plan::CreateIndex { .. } => vec![],
            Plan::Join { condition, .. } => vec![condition],
            Plan::IndexedJoin {
                condition,
                primary_key_exprs,
                ..
            } => {
                let mut exprs = vec![condition];
                exprs.extend(primary_key_exprs.iter());
                exprs
            }
            Plan::Filter { predicate, .. } => vec![predicate],
            Plan::Project { expressions, .. } => expressions.iter().collect(),
        }
    }

    /// Variant name, for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Plan::TableScan { .. } => "TableScan",
            Plan::IndexedTableScan { .. } => "IndexedTableScan",
            Plan::Join { .. } => "Join",
            Plan::IndexedJoin { .. } => "IndexedJoin",
            Plan::Filter { .. } => "Filter",
            Plan::Project { .. } => "Project",
            Plan::Insert { .. } => "Insert",
            Plan::CreateIndex { .. } => "CreateIndex",
        }
    }

    /// Whether name resolution has completed for the whole tree: every
    /// column reference in every node carries an ordinal.
    pub fn is_resolved(&self) -> bool {
        let mut resolved = true;
        inspect(self, &mut |node| {
            if node.expressions().iter().any(|e| !e.is_resolved()) {
                resolved = false;
                return false;
            }
            true
        });
        resolved
    }
}

/// Top-down visit. `f` returns whether to descend into the node's children.
pub fn inspect<F>(plan: &Plan, f: &mut F)
where
    F: FnMut(&Plan) -> bool,
{
    if !f(plan) {
        return;
    }
    for child in plan.children() {
        inspect(child, f);
    }
}

/// Bottom-up rebuild: children are transformed first, then `f` replaces the
/// rebuilt node. Short-circuits on the first error.
pub fn transform_up<F>(plan: Plan, f: &mut F) -> Result<Plan>
where
    F: FnMut(Plan) -> Result<Plan>,
{
    let rebuilt = match plan {
        leaf @ (Plan::TableScan { .. } | Plan::CreateIndex { .. }) => leaf,
        Plan::IndexedTableScan { scan } => Plan::IndexedTableScan {
            scan: Box::new(transform_up(*scan, f)?),
        },
        Plan::Join {
            left,
            right,
            join_type,
            condition,
        } => Plan::Join {
            left: Box::new(transform_up(*left, f)?),
            right: Box::new(transform_up(*right, f)?),
            join_type,
            condition,
        },
        Plan::IndexedJoin {
            primary,
            secondary,
            join_type,
            condition,
            primary_key_exprs,
            index,
        } => Plan::IndexedJoin {
            primary: Box::new(transform_up(*primary, f)?),
            secondary: Box::new(transform_up(*secondary, f)?),
            join_type,
            condition,
            primary_key_exprs,
            index,
        },
        Plan::Filter { input, predicate } => Plan::Filter {
            input: Box::new(transform_up(*input, f)?),
            predicate,
        },
        Plan::Project {
            input,
            expressions,
            schema,
        } => Plan::Project {
            input: Box::new(transform_up(*input, f)?),
            expressions,
            schema,
        },
        Plan::Insert { table_name, source } => Plan::Insert {
            table_name,
            source: Box::new(transform_up(*source, f)?),
        },
    };
    f(rebuilt)
}

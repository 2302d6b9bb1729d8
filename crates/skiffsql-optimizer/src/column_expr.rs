use rustc_hash::FxHashMap;
use skiffsql_ir::{BinaryOp, Expr};

/// Alias name → the expression it was bound to. First binding for a name
/// wins; later duplicates are ignored.
pub(crate) type AliasTable = FxHashMap<String, Expr>;

/// A column reference pulled out of an equality predicate, paired with the
/// expression it is compared against and the originating predicate.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ColumnExpr {
    pub col: Expr,
    pub comparand: Expr,
    pub comparison: Expr,
}

impl ColumnExpr {
    pub(crate) fn table(&self) -> Option<&str> {
        match &self.col {
            Expr::Column { table, .. } => table.as_deref(),
            _ => None,
        }
    }
}

/// Substitutes a named alias reference with the expression it was bound to.
/// Unwraps one level: a literal `Alias` node yields its child, a bare
/// unqualified column bound elsewhere yields the bound expression.
pub(crate) fn unwrap_alias<'a>(aliases: &'a AliasTable, expr: &'a Expr) -> &'a Expr {
    match expr {
        Expr::Alias { expr: inner, .. } => inner,
        Expr::Column {
            table: None, name, ..
        } => aliases.get(name).unwrap_or(expr),
        other => other,
    }
}

/// Rewrites an expression tree with every alias reference replaced by its
/// bound expression, so ordinals can be resolved against base schemas.
pub(crate) fn substitute_aliases(aliases: &AliasTable, expr: &Expr) -> Expr {
    match expr {
        Expr::Column {
            table: None, name, ..
        } => aliases.get(name).cloned().unwrap_or_else(|| expr.clone()),
        Expr::Column { .. } | Expr::Literal(_) => expr.clone(),
        Expr::Alias { name, expr: inner } => Expr::Alias {
            name: name.clone(),
            expr: Box::new(substitute_aliases(aliases, inner)),
        },
        Expr::BinaryOp { left, op, right } => Expr::BinaryOp {
            left: Box::new(substitute_aliases(aliases, left)),
            op: *op,
            right: Box::new(substitute_aliases(aliases, right)),
        },
    }
}

/// Extracts the pair of column expressions from a predicate, which must be
/// an equality between two column references (aliases unwrapped first).
/// Anything evaluable to a constant on either side is excluded; those
/// predicates belong to pushdown, not join indexing.
pub(crate) fn extract_join_column_exprs(
    aliases: &AliasTable,
    predicate: &Expr,
) -> Option<(ColumnExpr, ColumnExpr)> {
    let Expr::BinaryOp {
        left,
        op: BinaryOp::Eq,
        right,
    } = predicate
    else {
        return None;
    };

    if left.is_constant() || right.is_constant() {
        return None;
    }

    let left_col = unwrap_alias(aliases, left);
    let right_col = unwrap_alias(aliases, right);
    match (left_col, right_col) {
        (Expr::Column { .. }, Expr::Column { .. }) => Some((
            ColumnExpr {
                col: left_col.clone(),
                comparand: right_col.clone(),
                comparison: predicate.clone(),
            },
            ColumnExpr {
                col: right_col.clone(),
                comparand: left_col.clone(),
                comparison: predicate.clone(),
            },
        )),
        _ => None,
    }
}

/// Groups the column sides of every column-to-column equality conjunct by
/// owning table, preserving conjunct order within each table.
pub(crate) fn join_exprs_by_table(
    aliases: &AliasTable,
    conjuncts: &[&Expr],
) -> FxHashMap<String, Vec<ColumnExpr>> {
    let mut result: FxHashMap<String, Vec<ColumnExpr>> = FxHashMap::default();

    for predicate in conjuncts {
        let Some((left, right)) = extract_join_column_exprs(aliases, predicate) else {
            continue;
        };
        for side in [left, right] {
            let Some(table) = side.table() else { continue };
            result.entry(table.to_string()).or_default().push(side);
        }
    }

    result
}

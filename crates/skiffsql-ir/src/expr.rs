use std::fmt;

use skiffsql_common::types::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    NotEq,
    Lt,
    Gt,
    And,
    Or,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
        };
        write!(f, "{}", s)
    }
}

/// Scalar expression tree.
///
/// A `Column` names a `(table, column)` pair and, once position-resolved,
/// carries its ordinal into the owning node's child schema. The ordinal is
/// `None` until name resolution assigns it, and must be repaired whenever a
/// rewrite changes the child schema layout.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column {
        table: Option<String>,
        name: String,
        index: Option<usize>,
    },
    Literal(Value),
    Alias {
        name: String,
        expr: Box<Expr>,
    },
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
}

impl Expr {
    /// Whether the expression can be evaluated without any input row, i.e.
    /// references no columns.
    pub fn is_constant(&self) -> bool {
        match self {
            Expr::Column { .. } => false,
            Expr::Literal(_) => true,
            Expr::Alias { expr, .. } => expr.is_constant(),
            Expr::BinaryOp { left, right, .. } => left.is_constant() && right.is_constant(),
        }
    }

    /// Whether every column reference has been assigned an ordinal.
    pub fn is_resolved(&self) -> bool {
        match self {
            Expr::Column { index, .. } => index.is_some(),
            Expr::Literal(_) => true,
            Expr::Alias { expr, .. } => expr.is_resolved(),
            Expr::BinaryOp { left, right, .. } => left.is_resolved() && right.is_resolved(),
        }
    }

    /// Preorder visit of every node in the expression tree.
    pub fn visit<F: FnMut(&Expr)>(&self, f: &mut F) {
        f(self);
        match self {
            Expr::Column { .. } | Expr::Literal(_) => {}
            Expr::Alias { expr, .. } => expr.visit(f),
            Expr::BinaryOp { left, right, .. } => {
                left.visit(f);
                right.visit(f);
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column { table, name, .. } => match table {
                Some(t) => write!(f, "{}.{}", t, name),
                None => write!(f, "{}", name),
            },
            Expr::Literal(v) => write!(f, "{}", v),
            Expr::Alias { name, expr } => write!(f, "{} AS {}", expr, name),
            Expr::BinaryOp { left, op, right } => write!(f, "({} {} {})", left, op, right),
        }
    }
}

/// Flattens an AND tree into its conjuncts, left to right.
pub fn split_conjunction(expr: &Expr) -> Vec<&Expr> {
    match expr {
        Expr::BinaryOp {
            left,
            op: BinaryOp::And,
            right,
        } => {
            let mut result = split_conjunction(left);
            result.extend(split_conjunction(right));
            result
        }
        other => vec![other],
    }
}

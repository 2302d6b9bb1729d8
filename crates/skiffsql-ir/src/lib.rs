//! SkiffSQL intermediate representation.
//!
//! Query plans are immutable trees over a closed set of node variants;
//! optimizer passes rebuild trees rather than mutating them in place, sharing
//! unchanged subtrees. Expressions follow the same discipline.

pub mod expr;
pub mod plan;
pub mod schema;

pub use expr::{BinaryOp, Expr, split_conjunction};
pub use plan::{JoinType, Plan, inspect, transform_up};
pub use schema::{PlanField, PlanSchema};

//! SkiffSQL - lightweight SQL query planning with index-aware join
//! optimization.
//!
//! # Architecture
//!
//! The planning pipeline is:
//! ```text
//! LogicalPlan → Optimizer passes → LogicalPlan → Execution
//! ```
//!
//! The pass implemented here rewrites a resolved two-table equality join
//! into an indexed join when the catalog has a matching index: one side
//! (the primary) drives iteration while the other (the secondary) is probed
//! through the index instead of being scanned in full.
//!
//! # Example
//!
//! ```rust,ignore
//! use skiffsql::{Index, IndexCatalog, optimize_joins};
//!
//! let catalog = IndexCatalog::new("db");
//! catalog.register_index(Index::new(
//!     "idx_orders_customer_id",
//!     "db",
//!     "orders",
//!     vec!["orders.customer_id".to_string()],
//! ));
//!
//! let optimized = optimize_joins(plan, &catalog)?;
//! ```

pub use skiffsql_catalog::{AscendRangeLookup, Index, IndexCatalog, IndexLookup, MergedLookup};
pub use skiffsql_common::error::{Error, Result};
pub use skiffsql_common::types::{DataType, Value};
pub use skiffsql_ir::{
    BinaryOp, Expr, JoinType, Plan, PlanField, PlanSchema, inspect, split_conjunction,
    transform_up,
};
pub use skiffsql_optimizer::{Eligibility, OptimizerSettings, optimize, optimize_joins};

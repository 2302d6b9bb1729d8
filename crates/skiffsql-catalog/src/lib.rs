//! Index catalog for SkiffSQL.
//!
//! The catalog is a process-wide registry of secondary indexes. Query
//! compilations running on separate threads look indexes up by the ordered
//! list of column expressions they cover, and must release every acquired
//! handle they do not end up consuming. The catalog tracks live references
//! per index so administrative operations can tell when an index is in use.

pub mod index;
pub mod lookup;

pub use index::{Index, IndexCatalog};
pub use lookup::{AscendRangeLookup, IndexLookup, MergedLookup};

//! Common types and error handling for SkiffSQL.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{DataType, Value};

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    TableNotFound(String),
    ColumnNotFound(String),
    IndexNotFound(String),
    NoSuitableIndex(String),
    SchemaMismatch(String),
    UnsupportedFeature(String),
    UnsupportedOperation(String),
    Internal(String),
}

impl Error {
    pub fn table_not_found(name: impl Into<String>) -> Self {
        Error::TableNotFound(name.into())
    }

    pub fn column_not_found(name: impl Into<String>) -> Self {
        Error::ColumnNotFound(name.into())
    }

    pub fn index_not_found(name: impl Into<String>) -> Self {
        Error::IndexNotFound(name.into())
    }

    pub fn no_suitable_index(msg: impl Into<String>) -> Self {
        Error::NoSuitableIndex(msg.into())
    }

    pub fn schema_mismatch(msg: impl Into<String>) -> Self {
        Error::SchemaMismatch(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Error::UnsupportedFeature(msg.into())
    }

    pub fn unsupported_operation(msg: impl Into<String>) -> Self {
        Error::UnsupportedOperation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TableNotFound(name) => write!(f, "Table not found: {}", name),
            Error::ColumnNotFound(name) => write!(f, "Column not found: {}", name),
            Error::IndexNotFound(name) => write!(f, "Index not found: {}", name),
            Error::NoSuitableIndex(msg) => write!(f, "No suitable index: {}", msg),
            Error::SchemaMismatch(msg) => write!(f, "Schema mismatch: {}", msg),
            Error::UnsupportedFeature(msg) => write!(f, "Unsupported feature: {}", msg),
            Error::UnsupportedOperation(msg) => write!(f, "Unsupported operation: {}", msg),
            Error::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

use skiffsql_common::error::{Error, Result};
use skiffsql_common::types::Value;

/// An index lookup an index implementation hands to the scan engine.
///
/// Closed set of variants; composition is purely structural at this layer.
/// Actual set semantics are realized by the scan engine when the lookup is
/// executed.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexLookup {
    AscendRange(AscendRangeLookup),
    Merged(MergedLookup),
}

impl IndexLookup {
    /// Ids of every index this lookup touches.
    pub fn indexes(&self) -> Vec<String> {
        match self {
            IndexLookup::AscendRange(l) => l.indexes(),
            IndexLookup::Merged(l) => l.indexes(),
        }
    }

    pub fn is_mergeable(&self, _other: &IndexLookup) -> bool {
        true
    }

    pub fn union(&self, others: &[IndexLookup]) -> IndexLookup {
        match self {
            IndexLookup::AscendRange(l) => l.union(others),
            IndexLookup::Merged(l) => l.union(others),
        }
    }

    pub fn intersection(&self, _others: &[IndexLookup]) -> Result<IndexLookup> {
        Err(Error::unsupported_operation(
            "intersection is not supported for this lookup",
        ))
    }

    pub fn difference(&self, _others: &[IndexLookup]) -> Result<IndexLookup> {
        Err(Error::unsupported_operation(
            "difference is not supported for this lookup",
        ))
    }
}

/// A lookup over an ascending key range of a single index: keys `>= gte`
/// and `< lt`, one bound value per covered column.
#[derive(Debug, Clone, PartialEq)]
pub struct AscendRangeLookup {
    pub id: String,
    pub gte: Vec<Value>,
    pub lt: Vec<Value>,
}

impl AscendRangeLookup {
    pub fn new(id: impl Into<String>, gte: Vec<Value>, lt: Vec<Value>) -> Self {
        Self {
            id: id.into(),
            gte,
            lt,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn indexes(&self) -> Vec<String> {
        vec![self.id.clone()]
    }

    /// Composes this lookup with others into a merged union lookup. Always
    /// succeeds regardless of bound compatibility.
    pub fn union(&self, others: &[IndexLookup]) -> IndexLookup {
        let mut unions = Vec::with_capacity(others.len() + 1);
        unions.push(IndexLookup::AscendRange(self.clone()));
        unions.extend(others.iter().cloned());
        IndexLookup::Merged(MergedLookup { unions })
    }
}

/// The structural union of several mergeable lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedLookup {
    pub unions: Vec<IndexLookup>,
}

impl MergedLookup {
    pub fn indexes(&self) -> Vec<String> {
        self.unions.iter().flat_map(|l| l.indexes()).collect()
    }

    pub fn union(&self, others: &[IndexLookup]) -> IndexLookup {
        let mut unions = self.unions.clone();
        unions.extend(others.iter().cloned());
        IndexLookup::Merged(MergedLookup { unions })
    }
}

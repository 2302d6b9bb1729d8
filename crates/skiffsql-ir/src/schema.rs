use serde::{Deserialize, Serialize};
use skiffsql_common::types::DataType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanField {
    pub name: String,
    pub data_type: DataType,
    pub table: Option<String>,
}

impl PlanField {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            table: None,
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }
}

/// Ordered column schema of a plan node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanSchema {
    pub fields: Vec<PlanField>,
}

impl PlanSchema {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn from_fields(fields: Vec<PlanField>) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Position of a column, matched by table qualifier when one is given
    /// and by bare name otherwise.
    pub fn field_index(&self, table: Option<&str>, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| {
            f.name == name
                && match table {
                    Some(t) => f.table.as_deref() == Some(t),
                    None => true,
                }
        })
    }

    /// Schema of this node's columns followed by another node's columns.
    pub fn concat(&self, other: &PlanSchema) -> PlanSchema {
        let mut fields = self.fields.clone();
        fields.extend(other.fields.clone());
        PlanSchema { fields }
    }
}

use serde::{Deserialize, Serialize};

use quiver_error::{QuiverError, Result};

use super::datatype::DataType;

/// A named column within a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub datatype: DataType,
}

impl Field {
    pub fn new(name: impl Into<String>, datatype: DataType) -> Self {
        Field {
            name: name.into(),
            datatype,
        }
    }
}

/// An ordered sequence of fields.
///
/// Field order is semantically significant, it is column position. Duplicate
/// names are permitted but resolve to the first match during lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: impl IntoIterator<Item = Field>) -> Self {
        Schema {
            fields: fields.into_iter().collect(),
        }
    }

    pub fn empty() -> Self {
        Schema { fields: Vec::new() }
    }

    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    /// Get the first field with the given name, along with its column index.
    pub fn field_by_name(&self, name: &str) -> Option<(usize, &Field)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, field)| field.name == name)
    }

    /// Produce a new schema containing exactly the requested fields, in the
    /// requested order.
    ///
    /// Errors if any name is absent.
    pub fn select<S: AsRef<str>>(&self, names: impl IntoIterator<Item = S>) -> Result<Schema> {
        let fields = names
            .into_iter()
            .map(|name| {
                let name = name.as_ref();
                self.field_by_name(name)
                    .map(|(_, field)| field.clone())
                    .ok_or_else(|| QuiverError::sql(format!("Unknown field name: {name}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Schema { fields })
    }
}

//! Field Model
//!
//! The flattened, inheritance-resolved field graph handed over by the schema
//! parser. Derivation reads it in [`FieldModel::iter`] order, which is part of
//! the output's byte-stability.

pub mod attribute;
pub mod data_type;
pub mod field;

pub use attribute::{Attribute, PrefetchOverride};
pub use data_type::DataType;
pub use field::Field;

use serde::{Deserialize, Serialize};

/// Ordered list of concrete fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldModel {
    fields: Vec<Field>,
}

impl FieldModel {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Flattens an inheritance pair: parent fields keep their position, a child
    /// field with the same name replaces the parent's, new child fields follow.
    pub fn flatten(parent: &FieldModel, child: &FieldModel) -> FieldModel {
        let mut fields = parent.fields.clone();
        for field in &child.fields {
            match fields.iter_mut().find(|f| f.name == field.name) {
                Some(inherited) => *inherited = field.clone(),
                None => fields.push(field.clone()),
            }
        }
        FieldModel { fields }
    }

    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get_index(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    pub fn get_index_mut(&mut self, index: usize) -> Option<&mut Field> {
        self.fields.get_mut(index)
    }

    /// Looks up a concrete field, including nested struct fields by full name
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().flat_map(Field::walk).find(|f| f.name == name)
    }

    /// Looks up an attribute owned by any field
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.fields
            .iter()
            .flat_map(Field::walk)
            .find_map(|f| f.attribute(name))
    }
}

impl From<Vec<Field>> for FieldModel {
    fn from(fields: Vec<Field>) -> Self {
        Self::new(fields)
    }
}

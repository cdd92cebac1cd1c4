//! Concrete document fields

use serde::{Deserialize, Serialize};

use super::{Attribute, DataType};
use crate::summary::SummaryField;

/// A concrete, inheritance-resolved field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
    /// Indexing produces a summary-storable value
    #[serde(default)]
    pub summarying: bool,
    /// Indexing produces an attribute value
    #[serde(default)]
    pub attributing: bool,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Summary fields declared on this field, in declaration order
    #[serde(default)]
    pub summary_fields: Vec<SummaryField>,
    /// Sub-fields of struct and map typed fields, named `parent.sub`
    #[serde(default)]
    pub struct_fields: Vec<Field>,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            summarying: false,
            attributing: false,
            attributes: Vec::new(),
            summary_fields: Vec::new(),
            struct_fields: Vec::new(),
        }
    }

    pub fn summarying(mut self) -> Self {
        self.summarying = true;
        self
    }

    /// Adds an attribute and marks the field as attributing
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributing = true;
        self.attributes.push(attribute);
        self
    }

    /// Adds an attribute named after the field itself
    pub fn attribute_backed(self) -> Self {
        let attribute = Attribute::new(self.name.clone(), self.data_type.clone());
        self.with_attribute(attribute)
    }

    pub fn with_summary_field(mut self, summary_field: SummaryField) -> Self {
        self.add_summary_field(summary_field);
        self
    }

    pub fn with_struct_field(mut self, field: Field) -> Self {
        self.struct_fields.push(field);
        self
    }

    pub fn does_summarying(&self) -> bool {
        self.summarying
    }

    pub fn does_attributing(&self) -> bool {
        self.attributing
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn summary_field(&self, name: &str) -> Option<&SummaryField> {
        self.summary_fields.iter().find(|s| s.name == name)
    }

    pub fn summary_field_mut(&mut self, name: &str) -> Option<&mut SummaryField> {
        self.summary_fields.iter_mut().find(|s| s.name == name)
    }

    /// Declares a summary field, replacing one with the same name in place
    pub fn add_summary_field(&mut self, summary_field: SummaryField) {
        match self.summary_field_mut(&summary_field.name) {
            Some(existing) => *existing = summary_field,
            None => self.summary_fields.push(summary_field),
        }
    }

    /// A complex field whose every leaf struct field is backed by an
    /// attribute, so the whole value can be rebuilt from attributes.
    pub fn is_complex_with_only_struct_field_attributes(&self) -> bool {
        self.data_type.is_supported_complex()
            && !self.struct_fields.is_empty()
            && self.struct_fields.iter().all(Field::leaves_are_attributes)
    }

    fn leaves_are_attributes(&self) -> bool {
        if self.struct_fields.is_empty() {
            self.attribute(&self.name).is_some()
        } else {
            self.struct_fields.iter().all(Field::leaves_are_attributes)
        }
    }

    /// Depth-first walk over this field and all nested struct fields
    pub fn walk(&self) -> Box<dyn Iterator<Item = &Field> + '_> {
        Box::new(std::iter::once(self).chain(self.struct_fields.iter().flat_map(Field::walk)))
    }
}

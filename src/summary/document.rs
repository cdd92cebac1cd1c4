//! Document summaries: named, client-selectable result views

use serde::{Deserialize, Serialize};

use super::SummaryField;
use crate::checksum::Checksum;

/// A named set of summary fields, kept in insertion order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<SummaryField>,
    #[serde(default)]
    pub from_disk: bool,
}

impl DocumentSummary {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            from_disk: false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&SummaryField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Puts a field into this summary, replacing a same-named one in place.
    /// The field is marked as having this summary as destination.
    pub fn add(&mut self, mut field: SummaryField) {
        field.add_destination(self.name.clone());
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Removes implicit fields that an explicit field of this summary already
    /// draws from under another name.
    pub fn purge_implicits(&mut self) -> Vec<String> {
        let mut superseded: Vec<String> = Vec::new();
        let candidates = self
            .fields
            .iter()
            .filter(|f| !f.implicit)
            .flat_map(|f| f.sources.iter().filter(move |s| **s != f.name))
            .filter(|source| self.get(source).is_some_and(|sf| sf.implicit));
        for source in candidates {
            if !superseded.contains(source) {
                superseded.push(source.clone());
            }
        }

        self.fields.retain(|f| !superseded.contains(&f.name));
        superseded
    }

    /// Content checksum over the canonical serialization
    pub fn fingerprint(&self) -> crate::Result<Checksum> {
        Checksum::from_serialize(self)
    }
}

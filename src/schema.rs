//! Schema aggregate: the flattened fields plus the summaries derived from them

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::checksum::Checksum;
use crate::error::{CompileError, Result};
use crate::model::{Attribute, Field, FieldModel};
use crate::summary::{DocumentSummary, SummaryField};

/// A search schema as seen by summary derivation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    #[serde(default)]
    pub fields: FieldModel,
    /// Summaries by name; user-declared ones are present before derivation
    #[serde(default)]
    pub summaries: BTreeMap<String, DocumentSummary>,
}

impl Schema {
    pub fn new(name: impl Into<String>, fields: impl Into<FieldModel>) -> Self {
        Self {
            name: name.into(),
            fields: fields.into(),
            summaries: BTreeMap::new(),
        }
    }

    /// Read a schema from its JSON form
    ///
    /// Every summary must be stored under its own name.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let schema: Self = serde_json::from_str(&content)?;
        if let Some((key, summary)) = schema.summaries.iter().find(|(key, s)| **key != s.name) {
            return Err(CompileError::SummaryNameMismatch {
                key: key.clone(),
                name: summary.name.clone(),
            });
        }
        Ok(schema)
    }

    pub fn with_summary(mut self, summary: DocumentSummary) -> Self {
        self.add_summary(summary);
        self
    }

    pub fn add_summary(&mut self, summary: DocumentSummary) {
        self.summaries.insert(summary.name.clone(), summary);
    }

    pub fn summary(&self, name: &str) -> Option<&DocumentSummary> {
        self.summaries.get(name)
    }

    pub fn summary_mut(&mut self, name: &str) -> Option<&mut DocumentSummary> {
        self.summaries.get_mut(name)
    }

    /// The named summary, created empty if missing
    pub fn summary_or_create(&mut self, name: &str) -> &mut DocumentSummary {
        self.summaries
            .entry(name.to_string())
            .or_insert_with(|| DocumentSummary::new(name))
    }

    pub fn concrete_field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.fields.attribute(name)
    }

    /// Every non-implicit summary field with the given name, first from the
    /// summaries, then from the fields' own declarations.
    pub fn explicit_summary_fields<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a SummaryField> + 'a {
        let in_summaries = self.summaries.values().filter_map(move |s| s.get(name));
        let on_fields = self
            .fields
            .iter()
            .flat_map(Field::walk)
            .filter_map(move |f| f.summary_field(name));
        in_summaries.chain(on_fields).filter(|sf| !sf.implicit)
    }

    /// Checksum over all summaries, for change detection
    pub fn summaries_fingerprint(&self) -> Result<Checksum> {
        Checksum::from_serialize(&self.summaries)
    }
}

//! Summary fields and the merge of duplicate declarations

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use super::SummaryTransform;
use crate::model::DataType;

/// One output entry of a document summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryField {
    pub name: String,
    pub data_type: DataType,
    #[serde(default)]
    pub transform: SummaryTransform,
    /// Field or attribute names, in declaration order without duplicates
    #[serde(default)]
    pub sources: Vec<String>,
    /// Names of the summaries this field goes into
    #[serde(default)]
    pub destinations: BTreeSet<String>,
    /// Synthesized by derivation rather than declared
    #[serde(default)]
    pub implicit: bool,
}

/// Two declarations of the same summary field that cannot be combined
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeConflict {
    #[error("Summary field '{name}' is declared with type {existing} and {incoming}: all declarations of the same summary field must have the same type")]
    DataType {
        name: String,
        existing: DataType,
        incoming: DataType,
    },

    #[error("Summary field '{name}' is declared with transform {existing} and {incoming}: all declarations of the same summary field must have the same transform")]
    Transform {
        name: String,
        existing: SummaryTransform,
        incoming: SummaryTransform,
    },
}

impl SummaryField {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            transform: SummaryTransform::None,
            sources: Vec::new(),
            destinations: BTreeSet::new(),
            implicit: false,
        }
    }

    pub fn with_transform(mut self, transform: SummaryTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.add_source(source);
        self
    }

    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.add_destination(destination);
        self
    }

    pub fn add_source(&mut self, source: impl Into<String>) {
        let source = source.into();
        if !self.sources.contains(&source) {
            self.sources.push(source);
        }
    }

    pub fn add_destination(&mut self, destination: impl Into<String>) {
        self.destinations.insert(destination.into());
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// The only source, if there is exactly one
    pub fn single_source(&self) -> Option<&str> {
        match self.sources.as_slice() {
            [source] => Some(source),
            _ => None,
        }
    }

    /// Name of the field this summary field reads from: the first declared
    /// source, or the summary field's own name when none is declared.
    pub fn source_field(&self) -> &str {
        self.sources.first().map(String::as_str).unwrap_or(&self.name)
    }

    /// Combines this incoming declaration with an existing one of the same name.
    ///
    /// An implicit participant yields to an explicit one. Between explicit
    /// declarations a `None` transform takes the other's, sources and
    /// destinations are unioned (existing first), and any disagreement on
    /// type or transform is returned as a conflict.
    pub fn merge_with(&self, existing: &SummaryField) -> Result<SummaryField, MergeConflict> {
        if self.implicit {
            return Ok(existing.clone());
        }
        if existing.implicit {
            return Ok(self.clone());
        }
        if self.data_type != existing.data_type {
            return Err(MergeConflict::DataType {
                name: self.name.clone(),
                existing: existing.data_type.clone(),
                incoming: self.data_type.clone(),
            });
        }

        let transform = match (existing.transform, self.transform) {
            (SummaryTransform::None, incoming) => incoming,
            (current, SummaryTransform::None) => current,
            (current, incoming) if current == incoming => current,
            (current, incoming) => {
                return Err(MergeConflict::Transform {
                    name: self.name.clone(),
                    existing: current,
                    incoming,
                })
            }
        };

        let mut merged = existing.clone();
        merged.transform = transform;
        for source in &self.sources {
            merged.add_source(source.clone());
        }
        merged.destinations.extend(self.destinations.iter().cloned());
        Ok(merged)
    }
}

impl fmt::Display for SummaryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "summary field '{}'", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explicit(name: &str, transform: SummaryTransform) -> SummaryField {
        SummaryField::new(name, DataType::String).with_transform(transform)
    }

    #[test]
    fn test_implicit_yields() {
        let mut implicit = explicit("title", SummaryTransform::Attribute);
        implicit.implicit = true;
        let declared = explicit("title", SummaryTransform::DynamicTeaser);

        assert_eq!(implicit.merge_with(&declared).unwrap(), declared);
        assert_eq!(declared.merge_with(&implicit).unwrap(), declared);
    }

    #[test]
    fn test_none_takes_other_transform() {
        let existing = explicit("title", SummaryTransform::None).with_source("title");
        let incoming = explicit("title", SummaryTransform::Attribute).with_source("title_raw");

        let merged = incoming.merge_with(&existing).unwrap();
        assert_eq!(merged.transform, SummaryTransform::Attribute);
        assert_eq!(merged.sources, vec!["title".to_string(), "title_raw".to_string()]);

        let merged = existing.merge_with(&incoming).unwrap();
        assert_eq!(merged.transform, SummaryTransform::Attribute);
    }

    #[test]
    fn test_transform_conflict() {
        let existing = explicit("title", SummaryTransform::Attribute);
        let incoming = explicit("title", SummaryTransform::DynamicBolded);

        let err = incoming.merge_with(&existing).unwrap_err();
        assert_eq!(
            err,
            MergeConflict::Transform {
                name: "title".into(),
                existing: SummaryTransform::Attribute,
                incoming: SummaryTransform::DynamicBolded,
            }
        );
    }

    #[test]
    fn test_type_conflict() {
        let existing = SummaryField::new("year", DataType::Int);
        let incoming = SummaryField::new("year", DataType::Long);
        assert!(matches!(incoming.merge_with(&existing), Err(MergeConflict::DataType { .. })));
    }

    #[test]
    fn test_source_field() {
        assert_eq!(SummaryField::new("title", DataType::String).source_field(), "title");
        let sf = SummaryField::new("short", DataType::String).with_source("body");
        assert_eq!(sf.source_field(), "body");
        assert_eq!(sf.single_source(), Some("body"));
    }
}

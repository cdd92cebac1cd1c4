//! Derivation of document summaries from per-field summary declarations
//!
//! Every field is visited once, in field model order:
//! - a field producing a summary value gets an implicit summary field named
//!   after itself, read from its attribute when it has one;
//! - prefetch-eligible attributes and position attributes feed the
//!   `attributeprefetch` summary;
//! - declared summary fields are validated and merged into their destinations.
//!
//! Finally each summary drops implicit fields superseded by explicit ones.

use std::collections::BTreeSet;

use tracing::{debug, info, info_span};

use super::validation::{fatal_diagnostic, validate_summary_field};
use crate::diagnostics::{Diagnostic, DiagnosticCode, Reporter};
use crate::error::Result;
use crate::model::{Attribute, DataType, Field, PrefetchOverride};
use crate::schema::Schema;
use crate::summary::{
    distance_summary_field_name, position_summary_field_name, DocumentSummary, SummaryField,
    SummaryTransform, ATTRIBUTE_PREFETCH_SUMMARY, DEFAULT_SUMMARY,
};

/// Turns implicitly defined summaries into explicit ones
pub struct ImplicitSummaries<'r> {
    reporter: &'r mut dyn Reporter,
    /// (summary, field, transform, type) declarations already reported as conflicting
    conflicts: BTreeSet<(String, String, SummaryTransform, String)>,
}

impl<'r> ImplicitSummaries<'r> {
    pub fn new(reporter: &'r mut dyn Reporter) -> Self {
        Self {
            reporter,
            conflicts: BTreeSet::new(),
        }
    }

    /// Derives the summaries of `schema`.
    ///
    /// On error the schema is left untouched.
    pub fn process(&mut self, schema: &mut Schema, validate: bool, documents_only: bool) -> Result<()> {
        let span = info_span!("implicit_summaries", schema = %schema.name);
        let _enter = span.enter();
        debug!(validate, documents_only, "deriving summaries");

        self.conflicts.clear();
        let mut working = schema.clone();

        if !working.summaries.contains_key(DEFAULT_SUMMARY) {
            let mut default = DocumentSummary::new(DEFAULT_SUMMARY);
            default.from_disk = true;
            working.add_summary(default);
        }

        for index in 0..working.fields.len() {
            self.collect_summaries(&mut working, index, validate)?;
        }

        for summary in working.summaries.values_mut() {
            let purged = summary.purge_implicits();
            if !purged.is_empty() {
                debug!(summary = %summary.name, ?purged, "purged superseded implicit fields");
            }
        }

        *schema = working;
        info!(summaries = schema.summaries.len(), "derived document summaries");
        Ok(())
    }

    fn collect_summaries(&mut self, schema: &mut Schema, index: usize, validate: bool) -> Result<()> {
        let Some(field) = schema.fields.get_index(index).cloned() else {
            return Ok(());
        };
        let field_name = field.name.as_str();
        let own_attribute = field.attribute(field_name);

        // Implicit
        let mut field_summary_field = field.summary_field(field_name).cloned();
        if field_summary_field.is_none() && field.does_summarying() {
            let implicit = implicit_summary_field(&field);
            if let Some(stored) = schema.fields.get_index_mut(index) {
                stored.add_summary_field(implicit.clone());
            }
            field_summary_field = Some(implicit);
        }
        if let Some(summary_field) = &field_summary_field {
            for destination in &summary_field.destinations {
                self.add_to_destination(schema, destination, summary_field, false);
            }
        }

        // Attribute prefetch
        if let Some(attribute) = own_attribute {
            if attribute.is_prefetch() {
                self.add_prefetch_attribute(schema, attribute, index);
            }
        }

        // Position attributes
        if field.does_summarying() {
            for attribute in field.attributes.iter().filter(|a| a.is_position()) {
                let distance = position_summary_field(
                    &field,
                    distance_summary_field_name(field_name),
                    DataType::Int,
                    SummaryTransform::Distance,
                    attribute,
                );
                let position = position_summary_field(
                    &field,
                    position_summary_field_name(field_name),
                    DataType::String,
                    SummaryTransform::Positions,
                    attribute,
                );
                let prefetch = schema.summary_or_create(ATTRIBUTE_PREFETCH_SUMMARY);
                prefetch.add(distance);
                prefetch.add(position);
            }
        }

        // Explicit
        let declared = schema
            .fields
            .get_index(index)
            .map(|f| f.summary_fields.clone())
            .unwrap_or_default();
        for mut summary_field in declared {
            if summary_field.transform == SummaryTransform::None && field.attribute(&summary_field.name).is_some() {
                summary_field.transform = SummaryTransform::Attribute;
                if let Some(stored) = schema.fields.get_index_mut(index) {
                    stored.add_summary_field(summary_field.clone());
                }
            }

            let verdict = match validate_summary_field(schema, &summary_field, validate) {
                Ok(verdict) => verdict,
                Err(err) => {
                    if let Some(diagnostic) = fatal_diagnostic(&err) {
                        self.reporter.report(&diagnostic);
                    }
                    return Err(err);
                }
            };
            for diagnostic in &verdict.diagnostics {
                self.reporter.report(diagnostic);
            }
            if verdict.keep {
                self.add_to_destinations(schema, &summary_field);
            }
        }

        Ok(())
    }

    fn add_prefetch_attribute(&mut self, schema: &mut Schema, attribute: &Attribute, index: usize) {
        // Prefetched by default, unless some summary makes this dynamic
        if attribute.prefetch != PrefetchOverride::On {
            let own_dynamic = schema
                .fields
                .get_index(index)
                .and_then(|f| f.summary_field(&attribute.name))
                .is_some_and(|sf| sf.transform.is_dynamic());
            if own_dynamic
                || schema
                    .explicit_summary_fields(&attribute.name)
                    .any(|sf| sf.transform.is_dynamic())
            {
                debug!(attribute = %attribute.name, "not prefetching attribute with dynamic summary");
                return;
            }
        }

        let summary_field = SummaryField::new(attribute.name.clone(), attribute.data_type.clone())
            .with_source(attribute.name.clone())
            .with_transform(SummaryTransform::Attribute);
        schema
            .summary_or_create(ATTRIBUTE_PREFETCH_SUMMARY)
            .add(summary_field);
    }

    fn add_to_destinations(&mut self, schema: &mut Schema, summary_field: &SummaryField) {
        if summary_field.destinations.is_empty() {
            self.add_to_destination(schema, DEFAULT_SUMMARY, summary_field, true);
        } else {
            for destination in &summary_field.destinations {
                self.add_to_destination(schema, destination, summary_field, true);
            }
        }
    }

    /// Routes a summary field into one summary, merging with a same-named
    /// field already there. On conflict the existing declaration stays.
    fn add_to_destination(&mut self, schema: &mut Schema, destination: &str, incoming: &SummaryField, create: bool) {
        let schema_name = schema.name.clone();
        let summary = if create {
            schema.summary_or_create(destination)
        } else {
            match schema.summary_mut(destination) {
                Some(summary) => summary,
                None => return,
            }
        };

        let merged = match summary.get(&incoming.name) {
            None => incoming.clone(),
            Some(existing) => match incoming.merge_with(existing) {
                Ok(merged) => merged,
                Err(conflict) => {
                    let key = (
                        destination.to_string(),
                        incoming.name.clone(),
                        incoming.transform,
                        incoming.data_type.to_string(),
                    );
                    if !self.conflicts.insert(key) {
                        return;
                    }
                    let diagnostic = Diagnostic::new(
                        schema_name,
                        &incoming.name,
                        DiagnosticCode::MergeConflict,
                        conflict.to_string(),
                    )
                    .with_context(format!("keeping the first declaration in document summary '{}'", destination));
                    self.reporter.report(&diagnostic);
                    return;
                }
            },
        };

        debug!(summary = destination, field = %merged.name, transform = %merged.transform, "routed summary field");
        summary.add(merged);
    }
}

/// Implicit summary field for a field producing a summary value
fn implicit_summary_field(field: &Field) -> SummaryField {
    let mut summary_field = SummaryField::new(field.name.clone(), field.data_type.clone())
        .with_source(field.name.clone())
        .with_destination(DEFAULT_SUMMARY);
    summary_field.implicit = true;

    if field.attribute(&field.name).is_some() {
        summary_field.transform = SummaryTransform::Attribute;
    }
    if field.is_complex_with_only_struct_field_attributes() {
        summary_field.transform = SummaryTransform::AttributeCombiner;
    }
    summary_field
}

/// The field's own declaration of a position summary field, or a synthesized one
fn position_summary_field(
    field: &Field,
    name: String,
    data_type: DataType,
    transform: SummaryTransform,
    attribute: &Attribute,
) -> SummaryField {
    match field.summary_field(&name) {
        Some(declared) => declared.clone(),
        None => SummaryField::new(name, data_type)
            .with_source(attribute.name.clone())
            .with_transform(transform),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingReporter;

    fn derive(schema: &mut Schema) -> CollectingReporter {
        let mut reporter = CollectingReporter::new();
        ImplicitSummaries::new(&mut reporter).process(schema, true, false).unwrap();
        reporter
    }

    #[test]
    fn test_default_summary_created_from_disk() {
        let mut schema = Schema::new("empty", Vec::new());
        derive(&mut schema);
        let default = schema.summary(DEFAULT_SUMMARY).unwrap();
        assert!(default.from_disk);
        assert!(default.is_empty());
    }

    #[test]
    fn test_plain_summary_field() {
        let mut schema = Schema::new("music", vec![Field::new("body", DataType::String).summarying()]);
        derive(&mut schema);

        let body = schema.summary(DEFAULT_SUMMARY).unwrap().get("body").unwrap();
        assert_eq!(body.transform, SummaryTransform::None);
        assert!(body.implicit);
        assert!(schema.summary(ATTRIBUTE_PREFETCH_SUMMARY).is_none());
    }

    #[test]
    fn test_implicit_routing_does_not_create_summaries() {
        let declared = SummaryField::new("title", DataType::String).with_destination("missing");
        let mut schema = Schema::new(
            "music",
            vec![Field::new("title", DataType::String).summarying().with_summary_field(declared)],
        );
        derive(&mut schema);

        // the explicit pass creates it; the implicit pass alone would not
        assert!(schema.summary("missing").unwrap().contains("title"));
        assert!(!schema.summary(DEFAULT_SUMMARY).unwrap().contains("title"));
    }

    #[test]
    fn test_struct_collapsing() {
        let field = Field::new("persons", DataType::array(DataType::Struct("person".into())))
            .summarying()
            .with_struct_field(Field::new("persons.name", DataType::String).attribute_backed())
            .with_struct_field(Field::new("persons.age", DataType::Int).attribute_backed());
        let mut schema = Schema::new("people", vec![field]);
        derive(&mut schema);

        let persons = schema.summary(DEFAULT_SUMMARY).unwrap().get("persons").unwrap();
        assert_eq!(persons.transform, SummaryTransform::AttributeCombiner);
    }

    #[test]
    fn test_dynamic_summary_suppresses_prefetch() {
        let declared = SummaryField::new("title", DataType::String).with_transform(SummaryTransform::DynamicBolded);
        let mut schema = Schema::new(
            "music",
            vec![Field::new("title", DataType::String)
                .summarying()
                .attribute_backed()
                .with_summary_field(declared)],
        );
        let reporter = derive(&mut schema);

        assert!(schema.summary(ATTRIBUTE_PREFETCH_SUMMARY).is_none());
        let title = schema.summary(DEFAULT_SUMMARY).unwrap().get("title").unwrap();
        assert_eq!(title.transform, SummaryTransform::DynamicBolded);
        assert_eq!(
            reporter.diagnostics.with_code(DiagnosticCode::DynamicOverAttribute).count(),
            1
        );
    }

    #[test]
    fn test_dynamic_in_other_summary_suppresses_prefetch() {
        let mut short = DocumentSummary::new("short");
        short.add(
            SummaryField::new("title", DataType::String)
                .with_source("title")
                .with_transform(SummaryTransform::DynamicTeaser),
        );
        let mut schema = Schema::new(
            "music",
            vec![Field::new("title", DataType::String).summarying().attribute_backed()],
        )
        .with_summary(short);
        derive(&mut schema);

        assert!(schema.summary(ATTRIBUTE_PREFETCH_SUMMARY).is_none());
    }

    #[test]
    fn test_forced_prefetch_ignores_dynamic() {
        let attribute = Attribute::new("title", DataType::String).with_prefetch(PrefetchOverride::On);
        let declared = SummaryField::new("title", DataType::String).with_transform(SummaryTransform::DynamicTeaser);
        let mut schema = Schema::new(
            "music",
            vec![Field::new("title", DataType::String)
                .summarying()
                .with_attribute(attribute)
                .with_summary_field(declared)],
        );
        derive(&mut schema);

        let prefetched = schema.summary(ATTRIBUTE_PREFETCH_SUMMARY).unwrap().get("title").unwrap();
        assert_eq!(prefetched.transform, SummaryTransform::Attribute);
    }

    #[test]
    fn test_merge_conflict_keeps_first() {
        let mut short = DocumentSummary::new("short");
        short.add(SummaryField::new("year", DataType::Int).with_transform(SummaryTransform::Copy));
        let declared = SummaryField::new("year", DataType::Int)
            .with_transform(SummaryTransform::Tokens)
            .with_destination("short");
        let mut schema = Schema::new(
            "music",
            vec![Field::new("year", DataType::Int).summarying().with_summary_field(declared)],
        )
        .with_summary(short);
        let reporter = derive(&mut schema);

        let year = schema.summary("short").unwrap().get("year").unwrap();
        assert_eq!(year.transform, SummaryTransform::Copy);
        assert_eq!(reporter.diagnostics.with_code(DiagnosticCode::MergeConflict).count(), 1);
    }

    #[test]
    fn test_each_conflicting_declaration_reported() {
        let mut short = DocumentSummary::new("short");
        short.add(SummaryField::new("year", DataType::Int).with_transform(SummaryTransform::Copy));
        let tokens = SummaryField::new("year", DataType::Int)
            .with_transform(SummaryTransform::Tokens)
            .with_destination("short");
        let document_id = SummaryField::new("year", DataType::Int)
            .with_source("year")
            .with_transform(SummaryTransform::DocumentId)
            .with_destination("short");
        let mut schema = Schema::new(
            "music",
            vec![
                Field::new("year", DataType::Int).summarying().with_summary_field(tokens),
                Field::new("rel", DataType::Int).summarying().with_summary_field(document_id),
            ],
        )
        .with_summary(short);
        let reporter = derive(&mut schema);

        let year = schema.summary("short").unwrap().get("year").unwrap();
        assert_eq!(year.transform, SummaryTransform::Copy);
        let conflicts: Vec<_> = reporter.diagnostics.with_code(DiagnosticCode::MergeConflict).collect();
        assert_eq!(conflicts.len(), 2);
        assert!(conflicts[0].message.contains("tokens"));
        assert!(conflicts[1].message.contains("documentid"));
    }

    #[test]
    fn test_failed_derivation_leaves_schema_untouched() {
        let declared = SummaryField::new("ghost", DataType::String).with_source("nowhere");
        let mut schema = Schema::new(
            "music",
            vec![Field::new("title", DataType::String).summarying().with_summary_field(declared)],
        );
        let before = schema.clone();

        let mut reporter = CollectingReporter::new();
        let result = ImplicitSummaries::new(&mut reporter).process(&mut schema, true, false);

        assert!(result.unwrap_err().is_validation());
        assert_eq!(schema, before);
        assert_eq!(reporter.diagnostics.error_count(), 1);
    }
}

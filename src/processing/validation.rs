//! Summary field validation
//!
//! Pure checks run on every declared summary field before it is routed. Fatal
//! problems come back as errors, everything else as diagnostics in the
//! [`Verdict`].

use crate::diagnostics::{Diagnostic, DiagnosticCode, Diagnostics};
use crate::error::{CompileError, Result};
use crate::schema::Schema;
use crate::summary::{SummaryField, SummaryTransform, DEFAULT_SUMMARY};

/// Outcome of validating one summary field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    /// Route the field into its destinations
    pub keep: bool,
    pub diagnostics: Diagnostics,
}

impl Verdict {
    fn keep() -> Self {
        Self {
            keep: true,
            diagnostics: Diagnostics::new(),
        }
    }
}

/// Validates a summary field against the schema.
///
/// With `validate` off the fatal checks are skipped and the field is accepted
/// as-is; warnings are produced either way.
pub fn validate_summary_field(schema: &Schema, summary_field: &SummaryField, validate: bool) -> Result<Verdict> {
    if summary_field.transform.is_position_derived() {
        if validate {
            let source = match summary_field.single_source() {
                Some(source) => source,
                None => {
                    return Err(CompileError::InvalidSourceCount {
                        schema: schema.name.clone(),
                        field: summary_field.name.clone(),
                        count: summary_field.source_count(),
                    })
                }
            };
            if schema.attribute(source).is_none() {
                return Err(CompileError::MissingSourceAttribute {
                    schema: schema.name.clone(),
                    field: summary_field.name.clone(),
                    attribute: source.to_string(),
                });
            }
        }
        return Ok(Verdict::keep());
    }

    let source_name = summary_field.source_field();
    let source = match schema.concrete_field(source_name) {
        Some(source) => source,
        None if validate => {
            return Err(CompileError::MissingSourceField {
                schema: schema.name.clone(),
                field: summary_field.name.clone(),
                source_field: source_name.to_string(),
            })
        }
        None => return Ok(Verdict::keep()),
    };

    let mut verdict = Verdict::keep();

    // The field may have lost its summary through an inheriting schema while
    // the declaration stayed behind.
    if !source.does_summarying()
        && !matches!(summary_field.transform, SummaryTransform::Attribute | SummaryTransform::GeoPos)
    {
        verdict.keep = false;
        verdict.diagnostics.push(Diagnostic::new(
            &schema.name,
            &summary_field.name,
            DiagnosticCode::DroppedField,
            format!(
                "Ignoring {}: field '{}' is not creating a summary value in its indexing statement",
                summary_field, source.name
            ),
        ));
        return Ok(verdict);
    }

    if summary_field.transform.is_dynamic()
        && summary_field.name == source.name
        && source.does_attributing()
        && source.attribute(&source.name).is_some()
    {
        let destinations = if summary_field.destinations.is_empty() {
            format!("document summary '{}'", DEFAULT_SUMMARY)
        } else {
            let names: Vec<_> = summary_field.destinations.iter().map(String::as_str).collect();
            format!("document summaries [{}]", names.join(", "))
        };
        verdict.diagnostics.push(
            Diagnostic::new(
                &schema.name,
                &summary_field.name,
                DiagnosticCode::DynamicOverAttribute,
                format!(
                    "Will fetch the disk summary value of field '{}' in {} since this summary field uses a dynamic summary value (snippet/bolding)",
                    source.name, destinations
                ),
            )
            .with_context("dynamic summaries and bolding are not supported with values fetched from in-memory attributes")
            .with_context("remove bolding and dynamic snippeting from this field to see partial updates to the attribute"),
        );
    }

    Ok(verdict)
}

/// Diagnostic mirroring a fatal validation error, for the reporter
pub fn fatal_diagnostic(err: &CompileError) -> Option<Diagnostic> {
    let (schema, field, code) = match err {
        CompileError::MissingSourceField { schema, field, .. } => (schema, field, DiagnosticCode::MissingSourceField),
        CompileError::MissingSourceAttribute { schema, field, .. } => (schema, field, DiagnosticCode::MissingSourceAttribute),
        CompileError::InvalidSourceCount { schema, field, .. } => (schema, field, DiagnosticCode::InvalidSourceCount),
        _ => return None,
    };
    Some(Diagnostic::new(schema, field, code, err.to_string()))
}

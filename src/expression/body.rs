//! Large rank expression bodies

use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

use super::FileReference;
use crate::checksum::Checksum;
use crate::error::{CompileError, Result};

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.\-]*$").expect("valid expression name pattern"))
}

/// A named rank expression too large to inline into the configuration
#[derive(Debug)]
pub struct ExpressionBody {
    name: String,
    content: Vec<u8>,
    reference: OnceLock<FileReference>,
}

impl ExpressionBody {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            reference: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn checksum(&self) -> Checksum {
        Checksum::from_bytes(&self.content)
    }

    /// Deployable reference, once registered
    pub fn reference(&self) -> Option<&FileReference> {
        self.reference.get()
    }

    pub(crate) fn set_reference(&self, reference: FileReference) {
        let stored = self.reference.set(reference).is_ok();
        debug_assert!(stored, "reference for '{}' set twice", self.name);
    }

    /// Structural check before registration
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| CompileError::InvalidExpression {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if !name_pattern().is_match(&self.name) {
            return Err(invalid("name must be non-empty and use only letters, digits, '_', '.' and '-'"));
        }
        if self.content.is_empty() {
            return Err(invalid("empty expression"));
        }
        if std::str::from_utf8(&self.content).is_err() {
            return Err(invalid("expression is not valid UTF-8"));
        }
        Ok(())
    }
}

impl PartialEq for ExpressionBody {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.content == other.content
    }
}

impl Eq for ExpressionBody {}

impl PartialOrd for ExpressionBody {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExpressionBody {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.content.cmp(&other.content))
    }
}

impl fmt::Display for ExpressionBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rank expression '{}' ({} bytes)", self.name, self.content.len())
    }
}

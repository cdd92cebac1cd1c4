//! Registry of large rank expressions
//!
//! Producers add bodies concurrently while rank profiles are parsed; once
//! they are all done, [`ExpressionRegistry::all`] gives the bodies in name
//! order for the configuration.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::{ExpressionBody, FileRegistry};
use crate::config::DEFAULT_EXPRESSION_THRESHOLD;
use crate::error::{CompileError, Result};

/// Name-keyed, content-checked store of large expression bodies
pub struct ExpressionRegistry {
    expressions: Mutex<HashMap<String, Arc<ExpressionBody>>>,
    file_registry: Arc<dyn FileRegistry>,
    threshold: usize,
}

impl ExpressionRegistry {
    pub fn new(file_registry: Arc<dyn FileRegistry>) -> Self {
        Self::with_threshold(file_registry, DEFAULT_EXPRESSION_THRESHOLD)
    }

    pub fn with_threshold(file_registry: Arc<dyn FileRegistry>, threshold: usize) -> Self {
        Self {
            expressions: Mutex::new(HashMap::new()),
            file_registry,
            threshold,
        }
    }

    /// Size in bytes above which a body is registered here instead of inlined
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn should_register(&self, len: usize) -> bool {
        len > self.threshold
    }

    /// Adds a body.
    ///
    /// The first body under a name is validated, stored and registered with
    /// the file registry. Later bodies under that name must have identical
    /// content and are then ignored.
    pub fn add(&self, body: ExpressionBody) -> Result<()> {
        let claimed = {
            let mut expressions = self.expressions.lock();
            if let Some(previous) = expressions.get(body.name()) {
                if previous.content() != body.content() {
                    return Err(CompileError::ContentConflict {
                        name: body.name().to_string(),
                        previous: previous.len(),
                        current: body.len(),
                    });
                }
                debug!(name = body.name(), "rank expression already registered");
                return Ok(());
            }
            body.validate()?;
            let body = Arc::new(body);
            expressions.insert(body.name().to_string(), Arc::clone(&body));
            body
        };

        let reference = self.file_registry.add_blob(claimed.name(), claimed.content());
        debug!(name = claimed.name(), bytes = claimed.len(), %reference, "registered rank expression");
        claimed.set_reference(reference);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<ExpressionBody>> {
        self.expressions.lock().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.expressions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.lock().is_empty()
    }

    /// All bodies ordered by name. Call after every producer has finished.
    pub fn all(&self) -> Vec<Arc<ExpressionBody>> {
        let mut bodies: Vec<_> = self.expressions.lock().values().cloned().collect();
        bodies.sort_by(|a, b| a.name().cmp(b.name()));
        bodies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::InMemoryFileRegistry;

    fn registry() -> (Arc<InMemoryFileRegistry>, ExpressionRegistry) {
        let files = Arc::new(InMemoryFileRegistry::new());
        let registry = ExpressionRegistry::new(files.clone());
        (files, registry)
    }

    #[test]
    fn test_default_threshold() {
        let (_, registry) = registry();
        assert_eq!(registry.threshold(), 8192);
        assert!(!registry.should_register(8192));
        assert!(registry.should_register(8193));
    }

    #[test]
    fn test_identical_duplicate_registers_once() {
        let (files, registry) = registry();
        registry.add(ExpressionBody::new("x", "a * b")).unwrap();
        registry.add(ExpressionBody::new("x", "a * b")).unwrap();

        assert_eq!(files.registration_count(), 1);
        assert_eq!(registry.len(), 1);
        assert!(registry.get("x").unwrap().reference().is_some());
    }

    #[test]
    fn test_conflicting_content() {
        let (_, registry) = registry();
        registry.add(ExpressionBody::new("x", "AAA")).unwrap();
        let err = registry.add(ExpressionBody::new("x", "BB")).unwrap_err();

        match err {
            CompileError::ContentConflict { name, previous, current } => {
                assert_eq!(name, "x");
                assert_eq!(previous, 3);
                assert_eq!(current, 2);
            }
            other => panic!("Expected ContentConflict, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_body_is_not_claimed() {
        let (files, registry) = registry();
        assert!(registry.add(ExpressionBody::new("x", "")).is_err());
        assert!(registry.is_empty());

        registry.add(ExpressionBody::new("x", "valid")).unwrap();
        assert_eq!(files.registration_count(), 1);
    }

    #[test]
    fn test_all_sorted_by_name() {
        let (_, registry) = registry();
        for name in ["b", "a", "c"] {
            registry.add(ExpressionBody::new(name, "1 + 1")).unwrap();
        }
        let names: Vec<_> = registry.all().iter().map(|b| b.name().to_string()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}

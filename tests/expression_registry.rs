//! Concurrent registration of large rank expressions

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use schema_summaries::{CompileError, ExpressionBody, ExpressionRegistry, FileReference, FileRegistry};

/// Counts registrations per call
#[derive(Default)]
struct CountingFileRegistry {
    calls: AtomicUsize,
}

impl FileRegistry for CountingFileRegistry {
    fn add_blob(&self, name: &str, _blob: &[u8]) -> FileReference {
        self.calls.fetch_add(1, Ordering::SeqCst);
        FileReference::new(format!("ref/{}", name))
    }
}

fn body_text(i: usize) -> String {
    format!("sum(query(q) * attribute(v{}))", i)
}

#[test]
fn test_concurrent_identical_adds_register_once() {
    let files = Arc::new(CountingFileRegistry::default());
    let registry = Arc::new(ExpressionRegistry::new(files.clone()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for i in 0..20 {
                    registry
                        .add(ExpressionBody::new(format!("expr_{}", i), body_text(i)))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(files.calls.load(Ordering::SeqCst), 20);
    assert_eq!(registry.len(), 20);
    for body in registry.all() {
        assert_eq!(body.reference().unwrap().as_str(), format!("ref/{}", body.name()));
    }
}

#[test]
fn test_concurrent_conflict_detected() {
    let files = Arc::new(CountingFileRegistry::default());
    let registry = Arc::new(ExpressionRegistry::new(files.clone()));

    let results: Vec<_> = ["AAA", "BB"]
        .into_iter()
        .map(|content| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.add(ExpressionBody::new("x", content)))
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(CompileError::ContentConflict { .. })))
        .count();
    assert_eq!(conflicts, 1);
    assert_eq!(files.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_all_is_independent_of_insertion_order() {
    let names = ["delta", "alpha", "charlie", "bravo"];

    let forward = ExpressionRegistry::new(Arc::new(CountingFileRegistry::default()));
    for name in names {
        forward.add(ExpressionBody::new(name, "1")).unwrap();
    }
    let backward = ExpressionRegistry::new(Arc::new(CountingFileRegistry::default()));
    for name in names.iter().rev() {
        backward.add(ExpressionBody::new(*name, "1")).unwrap();
    }

    let listed = |r: &ExpressionRegistry| r.all().iter().map(|b| b.name().to_string()).collect::<Vec<_>>();
    assert_eq!(listed(&forward), vec!["alpha", "bravo", "charlie", "delta"]);
    assert_eq!(listed(&forward), listed(&backward));
}

//! Large rank expressions
//!
//! Expression bodies above the size threshold are not inlined into the
//! configuration. They are registered once per name with a [`FileRegistry`],
//! which hands back a reference the configuration embeds instead.

pub mod body;
pub mod registry;

pub use body::ExpressionBody;
pub use registry::ExpressionRegistry;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::checksum::Checksum;

/// Deployable reference to a registered blob
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileReference(String);

impl FileReference {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Distributes blobs to the deployment and names them
pub trait FileRegistry: Send + Sync {
    fn add_blob(&self, name: &str, blob: &[u8]) -> FileReference;
}

/// Keeps registered blobs in memory, referenced by content checksum
#[derive(Debug, Default)]
pub struct InMemoryFileRegistry {
    blobs: Mutex<BTreeMap<FileReference, Vec<u8>>>,
    registrations: Mutex<Vec<(String, FileReference)>>,
}

impl InMemoryFileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of add_blob calls so far
    pub fn registration_count(&self) -> usize {
        self.registrations.lock().len()
    }

    pub fn blob(&self, reference: &FileReference) -> Option<Vec<u8>> {
        self.blobs.lock().get(reference).cloned()
    }
}

impl FileRegistry for InMemoryFileRegistry {
    fn add_blob(&self, name: &str, blob: &[u8]) -> FileReference {
        let checksum = Checksum::from_bytes(blob);
        let reference = FileReference::new(format!("{}/{}.expr", checksum.short(), name));
        self.blobs.lock().insert(reference.clone(), blob.to_vec());
        self.registrations.lock().push((name.to_string(), reference.clone()));
        reference
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_is_content_addressed() {
        let files = InMemoryFileRegistry::new();
        let a = files.add_blob("first", b"x * y");
        let b = files.add_blob("first", b"x * y");
        let c = files.add_blob("first", b"x / y");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.as_str().ends_with("/first.expr"));
        assert_eq!(files.blob(&a).unwrap(), b"x * y".to_vec());
        assert_eq!(files.registration_count(), 3);
    }
}

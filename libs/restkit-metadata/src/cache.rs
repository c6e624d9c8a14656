//! Metadata cache
//!
//! The cache stores descriptors in their serialized form, keyed by class name.
//! Anything read back goes through [`ResourceMetadata::from_json`], so cached
//! entries never carry live reflection handles.
//!
//! [`ResourceMetadata::from_json`]: crate::ResourceMetadata::from_json

use std::collections::HashMap;

use parking_lot::RwLock;

pub trait MetadataCache: Send + Sync {
    fn fetch(&self, class_name: &str) -> Option<String>;

    fn put(&self, class_name: &str, payload: String);

    fn evict(&self, class_name: &str);
}

/// Process-local cache, mainly for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct InMemoryMetadataCache {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryMetadataCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl MetadataCache for InMemoryMetadataCache {
    fn fetch(&self, class_name: &str) -> Option<String> {
        self.entries.read().get(class_name).cloned()
    }

    fn put(&self, class_name: &str, payload: String) {
        self.entries.write().insert(class_name.to_owned(), payload);
    }

    fn evict(&self, class_name: &str) {
        self.entries.write().remove(class_name);
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn put_fetch_evict() {
        let cache = InMemoryMetadataCache::new();
        assert!(cache.fetch("Widget").is_none());

        cache.put("Widget", "{}".to_owned());
        assert_eq!(cache.fetch("Widget").as_deref(), Some("{}"));
        assert_eq!(cache.len(), 1);

        cache.evict("Widget");
        assert!(cache.is_empty());
    }
}

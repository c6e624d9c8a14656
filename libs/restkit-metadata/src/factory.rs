//! Metadata factory
//!
//! Resolves the descriptor of a class, trying in order:
//! 1. descriptors already loaded by this factory,
//! 2. the metadata cache (restored through the reflection service),
//! 3. the metadata driver, whose result is then written to the cache.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::cache::MetadataCache;
use crate::error::MetadataError;
use crate::metadata::{ResourceMetadata, ResourceMetadataState};
use crate::reflection::ReflectionService;

/// Source of descriptor definitions (mapping files, attributes, config...).
pub trait MetadataDriver: Send + Sync {
    /// Loads the definition of `class_name`, `None` if the class is not a resource.
    ///
    /// # Errors
    /// Returns [`MetadataError`] if the definition exists but cannot be loaded.
    fn load_metadata_for_class(
        &self,
        class_name: &str,
    ) -> Result<Option<ResourceMetadataState>, MetadataError>;
}

/// Driver serving definitions registered up front.
#[derive(Debug, Default)]
pub struct InMemoryDriver {
    states: HashMap<String, ResourceMetadataState>,
}

impl InMemoryDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_state(mut self, state: ResourceMetadataState) -> Self {
        self.states.insert(state.name.clone(), state);
        self
    }

    /// Reads definitions from a JSON array of serialized states.
    ///
    /// # Errors
    /// Returns `serde_json::Error` if `value` is not an array of states.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let states: Vec<ResourceMetadataState> = serde_json::from_value(value)?;
        Ok(states.into_iter().fold(Self::new(), Self::with_state))
    }
}

impl MetadataDriver for InMemoryDriver {
    fn load_metadata_for_class(
        &self,
        class_name: &str,
    ) -> Result<Option<ResourceMetadataState>, MetadataError> {
        Ok(self.states.get(class_name).cloned())
    }
}

pub struct MetadataFactory {
    driver: Arc<dyn MetadataDriver>,
    reflection: Arc<dyn ReflectionService>,
    cache: Option<Arc<dyn MetadataCache>>,
    loaded: RwLock<HashMap<String, Arc<ResourceMetadata>>>,
}

impl MetadataFactory {
    #[must_use]
    pub fn new(driver: Arc<dyn MetadataDriver>, reflection: Arc<dyn ReflectionService>) -> Self {
        Self {
            driver,
            reflection,
            cache: None,
            loaded: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn MetadataCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Returns the descriptor of `class_name`, or `None` if the driver does not
    /// know the class.
    ///
    /// # Errors
    /// Returns [`MetadataError`] if the driver fails or the definition cannot
    /// be restored against the reflection service.
    pub fn get_metadata_for_class(
        &self,
        class_name: &str,
    ) -> Result<Option<Arc<ResourceMetadata>>, MetadataError> {
        if let Some(meta) = self.loaded.read().get(class_name) {
            return Ok(Some(Arc::clone(meta)));
        }

        if let Some(meta) = self.fetch_cached(class_name) {
            return Ok(Some(self.remember(class_name, meta)));
        }

        tracing::debug!(class = class_name, "loading resource metadata from driver");
        let Some(state) = self.driver.load_metadata_for_class(class_name)? else {
            return Ok(None);
        };

        let meta = ResourceMetadata::restore(state, self.reflection.as_ref())?;
        if let Some(cache) = &self.cache {
            match meta.to_json() {
                Ok(payload) => cache.put(class_name, payload),
                Err(e) => {
                    tracing::warn!(class = class_name, error = %e, "failed to serialize metadata for cache");
                }
            }
        }

        Ok(Some(self.remember(class_name, meta)))
    }

    /// Restores a cached descriptor; corrupt entries are evicted so the next
    /// lookup falls through to the driver.
    fn fetch_cached(&self, class_name: &str) -> Option<Arc<ResourceMetadata>> {
        let cache = self.cache.as_ref()?;
        let payload = cache.fetch(class_name)?;

        match ResourceMetadata::from_json(&payload, self.reflection.as_ref()) {
            Ok(meta) => {
                tracing::debug!(class = class_name, "resource metadata cache hit");
                Some(meta)
            }
            Err(e) => {
                tracing::warn!(class = class_name, error = %e, "evicting unusable cached metadata");
                cache.evict(class_name);
                None
            }
        }
    }

    fn remember(&self, class_name: &str, meta: Arc<ResourceMetadata>) -> Arc<ResourceMetadata> {
        let mut loaded = self.loaded.write();
        Arc::clone(loaded.entry(class_name.to_owned()).or_insert(meta))
    }
}

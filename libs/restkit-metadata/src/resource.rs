//! A domain object paired with the descriptor that built it.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::metadata::ResourceMetadata;
use crate::reflection::ResourceObject;

pub struct Resource {
    data: ResourceObject,
    metadata: Arc<ResourceMetadata>,
}

impl Resource {
    #[must_use]
    pub fn new(data: ResourceObject, metadata: Arc<ResourceMetadata>) -> Self {
        Self { data, metadata }
    }

    #[must_use]
    pub fn data(&self) -> &(dyn Any + Send + Sync) {
        self.data.as_ref()
    }

    /// Typed access to the wrapped object.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }

    #[must_use]
    pub fn metadata(&self) -> &Arc<ResourceMetadata> {
        &self.metadata
    }

    #[must_use]
    pub fn into_parts(self) -> (ResourceObject, Arc<ResourceMetadata>) {
        (self.data, self.metadata)
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("metadata", &self.metadata.name())
            .finish_non_exhaustive()
    }
}

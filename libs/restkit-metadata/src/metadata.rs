//! Resource metadata descriptor
//!
//! A [`ResourceMetadata`] is a read-only view over the REST attributes of one
//! resource type: which controller handles it, which input filter validates
//! incoming data, which hydrator populates objects, how collections of it are
//! represented and which nested descriptors its associations use. It also owns
//! the reflection handle used to construct instances of the type.
//!
//! Descriptors are built once through [`ResourceMetadataBuilder`] and shared as
//! `Arc<ResourceMetadata>`. They can be written to a cache as a
//! [`ResourceMetadataState`] and brought back with [`ResourceMetadata::restore`],
//! which re-binds every reflection handle the serialized form had to drop.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{InstantiationError, MetadataRestoreError};
use crate::persistence::{ClassMetadata, ReflectionWakeup};
use crate::reflection::{ReflectionClass, ReflectionService};
use crate::resource::Resource;

/// Read-only REST metadata of one resource type.
pub struct ResourceMetadata {
    reflection: Arc<ReflectionClass>,
    class_metadata: Option<Arc<ClassMetadata>>,
    controller: Option<String>,
    input_filter: Option<String>,
    hydrator: Option<String>,
    collection_metadata: Option<Arc<ResourceMetadata>>,
    associations: BTreeMap<String, Option<Arc<ResourceMetadata>>>,
}

impl ResourceMetadata {
    #[must_use]
    pub fn builder(reflection: Arc<ReflectionClass>) -> ResourceMetadataBuilder {
        ResourceMetadataBuilder {
            inner: Self {
                reflection,
                class_metadata: None,
                controller: None,
                input_filter: None,
                hydrator: None,
                collection_metadata: None,
                associations: BTreeMap::new(),
            },
        }
    }

    /// Class name of the described resource type.
    #[must_use]
    pub fn name(&self) -> &str {
        self.reflection.name()
    }

    /// Builds a new instance of the resource type and pairs it with this
    /// descriptor.
    ///
    /// With no `args` the type is default-constructed; otherwise `args` are
    /// forwarded positionally, in order, to its constructor.
    ///
    /// # Errors
    /// Returns [`InstantiationError`] if the type cannot be constructed with
    /// the given arguments.
    pub fn create_resource(self: &Arc<Self>, args: &[Value]) -> Result<Resource, InstantiationError> {
        let data = if args.is_empty() {
            self.reflection.new_instance()?
        } else {
            self.reflection.new_instance_args(args)?
        };
        Ok(Resource::new(data, Arc::clone(self)))
    }

    #[must_use]
    pub fn reflection_class(&self) -> &Arc<ReflectionClass> {
        &self.reflection
    }

    /// Persistence metadata of the underlying entity, shared with the ORM.
    #[must_use]
    pub fn class_metadata(&self) -> Option<&Arc<ClassMetadata>> {
        self.class_metadata.as_ref()
    }

    #[must_use]
    pub fn controller_name(&self) -> Option<&str> {
        self.controller.as_deref()
    }

    #[must_use]
    pub fn input_filter_name(&self) -> Option<&str> {
        self.input_filter.as_deref()
    }

    #[must_use]
    pub fn hydrator_name(&self) -> Option<&str> {
        self.hydrator.as_deref()
    }

    /// Metadata used when the resource is exposed as a collection.
    #[must_use]
    pub fn collection_metadata(&self) -> Option<&Arc<ResourceMetadata>> {
        self.collection_metadata.as_ref()
    }

    #[must_use]
    pub fn has_association_metadata(&self, association: &str) -> bool {
        self.association_metadata(association).is_some()
    }

    /// Descriptor of the given association, `None` when it has none.
    #[must_use]
    pub fn association_metadata(&self, association: &str) -> Option<&Arc<ResourceMetadata>> {
        self.associations.get(association).and_then(Option::as_ref)
    }

    /// Names of all associations with a registered descriptor.
    pub fn association_names(&self) -> impl Iterator<Item = &str> {
        self.associations
            .iter()
            .filter(|(_, meta)| meta.is_some())
            .map(|(name, _)| name.as_str())
    }

    /// Serializable form of this descriptor.
    #[must_use]
    pub fn to_state(&self) -> ResourceMetadataState {
        ResourceMetadataState {
            name: self.name().to_owned(),
            class_metadata: self.class_metadata.as_deref().map(ClassMetadata::unbound),
            controller: self.controller.clone(),
            input_filter: self.input_filter.clone(),
            hydrator: self.hydrator.clone(),
            collection_metadata: self
                .collection_metadata
                .as_ref()
                .map(|meta| Box::new(meta.to_state())),
            associations: self
                .associations
                .iter()
                .map(|(name, meta)| (name.clone(), meta.as_ref().map(|m| m.to_state())))
                .collect(),
        }
    }

    /// Serializes this descriptor for a metadata cache.
    ///
    /// # Errors
    /// Returns `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_state())
    }

    /// Rebuilds a descriptor from its serialized form.
    ///
    /// The descriptor's own reflection handle is resolved by class name, then
    /// the embedded persistence metadata gets its reflection binding back (see
    /// [`rebind_persistence_reflection`]). Nested collection and association
    /// descriptors are restored the same way.
    ///
    /// # Errors
    /// Returns [`MetadataRestoreError`] if any class is unknown to `service`
    /// or the persistence metadata cannot be re-bound.
    pub fn restore(
        state: ResourceMetadataState,
        service: &dyn ReflectionService,
    ) -> Result<Arc<Self>, MetadataRestoreError> {
        let ResourceMetadataState {
            name,
            class_metadata,
            controller,
            input_filter,
            hydrator,
            collection_metadata,
            associations,
        } = state;

        let reflection = service
            .get_class(&name)
            .ok_or_else(|| MetadataRestoreError::UnknownClass {
                class: name.clone(),
            })?;

        let class_metadata = match class_metadata {
            Some(mut meta) => {
                rebind_persistence_reflection(&mut meta, service).map_err(|source| {
                    MetadataRestoreError::PersistenceRebind {
                        resource: name.clone(),
                        source: Box::new(source),
                    }
                })?;
                Some(Arc::new(meta))
            }
            None => None,
        };

        let collection_metadata = collection_metadata
            .map(|state| Self::restore(*state, service))
            .transpose()?;

        let associations = associations
            .into_iter()
            .map(|(assoc, state)| -> Result<_, MetadataRestoreError> {
                let meta = state.map(|s| Self::restore(s, service)).transpose()?;
                Ok((assoc, meta))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(Arc::new(Self {
            reflection,
            class_metadata,
            controller,
            input_filter,
            hydrator,
            collection_metadata,
            associations,
        }))
    }

    /// Deserializes and restores a descriptor written by [`to_json`](Self::to_json).
    ///
    /// # Errors
    /// Returns [`MetadataRestoreError::Payload`] for malformed input, otherwise
    /// see [`restore`](Self::restore).
    pub fn from_json(
        payload: &str,
        service: &dyn ReflectionService,
    ) -> Result<Arc<Self>, MetadataRestoreError> {
        let state: ResourceMetadataState = serde_json::from_str(payload)?;
        Self::restore(state, service)
    }
}

/// Post-restore hook: re-binds the reflection state of persistence metadata
/// that lost it during serialization. Metadata that is already bound is left
/// untouched.
///
/// # Errors
/// Propagates the error of [`ReflectionWakeup::wakeup_reflection`].
pub fn rebind_persistence_reflection<M>(
    metadata: &mut M,
    service: &dyn ReflectionService,
) -> Result<(), MetadataRestoreError>
where
    M: ReflectionWakeup + ?Sized,
{
    if !metadata.needs_wakeup() {
        return Ok(());
    }
    metadata.wakeup_reflection(service)?;
    tracing::debug!("re-bound persistence reflection after restore");
    Ok(())
}

impl fmt::Debug for ResourceMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceMetadata")
            .field("name", &self.name())
            .field("class_metadata", &self.class_metadata)
            .field("controller", &self.controller)
            .field("input_filter", &self.input_filter)
            .field("hydrator", &self.hydrator)
            .field(
                "collection_metadata",
                &self.collection_metadata.as_ref().map(|m| m.name()),
            )
            .field(
                "associations",
                &self
                    .associations
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_ref().map(|m| m.name())))
                    .collect::<Vec<_>>(),
            )
            .field("reflection", &self.reflection)
            .finish()
    }
}

/// Builds a [`ResourceMetadata`]; the descriptor is immutable once built.
pub struct ResourceMetadataBuilder {
    inner: ResourceMetadata,
}

impl ResourceMetadataBuilder {
    #[must_use]
    pub fn class_metadata(mut self, class_metadata: Arc<ClassMetadata>) -> Self {
        self.inner.class_metadata = Some(class_metadata);
        self
    }

    #[must_use]
    pub fn controller(mut self, name: impl Into<String>) -> Self {
        self.inner.controller = Some(name.into());
        self
    }

    #[must_use]
    pub fn input_filter(mut self, name: impl Into<String>) -> Self {
        self.inner.input_filter = Some(name.into());
        self
    }

    #[must_use]
    pub fn hydrator(mut self, name: impl Into<String>) -> Self {
        self.inner.hydrator = Some(name.into());
        self
    }

    #[must_use]
    pub fn collection_metadata(mut self, metadata: Arc<ResourceMetadata>) -> Self {
        self.inner.collection_metadata = Some(metadata);
        self
    }

    #[must_use]
    pub fn association(mut self, name: impl Into<String>, metadata: Arc<ResourceMetadata>) -> Self {
        self.inner.associations.insert(name.into(), Some(metadata));
        self
    }

    /// Declares an association that has no descriptor of its own.
    #[must_use]
    pub fn absent_association(mut self, name: impl Into<String>) -> Self {
        self.inner.associations.insert(name.into(), None);
        self
    }

    #[must_use]
    pub fn build(self) -> Arc<ResourceMetadata> {
        Arc::new(self.inner)
    }
}

/// Serializable form of a [`ResourceMetadata`].
///
/// Reflection handles are replaced by the class name; the persistence metadata
/// is stored without its reflection binding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceMetadataState {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_metadata: Option<ClassMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hydrator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_metadata: Option<Box<ResourceMetadataState>>,
    #[serde(default)]
    pub associations: BTreeMap<String, Option<ResourceMetadataState>>,
}

impl ResourceMetadataState {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

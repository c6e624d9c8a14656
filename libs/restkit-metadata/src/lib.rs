//! Resource metadata for restkit
//!
//! - [`ResourceMetadata`]: read-only REST descriptor of a resource type
//! - [`ReflectionClass`] / [`ReflectionService`]: construction and introspection
//!   capability, resolvable by class name
//! - [`ClassMetadata`]: persistence metadata referenced by descriptors
//! - [`MetadataFactory`]: driver + cache backed descriptor lookup
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod cache;
pub mod error;
pub mod factory;
pub mod metadata;
pub mod persistence;
pub mod reflection;
pub mod resource;

pub use cache::{InMemoryMetadataCache, MetadataCache};
pub use error::{InstantiationError, MetadataError, MetadataRestoreError};
pub use factory::{InMemoryDriver, MetadataDriver, MetadataFactory};
pub use metadata::{
    ResourceMetadata, ResourceMetadataBuilder, ResourceMetadataState, rebind_persistence_reflection,
};
pub use persistence::{AssociationKind, AssociationMapping, ClassMetadata, ReflectionWakeup};
pub use reflection::{ReflectionClass, ReflectionService, ResourceObject, RuntimeReflectionService};
pub use resource::Resource;

//! Persistence (ORM-level) class metadata
//!
//! [`ClassMetadata`] describes how an entity is mapped to storage. It is owned
//! by the persistence layer and only referenced by resource descriptors. Its
//! reflection binding does not survive serialization and is restored through
//! the [`ReflectionWakeup`] capability.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::MetadataRestoreError;
use crate::reflection::{ReflectionClass, ReflectionService};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    OneToOne,
    ManyToOne,
    OneToMany,
    ManyToMany,
}

impl AssociationKind {
    /// Whether the association resolves to a collection of entities.
    #[must_use]
    pub fn is_to_many(self) -> bool {
        matches!(self, Self::OneToMany | Self::ManyToMany)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationMapping {
    pub field_name: String,
    pub target_entity: String,
    pub kind: AssociationKind,
}

/// Storage mapping of one entity class.
#[derive(Clone, Serialize, Deserialize)]
pub struct ClassMetadata {
    name: String,
    table_name: String,
    #[serde(default)]
    identifier: Vec<String>,
    #[serde(default)]
    field_names: Vec<String>,
    #[serde(default)]
    association_mappings: BTreeMap<String, AssociationMapping>,
    #[serde(skip)]
    reflection: Option<Arc<ReflectionClass>>,
}

impl ClassMetadata {
    #[must_use]
    pub fn new(name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table_name: table_name.into(),
            identifier: Vec::new(),
            field_names: Vec::new(),
            association_mappings: BTreeMap::new(),
            reflection: None,
        }
    }

    /// Adds an identifier field; identifier fields are also mapped fields.
    #[must_use]
    pub fn with_identifier(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        if !self.field_names.contains(&field) {
            self.field_names.push(field.clone());
        }
        self.identifier.push(field);
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field_names.push(field.into());
        self
    }

    #[must_use]
    pub fn with_association(
        mut self,
        field: impl Into<String>,
        target_entity: impl Into<String>,
        kind: AssociationKind,
    ) -> Self {
        let field_name = field.into();
        self.association_mappings.insert(
            field_name.clone(),
            AssociationMapping {
                field_name,
                target_entity: target_entity.into(),
                kind,
            },
        );
        self
    }

    /// Copy of this metadata without its reflection binding, as it is
    /// persisted.
    pub(crate) fn unbound(&self) -> Self {
        Self {
            reflection: None,
            ..self.clone()
        }
    }

    /// Binds a reflection handle at build time.
    #[must_use]
    pub fn with_reflection(mut self, reflection: Arc<ReflectionClass>) -> Self {
        self.reflection = Some(reflection);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    #[must_use]
    pub fn identifier(&self) -> &[String] {
        &self.identifier
    }

    #[must_use]
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.field_names.iter().any(|f| f == field)
    }

    #[must_use]
    pub fn has_association(&self, field: &str) -> bool {
        self.association_mappings.contains_key(field)
    }

    #[must_use]
    pub fn association_mapping(&self, field: &str) -> Option<&AssociationMapping> {
        self.association_mappings.get(field)
    }

    pub fn association_mappings(&self) -> impl Iterator<Item = &AssociationMapping> {
        self.association_mappings.values()
    }

    /// Reflection handle of the mapped entity; `None` until bound.
    #[must_use]
    pub fn reflection_class(&self) -> Option<&Arc<ReflectionClass>> {
        self.reflection.as_ref()
    }
}

impl PartialEq for ClassMetadata {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.table_name == other.table_name
            && self.identifier == other.identifier
            && self.field_names == other.field_names
            && self.association_mappings == other.association_mappings
    }
}

impl fmt::Debug for ClassMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassMetadata")
            .field("name", &self.name)
            .field("table_name", &self.table_name)
            .field("identifier", &self.identifier)
            .field("field_names", &self.field_names)
            .field("association_mappings", &self.association_mappings)
            .field("reflection_bound", &self.reflection.is_some())
            .finish()
    }
}

/// Capability of metadata whose reflection state is lost on serialization.
pub trait ReflectionWakeup {
    /// Whether the reflection binding is missing.
    fn needs_wakeup(&self) -> bool;

    /// Re-binds reflection state using `service`.
    ///
    /// # Errors
    /// Returns [`MetadataRestoreError`] if the reflection state cannot be
    /// rebuilt.
    fn wakeup_reflection(
        &mut self,
        service: &dyn ReflectionService,
    ) -> Result<(), MetadataRestoreError>;
}

impl ReflectionWakeup for ClassMetadata {
    fn needs_wakeup(&self) -> bool {
        self.reflection.is_none()
    }

    fn wakeup_reflection(
        &mut self,
        service: &dyn ReflectionService,
    ) -> Result<(), MetadataRestoreError> {
        let reflection =
            service
                .get_class(&self.name)
                .ok_or_else(|| MetadataRestoreError::UnknownClass {
                    class: self.name.clone(),
                })?;

        let mapped = self
            .field_names
            .iter()
            .chain(self.association_mappings.keys());
        for property in mapped {
            if !reflection.has_property(property) {
                return Err(MetadataRestoreError::MissingProperty {
                    class: self.name.clone(),
                    property: property.clone(),
                });
            }
        }

        self.reflection = Some(reflection);
        Ok(())
    }
}

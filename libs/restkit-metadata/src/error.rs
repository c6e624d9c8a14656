//! Errors raised while building resources and restoring metadata.

/// Construction of a domain object failed.
#[derive(Debug, thiserror::Error)]
pub enum InstantiationError {
    #[error("cannot instantiate abstract class '{class}'")]
    AbstractClass { class: String },

    #[error("class '{class}' has no constructor")]
    NoConstructor { class: String },

    #[error("constructor of class '{class}' is not public")]
    NonPublicConstructor { class: String },

    #[error(
        "class '{class}' expects between {min} and {max} constructor arguments, {given} given"
    )]
    ArityMismatch {
        class: String,
        min: usize,
        max: usize,
        given: usize,
    },

    #[error("constructor of class '{class}' failed: {source}")]
    Constructor {
        class: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Restoring a descriptor from its serialized form failed.
#[derive(Debug, thiserror::Error)]
pub enum MetadataRestoreError {
    #[error("class '{class}' is not known to the reflection service")]
    UnknownClass { class: String },

    #[error("class '{class}' does not declare property '{property}'")]
    MissingProperty { class: String, property: String },

    #[error("failed to re-bind persistence metadata of resource '{resource}': {source}")]
    PersistenceRebind {
        resource: String,
        #[source]
        source: Box<MetadataRestoreError>,
    },

    #[error("malformed metadata payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Errors surfaced by the metadata factory.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error(transparent)]
    Restore(#[from] MetadataRestoreError),

    #[error("metadata driver failed for class '{class}': {source}")]
    Driver {
        class: String,
        #[source]
        source: anyhow::Error,
    },
}

#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Metadata factory tests: driver loading, cache reuse across factories,
//! recovery from corrupt cache entries

mod common;

use std::sync::Arc;

use common::{reflection_service, widget_metadata};
use restkit_metadata::{
    InMemoryDriver, InMemoryMetadataCache, MetadataCache, MetadataDriver, MetadataError,
    MetadataFactory, ResourceMetadataState,
};
use tracing_test::traced_test;

fn driver() -> Arc<InMemoryDriver> {
    let service = reflection_service();
    Arc::new(InMemoryDriver::new().with_state(widget_metadata(&service).to_state()))
}

#[test]
fn second_factory_restores_from_shared_cache() {
    let cache = Arc::new(InMemoryMetadataCache::new());

    let warm = MetadataFactory::new(driver(), Arc::new(reflection_service()))
        .with_cache(cache.clone());
    warm.get_metadata_for_class("Widget").unwrap().unwrap();
    assert_eq!(cache.len(), 1);

    // cold factory without any driver definitions: only the cache can answer
    let cold = MetadataFactory::new(
        Arc::new(InMemoryDriver::new()),
        Arc::new(reflection_service()),
    )
    .with_cache(cache);
    let meta = cold.get_metadata_for_class("Widget").unwrap().unwrap();

    assert_eq!(meta.controller_name(), Some("WidgetController"));
    assert!(meta.has_association_metadata("owner"));
    assert!(
        meta.class_metadata()
            .and_then(|m| m.reflection_class())
            .is_some(),
        "cached persistence metadata must come back bound"
    );
}

#[test]
#[traced_test]
fn corrupt_cache_entry_is_evicted_and_reloaded() {
    let cache = Arc::new(InMemoryMetadataCache::new());
    cache.put("Widget", "{\"name\": 42}".to_owned());

    let factory = MetadataFactory::new(driver(), Arc::new(reflection_service()))
        .with_cache(cache.clone());
    let meta = factory.get_metadata_for_class("Widget").unwrap().unwrap();

    assert_eq!(meta.hydrator_name(), Some("WidgetHydrator"));
    assert!(logs_contain("evicting unusable cached metadata"));

    // the reloaded definition replaced the corrupt payload
    let payload = cache.fetch("Widget").unwrap();
    let state: ResourceMetadataState = serde_json::from_str(&payload).unwrap();
    assert_eq!(state.name, "Widget");
}

struct FailingDriver;

impl MetadataDriver for FailingDriver {
    fn load_metadata_for_class(
        &self,
        class_name: &str,
    ) -> Result<Option<ResourceMetadataState>, MetadataError> {
        Err(MetadataError::Driver {
            class: class_name.to_owned(),
            source: anyhow::anyhow!("mapping file is unreadable"),
        })
    }
}

#[test]
fn driver_failures_propagate() {
    let factory = MetadataFactory::new(Arc::new(FailingDriver), Arc::new(reflection_service()));

    let err = factory.get_metadata_for_class("Widget").unwrap_err();

    assert!(matches!(err, MetadataError::Driver { ref class, .. } if class == "Widget"));
    assert!(err.to_string().contains("mapping file is unreadable"));
}

#![allow(dead_code, clippy::unwrap_used)]

use std::sync::Arc;

use restkit_metadata::{
    AssociationKind, ClassMetadata, ReflectionClass, ResourceMetadata, RuntimeReflectionService,
};
use serde_json::Value;

#[derive(Debug, Default, PartialEq)]
pub struct Widget {
    pub name: String,
    pub size: i64,
}

#[derive(Debug, Default, PartialEq)]
pub struct User {
    pub email: String,
}

#[derive(Debug, PartialEq)]
pub struct Pair {
    pub left: String,
    pub right: String,
}

pub fn widget_class() -> ReflectionClass {
    ReflectionClass::new("Widget")
        .with_properties(["id", "name", "size", "owner", "tags"])
        .with_constructor(0, 2, |args| {
            let name = args
                .first()
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned();
            let size = args.get(1).and_then(Value::as_i64).unwrap_or_default();
            Ok(Box::new(Widget { name, size }))
        })
}

pub fn user_class() -> ReflectionClass {
    ReflectionClass::new("User")
        .with_properties(["id", "email"])
        .with_default_constructor::<User>()
}

/// A class whose constructor needs exactly two arguments.
pub fn pair_class() -> ReflectionClass {
    ReflectionClass::new("Pair")
        .with_properties(["left", "right"])
        .with_constructor(2, 0, |args| {
            let text = |v: &Value| v.as_str().map(str::to_owned).unwrap_or_default();
            Ok(Box::new(Pair {
                left: text(&args[0]),
                right: text(&args[1]),
            }))
        })
}

pub fn reflection_service() -> RuntimeReflectionService {
    let service = RuntimeReflectionService::new();
    service.register(widget_class());
    service.register(user_class());
    service.register(pair_class());
    service
}

pub fn widget_class_metadata(service: &RuntimeReflectionService) -> ClassMetadata {
    use restkit_metadata::ReflectionService;

    let mut meta = ClassMetadata::new("Widget", "widgets")
        .with_identifier("id")
        .with_field("name")
        .with_field("size")
        .with_association("owner", "User", AssociationKind::ManyToOne)
        .with_association("tags", "Tag", AssociationKind::ManyToMany);
    if let Some(class) = service.get_class("Widget") {
        meta = meta.with_reflection(class);
    }
    meta
}

/// Widget descriptor with an owner association, a declared-but-absent `tags`
/// association and a collection descriptor.
pub fn widget_metadata(service: &RuntimeReflectionService) -> Arc<ResourceMetadata> {
    use restkit_metadata::ReflectionService;

    let user_reflection = service.get_class("User").unwrap();
    let widget_reflection = service.get_class("Widget").unwrap();

    let owner = ResourceMetadata::builder(user_reflection)
        .controller("UserController")
        .hydrator("UserHydrator")
        .input_filter("UserFilter")
        .build();

    let collection = ResourceMetadata::builder(Arc::clone(&widget_reflection))
        .controller("WidgetListController")
        .build();

    ResourceMetadata::builder(widget_reflection)
        .class_metadata(Arc::new(widget_class_metadata(service)))
        .controller("WidgetController")
        .hydrator("WidgetHydrator")
        .input_filter("WidgetFilter")
        .collection_metadata(collection)
        .association("owner", owner)
        .absent_association("tags")
        .build()
}

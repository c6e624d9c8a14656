//! Runtime reflection handles for resource types
//!
//! Rust has no runtime class loader, so a resource type is made reflectable by
//! registering a [`ReflectionClass`]: its name, the properties it declares and
//! how to construct it from positional arguments. Handles are looked up by
//! class name through a [`ReflectionService`], which is how serialized metadata
//! gets its handles back after a round trip through a cache.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::error::InstantiationError;

/// A constructed domain object.
pub type ResourceObject = Box<dyn Any + Send + Sync>;

type ConstructorFn = dyn Fn(&[Value]) -> anyhow::Result<ResourceObject> + Send + Sync;

#[derive(Clone)]
struct Constructor {
    required: usize,
    optional: usize,
    public: bool,
    build: Arc<ConstructorFn>,
}

/// Introspection and construction capability for one resource type.
#[derive(Clone)]
pub struct ReflectionClass {
    name: String,
    properties: Vec<String>,
    is_abstract: bool,
    constructor: Option<Constructor>,
}

impl ReflectionClass {
    /// A concrete class without a constructor yet. It cannot be instantiated
    /// until one is added with [`with_constructor`](Self::with_constructor) or
    /// [`with_default_constructor`](Self::with_default_constructor).
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            is_abstract: false,
            constructor: None,
        }
    }

    /// A class that can be introspected but never instantiated.
    #[must_use]
    pub fn abstract_class(name: impl Into<String>) -> Self {
        Self {
            is_abstract: true,
            ..Self::new(name)
        }
    }

    #[must_use]
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.properties.push(property.into());
        self
    }

    #[must_use]
    pub fn with_properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties.extend(properties.into_iter().map(Into::into));
        self
    }

    /// Registers a positional constructor taking `required` mandatory and up to
    /// `optional` trailing arguments.
    #[must_use]
    pub fn with_constructor<F>(mut self, required: usize, optional: usize, build: F) -> Self
    where
        F: Fn(&[Value]) -> anyhow::Result<ResourceObject> + Send + Sync + 'static,
    {
        self.constructor = Some(Constructor {
            required,
            optional,
            public: true,
            build: Arc::new(build),
        });
        self
    }

    /// Registers `T::default()` as a zero-argument constructor.
    #[must_use]
    pub fn with_default_constructor<T>(self) -> Self
    where
        T: Default + Send + Sync + 'static,
    {
        self.with_constructor(0, 0, |_| Ok(Box::new(T::default())))
    }

    /// Marks the constructor as non-public: the class stays introspectable but
    /// cannot be instantiated through reflection.
    #[must_use]
    pub fn with_private_constructor(mut self) -> Self {
        if let Some(ctor) = self.constructor.as_mut() {
            ctor.public = false;
        } else {
            self.constructor = Some(Constructor {
                required: 0,
                optional: 0,
                public: false,
                build: Arc::new(|_: &[Value]| -> anyhow::Result<ResourceObject> {
                    anyhow::bail!("private constructor")
                }),
            });
        }
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    #[must_use]
    pub fn has_property(&self, property: &str) -> bool {
        self.properties.iter().any(|p| p == property)
    }

    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    #[must_use]
    pub fn is_instantiable(&self) -> bool {
        !self.is_abstract && self.constructor.as_ref().is_some_and(|c| c.public)
    }

    /// Default construction, without arguments.
    ///
    /// # Errors
    /// See [`new_instance_args`](Self::new_instance_args).
    pub fn new_instance(&self) -> Result<ResourceObject, InstantiationError> {
        self.new_instance_args(&[])
    }

    /// Positional construction. Arguments are forwarded in order.
    ///
    /// # Errors
    /// Returns [`InstantiationError`] if the class is abstract, has no
    /// constructor or only a non-public one, receives the wrong number of arguments, or its constructor
    /// rejects the arguments.
    pub fn new_instance_args(&self, args: &[Value]) -> Result<ResourceObject, InstantiationError> {
        if self.is_abstract {
            return Err(InstantiationError::AbstractClass {
                class: self.name.clone(),
            });
        }

        let Some(ctor) = self.constructor.as_ref() else {
            return Err(InstantiationError::NoConstructor {
                class: self.name.clone(),
            });
        };
        if !ctor.public {
            return Err(InstantiationError::NonPublicConstructor {
                class: self.name.clone(),
            });
        }

        let max = ctor.required + ctor.optional;
        if args.len() < ctor.required || args.len() > max {
            return Err(InstantiationError::ArityMismatch {
                class: self.name.clone(),
                min: ctor.required,
                max,
                given: args.len(),
            });
        }

        (ctor.build)(args).map_err(|source| InstantiationError::Constructor {
            class: self.name.clone(),
            source,
        })
    }
}

impl fmt::Debug for ReflectionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReflectionClass")
            .field("name", &self.name)
            .field("properties", &self.properties)
            .field("is_abstract", &self.is_abstract)
            .finish_non_exhaustive()
    }
}

/// Resolves reflection handles by class name.
///
/// This is the collaborator used to re-establish reflection state after
/// metadata has been deserialized.
pub trait ReflectionService: Send + Sync {
    fn get_class(&self, class_name: &str) -> Option<Arc<ReflectionClass>>;
}

/// In-process registry of reflection classes keyed by class name.
///
/// Re-registering a name overwrites the previous handle; `Arc`s already handed
/// out stay valid.
#[derive(Default)]
pub struct RuntimeReflectionService {
    classes: RwLock<HashMap<String, Arc<ReflectionClass>>>,
}

impl RuntimeReflectionService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a class and returns the shared handle.
    pub fn register(&self, class: ReflectionClass) -> Arc<ReflectionClass> {
        let class = Arc::new(class);
        self.classes
            .write()
            .insert(class.name().to_owned(), Arc::clone(&class));
        class
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.read().is_empty()
    }
}

impl ReflectionService for RuntimeReflectionService {
    fn get_class(&self, class_name: &str) -> Option<Arc<ReflectionClass>> {
        self.classes.read().get(class_name).cloned()
    }
}

impl fmt::Debug for RuntimeReflectionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let classes = self.classes.read();
        let mut names: Vec<&str> = classes.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("RuntimeReflectionService")
            .field("classes", &names)
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, PartialEq)]
    struct Tag {
        label: String,
    }

    #[derive(Debug, PartialEq)]
    struct Point {
        x: i64,
        y: i64,
        z: i64,
    }

    fn point_class() -> ReflectionClass {
        ReflectionClass::new("Point")
            .with_properties(["x", "y", "z"])
            .with_constructor(2, 1, |args| {
                let coord = |i: usize| args.get(i).and_then(Value::as_i64).unwrap_or(0);
                if !args[0].is_i64() {
                    anyhow::bail!("x must be an integer");
                }
                Ok(Box::new(Point {
                    x: coord(0),
                    y: coord(1),
                    z: coord(2),
                }))
            })
    }

    #[test]
    fn default_constructor_builds_default_value() {
        let class = ReflectionClass::new("Tag").with_default_constructor::<Tag>();
        let obj = class.new_instance().unwrap();
        assert_eq!(obj.downcast_ref::<Tag>(), Some(&Tag::default()));
        assert!(class.is_instantiable());
    }

    #[test]
    fn positional_arguments_are_forwarded_in_order() {
        let obj = point_class()
            .new_instance_args(&[json!(1), json!(2), json!(3)])
            .unwrap();
        assert_eq!(obj.downcast_ref::<Point>(), Some(&Point { x: 1, y: 2, z: 3 }));
    }

    #[test]
    fn optional_trailing_argument_may_be_omitted() {
        let obj = point_class().new_instance_args(&[json!(4), json!(5)]).unwrap();
        assert_eq!(obj.downcast_ref::<Point>(), Some(&Point { x: 4, y: 5, z: 0 }));
    }

    #[test]
    fn too_few_arguments_is_an_arity_mismatch() {
        let err = point_class().new_instance_args(&[json!(1)]).unwrap_err();
        match err {
            InstantiationError::ArityMismatch {
                min, max, given, ..
            } => {
                assert_eq!((min, max, given), (2, 3, 1));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(point_class().new_instance().is_err());
    }

    #[test]
    fn too_many_arguments_is_an_arity_mismatch() {
        let args = [json!(1), json!(2), json!(3), json!(4)];
        assert!(matches!(
            point_class().new_instance_args(&args),
            Err(InstantiationError::ArityMismatch { given: 4, .. })
        ));
    }

    #[test]
    fn rejected_arguments_surface_constructor_error() {
        let err = point_class()
            .new_instance_args(&[json!("x"), json!(2)])
            .unwrap_err();
        assert!(matches!(err, InstantiationError::Constructor { .. }));
        assert!(err.to_string().contains("x must be an integer"));
    }

    #[test]
    fn abstract_class_cannot_be_instantiated() {
        let class = ReflectionClass::abstract_class("Shape").with_property("area");
        assert!(matches!(
            class.new_instance(),
            Err(InstantiationError::AbstractClass { .. })
        ));
        assert!(class.has_property("area"));
        assert!(!class.is_instantiable());
    }

    #[test]
    fn private_constructor_cannot_be_invoked() {
        let class = ReflectionClass::new("Singleton")
            .with_default_constructor::<Tag>()
            .with_private_constructor();
        assert!(matches!(
            class.new_instance(),
            Err(InstantiationError::NonPublicConstructor { .. })
        ));

    }

    #[test]
    fn class_without_constructor_reports_missing_constructor() {
        let bare = ReflectionClass::new("Bare");
        assert!(!bare.is_instantiable());

        let err = bare.new_instance().unwrap_err();
        assert!(matches!(err, InstantiationError::NoConstructor { ref class } if class == "Bare"));
        assert_eq!(err.to_string(), "class 'Bare' has no constructor");
    }

    #[test]
    fn runtime_service_resolves_registered_classes() {
        let service = RuntimeReflectionService::new();
        assert!(service.is_empty());

        let registered = service.register(point_class());
        let resolved = service.get_class("Point").unwrap();
        assert!(Arc::ptr_eq(&registered, &resolved));
        assert!(service.get_class("Unknown").is_none());
        assert_eq!(service.len(), 1);
    }

    #[test]
    fn re_registering_overwrites_previous_handle() {
        let service = RuntimeReflectionService::new();
        let first = service.register(ReflectionClass::new("Tag"));
        service.register(ReflectionClass::new("Tag").with_property("label"));

        let current = service.get_class("Tag").unwrap();
        assert!(current.has_property("label"));
        // handles already handed out keep their old shape
        assert!(!first.has_property("label"));
        assert_eq!(service.len(), 1);
    }
}

//! restkit: REST resource support
//!
//! This crate wires the pieces a host needs around resource descriptors:
//! - [`ModuleOptionsFactory`] reads the `restkit` configuration section
//! - [`HttpExceptionListener`] turns domain failures into [`HttpError`]s
//! - [`HttpMethodOverrideListener`] honours `X-HTTP-Method-Override`
//!
//! Descriptors and HTTP errors live in [`metadata`] and [`errors`].
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod listener;
pub mod method_override;
pub mod options;

pub use restkit_errors as errors;
pub use restkit_metadata as metadata;

pub use config::{ConfigError, ConfigProvider, StaticConfig, section_or_default, section_required};
pub use errors::{HttpError, HttpErrorKind, Problem};
pub use listener::HttpExceptionListener;
pub use metadata::{MetadataFactory, Resource, ResourceMetadata};
pub use method_override::{HttpMethodOverrideListener, METHOD_OVERRIDE_HEADER};
pub use options::{CONFIG_KEY, ModuleOptions, ModuleOptionsFactory};

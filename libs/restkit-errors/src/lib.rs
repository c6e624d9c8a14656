//! HTTP error types for restkit
//!
//! This crate provides pure data types for error handling, with no dependencies
//! on HTTP frameworks. It includes:
//! - the HTTP error family (`HttpError`, `HttpErrorKind`)
//! - RFC 9457 Problem Details (`Problem`)
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod http_error;
pub mod problem;

pub use http_error::{HttpError, HttpErrorKind, InvalidStatus};
pub use problem::{APPLICATION_PROBLEM_JSON, Problem};

/// Ties a problem to the request that produced it: `instance` is the request
/// path, `trace_id` the id of the trace the failure was recorded in.
pub fn finalize(mut p: Problem, instance: &str, trace_id: Option<String>) -> Problem {
    p = p.with_instance(instance);
    if let Some(tid) = trace_id {
        p = p.with_trace_id(tid);
    }
    p
}

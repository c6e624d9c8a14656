//! Conversion of failures into [`HttpError`]s.
//!
//! [`HttpExceptionListener`] inspects an error and every error in its source
//! chain. The first link that is already an [`HttpError`] wins; otherwise a
//! link whose type was registered with [`HttpExceptionListener::with_error_type`]
//! is converted through the configured exception map, keeping its display text
//! as the message.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

use restkit_errors::{HttpError, HttpErrorKind, Problem, finalize};

use crate::options::ModuleOptions;

type Matcher = Box<dyn Fn(&(dyn Error + 'static)) -> bool + Send + Sync>;

pub struct HttpExceptionListener {
    exception_map: HashMap<String, HttpErrorKind>,
    matchers: Vec<(String, Matcher)>,
}

impl HttpExceptionListener {
    #[must_use]
    pub fn new(options: &ModuleOptions) -> Self {
        Self {
            exception_map: options.exception_map.clone(),
            matchers: Vec::new(),
        }
    }

    /// Registers `E` under `key`. Errors of that type are mapped through the
    /// exception map entry with the same key.
    #[must_use]
    pub fn with_error_type<E: Error + 'static>(mut self, key: impl Into<String>) -> Self {
        self.matchers
            .push((key.into(), Box::new(|e: &(dyn Error + 'static)| e.is::<E>())));
        self
    }

    /// Returns the HTTP error for `error`, or `None` if nothing in its chain is
    /// an HTTP error or a mapped domain error.
    #[must_use]
    pub fn handle(&self, error: &(dyn Error + 'static)) -> Option<HttpError> {
        let mut current = Some(error);
        while let Some(e) = current {
            if let Some(http) = e.downcast_ref::<HttpError>() {
                tracing::debug!(status = http.status().as_u16(), "http error raised");
                return Some(http.clone());
            }
            if let Some(mapped) = self.map_domain_error(e) {
                return Some(mapped);
            }
            current = e.source();
        }
        None
    }

    /// Same as [`handle`](Self::handle), rendered as a problem for `instance`.
    #[must_use]
    pub fn handle_as_problem(
        &self,
        error: &(dyn Error + 'static),
        instance: &str,
        trace_id: Option<String>,
    ) -> Option<Problem> {
        self.handle(error)
            .map(|http| finalize(Problem::from(http), instance, trace_id))
    }

    fn map_domain_error(&self, error: &(dyn Error + 'static)) -> Option<HttpError> {
        let (key, _) = self.matchers.iter().find(|(_, matches)| matches(error))?;

        let Some(kind) = self.exception_map.get(key) else {
            tracing::warn!(key = %key, "no HTTP error kind configured for domain error");
            return None;
        };

        tracing::debug!(key = %key, kind = %kind, error = %error, "mapped domain error");
        Some(HttpError::from_kind(*kind, error.to_string(), None))
    }
}

impl fmt::Debug for HttpExceptionListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpExceptionListener")
            .field("exception_map", &self.exception_map)
            .field(
                "error_types",
                &self.matchers.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

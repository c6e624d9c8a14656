//! `X-HTTP-Method-Override` support for clients limited to GET and POST.

use http::{Method, Request};
use restkit_errors::HttpError;

use crate::options::ModuleOptions;

pub const METHOD_OVERRIDE_HEADER: &str = "x-http-method-override";

/// Replaces the method of a `POST` request with the one named in
/// [`METHOD_OVERRIDE_HEADER`]. A disabled listener leaves every request alone.
#[derive(Debug, Clone, Default)]
pub struct HttpMethodOverrideListener {
    enabled: bool,
}

impl HttpMethodOverrideListener {
    #[must_use]
    pub fn new(options: &ModuleOptions) -> Self {
        Self {
            enabled: options.register_http_method_override_listener,
        }
    }

    #[must_use]
    pub fn enabled() -> Self {
        Self { enabled: true }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Applies the override to `request`. Returns the replaced method, or
    /// `None` when the request is left untouched.
    ///
    /// # Errors
    /// Returns a 400 [`HttpError`] if the header does not name a valid method.
    pub fn apply<B>(&self, request: &mut Request<B>) -> Result<Option<Method>, HttpError> {
        if !self.enabled || request.method() != Method::POST {
            return Ok(None);
        }
        let Some(value) = request.headers().get(METHOD_OVERRIDE_HEADER) else {
            return Ok(None);
        };

        let raw = String::from_utf8_lossy(value.as_bytes())
            .trim()
            .to_ascii_uppercase();
        let Ok(method) = Method::from_bytes(raw.as_bytes()) else {
            tracing::warn!(value = %raw, "rejected HTTP method override");
            return Err(HttpError::bad_request(format!(
                "invalid {METHOD_OVERRIDE_HEADER} header value '{raw}'"
            )));
        };

        tracing::debug!(method = %method, "overriding HTTP method");
        Ok(Some(std::mem::replace(request.method_mut(), method)))
    }
}

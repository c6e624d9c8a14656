//! HTTP error family
//!
//! Every semantic failure the REST layer knows about is expressed as an
//! [`HttpError`]: a fixed status code, a human-readable message and an optional
//! structured payload. [`HttpErrorKind`] enumerates the statuses that have a
//! dedicated meaning (and a default message); arbitrary 4xx/5xx codes are
//! available through [`HttpError::client`] and [`HttpError::server`].

use std::fmt;

use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::problem::Problem;

/// Statuses with a dedicated error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HttpErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    NotAcceptable,
    Conflict,
    Gone,
    PreconditionFailed,
    UnsupportedMediaType,
    UnprocessableEntity,
    TooManyRequests,
    InternalServerError,
    NotImplemented,
    ServiceUnavailable,
}

impl HttpErrorKind {
    /// Status code carried by errors of this kind.
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Gone => StatusCode::GONE,
            Self::PreconditionFailed => StatusCode::PRECONDITION_FAILED,
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::UnprocessableEntity => StatusCode::UNPROCESSABLE_ENTITY,
            Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Message used when an error of this kind is raised without one.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::BadRequest => "The request cannot be fulfilled due to bad syntax",
            Self::Unauthorized => "The request requires user authentication",
            Self::Forbidden => "The server understood the request but is refusing to fulfill it",
            Self::NotFound => "The requested resource could not be found",
            Self::MethodNotAllowed => {
                "The method specified in the request is not allowed for the resource"
            }
            Self::NotAcceptable => {
                "The resource cannot produce content acceptable according to the Accept headers"
            }
            Self::Conflict => "The request could not be completed due to a conflict",
            Self::Gone => "The requested resource is no longer available",
            Self::PreconditionFailed => "One or more request preconditions evaluated to false",
            Self::UnsupportedMediaType => "The request entity has a media type which is not supported",
            Self::UnprocessableEntity => {
                "The request was well-formed but was unable to be followed due to semantic errors"
            }
            Self::TooManyRequests => "The user has sent too many requests in a given amount of time",
            Self::InternalServerError => "An internal server error occurred",
            Self::NotImplemented => "The server does not support the functionality required",
            Self::ServiceUnavailable => "The server is currently unavailable",
        }
    }
}

impl fmt::Display for HttpErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status().canonical_reason().unwrap_or("Unknown"))
    }
}

/// Returned when a status code is used for the wrong error class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("status {status} is not a valid {expected} error status")]
pub struct InvalidStatus {
    pub status: u16,
    pub expected: &'static str,
}

/// An error that maps to a fixed HTTP status.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{status}: {message}")]
pub struct HttpError {
    status: StatusCode,
    message: String,
    errors: Option<serde_json::Value>,
}

impl HttpError {
    /// Builds an error of a known kind. An empty `message` falls back to the
    /// kind's default message.
    pub fn from_kind(
        kind: HttpErrorKind,
        message: impl Into<String>,
        errors: Option<serde_json::Value>,
    ) -> Self {
        let message = message.into();
        let message = if message.is_empty() {
            kind.default_message().to_owned()
        } else {
            message
        };
        Self {
            status: kind.status(),
            message,
            errors,
        }
    }

    /// Builds a client error (4xx) with an arbitrary status.
    ///
    /// # Errors
    /// Returns [`InvalidStatus`] if `status` is not in the 4xx range.
    pub fn client(
        status: StatusCode,
        message: impl Into<String>,
        errors: Option<serde_json::Value>,
    ) -> Result<Self, InvalidStatus> {
        if !status.is_client_error() {
            return Err(InvalidStatus {
                status: status.as_u16(),
                expected: "client",
            });
        }
        Ok(Self::with_status(status, message.into(), errors))
    }

    /// Builds a server error (5xx) with an arbitrary status.
    ///
    /// # Errors
    /// Returns [`InvalidStatus`] if `status` is not in the 5xx range.
    pub fn server(
        status: StatusCode,
        message: impl Into<String>,
        errors: Option<serde_json::Value>,
    ) -> Result<Self, InvalidStatus> {
        if !status.is_server_error() {
            return Err(InvalidStatus {
                status: status.as_u16(),
                expected: "server",
            });
        }
        Ok(Self::with_status(status, message.into(), errors))
    }

    fn with_status(status: StatusCode, message: String, errors: Option<serde_json::Value>) -> Self {
        let message = if message.is_empty() {
            status.canonical_reason().unwrap_or_default().to_owned()
        } else {
            message
        };
        Self {
            status,
            message,
            errors,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::from_kind(HttpErrorKind::BadRequest, message, None)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::from_kind(HttpErrorKind::Unauthorized, message, None)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::from_kind(HttpErrorKind::Forbidden, message, None)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::from_kind(HttpErrorKind::NotFound, message, None)
    }

    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self::from_kind(HttpErrorKind::MethodNotAllowed, message, None)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::from_kind(HttpErrorKind::Conflict, message, None)
    }

    /// Semantic validation failure (422), usually carrying the input filter messages.
    pub fn unprocessable_entity(
        message: impl Into<String>,
        errors: Option<serde_json::Value>,
    ) -> Self {
        Self::from_kind(HttpErrorKind::UnprocessableEntity, message, errors)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::from_kind(HttpErrorKind::InternalServerError, message, None)
    }

    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::from_kind(HttpErrorKind::NotImplemented, message, None)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::from_kind(HttpErrorKind::ServiceUnavailable, message, None)
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn errors(&self) -> Option<&serde_json::Value> {
        self.errors.as_ref()
    }

    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }

    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }

    /// Renders this error as a Problem Details document.
    pub fn to_problem(&self) -> Problem {
        let title = self.status.canonical_reason().unwrap_or("Error");
        let problem = Problem::new(self.status, title, self.message.clone());
        match &self.errors {
            Some(errors) => problem.with_errors(errors.clone()),
            None => problem,
        }
    }
}

impl From<HttpErrorKind> for HttpError {
    fn from(kind: HttpErrorKind) -> Self {
        Self::from_kind(kind, String::new(), None)
    }
}

impl From<HttpError> for Problem {
    fn from(e: HttpError) -> Self {
        e.to_problem()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unprocessable_entity_uses_422_and_default_message() {
        let err = HttpError::unprocessable_entity("", Some(json!({ "email": ["invalid"] })));

        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            err.message(),
            "The request was well-formed but was unable to be followed due to semantic errors"
        );
        assert_eq!(err.errors(), Some(&json!({ "email": ["invalid"] })));
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
    }

    #[test]
    fn explicit_message_wins_over_default() {
        let err = HttpError::not_found("Widget 12 does not exist");
        assert_eq!(err.message(), "Widget 12 does not exist");
        assert_eq!(err.to_string(), "404 Not Found: Widget 12 does not exist");
    }

    #[test]
    fn every_kind_maps_to_its_status_class() {
        let kinds = [
            HttpErrorKind::BadRequest,
            HttpErrorKind::Unauthorized,
            HttpErrorKind::Forbidden,
            HttpErrorKind::NotFound,
            HttpErrorKind::MethodNotAllowed,
            HttpErrorKind::NotAcceptable,
            HttpErrorKind::Conflict,
            HttpErrorKind::Gone,
            HttpErrorKind::PreconditionFailed,
            HttpErrorKind::UnsupportedMediaType,
            HttpErrorKind::UnprocessableEntity,
            HttpErrorKind::TooManyRequests,
        ];
        for kind in kinds {
            let err = HttpError::from(kind);
            assert!(err.is_client_error(), "{kind:?} should be a client error");
            assert!(!err.message().is_empty());
        }

        for kind in [
            HttpErrorKind::InternalServerError,
            HttpErrorKind::NotImplemented,
            HttpErrorKind::ServiceUnavailable,
        ] {
            assert!(HttpError::from(kind).is_server_error(), "{kind:?}");
        }
    }

    #[test]
    fn client_rejects_non_4xx_status() {
        let err = HttpError::client(StatusCode::BAD_GATEWAY, "nope", None).unwrap_err();
        assert_eq!(err.status, 502);
        assert_eq!(err.expected, "client");

        let ok = HttpError::client(StatusCode::IM_A_TEAPOT, "", None).unwrap();
        assert_eq!(ok.message(), "I'm a teapot");
    }

    #[test]
    fn server_rejects_non_5xx_status() {
        assert!(HttpError::server(StatusCode::NOT_FOUND, "x", None).is_err());
        assert!(HttpError::server(StatusCode::BAD_GATEWAY, "x", None).is_ok());
    }

    #[test]
    fn kind_deserializes_from_snake_case() {
        let kind: HttpErrorKind = serde_json::from_value(json!("unprocessable_entity")).unwrap();
        assert_eq!(kind, HttpErrorKind::UnprocessableEntity);
        assert_eq!(kind.to_string(), "Unprocessable Entity");
    }

    #[test]
    fn to_problem_carries_payload() {
        let problem = HttpError::unprocessable_entity("Invalid widget", Some(json!(["name"])))
            .to_problem();
        assert_eq!(problem.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(problem.title, "Unprocessable Entity");
        assert_eq!(problem.detail, "Invalid widget");
        assert_eq!(problem.errors, Some(json!(["name"])));

        let plain: Problem = HttpError::conflict("taken").into();
        assert!(plain.errors.is_none());
    }
}

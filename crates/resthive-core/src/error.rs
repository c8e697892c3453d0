//! Error types for the pipeline.
//!
//! Every seam in the pipeline returns `Result<T>` explicitly; there is no
//! exception-style unwinding and no retries. Each variant carries a stable
//! HTTP status code and error code, and `issues`-bearing variants expose
//! a `{field: [message]}` map for 422 responses.

use http::StatusCode;
use std::collections::BTreeMap;
use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A `{field: [messages]}` validation issues map, ordered for stable output.
pub type Issues = BTreeMap<String, Vec<String>>;

/// Main error type for the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Route unmatched, or item absent at the routed path.
    #[error("{0}")]
    NotFound(String),

    /// The dispatched mode is disabled on the routed resource.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Duplicate id on create.
    #[error("Conflict")]
    Conflict,

    /// If-Match / If-Unmodified-Since mismatch, or storer CAS loss.
    #[error("Precondition Failed")]
    PreconditionFailed,

    /// Validation failure (body, URL params, immutable id). Always carries `issues`.
    #[error("{message}")]
    UnprocessableEntity { message: String, issues: Issues },

    /// Malformed JSON body, malformed patch, or unparsable header.
    #[error("{0}")]
    BadRequest(String),

    /// Nil storer, or a storer operation the adapter does not support.
    #[error("No Storage Defined")]
    NotImplemented,

    /// Storer returned an error that isn't one of the known kinds. The raw
    /// message is logged, never returned to the client (see `to_json`).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build the standard 422 variant with an issues map.
    pub fn unprocessable(message: impl Into<String>, issues: Issues) -> Self {
        Self::UnprocessableEntity {
            message: message.into(),
            issues,
        }
    }

    /// Build a 422 with a single field/message pair.
    pub fn unprocessable_field(message: impl Into<String>, field: &str, issue: impl Into<String>) -> Self {
        let mut issues = Issues::new();
        issues.insert(field.to_string(), vec![issue.into()]);
        Self::unprocessable(message, issues)
    }

    /// Get the HTTP status code for this error, per §7.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Conflict => StatusCode::CONFLICT,
            Self::PreconditionFailed => StatusCode::PRECONDITION_FAILED,
            Self::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable error code for API responses.
    pub fn code(&self) -> u16 {
        self.status_code().as_u16()
    }

    /// The `issues` map, if this variant carries one.
    pub fn issues(&self) -> Option<&Issues> {
        match self {
            Self::UnprocessableEntity { issues, .. } => Some(issues),
            _ => None,
        }
    }

    /// Convert to the error response body shape from §6:
    /// `{"code": int, "message": string, "issues"?: {field: [string]}}`.
    ///
    /// `Internal` errors never leak their raw message to the client; call
    /// `tracing::error!` with the original error before discarding it.
    pub fn to_json(&self) -> serde_json::Value {
        let message = match self {
            Self::Internal(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        };

        let mut body = serde_json::json!({
            "code": self.code(),
            "message": message,
        });

        if let Some(issues) = self.issues() {
            body["issues"] = serde_json::to_value(issues).unwrap_or_default();
        }

        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(Error::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(Error::Conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            Error::PreconditionFailed.status_code(),
            StatusCode::PRECONDITION_FAILED
        );
        assert_eq!(Error::NotImplemented.status_code(), StatusCode::NOT_IMPLEMENTED);
    }

    #[test]
    fn test_unprocessable_to_json() {
        let err = Error::unprocessable_field("Document contains error(s)", "invalid", "invalid field");
        let json = err.to_json();
        assert_eq!(json["code"], 422);
        assert_eq!(json["message"], "Document contains error(s)");
        assert_eq!(json["issues"]["invalid"][0], "invalid field");
    }

    #[test]
    fn test_bad_request_malformed_body() {
        let err = Error::BadRequest(
            "Malformed body: invalid character 'i' looking for beginning of value".into(),
        );
        let json = err.to_json();
        assert_eq!(json["code"], 400);
        assert_eq!(
            json["message"],
            "Malformed body: invalid character 'i' looking for beginning of value"
        );
    }

    #[test]
    fn test_internal_hides_raw_message() {
        let err = Error::Internal("leaked secret connection string".into());
        let json = err.to_json();
        assert_eq!(json["message"], "Internal Server Error");
    }

    #[test]
    fn test_not_implemented_message() {
        let err = Error::NotImplemented;
        assert_eq!(err.to_string(), "No Storage Defined");
    }
}

//! Error type for the Toshl API client.
//!
//! # Design
//! Every remote failure with a Toshl error body becomes `ToshlError::Api`,
//! carrying the server's machine-readable `error_id`, its description and the
//! optional per-field detail verbatim. Failures that do not fit that shape
//! keep their raw status and body. Network errors are the transport's own
//! error type, passed through unchanged.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub type Result<T, E = ToshlError> = std::result::Result<T, E>;

/// Errors returned by `ToshlClient` and the resource clients.
#[derive(Debug, Error)]
pub enum ToshlError {
    /// The API answered with status >= 400 and a Toshl error body.
    #[error("Toshl API error {status_code} ({error_id}): {error_description}")]
    Api {
        status_code: u16,
        error_id: String,
        error_description: String,
        /// Contents of the `fields` member, when the server sent one.
        extra_info: Option<Value>,
    },

    /// A non-success status whose body is not a Toshl error body, or a
    /// non-2xx status caught by an explicit success check.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// A create call returned 201 without a `Location` header.
    #[error("response is missing the Location header")]
    MissingLocation,

    /// A payload lacked a member the call needs (e.g. an entry without `id`).
    #[error("payload is missing the `{0}` field")]
    MissingField(&'static str),

    /// A 2xx body of the wrong JSON shape, such as a scalar where an object
    /// was expected.
    #[error("unexpected response body: {0}")]
    UnexpectedBody(Value),

    /// The server kept announcing a `next` page past the last page number.
    #[error("pagination ran past page {0}")]
    PageOverflow(u32),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("network error: {0}")]
    Network(#[from] ureq::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ToshlError {
    /// HTTP status of a remote failure, if this is one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ToshlError::Api { status_code, .. } => Some(*status_code),
            ToshlError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn error_id(&self) -> Option<&str> {
        match self {
            ToshlError::Api { error_id, .. } => Some(error_id),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    /// Build the error for a response with status >= 400.
    pub(crate) fn from_error_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => ToshlError::Api {
                status_code: status,
                error_id: parsed.error_id,
                error_description: parsed.description,
                extra_info: parsed.fields,
            },
            Err(_) => ToshlError::HttpStatus {
                status,
                body: body.to_string(),
            },
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error_id: String,
    description: String,
    #[serde(default)]
    fields: Option<Value>,
}

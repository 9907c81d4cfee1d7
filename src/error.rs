use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by every provider client.
#[derive(Debug, Error)]
pub enum Error {
    /// No usable credential was supplied. Raised before any request is sent.
    #[error("authentication error: {0}")]
    Authentication(String),

    /// A client-side constraint was violated. Raised before any request is sent.
    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Unrecognized(#[from] UnrecognizedError),

    /// The provider answered a delete without an error, but not with its
    /// documented success signal.
    #[error("[{provider}] delete of record {id} was not confirmed")]
    DeleteRejected { provider: &'static str, id: String },

    /// A delete-then-create replacement failed after the delete went through.
    #[error("{source}\nrollback: {rollback}")]
    ReplaceFailed {
        source: Box<Error>,
        rollback: Rollback,
    },

    #[error("{0} not found")]
    NotFound(String),
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }
}

/// One `(code, message)` pair from a provider error envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiErrorDetail {
    pub fn new(code: impl ToString, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// A request rejected by the provider with a recognized error envelope.
#[derive(Debug, Clone, Error)]
pub struct ApiError {
    pub provider: &'static str,
    pub status: u16,
    pub errors: Vec<ApiErrorDetail>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] error with status code {}",
            self.provider, self.status
        )?;
        for detail in &self.errors {
            write!(f, "\n- [{}] {}", detail.code, detail.message)?;
        }
        Ok(())
    }
}

/// Any failure that does not match a known provider envelope. The original
/// failure is kept as-is.
#[derive(Debug, Error)]
pub enum UnrecognizedError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse XML response: {0}")]
    Xml(#[from] quick_xml::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Unrecognized(err.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Unrecognized(err.into())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Self::Unrecognized(err.into())
    }
}

/// Outcome of restoring the original record after a failed replacement.
#[derive(Debug)]
pub enum Rollback {
    Restored { record_id: String },
    Failed(Box<Error>),
}

impl fmt::Display for Rollback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rollback::Restored { record_id } => {
                write!(f, "re-created the deleted record as {}", record_id)
            }
            Rollback::Failed(err) => write!(
                f,
                "re-creating the deleted record failed, the original record is lost: {}",
                err
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_lists_details_in_order() {
        let err = ApiError {
            provider: "cloudflare",
            status: 400,
            errors: vec![
                ApiErrorDetail::new(1003, "Invalid zone"),
                ApiErrorDetail::new(9109, "Unauthorized"),
            ],
        };

        assert_eq!(
            err.to_string(),
            "[cloudflare] error with status code 400\n- [1003] Invalid zone\n- [9109] Unauthorized"
        );
    }

    #[test]
    fn test_replace_failed_mentions_both_errors() {
        let err = Error::ReplaceFailed {
            source: Box::new(Error::validation("bad value")),
            rollback: Rollback::Restored {
                record_id: "rec_1".to_string(),
            },
        };

        let message = err.to_string();
        assert!(message.contains("bad value"));
        assert!(message.contains("re-created the deleted record as rec_1"));
    }
}

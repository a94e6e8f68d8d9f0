//! Error types for renovation rendering.

use std::time::Duration;

/// Generic message shown when a service failure carries no usable text.
pub(crate) const GENERIC_FAILURE_MESSAGE: &str = "Failed to renovate image";

/// Longest error body kept verbatim in an error message.
const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Errors that can occur while collecting input or rendering a renovation.
#[derive(Debug, thiserror::Error)]
pub enum RenovizError {
    /// A required input (`"original image"` or `"style"`) was not provided.
    #[error("missing input: {0}")]
    MissingInput(&'static str),

    /// Uploaded file exceeds the configured size limit.
    #[error("file too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    /// Uploaded file is not an image.
    #[error("unsupported media type: {0}")]
    UnsupportedMedia(String),

    /// A generation is already running on this renderer.
    #[error("a renovation is already in progress")]
    Busy,

    /// API key missing or invalid.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limit exceeded. `message` is the service's own explanation.
    #[error("rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<Duration>,
    },

    /// Request did not complete within the configured timeout.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// The service answered, but not in the expected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The service answered without any inline image data.
    #[error("The model did not return an image.")]
    NoImageReturned,

    /// Invalid configuration (bad file, bad value).
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error (e.g., reading an upload or saving a download).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RenovizError {
    /// Returns true if the error was detected before any network call and
    /// can be fixed by correcting the input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingInput(_) | Self::FileTooLarge { .. } | Self::UnsupportedMedia(_)
        )
    }

    /// Converts the error into the single message shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingInput("original image") => {
                "Please upload an original image first.".to_string()
            }
            Self::MissingInput("style") => "Please select a design style below.".to_string(),
            Self::MissingInput(what) => format!("Please provide the {what}."),
            Self::FileTooLarge { limit, .. } => format!(
                "File size too large. Please upload an image under {}MB.",
                limit.div_ceil(1024 * 1024)
            ),
            Self::Busy => "A renovation is already being generated. Please wait.".to_string(),
            Self::Api { message, .. } if message.trim().is_empty() => {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
            Self::Api { message, .. } => message.clone(),
            Self::RateLimited {
                message,
                retry_after,
            } => {
                let mut msg = if message.trim().is_empty() {
                    "Too many requests.".to_string()
                } else {
                    message.clone()
                };
                if let Some(wait) = retry_after {
                    msg.push_str(&format!(" Retry after {} seconds.", wait.as_secs()));
                }
                msg
            }
            other => {
                let msg = other.to_string();
                if msg.trim().is_empty() {
                    GENERIC_FAILURE_MESSAGE.to_string()
                } else {
                    msg
                }
            }
        }
    }
}

/// Reduces a raw error body to a short, human-readable message.
///
/// Google APIs wrap failures as `{"error": {"message": "..."}}`; when the body
/// has that shape only the inner message is kept. Anything else is trimmed
/// and truncated.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(text) {
        if let Some(msg) = value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return msg.trim().to_string();
        }
    }

    let trimmed = text.trim();
    if trimmed.chars().count() > MAX_ERROR_MESSAGE_LEN {
        let cut: String = trimmed.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
        format!("{cut}...")
    } else {
        trimmed.to_string()
    }
}

/// Reads a `Retry-After` header given in whole seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Result type alias for renovation operations.
pub type Result<T> = std::result::Result<T, RenovizError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_validation() {
        assert!(RenovizError::MissingInput("style").is_validation());
        assert!(RenovizError::FileTooLarge {
            size: 6 * 1024 * 1024,
            limit: 5 * 1024 * 1024
        }
        .is_validation());

        assert!(!RenovizError::NoImageReturned.is_validation());
        assert!(!RenovizError::Timeout(Duration::from_secs(30)).is_validation());
        assert!(!RenovizError::Auth("bad key".into()).is_validation());
    }

    #[test]
    fn test_user_message_for_validation() {
        assert_eq!(
            RenovizError::MissingInput("original image").user_message(),
            "Please upload an original image first."
        );
        assert_eq!(
            RenovizError::MissingInput("style").user_message(),
            "Please select a design style below."
        );
        assert_eq!(
            RenovizError::FileTooLarge {
                size: 6_000_000,
                limit: 5 * 1024 * 1024
            }
            .user_message(),
            "File size too large. Please upload an image under 5MB."
        );
    }

    #[test]
    fn test_user_message_for_service_errors() {
        assert_eq!(
            RenovizError::NoImageReturned.user_message(),
            "The model did not return an image."
        );

        let err = RenovizError::Api {
            status: 500,
            message: "Internal error encountered.".into(),
        };
        assert_eq!(err.user_message(), "Internal error encountered.");

        let err = RenovizError::Api {
            status: 500,
            message: "  ".into(),
        };
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_user_message_for_rate_limit() {
        let err = RenovizError::RateLimited {
            message: "Resource has been exhausted (e.g. check quota).".into(),
            retry_after: Some(Duration::from_secs(12)),
        };
        assert_eq!(
            err.user_message(),
            "Resource has been exhausted (e.g. check quota). Retry after 12 seconds."
        );
        assert_eq!(
            err.to_string(),
            "rate limited: Resource has been exhausted (e.g. check quota)."
        );

        let err = RenovizError::RateLimited {
            message: "Resource exhausted".into(),
            retry_after: None,
        };
        assert_eq!(err.user_message(), "Resource exhausted");

        let err = RenovizError::RateLimited {
            message: String::new(),
            retry_after: None,
        };
        assert_eq!(err.user_message(), "Too many requests.");
    }

    #[test]
    fn test_error_display() {
        let err = RenovizError::Api {
            status: 404,
            message: "Not found".into(),
        };
        assert_eq!(err.to_string(), "API error: 404 - Not found");

        let err = RenovizError::ContentBlocked("Safety filter triggered".into());
        assert_eq!(err.to_string(), "content blocked: Safety filter triggered");
    }

    #[test]
    fn test_sanitize_google_error_body() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(sanitize_error_message(body), "API key not valid.");
    }

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(2_000);
        let msg = sanitize_error_message(&body);
        assert_eq!(msg.len(), MAX_ERROR_MESSAGE_LEN + 3);
        assert!(msg.ends_with("..."));
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = reqwest::header::HeaderMap::new();
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert(reqwest::header::RETRY_AFTER, "30".parse().unwrap());
        assert_eq!(parse_retry_after(&headers), Some(30));

        headers.insert(
            reqwest::header::RETRY_AFTER,
            "Wed, 21 Oct 2015 07:28:00 GMT".parse().unwrap(),
        );
        assert_eq!(parse_retry_after(&headers), None);
    }
}

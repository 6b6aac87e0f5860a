use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Bad credentials or a malformed server auth response
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The token's payload segment could not be decoded
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// The request never reached or returned from the server
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response with the server-provided message
    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Session persistence failed while establishing or clearing a session
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Maximum length for raw response bodies carried in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error body shape used across the AniBlog API: `{"error": ...}`, with an
/// older `{"err": ...}` spelling still emitted by some auth handlers.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub err: Option<String>,
}

impl ErrorBody {
    pub fn message(&self) -> Option<&str> {
        self.error.as_deref().or(self.err.as_deref())
    }
}

impl ApiError {
    /// Truncate a raw body so error messages stay displayable
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut = body
                .char_indices()
                .take_while(|(i, _)| *i <= MAX_ERROR_BODY_LENGTH)
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..cut],
                body.len()
            )
        }
    }

    /// Build an error from a non-2xx response, preferring the structured
    /// `error`/`err` message when the body parses as an error object.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message().map(str::to_string))
            .unwrap_or_else(|| Self::truncate_body(body));
        ApiError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

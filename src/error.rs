use std::path::PathBuf;

use crate::mode::XaiMethod;

/// Banner text for any failed analysis whose cause the user cannot act on.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to analyze. Please try again.";

/// Banner text for a successful response that does not carry a usable prediction.
pub const UNEXPECTED_RESPONSE_MESSAGE: &str = "Unexpected response from the server.";

/// A selected file that can never be submitted.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The MIME type is not one of the accepted image types.
    #[error("unsupported MIME type `{0}`")]
    InvalidType(String),
    /// The file exceeds the upload limit.
    #[error("file is {size} bytes, limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },
}

impl ValidationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::InvalidType(_) => "Invalid file type.",
            ValidationError::TooLarge { .. } => "File must be under 10MB.",
        }
    }
}

/// Failure to obtain a 2xx response from the inference endpoint.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The service answered with a non-2xx status.
    #[error("HTTP {status}")]
    Status { status: u16 },
    /// The request could not be sent or the body could not be read.
    #[error("network failure: {0}")]
    Network(String),
    /// The multipart form could not be built.
    #[error("could not build request: {0}")]
    InvalidRequest(String),
}

/// A 2xx response whose body is not a usable prediction.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// The body is not JSON of the expected shape.
    #[error("malformed JSON body: {0}")]
    Json(#[from] serde_json::Error),
    /// A required field is absent or null.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("confidence score {0} is outside [0, 1]")]
    ScoreOutOfRange(f64),
    /// An explainability map could not be decoded.
    #[error("{method} map is not valid base64: {source}")]
    InvalidImage {
        method: XaiMethod,
        source: base64::DecodeError,
    },
}

impl ContentError {
    pub fn user_message(&self) -> &'static str {
        match self {
            // unparseable bodies are reported like transport failures
            ContentError::Json(_) => GENERIC_FAILURE_MESSAGE,
            _ => UNEXPECTED_RESPONSE_MESSAGE,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Error {
    /// The text shown in the error banner. The `Display` output carries the
    /// diagnostic detail and is only meant for logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            Error::Validation(e) => e.user_message(),
            Error::Transport(_) => GENERIC_FAILURE_MESSAGE,
            Error::Content(e) => e.user_message(),
            Error::Io { .. } => "Could not read the selected file.",
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

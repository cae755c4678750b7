//! Error handling and custom error types
//!
//! `Error` covers the plumbing (HTTP, decoding, IO). The two component
//! boundaries, credential validation and image analysis, each translate it
//! into their own tagged error so callers can branch on the kind of failure
//! instead of parsing message text.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gemini API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("API key cannot be sent in a request header")]
    MalformedKey,

    #[error("Failed to parse Gemini response: {0}")]
    Parse(String),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Invariant violation: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse failure taxonomy shared by both component boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No secret supplied; the user is prompted again.
    CredentialMissing,
    /// The provider rejected the key or exposes no usable model.
    CredentialInvalid,
    /// Network or provider unavailability.
    TransportFailure,
    /// Anything else that went wrong while describing an image.
    AnalysisFailure,
}

/// Outcome of a failed credential validation. Messages are shown verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter your Gemini API Key")]
    CredentialMissing,

    #[error("Invalid API Key: {0}")]
    CredentialInvalid(String),

    #[error("Invalid API Key or no compatible models found")]
    NoEligibleModels,

    #[error("Error configuring API: {0}")]
    Transport(String),
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::CredentialMissing => ErrorKind::CredentialMissing,
            ValidationError::CredentialInvalid(_) | ValidationError::NoEligibleModels => {
                ErrorKind::CredentialInvalid
            }
            ValidationError::Transport(_) => ErrorKind::TransportFailure,
        }
    }
}

impl From<Error> for ValidationError {
    fn from(err: Error) -> Self {
        match err {
            Error::Api { status, message } if matches!(status, 400 | 401 | 403) => {
                ValidationError::CredentialInvalid(message)
            }
            e @ Error::MalformedKey => ValidationError::CredentialInvalid(e.to_string()),
            other => ValidationError::Transport(other.to_string()),
        }
    }
}

/// Why a single image could not be described.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Could not decode image: {0}")]
    Decode(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Response blocked by the provider: {0}")]
    Blocked(String),

    #[error("Gemini API error (status {status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::Transport(_) => ErrorKind::TransportFailure,
            _ => ErrorKind::AnalysisFailure,
        }
    }

    /// Translate a plumbing error raised while talking to `model`.
    pub fn from_provider(err: Error, model: &str) -> Self {
        match err {
            Error::Api { status: 404, .. } => AnalysisError::ModelNotFound(model.to_string()),
            Error::Api { status, message } => AnalysisError::Provider { status, message },
            Error::Image(e) => AnalysisError::Decode(e.to_string()),
            Error::UnsupportedFormat(name) => AnalysisError::Decode(name),
            other => AnalysisError::Transport(other.to_string()),
        }
    }
}
